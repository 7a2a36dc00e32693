use crate::app_config::{AppConfig, Environment};
use crate::geo::Coordinates;
use crate::ConfigError;

const DEFAULT_PLACES_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `.env` templates can leave keys blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = require("DATABASE_URL")?;

    let env = parse_environment(&or_default("CUPPA_ENV", "development"));
    let bind_addr = parse_addr("CUPPA_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CUPPA_LOG_LEVEL", "info");

    let maps_api_key = optional("CUPPA_MAPS_API_KEY");
    let ai_api_key = optional("CUPPA_AI_API_KEY");
    let ai_model = or_default("CUPPA_AI_MODEL", DEFAULT_AI_MODEL);
    let ai_base_url = or_default("CUPPA_AI_BASE_URL", DEFAULT_AI_BASE_URL);
    let places_base_url = or_default("CUPPA_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);
    let http_timeout_secs = parse_u64("CUPPA_HTTP_TIMEOUT_SECS", "30")?;

    let default_lat = parse_f64("CUPPA_DEFAULT_LAT", "37.7749")?;
    let default_lng = parse_f64("CUPPA_DEFAULT_LNG", "-122.4194")?;
    let default_location = Coordinates::new(default_lat, default_lng)
        .ok_or_else(|| invalid("CUPPA_DEFAULT_LAT", "coordinates out of range".to_string()))?;

    let favorites_path = PathBuf::from(or_default("CUPPA_FAVORITES_PATH", "./favorites.json"));

    let db_max_connections = parse_u32("CUPPA_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CUPPA_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CUPPA_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        maps_api_key,
        ai_api_key,
        ai_model,
        ai_base_url,
        places_base_url,
        http_timeout_secs,
        default_location,
        favorites_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
