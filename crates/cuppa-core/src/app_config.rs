use std::net::SocketAddr;
use std::path::PathBuf;

use crate::geo::Coordinates;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub maps_api_key: Option<String>,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_base_url: String,
    pub places_base_url: String,
    pub http_timeout_secs: u64,
    /// Anchor used when the caller has no device position.
    pub default_location: Coordinates,
    pub favorites_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// Returns the places API key or a configuration error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when `CUPPA_MAPS_API_KEY` is unset.
    pub fn require_maps_api_key(&self) -> Result<&str, ConfigError> {
        self.maps_api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey("CUPPA_MAPS_API_KEY"))
    }

    /// Returns the generative-language API key or a configuration error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingApiKey`] when `CUPPA_AI_API_KEY` is unset.
    pub fn require_ai_api_key(&self) -> Result<&str, ConfigError> {
        self.ai_api_key
            .as_deref()
            .ok_or(ConfigError::MissingApiKey("CUPPA_AI_API_KEY"))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "maps_api_key",
                &self.maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ai_api_key", &self.ai_api_key.as_ref().map(|_| "[redacted]"))
            .field("ai_model", &self.ai_model)
            .field("ai_base_url", &self.ai_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("default_location", &self.default_location)
            .field("favorites_path", &self.favorites_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
