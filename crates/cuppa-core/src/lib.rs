//! Shared domain types and configuration for cuppa.

pub mod app_config;
pub mod config;
pub mod favorites;
pub mod filters;
pub mod geo;
pub mod shop;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use favorites::{FavoritesError, FavoritesStore};
pub use filters::{ClockTime, FilterSet, SearchRequest};
pub use geo::{haversine_km, Coordinates};
pub use shop::{Actor, Amenities, OpeningHours, Period, PlaceCandidate, Shop, TimePoint};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    /// An operation needs an API key that was not configured.
    #[error("{0} is not configured")]
    MissingApiKey(&'static str),
}
