use cuppa_ai::AiError;
use cuppa_core::ConfigError;
use cuppa_places::PlacesError;
use thiserror::Error;

/// Failures that abort a whole search.
///
/// Per-candidate enrichment failures never surface here; they are logged and
/// the candidate is dropped.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ai(#[from] AiError),

    #[error(transparent)]
    Places(#[from] PlacesError),
}

impl SearchError {
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(ConfigError::MissingApiKey(var)) => {
                format!("Search is not configured: {var} is not set.")
            }
            Self::Config(_) => "Search is not configured correctly.".to_string(),
            Self::Ai(e) => e.user_message(),
            Self::Places(e) => e.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_message_names_the_variable() {
        let err = SearchError::from(ConfigError::MissingApiKey("CUPPA_AI_API_KEY"));
        assert!(err.user_message().contains("CUPPA_AI_API_KEY"));
    }

    #[test]
    fn places_status_message_is_passed_through() {
        let err = SearchError::from(PlacesError::Status {
            status: "OVER_QUERY_LIMIT".to_string(),
            message: String::new(),
        });
        assert!(err.user_message().contains("quota"));
    }
}
