use thiserror::Error;

/// Errors returned by the places API client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a status other than `OK` / `ZERO_RESULTS`.
    #[error("places API returned {status}: {message}")]
    Status { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid proxy path '{0}'")]
    InvalidPath(String),

    /// A photo lookup did not answer with a redirect to the image.
    #[error("photo lookup returned HTTP {status} without a redirect")]
    MissingRedirect { status: u16 },
}

impl PlacesError {
    /// A short message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, .. } => match status.as_str() {
                "REQUEST_DENIED" => {
                    "The maps service rejected the request. Check the API key.".to_string()
                }
                "OVER_QUERY_LIMIT" => {
                    "The maps service quota is exhausted. Try again later.".to_string()
                }
                "INVALID_REQUEST" => "The maps service could not understand the search.".to_string(),
                "NOT_FOUND" => "That place no longer exists on the map.".to_string(),
                other => format!("The maps service returned an error ({other})."),
            },
            Self::Http(_) => "Could not reach the maps service.".to_string(),
            Self::Deserialize { .. } | Self::MissingRedirect { .. } => {
                "The maps service sent an unexpected response.".to_string()
            }
            Self::InvalidBaseUrl { .. } | Self::InvalidPath(_) => {
                "The maps request was not valid.".to_string()
            }
        }
    }
}
