use thiserror::Error;

/// Errors returned while talking to or interpreting the language model.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("model returned no candidates")]
    EmptyResponse,

    /// No usable JSON in the reply, or JSON of the wrong shape.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl AiError {
    /// A short message suitable for a transient notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the AI service.".to_string(),
            Self::Status { status, .. } if *status == 429 => {
                "The AI service is busy. Try again in a moment.".to_string()
            }
            Self::Status { .. } | Self::InvalidBaseUrl { .. } => {
                "The AI service rejected the request.".to_string()
            }
            Self::EmptyResponse | Self::MalformedResponse(_) => {
                "The AI could not understand that request. Try rephrasing it.".to_string()
            }
        }
    }
}
