use thiserror::Error;

/// Message shown when the server gives no reason of its own.
pub const GENERIC_FAILURE: &str = "An error occurred";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Text for an inline message or alert. Server-supplied reasons win,
    /// transport failures collapse to the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } | ApiError::Unauthorized(message)
                if !message.is_empty() =>
            {
                message.clone()
            }
            ApiError::NotFound(what) => format!("{} not found", what),
            _ => GENERIC_FAILURE.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}
