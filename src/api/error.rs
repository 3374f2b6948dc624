use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request rejected with status {status}")]
    Rejected {
        status: StatusCode,
        /// Displayable reason from the response body's `message` field.
        message: Option<String>,
    },

    #[error("Invalid response: {0}")]
    Malformed(String),
}

/// Error body shape the service uses for rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Build a rejection from a non-success response, extracting the
    /// server-provided `message` if the body carries one.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message);
        ApiError::Rejected { status, message }
    }

    /// Server-provided displayable message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
