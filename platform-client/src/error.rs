//! Client error types

use thiserror::Error;

/// Client error type
///
/// `Status` preserves the upstream status code and response body verbatim:
/// the credit flow is required to surface remote errors unchanged rather
/// than paraphrase them.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Request never produced a usable response (connect failure, timeout)
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote service answered with a non-success status
    #[error("upstream responded {status}: {message}")]
    Status { status: u16, message: String },

    /// Successful status but the body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// The upstream HTTP status, when the remote actually answered
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
