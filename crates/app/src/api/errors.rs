//! Commerce API errors.

use thiserror::Error;

/// Shown when the server did not say what went wrong.
pub const FALLBACK_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("request failed with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// The server-supplied message, or a generic one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => FALLBACK_MESSAGE.to_string(),
        }
    }

    /// The bearer token was rejected.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. })
    }
}
