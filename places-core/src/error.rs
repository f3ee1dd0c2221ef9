//! Errors raised while talking to the places backend.

use thiserror::Error;

/// Failure of a single request.
///
/// Cloneable so a failed in-flight fetch can be handed to every caller that joined it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlacesError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl PlacesError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Network(_) => "Network error. Check your connection.",
            Self::Status { .. } => "The server rejected the request.",
            Self::Decode(_) => "The server sent an unexpected response.",
            Self::InvalidConfig(_) => "The client is misconfigured. Run `places configure`.",
        }
    }
}

impl From<reqwest::Error> for PlacesError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidConfig(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PlacesError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
