//! Error types for API calls
//!
//! `ApiError` covers the three failure families a caller has to render:
//! transport failures, HTTP error statuses (with the server's message when it
//! sent one), and client-side validation that stopped a request before it was
//! issued.

use thiserror::Error;

use crate::storage::StorageError;
use crate::validation::ValidationError;

/// Shown for connection failures and other transport errors
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Shown when the request timed out
pub const TIMEOUT_MESSAGE: &str = "The request timed out. Please try again.";

/// Errors that can occur when calling the marketplace API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout, broken body stream
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-2xx status
    #[error("Server returned {status}{}", suffix(.message))]
    Status {
        /// HTTP status code
        status: u16,
        /// The `message` field of the error body, if any
        message: Option<String>,
    },

    /// The response body was not the JSON we expected
    #[error("Failed to parse API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required argument was empty
    #[error("{0} is required")]
    MissingArgument(&'static str),

    /// Client-side validation rejected the input; no request was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Signup found an existing account for the email
    #[error("A user with this email already exists")]
    EmailTaken,

    /// The auth endpoint answered 2xx but reported `success: false`
    #[error("{0}")]
    Rejected(String),

    /// The configured base URL cannot be used to build request URLs
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Reading or writing the local store failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn suffix(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

impl ApiError {
    /// HTTP status for `Status` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never got an HTTP answer
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    /// Text to show the user for this error
    ///
    /// Server messages and validation messages are shown verbatim; HTTP errors
    /// without a message and decode failures fall back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Network(e) if e.is_timeout() => TIMEOUT_MESSAGE.to_string(),
            ApiError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.is_empty() => message.clone(),
            ApiError::Status { .. } | ApiError::Decode(_) | ApiError::InvalidUrl(_) => {
                fallback.to_string()
            }
            ApiError::Storage(_) => fallback.to_string(),
            ApiError::Rejected(message) if message.is_empty() => fallback.to_string(),
            ApiError::MissingArgument(_)
            | ApiError::Validation(_)
            | ApiError::EmailTaken
            | ApiError::Rejected(_) => self.to_string(),
        }
    }
}
