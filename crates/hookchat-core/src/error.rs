//! Error types for hookchat-core

use thiserror::Error;

/// Result type alias using hookchat-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Shown when the webhook answers 2xx with nothing in the body.
pub const EMPTY_RESPONSE_MESSAGE: &str = "The server sent an empty response. Please try again.";

/// Start of the message shown when the webhook answers with a non-success
/// status. The code follows after a space.
pub const STATUS_ERROR_PREFIX: &str = "Error: Server responded with status";

/// Shown for any failure below the HTTP status line.
pub const CONNECTION_FAILED_MESSAGE: &str =
    "Failed to connect to the assistant. Please check your connection.";

/// Errors that can occur when calling the webhook
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a status was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook answered with a non-success status
    #[error("Webhook responded with status {0}")]
    Status(u16),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// The literal string shown to the user in place of a reply.
    pub fn diagnostic(&self) -> String {
        match self {
            Error::Status(code) => format!("{} {}", STATUS_ERROR_PREFIX, code),
            Error::Http(_) | Error::InvalidConfig(_) => {
                CONNECTION_FAILED_MESSAGE.to_string()
            }
        }
    }

    /// Whether the webhook was reached at all
    pub fn is_status(&self) -> bool {
        matches!(self, Error::Status(_))
    }
}
