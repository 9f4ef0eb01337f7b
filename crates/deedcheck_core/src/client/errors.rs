//! Error types for the analysis client.

use std::io;

use thiserror::Error;

/// Failure of one analysis call.
///
/// The progress controller collapses all of these into one user-facing
/// message; the detail is only logged.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The document could not be read from disk.
    #[error("Failed to read document: {0}")]
    Io(#[from] io::Error),

    /// Connection, TLS, timeout or other transport failure.
    #[error("Request to analysis service failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Analysis service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not a valid analysis result.
    #[error("Failed to decode analysis result: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured service URL is unusable.
    #[error("Invalid analysis service URL '{0}'")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create a status error, keeping at most a short prefix of the body.
    pub fn status(status: u16, body: &str) -> Self {
        const MAX_BODY: usize = 200;
        let body = match body.char_indices().nth(MAX_BODY) {
            Some((cut, _)) => format!("{}...", &body[..cut]),
            None => body.to_string(),
        };
        Self::Status { status, body }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
