//! Transport error types.

use assured_core::AssuredError;
use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, HttpTransportError>;

/// Errors raised while talking to the server.
#[derive(Debug, Error)]
pub enum HttpTransportError {
    /// The HTTP client couldn't be constructed from the config.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// A multipart part declared an unparsable mime type.
    #[error("Invalid mime type '{mime_type}' for part '{control_name}'")]
    InvalidMimeType {
        /// Part name.
        control_name: String,
        /// Rejected mime type.
        mime_type: String,
    },

    /// Form parameters couldn't be url-encoded.
    #[error("Form encoding error: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HttpTransportError {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Get the HTTP status code if the error carries one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<HttpTransportError> for AssuredError {
    fn from(error: HttpTransportError) -> Self {
        AssuredError::transport(error)
    }
}
