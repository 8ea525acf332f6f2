//! Error types for the Atlas client.
//!
//! Every failure the client can surface is a variant of `AtlasError`.
//! Nothing is retried or recovered inside the client; errors propagate to
//! the caller of the public method unchanged.

use thiserror::Error;

/// Convenience type alias for Results using AtlasError.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Unified error type for the Atlas crates.
#[derive(Error, Debug)]
pub enum AtlasError {
    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Network errors --
    /// Connection failure or other network-layer error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Request exceeded the configured timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The platform answered with a status outside 200..=299.
    #[error("http error (status {status}): {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    // -- Response errors --
    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A cursor-paginated listing could not advance.
    #[error("pagination error: {0}")]
    Pagination(String),

    /// A response was well-formed JSON but lacked a required field.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    // -- Input errors --
    /// Unrecognized or malformed probe filter.
    #[error("invalid probe filter: {0}")]
    InvalidFilter(String),

    /// A caller-supplied argument is out of range or malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AtlasError {
    /// HTTP status code, if this error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AtlasError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, AtlasError::Timeout(_))
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(e: serde_json::Error) -> Self {
        AtlasError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for AtlasError {
    fn from(e: toml::de::Error) -> Self {
        AtlasError::Config(e.to_string())
    }
}
