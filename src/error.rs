//! Error types for claude-credentials

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while refreshing or persisting credentials
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied expiry is not a base-10 integer of Unix seconds.
    #[error("Malformed expiry: {0:?} is not an integer timestamp")]
    MalformedExpiry(String),

    /// The token endpoint answered with a non-success status.
    #[error("Token refresh failed: {status} {status_text}")]
    RefreshHttp { status: u16, status_text: String },

    /// Transport failure (DNS, connection reset, timeout) or an unusable body.
    #[error("Failed to refresh token: {0}")]
    TokenRefreshFailed(String),

    #[error("Storage error at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            source,
        }
    }
}
