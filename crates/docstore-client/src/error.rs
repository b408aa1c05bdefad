//! Error types for store drivers

use std::fmt;

/// Errors from a document store driver
#[derive(Debug)]
pub enum StoreError {
    /// HTTP transport failed
    Http(reqwest::Error),
    /// Store answered with a non-success status
    Api(String),
    /// Driver misconfiguration (missing address, unknown cursor)
    Config(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Http(err) => write!(f, "HTTP error: {}", err),
            StoreError::Api(msg) => write!(f, "store error: {}", msg),
            StoreError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Http(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Http(err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
