//! Error types for the cache facade

use std::fmt;

use docstore_client::StoreError;

/// Errors from cache operations
#[derive(Debug)]
pub enum CacheError {
    /// The cache kill switch is set; no store round-trip was attempted
    Disabled,
    /// The caller-supplied key is empty or null
    EmptyKey,
    /// Service identity is required but not configured
    MissingService,
    /// Branch identity is required but not configured
    MissingBranch,
    /// A key or body could not be serialized
    Encoding(serde_json::Error),
    /// A stored document could not be decoded; absence would be a miss,
    /// this is an anomaly
    Corrupt(String),
    /// The store rejected or failed an operation
    Store(StoreError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Disabled => write!(f, "cache is disabled"),
            CacheError::EmptyKey => write!(f, "cache key is empty"),
            CacheError::MissingService => write!(f, "service identity is not configured"),
            CacheError::MissingBranch => write!(f, "branch identity is not configured"),
            CacheError::Encoding(err) => write!(f, "serialization error: {}", err),
            CacheError::Corrupt(msg) => write!(f, "corrupt cache document: {}", msg),
            CacheError::Store(err) => write!(f, "store error: {}", err),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Encoding(err) => Some(err),
            CacheError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        CacheError::Store(err)
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
