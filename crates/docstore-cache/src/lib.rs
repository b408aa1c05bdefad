//! Document-store cache with tenant-scoped bulk invalidation
//!
//! Stores JSON-serializable values as documents in a searchable store,
//! derives document ids deterministically from the key and deployment
//! branch, enforces TTL expiry lazily at read time, and invalidates all
//! of a service/branch pair's entries by scrolling the store.

pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod key;

pub use cache::DocumentCache;
pub use config::CacheConfig;
pub use document::CacheDocument;
pub use error::{CacheError, Result};
pub use key::CacheKey;
