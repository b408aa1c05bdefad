//! Searchable document store driver with scroll enumeration
//!
//! Defines the [`DocumentStore`] boundary consumed by the cache layer, an
//! HTTP driver for Elasticsearch-compatible stores, an in-memory driver for
//! tests and local development, and a cursor enumerator for walking large
//! result sets page by page.

pub mod error;
pub mod http;
pub mod memory;
pub mod scroll;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;
pub use scroll::{scroll_batches, scroll_each, ScrollError};
pub use store::DocumentStore;
pub use types::{ScrollHit, ScrollPage, SearchRequest, TermFilter};
