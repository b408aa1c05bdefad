//! Store driver boundary

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{ScrollPage, SearchRequest};

/// Searchable document store consumed by the cache layer.
///
/// Implementations are thread-safe handles to a remote (or in-memory)
/// store. A document id is the store's primary key: `upsert` overwrites in
/// place and `delete_by_id` is idempotent, so removing an id that does not
/// exist is success.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id. `Ok(None)` when the id is not present.
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Insert or overwrite the document stored under `id`.
    async fn upsert(&self, collection: &str, id: &str, document: &Value) -> Result<()>;

    /// Delete the document stored under `id`. Missing ids are success.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()>;

    /// Run a bounded search and open a cursor over the full result set.
    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<ScrollPage>;

    /// Fetch the next page for a cursor. An empty page means end of results.
    async fn continue_scroll(&self, cursor: &str, keep_alive: &str) -> Result<ScrollPage>;

    /// Release a server-held cursor before it times out on its own.
    async fn clear_scroll(&self, cursor: &str) -> Result<()>;

    /// Cheap reachability probe.
    async fn ping(&self) -> Result<()>;
}
