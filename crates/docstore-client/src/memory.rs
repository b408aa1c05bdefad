//! In-memory store driver
//!
//! Backs tests and local development with the same `DocumentStore`
//! contract as the HTTP driver. Clones share one underlying store, so a
//! clone can be handed to each component under test.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::store::DocumentStore;
use crate::types::{ScrollHit, ScrollPage, SearchRequest};

#[derive(Default)]
struct Inner {
    /// Documents keyed by (collection, id)
    documents: HashMap<(String, String), Value>,
    /// Remaining hits per open cursor
    scrolls: HashMap<String, Scroll>,
    next_cursor: u64,
}

struct Scroll {
    remaining: Vec<ScrollHit>,
    page_size: usize,
}

/// In-memory implementation of [`DocumentStore`]
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held, across all collections
    pub async fn len(&self) -> usize {
        self.inner.lock().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn matches(source: &Value, request: &SearchRequest) -> bool {
    request
        .filters
        .iter()
        .all(|filter| source.get(&filter.field) == Some(&filter.value))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .documents
            .get(&(collection.to_string(), id.to_string()))
            .cloned())
    }

    async fn upsert(&self, collection: &str, id: &str, document: &Value) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .documents
            .insert((collection.to_string(), id.to_string()), document.clone());
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner
            .documents
            .remove(&(collection.to_string(), id.to_string()));
        Ok(())
    }

    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<ScrollPage> {
        let mut inner = self.inner.lock().await;

        let mut hits: Vec<ScrollHit> = inner
            .documents
            .iter()
            .filter(|((c, _), source)| c == collection && matches(source, request))
            .map(|((_, id), source)| ScrollHit {
                id: id.clone(),
                source: source.clone(),
            })
            .collect();
        // Map iteration order is arbitrary; fix one for repeatable paging
        hits.sort_by(|a, b| a.id.cmp(&b.id));

        let page_size = request.page_size.max(1);
        let remaining = hits.split_off(hits.len().min(page_size));

        inner.next_cursor += 1;
        let cursor = format!("scroll-{}", inner.next_cursor);
        inner.scrolls.insert(
            cursor.clone(),
            Scroll {
                remaining,
                page_size,
            },
        );

        Ok(ScrollPage {
            hits,
            cursor: Some(cursor),
        })
    }

    async fn continue_scroll(&self, cursor: &str, _keep_alive: &str) -> Result<ScrollPage> {
        let mut inner = self.inner.lock().await;

        let scroll = inner
            .scrolls
            .get_mut(cursor)
            .ok_or_else(|| StoreError::Config(format!("unknown scroll cursor: {}", cursor)))?;

        let page_size = scroll.page_size;
        let rest = scroll
            .remaining
            .split_off(scroll.remaining.len().min(page_size));
        let hits = std::mem::replace(&mut scroll.remaining, rest);

        Ok(ScrollPage {
            hits,
            cursor: Some(cursor.to_string()),
        })
    }

    async fn clear_scroll(&self, cursor: &str) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.scrolls.remove(cursor);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
