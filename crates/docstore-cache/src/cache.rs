//! Document-store cache facade

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use docstore_client::{scroll_each, DocumentStore, ScrollError, ScrollHit, SearchRequest, TermFilter};

use crate::config::CacheConfig;
use crate::document::{flatten_extra, CacheDocument};
use crate::error::{CacheError, Result};
use crate::key::CacheKey;

/// Cache facade over a searchable document store.
///
/// Values are stored one document per key, under an id derived from the
/// key and the deployment branch. Expiry is judged at read time only; an
/// expired document stays in the store until overwritten or flushed.
pub struct DocumentCache<S> {
    store: S,
    config: CacheConfig,
}

impl<S: DocumentStore> DocumentCache<S> {
    pub fn new(store: S, config: CacheConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn guard(&self) -> Result<()> {
        if self.config.is_disabled() {
            return Err(CacheError::Disabled);
        }
        Ok(())
    }

    /// Read a cached value.
    ///
    /// Misses, expired entries and store failures all come back as
    /// `Ok(None)`; a read never fails because the store is unreachable.
    /// The one surfaced fault is a stored document that cannot be
    /// decoded, which signals corruption rather than absence.
    pub async fn get<T, K>(&self, key: K) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        K: Into<CacheKey>,
    {
        self.guard()?;
        let key = key.into();
        let id = key.document_id(&self.config.branch)?;

        debug!(key = %key, "requesting cache");
        let source = match self.store.get_by_id(&self.config.collection, &id).await {
            Ok(Some(source)) => source,
            Ok(None) => {
                debug!(key = %key, "cache miss");
                return Ok(None);
            }
            Err(err) => {
                warn!(key = %key, error = %err, "could not retrieve cache, treating as miss");
                return Ok(None);
            }
        };

        let document: CacheDocument = serde_json::from_value(source).map_err(|err| {
            error!(key = %key, error = %err, "stored cache document has unexpected shape");
            CacheError::Corrupt(err.to_string())
        })?;

        let body: T = serde_json::from_str(&document.body).map_err(|err| {
            error!(key = %key, error = %err, "stored cache body failed to decode");
            CacheError::Corrupt(err.to_string())
        })?;

        if document.is_expired(Utc::now(), self.config.default_ttl_seconds) {
            debug!(key = %key, "cache entry expired, returning miss");
            return Ok(None);
        }

        debug!(key = %key, "cache hit");
        Ok(Some(body))
    }

    /// Write a value under `key`, overwriting any previous entry.
    ///
    /// `ttl_seconds` falls back to the configured default. Extra fields
    /// are merged into the stored document; non-primitive values are
    /// serialized to JSON text first. Unlike reads, a failed write is
    /// surfaced: callers depend on write success to reason about
    /// subsequent reads.
    pub async fn set<T, K>(
        &self,
        key: K,
        body: &T,
        ttl_seconds: Option<i64>,
        extra: Option<Map<String, Value>>,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
        K: Into<CacheKey>,
    {
        self.guard()?;
        if self.config.service.is_empty() {
            return Err(CacheError::MissingService);
        }
        let key = key.into();
        let id = key.document_id(&self.config.branch)?;

        let document = CacheDocument {
            key: key.as_value(),
            body: serde_json::to_string(body).map_err(CacheError::Encoding)?,
            created_at: Utc::now(),
            expires_in_seconds: Some(ttl_seconds.unwrap_or(self.config.default_ttl_seconds)),
            service: self.config.service.clone(),
            branch: self.config.branch.clone(),
            environment: self.config.environment().to_string(),
            extra: flatten_extra(extra.unwrap_or_default()),
        };
        let source = serde_json::to_value(&document).map_err(CacheError::Encoding)?;

        debug!(key = %key, id = %id, "indexing cache");
        match self.store.upsert(&self.config.collection, &id, &source).await {
            Ok(()) => {
                debug!(key = %key, "successfully indexed cache");
                Ok(())
            }
            Err(err) => {
                error!(key = %key, error = %err, "could not index the cache");
                Err(CacheError::Store(err))
            }
        }
    }

    /// Delete the entry for `key`. Deleting a missing entry is success.
    pub async fn flush<K: Into<CacheKey>>(&self, key: K) -> Result<()> {
        self.guard()?;
        let key = key.into();
        let id = key.document_id(&self.config.branch)?;

        debug!(key = %key, id = %id, "flushing cache");
        match self.store.delete_by_id(&self.config.collection, &id).await {
            Ok(()) => {
                debug!(key = %key, "successfully removed cache");
                Ok(())
            }
            Err(err) => {
                error!(key = %key, error = %err, "could not remove the cache");
                Err(CacheError::Store(err))
            }
        }
    }

    /// Delete every entry owned by this service and branch.
    ///
    /// Scrolls the store for matching documents and flushes them one at a
    /// time by their stored key; the first failure aborts the sweep, so a
    /// partial sweep surfaces as an error rather than silently leaving
    /// stale entries behind. Returns the number of entries flushed. A
    /// sweep that matches nothing succeeds with 0.
    pub async fn flush_service_cache(&self) -> Result<u64> {
        self.guard()?;
        if self.config.service.is_empty() {
            return Err(CacheError::MissingService);
        }
        if self.config.branch.is_empty() {
            return Err(CacheError::MissingBranch);
        }

        let request = SearchRequest {
            filters: vec![
                TermFilter::new("service", self.config.service.clone()),
                TermFilter::new("branch", self.config.branch.clone()),
            ],
            ..Default::default()
        };

        debug!(
            service = %self.config.service,
            branch = %self.config.branch,
            "flushing service cache"
        );

        let result = scroll_each(&self.store, &self.config.collection, &request, |hit| {
            self.flush_hit(hit)
        })
        .await;

        match result {
            Ok(flushed) => {
                debug!(flushed, "service cache flushed");
                Ok(flushed)
            }
            Err(ScrollError::Store(err)) => Err(CacheError::Store(err)),
            Err(ScrollError::Handler(err)) => Err(err),
        }
    }

    /// Flush one swept document by the key stored on it
    async fn flush_hit(&self, hit: ScrollHit) -> Result<()> {
        let key = match hit.source.get("key") {
            Some(Value::String(text)) => CacheKey::Text(text.clone()),
            Some(value) => CacheKey::Structured(value.clone()),
            None => {
                return Err(CacheError::Corrupt(format!(
                    "swept document {} has no key field",
                    hit.id
                )))
            }
        };
        self.flush(key).await
    }
}
