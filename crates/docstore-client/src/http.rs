//! HTTP store driver
//!
//! Speaks the Elasticsearch-compatible REST protocol: single-document CRUD
//! under `/{collection}/_doc/{id}`, searches under `/{collection}/_search`,
//! and cursor continuation under `/_search/scroll`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::store::DocumentStore;
use crate::types::{ScrollHit, ScrollPage, SearchRequest, TermFilter};

/// Environment variable naming the store address
pub const ADDRESS_ENV: &str = "ES_ADDRESS";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(320);

/// Raw get-by-id response envelope (internal)
#[derive(Debug, Deserialize)]
struct RawGetResponse {
    found: bool,
    #[serde(rename = "_source")]
    source: Option<Value>,
}

/// Raw search/scroll response envelope (internal)
#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(rename = "_scroll_id")]
    scroll_id: Option<String>,
    hits: RawHits,
}

#[derive(Debug, Deserialize)]
struct RawHits {
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: Value,
}

impl From<RawSearchResponse> for ScrollPage {
    fn from(raw: RawSearchResponse) -> Self {
        ScrollPage {
            hits: raw
                .hits
                .hits
                .into_iter()
                .map(|hit| ScrollHit {
                    id: hit.id,
                    source: hit.source,
                })
                .collect(),
            cursor: raw.scroll_id,
        }
    }
}

/// HTTP client for an Elasticsearch-compatible document store
#[derive(Clone)]
pub struct HttpDocumentStore {
    http: reqwest::Client,
    base_url: String,
}

impl HttpDocumentStore {
    /// Create a driver with the default request timeout
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a driver with a custom request timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a driver from the `ES_ADDRESS` environment variable
    pub fn from_env() -> Result<Self> {
        match std::env::var(ADDRESS_ENV) {
            Ok(address) if !address.is_empty() => Ok(Self::new(&address)),
            _ => Err(StoreError::Config(format!("{} is not set", ADDRESS_ENV))),
        }
    }

    fn doc_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}/_doc/{}",
            self.base_url,
            urlencoding::encode(collection),
            urlencoding::encode(id)
        )
    }

    fn status_error(operation: &str, status: StatusCode) -> StoreError {
        StoreError::Api(format!("{} returned status {}", operation, status))
    }
}

/// Render one term filter as a query clause
fn term_clause(filter: &TermFilter) -> Value {
    let mut term = serde_json::Map::new();
    term.insert(filter.field.clone(), filter.value.clone());
    json!({ "term": term })
}

/// Build the search body for a request
fn search_body(request: &SearchRequest) -> Value {
    let clauses: Vec<Value> = request.filters.iter().map(term_clause).collect();

    let mut body = json!({
        "query": { "bool": { "filter": clauses } },
        "size": request.page_size,
    });
    if let Some(ref sort) = request.sort {
        body["sort"] = json!([sort]);
    }
    body
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn get_by_id(&self, collection: &str, id: &str) -> Result<Option<Value>> {
        let response = self.http.get(self.doc_url(collection, id)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::status_error("get", response.status()));
        }

        let raw: RawGetResponse = response.json().await?;
        if !raw.found {
            return Ok(None);
        }
        Ok(raw.source)
    }

    async fn upsert(&self, collection: &str, id: &str, document: &Value) -> Result<()> {
        let response = self
            .http
            .put(self.doc_url(collection, id))
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error("index", response.status()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<()> {
        let response = self.http.delete(self.doc_url(collection, id)).send().await?;

        // Deleting a missing document is success
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        if !response.status().is_success() {
            return Err(Self::status_error("delete", response.status()));
        }
        Ok(())
    }

    async fn search(&self, collection: &str, request: &SearchRequest) -> Result<ScrollPage> {
        let url = format!(
            "{}/{}/_search?scroll={}",
            self.base_url,
            urlencoding::encode(collection),
            urlencoding::encode(&request.keep_alive)
        );

        let response = self
            .http
            .post(&url)
            .json(&search_body(request))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error("search", response.status()));
        }

        let raw: RawSearchResponse = response.json().await?;
        Ok(raw.into())
    }

    async fn continue_scroll(&self, cursor: &str, keep_alive: &str) -> Result<ScrollPage> {
        let url = format!("{}/_search/scroll", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&json!({ "scroll": keep_alive, "scroll_id": cursor }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error("scroll", response.status()));
        }

        let raw: RawSearchResponse = response.json().await?;
        Ok(raw.into())
    }

    async fn clear_scroll(&self, cursor: &str) -> Result<()> {
        let url = format!("{}/_search/scroll", self.base_url);

        let response = self
            .http
            .delete(&url)
            .json(&json!({ "scroll_id": [cursor] }))
            .send()
            .await?;

        // An already-expired cursor comes back as 404
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(Self::status_error("clear scroll", response.status()))
    }

    async fn ping(&self) -> Result<()> {
        let response = self.http.get(&self.base_url).send().await?;

        if !response.status().is_success() {
            return Err(Self::status_error("ping", response.status()));
        }
        Ok(())
    }
}
