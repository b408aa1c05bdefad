//! Request and result shapes shared by store implementations

use serde_json::Value;

/// Default number of hits fetched per scroll page
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Default cursor keep-alive between pages
pub const DEFAULT_KEEP_ALIVE: &str = "60m";

/// Exact-match filter on a single document field
#[derive(Debug, Clone)]
pub struct TermFilter {
    pub field: String,
    pub value: Value,
}

impl TermFilter {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Bounded search over one collection, opening a cursor over the result set
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Filters the document must match, all of them
    pub filters: Vec<TermFilter>,
    /// Hits per page
    pub page_size: usize,
    /// Optional sort field
    pub sort: Option<String>,
    /// How long the server keeps the cursor alive between pages
    pub keep_alive: String,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
            sort: None,
            keep_alive: DEFAULT_KEEP_ALIVE.to_string(),
        }
    }
}

/// One matching document
#[derive(Debug, Clone)]
pub struct ScrollHit {
    pub id: String,
    pub source: Value,
}

/// One page of results plus the cursor for the next page
#[derive(Debug, Clone)]
pub struct ScrollPage {
    pub hits: Vec<ScrollHit>,
    pub cursor: Option<String>,
}
