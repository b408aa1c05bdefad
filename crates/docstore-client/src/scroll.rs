//! Cursor-based enumeration over large result sets
//!
//! Opens a search cursor and walks the result set page by page, invoking a
//! handler for every hit ([`scroll_each`]) or every page ([`scroll_batches`]).
//! Pages are strictly sequential: the next page is requested only after the
//! current page's handler calls have completed. A handler error aborts the
//! walk; an empty page ends it.

use std::fmt;
use std::future::Future;

use tracing::{debug, warn};

use crate::error::StoreError;
use crate::store::DocumentStore;
use crate::types::{ScrollHit, SearchRequest};

/// Errors ending an enumeration early
#[derive(Debug)]
pub enum ScrollError<E> {
    /// The store failed while opening or advancing the cursor
    Store(StoreError),
    /// The handler aborted the walk
    Handler(E),
}

impl<E: fmt::Display> fmt::Display for ScrollError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScrollError::Store(err) => write!(f, "scroll failed: {}", err),
            ScrollError::Handler(err) => write!(f, "scroll handler failed: {}", err),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for ScrollError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScrollError::Store(err) => Some(err),
            ScrollError::Handler(err) => Some(err),
        }
    }
}

/// Walk every hit matching `request`, one at a time, in store order.
///
/// Returns the number of hits handled. Zero matches is a successful empty
/// walk. The first handler error or store failure aborts the enumeration
/// and is returned; hits already handled stay handled.
pub async fn scroll_each<S, F, Fut, E>(
    store: &S,
    collection: &str,
    request: &SearchRequest,
    mut handler: F,
) -> Result<u64, ScrollError<E>>
where
    S: DocumentStore + ?Sized,
    F: FnMut(ScrollHit) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let first = store
        .search(collection, request)
        .await
        .map_err(ScrollError::Store)?;
    debug!(collection, hits = first.hits.len(), "scroll opened");

    let mut cursor = first.cursor;
    let mut hits = first.hits;
    let mut handled: u64 = 0;

    while !hits.is_empty() {
        for hit in hits {
            debug!(id = %hit.id, "handling scroll hit");
            if let Err(err) = handler(hit).await {
                release_cursor(store, cursor.as_deref()).await;
                return Err(ScrollError::Handler(err));
            }
            handled += 1;
        }

        let Some(token) = cursor.clone() else {
            break;
        };
        match store.continue_scroll(&token, &request.keep_alive).await {
            Ok(page) => {
                if page.cursor.is_some() {
                    cursor = page.cursor;
                }
                hits = page.hits;
            }
            Err(err) => {
                release_cursor(store, Some(&token)).await;
                return Err(ScrollError::Store(err));
            }
        }
    }

    release_cursor(store, cursor.as_deref()).await;
    debug!(collection, handled, "scroll complete");
    Ok(handled)
}

/// Walk the result set one page at a time.
///
/// Explicit opt-in for callers that issue one bulk operation per page
/// instead of one operation per hit. Same ordering and abort semantics as
/// [`scroll_each`]; returns the number of hits delivered across all pages.
pub async fn scroll_batches<S, F, Fut, E>(
    store: &S,
    collection: &str,
    request: &SearchRequest,
    mut handler: F,
) -> Result<u64, ScrollError<E>>
where
    S: DocumentStore + ?Sized,
    F: FnMut(Vec<ScrollHit>) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let first = store
        .search(collection, request)
        .await
        .map_err(ScrollError::Store)?;
    debug!(collection, hits = first.hits.len(), "scroll opened");

    let mut cursor = first.cursor;
    let mut hits = first.hits;
    let mut handled: u64 = 0;

    while !hits.is_empty() {
        let batch = hits.len() as u64;
        if let Err(err) = handler(hits).await {
            release_cursor(store, cursor.as_deref()).await;
            return Err(ScrollError::Handler(err));
        }
        handled += batch;

        let Some(token) = cursor.clone() else {
            break;
        };
        match store.continue_scroll(&token, &request.keep_alive).await {
            Ok(page) => {
                if page.cursor.is_some() {
                    cursor = page.cursor;
                }
                hits = page.hits;
            }
            Err(err) => {
                release_cursor(store, Some(&token)).await;
                return Err(ScrollError::Store(err));
            }
        }
    }

    release_cursor(store, cursor.as_deref()).await;
    debug!(collection, handled, "scroll complete");
    Ok(handled)
}

/// Best-effort release of a server-held cursor
async fn release_cursor<S: DocumentStore + ?Sized>(store: &S, cursor: Option<&str>) {
    if let Some(token) = cursor {
        if let Err(err) = store.clear_scroll(token).await {
            warn!(error = %err, "failed to release scroll cursor");
        }
    }
}
