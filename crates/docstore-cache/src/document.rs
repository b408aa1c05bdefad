//! Persisted cache entry shape

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One store document per cached value.
///
/// `body` holds the cached value serialized to JSON text, round-trippable
/// back to the original structure. `service` and `branch` tag the owning
/// deployment lineage for bulk invalidation. Extra caller-supplied fields
/// are flattened into the document alongside these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheDocument {
    /// Original caller-supplied key, stored verbatim for diagnostics
    pub key: Value,
    /// Cached value as JSON text
    pub body: String,
    /// Timestamp of the last write
    pub created_at: DateTime<Utc>,
    /// Per-entry TTL; entries written by older clients may lack one
    #[serde(default)]
    pub expires_in_seconds: Option<i64>,
    pub service: String,
    pub branch: String,
    /// "production" or "development", derived from the branch
    pub environment: String,
    /// Caller-supplied extra fields merged into the document
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CacheDocument {
    /// True once the entry has outlived its TTL at `now`.
    ///
    /// Entries without their own TTL fall back to `default_ttl_seconds`.
    pub fn is_expired(&self, now: DateTime<Utc>, default_ttl_seconds: i64) -> bool {
        let ttl = self.expires_in_seconds.unwrap_or(default_ttl_seconds);
        now > self.created_at + Duration::seconds(ttl)
    }
}

/// Prepare extra fields for storage: non-primitive values are serialized
/// to JSON text so the store only ever holds flat scalar fields.
pub fn flatten_extra(extra: Map<String, Value>) -> Map<String, Value> {
    extra
        .into_iter()
        .map(|(field, value)| {
            let value = match value {
                Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
                primitive => primitive,
            };
            (field, value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(created_at: DateTime<Utc>, ttl: Option<i64>) -> CacheDocument {
        CacheDocument {
            key: json!("user:42"),
            body: r#"{"name":"Ann"}"#.to_string(),
            created_at,
            expires_in_seconds: ttl,
            service: "poller".to_string(),
            branch: "production".to_string(),
            environment: "production".to_string(),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_fresh_entry_is_not_expired() {
        let now = Utc::now();
        let doc = document(now, Some(3600));
        assert!(!doc.is_expired(now, 3600));
    }

    #[test]
    fn test_entry_past_ttl_is_expired() {
        let now = Utc::now();
        let doc = document(now - Duration::seconds(7200), Some(3600));
        assert!(doc.is_expired(now, 3600));
    }

    #[test]
    fn test_missing_ttl_falls_back_to_default() {
        let now = Utc::now();
        let doc = document(now - Duration::seconds(7200), None);
        assert!(doc.is_expired(now, 3600));
        assert!(!doc.is_expired(now, 86400));
    }

    #[test]
    fn test_flatten_extra_serializes_non_primitives() {
        let mut extra = Map::new();
        extra.insert("count".to_string(), json!(7));
        extra.insert("tags".to_string(), json!(["a", "b"]));
        extra.insert("owner".to_string(), json!({ "id": 1 }));

        let flat = flatten_extra(extra);
        assert_eq!(flat["count"], json!(7));
        assert_eq!(flat["tags"], json!(r#"["a","b"]"#));
        assert_eq!(flat["owner"], json!(r#"{"id":1}"#));
    }

    #[test]
    fn test_document_roundtrips_with_flattened_extras() {
        let mut doc = document(Utc::now(), Some(60));
        doc.extra.insert("mls".to_string(), json!("abc"));

        let value = serde_json::to_value(&doc).unwrap();
        // Flattened extras sit at the top level of the stored document
        assert_eq!(value["mls"], json!("abc"));
        assert_eq!(value["service"], json!("poller"));

        let back: CacheDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back.extra["mls"], json!("abc"));
        assert_eq!(back.expires_in_seconds, Some(60));
    }
}
