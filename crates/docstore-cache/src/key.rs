//! Cache keys and deterministic document ids
//!
//! A key is plain text or a structured JSON value. The store document id
//! is a one-way hash of the key's canonical form concatenated with the
//! deployment branch, so the same key on different branches never collides.

use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{CacheError, Result};

/// Caller-supplied cache key
#[derive(Debug, Clone, PartialEq)]
pub enum CacheKey {
    Text(String),
    Structured(Value),
}

impl CacheKey {
    /// Canonical string form of the key.
    ///
    /// Structured keys serialize with lexicographically ordered object
    /// keys, so the same value always produces the same string regardless
    /// of how the caller assembled it. Empty text and JSON null are
    /// rejected before any store round-trip.
    pub fn canonical(&self) -> Result<String> {
        match self {
            CacheKey::Text(text) if text.is_empty() => Err(CacheError::EmptyKey),
            CacheKey::Text(text) => Ok(text.clone()),
            CacheKey::Structured(Value::Null) => Err(CacheError::EmptyKey),
            CacheKey::Structured(value) => {
                serde_json::to_string(value).map_err(CacheError::Encoding)
            }
        }
    }

    /// Store document id for this key under `branch`
    pub fn document_id(&self, branch: &str) -> Result<String> {
        if branch.is_empty() {
            return Err(CacheError::MissingBranch);
        }

        let canonical = self.canonical()?;
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        hasher.update(branch.as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }

    /// The key as stored verbatim on the document for diagnostics
    pub(crate) fn as_value(&self) -> Value {
        match self {
            CacheKey::Text(text) => Value::String(text.clone()),
            CacheKey::Structured(value) => value.clone(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Text(text) => f.write_str(text),
            CacheKey::Structured(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for CacheKey {
    fn from(text: &str) -> Self {
        CacheKey::Text(text.to_string())
    }
}

impl From<String> for CacheKey {
    fn from(text: String) -> Self {
        CacheKey::Text(text)
    }
}

impl From<Value> for CacheKey {
    fn from(value: Value) -> Self {
        CacheKey::Structured(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_id_is_deterministic() {
        let key = CacheKey::from("user:42");
        assert_eq!(
            key.document_id("production").unwrap(),
            key.document_id("production").unwrap()
        );
    }

    #[test]
    fn test_id_is_hex_sha256() {
        let id = CacheKey::from("user:42").document_id("production").unwrap();
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_branches_do_not_collide() {
        let key = CacheKey::from("user:42");
        assert_ne!(
            key.document_id("production").unwrap(),
            key.document_id("feature-x").unwrap()
        );
    }

    #[test]
    fn test_structured_key_is_order_independent() {
        let a = CacheKey::from(json!({ "mls": "abc", "user": 42 }));
        let b = CacheKey::from(json!({ "user": 42, "mls": "abc" }));
        assert_eq!(
            a.document_id("production").unwrap(),
            b.document_id("production").unwrap()
        );
    }

    #[test]
    fn test_text_form_of_canonical_json_yields_same_id() {
        let text = CacheKey::from(r#"{"user":42}"#);
        let structured = CacheKey::from(json!({ "user": 42 }));
        // Same canonical string, same id: text form of the canonical JSON
        // is indistinguishable from the structured key by construction
        assert_eq!(
            text.document_id("production").unwrap(),
            structured.document_id("production").unwrap()
        );
    }

    #[test]
    fn test_empty_key_is_rejected() {
        assert!(matches!(
            CacheKey::from("").document_id("production"),
            Err(CacheError::EmptyKey)
        ));
        assert!(matches!(
            CacheKey::from(Value::Null).document_id("production"),
            Err(CacheError::EmptyKey)
        ));
    }

    #[test]
    fn test_empty_branch_is_rejected() {
        assert!(matches!(
            CacheKey::from("user:42").document_id(""),
            Err(CacheError::MissingBranch)
        ));
    }

    #[test]
    fn test_display_shows_original_key() {
        assert_eq!(format!("{}", CacheKey::from("user:42")), "user:42");
        assert_eq!(
            format!("{}", CacheKey::from(json!({ "user": 42 }))),
            r#"{"user":42}"#
        );
    }
}
