//! Cache configuration
//!
//! Tenancy identity (service and branch) is injected here at construction
//! instead of being read from ambient process state on every call. The
//! kill switch is shared, so operators can flip one flag and disable every
//! facade holding a clone of the config.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Environment variable naming the owning service
pub const SERVICE_ENV: &str = "CACHE_SERVICE";
/// Environment variable naming the deployment branch
pub const BRANCH_ENV: &str = "CACHE_BRANCH";
/// Environment variable for the kill switch ("1" or "true")
pub const DISABLED_ENV: &str = "CACHE_DISABLED";
/// Environment variable overriding the default TTL, in seconds
pub const DEFAULT_TTL_ENV: &str = "CACHE_DEFAULT_TTL";

const DEFAULT_TTL_SECONDS: i64 = 3600;
const DEFAULT_COLLECTION: &str = "cache";
const PRODUCTION_BRANCH: &str = "production";

/// Configuration for a [`DocumentCache`](crate::DocumentCache)
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Service owning the cached entries
    pub service: String,
    /// Deployment branch; isolates lineages sharing one physical store
    pub branch: String,
    /// Fallback TTL for entries written without one
    pub default_ttl_seconds: i64,
    /// Store collection the entries live in
    pub collection: String,
    /// Shared kill switch; when set, every operation fails fast
    pub disabled: Arc<AtomicBool>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            service: String::new(),
            branch: PRODUCTION_BRANCH.to_string(),
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            collection: DEFAULT_COLLECTION.to_string(),
            disabled: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl CacheConfig {
    pub fn new(service: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            branch: branch.into(),
            ..Default::default()
        }
    }

    /// Build a config from the process environment.
    ///
    /// Unset variables fall back to the defaults: empty service,
    /// "production" branch, 3600 second TTL, enabled.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(service) = std::env::var(SERVICE_ENV) {
            config.service = service;
        }
        if let Ok(branch) = std::env::var(BRANCH_ENV) {
            if !branch.is_empty() {
                config.branch = branch;
            }
        }
        if let Ok(ttl) = std::env::var(DEFAULT_TTL_ENV) {
            if let Ok(seconds) = ttl.parse() {
                config.default_ttl_seconds = seconds;
            }
        }
        if let Ok(disabled) = std::env::var(DISABLED_ENV) {
            if matches!(disabled.as_str(), "1" | "true") {
                config.disabled.store(true, Ordering::SeqCst);
            }
        }

        config
    }

    /// Flip the shared kill switch on
    pub fn disable(&self) {
        self.disabled.store(true, Ordering::SeqCst);
    }

    /// Flip the shared kill switch off
    pub fn enable(&self) {
        self.disabled.store(false, Ordering::SeqCst);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Environment classification recorded on stored documents
    pub fn environment(&self) -> &'static str {
        if self.branch == PRODUCTION_BRANCH {
            "production"
        } else {
            "development"
        }
    }
}
