//! Custom domain → tenant lookup.
//!
//! # Data Flow
//! ```text
//! LookupConfig
//!     → table.rs (org records compiled into an immutable map)   [default]
//!     → http.rs  (network lookup service, with timeout)          [lookup.http]
//!         → cache.rs (short-lived answers, hits and misses)
//!     → Arc<dyn DomainLookup> handed to the tenant resolver
//! ```
//!
//! # Design Decisions
//! - Built once at startup and injected; no global tables
//! - Keys are case-insensitive
//! - Errors are reported to the caller, which treats them as "unmapped"

pub mod cache;
pub mod http;
pub mod table;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LookupConfig;
use crate::routing::tenant::TenantId;

pub use cache::CachedLookup;
pub use http::HttpDomainLookup;
pub use table::DomainTable;

/// Error type for lookups backed by fallible I/O.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("lookup transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("lookup service answered with status {0}")]
    Status(u16),
    #[error("lookup service URL cannot take a domain segment: {0}")]
    BaseUrl(String),
}

/// Resolves a custom domain to the tenant that claims it.
#[async_trait]
pub trait DomainLookup: Send + Sync + std::fmt::Debug {
    /// `Ok(None)` means the domain is not mapped.
    async fn lookup(&self, domain: &str) -> Result<Option<TenantId>, LookupError>;
}

/// Build the lookup described by the configuration.
pub fn from_config(config: &LookupConfig) -> Result<Arc<dyn DomainLookup>, LookupError> {
    match &config.http {
        Some(http) => {
            let service = HttpDomainLookup::new(&http.url, Duration::from_millis(http.timeout_ms))?;
            tracing::info!(url = %http.url, timeout_ms = http.timeout_ms, "Using HTTP domain lookup");
            if http.cache_ttl_secs == 0 {
                Ok(Arc::new(service))
            } else {
                Ok(Arc::new(CachedLookup::new(
                    service,
                    Duration::from_secs(http.cache_ttl_secs),
                )))
            }
        }
        None => {
            let table = DomainTable::from_records(&config.orgs);
            tracing::info!(domains = table.len(), "Loaded custom domain table");
            Ok(Arc::new(table))
        }
    }
}
