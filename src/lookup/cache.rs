//! Short-lived cache in front of a network-backed lookup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::lookup::{DomainLookup, LookupError};
use crate::observability::metrics;
use crate::routing::tenant::TenantId;

/// Entry count above which expired answers are swept on insert.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
struct CachedAnswer {
    tenant: Option<TenantId>,
    stored_at: Instant,
}

/// Caches hits and misses for `ttl`. Errors are never cached.
#[derive(Debug, Clone)]
pub struct CachedLookup<L> {
    inner: L,
    ttl: Duration,
    answers: Arc<DashMap<String, CachedAnswer>>,
}

impl<L: DomainLookup> CachedLookup<L> {
    pub fn new(inner: L, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            answers: Arc::new(DashMap::new()),
        }
    }

    /// Number of stored answers, expired ones included.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    fn fresh(&self, key: &str) -> Option<Option<TenantId>> {
        let entry = self.answers.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(entry.tenant.clone())
        } else {
            None
        }
    }

    fn store(&self, key: String, tenant: Option<TenantId>) {
        if self.answers.len() >= SWEEP_THRESHOLD {
            let ttl = self.ttl;
            self.answers.retain(|_, answer| answer.stored_at.elapsed() < ttl);
        }
        self.answers.insert(
            key,
            CachedAnswer {
                tenant,
                stored_at: Instant::now(),
            },
        );
    }
}

#[async_trait]
impl<L: DomainLookup> DomainLookup for CachedLookup<L> {
    async fn lookup(&self, domain: &str) -> Result<Option<TenantId>, LookupError> {
        let key = domain.to_lowercase();
        if let Some(answer) = self.fresh(&key) {
            metrics::record_lookup_cache(true);
            return Ok(answer);
        }
        metrics::record_lookup_cache(false);

        let tenant = self.inner.lookup(&key).await?;
        self.store(key, tenant.clone());
        Ok(tenant)
    }
}
