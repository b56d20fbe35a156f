//! Tenant identifiers and tenant resolution.
//!
//! Hostname conventions are parsed by the small free functions at the top of
//! this file; [`TenantResolver`] only decides which of them applies to a
//! given host class.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lookup::DomainLookup;
use crate::observability::metrics;
use crate::routing::context::RequestContext;
use crate::routing::host::{strip_port, HostClass};

/// Lowercase slug naming one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Build a tenant id; the slug is lowercased and otherwise taken as-is.
    /// Returns `None` for an empty slug.
    pub fn new(slug: &str) -> Option<Self> {
        let slug = slug.trim();
        if slug.is_empty() {
            None
        } else {
            Some(Self(slug.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tenant encoded by the legacy `{tenant}---{deployment}` preview convention.
pub fn legacy_preview_tenant(hostname: &str) -> Option<TenantId> {
    let (tenant, _) = hostname.split_once("---")?;
    TenantId::new(tenant)
}

/// Label preceding `.localhost` (`acme.localhost:3000` → `acme`).
pub fn localhost_subdomain(host: &str) -> Option<TenantId> {
    let bare = strip_port(host);
    let labels = bare.strip_suffix(".localhost")?;
    let first = labels.split('.').next()?;
    TenantId::new(first)
}

/// Label of a direct `{label}.{root_domain}` subdomain. Deeper subdomains
/// do not match.
pub fn root_subdomain(hostname: &str, root_domain: &str) -> Option<TenantId> {
    let label = hostname.strip_suffix(root_domain)?.strip_suffix('.')?;
    if label.contains('.') {
        return None;
    }
    TenantId::new(label)
}

/// Maps a classified host to a tenant.
#[derive(Debug, Clone)]
pub struct TenantResolver {
    root_domain: String,
    query_param: String,
    lookup: Arc<dyn DomainLookup>,
}

impl TenantResolver {
    pub fn new(
        root_domain: impl Into<String>,
        query_param: impl Into<String>,
        lookup: Arc<dyn DomainLookup>,
    ) -> Self {
        Self {
            root_domain: root_domain.into(),
            query_param: query_param.into(),
            lookup,
        }
    }

    /// Resolve the tenant for a request already classified as `class`.
    ///
    /// `None` is an expected answer (root site, preview or dev host without
    /// a tenant, unmapped custom domain); it is never an error.
    pub async fn resolve(&self, class: HostClass, ctx: &RequestContext) -> Option<TenantId> {
        match class {
            HostClass::StaticAsset | HostClass::RootDomain => None,
            HostClass::PreviewHost => self
                .query_tenant(ctx)
                .or_else(|| legacy_preview_tenant(&ctx.hostname)),
            HostClass::LocalhostHost => ctx
                .url_host
                .as_deref()
                .and_then(localhost_subdomain)
                .or_else(|| localhost_subdomain(&ctx.hostname))
                .or_else(|| self.query_tenant(ctx)),
            HostClass::ProductionHost => match root_subdomain(&ctx.hostname, &self.root_domain) {
                Some(tenant) => Some(tenant),
                None => self.lookup_domain(&ctx.hostname).await,
            },
        }
    }

    fn query_tenant(&self, ctx: &RequestContext) -> Option<TenantId> {
        ctx.query_param(&self.query_param).and_then(TenantId::new)
    }

    async fn lookup_domain(&self, hostname: &str) -> Option<TenantId> {
        match self.lookup.lookup(hostname).await {
            Ok(Some(tenant)) => {
                metrics::record_lookup("hit");
                Some(tenant)
            }
            Ok(None) => {
                metrics::record_lookup("miss");
                None
            }
            Err(e) => {
                metrics::record_lookup("error");
                tracing::warn!(host = %hostname, error = %e, "Domain lookup failed, treating as unmapped");
                None
            }
        }
    }
}
