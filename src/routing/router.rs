//! The tenant routing pipeline.
//!
//! # Responsibilities
//! - Run every stage in order for one request
//! - Return exactly one terminal outcome
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Single pass: no stage is revisited and nothing is retried
//! - Deterministic: the same request always yields the same outcome for a
//!   given lookup snapshot

use std::sync::Arc;

use serde::Serialize;

use crate::admin::{AdminAccess, AdminGate};
use crate::config::RouterConfig;
use crate::lookup::DomainLookup;
use crate::routing::context::RequestContext;
use crate::routing::host::{HostClass, HostClassifier};
use crate::routing::matcher::{should_route, StaticAssetMatcher};
use crate::routing::rewrite::{Outcome, Rewriter};
use crate::routing::tenant::TenantResolver;

/// Outcome plus the host class it was reached through. `class` is `None`
/// when the host was never classified (unmatched path or admin gate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub class: Option<HostClass>,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl Decision {
    fn unclassified(outcome: Outcome) -> Self {
        Self {
            class: None,
            outcome,
        }
    }

    pub fn class_label(&self) -> &'static str {
        self.class.map(HostClass::as_str).unwrap_or("none")
    }
}

/// Compiled router: matchers, gate, classifier, resolver and rewriter.
#[derive(Debug, Clone)]
pub struct TenantRouter {
    assets: StaticAssetMatcher,
    admin: AdminGate,
    hosts: HostClassifier,
    resolver: TenantResolver,
    rewriter: Rewriter,
}

impl TenantRouter {
    /// Compile a router from validated configuration.
    pub fn from_config(config: &RouterConfig, lookup: Arc<dyn DomainLookup>) -> Self {
        let tenancy = &config.tenancy;
        Self {
            assets: StaticAssetMatcher::new(&config.static_assets),
            admin: AdminGate::new(&config.admin),
            hosts: HostClassifier::new(tenancy.root_domain.clone(), &tenancy.preview_suffixes),
            resolver: TenantResolver::new(
                tenancy.root_domain.clone(),
                tenancy.tenant_query_param.clone(),
                lookup,
            ),
            rewriter: Rewriter::new(&tenancy.rewrite_prefix),
        }
    }

    pub fn root_domain(&self) -> &str {
        self.hosts.root_domain()
    }

    /// Route one request.
    pub async fn route(&self, ctx: &RequestContext) -> Decision {
        if !should_route(&ctx.path) {
            return Decision::unclassified(Outcome::PassThrough);
        }

        if self.assets.is_static_asset(&ctx.path) {
            return Decision {
                class: Some(HostClass::StaticAsset),
                outcome: Outcome::PassThrough,
            };
        }

        // Admin paths never get tenant treatment.
        if self.admin.is_admin_path(&ctx.path) {
            let outcome = match self.admin.check(ctx) {
                AdminAccess::Allow => Outcome::PassThrough,
                AdminAccess::Redirect { location } => Outcome::Redirect { location },
            };
            return Decision::unclassified(outcome);
        }

        let class = self.hosts.classify(&ctx.hostname);
        let tenant = self.resolver.resolve(class, ctx).await;
        let outcome = self.rewriter.build(
            class,
            tenant,
            &ctx.path,
            &ctx.query_suffix(),
            ctx.is_api_route,
        );

        tracing::debug!(
            host = %ctx.hostname,
            path = %ctx.path,
            class = class.as_str(),
            tenant = ?outcome.tenant().map(|t| t.as_str()),
            outcome = outcome.as_str(),
            "Routing decision"
        );

        Decision {
            class: Some(class),
            outcome,
        }
    }
}
