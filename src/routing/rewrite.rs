//! Turning a resolved tenant into the request the upstream sees.

use serde::Serialize;

use crate::routing::host::HostClass;
use crate::routing::tenant::TenantId;

/// Where a tenant request is sent upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteTarget {
    /// Path and query forwarded upstream.
    pub internal_path: String,
    /// Value of the tenant header, on both the forwarded request and the
    /// response.
    pub tenant: TenantId,
    /// False for API routes, which keep their path.
    pub path_rewritten: bool,
}

/// Terminal result of routing one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Forward unchanged.
    PassThrough,
    Redirect { location: String },
    /// Empty 404.
    NotFound,
    Rewrite(RewriteTarget),
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::PassThrough => "pass_through",
            Outcome::Redirect { .. } => "redirect",
            Outcome::NotFound => "not_found",
            Outcome::Rewrite(_) => "rewrite",
        }
    }

    pub fn tenant(&self) -> Option<&TenantId> {
        match self {
            Outcome::Rewrite(target) => Some(&target.tenant),
            _ => None,
        }
    }
}

/// Builds tenant rewrites under a fixed internal prefix (`/w`).
#[derive(Debug, Clone)]
pub struct Rewriter {
    prefix: String,
}

impl Rewriter {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Decide the outcome once the tenant is known.
    ///
    /// A production host without a tenant is an unknown custom domain and
    /// must not fall through to the root site.
    pub fn build(
        &self,
        class: HostClass,
        tenant: Option<TenantId>,
        path: &str,
        query_suffix: &str,
        is_api_route: bool,
    ) -> Outcome {
        let Some(tenant) = tenant else {
            return match class {
                HostClass::ProductionHost => Outcome::NotFound,
                _ => Outcome::PassThrough,
            };
        };

        if is_api_route {
            return Outcome::Rewrite(RewriteTarget {
                internal_path: format!("{}{}", path, query_suffix),
                tenant,
                path_rewritten: false,
            });
        }

        Outcome::Rewrite(RewriteTarget {
            internal_path: format!("{}/{}{}{}", self.prefix, tenant, path, query_suffix),
            tenant,
            path_rewritten: true,
        })
    }
}

impl Default for Rewriter {
    fn default() -> Self {
        Self::new("/w")
    }
}
