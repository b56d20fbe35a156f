//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the tenant router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// The application every request is forwarded to.
    pub upstream: UpstreamConfig,

    /// Host classification and tenant rewrite settings.
    pub tenancy: TenancyConfig,

    /// Paths that bypass all tenant logic.
    pub static_assets: StaticAssetConfig,

    /// Admin cookie gate.
    pub admin: AdminConfig,

    /// Custom domain → tenant lookup.
    pub lookup: LookupConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Maximum requests handled at once across all connections. Requests
    /// beyond it wait for a slot.
    pub max_in_flight: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
            max_in_flight: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Tenancy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TenancyConfig {
    /// Platform root domain ("sovoli.com", or "localhost:3000" in development).
    /// Overridden by `SOVOLI_ROOT_DOMAIN`.
    pub root_domain: String,

    /// Hosting-provider domains that serve ephemeral preview deployments.
    pub preview_suffixes: Vec<String>,

    /// Query parameter naming an explicit tenant on preview and dev hosts.
    pub tenant_query_param: String,

    /// Header carrying the resolved tenant downstream.
    pub tenant_header: String,

    /// Internal path prefix tenant pages live under.
    pub rewrite_prefix: String,

    /// Prefer `X-Forwarded-Host` over `Host` (only behind a trusted edge).
    pub trust_forwarded_host: bool,
}

impl Default for TenancyConfig {
    fn default() -> Self {
        Self {
            root_domain: "sovoli.com".to_string(),
            preview_suffixes: vec!["vercel.app".to_string()],
            tenant_query_param: "tenant".to_string(),
            tenant_header: "x-tenant".to_string(),
            rewrite_prefix: "/w".to_string(),
            trust_forwarded_host: false,
        }
    }
}

/// Static asset bypass rules.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticAssetConfig {
    /// Path prefixes served without tenant resolution.
    pub prefixes: Vec<String>,

    /// File extensions (without the dot) served without tenant resolution.
    pub extensions: Vec<String>,
}

impl Default for StaticAssetConfig {
    fn default() -> Self {
        let prefixes = ["/_next", "/ingest", "/images/", "/fonts/"];
        let extensions = [
            "svg", "png", "jpg", "jpeg", "gif", "webp", "avif", "ico", "bmp", "js", "mjs", "css",
            "map", "json", "woff", "woff2", "ttf", "otf", "eot",
        ];
        Self {
            prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// Admin gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Login page; also the root of the gated tree.
    pub login_path: String,

    /// Cookie set by the login page once the PIN is accepted.
    pub cookie_name: String,

    /// Value the cookie must carry.
    pub cookie_value: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            login_path: "/admin".to_string(),
            cookie_name: "sovoli_admin_pin".to_string(),
            cookie_value: "ok".to_string(),
        }
    }
}

/// A tenant record as declared by the organization data set.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct OrgRecord {
    /// Tenant username (slug).
    pub username: String,

    /// Custom domain served for this tenant, if any.
    #[serde(default)]
    pub domain: Option<String>,
}

/// Custom domain lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LookupConfig {
    /// Inline org records.
    pub orgs: Vec<OrgRecord>,

    /// JSON file holding an array of org records, merged with `orgs`.
    pub orgs_file: Option<String>,

    /// Network-backed lookup consulted when set (replaces the static table).
    pub http: Option<HttpLookupConfig>,
}

/// Network-backed lookup settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpLookupConfig {
    /// Base URL; the domain is appended as the last path segment.
    pub url: String,

    /// Per-lookup timeout in milliseconds.
    #[serde(default = "default_lookup_timeout_ms")]
    pub timeout_ms: u64,

    /// Cache lifetime for lookup answers; 0 disables caching.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_lookup_timeout_ms() -> u64 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    60
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Upstream response timeout in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 25,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
