//! Host classification.
//!
//! # Responsibilities
//! - Categorize a lowercased hostname against the configured root domain
//! - Keep the precedence between categories explicit
//!
//! # Design Decisions
//! - Predicates are evaluated in a fixed order, first match wins
//! - Preview hosts are recognized before anything else so a preview URL can
//!   never be mistaken for a custom domain
//! - Localhost is checked before the root domain: in development the root
//!   domain itself is a localhost address and `?tenant=` must still work
//! - Anything unmatched is a production host (custom domain or subdomain)

use std::net::{IpAddr, Ipv6Addr};

use serde::Serialize;

/// Category of an incoming request's host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HostClass {
    /// Path bypasses tenant logic; the host is never inspected.
    StaticAsset,
    RootDomain,
    PreviewHost,
    LocalhostHost,
    ProductionHost,
}

impl HostClass {
    pub fn as_str(self) -> &'static str {
        match self {
            HostClass::StaticAsset => "static_asset",
            HostClass::RootDomain => "root_domain",
            HostClass::PreviewHost => "preview_host",
            HostClass::LocalhostHost => "localhost_host",
            HostClass::ProductionHost => "production_host",
        }
    }
}

type HostPredicate = fn(&HostClassifier, &str) -> bool;

/// Ordered classification rules. Production is the fallback.
const CLASSIFICATION_ORDER: [(HostClass, HostPredicate); 3] = [
    (HostClass::PreviewHost, HostClassifier::is_preview),
    (HostClass::LocalhostHost, HostClassifier::is_localhost),
    (HostClass::RootDomain, HostClassifier::is_root),
];

/// Classifies hostnames for one root domain.
#[derive(Debug, Clone)]
pub struct HostClassifier {
    root_domain: String,
    www_root_domain: String,
    preview_suffixes: Vec<String>,
}

impl HostClassifier {
    /// `root_domain` must already be normalized (lowercase, no `www.`).
    pub fn new(root_domain: impl Into<String>, preview_suffixes: &[String]) -> Self {
        let root_domain = root_domain.into();
        Self {
            www_root_domain: format!("www.{}", root_domain),
            root_domain,
            preview_suffixes: preview_suffixes
                .iter()
                .map(|s| format!(".{}", s.trim_start_matches('.').to_lowercase()))
                .collect(),
        }
    }

    pub fn root_domain(&self) -> &str {
        &self.root_domain
    }

    /// Classify a lowercased hostname (port allowed).
    pub fn classify(&self, hostname: &str) -> HostClass {
        CLASSIFICATION_ORDER
            .iter()
            .find(|(_, matches)| matches(self, hostname))
            .map(|(class, _)| *class)
            .unwrap_or(HostClass::ProductionHost)
    }

    /// Ephemeral deployment host using either naming convention.
    pub fn is_preview(&self, hostname: &str) -> bool {
        let bare = strip_port(hostname);
        self.preview_suffixes.iter().any(|s| bare.ends_with(s.as_str()))
            && (bare.contains("---") || bare.contains("-git-"))
    }

    pub fn is_localhost(&self, hostname: &str) -> bool {
        is_local_host(hostname)
    }

    pub fn is_root(&self, hostname: &str) -> bool {
        hostname == self.root_domain || hostname == self.www_root_domain
    }
}

/// Loopback names, `*.localhost`, loopback addresses and private IPv4
/// ranges.
pub fn is_local_host(hostname: &str) -> bool {
    let bare = strip_port(hostname);
    if bare == "localhost" || bare.ends_with(".localhost") {
        return true;
    }
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => ip.is_loopback() || ip.is_private(),
        Ok(IpAddr::V6(ip)) => ip.is_loopback(),
        Err(_) => false,
    }
}

/// Hostname without a trailing `:port`. Bracketed IPv6 literals
/// (`[::1]:3000`) come back without their brackets.
pub fn strip_port(host: &str) -> &str {
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split_once(']').map(|(ip, _)| ip).unwrap_or(host);
    }
    if host.parse::<Ipv6Addr>().is_ok() {
        return host;
    }
    host.split(':').next().unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> HostClassifier {
        HostClassifier::new("sovoli.com", &["vercel.app".to_string()])
    }

    #[test]
    fn test_root_domain() {
        let c = classifier();
        assert_eq!(c.classify("sovoli.com"), HostClass::RootDomain);
        assert_eq!(c.classify("www.sovoli.com"), HostClass::RootDomain);
        assert_eq!(c.classify("acme.sovoli.com"), HostClass::ProductionHost);
    }

    #[test]
    fn test_preview_conventions() {
        let c = classifier();
        assert_eq!(c.classify("tenant123---abcdef.vercel.app"), HostClass::PreviewHost);
        assert_eq!(c.classify("foo-git-branch.vercel.app"), HostClass::PreviewHost);
        // Neither convention: someone else's project on the provider.
        assert_eq!(c.classify("plainproject.vercel.app"), HostClass::ProductionHost);
        // Convention without the provider suffix.
        assert_eq!(c.classify("foo-git-branch.example.com"), HostClass::ProductionHost);
    }

    #[test]
    fn test_localhost_variants() {
        let c = classifier();
        for host in [
            "localhost",
            "localhost:3000",
            "127.0.0.1:3000",
            "acme.localhost:3000",
            "10.0.0.7",
            "172.16.4.2:8080",
            "172.31.255.1",
            "192.168.1.20:3000",
        ] {
            assert_eq!(c.classify(host), HostClass::LocalhostHost, "{host}");
        }
    }

    #[test]
    fn test_ipv6_hosts() {
        let c = classifier();
        assert_eq!(c.classify("[::1]:3000"), HostClass::LocalhostHost);
        assert_eq!(c.classify("[::1]"), HostClass::LocalhostHost);
        assert_eq!(c.classify("[2001:db8::1]:443"), HostClass::ProductionHost);
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("acme.localhost:3000"), "acme.localhost");
        assert_eq!(strip_port("sovoli.com"), "sovoli.com");
        assert_eq!(strip_port("[::1]:3000"), "::1");
        assert_eq!(strip_port("::1"), "::1");
    }

    #[test]
    fn test_public_ip_is_production() {
        let c = classifier();
        assert_eq!(c.classify("8.8.8.8"), HostClass::ProductionHost);
        assert_eq!(c.classify("172.32.0.1"), HostClass::ProductionHost);
    }

    #[test]
    fn test_localhost_beats_localhost_root_domain() {
        let c = HostClassifier::new("localhost:3000", &["vercel.app".to_string()]);
        assert_eq!(c.classify("localhost:3000"), HostClass::LocalhostHost);
        assert_eq!(c.classify("acme.localhost:3000"), HostClass::LocalhostHost);
    }

    #[test]
    fn test_suffix_normalization() {
        let c = HostClassifier::new("sovoli.com", &[".Vercel.App".to_string()]);
        assert_eq!(c.classify("x---y.vercel.app"), HostClass::PreviewHost);
    }
}
