//! Path matching ahead of tenant resolution.
//!
//! # Responsibilities
//! - Decide whether the tenant pipeline runs for a path at all
//! - Recognize static assets that bypass tenant logic
//!
//! # Design Decisions
//! - Path matching is case-sensitive, extension matching is not
//! - No regex: prefix and suffix checks only

use crate::config::StaticAssetConfig;
use crate::routing::context::is_api_path;

/// Public files that live at the site root but are still served per tenant.
const TENANT_ROOT_FILES: [&str; 2] = ["/sitemap.xml", "/robots.txt"];

/// Framework output that is never tenant-scoped.
const EXCLUDED_PREFIXES: [&str; 2] = ["/_next/static", "/_next/image"];

/// Outer matcher: which paths enter the routing pipeline.
///
/// Everything is included except framework output and files with an
/// extension; API routes and the tenant root files are always included.
pub fn should_route(path: &str) -> bool {
    if is_api_path(path) || TENANT_ROOT_FILES.contains(&path) {
        return true;
    }
    if EXCLUDED_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return false;
    }
    extension(path).is_none()
}

/// Extension of the last path segment, if it has one.
fn extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() && ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Static-asset classifier.
#[derive(Debug, Clone)]
pub struct StaticAssetMatcher {
    prefixes: Vec<String>,
    extensions: Vec<String>,
}

impl StaticAssetMatcher {
    pub fn new(config: &StaticAssetConfig) -> Self {
        Self {
            prefixes: config.prefixes.clone(),
            extensions: config
                .extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// True when the path must bypass all tenant logic.
    pub fn is_static_asset(&self, path: &str) -> bool {
        if self.prefixes.iter().any(|p| path.starts_with(p.as_str())) {
            return true;
        }
        match extension(path) {
            Some(ext) => {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            }
            None => false,
        }
    }
}

impl Default for StaticAssetMatcher {
    fn default() -> Self {
        Self::new(&StaticAssetConfig::default())
    }
}
