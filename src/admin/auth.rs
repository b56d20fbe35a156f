//! Cookie gate in front of the admin tooling.
//!
//! A single shared value, set by the PIN page, unlocks every admin path. It
//! keeps casual visitors out and nothing more.

use serde::Serialize;

use crate::config::AdminConfig;
use crate::routing::context::RequestContext;

/// Result of the admin check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum AdminAccess {
    Allow,
    Redirect { location: String },
}

#[derive(Debug, Clone)]
pub struct AdminGate {
    login_path: String,
    login_prefix: String,
    cookie_name: String,
    cookie_value: String,
}

impl AdminGate {
    pub fn new(config: &AdminConfig) -> Self {
        let login_path = config.login_path.trim_end_matches('/').to_string();
        Self {
            login_prefix: format!("{}/", login_path),
            login_path,
            cookie_name: config.cookie_name.clone(),
            cookie_value: config.cookie_value.clone(),
        }
    }

    /// `/admin` itself or anything below it.
    pub fn is_admin_path(&self, path: &str) -> bool {
        path == self.login_path || path.starts_with(&self.login_prefix)
    }

    /// The login page is always reachable; everything below it needs the
    /// cookie, otherwise the visitor is sent to the login page with a
    /// `next` parameter pointing back here.
    pub fn check(&self, ctx: &RequestContext) -> AdminAccess {
        if ctx.path == self.login_path {
            return AdminAccess::Allow;
        }
        if ctx.cookie(&self.cookie_name) == Some(self.cookie_value.as_str()) {
            return AdminAccess::Allow;
        }
        let next: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("next", &ctx.path)
            .finish();
        AdminAccess::Redirect {
            location: format!("{}?{}", self.login_path, next),
        }
    }
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new(&AdminConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_paths() {
        let gate = AdminGate::default();
        assert!(gate.is_admin_path("/admin"));
        assert!(gate.is_admin_path("/admin/dashboard"));
        assert!(!gate.is_admin_path("/administrator"));
        assert!(!gate.is_admin_path("/catalog/admin"));
    }

    #[test]
    fn test_login_page_is_open() {
        let gate = AdminGate::default();
        let ctx = RequestContext::new("sovoli.com", "/admin");
        assert_eq!(gate.check(&ctx), AdminAccess::Allow);
    }

    #[test]
    fn test_redirect_without_cookie() {
        let gate = AdminGate::default();
        let ctx = RequestContext::new("sovoli.com", "/admin/dashboard");
        assert_eq!(
            gate.check(&ctx),
            AdminAccess::Redirect {
                location: "/admin?next=%2Fadmin%2Fdashboard".into()
            }
        );
    }

    #[test]
    fn test_cookie_must_match_exactly() {
        let gate = AdminGate::default();
        let ok = RequestContext::new("sovoli.com", "/admin/orgs")
            .with_cookie_header("sovoli_admin_pin=ok");
        assert_eq!(gate.check(&ok), AdminAccess::Allow);

        let wrong = RequestContext::new("sovoli.com", "/admin/orgs")
            .with_cookie_header("sovoli_admin_pin=OK");
        assert!(matches!(gate.check(&wrong), AdminAccess::Redirect { .. }));
    }
}
