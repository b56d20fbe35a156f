//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. Every problem found is
//! reported, not just the first, and nothing is accepted into the system
//! before it passes.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::RouterConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("tenancy.root_domain must not be empty")]
    MissingRootDomain,
    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },
    #[error("upstream.address must be host:port: {0}")]
    UpstreamAddress(String),
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("tenancy.rewrite_prefix must start with '/': {0}")]
    RewritePrefix(String),
    #[error("admin.login_path must start with '/': {0}")]
    LoginPath(String),
    #[error("org record has an empty username")]
    EmptyUsername,
    #[error("domain {domain} is claimed by both {first} and {second}")]
    DuplicateDomain {
        domain: String,
        first: String,
        second: String,
    },
    #[error("lookup.http.url is not a valid URL: {0}")]
    LookupUrl(String),
    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Validate the configuration, collecting all errors.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.tenancy.root_domain.trim().is_empty() {
        errors.push(ValidationError::MissingRootDomain);
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if !is_host_and_port(&config.upstream.address) {
        errors.push(ValidationError::UpstreamAddress(config.upstream.address.clone()));
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.tenancy.tenant_query_param.is_empty() {
        errors.push(ValidationError::Empty {
            field: "tenancy.tenant_query_param",
        });
    }
    if config.tenancy.tenant_header.is_empty() {
        errors.push(ValidationError::Empty {
            field: "tenancy.tenant_header",
        });
    }
    if !config.tenancy.rewrite_prefix.starts_with('/') {
        errors.push(ValidationError::RewritePrefix(
            config.tenancy.rewrite_prefix.clone(),
        ));
    }
    if config.admin.cookie_name.is_empty() {
        errors.push(ValidationError::Empty {
            field: "admin.cookie_name",
        });
    }
    if !config.admin.login_path.starts_with('/') {
        errors.push(ValidationError::LoginPath(config.admin.login_path.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.request_secs",
        });
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.upstream_secs",
        });
    }

    let mut claimed: HashMap<String, &str> = HashMap::new();
    for org in &config.lookup.orgs {
        if org.username.trim().is_empty() {
            errors.push(ValidationError::EmptyUsername);
            continue;
        }
        let Some(domain) = org.domain.as_deref() else {
            continue;
        };
        let key = domain.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        if let Some(first) = claimed.get(&key) {
            errors.push(ValidationError::DuplicateDomain {
                domain: key.clone(),
                first: first.to_string(),
                second: org.username.clone(),
            });
        } else {
            claimed.insert(key, &org.username);
        }
    }

    if let Some(http) = &config.lookup.http {
        if url::Url::parse(&http.url).is_err() {
            errors.push(ValidationError::LookupUrl(http.url.clone()));
        }
        if http.timeout_ms == 0 {
            errors.push(ValidationError::ZeroTimeout {
                field: "lookup.http.timeout_ms",
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

/// The upstream may be named by hostname (`web:3000`); only the port is required.
fn is_host_and_port(value: &str) -> bool {
    value
        .parse::<Authority>()
        .map(|authority| authority.port_u16().is_some() && !authority.host().is_empty())
        .unwrap_or(false)
}
