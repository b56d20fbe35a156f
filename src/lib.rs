//! Sovoli tenant edge router.
//!
//! Sits in front of the Sovoli web application and maps every request's host
//! to a tenant: subdomains of the root domain, custom domains from the org
//! data set, preview deployments and local development hosts. Tenant pages
//! are rewritten under `/w/{tenant}`; API routes keep their path and carry
//! the tenant in a header.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod lookup;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Decision, Outcome, RequestContext, TenantRouter};
