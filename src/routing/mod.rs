//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! RequestContext (host, path, query, cookies)
//!     → matcher.rs (route matcher, static-asset bypass)
//!     → admin gate (only /admin paths)
//!     → host.rs (classify host)
//!     → tenant.rs (resolve tenant, custom domains via lookup)
//!     → rewrite.rs (rewrite, pass through or 404)
//!     → Decision
//! ```
//!
//! # Design Decisions
//! - Router compiled at startup, immutable at runtime
//! - Every stage may short-circuit; exactly one outcome per request
//! - Deterministic: same input always yields the same decision

pub mod context;
pub mod host;
pub mod matcher;
pub mod rewrite;
pub mod router;
pub mod tenant;

pub use context::RequestContext;
pub use host::{HostClass, HostClassifier};
pub use rewrite::{Outcome, RewriteTarget, Rewriter};
pub use router::{Decision, TenantRouter};
pub use tenant::{TenantId, TenantResolver};
