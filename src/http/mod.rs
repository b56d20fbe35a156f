//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (axum setup, request id, trace, timeout)
//!     → request.rs (RequestContext from host, URI, cookies)
//!     → routing (TenantRouter decision)
//!     → server.rs (forward to upstream, rewritten or not)
//!     → response.rs (redirect, 404, tenant headers)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_context, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ServerError};
