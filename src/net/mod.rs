//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.rs (bind plain TCP)  ─┐
//!                                ├→ HTTP layer (axum)
//! tls.rs (rustls termination)   ─┘
//! ```
//!
//! # Design Decisions
//! - TLS is optional and chosen at startup from `listener.tls`
//! - Bind failures are fatal

pub mod listener;
pub mod tls;

use thiserror::Error;

/// Error type for listener setup.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("invalid bind address {0}")]
    Address(String),
    #[error("failed to bind: {0}")]
    Bind(#[source] std::io::Error),
    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),
}
