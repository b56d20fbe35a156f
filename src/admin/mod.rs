//! Admin tooling access.
//!
//! The admin pages themselves are served by the upstream application; the
//! router only decides whether a visitor may reach them.

pub mod auth;

pub use auth::{AdminAccess, AdminGate};
