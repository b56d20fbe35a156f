//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + .env / environment
//!     → loader.rs (parse, apply env override, merge org records file)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → compiled into the tenant router at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AdminConfig, HttpLookupConfig, ListenerConfig, LookupConfig, ObservabilityConfig, OrgRecord,
    RouterConfig, StaticAssetConfig, TenancyConfig, TimeoutConfig, TlsConfig, UpstreamConfig,
};
