//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{OrgRecord, RouterConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `tenancy.root_domain`.
pub const ROOT_DOMAIN_ENV: &str = "SOVOLI_ROOT_DOMAIN";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Org records in {path} are malformed: {source}")]
    Orgs {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// The root domain may be overridden from the environment, and the org
/// records file (resolved relative to the config file) is merged into the
/// inline records before validation.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: RouterConfig = toml::from_str(&content)?;

    apply_root_domain_override(&mut config, std::env::var(ROOT_DOMAIN_ENV).ok());

    if let Some(orgs_file) = config.lookup.orgs_file.clone() {
        let orgs_path = resolve_relative(path, Path::new(&orgs_file));
        let records = load_org_records(&orgs_path)?;
        config.lookup.orgs.extend(records);
    }

    finalize(config)
}

/// Validate an in-memory configuration, normalizing the root domain.
pub fn finalize(mut config: RouterConfig) -> Result<RouterConfig, ConfigError> {
    config.tenancy.root_domain = normalize_root_domain(&config.tenancy.root_domain);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Read an array of org records from a JSON file.
pub fn load_org_records(path: &Path) -> Result<Vec<OrgRecord>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Orgs {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the configured root domain when the environment supplies one.
pub fn apply_root_domain_override(config: &mut RouterConfig, value: Option<String>) {
    if let Some(domain) = value.filter(|v| !v.trim().is_empty()) {
        tracing::debug!(root_domain = %domain, "Root domain taken from environment");
        config.tenancy.root_domain = domain.trim().to_string();
    }
}

/// Lowercase and drop a leading `www.`.
pub fn normalize_root_domain(domain: &str) -> String {
    let lower = domain.trim().to_lowercase();
    match lower.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

fn resolve_relative(config_path: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    config_path
        .parent()
        .map(|dir| dir.join(target))
        .unwrap_or_else(|| target.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sovoli-router-{}-{}", name, uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_normalize_root_domain() {
        assert_eq!(normalize_root_domain("WWW.Sovoli.com"), "sovoli.com");
        assert_eq!(normalize_root_domain("localhost:3000"), "localhost:3000");
    }

    #[test]
    fn test_env_override_ignores_blank() {
        let mut config = RouterConfig::default();
        apply_root_domain_override(&mut config, Some("  ".into()));
        assert_eq!(config.tenancy.root_domain, "sovoli.com");

        apply_root_domain_override(&mut config, Some("localhost:3000".into()));
        assert_eq!(config.tenancy.root_domain, "localhost:3000");
    }

    #[test]
    fn test_load_config_merges_org_file() {
        let dir = temp_dir("load");
        fs::write(
            dir.join("orgs.json"),
            r#"[{"username": "magy", "domain": "MagySchool.com"}, {"username": "acme"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("router.toml"),
            r#"
            [tenancy]
            root_domain = "www.sovoli.com"

            [lookup]
            orgs_file = "orgs.json"

            [[lookup.orgs]]
            username = "inline"
            domain = "inline.org"
            "#,
        )
        .unwrap();

        let config = load_config(&dir.join("router.toml")).unwrap();
        assert_eq!(config.tenancy.root_domain, "sovoli.com");
        assert_eq!(config.lookup.orgs.len(), 3);

        fs::remove_dir_all(dir).unwrap_or_default();
    }

    #[test]
    fn test_org_file_cannot_reclaim_inline_domain() {
        let dir = temp_dir("dup");
        fs::write(
            dir.join("orgs.json"),
            r#"[{"username": "copycat", "domain": "Inline.org"}]"#,
        )
        .unwrap();
        fs::write(
            dir.join("router.toml"),
            r#"
            [lookup]
            orgs_file = "orgs.json"

            [[lookup.orgs]]
            username = "inline"
            domain = "inline.org"
            "#,
        )
        .unwrap();

        let err = load_config(&dir.join("router.toml")).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(
                errors,
                vec![ValidationError::DuplicateDomain {
                    domain: "inline.org".into(),
                    first: "inline".into(),
                    second: "copycat".into(),
                }]
            ),
            other => panic!("expected validation error, got {other}"),
        }

        fs::remove_dir_all(dir).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_org_file() {
        let dir = temp_dir("orgs");
        fs::write(dir.join("orgs.json"), "{not json").unwrap();
        let err = load_org_records(&dir.join("orgs.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Orgs { .. }));
        fs::remove_dir_all(dir).unwrap_or_default();
    }
}
