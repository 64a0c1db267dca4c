// digichecks-core/src/infrastructure/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use super::service::ServiceConfig;
use crate::domain::check::Secret;
use crate::infrastructure::error::InfrastructureError;

const CANDIDATES: [&str; 2] = ["digichecks.yaml", "digichecks.yml"];

pub const ENV_FERNET_KEY: &str = "DIGICHECKS_FERNET_KEY";
pub const ENV_CONTROL_HOST: &str = "DIGICHECKS_CONTROL_HOST";
pub const ENV_DATA_HOST: &str = "DIGICHECKS_DATA_HOST";
pub const ENV_REGISTRY: &str = "DIGICHECKS_REGISTRY";

/// Loads the service configuration.
///
/// An explicit path must exist. Otherwise `digichecks.yaml` / `digichecks.yml`
/// is looked up in `root`, falling back to defaults when neither is present.
/// Environment overrides are applied last, then the result is validated.
#[instrument(skip(lookup))]
pub fn load_service_config(
    explicit: Option<&Path>,
    root: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ServiceConfig, InfrastructureError> {
    let path = match explicit {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => return Err(InfrastructureError::ConfigNotFound(p.display().to_string())),
        None => find_config(root),
    };

    let mut config = match &path {
        Some(path) => {
            info!(path = ?path, "Loading service configuration");
            let content = fs::read_to_string(path)?;
            let mut config = parse_service_config(&content)?;
            let base = path.parent().unwrap_or(root);
            config.rebase(base);
            config
        }
        None => {
            info!(root = ?root, "No service configuration found, using defaults");
            let mut config = ServiceConfig::default();
            config.rebase(root);
            config
        }
    };

    apply_env_overrides(&mut config, lookup);
    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;
    Ok(config)
}

/// Parses a YAML document. An empty document yields the defaults.
pub fn parse_service_config(content: &str) -> Result<ServiceConfig, InfrastructureError> {
    if content.trim().is_empty() {
        return Ok(ServiceConfig::default());
    }
    Ok(serde_yaml::from_str(content)?)
}

fn find_config(root: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists())
}

/// Layers `DIGICHECKS_*` variables over the file values. `lookup` is usually
/// `|k| std::env::var(k).ok()`.
pub fn apply_env_overrides(config: &mut ServiceConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup(ENV_FERNET_KEY).filter(|v| !v.is_empty()) {
        info!("Vault key supplied via ENV");
        config.vault.fernet_key = Some(Secret::new(key));
    }
    if let Some(host) = lookup(ENV_CONTROL_HOST).filter(|v| !v.is_empty()) {
        info!(old = %config.dataspace.control_host, new = %host, "Overriding control host via ENV");
        config.dataspace.control_host = host;
    }
    if let Some(host) = lookup(ENV_DATA_HOST).filter(|v| !v.is_empty()) {
        info!(old = %config.dataspace.data_host, new = %host, "Overriding data host via ENV");
        config.dataspace.data_host = host;
    }
    if let Some(path) = lookup(ENV_REGISTRY).filter(|v| !v.is_empty()) {
        info!(old = ?config.registry_path, new = %path, "Overriding registry path via ENV");
        config.registry_path = PathBuf::from(path);
    }
}
