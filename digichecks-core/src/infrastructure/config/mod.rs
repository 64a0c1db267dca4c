// digichecks-core/src/infrastructure/config/mod.rs

pub mod loader;
pub mod service;

pub use loader::{apply_env_overrides, load_service_config, parse_service_config};
pub use service::{
    ContextsConfig, DataspaceConfig, ExtractorConfig, ExtractorEngine, RuleFetchConfig,
    ServiceConfig, SubprocessConfig, VaultConfig,
};
