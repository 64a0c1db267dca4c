// digichecks-core/src/infrastructure/config/service.rs

use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::domain::check::Secret;
use crate::infrastructure::extractor::RowMapping;
use crate::infrastructure::http::{PlatformHosts, RetryPolicy};

// --- ROOT ---

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ServiceConfig {
    #[validate(nested)]
    #[serde(default)]
    pub vault: VaultConfig,

    #[validate(nested)]
    #[serde(default, alias = "rule_fetch")]
    pub rule_fetch: RuleFetchConfig,

    #[validate(nested)]
    #[serde(default)]
    pub dataspace: DataspaceConfig,

    #[validate(nested)]
    #[serde(default)]
    pub extractor: ExtractorConfig,

    #[validate(nested)]
    #[serde(default)]
    pub contexts: ContextsConfig,

    #[serde(default = "default_registry_path", alias = "registry_path")]
    pub registry_path: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            vault: VaultConfig::default(),
            rule_fetch: RuleFetchConfig::default(),
            dataspace: DataspaceConfig::default(),
            extractor: ExtractorConfig::default(),
            contexts: ContextsConfig::default(),
            registry_path: default_registry_path(),
        }
    }
}

impl ServiceConfig {
    /// Resolves relative paths against the directory holding the config file.
    pub fn rebase(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.registry_path);
        rebase(&mut self.extractor.subprocess.query);
        for path in self.contexts.local.values_mut() {
            rebase(path);
        }
    }
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("registry.yaml")
}

// --- SECTIONS ---

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct VaultConfig {
    /// URL-safe base64 Fernet key. Usually injected via `DIGICHECKS_FERNET_KEY`.
    #[serde(default)]
    pub fernet_key: Option<Secret>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RuleFetchConfig {
    #[validate(range(min = 1, max = 600, message = "Rule fetch timeout must be 1..=600 seconds"))]
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for RuleFetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

impl RuleFetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DataspaceConfig {
    #[validate(length(min = 1))]
    #[serde(default = "default_scheme")]
    pub scheme: String,

    #[validate(length(min = 1, message = "Control host cannot be empty"))]
    #[serde(default = "default_control_host")]
    pub control_host: String,

    #[validate(length(min = 1, message = "Data host cannot be empty"))]
    #[serde(default = "default_data_host")]
    pub data_host: String,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[validate(range(max = 300))]
    #[serde(default = "default_wait")]
    pub interval_secs: u64,

    #[validate(range(max = 300))]
    #[serde(default = "default_wait")]
    pub settle_secs: u64,

    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for DataspaceConfig {
    fn default() -> Self {
        Self {
            scheme: default_scheme(),
            control_host: default_control_host(),
            data_host: default_data_host(),
            attempts: default_attempts(),
            interval_secs: default_wait(),
            settle_secs: default_wait(),
            timeout_secs: default_http_timeout(),
        }
    }
}

impl DataspaceConfig {
    pub fn hosts(&self) -> PlatformHosts {
        PlatformHosts {
            scheme: self.scheme.clone(),
            control_host: self.control_host.clone(),
            data_host: self.data_host.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.attempts,
            interval: Duration::from_secs(self.interval_secs),
            settle: Duration::from_secs(self.settle_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractorEngine {
    /// In-process mapping of markup records to triples.
    #[default]
    Direct,
    /// External engine (SPARQL Anything) run as a child process.
    Subprocess,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub engine: ExtractorEngine,

    #[validate(nested)]
    #[serde(default)]
    pub subprocess: SubprocessConfig,

    /// Overrides the conversion profile's own row mapping.
    #[serde(default)]
    pub mapping: Option<RowMapping>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SubprocessConfig {
    #[validate(length(min = 1, message = "Extractor program cannot be empty"))]
    #[serde(default = "default_program")]
    pub program: String,

    /// Arguments; `{query}` and `{uri}` are substituted at run time.
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_query")]
    pub query: PathBuf,

    #[validate(range(min = 1, max = 3600))]
    #[serde(default = "default_extract_timeout")]
    pub timeout_secs: u64,
}

impl Default for SubprocessConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            query: default_query(),
            timeout_secs: default_extract_timeout(),
        }
    }
}

impl SubprocessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ContextsConfig {
    /// Context URL -> local JSON-LD file served in its place.
    #[serde(default)]
    pub local: IndexMap<String, PathBuf>,

    /// Fetch contexts that are neither bundled nor local over HTTP.
    #[serde(default)]
    pub remote: bool,

    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for ContextsConfig {
    fn default() -> Self {
        Self {
            local: IndexMap::new(),
            remote: false,
            timeout_secs: default_http_timeout(),
        }
    }
}

impl ContextsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// --- DEFAULTS ---

fn default_http_timeout() -> u64 {
    30
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_control_host() -> String {
    "51.138.27.252:8181".to_string()
}

fn default_data_host() -> String {
    "51.138.27.252:8183".to_string()
}

fn default_attempts() -> u32 {
    5
}

fn default_wait() -> u64 {
    5
}

fn default_program() -> String {
    "java".to_string()
}

fn default_args() -> Vec<String> {
    ["-jar", "sparql-anything.jar", "-q", "{query}", "-v", "uri={uri}"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_query() -> PathBuf {
    PathBuf::from("queries/realia.sparql")
}

fn default_extract_timeout() -> u64 {
    120
}
