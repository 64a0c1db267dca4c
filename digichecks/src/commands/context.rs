// digichecks/src/commands/context.rs
//
// Builds the adapters from the service configuration and hands out the use
// cases. Every command goes through here.

use anyhow::{Context, bail};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use digichecks_core::application::{
    CheckRunner, ConversionPipeline, ConversionProfile, DataspaceRequest, DocumentValidator,
    RegistryService, RuleResolver,
};
use digichecks_core::domain::check::{Check, PublicId};
use digichecks_core::domain::conversion::{ColumnMapping, DatasetType};
use digichecks_core::domain::ports::Registry;
use digichecks_core::infrastructure::config::{ExtractorEngine, ServiceConfig, load_service_config};
use digichecks_core::infrastructure::crypto::CredentialVault;
use digichecks_core::infrastructure::extractor::{DirectExtractor, SubprocessExtractor};
use digichecks_core::infrastructure::http::{DataspaceClient, HttpRuleFetcher, ReqwestTransport};
use digichecks_core::infrastructure::{HttpContextLoader, InMemoryRegistry, StaticContextLoader};
use digichecks_core::ports::GraphExtractor;

use crate::cli::ConversionArgs;

pub struct AppContext {
    pub config: ServiceConfig,
    pub registry: Arc<InMemoryRegistry>,
}

impl AppContext {
    pub fn load(config: Option<&Path>, root: &Path) -> anyhow::Result<Self> {
        let config = load_service_config(config, root, |key| std::env::var(key).ok())
            .context("Failed to load service configuration")?;
        let registry = InMemoryRegistry::load(&config.registry_path).with_context(|| {
            format!("Failed to load registry from {:?}", config.registry_path)
        })?;
        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }

    pub fn persist(&self) -> anyhow::Result<()> {
        self.registry
            .persist(&self.config.registry_path)
            .with_context(|| format!("Failed to write registry to {:?}", self.config.registry_path))
    }

    /// The configured vault. Commands that store credentials require it.
    pub fn vault(&self) -> anyhow::Result<Arc<CredentialVault>> {
        let Some(key) = &self.config.vault.fernet_key else {
            bail!("No vault key configured. Set DIGICHECKS_FERNET_KEY or 'vault.fernet-key' (see 'digichecks vault keygen').");
        };
        Ok(Arc::new(CredentialVault::new(key.expose())?))
    }

    /// Running hosted checks needs no key; a throwaway one is used so that
    /// any stored credential fails to decrypt instead of leaking.
    pub fn vault_or_ephemeral(&self) -> anyhow::Result<Arc<CredentialVault>> {
        if self.config.vault.fernet_key.is_some() {
            return self.vault();
        }
        Ok(Arc::new(CredentialVault::new(&CredentialVault::generate_key())?))
    }

    /// Stored check, scoped to its company.
    pub fn find_check(&self, company: &str, check: &str) -> anyhow::Result<Check> {
        let company = self.registry.company(&PublicId::from(company))?;
        Ok(self.registry.find_check(company.id, &PublicId::from(check))?)
    }

    pub fn registry_service(&self, vault: Arc<CredentialVault>) -> RegistryService {
        RegistryService::new(self.registry.clone(), vault)
    }

    pub fn contexts(&self) -> anyhow::Result<StaticContextLoader> {
        let mut loader = StaticContextLoader::bundled()?;
        for (url, path) in &self.config.contexts.local {
            loader = loader
                .with_file(url.clone(), path)
                .with_context(|| format!("Failed to read context {:?}", path))?;
        }
        if self.config.contexts.remote {
            info!("Remote context loading enabled");
            loader = loader.with_remote(HttpContextLoader::new(self.config.contexts.timeout())?);
        }
        Ok(loader)
    }

    pub fn extractor(&self, profile: &ConversionProfile) -> Arc<dyn GraphExtractor> {
        let extractor = &self.config.extractor;
        match extractor.engine {
            ExtractorEngine::Direct => {
                let mapping = extractor
                    .mapping
                    .clone()
                    .unwrap_or_else(|| profile.row_mapping.clone());
                Arc::new(DirectExtractor::new(mapping))
            }
            ExtractorEngine::Subprocess => {
                let sub = &extractor.subprocess;
                Arc::new(SubprocessExtractor {
                    program: sub.program.clone(),
                    args: sub.args.clone(),
                    query: sub.query.clone(),
                    timeout: sub.timeout(),
                })
            }
        }
    }

    pub fn conversion(&self, profile: &ConversionProfile) -> ConversionPipeline {
        ConversionPipeline::new(self.extractor(profile))
    }

    pub fn runner(&self, profile: &ConversionProfile) -> anyhow::Result<CheckRunner> {
        if self.config.vault.fernet_key.is_none() {
            warn!("No vault key configured, remote rule credentials cannot be decrypted");
        }
        let vault = self.vault_or_ephemeral()?;
        let fetcher = Arc::new(HttpRuleFetcher::new(self.config.rule_fetch.timeout())?);
        let dataspace = &self.config.dataspace;
        let transport = Arc::new(ReqwestTransport::new(dataspace.timeout())?);
        let datasets = Arc::new(DataspaceClient::new(
            transport,
            dataspace.hosts(),
            dataspace.retry_policy(),
        ));

        Ok(CheckRunner::new(
            RuleResolver::new(self.registry.clone(), vault, fetcher),
            DocumentValidator::new(Arc::new(self.contexts()?)),
            self.conversion(profile),
            datasets,
        ))
    }
}

// --- CONVERSION INPUTS ---

/// Profile named on the command line, with its column mapping replaced by
/// the `--mapping` file when one is given.
pub fn resolve_profile(args: &ConversionArgs) -> anyhow::Result<ConversionProfile> {
    let Some(mut profile) = ConversionProfile::named(&args.profile) else {
        bail!(
            "Unknown conversion profile '{}'. Available: {}",
            args.profile,
            ConversionProfile::NAMES.join(", ")
        );
    };
    if let Some(path) = &args.mapping {
        profile.mapping = read_mapping(path)?;
    }
    Ok(profile)
}

fn read_mapping(path: &Path) -> anyhow::Result<ColumnMapping> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read mapping {:?}", path))?;
    let entries: indexmap::IndexMap<String, String> = serde_yaml::from_str(&content)
        .with_context(|| format!("Mapping {:?} must be a map of column -> element", path))?;
    Ok(ColumnMapping::new(entries)?)
}

pub fn dataspace_request(
    dataset_id: String,
    dataset_type: &str,
    profile: ConversionProfile,
) -> anyhow::Result<DataspaceRequest> {
    let dataset_type: DatasetType = dataset_type.parse()?;
    Ok(DataspaceRequest {
        dataset_id,
        dataset_type,
        mapping: profile.mapping,
        namespaces: profile.namespaces,
    })
}
