// digichecks-core/src/infrastructure/store.rs

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument};

use crate::domain::check::{Check, Company, Connector, InternalId, PublicId, RecordKind};
use crate::domain::error::DomainError;
use crate::domain::ports::Registry;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// Contents of `registry.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RegistryFile {
    #[serde(default)]
    next_id: InternalId,
    #[serde(default)]
    companies: Vec<Company>,
    #[serde(default)]
    connectors: Vec<Connector>,
    #[serde(default)]
    checks: Vec<Check>,
}

/// Registry held in memory, optionally loaded from and persisted to a YAML
/// file. Connectors are stored with their ciphertext only.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    state: RwLock<RegistryFile>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `path`; a missing file yields an empty registry.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, InfrastructureError> {
        if !path.exists() {
            info!("Registry file not found, starting empty");
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        let mut file: RegistryFile = if content.trim().is_empty() {
            RegistryFile::default()
        } else {
            serde_yaml::from_str(&content)?
        };
        let highest = file
            .companies
            .iter()
            .map(|c| c.id)
            .chain(file.connectors.iter().map(|c| c.id))
            .chain(file.checks.iter().map(|c| c.id))
            .max()
            .unwrap_or(0);
        file.next_id = file.next_id.max(highest);
        debug!(
            companies = file.companies.len(),
            connectors = file.connectors.len(),
            checks = file.checks.len(),
            "Registry loaded"
        );
        Ok(Self {
            state: RwLock::new(file),
        })
    }

    #[instrument(skip(self))]
    pub fn persist(&self, path: &Path) -> Result<(), InfrastructureError> {
        let yaml = serde_yaml::to_string(&*self.read())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        atomic_write(path, yaml)?;
        info!("Registry saved");
        Ok(())
    }

    /// Registers a company and returns it with a fresh public id.
    pub fn add_company(&self, name: impl Into<String>) -> Company {
        let company = Company {
            id: self.next_id(),
            public_id: PublicId::generate(RecordKind::Company),
            name: name.into(),
        };
        self.write().companies.push(company.clone());
        company
    }

    pub fn companies(&self) -> Vec<Company> {
        self.read().companies.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryFile> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryFile> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Registry for InMemoryRegistry {
    fn next_id(&self) -> InternalId {
        let mut state = self.write();
        state.next_id += 1;
        state.next_id
    }

    fn company(&self, public_id: &PublicId) -> Result<Company, DomainError> {
        self.read()
            .companies
            .iter()
            .find(|c| &c.public_id == public_id)
            .cloned()
            .ok_or_else(|| DomainError::CompanyNotFound(public_id.to_string()))
    }

    fn connector(&self, id: InternalId) -> Result<Connector, DomainError> {
        self.read()
            .connectors
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| DomainError::ConnectorNotFound(id.to_string()))
    }

    fn find_connector(
        &self,
        company: InternalId,
        public_id: &PublicId,
    ) -> Result<Connector, DomainError> {
        self.read()
            .connectors
            .iter()
            .find(|c| c.company == company && &c.public_id == public_id)
            .cloned()
            .ok_or_else(|| DomainError::ConnectorNotFound(public_id.to_string()))
    }

    fn connectors(&self, company: InternalId) -> Vec<Connector> {
        self.read()
            .connectors
            .iter()
            .filter(|c| c.company == company)
            .cloned()
            .collect()
    }

    fn save_connector(&self, connector: Connector) -> Result<(), DomainError> {
        let mut state = self.write();
        if !state.companies.iter().any(|c| c.id == connector.company) {
            return Err(DomainError::CompanyNotFound(connector.company.to_string()));
        }
        match state.connectors.iter_mut().find(|c| c.id == connector.id) {
            Some(existing) => *existing = connector,
            None => state.connectors.push(connector),
        }
        Ok(())
    }

    fn delete_connector(
        &self,
        company: InternalId,
        public_id: &PublicId,
    ) -> Result<(), DomainError> {
        let mut state = self.write();
        let Some(index) = state
            .connectors
            .iter()
            .position(|c| c.company == company && &c.public_id == public_id)
        else {
            return Err(DomainError::ConnectorNotFound(public_id.to_string()));
        };
        let id = state.connectors[index].id;
        let users = state
            .checks
            .iter()
            .filter(|c| c.connector() == Some(id))
            .count();
        if users > 0 {
            return Err(DomainError::ConnectorInUse {
                connector: public_id.to_string(),
                checks: users,
            });
        }
        state.connectors.remove(index);
        Ok(())
    }

    fn find_check(&self, company: InternalId, public_id: &PublicId) -> Result<Check, DomainError> {
        self.read()
            .checks
            .iter()
            .find(|c| c.company == company && &c.public_id == public_id)
            .cloned()
            .ok_or_else(|| DomainError::CheckNotFound(public_id.to_string()))
    }

    fn checks(&self, company: InternalId) -> Vec<Check> {
        self.read()
            .checks
            .iter()
            .filter(|c| c.company == company)
            .cloned()
            .collect()
    }

    fn save_check(&self, check: Check) -> Result<(), DomainError> {
        let mut state = self.write();
        if !state.companies.iter().any(|c| c.id == check.company) {
            return Err(DomainError::CompanyNotFound(check.company.to_string()));
        }
        // A check may only point at a connector of its own company.
        if let Some(connector) = check.connector()
            && !state
                .connectors
                .iter()
                .any(|c| c.id == connector && c.company == check.company)
        {
            return Err(DomainError::ConnectorNotFound(connector.to_string()));
        }
        match state.checks.iter_mut().find(|c| c.id == check.id) {
            Some(existing) => *existing = check,
            None => state.checks.push(check),
        }
        Ok(())
    }

    fn delete_check(&self, company: InternalId, public_id: &PublicId) -> Result<(), DomainError> {
        let mut state = self.write();
        let before = state.checks.len();
        state
            .checks
            .retain(|c| !(c.company == company && &c.public_id == public_id));
        if state.checks.len() == before {
            return Err(DomainError::CheckNotFound(public_id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::check::{CheckDraft, ConnectorDraft, SealedCredential, Secret};
    use anyhow::Result;
    use tempfile::tempdir;

    fn connector(registry: &InMemoryRegistry, company: &Company) -> Connector {
        Connector::from_draft(
            registry.next_id(),
            PublicId::generate(RecordKind::Connector),
            company.id,
            ConnectorDraft {
                name: "rules".into(),
                username: "svc".into(),
                password: Secret::new("pw"),
                token_endpoint: None,
            },
            SealedCredential::from_ciphertext("gAAAA-token"),
        )
        .unwrap()
    }

    fn remote_check(registry: &InMemoryRegistry, company: &Company, connector: InternalId) -> Check {
        Check::from_draft(
            registry.next_id(),
            PublicId::generate(RecordKind::Check),
            company.id,
            CheckDraft {
                name: "remote".into(),
                rule_source: "api".into(),
                rule: "https://rules.example.org/r1".into(),
                connector: Some(connector),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_lookups_are_company_scoped() {
        let registry = InMemoryRegistry::new();
        let acme = registry.add_company("acme");
        let other = registry.add_company("other");
        let cn = connector(&registry, &acme);
        registry.save_connector(cn.clone()).unwrap();

        assert!(registry.find_connector(acme.id, &cn.public_id).is_ok());
        assert!(matches!(
            registry.find_connector(other.id, &cn.public_id),
            Err(DomainError::ConnectorNotFound(_))
        ));
        assert!(registry.connectors(other.id).is_empty());
    }

    #[test]
    fn test_connector_in_use_cannot_be_deleted() {
        let registry = InMemoryRegistry::new();
        let acme = registry.add_company("acme");
        let cn = connector(&registry, &acme);
        registry.save_connector(cn.clone()).unwrap();
        let check = remote_check(&registry, &acme, cn.id);
        registry.save_check(check.clone()).unwrap();

        assert!(matches!(
            registry.delete_connector(acme.id, &cn.public_id),
            Err(DomainError::ConnectorInUse { checks: 1, .. })
        ));
        registry.delete_check(acme.id, &check.public_id).unwrap();
        registry.delete_connector(acme.id, &cn.public_id).unwrap();
        assert!(registry.connectors(acme.id).is_empty());
    }

    #[test]
    fn test_foreign_connector_reference_is_refused() {
        let registry = InMemoryRegistry::new();
        let acme = registry.add_company("acme");
        let other = registry.add_company("other");
        let cn = connector(&registry, &other);
        registry.save_connector(cn.clone()).unwrap();

        let check = remote_check(&registry, &acme, cn.id);
        assert!(matches!(
            registry.save_check(check),
            Err(DomainError::ConnectorNotFound(_))
        ));
    }

    #[test]
    fn test_registry_round_trips_through_yaml() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/registry.yaml");

        let registry = InMemoryRegistry::new();
        let acme = registry.add_company("acme");
        let cn = connector(&registry, &acme);
        registry.save_connector(cn.clone())?;
        registry.save_check(remote_check(&registry, &acme, cn.id))?;
        registry.persist(&path)?;

        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("gAAAA-token"));
        assert!(!text.contains("pw\n"));

        let reloaded = InMemoryRegistry::load(&path)?;
        assert_eq!(reloaded.company(&acme.public_id)?, acme);
        assert_eq!(reloaded.checks(acme.id).len(), 1);
        // Ids keep increasing after a reload.
        assert!(reloaded.next_id() > cn.id);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_empty_registry() -> Result<()> {
        let dir = tempdir()?;
        let registry = InMemoryRegistry::load(&dir.path().join("absent.yaml"))?;
        assert!(registry.companies().is_empty());
        Ok(())
    }
}
