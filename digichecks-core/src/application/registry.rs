// digichecks-core/src/application/registry.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::check::{
    Check, CheckDraft, CheckPatch, Company, Connector, ConnectorDraft, ConnectorPatch, InternalId,
    PublicId, RecordKind, RuleSourceKind,
};
use crate::domain::ports::Registry;
use crate::error::DigichecksError;
use crate::infrastructure::crypto::CredentialVault;

// --- REQUESTS & VIEWS ---

/// Check definition as submitted by an operator. `connector` is the public id.
#[derive(Debug, Clone, Default)]
pub struct CheckRequest {
    pub name: String,
    pub rule_source: String,
    pub rule: String,
    pub connector: Option<PublicId>,
}

#[derive(Debug, Clone, Default)]
pub struct CheckUpdate {
    pub name: Option<String>,
    pub rule_source: Option<String>,
    pub rule: Option<String>,
    pub connector: Option<PublicId>,
}

/// Outward form of a check: public ids only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckView {
    pub check_id: PublicId,
    pub check_name: String,
    pub rule_source: RuleSourceKind,
    pub rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<PublicId>,
}

/// Outward form of a connector. The credential never leaves the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorView {
    pub connector_id: PublicId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    pub username: String,
    pub updated_at: DateTime<Utc>,
}

impl From<&Connector> for ConnectorView {
    fn from(c: &Connector) -> Self {
        Self {
            connector_id: c.public_id.clone(),
            name: c.name.clone(),
            token_endpoint: c.token_endpoint.clone(),
            username: c.username.clone(),
            updated_at: c.updated_at,
        }
    }
}

// --- SERVICE ---

/// Company-scoped management of checks and connectors.
pub struct RegistryService {
    registry: Arc<dyn Registry>,
    vault: Arc<CredentialVault>,
}

impl RegistryService {
    pub fn new(registry: Arc<dyn Registry>, vault: Arc<CredentialVault>) -> Self {
        Self { registry, vault }
    }

    pub fn company(&self, company: &PublicId) -> Result<Company, DigichecksError> {
        Ok(self.registry.company(company)?)
    }

    /// The stored check, for running it.
    pub fn check(&self, company: &PublicId, check: &PublicId) -> Result<Check, DigichecksError> {
        let company = self.registry.company(company)?;
        Ok(self.registry.find_check(company.id, check)?)
    }

    // --- checks ---

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub fn create_check(
        &self,
        company: &PublicId,
        request: CheckRequest,
    ) -> Result<CheckView, DigichecksError> {
        let company = self.registry.company(company)?;
        let kind: RuleSourceKind = request.rule_source.parse()?;

        // Only remote checks need a connector; hosted ones ignore it.
        let connector = match (kind, &request.connector) {
            (RuleSourceKind::RemoteApi, Some(public_id)) => {
                Some(self.registry.find_connector(company.id, public_id)?.id)
            }
            _ => None,
        };

        let check = Check::from_draft(
            self.registry.next_id(),
            PublicId::generate(RecordKind::Check),
            company.id,
            CheckDraft {
                name: request.name,
                rule_source: request.rule_source,
                rule: request.rule,
                connector,
            },
        )?;
        self.registry.save_check(check.clone())?;
        info!(check = %check.public_id, "Check created");
        self.check_view(&check)
    }

    pub fn get_check(
        &self,
        company: &PublicId,
        check: &PublicId,
    ) -> Result<CheckView, DigichecksError> {
        let check = self.check(company, check)?;
        self.check_view(&check)
    }

    pub fn list_checks(&self, company: &PublicId) -> Result<Vec<CheckView>, DigichecksError> {
        let company = self.registry.company(company)?;
        self.registry
            .checks(company.id)
            .iter()
            .map(|check| self.check_view(check))
            .collect()
    }

    #[instrument(skip(self, update))]
    pub fn update_check(
        &self,
        company: &PublicId,
        check: &PublicId,
        update: CheckUpdate,
    ) -> Result<CheckView, DigichecksError> {
        let company = self.registry.company(company)?;
        let current = self.registry.find_check(company.id, check)?;
        let connector = match update.connector.filter(|c| !c.as_str().trim().is_empty()) {
            Some(public_id) => Some(self.registry.find_connector(company.id, &public_id)?.id),
            None => None,
        };

        let updated = current.apply(CheckPatch {
            name: update.name,
            rule_source: update.rule_source,
            rule: update.rule,
            connector,
        })?;
        self.registry.save_check(updated.clone())?;
        info!("Check updated");
        self.check_view(&updated)
    }

    #[instrument(skip(self))]
    pub fn delete_check(&self, company: &PublicId, check: &PublicId) -> Result<(), DigichecksError> {
        let company = self.registry.company(company)?;
        self.registry.delete_check(company.id, check)?;
        info!("Check deleted");
        Ok(())
    }

    // --- connectors ---

    /// Stores a connector; the password is encrypted before it reaches the
    /// registry.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub fn create_connector(
        &self,
        company: &PublicId,
        draft: ConnectorDraft,
    ) -> Result<ConnectorView, DigichecksError> {
        let company = self.registry.company(company)?;
        draft.validate()?;
        let sealed = self.vault.encrypt(&draft.password);
        let connector = Connector::from_draft(
            self.registry.next_id(),
            PublicId::generate(RecordKind::Connector),
            company.id,
            draft,
            sealed,
        )?;
        self.registry.save_connector(connector.clone())?;
        info!(connector = %connector.public_id, "Connector created");
        Ok(ConnectorView::from(&connector))
    }

    pub fn get_connector(
        &self,
        company: &PublicId,
        connector: &PublicId,
    ) -> Result<ConnectorView, DigichecksError> {
        let company = self.registry.company(company)?;
        let connector = self.registry.find_connector(company.id, connector)?;
        Ok(ConnectorView::from(&connector))
    }

    pub fn list_connectors(
        &self,
        company: &PublicId,
    ) -> Result<Vec<ConnectorView>, DigichecksError> {
        let company = self.registry.company(company)?;
        Ok(self
            .registry
            .connectors(company.id)
            .iter()
            .map(ConnectorView::from)
            .collect())
    }

    /// Re-encrypts only when the patch carries a new password.
    #[instrument(skip(self, patch))]
    pub fn update_connector(
        &self,
        company: &PublicId,
        connector: &PublicId,
        patch: ConnectorPatch,
    ) -> Result<ConnectorView, DigichecksError> {
        let company = self.registry.company(company)?;
        let current = self.registry.find_connector(company.id, connector)?;
        let resealed = patch.new_password().map(|p| self.vault.encrypt(p));
        let updated = current.apply(patch, resealed);
        self.registry.save_connector(updated.clone())?;
        info!("Connector updated");
        Ok(ConnectorView::from(&updated))
    }

    #[instrument(skip(self))]
    pub fn delete_connector(
        &self,
        company: &PublicId,
        connector: &PublicId,
    ) -> Result<(), DigichecksError> {
        let company = self.registry.company(company)?;
        self.registry.delete_connector(company.id, connector)?;
        info!("Connector deleted");
        Ok(())
    }

    fn check_view(&self, check: &Check) -> Result<CheckView, DigichecksError> {
        let connector_id = match check.connector() {
            Some(id) => Some(self.connector_public_id(id)?),
            None => None,
        };
        Ok(CheckView {
            check_id: check.public_id.clone(),
            check_name: check.name.clone(),
            rule_source: check.source.kind(),
            rule: check.source.rule().to_string(),
            connector_id,
        })
    }

    fn connector_public_id(&self, id: InternalId) -> Result<PublicId, DigichecksError> {
        Ok(self.registry.connector(id)?.public_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::check::{SealedCredential, Secret};
    use crate::domain::error::DomainError;
    use crate::infrastructure::store::InMemoryRegistry;

    const RULE: &str = "@prefix ex: <http://example.org/> . ex:s a ex:Shape .";

    struct Fixture {
        registry: Arc<InMemoryRegistry>,
        vault: Arc<CredentialVault>,
        service: RegistryService,
        company: PublicId,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(InMemoryRegistry::new());
        let company = registry.add_company("acme").public_id;
        let vault = Arc::new(CredentialVault::new(&CredentialVault::generate_key()).unwrap());
        let service = RegistryService::new(registry.clone(), vault.clone());
        Fixture {
            registry,
            vault,
            service,
            company,
        }
    }

    fn draft(password: &str) -> ConnectorDraft {
        ConnectorDraft {
            name: "rules-api".into(),
            username: "svc".into(),
            password: Secret::new(password),
            token_endpoint: None,
        }
    }

    fn stored_credential(fx: &Fixture, id: &PublicId) -> SealedCredential {
        let company = fx.registry.company(&fx.company).unwrap();
        fx.registry.find_connector(company.id, id).unwrap().credential
    }

    #[test]
    fn test_connector_password_is_stored_encrypted() {
        let fx = fixture();
        let view = fx.service.create_connector(&fx.company, draft("hunter2")).unwrap();
        assert!(view.connector_id.is_kind(RecordKind::Connector));

        let sealed = stored_credential(&fx, &view.connector_id);
        assert_ne!(sealed.ciphertext(), "hunter2");
        assert_eq!(fx.vault.decrypt(&sealed).unwrap().expose(), "hunter2");
    }

    #[test]
    fn test_connector_update_reencrypts_only_new_password() {
        let fx = fixture();
        let id = fx
            .service
            .create_connector(&fx.company, draft("first"))
            .unwrap()
            .connector_id;
        let before = stored_credential(&fx, &id);

        fx.service
            .update_connector(
                &fx.company,
                &id,
                ConnectorPatch {
                    name: Some("renamed".into()),
                    password: Some(Secret::new("")),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(stored_credential(&fx, &id), before);

        fx.service
            .update_connector(
                &fx.company,
                &id,
                ConnectorPatch {
                    password: Some(Secret::new("second")),
                    ..Default::default()
                },
            )
            .unwrap();
        let after = stored_credential(&fx, &id);
        assert_eq!(fx.vault.decrypt(&after).unwrap().expose(), "second");
    }

    #[test]
    fn test_remote_check_maps_connector_ids_both_ways() {
        let fx = fixture();
        let connector = fx
            .service
            .create_connector(&fx.company, draft("pw"))
            .unwrap()
            .connector_id;

        let created = fx
            .service
            .create_check(
                &fx.company,
                CheckRequest {
                    name: "remote".into(),
                    rule_source: "api".into(),
                    rule: "https://rules.example.org/r1".into(),
                    connector: Some(connector.clone()),
                },
            )
            .unwrap();
        assert_eq!(created.connector_id.as_ref(), Some(&connector));
        assert!(created.check_id.is_kind(RecordKind::Check));

        let listed = fx.service.list_checks(&fx.company).unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn test_hosted_check_ignores_connector() {
        let fx = fixture();
        let created = fx
            .service
            .create_check(
                &fx.company,
                CheckRequest {
                    name: "hosted".into(),
                    rule_source: "digichecks_hosted".into(),
                    rule: RULE.into(),
                    connector: Some(PublicId::from("cn_does_not_exist")),
                },
            )
            .unwrap();
        assert_eq!(created.connector_id, None);
    }

    #[test]
    fn test_invalid_requests_are_rejected() {
        let fx = fixture();
        let remote_without_connector = CheckRequest {
            name: "remote".into(),
            rule_source: "api".into(),
            rule: "https://rules.example.org/r1".into(),
            connector: None,
        };
        assert!(matches!(
            fx.service.create_check(&fx.company, remote_without_connector),
            Err(DigichecksError::Domain(DomainError::InvalidCheck(_)))
        ));

        let unknown_source = CheckRequest {
            name: "x".into(),
            rule_source: "ftp".into(),
            rule: RULE.into(),
            connector: None,
        };
        let err = fx.service.create_check(&fx.company, unknown_source).unwrap_err();
        assert!(err.to_string().contains("ftp"));

        let unknown_company = PublicId::from("co_missing");
        assert!(matches!(
            fx.service.list_checks(&unknown_company),
            Err(DigichecksError::Domain(DomainError::CompanyNotFound(_)))
        ));
    }

    #[test]
    fn test_update_merges_and_revalidates() {
        let fx = fixture();
        let id = fx
            .service
            .create_check(
                &fx.company,
                CheckRequest {
                    name: "hosted".into(),
                    rule_source: "digichecks_hosted".into(),
                    rule: RULE.into(),
                    connector: None,
                },
            )
            .unwrap()
            .check_id;

        let updated = fx
            .service
            .update_check(
                &fx.company,
                &id,
                CheckUpdate {
                    name: Some("renamed".into()),
                    rule: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.check_name, "renamed");
        assert_eq!(updated.rule, RULE);

        let to_remote = CheckUpdate {
            rule_source: Some("api".into()),
            rule: Some("https://rules.example.org/r1".into()),
            ..Default::default()
        };
        assert!(fx.service.update_check(&fx.company, &id, to_remote).is_err());
        // The failed update left the stored check untouched.
        assert_eq!(
            fx.service.get_check(&fx.company, &id).unwrap().check_name,
            "renamed"
        );
    }

    #[test]
    fn test_delete_connector_in_use() {
        let fx = fixture();
        let connector = fx
            .service
            .create_connector(&fx.company, draft("pw"))
            .unwrap()
            .connector_id;
        let check = fx
            .service
            .create_check(
                &fx.company,
                CheckRequest {
                    name: "remote".into(),
                    rule_source: "api".into(),
                    rule: "https://rules.example.org/r1".into(),
                    connector: Some(connector.clone()),
                },
            )
            .unwrap()
            .check_id;

        assert!(matches!(
            fx.service.delete_connector(&fx.company, &connector),
            Err(DigichecksError::Domain(DomainError::ConnectorInUse { .. }))
        ));
        fx.service.delete_check(&fx.company, &check).unwrap();
        fx.service.delete_connector(&fx.company, &connector).unwrap();
        assert!(fx.service.list_connectors(&fx.company).unwrap().is_empty());
    }
}
