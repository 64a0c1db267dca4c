// digichecks-core/src/domain/ports/registry.rs

use crate::domain::check::{Check, Company, Connector, InternalId, PublicId};
use crate::domain::error::DomainError;

/// Storage of companies, connectors and checks.
///
/// Lookups by public id are always scoped to a company: a record belonging to
/// another company is reported as not found.
pub trait Registry: Send + Sync {
    fn next_id(&self) -> InternalId;

    fn company(&self, public_id: &PublicId) -> Result<Company, DomainError>;

    // --- connectors ---

    /// Internal lookup used when resolving a check's connector reference.
    fn connector(&self, id: InternalId) -> Result<Connector, DomainError>;
    fn find_connector(
        &self,
        company: InternalId,
        public_id: &PublicId,
    ) -> Result<Connector, DomainError>;
    fn connectors(&self, company: InternalId) -> Vec<Connector>;
    fn save_connector(&self, connector: Connector) -> Result<(), DomainError>;
    fn delete_connector(&self, company: InternalId, public_id: &PublicId)
    -> Result<(), DomainError>;

    // --- checks ---

    fn find_check(&self, company: InternalId, public_id: &PublicId) -> Result<Check, DomainError>;
    fn checks(&self, company: InternalId) -> Vec<Check>;
    fn save_check(&self, check: Check) -> Result<(), DomainError>;
    fn delete_check(&self, company: InternalId, public_id: &PublicId) -> Result<(), DomainError>;
}
