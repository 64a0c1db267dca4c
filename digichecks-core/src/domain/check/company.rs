// digichecks-core/src/domain/check/company.rs

use serde::{Deserialize, Serialize};

use super::ids::{InternalId, PublicId};

/// Tenant owning checks and connectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: InternalId,
    pub public_id: PublicId,
    pub name: String,
}
