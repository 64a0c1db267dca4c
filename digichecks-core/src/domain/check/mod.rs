// digichecks-core/src/domain/check/mod.rs

pub mod company;
pub mod connector;
pub mod definition;
pub mod ids;
pub mod rule_source;
pub mod verdict;

pub use company::Company;
pub use connector::{Connector, ConnectorDraft, ConnectorPatch, SealedCredential, Secret};
pub use definition::{Check, CheckDraft, CheckPatch};
pub use ids::{InternalId, PublicId, RecordKind};
pub use rule_source::{RuleSource, RuleSourceKind};
pub use verdict::{CheckResult, Verdict};
