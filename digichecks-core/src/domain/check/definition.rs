// digichecks-core/src/domain/check/definition.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{InternalId, PublicId};
use super::rule_source::{RuleSource, RuleSourceKind};
use crate::domain::error::DomainError;

/// A compliance check owned by one company.
///
/// Construction always goes through [`Check::from_draft`] or the registry row
/// conversion, both of which enforce the rule-source invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CheckRow", into = "CheckRow")]
pub struct Check {
    pub id: InternalId,
    pub public_id: PublicId,
    pub company: InternalId,
    pub name: String,
    pub source: RuleSource,
    pub updated_at: DateTime<Utc>,
}

/// Incoming definition of a check, as submitted by an operator.
///
/// `connector` is the connector's internal id; the caller maps the public id
/// before building the draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckDraft {
    pub name: String,
    pub rule_source: String,
    pub rule: String,
    pub connector: Option<InternalId>,
}

/// Partial update. `None` and empty strings both leave the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckPatch {
    pub name: Option<String>,
    pub rule_source: Option<String>,
    pub rule: Option<String>,
    pub connector: Option<InternalId>,
}

impl Check {
    pub fn from_draft(
        id: InternalId,
        public_id: PublicId,
        company: InternalId,
        draft: CheckDraft,
    ) -> Result<Self, DomainError> {
        let name = draft.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidCheck(
                "Check name must not be empty".to_string(),
            ));
        }
        let kind: RuleSourceKind = draft.rule_source.parse()?;
        let source = build_source(kind, draft.rule, draft.connector)?;

        Ok(Self {
            id,
            public_id,
            company,
            name,
            source,
            updated_at: Utc::now(),
        })
    }

    /// Merges `patch` into a copy of this check and re-validates the result.
    pub fn apply(&self, patch: CheckPatch) -> Result<Self, DomainError> {
        let draft = CheckDraft {
            name: non_empty(patch.name).unwrap_or_else(|| self.name.clone()),
            rule_source: non_empty(patch.rule_source)
                .unwrap_or_else(|| self.source.kind().as_str().to_string()),
            rule: non_empty(patch.rule).unwrap_or_else(|| self.source.rule().to_string()),
            connector: patch.connector.or(self.source.connector()),
        };
        Check::from_draft(self.id, self.public_id.clone(), self.company, draft)
    }

    pub fn connector(&self) -> Option<InternalId> {
        self.source.connector()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn build_source(
    kind: RuleSourceKind,
    rule: String,
    connector: Option<InternalId>,
) -> Result<RuleSource, DomainError> {
    match kind {
        RuleSourceKind::Hosted => {
            if rule.trim().is_empty() {
                return Err(DomainError::InvalidCheck(format!(
                    "Rule must be given when rule source is {}",
                    kind
                )));
            }
            Ok(RuleSource::Hosted { rule })
        }
        RuleSourceKind::RemoteApi => {
            let connector = connector.ok_or_else(|| {
                DomainError::InvalidCheck(format!(
                    "Connector must be specified when using {} as rule source",
                    kind
                ))
            })?;
            let endpoint = rule.trim().to_string();
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(DomainError::InvalidCheck(format!(
                    "Rule endpoint '{}' must be an http(s) URL",
                    endpoint
                )));
            }
            Ok(RuleSource::RemoteApi {
                endpoint,
                connector,
            })
        }
    }
}

// --- PERSISTED SHAPE ---

/// Flat row used by the registry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckRow {
    id: InternalId,
    public_id: PublicId,
    company: InternalId,
    name: String,
    rule_source: RuleSourceKind,
    rule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connector: Option<InternalId>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CheckRow> for Check {
    type Error = DomainError;

    fn try_from(row: CheckRow) -> Result<Self, Self::Error> {
        let source = build_source(row.rule_source, row.rule, row.connector)?;
        Ok(Self {
            id: row.id,
            public_id: row.public_id,
            company: row.company,
            name: row.name,
            source,
            updated_at: row.updated_at,
        })
    }
}

impl From<Check> for CheckRow {
    fn from(check: Check) -> Self {
        let connector = check.source.connector();
        let rule_source = check.source.kind();
        let rule = match check.source {
            RuleSource::Hosted { rule } => rule,
            RuleSource::RemoteApi { endpoint, .. } => endpoint,
        };
        Self {
            id: check.id,
            public_id: check.public_id,
            company: check.company,
            name: check.name,
            rule_source,
            rule,
            connector,
            updated_at: check.updated_at,
        }
    }
}
