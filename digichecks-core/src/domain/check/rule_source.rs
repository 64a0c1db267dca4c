// digichecks-core/src/domain/check/rule_source.rs

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::InternalId;
use crate::domain::error::DomainError;

/// Where a check's rule comes from. Each variant carries exactly the data it
/// needs, so a hosted check without rule text or a remote check without a
/// connector cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// Turtle text stored with the check.
    Hosted { rule: String },
    /// Rule fetched from `endpoint` with the credentials of `connector`.
    RemoteApi {
        endpoint: String,
        connector: InternalId,
    },
}

impl RuleSource {
    pub fn kind(&self) -> RuleSourceKind {
        match self {
            Self::Hosted { .. } => RuleSourceKind::Hosted,
            Self::RemoteApi { .. } => RuleSourceKind::RemoteApi,
        }
    }

    /// The stored `rule` column: Turtle text or the endpoint URL.
    pub fn rule(&self) -> &str {
        match self {
            Self::Hosted { rule } => rule,
            Self::RemoteApi { endpoint, .. } => endpoint,
        }
    }

    pub fn connector(&self) -> Option<InternalId> {
        match self {
            Self::Hosted { .. } => None,
            Self::RemoteApi { connector, .. } => Some(*connector),
        }
    }
}

/// Wire names of the rule sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleSourceKind {
    #[serde(rename = "digichecks_hosted", alias = "hosted")]
    Hosted,
    #[serde(rename = "api", alias = "remote_api")]
    RemoteApi,
}

impl RuleSourceKind {
    pub const ALL: [RuleSourceKind; 2] = [Self::Hosted, Self::RemoteApi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hosted => "digichecks_hosted",
            Self::RemoteApi => "api",
        }
    }

    pub fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RuleSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RuleSourceKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "digichecks_hosted" | "hosted" => Ok(Self::Hosted),
            "api" | "remote_api" => Ok(Self::RemoteApi),
            other => Err(DomainError::UnsupportedRuleSource {
                given: other.to_string(),
                allowed: Self::allowed(),
            }),
        }
    }
}
