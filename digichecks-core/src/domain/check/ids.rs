// digichecks-core/src/domain/check/ids.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of record a public id refers to. The prefix makes ids self-describing
/// in logs and API payloads (`ch_...` is always a check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Company,
    Connector,
    Check,
}

impl RecordKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Company => "co",
            Self::Connector => "cn",
            Self::Check => "ch",
        }
    }
}

/// Externally visible identifier, `<prefix>_<32 hex>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicId(String);

impl PublicId {
    pub fn generate(kind: RecordKind) -> Self {
        Self(format!("{}_{}", kind.prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_kind(&self, kind: RecordKind) -> bool {
        self.0
            .strip_prefix(kind.prefix())
            .and_then(|rest| rest.strip_prefix('_'))
            .is_some_and(|hex| hex.len() == 32 && hex.chars().all(|c| c.is_ascii_hexdigit()))
    }
}

impl From<&str> for PublicId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PublicId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal numeric key. Checks reference connectors through it, never
/// through the public id.
pub type InternalId = u64;
