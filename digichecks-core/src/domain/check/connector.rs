// digichecks-core/src/domain/check/connector.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{InternalId, PublicId};
use crate::domain::error::DomainError;

/// A decrypted credential. Only lives for the duration of an outbound call
/// and never shows up in logs. Deserializable (configuration files) but never
/// serialized back.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Vault ciphertext of a connector credential. This is the only form in which
/// a credential is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SealedCredential(String);

impl SealedCredential {
    pub fn from_ciphertext(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn ciphertext(&self) -> &str {
        &self.0
    }
}

/// Company-scoped credential bundle used to fetch remote rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    pub id: InternalId,
    pub public_id: PublicId,
    pub company: InternalId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    pub username: String,
    pub credential: SealedCredential,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorDraft {
    pub name: String,
    pub username: String,
    pub password: Secret,
    pub token_endpoint: Option<String>,
}

/// Partial update. Empty strings mean "no change", like check patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectorPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub token_endpoint: Option<String>,
}

impl ConnectorDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::InvalidCheck(
                "Connector name must not be empty".to_string(),
            ));
        }
        if self.username.trim().is_empty() {
            return Err(DomainError::InvalidCheck(
                "Connector username must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl ConnectorPatch {
    /// The new plaintext credential, if the patch really carries one.
    pub fn new_password(&self) -> Option<&Secret> {
        self.password.as_ref().filter(|p| !p.is_empty())
    }
}

impl Connector {
    pub fn from_draft(
        id: InternalId,
        public_id: PublicId,
        company: InternalId,
        draft: ConnectorDraft,
        credential: SealedCredential,
    ) -> Result<Self, DomainError> {
        draft.validate()?;
        Ok(Self {
            id,
            public_id,
            company,
            name: draft.name.trim().to_string(),
            token_endpoint: draft.token_endpoint.filter(|t| !t.trim().is_empty()),
            username: draft.username,
            credential,
            updated_at: Utc::now(),
        })
    }

    /// Applies `patch`. `resealed` must be the encryption of the patch's new
    /// password when it has one; otherwise the stored ciphertext is kept.
    pub fn apply(&self, patch: ConnectorPatch, resealed: Option<SealedCredential>) -> Self {
        let pick = |incoming: Option<String>, current: &str| {
            incoming
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| current.to_string())
        };
        Self {
            id: self.id,
            public_id: self.public_id.clone(),
            company: self.company,
            name: pick(patch.name, &self.name),
            username: pick(patch.username, &self.username),
            token_endpoint: patch
                .token_endpoint
                .filter(|t| !t.trim().is_empty())
                .or_else(|| self.token_endpoint.clone()),
            credential: resealed.unwrap_or_else(|| self.credential.clone()),
            updated_at: Utc::now(),
        }
    }
}
