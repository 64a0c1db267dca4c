// digichecks-core/src/infrastructure/crypto/vault.rs

use fernet::Fernet;
use std::fmt;

use crate::domain::check::{SealedCredential, Secret};
use crate::infrastructure::error::InfrastructureError;

/// Symmetric encryption of connector credentials (Fernet tokens).
///
/// The key is handed to the constructor; the vault never reads configuration
/// on its own.
pub struct CredentialVault {
    fernet: Fernet,
}

impl CredentialVault {
    pub fn new(key: &str) -> Result<Self, InfrastructureError> {
        let fernet = Fernet::new(key.trim()).ok_or_else(|| {
            InfrastructureError::InvalidVaultKey(
                "expected 32 bytes encoded as URL-safe base64".to_string(),
            )
        })?;
        Ok(Self { fernet })
    }

    /// Fresh random key for operators.
    pub fn generate_key() -> String {
        Fernet::generate_key()
    }

    pub fn encrypt(&self, plaintext: &Secret) -> SealedCredential {
        SealedCredential::from_ciphertext(self.fernet.encrypt(plaintext.expose().as_bytes()))
    }

    /// Fails with `InvalidCredential` on ciphertext produced under another
    /// key, tampered tokens and non-UTF-8 plaintexts.
    pub fn decrypt(&self, sealed: &SealedCredential) -> Result<Secret, InfrastructureError> {
        let bytes = self
            .fernet
            .decrypt(sealed.ciphertext())
            .map_err(|_| InfrastructureError::InvalidCredential)?;
        String::from_utf8(bytes)
            .map(Secret::new)
            .map_err(|_| InfrastructureError::InvalidCredential)
    }
}

impl fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialVault(***)")
    }
}
