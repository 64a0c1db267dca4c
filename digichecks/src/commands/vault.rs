// digichecks/src/commands/vault.rs

use digichecks_core::domain::check::Secret;
use digichecks_core::infrastructure::crypto::CredentialVault;

use super::context::AppContext;

pub fn keygen() {
    println!("{}", CredentialVault::generate_key());
}

/// Encrypts `value` with the configured key, for seeding registry files by hand.
pub fn encrypt(app: &AppContext, value: String) -> anyhow::Result<()> {
    let sealed = app.vault()?.encrypt(&Secret::new(value));
    println!("{}", sealed.ciphertext());
    Ok(())
}
