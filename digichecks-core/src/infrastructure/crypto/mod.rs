// digichecks-core/src/infrastructure/crypto/mod.rs

pub mod vault;

pub use vault::CredentialVault;
