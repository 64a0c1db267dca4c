// digichecks-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- VAULT ---
    #[error("Credential could not be decrypted with the configured key")]
    #[diagnostic(
        code(digichecks::infra::vault::invalid_credential),
        help("The stored ciphertext was produced with another key or is corrupted.")
    )]
    InvalidCredential,

    #[error("Invalid vault key: {0}")]
    #[diagnostic(
        code(digichecks::infra::vault::invalid_key),
        help("Generate a key with `digichecks vault keygen` (32 bytes, URL-safe base64).")
    )]
    InvalidVaultKey(String),

    // --- NETWORK ---
    #[error("Rule endpoint '{endpoint}' is unavailable: {reason}")]
    #[diagnostic(code(digichecks::infra::http::upstream_unavailable))]
    UpstreamUnavailable { endpoint: String, reason: String },

    #[error("Failed to start transfer process for dataset '{dataset_id}': {reason}")]
    #[diagnostic(code(digichecks::infra::dataspace::transfer))]
    TransferInitiationFailed { dataset_id: String, reason: String },

    #[error("Dataset '{dataset_id}' unavailable after {attempts} attempt(s): {last_error}")]
    #[diagnostic(
        code(digichecks::infra::dataspace::unavailable),
        help("The producer may still be preparing the transfer; try again later.")
    )]
    DatasetUnavailable {
        dataset_id: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Context document '{url}' could not be loaded: {reason}")]
    #[diagnostic(code(digichecks::infra::context))]
    ContextUnavailable { url: String, reason: String },

    // --- EXTRACTION ---
    #[error("Graph extraction failed:\n{stderr}")]
    #[diagnostic(
        code(digichecks::infra::extractor),
        help("The message above is the extraction engine's own output.")
    )]
    GraphExtractionFailed { stderr: String },

    #[error("{operation} timed out after {seconds}s")]
    #[diagnostic(code(digichecks::infra::timeout))]
    Timeout { operation: String, seconds: u64 },

    #[error("Operation cancelled")]
    #[diagnostic(code(digichecks::infra::cancelled))]
    Cancelled,

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(digichecks::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / SERIALIZATION ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(digichecks::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(digichecks::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(digichecks::infra::config))]
    ConfigError(String),

    #[error("Service configuration not found at '{0}'")]
    #[diagnostic(code(digichecks::infra::config_missing))]
    ConfigNotFound(String),
}
