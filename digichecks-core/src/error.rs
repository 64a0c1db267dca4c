// digichecks-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DigichecksError {
    // --- DOMAIN ERRORS (rules, data, check definitions) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (network, vault, subprocess, IO) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    #[diagnostic(code(digichecks::internal))]
    InternalError(String),
}

/// Who is to blame for a failure, for the layer mapping errors to a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input, unknown records, undecryptable credentials. Never retried.
    Client,
    /// A remote service or the extraction engine misbehaved.
    Upstream,
    Internal,
}

impl DigichecksError {
    pub fn class(&self) -> ErrorClass {
        match self {
            DigichecksError::Domain(_) => ErrorClass::Client,
            DigichecksError::Infrastructure(err) => match err {
                InfrastructureError::InvalidCredential | InfrastructureError::Cancelled => {
                    ErrorClass::Client
                }
                InfrastructureError::UpstreamUnavailable { .. }
                | InfrastructureError::TransferInitiationFailed { .. }
                | InfrastructureError::DatasetUnavailable { .. }
                | InfrastructureError::ContextUnavailable { .. }
                | InfrastructureError::Timeout { .. } => ErrorClass::Upstream,
                InfrastructureError::GraphExtractionFailed { .. }
                | InfrastructureError::InvalidVaultKey(_)
                | InfrastructureError::Io(_)
                | InfrastructureError::YamlError(_)
                | InfrastructureError::JsonError(_)
                | InfrastructureError::ConfigError(_)
                | InfrastructureError::ConfigNotFound(_) => ErrorClass::Internal,
            },
            DigichecksError::InternalError(_) => ErrorClass::Internal,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            DigichecksError::Infrastructure(InfrastructureError::Cancelled)
        )
    }
}

// Manual implementation to keep `?` on std::io calls
impl From<std::io::Error> for DigichecksError {
    fn from(err: std::io::Error) -> Self {
        DigichecksError::Infrastructure(InfrastructureError::Io(err))
    }
}
