// digichecks-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    // --- RULES & DATA ---
    #[error("Malformed rule: {0}")]
    #[diagnostic(
        code(digichecks::domain::malformed_rule),
        help("The rule must be a valid Turtle document describing SHACL shapes.")
    )]
    MalformedRule(String),

    #[error("Malformed data: {0}")]
    #[diagnostic(
        code(digichecks::domain::malformed_data),
        help("Check the dataset structure and the JSON-LD contexts it references.")
    )]
    MalformedData(String),

    // --- CHECK DEFINITIONS ---
    #[error("Unsupported rule source '{given}'")]
    #[diagnostic(
        code(digichecks::domain::rule_source),
        help("Allowed rule sources: {allowed}")
    )]
    UnsupportedRuleSource { given: String, allowed: String },

    #[error("Unsupported dataset type '{given}'")]
    #[diagnostic(
        code(digichecks::domain::dataset_type),
        help("Allowed dataset types: {allowed}")
    )]
    UnsupportedDatasetType { given: String, allowed: String },

    #[error("Invalid check: {0}")]
    #[diagnostic(code(digichecks::domain::invalid_check))]
    InvalidCheck(String),

    // --- REGISTRY ---
    #[error("Check '{0}' not found")]
    #[diagnostic(code(digichecks::domain::check_not_found))]
    CheckNotFound(String),

    #[error("Connector '{0}' not found")]
    #[diagnostic(code(digichecks::domain::connector_not_found))]
    ConnectorNotFound(String),

    #[error("Connector '{connector}' is still referenced by {checks} check(s)")]
    #[diagnostic(
        code(digichecks::domain::connector_in_use),
        help("Delete or re-point the checks using this connector first.")
    )]
    ConnectorInUse { connector: String, checks: usize },

    #[error("Company '{0}' not found")]
    #[diagnostic(code(digichecks::domain::company_not_found))]
    CompanyNotFound(String),
}
