// digichecks-core/src/application/mod.rs

pub mod conversion;
pub mod pipeline;
pub mod registry;
pub mod resolver;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI imports use cases from here without knowing the file layout.

pub use conversion::{ConversionPipeline, ConversionProfile, parse_document};
pub use pipeline::{CheckRunner, DataspaceRequest};
pub use registry::{CheckRequest, CheckUpdate, CheckView, ConnectorView, RegistryService};
pub use resolver::{RuleResolver, parse_rule};
pub use validation::DocumentValidator;
