pub mod check;
pub mod conversion;
pub mod error;
pub mod graph;
pub mod jsonld;
pub mod ports;
pub mod shacl;

// Re-exports to keep imports short elsewhere
pub use error::DomainError;
