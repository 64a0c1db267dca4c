// digichecks-core/src/domain/jsonld/mod.rs

// JSON-LD to RDF, limited to what validation documents need.

pub mod context;
pub mod rdf;

pub use context::{RemoteContexts, context_urls};
pub use rdf::to_rdf;
