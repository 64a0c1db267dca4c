// digichecks-core/src/ports/mod.rs

// Outbound contracts of the validation pipeline. Adapters live in
// `infrastructure`; tests plug in hand-written mocks.

pub mod context;
pub mod dataset;
pub mod extractor;
pub mod rules;

pub use context::ContextLoader;
pub use dataset::DatasetSource;
pub use extractor::GraphExtractor;
pub use rules::RuleFetcher;
