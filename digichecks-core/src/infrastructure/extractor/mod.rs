// digichecks-core/src/infrastructure/extractor/mod.rs

pub mod direct;
pub mod subprocess;

pub use direct::{DirectExtractor, RowMapping};
pub use subprocess::SubprocessExtractor;
