// digichecks-core/src/domain/ports/mod.rs

pub mod registry;

pub use registry::Registry;
