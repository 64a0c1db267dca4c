// digichecks-core/src/domain/shacl/mod.rs

// Shape-constraint validation over the in-memory graph.

pub mod engine;
pub mod path;
pub mod report;
pub mod rules;
pub mod shape;

pub use engine::{validate, Validator};
pub use path::Path;
pub use report::{ValidationReport, ValidationResult};
pub use shape::{Constraint, Severity, Shape, ShapesGraph, Target};
