// digichecks-core/src/domain/conversion/mod.rs

pub mod dataset_type;
pub mod document;
pub mod markup;
pub mod semantic;
pub mod tabular;

pub use dataset_type::DatasetType;
pub use document::SemanticDocument;
pub use markup::Markup;
pub use semantic::graph_to_document;
pub use tabular::{ColumnMapping, TabularRows};
