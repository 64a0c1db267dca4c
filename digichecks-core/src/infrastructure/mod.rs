// digichecks-core/src/infrastructure/mod.rs

pub mod config;
pub mod context_loader;
pub mod crypto;
pub mod error;
pub mod extractor;
pub mod fs;
pub mod http;
pub mod spreadsheet;
pub mod store;

pub use context_loader::{HttpContextLoader, StaticContextLoader};
pub use store::InMemoryRegistry;
