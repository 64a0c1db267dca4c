// digichecks-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: async contracts for rule fetching, extraction, datasets, contexts.
pub mod ports;

// 2. Domain: graphs, JSON-LD, SHACL, checks and conversion.
// Depends on nothing outside itself.
pub mod domain;

// 3. Infrastructure: HTTP clients, vault, extractors, config, registry store.
pub mod infrastructure;

// 4. Application: use cases wiring the ports together.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::{DigichecksError, ErrorClass};
