// digichecks/src/commands/mod.rs

pub mod checks;
pub mod companies;
pub mod connectors;
pub mod context;
pub mod convert;
pub mod dataspace;
pub mod run;
pub mod vault;
