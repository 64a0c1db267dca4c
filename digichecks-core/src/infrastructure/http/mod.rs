// digichecks-core/src/infrastructure/http/mod.rs

pub mod dataspace;
pub mod rule_client;

pub use dataspace::{
    DataspaceClient, DataspaceTransport, PlatformHosts, ReqwestTransport, RetryPolicy,
};
pub use rule_client::HttpRuleFetcher;
