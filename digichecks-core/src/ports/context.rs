// digichecks-core/src/ports/context.rs

use crate::error::DigichecksError;
use async_trait::async_trait;
use serde_json::Value;

/// Fetches JSON-LD context documents referenced by URL.
#[async_trait]
pub trait ContextLoader: Send + Sync {
    /// The full context document (the object holding `@context`).
    async fn load(&self, url: &str) -> Result<Value, DigichecksError>;
}
