// digichecks-core/src/ports/rules.rs

use crate::domain::check::Secret;
use crate::error::DigichecksError;
use async_trait::async_trait;

#[async_trait]
pub trait RuleFetcher: Send + Sync {
    /// Performs exactly one authenticated GET of `endpoint` and returns the
    /// Turtle body. No retry.
    async fn fetch(
        &self,
        endpoint: &str,
        username: &str,
        password: &Secret,
    ) -> Result<String, DigichecksError>;
}
