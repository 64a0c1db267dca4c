// digichecks-core/src/ports/dataset.rs

use crate::error::DigichecksError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Raw dataset bytes from an external data-exchange platform.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    async fn acquire(
        &self,
        dataset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DigichecksError>;
}
