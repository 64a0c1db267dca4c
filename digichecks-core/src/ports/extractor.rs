// digichecks-core/src/ports/extractor.rs

use crate::domain::conversion::Markup;
use crate::domain::graph::KnowledgeGraph;
use crate::error::DigichecksError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Turns the markup serialization of tabular rows into a knowledge graph.
#[async_trait]
pub trait GraphExtractor: Send + Sync {
    async fn extract(
        &self,
        markup: &Markup,
        cancel: &CancellationToken,
    ) -> Result<KnowledgeGraph, DigichecksError>;
}
