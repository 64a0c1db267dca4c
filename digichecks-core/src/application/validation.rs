// digichecks-core/src/application/validation.rs

use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::check::{Check, Verdict};
use crate::domain::conversion::SemanticDocument;
use crate::domain::error::DomainError;
use crate::domain::graph::{Graph, RuleGraph};
use crate::domain::jsonld::{RemoteContexts, context_urls, to_rdf};
use crate::domain::shacl;
use crate::error::DigichecksError;
use crate::ports::context::ContextLoader;

/// Upper bound on context documents pulled in for a single data document.
const MAX_REMOTE_CONTEXTS: usize = 32;

/// Expands semantic documents into triples and validates them against rule
/// graphs.
pub struct DocumentValidator {
    contexts: Arc<dyn ContextLoader>,
}

impl DocumentValidator {
    pub fn new(contexts: Arc<dyn ContextLoader>) -> Self {
        Self { contexts }
    }

    /// JSON-LD to triples. A document with nodes that yields no triple at
    /// all is reported as malformed rather than silently passing.
    #[instrument(skip_all, fields(nodes = document.graph.len()))]
    pub async fn expand(&self, document: &SemanticDocument) -> Result<Graph, DigichecksError> {
        let value = document.to_value();
        let remote = self.load_contexts(&value).await?;
        let graph = to_rdf(&value, &remote)?;

        if graph.is_empty() && !document.graph.is_empty() {
            return Err(DomainError::MalformedData(
                "JSON-LD could not be converted to triples, are you sure the JSON-LD is correct?"
                    .to_string(),
            )
            .into());
        }
        debug!(triples = graph.len(), "Data graph expanded");
        Ok(graph)
    }

    /// Validates the document and wraps the outcome in a verdict. A failing
    /// validation is a `Fail` verdict, not an error.
    #[instrument(skip_all, fields(check = %check.public_id))]
    pub async fn validate(
        &self,
        check: &Check,
        document: &SemanticDocument,
        rules: &RuleGraph,
    ) -> Result<Verdict, DigichecksError> {
        let data = self.expand(document).await?;
        let report = shacl::validate(&data, rules)?;
        info!(
            conforms = report.conforms,
            results = report.results.len(),
            violations = report.violations().count(),
            "Validation finished"
        );
        Ok(Verdict::new(
            check.public_id.as_str(),
            &check.name,
            report.conforms,
            report.to_text(),
        ))
    }

    /// Every context reachable from `document`, following references made by
    /// context documents themselves.
    async fn load_contexts(&self, document: &serde_json::Value) -> Result<RemoteContexts, DigichecksError> {
        let mut loaded = RemoteContexts::new();
        let mut queue: VecDeque<String> = context_urls(document).into_iter().collect();

        while let Some(url) = queue.pop_front() {
            if loaded.contains_key(&url) {
                continue;
            }
            if loaded.len() >= MAX_REMOTE_CONTEXTS {
                return Err(DomainError::MalformedData(format!(
                    "More than {} remote contexts referenced",
                    MAX_REMOTE_CONTEXTS
                ))
                .into());
            }
            debug!(url = %url, "Loading context");
            let context = self.contexts.load(&url).await?;
            queue.extend(context_urls(&context));
            loaded.insert(url, context);
        }
        Ok(loaded)
    }
}
