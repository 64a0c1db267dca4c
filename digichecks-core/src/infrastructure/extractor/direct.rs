// digichecks-core/src/infrastructure/extractor/direct.rs

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::conversion::Markup;
use crate::domain::conversion::markup::MISSING;
use crate::domain::graph::vocab::{rdf, sml, xsd};
use crate::domain::graph::{
    BoundGraph, Graph, KnowledgeGraph, Literal, PrefixMap, Term, blank, iri, simple, typed,
};
use crate::error::DigichecksError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::extractor::GraphExtractor;

/// Declarative row-to-graph mapping for the in-process extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RowMapping {
    /// `rdf:type` given to every row node.
    pub class: String,
    /// Element whose text names the row node; rows without it become blank nodes.
    pub subject_element: String,
    pub subject_namespace: String,
    pub property_namespace: String,
    /// Elements holding measurements, with the unit IRI attached to each value.
    #[serde(default)]
    pub measures: IndexMap<String, String>,
}

/// Builds the knowledge graph directly from the markup records, without an
/// external engine.
#[derive(Debug, Clone)]
pub struct DirectExtractor {
    mapping: RowMapping,
}

impl DirectExtractor {
    pub fn new(mapping: RowMapping) -> Self {
        Self { mapping }
    }

    pub fn build(&self, markup: &Markup) -> Graph {
        let m = &self.mapping;
        let mut graph = Graph::new();

        for (row, record) in markup.records.iter().enumerate() {
            let subject = record
                .iter()
                .find(|(name, text)| *name == m.subject_element && text != MISSING)
                .map(|(_, text)| iri(format!("{}{}", m.subject_namespace, encode_local(text))))
                .unwrap_or_else(|| blank(format!("row{}", row)));
            graph.add(subject.clone(), rdf::TYPE, iri(&m.class));

            for (column, (name, text)) in record.iter().enumerate() {
                if text == MISSING {
                    continue;
                }
                let predicate = format!("{}{}", m.property_namespace, name);
                match m.measures.get(name) {
                    Some(unit) => {
                        let measure = blank(format!("m{}_{}", row, column));
                        graph.add(subject.clone(), &predicate, measure.clone());
                        graph.add(measure.clone(), rdf::VALUE, typed_value(text).into());
                        graph.add(measure, sml::HAS_UNIT, iri(unit));
                    }
                    None => {
                        graph.add(subject.clone(), &predicate, Term::from(simple(text)));
                    }
                }
            }
        }
        graph
    }
}

#[async_trait]
impl GraphExtractor for DirectExtractor {
    #[instrument(skip_all, fields(rows = markup.records.len()))]
    async fn extract(
        &self,
        markup: &Markup,
        cancel: &CancellationToken,
    ) -> Result<KnowledgeGraph, DigichecksError> {
        if cancel.is_cancelled() {
            return Err(InfrastructureError::Cancelled.into());
        }
        let graph = self.build(markup);
        debug!(triples = graph.len(), "Extraction finished");
        Ok(BoundGraph::new(graph, PrefixMap::default()))
    }
}

/// Numbers keep a numeric datatype so validation can compare them.
/// `xsd:decimal` has no exponent form, so scientific notation is a double.
fn typed_value(text: &str) -> Literal {
    let trimmed = text.trim();
    if trimmed.parse::<i64>().is_ok() {
        return typed(trimmed, xsd::INTEGER);
    }
    if !trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        return simple(text);
    }
    if trimmed.contains(['e', 'E']) {
        typed(trimmed, xsd::DOUBLE)
    } else {
        typed(trimmed, xsd::DECIMAL)
    }
}

/// Percent-encodes everything outside the unreserved URI characters.
fn encode_local(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.trim().bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}
