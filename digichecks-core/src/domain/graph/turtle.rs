// digichecks-core/src/domain/graph/turtle.rs

use std::collections::HashMap;

use oxrdf::{BlankNode, Subject, Term, Triple};
use oxttl::TurtleParser;
use thiserror::Error;

use super::namespace::PrefixMap;
use super::store::Graph;

/// Why a Turtle document could not be read. The caller decides whether this
/// is a malformed rule or malformed data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TurtleSyntaxError(pub String);

/// Parses a Turtle document into a graph plus the prefixes it declares.
///
/// Blank node labels are renumbered in order of first appearance (`b0`, `b1`,
/// ...), so parsing the same text twice yields identical graphs.
pub fn parse_turtle(text: &str) -> Result<(Graph, PrefixMap), TurtleSyntaxError> {
    let mut reader = TurtleParser::new().for_reader(text.as_bytes());
    let mut graph = Graph::new();
    let mut labels: HashMap<String, BlankNode> = HashMap::new();

    for triple in reader.by_ref() {
        let triple = triple.map_err(|e| TurtleSyntaxError(e.to_string()))?;

        let subject = match triple.subject {
            Subject::BlankNode(b) => Subject::BlankNode(relabel(&mut labels, b.as_str())),
            named => named,
        };
        let object = match triple.object {
            Term::BlankNode(b) => Term::BlankNode(relabel(&mut labels, b.as_str())),
            Term::Literal(lit) => Term::Literal(normalize_language(lit)),
            other => other,
        };
        graph.insert(&Triple::new(subject, triple.predicate, object));
    }

    let mut prefixes = PrefixMap::default();
    prefixes.extend(reader.prefixes());

    Ok((graph, prefixes))
}

fn relabel(labels: &mut HashMap<String, BlankNode>, original: &str) -> BlankNode {
    let next = labels.len();
    labels
        .entry(original.to_string())
        .or_insert_with(|| BlankNode::new_unchecked(format!("b{}", next)))
        .clone()
}

fn normalize_language(lit: oxrdf::Literal) -> oxrdf::Literal {
    match lit.language() {
        Some(lang) if lang.chars().any(|c| c.is_ascii_uppercase()) => {
            super::term::lang_tagged(lit.value(), lang)
        }
        _ => lit,
    }
}
