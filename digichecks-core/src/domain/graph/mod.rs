// digichecks-core/src/domain/graph/mod.rs

pub mod namespace;
pub mod store;
pub mod term;
pub mod turtle;
pub mod vocab;

pub use namespace::PrefixMap;
pub use store::{Graph, TermSet};
pub use term::{
    BlankNode, Literal, LiteralExt, NamedNode, NamedNodeRef, Subject, Term, TermExt, Triple, blank,
    iri, lang_tagged, named, simple, term_order, typed,
};
pub use turtle::{TurtleSyntaxError, parse_turtle};

/// A graph together with the prefixes used to render its IRIs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundGraph {
    pub graph: Graph,
    pub prefixes: PrefixMap,
}

impl BoundGraph {
    pub fn new(graph: Graph, prefixes: PrefixMap) -> Self {
        Self { graph, prefixes }
    }
}

/// Shapes graph resolved from a check.
pub type RuleGraph = BoundGraph;

/// Graph extracted from markup, before it becomes a semantic document.
pub type KnowledgeGraph = BoundGraph;
