// digichecks-core/src/domain/graph/namespace.rs

use indexmap::IndexMap;

use super::term::Term;
use super::vocab::{owl, rdf, rdfs, sh, xsd};

/// Prefix bindings used to render IRIs as prefixed names (`ex:Sensor`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMap {
    bindings: IndexMap<String, String>,
}

impl Default for PrefixMap {
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind("rdf", rdf::NS);
        map.bind("rdfs", rdfs::NS);
        map.bind("xsd", xsd::NS);
        map.bind("owl", owl::NS);
        map.bind("sh", sh::NS);
        map
    }
}

impl PrefixMap {
    pub fn empty() -> Self {
        Self {
            bindings: IndexMap::new(),
        }
    }

    /// Binds (or rebinds) `prefix`. Later bindings win, so caller-supplied
    /// namespaces override those discovered while parsing.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.bindings.insert(prefix.into(), namespace.into());
    }

    pub fn extend<I, K, V>(&mut self, bindings: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (prefix, namespace) in bindings {
            self.bind(prefix, namespace);
        }
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, n)| (p.as_str(), n.as_str()))
    }

    /// Compacts `iri` against the longest matching namespace. Falls back to
    /// the full IRI when no binding yields a usable local name.
    pub fn compact(&self, iri: &str) -> String {
        self.bindings
            .iter()
            .filter(|(_, ns)| !ns.is_empty())
            .filter_map(|(prefix, ns)| {
                iri.strip_prefix(ns.as_str())
                    .filter(|local| is_local_name(local))
                    .map(|local| (ns.len(), prefix, local))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, prefix, local)| format!("{}:{}", prefix, local))
            .unwrap_or_else(|| iri.to_string())
    }

    /// Plain rendering used in documents: prefixed IRIs, `_:id` blank nodes
    /// and bare literal lexical forms.
    pub fn render_plain(&self, term: &Term) -> String {
        match term {
            Term::NamedNode(node) => self.compact(node.as_str()),
            Term::BlankNode(node) => format!("_:{}", node.as_str()),
            Term::Literal(lit) => lit.value().to_string(),
        }
    }

    /// Renders a term for reports: prefixed IRIs, `_:id` blank
    /// nodes and literal lexical forms.
    pub fn render(&self, term: &Term) -> String {
        match term {
            Term::NamedNode(node) => self.compact(node.as_str()),
            Term::BlankNode(node) => format!("_:{}", node.as_str()),
            Term::Literal(lit) => {
                let mut out = format!("\"{}\"", lit.value());
                if let Some(lang) = lit.language() {
                    out.push('@');
                    out.push_str(lang);
                } else if lit.datatype().as_str() != xsd::STRING {
                    out.push_str("^^");
                    out.push_str(&self.compact(lit.datatype().as_str()));
                }
                out
            }
        }
    }
}

fn is_local_name(local: &str) -> bool {
    !local.is_empty()
        && !local.contains(['/', '#', '?', ' '])
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '%'))
        && !local.ends_with('.')
}
