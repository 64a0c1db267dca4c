// digichecks-core/src/domain/conversion/semantic.rs

use serde_json::{Map, Number, Value};
use tracing::warn;

use super::document::SemanticDocument;
use crate::domain::graph::vocab::{rdf, sml, xsd};
use crate::domain::graph::{KnowledgeGraph, Literal, NamedNode, Term};

pub const QUANTITATIVE: &str = "quantitativeProperties";
pub const NON_QUANTITATIVE: &str = "nonQuantitativeProperties";
pub const RELATIONS: &str = "relations";

/// Turns an extracted knowledge graph into the canonical document.
///
/// Every typed subject becomes one node. A predicate is quantitative when one
/// of its objects carries `rdf:value`; everything else is a relation. The
/// classification only looks at graph structure, never at predicate names.
pub fn graph_to_document(knowledge: &KnowledgeGraph) -> SemanticDocument {
    let graph = &knowledge.graph;
    let prefixes = &knowledge.prefixes;
    let mut nodes = Vec::new();

    for subject in graph.subjects() {
        let types: Vec<Value> = graph
            .objects(&subject, rdf::TYPE)
            .iter()
            .map(|t| Value::String(prefixes.render_plain(t)))
            .collect();
        if types.is_empty() {
            continue;
        }

        let mut quantitative = Map::new();
        let mut relations = Map::new();

        let mut predicates: Vec<NamedNode> = graph
            .predicate_objects(&subject)
            .into_iter()
            .map(|(p, _)| p)
            .filter(|p| p.as_str() != rdf::TYPE)
            .collect();
        predicates.dedup();

        for predicate in predicates {
            let key = prefixes.compact(predicate.as_str());
            let objects = graph.objects_of(&subject, predicate.as_ref());

            if objects.iter().any(|o| graph.object(o, rdf::VALUE).is_some()) {
                let mut measured = Vec::new();
                for object in &objects {
                    match graph.object(object, rdf::VALUE) {
                        Some(value) => {
                            let unit = graph
                                .object(object, sml::HAS_UNIT)
                                .map(|u| Value::String(prefixes.render_plain(&u)))
                                .unwrap_or(Value::Null);
                            let mut entry = Map::new();
                            entry.insert("value".to_string(), term_to_json(&value, knowledge));
                            entry.insert("hasUnit".to_string(), unit);
                            measured.push(Value::Object(entry));
                        }
                        None => warn!(
                            subject = %subject,
                            predicate = %key,
                            "Skipping non-measured value of a quantitative property"
                        ),
                    }
                }
                quantitative.insert(key, collapse(measured));
            } else {
                let values = objects
                    .iter()
                    .map(|o| Value::String(prefixes.render_plain(o)))
                    .collect();
                relations.insert(key, collapse(values));
            }
        }

        let mut node = Map::new();
        node.insert("@id".to_string(), Value::String(prefixes.render_plain(&subject)));
        node.insert("@type".to_string(), collapse(types));
        node.insert(QUANTITATIVE.to_string(), Value::Object(quantitative));
        node.insert(NON_QUANTITATIVE.to_string(), Value::Object(Map::new()));
        node.insert(RELATIONS.to_string(), Value::Object(relations));
        nodes.push(Value::Object(node));
    }

    SemanticDocument::with_default_context(nodes)
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

/// Native JSON form of a measured value: numbers and booleans stay typed.
fn term_to_json(term: &Term, knowledge: &KnowledgeGraph) -> Value {
    match term {
        Term::Literal(lit) => literal_to_json(lit),
        other => Value::String(knowledge.prefixes.render_plain(other)),
    }
}

pub fn literal_to_json(lit: &Literal) -> Value {
    let lexical = lit.value().trim();
    let datatype = lit.datatype().as_str();
    if xsd::is_integer_family(datatype) {
        if let Ok(n) = lexical.parse::<i64>() {
            return Value::Number(n.into());
        }
    } else if xsd::is_numeric(datatype) {
        if let Some(n) = lexical.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    } else if datatype == xsd::BOOLEAN {
        match lexical {
            "true" | "1" => return Value::Bool(true),
            "false" | "0" => return Value::Bool(false),
            _ => {}
        }
    }
    Value::String(lit.value().to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::graph::{BoundGraph, Graph, PrefixMap, blank, iri, simple, typed};
    use std::collections::BTreeSet;

    const EX: &str = "http://example.org/realia/dataset/";
    const OTL: &str = "http://realia.es/realia-otl/";

    fn knowledge() -> KnowledgeGraph {
        let mut g = Graph::new();
        let cgp = iri(format!("{EX}CGP-1"));
        let power = blank("q0");
        g.add(cgp.clone(), rdf::TYPE, iri(format!("{OTL}SupplyPoint")));
        g.add(cgp.clone(), &format!("{OTL}power"), power.clone());
        g.add(power.clone(), rdf::VALUE, Term::from(typed("5.5", xsd::DECIMAL)));
        g.add(power, sml::HAS_UNIT, iri("http://qudt.org/vocab/unit/KiloW"));
        g.add(cgp.clone(), &format!("{OTL}portal"), Term::from(simple("P1")));
        g.add(cgp.clone(), &format!("{OTL}locatedIn"), iri(format!("{EX}LGA-2")));
        g.add(cgp, &format!("{OTL}locatedIn"), iri(format!("{EX}LGA-3")));

        let mut prefixes = PrefixMap::default();
        prefixes.bind("ex", EX);
        prefixes.bind("realia_otl", OTL);
        prefixes.bind("unit", "http://qudt.org/vocab/unit/");
        BoundGraph::new(g, prefixes)
    }

    #[test]
    fn test_node_shape() {
        let doc = graph_to_document(&knowledge());
        assert_eq!(doc.graph.len(), 1);
        let node = &doc.graph[0];
        assert_eq!(node["@id"], "ex:CGP-1");
        assert_eq!(node["@type"], "realia_otl:SupplyPoint");
        assert_eq!(
            node[QUANTITATIVE]["realia_otl:power"],
            serde_json::json!({"value": 5.5, "hasUnit": "unit:KiloW"})
        );
        assert_eq!(node[RELATIONS]["realia_otl:portal"], "P1");
        assert_eq!(
            node[RELATIONS]["realia_otl:locatedIn"],
            serde_json::json!(["ex:LGA-2", "ex:LGA-3"])
        );
        assert_eq!(node[NON_QUANTITATIVE], serde_json::json!({}));
    }

    #[test]
    fn test_every_predicate_lands_in_exactly_one_partition() {
        let doc = graph_to_document(&knowledge());
        let node = doc.graph[0].as_object().unwrap();
        let quantitative: BTreeSet<_> = node[QUANTITATIVE].as_object().unwrap().keys().collect();
        let relations: BTreeSet<_> = node[RELATIONS].as_object().unwrap().keys().collect();
        assert!(quantitative.is_disjoint(&relations));
        assert_eq!(quantitative.len() + relations.len(), 3);
    }

    #[test]
    fn test_untyped_subjects_are_not_nodes() {
        let doc = graph_to_document(&knowledge());
        assert!(doc.graph.iter().all(|n| n["@id"] != "_:q0"));
    }

    #[test]
    fn test_missing_unit_is_null() {
        let mut k = knowledge();
        let subject = iri(format!("{EX}CGP-1"));
        let reading = blank("q1");
        k.graph.add(subject, &format!("{OTL}simultaneousPower"), reading.clone());
        k.graph.add(reading, rdf::VALUE, Term::from(typed("7", xsd::INTEGER)));

        let doc = graph_to_document(&k);
        assert_eq!(
            doc.graph[0][QUANTITATIVE]["realia_otl:simultaneousPower"],
            serde_json::json!({"value": 7, "hasUnit": null})
        );
    }

    #[test]
    fn test_document_is_reproducible() {
        assert_eq!(graph_to_document(&knowledge()), graph_to_document(&knowledge()));
    }
}
