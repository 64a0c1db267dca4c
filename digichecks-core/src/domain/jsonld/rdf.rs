// digichecks-core/src/domain/jsonld/rdf.rs

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use tracing::debug;

use super::context::{
    ActiveContext, Container, KeyMeaning, RemoteContexts, TermDefinition, TypeMapping,
};
use crate::domain::error::DomainError;
use crate::domain::graph::vocab::{rdf, xsd};
use crate::domain::graph::{Graph, Literal, NamedNode, Term, blank, iri, lang_tagged, simple, typed};

/// Deserializes a JSON-LD document straight into triples.
///
/// Supports the parts of JSON-LD 1.1 that validation documents use: local and
/// remote contexts, keyword aliases (including `@nest`), `@vocab`/`@base`,
/// type coercion, language tags, lists, sets, reverse properties and
/// `@graph`. Named graphs are merged into the default graph.
pub fn to_rdf(document: &Value, remote: &RemoteContexts) -> Result<Graph, DomainError> {
    let mut writer = RdfWriter::new(remote);
    let ctx = ActiveContext::default();
    match document {
        Value::Array(items) => {
            for item in items {
                writer.top_level(&ctx, item)?;
            }
        }
        Value::Object(_) => writer.top_level(&ctx, document)?,
        _ => {
            return Err(DomainError::MalformedData(
                "A JSON-LD document must be an object or an array".to_string(),
            ));
        }
    }
    Ok(writer.graph)
}

#[derive(Default)]
struct BlankNodes {
    next: usize,
    labels: HashMap<String, Term>,
}

impl BlankNodes {
    fn fresh(&mut self) -> Term {
        let term = blank(format!("b{}", self.next));
        self.next += 1;
        term
    }

    /// Document labels are remapped so they never collide with generated ones.
    fn labelled(&mut self, label: &str) -> Term {
        if let Some(term) = self.labels.get(label) {
            return term.clone();
        }
        let term = self.fresh();
        self.labels.insert(label.to_string(), term.clone());
        term
    }
}

struct RdfWriter<'r> {
    remote: &'r RemoteContexts,
    graph: Graph,
    blanks: BlankNodes,
}

impl<'r> RdfWriter<'r> {
    fn new(remote: &'r RemoteContexts) -> Self {
        Self {
            remote,
            graph: Graph::new(),
            blanks: BlankNodes::default(),
        }
    }

    fn top_level(&mut self, ctx: &ActiveContext, value: &Value) -> Result<(), DomainError> {
        match value {
            Value::Object(map) if !is_value_or_list(ctx, map) => {
                self.node(ctx, map)?;
                Ok(())
            }
            Value::Array(items) => {
                for item in items {
                    self.top_level(ctx, item)?;
                }
                Ok(())
            }
            // Free-floating values produce no triples.
            _ => Ok(()),
        }
    }

    /// A node whose `@id` is not an absolute IRI yields no triples of its
    /// own; the nodes embedded in it are still written.
    fn node(
        &mut self,
        ctx: &ActiveContext,
        map: &Map<String, Value>,
    ) -> Result<Option<Term>, DomainError> {
        let ctx = match map.get("@context") {
            Some(local) => Cow::Owned(ctx.process(local, self.remote)?),
            None => Cow::Borrowed(ctx),
        };
        let subject = match keyword_entry(&ctx, map, "@id") {
            Some(Value::String(id)) => self.node_ref(&ctx, id),
            Some(_) => {
                return Err(DomainError::MalformedData(
                    "@id values must be strings".to_string(),
                ));
            }
            None => Some(self.blanks.fresh()),
        };
        self.properties(&ctx, map, subject.as_ref())?;
        Ok(subject)
    }

    fn node_ref(&mut self, ctx: &ActiveContext, id: &str) -> Option<Term> {
        if let Some(label) = id.strip_prefix("_:") {
            return Some(self.blanks.labelled(label));
        }
        let expanded = ctx.expand_iri(id, false, true);
        if expanded.is_none() {
            debug!(id = %id, "Dropping node identifier that is not an absolute IRI");
        }
        self.resource(&expanded?)
    }

    /// Term for an expanded identifier: a blank node label or an absolute IRI.
    fn resource(&mut self, expanded: &str) -> Option<Term> {
        if let Some(label) = expanded.strip_prefix("_:") {
            return Some(self.blanks.labelled(label));
        }
        match NamedNode::new(expanded) {
            Ok(node) => Some(node.into()),
            Err(e) => {
                debug!(iri = %expanded, error = %e, "Dropping value that is not an absolute IRI");
                None
            }
        }
    }

    fn properties(
        &mut self,
        ctx: &ActiveContext,
        map: &Map<String, Value>,
        subject: Option<&Term>,
    ) -> Result<(), DomainError> {
        for (key, value) in map {
            if key == "@context" {
                continue;
            }
            match ctx.resolve_key(key) {
                KeyMeaning::Ignored => debug!(key = %key, "Dropping JSON-LD key without IRI mapping"),
                KeyMeaning::Keyword(keyword) => self.keyword(ctx, &keyword, value, subject)?,
                KeyMeaning::Property(iri, def) => {
                    if iri.starts_with("_:") {
                        continue;
                    }
                    self.property(ctx, &iri, def.as_ref(), value, subject)?;
                }
            }
        }
        Ok(())
    }

    fn keyword(
        &mut self,
        ctx: &ActiveContext,
        keyword: &str,
        value: &Value,
        subject: Option<&Term>,
    ) -> Result<(), DomainError> {
        match keyword {
            "@type" => {
                for item in items(value) {
                    let Value::String(t) = item else {
                        return Err(DomainError::MalformedData(
                            "@type values must be strings".to_string(),
                        ));
                    };
                    let object = ctx
                        .expand_iri(t, true, true)
                        .and_then(|expanded| self.resource(&expanded));
                    if let (Some(subject), Some(object)) = (subject, object) {
                        self.graph.add(subject.clone(), rdf::TYPE, object);
                    }
                }
            }
            "@graph" | "@included" => {
                for item in items(value) {
                    self.top_level(ctx, item)?;
                }
            }
            "@nest" => {
                for item in items(value) {
                    let Value::Object(nested) = item else {
                        return Err(DomainError::MalformedData(
                            "@nest values must be objects".to_string(),
                        ));
                    };
                    self.properties(ctx, nested, subject)?;
                }
            }
            "@reverse" => {
                let Value::Object(reverse) = value else {
                    return Err(DomainError::MalformedData(
                        "@reverse must be an object".to_string(),
                    ));
                };
                for (key, inner) in reverse {
                    let KeyMeaning::Property(iri, def) = ctx.resolve_key(key) else {
                        continue;
                    };
                    let Ok(predicate) = NamedNode::new(iri) else {
                        continue;
                    };
                    for object in self.values(ctx, inner, def.as_ref())? {
                        if let Some(subject) = subject {
                            self.graph.link(object, predicate.clone(), subject.clone());
                        }
                    }
                }
            }
            "@value" | "@list" | "@set" => {
                return Err(DomainError::MalformedData(format!(
                    "'{}' is not allowed in a node object",
                    keyword
                )));
            }
            // @id was handled by the caller; the rest carries no triples.
            _ => {}
        }
        Ok(())
    }

    fn property(
        &mut self,
        ctx: &ActiveContext,
        iri: &str,
        def: Option<&TermDefinition>,
        value: &Value,
        subject: Option<&Term>,
    ) -> Result<(), DomainError> {
        let predicate = match NamedNode::new(iri) {
            Ok(predicate) => predicate,
            Err(e) => {
                debug!(iri = %iri, error = %e, "Dropping property that is not an absolute IRI");
                return Ok(());
            }
        };
        let scoped = match def.and_then(|d| d.scoped_context.as_ref()) {
            Some(local) => Cow::Owned(ctx.process(local, self.remote)?),
            None => Cow::Borrowed(ctx),
        };

        let is_list = def.is_some_and(|d| d.container == Container::List);
        let explicit_list =
            matches!(value, Value::Object(m) if keyword_entry(&scoped, m, "@list").is_some());
        let objects = if is_list && !explicit_list {
            vec![self.list(&scoped, value, def)?]
        } else {
            self.values(&scoped, value, def)?
        };

        let Some(subject) = subject else {
            return Ok(());
        };
        let reverse = def.is_some_and(|d| d.reverse);
        for object in objects {
            // Literal subjects are skipped by the graph.
            if reverse {
                self.graph.link(object, predicate.clone(), subject.clone());
            } else {
                self.graph.link(subject.clone(), predicate.clone(), object);
            }
        }
        Ok(())
    }

    fn values(
        &mut self,
        ctx: &ActiveContext,
        value: &Value,
        def: Option<&TermDefinition>,
    ) -> Result<Vec<Term>, DomainError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(entries) => {
                let mut out = Vec::new();
                for entry in entries {
                    out.extend(self.values(ctx, entry, def)?);
                }
                Ok(out)
            }
            Value::Object(map) => {
                if let Some(inner) = keyword_entry(ctx, map, "@value") {
                    return Ok(self.value_object(ctx, map, inner)?.into_iter().collect());
                }
                if let Some(list) = keyword_entry(ctx, map, "@list") {
                    return Ok(vec![self.list(ctx, list, def)?]);
                }
                if let Some(set) = keyword_entry(ctx, map, "@set") {
                    return self.values(ctx, set, def);
                }
                if def.is_some_and(|d| d.container == Container::Language) {
                    return Ok(language_map(map));
                }
                if def.is_some_and(|d| d.container == Container::Index) {
                    let mut out = Vec::new();
                    for entry in map.values() {
                        out.extend(self.values(ctx, entry, def)?);
                    }
                    return Ok(out);
                }
                Ok(self.node(ctx, map)?.into_iter().collect())
            }
            scalar => Ok(self.scalar(ctx, scalar, def).into_iter().collect()),
        }
    }

    fn scalar(
        &mut self,
        ctx: &ActiveContext,
        value: &Value,
        def: Option<&TermDefinition>,
    ) -> Option<Term> {
        let coercion = def.and_then(|d| d.type_mapping.as_ref());
        let datatype = match coercion {
            Some(TypeMapping::Datatype(dt)) => Some(dt.as_str()),
            _ => None,
        };
        match value {
            Value::String(s) => match coercion {
                Some(TypeMapping::Id) => self.node_ref(ctx, s),
                Some(TypeMapping::Vocab) => ctx
                    .expand_iri(s, true, true)
                    .and_then(|expanded| self.resource(&expanded)),
                Some(TypeMapping::Datatype(dt)) => Some(typed_literal(s, dt)?.into()),
                None => {
                    let language = match def.and_then(|d| d.language.clone()) {
                        Some(explicit) => explicit,
                        None => ctx.language.clone(),
                    };
                    Some(Term::from(match language {
                        Some(lang) => lang_tagged(s, &lang),
                        None => simple(s),
                    }))
                }
            },
            Value::Bool(b) => {
                Some(typed_literal(b.to_string(), datatype.unwrap_or(xsd::BOOLEAN))?.into())
            }
            Value::Number(n) => number_literal(n, datatype).map(Term::from),
            _ => None,
        }
    }

    fn value_object(
        &mut self,
        ctx: &ActiveContext,
        map: &Map<String, Value>,
        value: &Value,
    ) -> Result<Option<Term>, DomainError> {
        let datatype = match keyword_entry(ctx, map, "@type") {
            Some(Value::String(t)) if t != "@json" => ctx.expand_iri(t, true, true),
            Some(Value::String(_)) | None => None,
            Some(_) => {
                return Err(DomainError::MalformedData(
                    "@type of a value object must be a string".to_string(),
                ));
            }
        };
        let language = keyword_entry(ctx, map, "@language").and_then(Value::as_str);

        if let Some(dt) = &datatype
            && NamedNode::new(dt.as_str()).is_err()
        {
            return Err(DomainError::MalformedData(format!(
                "@type '{}' of a value object is not an absolute IRI",
                dt
            )));
        }

        let literal = match value {
            Value::Null => return Ok(None),
            Value::String(s) => match (&datatype, language) {
                (Some(dt), _) => typed(s, dt),
                (None, Some(lang)) => lang_tagged(s, lang),
                (None, None) => simple(s),
            },
            Value::Bool(b) => typed(b.to_string(), datatype.as_deref().unwrap_or(xsd::BOOLEAN)),
            Value::Number(n) => match number_literal(n, datatype.as_deref()) {
                Some(lit) => lit,
                None => return Ok(None),
            },
            _ => {
                return Err(DomainError::MalformedData(
                    "@value must be a string, number, boolean or null".to_string(),
                ));
            }
        };
        Ok(Some(literal.into()))
    }

    fn list(
        &mut self,
        ctx: &ActiveContext,
        value: &Value,
        def: Option<&TermDefinition>,
    ) -> Result<Term, DomainError> {
        let mut members = Vec::new();
        for item in items(value) {
            members.extend(self.values(ctx, item, def)?);
        }
        if members.is_empty() {
            return Ok(iri(rdf::NIL));
        }

        let cells: Vec<Term> = members.iter().map(|_| self.blanks.fresh()).collect();
        for (index, member) in members.into_iter().enumerate() {
            let rest = cells
                .get(index + 1)
                .cloned()
                .unwrap_or_else(|| iri(rdf::NIL));
            self.graph.add(cells[index].clone(), rdf::FIRST, member);
            self.graph.add(cells[index].clone(), rdf::REST, rest);
        }
        Ok(cells[0].clone())
    }
}

fn items(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(entries) => entries.iter().collect(),
        other => vec![other],
    }
}

/// Value of the entry whose key means `keyword`, directly or through an alias.
fn keyword_entry<'m>(
    ctx: &ActiveContext,
    map: &'m Map<String, Value>,
    keyword: &str,
) -> Option<&'m Value> {
    map.iter()
        .find(|(key, _)| matches!(ctx.resolve_key(key), KeyMeaning::Keyword(k) if k == keyword))
        .map(|(_, value)| value)
}

fn is_value_or_list(ctx: &ActiveContext, map: &Map<String, Value>) -> bool {
    keyword_entry(ctx, map, "@value").is_some() || keyword_entry(ctx, map, "@list").is_some()
}

fn language_map(map: &Map<String, Value>) -> Vec<Term> {
    map.iter()
        .flat_map(|(lang, texts)| {
            items(texts)
                .into_iter()
                .filter_map(Value::as_str)
                .map(|text| Term::from(lang_tagged(text, lang)))
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Typed literal for a datatype taken from a context. Datatypes that are not
/// absolute IRIs drop the value.
fn typed_literal(lexical: impl Into<String>, datatype: &str) -> Option<Literal> {
    let datatype = NamedNode::new(datatype).ok()?;
    Some(Literal::new_typed_literal(lexical, datatype))
}

/// JSON-LD number conversion: integral values become `xsd:integer`, the rest
/// `xsd:double` in canonical `1.5E0` form.
fn number_literal(n: &Number, datatype: Option<&str>) -> Option<Literal> {
    let value = n.as_f64()?;
    let wants_double = datatype == Some(xsd::DOUBLE);
    if n.is_i64() || n.is_u64() {
        if !wants_double {
            return typed_literal(n.to_string(), datatype.unwrap_or(xsd::INTEGER));
        }
    } else if value.fract() == 0.0 && value.abs() < 1e21 && !wants_double {
        return typed_literal(format!("{:.0}", value), datatype.unwrap_or(xsd::INTEGER));
    }
    typed_literal(canonical_double(value), datatype.unwrap_or(xsd::DOUBLE))
}

fn canonical_double(value: f64) -> String {
    let formatted = format!("{:E}", value);
    match formatted.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{}.0E{}", mantissa, exponent)
        }
        _ => formatted,
    }
}
