// digichecks-core/src/domain/shacl/shape.rs

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::path::Path;
use crate::domain::error::DomainError;
use crate::domain::graph::vocab::{owl, rdfs, sh, xsd};
use crate::domain::graph::{
    Graph, Literal, NamedNode, Term, TermExt, TermSet, iri, named, term_order,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Severity {
    Violation,
    Warning,
    Info,
    Other(Term),
}

impl Severity {
    fn from_term(term: Option<&Term>) -> Self {
        match term.and_then(TermExt::as_iri) {
            None | Some(sh::VIOLATION) => Severity::Violation,
            Some(sh::WARNING) => Severity::Warning,
            Some(sh::INFO) => Severity::Info,
            Some(_) => Severity::Other(term.cloned().unwrap_or_else(|| iri(sh::VIOLATION))),
        }
    }

    pub fn term(&self) -> Term {
        match self {
            Severity::Violation => iri(sh::VIOLATION),
            Severity::Warning => iri(sh::WARNING),
            Severity::Info => iri(sh::INFO),
            Severity::Other(t) => t.clone(),
        }
    }

    /// Report heading word ("Constraint Violation in ...").
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Violation | Severity::Other(_) => "Violation",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Class(Term),
    Node(Term),
    SubjectsOf(NamedNode),
    ObjectsOf(NamedNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Iri,
    BlankNode,
    Literal,
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    IriOrLiteral,
}

impl NodeKind {
    fn from_iri(iri: &str) -> Option<Self> {
        Some(match iri {
            sh::IRI => NodeKind::Iri,
            sh::BLANK_NODE => NodeKind::BlankNode,
            sh::LITERAL => NodeKind::Literal,
            sh::BLANK_NODE_OR_IRI => NodeKind::BlankNodeOrIri,
            sh::BLANK_NODE_OR_LITERAL => NodeKind::BlankNodeOrLiteral,
            sh::IRI_OR_LITERAL => NodeKind::IriOrLiteral,
            _ => return None,
        })
    }

    pub fn matches(&self, term: &Term) -> bool {
        match self {
            NodeKind::Iri => term.is_named_node(),
            NodeKind::BlankNode => term.is_blank_node(),
            NodeKind::Literal => term.is_literal(),
            NodeKind::BlankNodeOrIri => !term.is_literal(),
            NodeKind::BlankNodeOrLiteral => !term.is_named_node(),
            NodeKind::IriOrLiteral => !term.is_blank_node(),
        }
    }

    pub fn iri(&self) -> &'static str {
        match self {
            NodeKind::Iri => sh::IRI,
            NodeKind::BlankNode => sh::BLANK_NODE,
            NodeKind::Literal => sh::LITERAL,
            NodeKind::BlankNodeOrIri => sh::BLANK_NODE_OR_IRI,
            NodeKind::BlankNodeOrLiteral => sh::BLANK_NODE_OR_LITERAL,
            NodeKind::IriOrLiteral => sh::IRI_OR_LITERAL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub flags: Option<String>,
    pub regex: Regex,
}

/// One constraint component instance of a shape.
#[derive(Debug, Clone)]
pub enum Constraint {
    Class(Term),
    Datatype(String),
    NodeKind(NodeKind),
    MinCount(usize),
    MaxCount(usize),
    MinExclusive(Term),
    MinInclusive(Term),
    MaxExclusive(Term),
    MaxInclusive(Term),
    MinLength(usize),
    MaxLength(usize),
    Pattern(Pattern),
    LanguageIn(Vec<String>),
    UniqueLang,
    Equals(NamedNode),
    Disjoint(NamedNode),
    LessThan(NamedNode),
    LessThanOrEquals(NamedNode),
    Not(Term),
    And(Vec<Term>),
    Or(Vec<Term>),
    Xone(Vec<Term>),
    Node(Term),
    Property(Term),
    QualifiedValueShape {
        shape: Term,
        min: Option<usize>,
        max: Option<usize>,
        disjoint: bool,
    },
    Closed {
        ignored: Vec<NamedNode>,
    },
    HasValue(Term),
    In(Vec<Term>),
}

impl Constraint {
    /// Local name of the constraint component, e.g. `MinCountConstraintComponent`.
    pub fn component(&self) -> &'static str {
        match self {
            Constraint::Class(_) => "ClassConstraintComponent",
            Constraint::Datatype(_) => "DatatypeConstraintComponent",
            Constraint::NodeKind(_) => "NodeKindConstraintComponent",
            Constraint::MinCount(_) => "MinCountConstraintComponent",
            Constraint::MaxCount(_) => "MaxCountConstraintComponent",
            Constraint::MinExclusive(_) => "MinExclusiveConstraintComponent",
            Constraint::MinInclusive(_) => "MinInclusiveConstraintComponent",
            Constraint::MaxExclusive(_) => "MaxExclusiveConstraintComponent",
            Constraint::MaxInclusive(_) => "MaxInclusiveConstraintComponent",
            Constraint::MinLength(_) => "MinLengthConstraintComponent",
            Constraint::MaxLength(_) => "MaxLengthConstraintComponent",
            Constraint::Pattern(_) => "PatternConstraintComponent",
            Constraint::LanguageIn(_) => "LanguageInConstraintComponent",
            Constraint::UniqueLang => "UniqueLangConstraintComponent",
            Constraint::Equals(_) => "EqualsConstraintComponent",
            Constraint::Disjoint(_) => "DisjointConstraintComponent",
            Constraint::LessThan(_) => "LessThanConstraintComponent",
            Constraint::LessThanOrEquals(_) => "LessThanOrEqualsConstraintComponent",
            Constraint::Not(_) => "NotConstraintComponent",
            Constraint::And(_) => "AndConstraintComponent",
            Constraint::Or(_) => "OrConstraintComponent",
            Constraint::Xone(_) => "XoneConstraintComponent",
            Constraint::Node(_) => "NodeConstraintComponent",
            Constraint::Property(_) => "PropertyConstraintComponent",
            Constraint::QualifiedValueShape { .. } => "QualifiedValueShapeConstraintComponent",
            Constraint::Closed { .. } => "ClosedConstraintComponent",
            Constraint::HasValue(_) => "HasValueConstraintComponent",
            Constraint::In(_) => "InConstraintComponent",
        }
    }
}

/// A node or property shape read from the rule graph.
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: Term,
    /// `Some` for property shapes.
    pub path: Option<Path>,
    pub targets: Vec<Target>,
    pub constraints: Vec<Constraint>,
    pub severity: Severity,
    pub messages: Vec<Literal>,
    pub deactivated: bool,
}

impl Shape {
    pub fn is_property_shape(&self) -> bool {
        self.path.is_some()
    }
}

/// All shapes of a rule graph, keyed by shape node and kept in term order.
#[derive(Debug, Clone, Default)]
pub struct ShapesGraph {
    shapes: IndexMap<Term, Shape>,
    /// Property shape -> shapes declaring it through `sh:property`.
    parents: IndexMap<Term, Vec<Term>>,
}

// Predicates whose objects are shapes.
const SHAPE_REFERENCES: [&str; 4] = [sh::NODE, sh::PROPERTY, sh::NOT, sh::QUALIFIED_VALUE_SHAPE];
const SHAPE_LISTS: [&str; 3] = [sh::AND, sh::OR, sh::XONE];

impl ShapesGraph {
    pub fn parse(rules: &Graph) -> Result<Self, DomainError> {
        let mut pending: Vec<Term> = Vec::new();

        for class in [sh::NODE_SHAPE, sh::PROPERTY_SHAPE] {
            pending.extend(rules.instances_of(&iri(class)));
        }
        for predicate in [
            sh::TARGET_CLASS,
            sh::TARGET_NODE,
            sh::TARGET_SUBJECTS_OF,
            sh::TARGET_OBJECTS_OF,
            sh::PATH,
        ] {
            pending.extend(rules.pairs_for(named(predicate)).into_iter().map(|(s, _)| s));
        }

        let mut graph = ShapesGraph::default();
        while let Some(id) = pending.pop() {
            if graph.shapes.contains_key(&id) || id.is_literal() {
                continue;
            }
            let shape = parse_shape(rules, &id)?;

            for predicate in SHAPE_REFERENCES {
                pending.extend(rules.objects(&id, predicate));
            }
            for predicate in SHAPE_LISTS {
                for list in rules.objects(&id, predicate) {
                    pending.extend(rules.list(&list)?);
                }
            }
            for child in rules.objects(&id, sh::PROPERTY) {
                graph.parents.entry(child).or_default().push(id.clone());
            }
            graph.shapes.insert(id, shape);
        }
        graph.shapes.sort_by(|a, _, b, _| term_order(a, b));
        Ok(graph)
    }

    pub fn get(&self, id: &Term) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Qualified value shapes of the siblings of `property_shape`, used by
    /// `sh:qualifiedValueShapesDisjoint`.
    pub fn sibling_qualified_shapes(&self, property_shape: &Term) -> TermSet {
        let mut siblings = TermSet::new();
        for parent in self.parents.get(property_shape).into_iter().flatten() {
            let Some(parent) = self.shapes.get(parent) else {
                continue;
            };
            for constraint in &parent.constraints {
                let Constraint::Property(sibling) = constraint else {
                    continue;
                };
                if sibling == property_shape {
                    continue;
                }
                if let Some(sibling) = self.shapes.get(sibling) {
                    for c in &sibling.constraints {
                        if let Constraint::QualifiedValueShape { shape, .. } = c {
                            siblings.insert(shape.clone());
                        }
                    }
                }
            }
        }
        siblings
    }
}

fn parse_shape(rules: &Graph, id: &Term) -> Result<Shape, DomainError> {
    let path = rules
        .object(id, sh::PATH)
        .map(|p| Path::parse(rules, &p))
        .transpose()?;

    let mut targets = Vec::new();
    for class in rules.objects(id, sh::TARGET_CLASS) {
        targets.push(Target::Class(class));
    }
    // A shape that is also a class targets its own instances.
    if rules.is_instance_of(id, &iri(rdfs::CLASS)) || rules.is_instance_of(id, &iri(owl::CLASS)) {
        targets.push(Target::Class(id.clone()));
    }
    for node in rules.objects(id, sh::TARGET_NODE) {
        targets.push(Target::Node(node));
    }
    for p in rules.objects(id, sh::TARGET_SUBJECTS_OF) {
        targets.push(Target::SubjectsOf(predicate(id, sh::TARGET_SUBJECTS_OF, p)?));
    }
    for p in rules.objects(id, sh::TARGET_OBJECTS_OF) {
        targets.push(Target::ObjectsOf(predicate(id, sh::TARGET_OBJECTS_OF, p)?));
    }

    let deactivated = rules
        .objects(id, sh::DEACTIVATED)
        .iter()
        .any(|t| t.as_literal().is_some_and(|l| l.value() == "true"));

    let messages = rules
        .objects(id, sh::MESSAGE)
        .into_iter()
        .filter_map(|t| match t {
            Term::Literal(lit) => Some(lit),
            _ => None,
        })
        .collect();

    for unsupported in [sh::SPARQL, sh::JS] {
        if rules.object(id, unsupported).is_some() {
            warn!(shape = %id, component = unsupported, "Skipping scripted constraint");
        }
    }

    Ok(Shape {
        id: id.clone(),
        path,
        targets,
        constraints: parse_constraints(rules, id)?,
        severity: Severity::from_term(rules.object(id, sh::SEVERITY).as_ref()),
        messages,
        deactivated,
    })
}

fn parse_constraints(rules: &Graph, id: &Term) -> Result<Vec<Constraint>, DomainError> {
    let mut out = Vec::new();
    let values = |predicate: &str| rules.objects(id, predicate);
    let predicates = |parameter: &str| -> Result<Vec<NamedNode>, DomainError> {
        values(parameter)
            .into_iter()
            .map(|p| predicate(id, parameter, p))
            .collect()
    };

    for class in values(sh::CLASS) {
        out.push(Constraint::Class(class));
    }
    for datatype in values(sh::DATATYPE) {
        let iri = datatype.as_iri().ok_or_else(|| {
            DomainError::MalformedRule(format!("sh:datatype of {} must be an IRI", id))
        })?;
        out.push(Constraint::Datatype(iri.to_string()));
    }
    for kind in values(sh::NODE_KIND) {
        let parsed = kind.as_iri().and_then(NodeKind::from_iri).ok_or_else(|| {
            DomainError::MalformedRule(format!("Unknown sh:nodeKind {} on {}", kind, id))
        })?;
        out.push(Constraint::NodeKind(parsed));
    }
    for n in values(sh::MIN_COUNT) {
        out.push(Constraint::MinCount(integer(id, sh::MIN_COUNT, &n)?));
    }
    for n in values(sh::MAX_COUNT) {
        out.push(Constraint::MaxCount(integer(id, sh::MAX_COUNT, &n)?));
    }
    out.extend(values(sh::MIN_EXCLUSIVE).into_iter().map(Constraint::MinExclusive));
    out.extend(values(sh::MIN_INCLUSIVE).into_iter().map(Constraint::MinInclusive));
    out.extend(values(sh::MAX_EXCLUSIVE).into_iter().map(Constraint::MaxExclusive));
    out.extend(values(sh::MAX_INCLUSIVE).into_iter().map(Constraint::MaxInclusive));
    for n in values(sh::MIN_LENGTH) {
        out.push(Constraint::MinLength(integer(id, sh::MIN_LENGTH, &n)?));
    }
    for n in values(sh::MAX_LENGTH) {
        out.push(Constraint::MaxLength(integer(id, sh::MAX_LENGTH, &n)?));
    }

    let flags = rules
        .object(id, sh::FLAGS)
        .and_then(|t| t.as_literal().map(|l| l.value().to_string()));
    for pattern in values(sh::PATTERN) {
        let source = pattern
            .as_literal()
            .map(|l| l.value().to_string())
            .ok_or_else(|| {
                DomainError::MalformedRule(format!("sh:pattern of {} must be a literal", id))
            })?;
        out.push(Constraint::Pattern(compile_pattern(id, source, flags.clone())?));
    }

    for list in values(sh::LANGUAGE_IN) {
        let languages = rules
            .list(&list)?
            .iter()
            .filter_map(TermExt::as_literal)
            .map(|l| l.value().to_lowercase())
            .collect();
        out.push(Constraint::LanguageIn(languages));
    }
    if is_true(rules.object(id, sh::UNIQUE_LANG)) {
        out.push(Constraint::UniqueLang);
    }

    out.extend(predicates(sh::EQUALS)?.into_iter().map(Constraint::Equals));
    out.extend(predicates(sh::DISJOINT)?.into_iter().map(Constraint::Disjoint));
    out.extend(predicates(sh::LESS_THAN)?.into_iter().map(Constraint::LessThan));
    out.extend(
        predicates(sh::LESS_THAN_OR_EQUALS)?
            .into_iter()
            .map(Constraint::LessThanOrEquals),
    );

    out.extend(values(sh::NOT).into_iter().map(Constraint::Not));
    for list in values(sh::AND) {
        out.push(Constraint::And(rules.list(&list)?));
    }
    for list in values(sh::OR) {
        out.push(Constraint::Or(rules.list(&list)?));
    }
    for list in values(sh::XONE) {
        out.push(Constraint::Xone(rules.list(&list)?));
    }
    out.extend(values(sh::NODE).into_iter().map(Constraint::Node));
    out.extend(values(sh::PROPERTY).into_iter().map(Constraint::Property));

    for shape in values(sh::QUALIFIED_VALUE_SHAPE) {
        let min = rules
            .object(id, sh::QUALIFIED_MIN_COUNT)
            .map(|n| integer(id, sh::QUALIFIED_MIN_COUNT, &n))
            .transpose()?;
        let max = rules
            .object(id, sh::QUALIFIED_MAX_COUNT)
            .map(|n| integer(id, sh::QUALIFIED_MAX_COUNT, &n))
            .transpose()?;
        out.push(Constraint::QualifiedValueShape {
            shape,
            min,
            max,
            disjoint: is_true(rules.object(id, sh::QUALIFIED_VALUE_SHAPES_DISJOINT)),
        });
    }

    if is_true(rules.object(id, sh::CLOSED)) {
        let ignored = match rules.object(id, sh::IGNORED_PROPERTIES) {
            Some(list) => rules
                .list(&list)?
                .into_iter()
                .map(|p| predicate(id, sh::IGNORED_PROPERTIES, p))
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };
        out.push(Constraint::Closed { ignored });
    }

    out.extend(values(sh::HAS_VALUE).into_iter().map(Constraint::HasValue));
    for list in values(sh::IN) {
        out.push(Constraint::In(rules.list(&list)?));
    }

    Ok(out)
}

fn is_true(term: Option<Term>) -> bool {
    term.as_ref().and_then(TermExt::as_literal).is_some_and(|l| {
        l.datatype().as_str() == xsd::BOOLEAN && matches!(l.value(), "true" | "1")
    })
}

/// Parameters naming a property must be IRIs.
fn predicate(shape: &Term, parameter: &str, value: Term) -> Result<NamedNode, DomainError> {
    NamedNode::try_from(value).map_err(|e| {
        DomainError::MalformedRule(format!("{} on {} must be an IRI: {}", parameter, shape, e))
    })
}

fn integer(shape: &Term, parameter: &str, value: &Term) -> Result<usize, DomainError> {
    value
        .as_literal()
        .and_then(|l| l.value().trim().parse::<usize>().ok())
        .ok_or_else(|| {
            DomainError::MalformedRule(format!(
                "{} on {} must be a non-negative integer, got {}",
                parameter, shape, value
            ))
        })
}

fn compile_pattern(
    shape: &Term,
    source: String,
    flags: Option<String>,
) -> Result<Pattern, DomainError> {
    let mut builder = RegexBuilder::new(&source);
    for flag in flags.as_deref().unwrap_or("").chars() {
        match flag {
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            's' => builder.dot_matches_new_line(true),
            'x' => builder.ignore_whitespace(true),
            other => {
                warn!(shape = %shape, flag = %other, "Ignoring unsupported sh:flags entry");
                &mut builder
            }
        };
    }
    let regex = builder.build().map_err(|e| {
        DomainError::MalformedRule(format!("Invalid sh:pattern on {}: {}", shape, e))
    })?;
    Ok(Pattern {
        source,
        flags,
        regex,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::graph::parse_turtle;

    const RULES: &str = r#"
        @prefix ex: <http://example.org/> .
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .

        ex:SensorShape a sh:NodeShape ;
            sh:targetClass ex:Sensor ;
            sh:property ex:ReadingShape ;
            sh:closed true ;
            sh:ignoredProperties ( ex:note ) .

        ex:ReadingShape sh:path ex:hasReading ;
            sh:minCount 1 ;
            sh:severity sh:Warning ;
            sh:node [ sh:property [ sh:path ex:unit ; sh:minCount 1 ] ] ;
            sh:pattern "^r" ;
            sh:flags "i" .
    "#;

    #[test]
    fn test_shapes_are_discovered_through_references() {
        let (rules, _) = parse_turtle(RULES).unwrap();
        let shapes = ShapesGraph::parse(&rules).unwrap();
        // node shape, property shape, anonymous node shape, nested property shape
        assert_eq!(shapes.len(), 4);

        let reading = shapes.get(&iri("http://example.org/ReadingShape")).unwrap();
        assert!(reading.is_property_shape());
        assert_eq!(reading.severity, Severity::Warning);
        assert!(reading
            .constraints
            .iter()
            .any(|c| matches!(c, Constraint::MinCount(1))));
        let pattern = reading
            .constraints
            .iter()
            .find_map(|c| match c {
                Constraint::Pattern(p) => Some(p),
                _ => None,
            })
            .unwrap();
        assert!(pattern.regex.is_match("Reading"));
    }

    #[test]
    fn test_closed_shape_reads_ignored_properties() {
        let (rules, _) = parse_turtle(RULES).unwrap();
        let shapes = ShapesGraph::parse(&rules).unwrap();
        let sensor = shapes.get(&iri("http://example.org/SensorShape")).unwrap();
        assert_eq!(sensor.targets, vec![Target::Class(iri("http://example.org/Sensor"))]);
        assert!(sensor.constraints.iter().any(|c| matches!(
            c,
            Constraint::Closed { ignored }
                if ignored == &vec![NamedNode::new_unchecked("http://example.org/note")]
        )));
    }

    #[test]
    fn test_bad_count_is_malformed_rule() {
        let (rules, _) = parse_turtle(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:targetNode ex:a ; sh:path ex:p ; sh:minCount "many" .
            "#,
        )
        .unwrap();
        assert!(matches!(
            ShapesGraph::parse(&rules),
            Err(DomainError::MalformedRule(_))
        ));
    }

    #[test]
    fn test_invalid_pattern_is_malformed_rule() {
        let (rules, _) = parse_turtle(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:targetNode ex:a ; sh:pattern "(" .
            "#,
        )
        .unwrap();
        assert!(ShapesGraph::parse(&rules).is_err());
    }
}
