// digichecks-core/src/domain/shacl/engine.rs

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::{debug, instrument};

use super::path::Path;
use super::report::{ValidationReport, ValidationResult};
use super::rules::TripleRule;
use super::shape::{Constraint, Shape, ShapesGraph, Target};
use crate::domain::error::DomainError;
use crate::domain::graph::vocab::xsd;
use crate::domain::graph::{
    Graph, LiteralExt, NamedNode, PrefixMap, RuleGraph, Term, TermExt, TermSet, term_order,
};

const MAX_SHAPE_DEPTH: usize = 32;

/// Validates `data` against the shapes of `rules`.
///
/// The rule graph doubles as the ontology: it is merged into the data before
/// targets are computed, so class hierarchies declared next to the shapes
/// apply. Triple rules run once, in `sh:order`, before any constraint.
#[instrument(skip_all, fields(triples = data.len(), rule_triples = rules.graph.len()))]
pub fn validate(data: &Graph, rules: &RuleGraph) -> Result<ValidationReport, DomainError> {
    let shapes = ShapesGraph::parse(&rules.graph)?;
    let triple_rules = TripleRule::parse_all(&rules.graph)?;

    let mut working = data.clone();
    working.merge_disjoint(&rules.graph, "rules");

    for rule in &triple_rules {
        let inferred = {
            let validator = Validator::new(&working, &shapes, &rules.prefixes);
            rule.infer(&validator)?
        };
        debug!(rule = %rule.id, inferred = inferred.len(), "Applied triple rule");
        for triple in inferred {
            working.insert(&triple);
        }
    }

    let validator = Validator::new(&working, &shapes, &rules.prefixes);
    let mut results = Vec::new();
    for shape in shapes.iter().filter(|s| !s.deactivated) {
        for focus in validator.focus_nodes(shape) {
            results.extend(validator.check(shape, &focus, 0)?);
        }
    }
    debug!(shapes = shapes.len(), results = results.len(), "Validation finished");

    Ok(ValidationReport::new(results, rules.prefixes.clone()))
}

/// Read-only view over the working graph used while evaluating shapes.
pub struct Validator<'g> {
    data: &'g Graph,
    shapes: &'g ShapesGraph,
    prefixes: &'g PrefixMap,
}

impl<'g> Validator<'g> {
    pub fn new(data: &'g Graph, shapes: &'g ShapesGraph, prefixes: &'g PrefixMap) -> Self {
        Self {
            data,
            shapes,
            prefixes,
        }
    }

    pub fn data(&self) -> &Graph {
        self.data
    }

    pub fn shapes(&self) -> &ShapesGraph {
        self.shapes
    }

    /// Distinct focus nodes of `shape`, in term order.
    pub fn focus_nodes(&self, shape: &Shape) -> TermSet {
        let mut nodes = TermSet::new();
        for target in &shape.targets {
            match target {
                Target::Class(class) => nodes.extend(self.data.instances_of(class)),
                Target::Node(node) => {
                    nodes.insert(node.clone());
                }
                Target::SubjectsOf(p) => nodes.extend(
                    self.data
                        .pairs_for(p.as_ref())
                        .into_iter()
                        .map(|(s, _)| s),
                ),
                Target::ObjectsOf(p) => nodes.extend(
                    self.data
                        .pairs_for(p.as_ref())
                        .into_iter()
                        .map(|(_, o)| o),
                ),
            }
        }
        nodes.sort_by(term_order);
        nodes
    }

    /// Whether `node` conforms to the shape `shape_id`. Results of any
    /// severity count as non-conformance here.
    pub fn conforms_to(
        &self,
        shape_id: &Term,
        node: &Term,
        depth: usize,
    ) -> Result<bool, DomainError> {
        let shape = self.shapes.get(shape_id).ok_or_else(|| {
            DomainError::MalformedRule(format!("{} is referenced as a shape but is not one", shape_id))
        })?;
        Ok(self.check(shape, node, depth + 1)?.is_empty())
    }

    /// Evaluates every constraint of `shape` against one focus node.
    pub fn check(
        &self,
        shape: &Shape,
        focus: &Term,
        depth: usize,
    ) -> Result<Vec<ValidationResult>, DomainError> {
        if depth > MAX_SHAPE_DEPTH {
            return Err(DomainError::MalformedRule(format!(
                "Shape {} recurses deeper than {} levels",
                shape.id, MAX_SHAPE_DEPTH
            )));
        }
        if shape.deactivated {
            return Ok(Vec::new());
        }

        let values: TermSet = match &shape.path {
            Some(path) => path.evaluate(self.data, focus),
            None => TermSet::from([focus.clone()]),
        };

        let mut results = Vec::new();
        for constraint in &shape.constraints {
            let mut found = |value: Option<Term>, path: Option<Path>, default: String| {
                results.push(self.result(shape, constraint, focus, value, path, default));
            };
            let path = || shape.path.clone();

            match constraint {
                Constraint::Class(class) => {
                    for v in values.iter().filter(|v| !self.data.is_instance_of(v, class)) {
                        found(
                            Some(v.clone()),
                            path(),
                            format!("Value does not have class {}", self.show(class)),
                        );
                    }
                }
                Constraint::Datatype(datatype) => {
                    for v in &values {
                        let ok = v.as_literal().is_some_and(|l| {
                            l.datatype().as_str() == datatype.as_str() && l.is_well_formed()
                        });
                        if !ok {
                            found(
                                Some(v.clone()),
                                path(),
                                format!(
                                    "Value is not Literal with datatype {}",
                                    self.prefixes.compact(datatype)
                                ),
                            );
                        }
                    }
                }
                Constraint::NodeKind(kind) => {
                    for v in values.iter().filter(|v| !kind.matches(v)) {
                        found(
                            Some(v.clone()),
                            path(),
                            format!("Value is not of Node Kind {}", self.prefixes.compact(kind.iri())),
                        );
                    }
                }
                Constraint::MinCount(min) => {
                    if values.len() < *min {
                        found(None, path(), self.count_message("Less than", *min, focus, shape));
                    }
                }
                Constraint::MaxCount(max) => {
                    if values.len() > *max {
                        found(None, path(), self.count_message("More than", *max, focus, shape));
                    }
                }
                Constraint::MinExclusive(bound)
                | Constraint::MinInclusive(bound)
                | Constraint::MaxExclusive(bound)
                | Constraint::MaxInclusive(bound) => {
                    let (accepts, symbol): (fn(Ordering) -> bool, &str) = match constraint {
                        Constraint::MinExclusive(_) => (|o| o == Ordering::Greater, ">"),
                        Constraint::MinInclusive(_) => (|o| o != Ordering::Less, ">="),
                        Constraint::MaxExclusive(_) => (|o| o == Ordering::Less, "<"),
                        _ => (|o| o != Ordering::Greater, "<="),
                    };
                    for v in &values {
                        if !compare(v, bound).is_some_and(accepts) {
                            found(
                                Some(v.clone()),
                                path(),
                                format!("Value is not {} {}", symbol, self.show(bound)),
                            );
                        }
                    }
                }
                Constraint::MinLength(min) | Constraint::MaxLength(min) => {
                    let is_min = matches!(constraint, Constraint::MinLength(_));
                    for v in &values {
                        let ok = v.string_value().is_some_and(|s| {
                            let len = s.chars().count();
                            if is_min { len >= *min } else { len <= *min }
                        });
                        if !ok {
                            found(
                                Some(v.clone()),
                                path(),
                                format!(
                                    "String length not {} {}",
                                    if is_min { ">=" } else { "<=" },
                                    min
                                ),
                            );
                        }
                    }
                }
                Constraint::Pattern(pattern) => {
                    for v in &values {
                        if !v.string_value().is_some_and(|s| pattern.regex.is_match(s)) {
                            found(
                                Some(v.clone()),
                                path(),
                                format!("Value does not match pattern '{}'", pattern.source),
                            );
                        }
                    }
                }
                Constraint::LanguageIn(languages) => {
                    for v in &values {
                        let ok = v
                            .as_literal()
                            .and_then(|l| l.language())
                            .is_some_and(|lang| languages.iter().any(|l| language_matches(lang, l)));
                        if !ok {
                            found(
                                Some(v.clone()),
                                path(),
                                format!("String language is not in {:?}", languages),
                            );
                        }
                    }
                }
                Constraint::UniqueLang => {
                    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
                    for lang in values
                        .iter()
                        .filter_map(|v| v.as_literal().and_then(|l| l.language()))
                    {
                        *seen.entry(lang).or_default() += 1;
                    }
                    for (lang, _) in seen.into_iter().filter(|(_, n)| *n > 1) {
                        found(
                            None,
                            path(),
                            format!("More than one String shares the same Language ({})", lang),
                        );
                    }
                }
                Constraint::Equals(p) => {
                    let other: TermSet = self.data.objects_of(focus, p.as_ref()).into_iter().collect();
                    for v in values.symmetric_difference(&other) {
                        found(
                            Some(v.clone()),
                            path(),
                            format!(
                                "Value of {}->{} != {}",
                                self.show(focus),
                                self.show_predicate(p),
                                self.show(v)
                            ),
                        );
                    }
                }
                Constraint::Disjoint(p) => {
                    let other: TermSet = self.data.objects_of(focus, p.as_ref()).into_iter().collect();
                    for v in values.intersection(&other) {
                        found(
                            Some(v.clone()),
                            path(),
                            format!(
                                "Value of {}->{} == {}",
                                self.show(focus),
                                self.show_predicate(p),
                                self.show(v)
                            ),
                        );
                    }
                }
                Constraint::LessThan(p) | Constraint::LessThanOrEquals(p) => {
                    let strict = matches!(constraint, Constraint::LessThan(_));
                    let other = self.data.objects_of(focus, p.as_ref());
                    for v in &values {
                        for w in &other {
                            let ok = match compare(v, &w) {
                                Some(Ordering::Less) => true,
                                Some(Ordering::Equal) => !strict,
                                _ => false,
                            };
                            if !ok {
                                found(
                                    Some(v.clone()),
                                    path(),
                                    format!(
                                        "Value of {}->{} {} {}",
                                        self.show(focus),
                                        self.show_predicate(p),
                                        if strict { "<=" } else { "<" },
                                        self.show(v)
                                    ),
                                );
                            }
                        }
                    }
                }
                Constraint::Not(negated) => {
                    for v in &values {
                        if self.conforms_to(negated, v, depth)? {
                            found(
                                Some(v.clone()),
                                path(),
                                format!(
                                    "Node {} conforms to shape {}",
                                    self.show(v),
                                    self.show(negated)
                                ),
                            );
                        }
                    }
                }
                Constraint::And(members) | Constraint::Or(members) | Constraint::Xone(members) => {
                    for v in &values {
                        let mut passing = 0;
                        for member in members {
                            if self.conforms_to(member, v, depth)? {
                                passing += 1;
                            }
                        }
                        let (ok, wording) = match constraint {
                            Constraint::And(_) => (passing == members.len(), "all"),
                            Constraint::Or(_) => (passing > 0, "one or more"),
                            _ => (passing == 1, "exactly one"),
                        };
                        if !ok {
                            found(
                                Some(v.clone()),
                                path(),
                                format!(
                                    "Node {} must conform to {} shapes in {}",
                                    self.show(v),
                                    wording,
                                    self.show_list(members)
                                ),
                            );
                        }
                    }
                }
                Constraint::Node(node_shape) => {
                    for v in &values {
                        if !self.conforms_to(node_shape, v, depth)? {
                            found(
                                Some(v.clone()),
                                path(),
                                format!(
                                    "Value does not conform to Shape {}",
                                    self.show(node_shape)
                                ),
                            );
                        }
                    }
                }
                Constraint::Property(property_shape) => {
                    let nested = self.shapes.get(property_shape).ok_or_else(|| {
                        DomainError::MalformedRule(format!(
                            "sh:property of {} does not point at a shape",
                            shape.id
                        ))
                    })?;
                    if !nested.is_property_shape() {
                        return Err(DomainError::MalformedRule(format!(
                            "sh:property of {} points at {}, which has no sh:path",
                            shape.id, property_shape
                        )));
                    }
                    for v in &values {
                        results.extend(self.check(nested, v, depth + 1)?);
                    }
                }
                Constraint::QualifiedValueShape {
                    shape: qualified,
                    min,
                    max,
                    disjoint,
                } => {
                    let siblings = if *disjoint {
                        self.shapes.sibling_qualified_shapes(&shape.id)
                    } else {
                        TermSet::new()
                    };
                    let mut count = 0;
                    for v in &values {
                        if !self.conforms_to(qualified, v, depth)? {
                            continue;
                        }
                        let mut in_sibling = false;
                        for sibling in &siblings {
                            if self.conforms_to(sibling, v, depth)? {
                                in_sibling = true;
                                break;
                            }
                        }
                        if !in_sibling {
                            count += 1;
                        }
                    }
                    if let Some(min) = min
                        && count < *min
                    {
                        found(
                            None,
                            path(),
                            format!(
                                "Focus node has {} values conforming to {}, expected at least {}",
                                count,
                                self.show(qualified),
                                min
                            ),
                        );
                    }
                    if let Some(max) = max
                        && count > *max
                    {
                        found(
                            None,
                            path(),
                            format!(
                                "Focus node has {} values conforming to {}, expected at most {}",
                                count,
                                self.show(qualified),
                                max
                            ),
                        );
                    }
                }
                Constraint::Closed { ignored } => {
                    let mut allowed: Vec<&NamedNode> = ignored.iter().collect();
                    for c in &shape.constraints {
                        if let Constraint::Property(id) = c
                            && let Some(predicate) = self
                                .shapes
                                .get(id)
                                .and_then(|s| s.path.as_ref())
                                .and_then(Path::predicate)
                        {
                            allowed.push(predicate);
                        }
                    }
                    for v in &values {
                        for (p, o) in self.data.predicate_objects(v) {
                            if !allowed.contains(&&p) {
                                let message = format!(
                                    "Node {} is closed. It cannot have value: {}",
                                    self.show(v),
                                    self.show(&o)
                                );
                                found(Some(o), Some(Path::Predicate(p)), message);
                            }
                        }
                    }
                }
                Constraint::HasValue(expected) => {
                    if !values.contains(expected) {
                        found(
                            None,
                            path(),
                            format!("Value must be {}", self.show(expected)),
                        );
                    }
                }
                Constraint::In(members) => {
                    for v in values.iter().filter(|v| !members.contains(v)) {
                        found(
                            Some(v.clone()),
                            path(),
                            format!(
                                "Value {} not in list {}",
                                self.show(v),
                                self.show_list(members)
                            ),
                        );
                    }
                }
            }
        }
        Ok(results)
    }

    fn result(
        &self,
        shape: &Shape,
        constraint: &Constraint,
        focus: &Term,
        value: Option<Term>,
        path: Option<Path>,
        default_message: String,
    ) -> ValidationResult {
        let message = shape
            .messages
            .first()
            .map(|m| m.value().to_string())
            .unwrap_or(default_message);
        ValidationResult {
            focus_node: focus.clone(),
            result_path: path,
            value_node: value,
            source_shape: shape.id.clone(),
            component: constraint.component(),
            severity: shape.severity.clone(),
            message,
        }
    }

    fn count_message(&self, relation: &str, n: usize, focus: &Term, shape: &Shape) -> String {
        let path = shape
            .path
            .as_ref()
            .map(|p| p.render(self.prefixes))
            .unwrap_or_default();
        format!("{} {} values on {}->{}", relation, n, self.show(focus), path)
    }

    fn show(&self, term: &Term) -> String {
        self.prefixes.render(term)
    }

    fn show_predicate(&self, predicate: &NamedNode) -> String {
        self.prefixes.compact(predicate.as_str())
    }

    fn show_list(&self, terms: &[Term]) -> String {
        let items: Vec<String> = terms.iter().map(|t| self.show(t)).collect();
        format!("[{}]", items.join(", "))
    }
}

/// Orders two literals when they are comparable: both numeric, or both
/// of the same string/date datatype.
fn compare(a: &Term, b: &Term) -> Option<Ordering> {
    let (a, b) = (a.as_literal()?, b.as_literal()?);
    if a.is_numeric() && b.is_numeric() {
        return a.as_f64()?.partial_cmp(&b.as_f64()?);
    }
    let comparable = a.datatype() == b.datatype()
        && matches!(a.datatype().as_str(), xsd::STRING | xsd::DATE | xsd::DATE_TIME)
        && a.is_well_formed()
        && b.is_well_formed();
    comparable.then(|| a.value().cmp(b.value()))
}

fn language_matches(tag: &str, range: &str) -> bool {
    let range = range.to_lowercase();
    range == "*"
        || tag == range
        || tag
            .strip_prefix(range.as_str())
            .is_some_and(|rest| rest.starts_with('-'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::graph::{iri, parse_turtle, BoundGraph};

    fn rules(ttl: &str) -> RuleGraph {
        let (graph, prefixes) = parse_turtle(ttl).unwrap();
        BoundGraph::new(graph, prefixes)
    }

    fn data(ttl: &str) -> Graph {
        parse_turtle(ttl).unwrap().0
    }

    const SENSOR_RULES: &str = r#"
        @prefix ex: <http://example.org/> .
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix sml: <https://w3id.org/sml/def#> .
        @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .

        ex:SensorShape a sh:NodeShape ;
            sh:targetClass ex:Sensor ;
            sh:property [
                sh:path ex:hasReading ;
                sh:minCount 1 ;
                sh:node ex:MeasuredShape
            ] .

        ex:MeasuredShape a sh:NodeShape ;
            sh:property [ sh:path rdf:value ; sh:minCount 1 ] ;
            sh:property [ sh:path sml:hasUnit ; sh:minCount 1 ; sh:nodeKind sh:IRI ] .
    "#;

    #[test]
    fn test_sensor_without_reading_fails() {
        let report = validate(
            &data(
                r#"
                @prefix ex: <http://example.org/> .
                ex:sensor-1 a ex:Sensor .
                "#,
            ),
            &rules(SENSOR_RULES),
        )
        .unwrap();
        assert!(!report.conforms);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].component, "MinCountConstraintComponent");
        assert!(report.to_text().contains("ex:sensor-1"));
    }

    #[test]
    fn test_sensor_with_measured_reading_passes() {
        let report = validate(
            &data(
                r#"
                @prefix ex: <http://example.org/> .
                @prefix sml: <https://w3id.org/sml/def#> .
                @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
                ex:sensor-1 a ex:Sensor ;
                    ex:hasReading [ rdf:value 21.5 ; sml:hasUnit <http://qudt.org/vocab/unit/DEG_C> ] .
                "#,
            ),
            &rules(SENSOR_RULES),
        )
        .unwrap();
        assert!(report.conforms, "{}", report.to_text());
    }

    #[test]
    fn test_reading_without_unit_fails_through_nested_shape() {
        let report = validate(
            &data(
                r#"
                @prefix ex: <http://example.org/> .
                @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
                ex:sensor-1 a ex:Sensor ; ex:hasReading [ rdf:value 21.5 ] .
                "#,
            ),
            &rules(SENSOR_RULES),
        )
        .unwrap();
        assert!(!report.conforms);
        assert_eq!(report.results[0].component, "NodeConstraintComponent");
    }

    #[test]
    fn test_subclass_instances_are_targeted() {
        let report = validate(
            &data(
                r#"
                @prefix ex: <http://example.org/> .
                @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
                ex:Thermometer rdfs:subClassOf ex:Sensor .
                ex:t-1 a ex:Thermometer .
                "#,
            ),
            &rules(SENSOR_RULES),
        )
        .unwrap();
        assert!(!report.conforms);
        assert_eq!(
            report.results[0].focus_node,
            iri("http://example.org/t-1")
        );
    }

    #[test]
    fn test_value_range_and_datatype() {
        let rules = rules(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            @prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
            ex:PowerShape sh:targetSubjectsOf ex:power ;
                sh:property [
                    sh:path ex:power ;
                    sh:datatype xsd:integer ;
                    sh:minInclusive 0 ;
                    sh:maxExclusive 100
                ] .
            "#,
        );
        let ok = validate(
            &data("@prefix ex: <http://example.org/> . ex:a ex:power 42 ."),
            &rules,
        )
        .unwrap();
        assert!(ok.conforms);

        let bad = validate(
            &data("@prefix ex: <http://example.org/> . ex:a ex:power 100 . ex:b ex:power \"7\" ."),
            &rules,
        )
        .unwrap();
        let components: std::collections::BTreeSet<_> = bad.results.iter().map(|r| r.component).collect();
        assert!(components.contains("MaxExclusiveConstraintComponent"));
        assert!(components.contains("DatatypeConstraintComponent"));
        // "7" is a string: not comparable with 0 either.
        assert!(components.contains("MinInclusiveConstraintComponent"));
    }

    #[test]
    fn test_logical_constraints() {
        let rules = rules(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:HasName sh:path ex:name ; sh:minCount 1 .
            ex:HasLabel sh:path ex:label ; sh:minCount 1 .
            ex:S sh:targetClass ex:Thing ;
                sh:xone ( ex:HasName ex:HasLabel ) ;
                sh:not [ sh:path ex:banned ; sh:minCount 1 ] .
            "#,
        );
        let report = validate(
            &data(
                r#"
                @prefix ex: <http://example.org/> .
                ex:one a ex:Thing ; ex:name "n" .
                ex:both a ex:Thing ; ex:name "n" ; ex:label "l" .
                ex:banned a ex:Thing ; ex:label "l" ; ex:banned true .
                "#,
            ),
            &rules,
        )
        .unwrap();
        let failing: Vec<_> = report
            .results
            .iter()
            .map(|r| (r.focus_node.clone(), r.component))
            .collect();
        assert_eq!(failing.len(), 2);
        assert!(failing.contains(&(iri("http://example.org/both"), "XoneConstraintComponent")));
        assert!(failing.contains(&(iri("http://example.org/banned"), "NotConstraintComponent")));
    }

    #[test]
    fn test_closed_shape_reports_extra_predicates() {
        let rules = rules(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
            ex:S sh:targetNode ex:a ;
                sh:closed true ;
                sh:ignoredProperties ( rdf:type ) ;
                sh:property [ sh:path ex:name ] .
            "#,
        );
        let report = validate(
            &data("@prefix ex: <http://example.org/> . ex:a a ex:T ; ex:name \"x\" ; ex:extra 1 ."),
            &rules,
        )
        .unwrap();
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].component, "ClosedConstraintComponent");
    }

    #[test]
    fn test_custom_message_and_warning_severity() {
        let rules = rules(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:targetNode ex:a ;
                sh:path ex:label ;
                sh:minCount 1 ;
                sh:severity sh:Warning ;
                sh:message "A label is recommended" .
            "#,
        );
        let report = validate(&Graph::new(), &rules).unwrap();
        assert!(report.conforms);
        assert_eq!(report.results[0].message, "A label is recommended");
    }

    #[test]
    fn test_recursive_shape_is_malformed() {
        let rules = rules(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:targetNode ex:a ; sh:node ex:S .
            "#,
        );
        assert!(matches!(
            validate(&Graph::new(), &rules),
            Err(DomainError::MalformedRule(_))
        ));
    }

    #[test]
    fn test_property_without_path_is_malformed() {
        let rules = rules(
            r#"
            @prefix ex: <http://example.org/> .
            @prefix sh: <http://www.w3.org/ns/shacl#> .
            ex:S sh:targetNode ex:a ; sh:property ex:P .
            ex:P a sh:NodeShape ; sh:minCount 1 .
            "#,
        );
        let err = validate(&Graph::new(), &rules).unwrap_err();
        assert!(matches!(err, DomainError::MalformedRule(ref m) if m.contains("no sh:path")));
    }

    #[test]
    fn test_language_matching() {
        assert!(language_matches("en-gb", "en"));
        assert!(language_matches("en", "EN"));
        assert!(!language_matches("eng", "en"));
    }
}
