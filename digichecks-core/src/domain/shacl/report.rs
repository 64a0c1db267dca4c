// digichecks-core/src/domain/shacl/report.rs

use std::fmt::Write as _;

use super::path::Path;
use super::shape::Severity;
use crate::domain::graph::vocab::sh;
use crate::domain::graph::{PrefixMap, Term};

/// A single failed constraint.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub focus_node: Term,
    pub result_path: Option<Path>,
    pub value_node: Option<Term>,
    pub source_shape: Term,
    /// Local name of the constraint component.
    pub component: &'static str,
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub conforms: bool,
    pub results: Vec<ValidationResult>,
    prefixes: PrefixMap,
}

impl ValidationReport {
    /// Only `sh:Violation` results make a graph non-conforming.
    pub fn new(results: Vec<ValidationResult>, prefixes: PrefixMap) -> Self {
        let mut report = Self {
            conforms: true,
            results,
            prefixes,
        };
        let conforms = report.violations().next().is_none();
        report.conforms = conforms;
        report
    }

    /// Results that break conformance. Unknown severities count as violations.
    pub fn violations(&self) -> impl Iterator<Item = &ValidationResult> {
        self.results
            .iter()
            .filter(|r| !matches!(r.severity, Severity::Warning | Severity::Info))
    }

    /// Human-readable report text. Produced whatever the outcome.
    pub fn to_text(&self) -> String {
        let p = &self.prefixes;
        let mut out = String::from("Validation Report\n");
        let _ = writeln!(out, "Conforms: {}", if self.conforms { "True" } else { "False" });
        if self.results.is_empty() {
            return out;
        }

        let _ = writeln!(out, "Results ({}):", self.results.len());
        for result in &self.results {
            let _ = writeln!(
                out,
                "Constraint {} in {} ({}{}):",
                result.severity.label(),
                result.component,
                sh::NS,
                result.component
            );
            let _ = writeln!(out, "\tSeverity: {}", p.render(&result.severity.term()));
            let _ = writeln!(out, "\tSource Shape: {}", p.render(&result.source_shape));
            let _ = writeln!(out, "\tFocus Node: {}", p.render(&result.focus_node));
            if let Some(value) = &result.value_node {
                let _ = writeln!(out, "\tValue Node: {}", p.render(value));
            }
            if let Some(path) = &result.result_path {
                let _ = writeln!(out, "\tResult Path: {}", path.render(p));
            }
            let _ = writeln!(out, "\tMessage: {}", result.message);
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::graph::{NamedNode, iri};

    fn result(severity: Severity) -> ValidationResult {
        ValidationResult {
            focus_node: iri("http://example.org/sensor-1"),
            result_path: Some(Path::Predicate(NamedNode::new_unchecked(
                "http://example.org/hasReading",
            ))),
            value_node: None,
            source_shape: iri("http://example.org/ReadingShape"),
            component: "MinCountConstraintComponent",
            severity,
            message: "Less than 1 values on ex:sensor-1->ex:hasReading".to_string(),
        }
    }

    fn prefixes() -> PrefixMap {
        let mut p = PrefixMap::default();
        p.bind("ex", "http://example.org/");
        p
    }

    #[test]
    fn test_conforming_report_text() {
        let report = ValidationReport::new(vec![], prefixes());
        assert!(report.conforms);
        assert_eq!(report.to_text(), "Validation Report\nConforms: True\n");
    }

    #[test]
    fn test_violation_report_text() {
        let report = ValidationReport::new(vec![result(Severity::Violation)], prefixes());
        assert!(!report.conforms);
        assert_eq!(
            report.to_text(),
            "Validation Report\n\
             Conforms: False\n\
             Results (1):\n\
             Constraint Violation in MinCountConstraintComponent \
             (http://www.w3.org/ns/shacl#MinCountConstraintComponent):\n\
             \tSeverity: sh:Violation\n\
             \tSource Shape: ex:ReadingShape\n\
             \tFocus Node: ex:sensor-1\n\
             \tResult Path: ex:hasReading\n\
             \tMessage: Less than 1 values on ex:sensor-1->ex:hasReading\n"
        );
    }

    #[test]
    fn test_warnings_do_not_break_conformance() {
        let report = ValidationReport::new(vec![result(Severity::Warning)], prefixes());
        assert!(report.conforms);
        assert_eq!(report.violations().count(), 0);
        assert!(report.to_text().contains("Constraint Warning in"));
    }

    #[test]
    fn test_unknown_severity_breaks_conformance() {
        let custom = Severity::Other(iri("http://example.org/Blocker"));
        let report = ValidationReport::new(
            vec![result(Severity::Info), result(custom)],
            prefixes(),
        );
        assert!(!report.conforms);
        assert_eq!(report.violations().count(), 1);
        assert!(report.to_text().contains("Severity: ex:Blocker"));
    }
}
