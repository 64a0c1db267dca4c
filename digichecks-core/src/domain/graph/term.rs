// digichecks-core/src/domain/graph/term.rs

use std::cmp::Ordering;

pub use oxrdf::{BlankNode, Literal, NamedNode, NamedNodeRef, Subject, SubjectRef, Term, TermRef, Triple};

use super::vocab::xsd;

/// Named node for an IRI the caller already trusts (vocabulary constants,
/// IRIs built from configured namespaces).
pub fn iri(value: impl Into<String>) -> Term {
    NamedNode::new_unchecked(value).into()
}

pub fn named(value: &str) -> NamedNodeRef<'_> {
    NamedNodeRef::new_unchecked(value)
}

pub fn blank(id: impl Into<String>) -> Term {
    BlankNode::new_unchecked(id).into()
}

pub fn simple(lexical: impl Into<String>) -> Literal {
    Literal::new_simple_literal(lexical)
}

pub fn typed(lexical: impl Into<String>, datatype: &str) -> Literal {
    Literal::new_typed_literal(lexical, NamedNode::new_unchecked(datatype))
}

/// Language tags are normalized to lower case, as RDF compares them case-insensitively.
pub fn lang_tagged(lexical: impl Into<String>, language: &str) -> Literal {
    Literal::new_language_tagged_literal_unchecked(lexical, language.to_lowercase())
}

/// Accessors the validator needs on top of the oxrdf term model.
pub trait TermExt {
    fn as_iri(&self) -> Option<&str>;
    fn as_literal(&self) -> Option<&Literal>;
    /// The string a SHACL string-based constraint operates on.
    /// Blank nodes have none.
    fn string_value(&self) -> Option<&str>;
}

impl TermExt for Term {
    fn as_iri(&self) -> Option<&str> {
        match self {
            Term::NamedNode(node) => Some(node.as_str()),
            _ => None,
        }
    }

    fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            _ => None,
        }
    }

    fn string_value(&self) -> Option<&str> {
        match self {
            Term::NamedNode(node) => Some(node.as_str()),
            Term::Literal(lit) => Some(lit.value()),
            Term::BlankNode(_) => None,
        }
    }
}

pub trait LiteralExt {
    fn is_numeric(&self) -> bool;
    /// Numeric view of the literal, only for numeric datatypes with a valid lexical form.
    fn as_f64(&self) -> Option<f64>;
    /// Checks the lexical form against the datatypes the validator knows about.
    /// Unknown datatypes are accepted as-is.
    fn is_well_formed(&self) -> bool;
}

impl LiteralExt for Literal {
    fn is_numeric(&self) -> bool {
        xsd::is_numeric(self.datatype().as_str())
    }

    fn as_f64(&self) -> Option<f64> {
        if !self.is_numeric() {
            return None;
        }
        match self.value().trim() {
            "INF" | "+INF" => Some(f64::INFINITY),
            "-INF" => Some(f64::NEG_INFINITY),
            "NaN" => Some(f64::NAN),
            other => other.parse::<f64>().ok(),
        }
    }

    fn is_well_formed(&self) -> bool {
        let lex = self.value();
        match self.datatype().as_str() {
            xsd::BOOLEAN => matches!(lex, "true" | "false" | "1" | "0"),
            dt if xsd::is_integer_family(dt) => {
                let digits = lex.strip_prefix(['+', '-']).unwrap_or(lex);
                !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
            }
            xsd::DECIMAL => {
                let body = lex.strip_prefix(['+', '-']).unwrap_or(lex);
                !body.is_empty()
                    && body.chars().any(|c| c.is_ascii_digit())
                    && body.chars().all(|c| c.is_ascii_digit() || c == '.')
                    && body.matches('.').count() <= 1
            }
            xsd::DOUBLE | xsd::FLOAT => self.as_f64().is_some(),
            xsd::DATE => is_xsd_date(lex),
            xsd::DATE_TIME => {
                lex.len() >= 19
                    && lex.get(..10).is_some_and(is_xsd_date)
                    && lex.as_bytes().get(10) == Some(&b'T')
            }
            _ => true,
        }
    }
}

fn is_xsd_date(lex: &str) -> bool {
    let bytes = lex.as_bytes();
    bytes.len() >= 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// Total order used wherever output must be reproducible: IRIs, then blank
/// nodes, then literals (lexical form, datatype, language).
pub fn term_order(a: &Term, b: &Term) -> Ordering {
    match (a, b) {
        (Term::NamedNode(x), Term::NamedNode(y)) => x.cmp(y),
        (Term::BlankNode(x), Term::BlankNode(y)) => x.as_str().cmp(y.as_str()),
        (Term::Literal(x), Term::Literal(y)) => (x.value(), x.datatype(), x.language())
            .cmp(&(y.value(), y.datatype(), y.language())),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(term: &Term) -> u8 {
    match term {
        Term::NamedNode(_) => 0,
        Term::BlankNode(_) => 1,
        Term::Literal(_) => 2,
    }
}

/// The subject position of `term`; literals cannot be subjects.
pub fn subject_ref(term: &Term) -> Option<SubjectRef<'_>> {
    match term {
        Term::NamedNode(node) => Some(node.as_ref().into()),
        Term::BlankNode(node) => Some(node.as_ref().into()),
        Term::Literal(_) => None,
    }
}
