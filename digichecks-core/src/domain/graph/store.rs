// digichecks-core/src/domain/graph/store.rs

use indexmap::IndexSet;
use oxrdf::{SubjectRef, TermRef, TripleRef};

use super::term::{BlankNode, NamedNode, NamedNodeRef, Subject, Term, Triple};
use super::term::{named, subject_ref, term_order};
use super::vocab::{rdf, rdfs};
use crate::domain::error::DomainError;

/// Distinct terms, kept in the order they were reached.
pub type TermSet = IndexSet<Term>;

/// Triple set backed by the indexed `oxrdf::Graph`.
///
/// Both the rule graph and the data graph live in this structure. Lookups
/// return owned terms sorted with `term_order`, which keeps conversions and
/// reports reproducible between runs whatever the index layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    inner: oxrdf::Graph,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` when the triple was not already present.
    pub fn insert(&mut self, triple: &Triple) -> bool {
        self.inner.insert(triple)
    }

    /// Literal subjects cannot be stated and are skipped.
    pub fn link(&mut self, subject: Term, predicate: NamedNode, object: Term) -> bool {
        match Subject::try_from(subject) {
            Ok(subject) => self.inner.insert(&Triple::new(subject, predicate, object)),
            Err(_) => false,
        }
    }

    pub fn add(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.link(subject, NamedNode::new_unchecked(predicate), object)
    }

    pub fn contains(&self, subject: &Term, predicate: NamedNodeRef<'_>, object: &Term) -> bool {
        subject_ref(subject)
            .is_some_and(|s| self.inner.contains(TripleRef::new(s, predicate, object)))
    }

    /// Distinct subjects, in term order.
    pub fn subjects(&self) -> Vec<Term> {
        sorted(self.inner.iter().map(|t| Term::from(t.subject)))
    }

    pub fn objects(&self, subject: &Term, predicate: &str) -> Vec<Term> {
        self.objects_of(subject, named(predicate))
    }

    /// Same as `objects` for a predicate that is already a node.
    pub fn objects_of(&self, subject: &Term, predicate: NamedNodeRef<'_>) -> Vec<Term> {
        let Some(subject) = subject_ref(subject) else {
            return Vec::new();
        };
        sorted(
            self.inner
                .objects_for_subject_predicate(subject, predicate)
                .map(TermRef::into_owned),
        )
    }

    /// First object in term order, mirroring a functional-property lookup.
    pub fn object(&self, subject: &Term, predicate: &str) -> Option<Term> {
        self.objects(subject, predicate).into_iter().next()
    }

    pub fn subjects_with(&self, predicate: NamedNodeRef<'_>, object: &Term) -> Vec<Term> {
        sorted(
            self.inner
                .subjects_for_predicate_object(predicate, object)
                .map(Term::from),
        )
    }

    pub fn predicate_objects(&self, subject: &Term) -> Vec<(NamedNode, Term)> {
        let Some(subject) = subject_ref(subject) else {
            return Vec::new();
        };
        let mut pairs: Vec<(NamedNode, Term)> = self
            .inner
            .triples_for_subject(subject)
            .map(|t| (t.predicate.into_owned(), t.object.into_owned()))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| term_order(&a.1, &b.1)));
        pairs
    }

    /// All (subject, object) pairs linked by `predicate`.
    pub fn pairs_for(&self, predicate: NamedNodeRef<'_>) -> Vec<(Term, Term)> {
        let mut pairs: Vec<(Term, Term)> = self
            .inner
            .triples_for_predicate(predicate)
            .map(|t| (Term::from(t.subject), t.object.into_owned()))
            .collect();
        pairs.sort_by(|a, b| term_order(&a.0, &b.0).then_with(|| term_order(&a.1, &b.1)));
        pairs
    }

    /// Every term used as a subject or an object.
    pub fn nodes(&self) -> Vec<Term> {
        sorted(
            self.inner
                .iter()
                .flat_map(|t| [Term::from(t.subject), t.object.into_owned()]),
        )
    }

    pub fn has_subject(&self, subject: &Term) -> bool {
        subject_ref(subject).is_some_and(|s| self.inner.triples_for_subject(s).next().is_some())
    }

    /// Adds every triple of `other`, renaming its blank nodes with `tag` so two
    /// independently parsed graphs never share a blank node by accident.
    pub fn merge_disjoint(&mut self, other: &Graph, tag: &str) {
        let rename = |id: &str| BlankNode::new_unchecked(format!("{}.{}", tag, id));
        for triple in other.inner.iter() {
            let subject: Subject = match triple.subject {
                SubjectRef::BlankNode(b) => rename(b.as_str()).into(),
                s => s.into_owned(),
            };
            let object: Term = match triple.object {
                TermRef::BlankNode(b) => rename(b.as_str()).into(),
                o => o.into_owned(),
            };
            self.inner
                .insert(&Triple::new(subject, triple.predicate.into_owned(), object));
        }
    }

    /// Reads an RDF collection starting at `head`.
    pub fn list(&self, head: &Term) -> Result<Vec<Term>, DomainError> {
        let nil = Term::from(named(rdf::NIL));
        let mut items = Vec::new();
        let mut cursor = head.clone();
        let mut seen = TermSet::new();

        while cursor != nil {
            if !seen.insert(cursor.clone()) {
                return Err(DomainError::MalformedRule(format!(
                    "RDF list starting at {} is cyclic",
                    head
                )));
            }
            let first = self.object(&cursor, rdf::FIRST).ok_or_else(|| {
                DomainError::MalformedRule(format!("RDF list node {} has no rdf:first", cursor))
            })?;
            items.push(first);
            cursor = self.object(&cursor, rdf::REST).ok_or_else(|| {
                DomainError::MalformedRule(format!("RDF list node {} has no rdf:rest", cursor))
            })?;
        }
        Ok(items)
    }

    /// Instances of `class`, following `rdfs:subClassOf` transitively.
    pub fn instances_of(&self, class: &Term) -> Vec<Term> {
        sorted(
            self.subclasses_of(class)
                .iter()
                .flat_map(|c| self.subjects_with(named(rdf::TYPE), c)),
        )
    }

    /// `class` plus every class reaching it through `rdfs:subClassOf`.
    pub fn subclasses_of(&self, class: &Term) -> TermSet {
        let mut found = TermSet::from([class.clone()]);
        let mut frontier = vec![class.clone()];
        while let Some(current) = frontier.pop() {
            for sub in self.subjects_with(named(rdfs::SUB_CLASS_OF), &current) {
                if found.insert(sub.clone()) {
                    frontier.push(sub);
                }
            }
        }
        found
    }

    pub fn is_instance_of(&self, node: &Term, class: &Term) -> bool {
        let classes = self.subclasses_of(class);
        self.objects(node, rdf::TYPE)
            .iter()
            .any(|t| classes.contains(t))
    }
}

fn sorted(terms: impl Iterator<Item = Term>) -> Vec<Term> {
    let mut terms: Vec<Term> = terms.collect();
    terms.sort_by(term_order);
    terms.dedup();
    terms
}
