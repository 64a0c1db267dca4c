// digichecks-core/src/domain/shacl/rules.rs

use tracing::warn;

use super::engine::Validator;
use super::path::Path;
use crate::domain::error::DomainError;
use crate::domain::graph::vocab::sh;
use crate::domain::graph::{
    Graph, NamedNode, Subject, Term, TermExt, TermSet, Triple, iri, named,
};

/// Node expression of a triple rule.
#[derive(Debug, Clone)]
enum Expression {
    This,
    Constant(Term),
    Path(Path),
}

impl Expression {
    fn parse(rules: &Graph, node: &Term) -> Result<Self, DomainError> {
        if node.as_iri() == Some(sh::THIS) {
            return Ok(Expression::This);
        }
        if node.is_blank_node()
            && let Some(path) = rules.object(node, sh::PATH)
        {
            return Ok(Expression::Path(Path::parse(rules, &path)?));
        }
        if node.is_blank_node() && rules.has_subject(node) {
            return Err(DomainError::MalformedRule(format!(
                "Unsupported node expression at {}",
                node
            )));
        }
        Ok(Expression::Constant(node.clone()))
    }

    fn evaluate(&self, data: &Graph, focus: &Term) -> TermSet {
        match self {
            Expression::This => TermSet::from([focus.clone()]),
            Expression::Constant(term) => TermSet::from([term.clone()]),
            Expression::Path(path) => path.evaluate(data, focus),
        }
    }
}

/// An `sh:TripleRule` attached to a shape through `sh:rule`.
#[derive(Debug, Clone)]
pub struct TripleRule {
    pub id: Term,
    /// Shape whose focus nodes drive the rule.
    owner: Term,
    order: f64,
    conditions: Vec<Term>,
    subject: Expression,
    predicate: Expression,
    object: Expression,
}

impl TripleRule {
    /// Every active triple rule of the rule graph, sorted by `sh:order`.
    pub fn parse_all(rules: &Graph) -> Result<Vec<Self>, DomainError> {
        let mut parsed = Vec::new();
        for (owner, rule) in rules.pairs_for(named(sh::RULE)) {
            if rules.is_instance_of(&rule, &iri(sh::SPARQL_RULE)) {
                warn!(rule = %rule, "Skipping SPARQL rule");
                continue;
            }
            let is_triple_rule = rules.is_instance_of(&rule, &iri(sh::TRIPLE_RULE))
                || rules.object(&rule, sh::SUBJECT).is_some();
            if !is_triple_rule {
                warn!(rule = %rule, "Skipping rule of unknown type");
                continue;
            }
            let deactivated = rules
                .object(&rule, sh::DEACTIVATED)
                .is_some_and(|t| t.as_literal().is_some_and(|l| l.value() == "true"));
            if deactivated {
                continue;
            }
            parsed.push(Self::parse(rules, &owner, &rule)?);
        }
        parsed.sort_by(|a, b| a.order.total_cmp(&b.order));
        Ok(parsed)
    }

    fn parse(rules: &Graph, owner: &Term, id: &Term) -> Result<Self, DomainError> {
        let part = |predicate: &str| -> Result<Expression, DomainError> {
            let node = rules.object(id, predicate).ok_or_else(|| {
                DomainError::MalformedRule(format!("Triple rule {} has no {}", id, predicate))
            })?;
            Expression::parse(rules, &node)
        };
        let order = rules
            .object(id, sh::ORDER)
            .and_then(|t| t.as_literal().and_then(|l| l.value().trim().parse::<f64>().ok()))
            .unwrap_or(0.0);

        Ok(Self {
            id: id.clone(),
            owner: owner.clone(),
            order,
            conditions: rules.objects(id, sh::CONDITION),
            subject: part(sh::SUBJECT)?,
            predicate: part(sh::PREDICATE)?,
            object: part(sh::OBJECT)?,
        })
    }

    /// Triples produced for every focus node of the owning shape that
    /// satisfies the rule's conditions.
    pub fn infer(&self, validator: &Validator<'_>) -> Result<Vec<Triple>, DomainError> {
        let data = validator.data();
        let Some(owner) = validator.shapes().get(&self.owner) else {
            return Ok(Vec::new());
        };
        if owner.deactivated {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        'focus: for focus in validator.focus_nodes(owner) {
            for condition in &self.conditions {
                if !validator.conforms_to(condition, &focus, 0)? {
                    continue 'focus;
                }
            }
            let subjects = self.subject.evaluate(data, &focus);
            let predicates = self.predicate.evaluate(data, &focus);
            let objects = self.object.evaluate(data, &focus);
            // Literal subjects and non-IRI predicates cannot be stated.
            for s in &subjects {
                let Ok(subject) = Subject::try_from(s.clone()) else {
                    continue;
                };
                for p in &predicates {
                    let Ok(predicate) = NamedNode::try_from(p.clone()) else {
                        continue;
                    };
                    for o in &objects {
                        if !data.contains(s, predicate.as_ref(), o) {
                            out.push(Triple::new(subject.clone(), predicate.clone(), o.clone()));
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}
