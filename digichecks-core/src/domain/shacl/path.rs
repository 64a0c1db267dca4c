// digichecks-core/src/domain/shacl/path.rs

use crate::domain::error::DomainError;
use crate::domain::graph::vocab::{rdf, sh};
use crate::domain::graph::{Graph, NamedNode, PrefixMap, Term, TermSet};

/// SHACL property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path {
    Predicate(NamedNode),
    Inverse(Box<Path>),
    Sequence(Vec<Path>),
    Alternative(Vec<Path>),
    ZeroOrMore(Box<Path>),
    OneOrMore(Box<Path>),
    ZeroOrOne(Box<Path>),
}

impl Path {
    /// Reads the path rooted at `node` in the shapes graph.
    pub fn parse(shapes: &Graph, node: &Term) -> Result<Self, DomainError> {
        Self::parse_at(shapes, node, 0)
    }

    fn parse_at(shapes: &Graph, node: &Term, depth: usize) -> Result<Self, DomainError> {
        if depth > 32 {
            return Err(DomainError::MalformedRule(format!(
                "Property path at {} is nested too deeply",
                node
            )));
        }
        match node {
            Term::NamedNode(predicate) => Ok(Path::Predicate(predicate.clone())),
            Term::Literal(_) => Err(DomainError::MalformedRule(format!(
                "A literal cannot be used as a property path: {}",
                node
            ))),
            Term::BlankNode(_) => {
                if shapes.object(node, rdf::FIRST).is_some() {
                    let mut steps = shapes
                        .list(node)?
                        .iter()
                        .map(|step| Self::parse_at(shapes, step, depth + 1))
                        .collect::<Result<Vec<_>, _>>()?;
                    return match steps.len() {
                        0 => Err(DomainError::MalformedRule(
                            "A sequence path needs at least one step".to_string(),
                        )),
                        1 => Ok(steps.remove(0)),
                        _ => Ok(Path::Sequence(steps)),
                    };
                }

                let nested = |predicate: &str| -> Result<Option<Box<Path>>, DomainError> {
                    shapes
                        .object(node, predicate)
                        .map(|inner| Self::parse_at(shapes, &inner, depth + 1).map(Box::new))
                        .transpose()
                };

                if let Some(inner) = nested(sh::INVERSE_PATH)? {
                    return Ok(Path::Inverse(inner));
                }
                if let Some(inner) = nested(sh::ZERO_OR_MORE_PATH)? {
                    return Ok(Path::ZeroOrMore(inner));
                }
                if let Some(inner) = nested(sh::ONE_OR_MORE_PATH)? {
                    return Ok(Path::OneOrMore(inner));
                }
                if let Some(inner) = nested(sh::ZERO_OR_ONE_PATH)? {
                    return Ok(Path::ZeroOrOne(inner));
                }
                if let Some(list) = shapes.object(node, sh::ALTERNATIVE_PATH) {
                    let options = shapes
                        .list(&list)?
                        .iter()
                        .map(|option| Self::parse_at(shapes, option, depth + 1))
                        .collect::<Result<Vec<_>, _>>()?;
                    return Ok(Path::Alternative(options));
                }

                Err(DomainError::MalformedRule(format!(
                    "Unrecognised property path at {}",
                    node
                )))
            }
        }
    }

    /// Value nodes reached from `focus`, in the order they are reached.
    pub fn evaluate(&self, data: &Graph, focus: &Term) -> TermSet {
        self.evaluate_from(data, &TermSet::from([focus.clone()]))
    }

    fn evaluate_from(&self, data: &Graph, start: &TermSet) -> TermSet {
        match self {
            Path::Predicate(p) => start
                .iter()
                .flat_map(|node| data.objects_of(node, p.as_ref()))
                .collect(),
            Path::Inverse(inner) => match inner.as_ref() {
                Path::Predicate(p) => start
                    .iter()
                    .flat_map(|node| data.subjects_with(p.as_ref(), node))
                    .collect(),
                other => {
                    // ^(complex): nodes whose forward evaluation reaches a start node.
                    data.nodes()
                        .into_iter()
                        .filter(|candidate| {
                            other
                                .evaluate(data, candidate)
                                .iter()
                                .any(|reached| start.contains(reached))
                        })
                        .collect()
                }
            },
            Path::Sequence(steps) => steps
                .iter()
                .fold(start.clone(), |current, step| step.evaluate_from(data, &current)),
            Path::Alternative(options) => options
                .iter()
                .flat_map(|option| option.evaluate_from(data, start))
                .collect(),
            Path::ZeroOrOne(inner) => {
                let mut out = start.clone();
                out.extend(inner.evaluate_from(data, start));
                out
            }
            Path::ZeroOrMore(inner) => {
                let mut out = start.clone();
                out.extend(closure(inner, data, start));
                out
            }
            Path::OneOrMore(inner) => closure(inner, data, start),
        }
    }

    /// The predicate when this is a plain predicate path.
    pub fn predicate(&self) -> Option<&NamedNode> {
        match self {
            Path::Predicate(p) => Some(p),
            _ => None,
        }
    }

    pub fn render(&self, prefixes: &PrefixMap) -> String {
        match self {
            Path::Predicate(p) => prefixes.compact(p.as_str()),
            Path::Inverse(inner) => format!("^{}", inner.render_grouped(prefixes)),
            Path::Sequence(steps) => steps
                .iter()
                .map(|s| s.render_grouped(prefixes))
                .collect::<Vec<_>>()
                .join("/"),
            Path::Alternative(options) => options
                .iter()
                .map(|o| o.render_grouped(prefixes))
                .collect::<Vec<_>>()
                .join("|"),
            Path::ZeroOrMore(inner) => format!("{}*", inner.render_grouped(prefixes)),
            Path::OneOrMore(inner) => format!("{}+", inner.render_grouped(prefixes)),
            Path::ZeroOrOne(inner) => format!("{}?", inner.render_grouped(prefixes)),
        }
    }

    fn render_grouped(&self, prefixes: &PrefixMap) -> String {
        match self {
            Path::Sequence(_) | Path::Alternative(_) => format!("({})", self.render(prefixes)),
            _ => self.render(prefixes),
        }
    }
}

/// One or more applications of `step`, stopping once no new node appears.
fn closure(step: &Path, data: &Graph, start: &TermSet) -> TermSet {
    let mut reached = TermSet::new();
    let mut frontier = step.evaluate_from(data, start);
    while !frontier.is_empty() {
        let fresh: TermSet = frontier
            .into_iter()
            .filter(|node| reached.insert(node.clone()))
            .collect();
        frontier = step.evaluate_from(data, &fresh);
    }
    reached
}
