// digichecks-core/src/application/resolver.rs

use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::domain::check::{Check, RuleSource};
use crate::domain::error::DomainError;
use crate::domain::graph::{BoundGraph, RuleGraph, parse_turtle};
use crate::domain::ports::Registry;
use crate::error::DigichecksError;
use crate::infrastructure::crypto::CredentialVault;
use crate::ports::rules::RuleFetcher;

/// Turns a check into the rule graph it validates against.
///
/// Rules are rebuilt on every call; nothing is cached.
pub struct RuleResolver {
    registry: Arc<dyn Registry>,
    vault: Arc<CredentialVault>,
    fetcher: Arc<dyn RuleFetcher>,
}

impl RuleResolver {
    pub fn new(
        registry: Arc<dyn Registry>,
        vault: Arc<CredentialVault>,
        fetcher: Arc<dyn RuleFetcher>,
    ) -> Self {
        Self {
            registry,
            vault,
            fetcher,
        }
    }

    #[instrument(skip_all, fields(check = %check.public_id, source = %check.source.kind()))]
    pub async fn resolve(&self, check: &Check) -> Result<RuleGraph, DigichecksError> {
        match &check.source {
            RuleSource::Hosted { rule } => {
                debug!("Parsing hosted rule");
                Ok(parse_rule(rule)?)
            }
            RuleSource::RemoteApi {
                endpoint,
                connector,
            } => {
                let connector = self.registry.connector(*connector)?;
                let password = self.vault.decrypt(&connector.credential)?;
                info!(endpoint = %endpoint, connector = %connector.public_id, "Fetching remote rule");
                let body = self
                    .fetcher
                    .fetch(endpoint, &connector.username, &password)
                    .await?;
                Ok(parse_rule(&body)?)
            }
        }
    }
}

/// Parses Turtle rule text. Any syntax error is a malformed rule.
pub fn parse_rule(text: &str) -> Result<RuleGraph, DomainError> {
    let (graph, prefixes) =
        parse_turtle(text).map_err(|e| DomainError::MalformedRule(e.to_string()))?;
    debug!(triples = graph.len(), "Rule graph parsed");
    Ok(BoundGraph::new(graph, prefixes))
}
