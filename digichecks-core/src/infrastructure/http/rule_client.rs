// digichecks-core/src/infrastructure/http/rule_client.rs

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::check::Secret;
use crate::error::DigichecksError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::rules::RuleFetcher;

/// Fetches remote rule documents over HTTP with basic authentication.
#[derive(Debug, Clone)]
pub struct HttpRuleFetcher {
    client: Client,
}

impl HttpRuleFetcher {
    pub fn new(timeout: Duration) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InfrastructureError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RuleFetcher for HttpRuleFetcher {
    #[instrument(skip(self, password), fields(endpoint = %endpoint))]
    async fn fetch(
        &self,
        endpoint: &str,
        username: &str,
        password: &Secret,
    ) -> Result<String, DigichecksError> {
        let unavailable = |reason: String| InfrastructureError::UpstreamUnavailable {
            endpoint: endpoint.to_string(),
            reason,
        };

        let response = self
            .client
            .get(endpoint)
            .basic_auth(username, Some(password.expose()))
            .header(ACCEPT, "text/turtle")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)).into());
        }
        let body = response
            .text()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        debug!(bytes = body.len(), "Fetched remote rule");
        Ok(body)
    }
}
