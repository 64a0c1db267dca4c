// digichecks-core/src/infrastructure/context_loader.rs

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::domain::conversion::document::{PERMIT_CONTEXT, REALIA_CONTEXT};
use crate::error::DigichecksError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::context::ContextLoader;

const BUNDLED: [(&str, &str); 2] = [
    (
        REALIA_CONTEXT,
        include_str!("../../contexts/REALIA_context.jsonld"),
    ),
    (
        PERMIT_CONTEXT,
        include_str!("../../contexts/digiChecks_topLevelPermitOntology_context.jsonld"),
    ),
];

/// Context documents known up front: the bundled copies of the two default
/// contexts plus any local files registered from configuration. An optional
/// HTTP fallback handles every other URL.
pub struct StaticContextLoader {
    documents: HashMap<String, Value>,
    remote: Option<HttpContextLoader>,
}

impl StaticContextLoader {
    pub fn bundled() -> Result<Self, InfrastructureError> {
        let mut documents = HashMap::new();
        for (url, text) in BUNDLED {
            documents.insert(url.to_string(), serde_json::from_str(text)?);
        }
        Ok(Self {
            documents,
            remote: None,
        })
    }

    /// Serves `url` from a local file instead of the bundled copy or the network.
    pub fn with_file(mut self, url: impl Into<String>, path: &Path) -> Result<Self, InfrastructureError> {
        let text = std::fs::read_to_string(path)?;
        self.documents.insert(url.into(), serde_json::from_str(&text)?);
        Ok(self)
    }

    pub fn with_document(mut self, url: impl Into<String>, document: Value) -> Self {
        self.documents.insert(url.into(), document);
        self
    }

    pub fn with_remote(mut self, remote: HttpContextLoader) -> Self {
        self.remote = Some(remote);
        self
    }
}

#[async_trait]
impl ContextLoader for StaticContextLoader {
    async fn load(&self, url: &str) -> Result<Value, DigichecksError> {
        if let Some(document) = self.documents.get(url) {
            return Ok(document.clone());
        }
        match &self.remote {
            Some(remote) => remote.load(url).await,
            None => Err(InfrastructureError::ContextUnavailable {
                url: url.to_string(),
                reason: "not bundled and remote loading is disabled".to_string(),
            }
            .into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpContextLoader {
    client: Client,
}

impl HttpContextLoader {
    pub fn new(timeout: Duration) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InfrastructureError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContextLoader for HttpContextLoader {
    #[instrument(skip(self))]
    async fn load(&self, url: &str) -> Result<Value, DigichecksError> {
        let unavailable = |reason: String| InfrastructureError::ContextUnavailable {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/ld+json, application/json")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())).into());
        }
        let document = response
            .json::<Value>()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        debug!("Loaded remote context");
        Ok(document)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_bundled_contexts_are_served_offline() -> anyhow::Result<()> {
        let loader = StaticContextLoader::bundled()?;
        let realia = loader.load(REALIA_CONTEXT).await?;
        assert_eq!(realia["@context"]["quantitativeProperties"], "@nest");
        assert!(loader.load(PERMIT_CONTEXT).await?.get("@context").is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_url_without_remote_fails() {
        let loader = StaticContextLoader::bundled().unwrap();
        let err = loader.load("https://elsewhere.example/ctx").await.unwrap_err();
        assert!(matches!(
            err,
            DigichecksError::Infrastructure(InfrastructureError::ContextUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_local_override_wins() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("realia.jsonld");
        std::fs::write(&path, r#"{"@context": {"ex": "http://override.example/"}}"#)?;
        let loader = StaticContextLoader::bundled()?.with_file(REALIA_CONTEXT, &path)?;
        assert_eq!(
            loader.load(REALIA_CONTEXT).await?,
            json!({"@context": {"ex": "http://override.example/"}})
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_http_fallback() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ctx.jsonld")
            .with_status(200)
            .with_header("content-type", "application/ld+json")
            .with_body(r#"{"@context": {"ex": "http://example.org/"}}"#)
            .expect(1)
            .create_async()
            .await;
        let loader = StaticContextLoader::bundled()?
            .with_remote(HttpContextLoader::new(Duration::from_secs(5))?);

        let doc = loader.load(&format!("{}/ctx.jsonld", server.url())).await?;
        assert_eq!(doc["@context"]["ex"], "http://example.org/");
        mock.assert_async().await;
        Ok(())
    }
}
