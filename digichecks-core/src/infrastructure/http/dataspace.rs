// digichecks-core/src/infrastructure/http/dataspace.rs

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::DigichecksError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::dataset::DatasetSource;

/// Control plane (transfer initiation) and data plane (retrieval) hosts of a
/// data-space connector. The two are never interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformHosts {
    pub scheme: String,
    pub control_host: String,
    pub data_host: String,
}

const TRANSFER_PATH: [&str; 6] = ["api", "management", "v1", "requests", "transfer", "dataset"];
const DATA_PATH: [&str; 4] = ["api", "data-plane", "v1", "consumer"];

impl PlatformHosts {
    pub fn transfer_url(&self, dataset_id: &str) -> Result<Url, InfrastructureError> {
        self.endpoint(&self.control_host, &TRANSFER_PATH, dataset_id)
    }

    pub fn data_url(&self, dataset_id: &str) -> Result<Url, InfrastructureError> {
        self.endpoint(&self.data_host, &DATA_PATH, dataset_id)
    }

    /// The dataset id is one path segment: reserved characters are percent-encoded.
    fn endpoint(&self, host: &str, path: &[&str], dataset_id: &str) -> Result<Url, InfrastructureError> {
        let invalid = |reason: String| {
            InfrastructureError::ConfigError(format!("Invalid platform host '{}': {}", host, reason))
        };
        let mut url = Url::parse(&format!("{}://{}/", self.scheme, host))
            .map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(path)
            .push(dataset_id);
        Ok(url)
    }
}

/// Fixed-interval retry budget of the retrieval step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub interval: Duration,
    /// Wait between a successful transfer initiation and the first retrieval.
    pub settle: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            interval: Duration::from_secs(5),
            settle: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The two HTTP exchanges of a transfer. `Err` carries a transport failure
/// (connection refused, timeout...).
#[async_trait]
pub trait DataspaceTransport: Send + Sync {
    async fn initiate(&self, url: &str) -> Result<TransportResponse, String>;
    async fn retrieve(&self, url: &str) -> Result<TransportResponse, String>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, InfrastructureError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InfrastructureError::ConfigError(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<TransportResponse, String> {
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?;
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl DataspaceTransport for ReqwestTransport {
    async fn initiate(&self, url: &str) -> Result<TransportResponse, String> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Self::read(response).await
    }

    async fn retrieve(&self, url: &str) -> Result<TransportResponse, String> {
        let response = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        Self::read(response).await
    }
}

/// Acquires datasets from a data-space connector: one transfer initiation,
/// a settle wait, then bounded fixed-interval polling of the data plane.
pub struct DataspaceClient {
    transport: Arc<dyn DataspaceTransport>,
    hosts: PlatformHosts,
    policy: RetryPolicy,
}

impl DataspaceClient {
    pub fn new(
        transport: Arc<dyn DataspaceTransport>,
        hosts: PlatformHosts,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            transport,
            hosts,
            policy,
        }
    }

    pub fn hosts(&self) -> &PlatformHosts {
        &self.hosts
    }

    /// Never retried: a refused initiation is treated as permanent.
    async fn initiate(
        &self,
        dataset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), DigichecksError> {
        let url = self.hosts.transfer_url(dataset_id)?;
        let failed = |reason: String| InfrastructureError::TransferInitiationFailed {
            dataset_id: dataset_id.to_string(),
            reason,
        };

        let response = cancellable(cancel, self.transport.initiate(url.as_str()))
            .await?
            .map_err(failed)?;
        if !response.is_success() {
            return Err(failed(format!("HTTP {}", response.status)).into());
        }

        match serde_json::from_slice::<serde_json::Value>(&response.body) {
            Ok(process) => debug!(%process, "Transfer process started"),
            Err(_) => debug!("Transfer process started (non-JSON acknowledgement)"),
        }
        Ok(())
    }

    async fn retrieve(
        &self,
        dataset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DigichecksError> {
        let url = self.hosts.data_url(dataset_id)?;
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.policy.attempts {
            match cancellable(cancel, self.transport.retrieve(url.as_str())).await? {
                Ok(response) if response.is_success() => {
                    info!(attempt, bytes = response.body.len(), "Dataset retrieved");
                    return Ok(response.body);
                }
                Ok(response) => last_error = format!("HTTP {}", response.status),
                Err(reason) => last_error = reason,
            }
            warn!(attempt, budget = self.policy.attempts, error = %last_error, "Dataset not ready");
            if attempt < self.policy.attempts {
                sleep(cancel, self.policy.interval).await?;
            }
        }

        Err(InfrastructureError::DatasetUnavailable {
            dataset_id: dataset_id.to_string(),
            attempts: self.policy.attempts,
            last_error,
        }
        .into())
    }
}

#[async_trait]
impl DatasetSource for DataspaceClient {
    #[instrument(skip(self, cancel), fields(control = %self.hosts.control_host, data = %self.hosts.data_host))]
    async fn acquire(
        &self,
        dataset_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, DigichecksError> {
        self.initiate(dataset_id, cancel).await?;
        sleep(cancel, self.policy.settle).await?;
        self.retrieve(dataset_id, cancel).await
    }
}

async fn cancellable<F: Future>(
    cancel: &CancellationToken,
    future: F,
) -> Result<F::Output, InfrastructureError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(InfrastructureError::Cancelled),
        output = future => Ok(output),
    }
}

async fn sleep(cancel: &CancellationToken, duration: Duration) -> Result<(), InfrastructureError> {
    cancellable(cancel, tokio::time::sleep(duration)).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Replays scripted retrieval outcomes and counts calls.
    struct ScriptedTransport {
        initiate_status: u16,
        retrievals: Mutex<VecDeque<Result<TransportResponse, String>>>,
        initiated: AtomicU32,
        retrieved: AtomicU32,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(initiate_status: u16, retrievals: Vec<Result<TransportResponse, String>>) -> Self {
            Self {
                initiate_status,
                retrievals: Mutex::new(retrievals.into()),
                initiated: AtomicU32::new(0),
                retrieved: AtomicU32::new(0),
                urls: Mutex::new(Vec::new()),
            }
        }
    }

    fn status(code: u16) -> Result<TransportResponse, String> {
        Ok(TransportResponse {
            status: code,
            body: if code == 200 { b"CGP;LGA\n1;2".to_vec() } else { Vec::new() },
        })
    }

    #[async_trait]
    impl DataspaceTransport for ScriptedTransport {
        async fn initiate(&self, url: &str) -> Result<TransportResponse, String> {
            self.initiated.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            Ok(TransportResponse {
                status: self.initiate_status,
                body: br#"{"@id":"tp-1"}"#.to_vec(),
            })
        }

        async fn retrieve(&self, url: &str) -> Result<TransportResponse, String> {
            self.retrieved.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.retrievals
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| status(503))
        }
    }

    fn hosts() -> PlatformHosts {
        PlatformHosts {
            scheme: "http".into(),
            control_host: "control:8181".into(),
            data_host: "data:8183".into(),
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            attempts: 5,
            interval: Duration::from_millis(5),
            settle: Duration::from_millis(5),
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> DataspaceClient {
        DataspaceClient::new(transport, hosts(), fast_policy())
    }

    #[tokio::test]
    async fn test_four_failures_then_success() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new(
            200,
            vec![status(503), Err("connection reset".into()), status(404), status(500), status(200)],
        ));
        let body = client(transport.clone())
            .acquire("ds-1", &CancellationToken::new())
            .await?;

        assert_eq!(body, b"CGP;LGA\n1;2");
        assert_eq!(transport.initiated.load(Ordering::SeqCst), 1);
        assert_eq!(transport.retrieved.load(Ordering::SeqCst), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_budget_exhaustion_stops_after_exactly_five_attempts() {
        let transport = Arc::new(ScriptedTransport::new(200, vec![]));
        let err = client(transport.clone())
            .acquire("ds-1", &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(transport.retrieved.load(Ordering::SeqCst), 5);
        match err {
            DigichecksError::Infrastructure(InfrastructureError::DatasetUnavailable {
                attempts,
                last_error,
                ..
            }) => {
                assert_eq!(attempts, 5);
                assert_eq!(last_error, "HTTP 503");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_initiation_failure_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new(500, vec![status(200)]));
        let err = client(transport.clone())
            .acquire("ds-1", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DigichecksError::Infrastructure(InfrastructureError::TransferInitiationFailed { .. })
        ));
        assert_eq!(transport.initiated.load(Ordering::SeqCst), 1);
        assert_eq!(transport.retrieved.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_control_and_data_hosts_stay_separate() -> anyhow::Result<()> {
        let transport = Arc::new(ScriptedTransport::new(200, vec![status(200)]));
        client(transport.clone())
            .acquire("ds-9", &CancellationToken::new())
            .await?;

        let urls = transport.urls.lock().unwrap().clone();
        assert_eq!(
            urls,
            vec![
                "http://control:8181/api/management/v1/requests/transfer/dataset/ds-9".to_string(),
                "http://data:8183/api/data-plane/v1/consumer/ds-9".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_dataset_id_is_a_single_encoded_segment() -> anyhow::Result<()> {
        let hosts = hosts();
        assert_eq!(
            hosts.data_url("a/b?c#d")?.as_str(),
            "http://data:8183/api/data-plane/v1/consumer/a%2Fb%3Fc%23d"
        );
        assert_eq!(
            hosts.transfer_url("ds 1")?.as_str(),
            "http://control:8181/api/management/v1/requests/transfer/dataset/ds%201"
        );
        Ok(())
    }

    #[test]
    fn test_unparseable_host_is_a_config_error() {
        let hosts = PlatformHosts {
            control_host: "bad host".into(),
            ..hosts()
        };
        assert!(matches!(
            hosts.transfer_url("ds-1"),
            Err(InfrastructureError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_cancellation_aborts_mid_retry() {
        let transport = Arc::new(ScriptedTransport::new(200, vec![]));
        let policy = RetryPolicy {
            attempts: 5,
            interval: Duration::from_secs(60),
            settle: Duration::from_millis(1),
        };
        let client = DataspaceClient::new(transport.clone(), hosts(), policy);
        let cancel = CancellationToken::new();

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let err = client.acquire("ds-1", &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(transport.retrieved.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reqwest_transport_against_live_server() -> anyhow::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let transfer = server
            .mock("POST", "/api/management/v1/requests/transfer/dataset/ds-2")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"@id":"tp"}"#)
            .expect(1)
            .create_async()
            .await;
        let data = server
            .mock("GET", "/api/data-plane/v1/consumer/ds-2")
            .with_status(200)
            .with_body("payload")
            .expect(1)
            .create_async()
            .await;

        let hosts = PlatformHosts {
            scheme: "http".into(),
            control_host: server.host_with_port(),
            data_host: server.host_with_port(),
        };
        let client = DataspaceClient::new(
            Arc::new(ReqwestTransport::new(Duration::from_secs(5))?),
            hosts,
            fast_policy(),
        );
        let body = client.acquire("ds-2", &CancellationToken::new()).await?;

        assert_eq!(body, b"payload");
        transfer.assert_async().await;
        data.assert_async().await;
        Ok(())
    }
}
