// digichecks-core/src/infrastructure/extractor/subprocess.rs

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::conversion::Markup;
use crate::domain::graph::{BoundGraph, KnowledgeGraph, parse_turtle};
use crate::error::DigichecksError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::extractor::GraphExtractor;

const MARKUP_FILE: &str = "rows.xml";

/// Runs an external extraction engine (SPARQL Anything by default) over the
/// markup, written to a scoped temporary directory.
///
/// `args` may contain `{query}` and `{uri}` placeholders.
#[derive(Debug, Clone)]
pub struct SubprocessExtractor {
    pub program: String,
    pub args: Vec<String>,
    pub query: PathBuf,
    pub timeout: Duration,
}

impl SubprocessExtractor {
    pub fn sparql_anything(jar: impl Into<String>, query: PathBuf, timeout: Duration) -> Self {
        Self {
            program: "java".to_string(),
            args: vec![
                "-jar".to_string(),
                jar.into(),
                "-q".to_string(),
                "{query}".to_string(),
                "-v".to_string(),
                "uri={uri}".to_string(),
            ],
            query,
            timeout,
        }
    }

    fn command_args(&self, markup_path: &str) -> Vec<String> {
        let query = self.query.to_string_lossy();
        self.args
            .iter()
            .map(|arg| arg.replace("{query}", &query).replace("{uri}", markup_path))
            .collect()
    }
}

#[async_trait]
impl GraphExtractor for SubprocessExtractor {
    #[instrument(skip_all, fields(program = %self.program, rows = markup.records.len()))]
    async fn extract(
        &self,
        markup: &Markup,
        cancel: &CancellationToken,
    ) -> Result<KnowledgeGraph, DigichecksError> {
        // Dropped on every return path below, which removes the directory.
        let workdir = tempfile::tempdir()?;
        let markup_path = workdir.path().join(MARKUP_FILE);
        tokio::fs::write(&markup_path, markup.to_xml()).await?;

        let child = Command::new(&self.program)
            .args(self.command_args(&markup_path.to_string_lossy()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| InfrastructureError::GraphExtractionFailed {
                stderr: format!("failed to start '{}': {}", self.program, e),
            })?;

        // Dropping the wait future drops the child, and kill_on_drop reaps it.
        let output = tokio::select! {
            _ = cancel.cancelled() => return Err(InfrastructureError::Cancelled.into()),
            _ = tokio::time::sleep(self.timeout) => {
                return Err(InfrastructureError::Timeout {
                    operation: "Graph extraction".to_string(),
                    seconds: self.timeout.as_secs(),
                }
                .into())
            }
            output = child.wait_with_output() => output?,
        };

        if !output.status.success() {
            return Err(InfrastructureError::GraphExtractionFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        let turtle = String::from_utf8_lossy(&output.stdout);
        let (graph, prefixes) =
            parse_turtle(&turtle).map_err(|e| InfrastructureError::GraphExtractionFailed {
                stderr: format!("engine produced invalid Turtle: {}", e),
            })?;
        debug!(triples = graph.len(), "Extraction finished");
        Ok(BoundGraph::new(graph, prefixes))
    }
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::conversion::{ColumnMapping, TabularRows};

    fn markup() -> Markup {
        let rows = TabularRows::new(vec!["CGP".into()], vec![vec![Some("CGP-1".into())]]);
        let mapping: ColumnMapping = [("CGP".to_string(), "CGP".to_string())]
            .into_iter()
            .collect();
        Markup::from_rows(&rows, &mapping)
    }

    fn shell(script: &str, timeout: Duration) -> SubprocessExtractor {
        SubprocessExtractor {
            program: "sh".into(),
            args: vec!["-c".into(), script.into(), "sh".into(), "{uri}".into()],
            query: PathBuf::from("query.sparql"),
            timeout,
        }
    }

    #[tokio::test]
    async fn test_stdout_turtle_becomes_graph() -> anyhow::Result<()> {
        let extractor = shell(
            r#"grep -q '<CGP>CGP-1</CGP>' "$1" && echo '@prefix ex: <http://example.org/> . ex:a a ex:SupplyPoint .'"#,
            Duration::from_secs(10),
        );
        let graph = extractor.extract(&markup(), &CancellationToken::new()).await?;
        assert_eq!(graph.graph.len(), 1);
        assert_eq!(graph.prefixes.namespace("ex"), Some("http://example.org/"));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_stderr_verbatim() {
        let extractor = shell("echo 'line 3: bad query' >&2; exit 2", Duration::from_secs(10));
        let err = extractor
            .extract(&markup(), &CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            DigichecksError::Infrastructure(InfrastructureError::GraphExtractionFailed {
                stderr,
            }) => assert_eq!(stderr, "line 3: bad query\n"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_temp_dir_is_removed_after_failure() {
        // The script reports where the markup lives, then fails.
        let extractor = shell(r#"echo "$1" >&2; exit 1"#, Duration::from_secs(10));
        let err = extractor
            .extract(&markup(), &CancellationToken::new())
            .await
            .unwrap_err();
        let DigichecksError::Infrastructure(InfrastructureError::GraphExtractionFailed { stderr }) =
            err
        else {
            panic!("unexpected error");
        };
        let path = PathBuf::from(stderr.trim());
        assert!(path.ends_with(MARKUP_FILE));
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
    }

    #[tokio::test]
    async fn test_timeout_and_cancellation() {
        let slow = shell("sleep 30", Duration::from_millis(100));
        let err = slow
            .extract(&markup(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DigichecksError::Infrastructure(InfrastructureError::Timeout { .. })
        ));

        let slow = shell("sleep 30", Duration::from_secs(60));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = slow.extract(&markup(), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
    }

    /// Script that records the markup path in `record`, then hangs.
    fn recording_sleeper(record: &std::path::Path, timeout: Duration) -> SubprocessExtractor {
        let script = format!(r#"echo "$1" > '{}'; sleep 30"#, record.display());
        shell(&script, timeout)
    }

    async fn recorded_markup_path(record: &std::path::Path) -> PathBuf {
        for _ in 0..200 {
            if let Ok(text) = tokio::fs::read_to_string(record).await
                && text.ends_with('\n')
            {
                return PathBuf::from(text.trim());
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("extractor never recorded its markup path");
    }

    #[tokio::test]
    async fn test_temp_dir_is_removed_after_mid_run_cancellation() -> anyhow::Result<()> {
        let scratch = tempfile::tempdir()?;
        let record = scratch.path().join("where");
        let extractor = recording_sleeper(&record, Duration::from_secs(60));
        let cancel = CancellationToken::new();

        let trigger = {
            let cancel = cancel.clone();
            let record = record.clone();
            tokio::spawn(async move {
                let path = recorded_markup_path(&record).await;
                cancel.cancel();
                path
            })
        };
        let err = extractor.extract(&markup(), &cancel).await.unwrap_err();
        assert!(err.is_cancelled());

        let path = trigger.await?;
        assert!(path.ends_with(MARKUP_FILE));
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_temp_dir_is_removed_after_timeout() -> anyhow::Result<()> {
        let scratch = tempfile::tempdir()?;
        let record = scratch.path().join("where");
        let extractor = recording_sleeper(&record, Duration::from_millis(1500));

        let err = extractor
            .extract(&markup(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DigichecksError::Infrastructure(InfrastructureError::Timeout { .. })
        ));

        let path = recorded_markup_path(&record).await;
        assert!(path.ends_with(MARKUP_FILE));
        assert!(!path.exists());
        assert!(!path.parent().unwrap().exists());
        Ok(())
    }

    #[test]
    fn test_default_command_line() {
        let extractor = SubprocessExtractor::sparql_anything(
            "sparql-anything.jar",
            PathBuf::from("/q/supply.sparql"),
            Duration::from_secs(60),
        );
        assert_eq!(
            extractor.command_args("/tmp/x/rows.xml"),
            vec!["-jar", "sparql-anything.jar", "-q", "/q/supply.sparql", "-v", "uri=/tmp/x/rows.xml"]
        );
    }
}
