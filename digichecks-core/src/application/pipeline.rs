// digichecks-core/src/application/pipeline.rs

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::conversion::ConversionPipeline;
use super::resolver::RuleResolver;
use super::validation::DocumentValidator;
use crate::domain::check::{Check, Verdict};
use crate::domain::conversion::{ColumnMapping, DatasetType, SemanticDocument};
use crate::domain::graph::PrefixMap;
use crate::error::DigichecksError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::dataset::DatasetSource;

/// Dataset reference of a data-space run, with the conversion inputs used
/// when the dataset is tabular.
#[derive(Debug, Clone)]
pub struct DataspaceRequest {
    pub dataset_id: String,
    pub dataset_type: DatasetType,
    pub mapping: ColumnMapping,
    pub namespaces: PrefixMap,
}

/// Runs checks end to end: resolve -> (acquire -> convert) -> validate.
/// Each step completes before the next starts.
pub struct CheckRunner {
    resolver: RuleResolver,
    validator: DocumentValidator,
    conversion: ConversionPipeline,
    datasets: Arc<dyn DatasetSource>,
}

impl CheckRunner {
    pub fn new(
        resolver: RuleResolver,
        validator: DocumentValidator,
        conversion: ConversionPipeline,
        datasets: Arc<dyn DatasetSource>,
    ) -> Self {
        Self {
            resolver,
            validator,
            conversion,
            datasets,
        }
    }

    /// Validates a document supplied by the caller.
    #[instrument(skip_all, fields(check = %check.public_id))]
    pub async fn run_check(
        &self,
        check: &Check,
        document: &SemanticDocument,
        cancel: &CancellationToken,
    ) -> Result<Verdict, DigichecksError> {
        let rules = guard(cancel, self.resolver.resolve(check)).await?;
        let verdict = guard(cancel, self.validator.validate(check, document, &rules)).await?;
        info!(result = %verdict.result, "Check finished");
        Ok(verdict)
    }

    /// Fetches the dataset from the data space, converts it when tabular and
    /// validates the result.
    #[instrument(skip_all, fields(check = %check.public_id, dataset = %request.dataset_id, kind = %request.dataset_type))]
    pub async fn run_dataspace_check(
        &self,
        check: &Check,
        request: &DataspaceRequest,
        cancel: &CancellationToken,
    ) -> Result<Verdict, DigichecksError> {
        let rules = guard(cancel, self.resolver.resolve(check)).await?;
        let bytes = self.datasets.acquire(&request.dataset_id, cancel).await?;
        let document = self
            .conversion
            .convert_dataset(
                request.dataset_type,
                &bytes,
                &request.mapping,
                &request.namespaces,
                cancel,
            )
            .await?;
        let verdict = guard(cancel, self.validator.validate(check, &document, &rules)).await?;
        info!(result = %verdict.result, "Data space check finished");
        Ok(verdict)
    }
}

/// Races `work` against cancellation.
async fn guard<T>(
    cancel: &CancellationToken,
    work: impl std::future::Future<Output = Result<T, DigichecksError>>,
) -> Result<T, DigichecksError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(InfrastructureError::Cancelled.into()),
        result = work => result,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::conversion::ConversionProfile;
    use crate::domain::check::{CheckDraft, PublicId, Secret};
    use crate::infrastructure::context_loader::StaticContextLoader;
    use crate::infrastructure::crypto::CredentialVault;
    use crate::infrastructure::extractor::DirectExtractor;
    use crate::infrastructure::store::InMemoryRegistry;
    use crate::ports::rules::RuleFetcher;
    use async_trait::async_trait;
    use std::sync::Mutex;

    // Every supply point must declare its power with a unit.
    const REALIA_RULE: &str = r#"
        @prefix sh: <http://www.w3.org/ns/shacl#> .
        @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
        @prefix sml: <https://w3id.org/sml/def#> .
        @prefix otl: <http://realia.es/realia-otl/> .
        @prefix ex: <http://example.org/checks/> .

        ex:SupplyPointShape a sh:NodeShape ;
            sh:targetClass otl:ElectricitySupplyPoint ;
            sh:property [
                sh:path otl:Potencia ;
                sh:minCount 1 ;
                sh:node ex:MeasureShape
            ] .

        ex:MeasureShape a sh:NodeShape ;
            sh:property [ sh:path rdf:value ; sh:minCount 1 ] ;
            sh:property [ sh:path sml:hasUnit ; sh:minCount 1 ; sh:nodeKind sh:IRI ] .
    "#;

    const CSV_OK: &str = "CGP;Supply Point Name;Potencia\nCGP-1;SP-1;5.75\nCGP-2;SP-2;3.45\n";
    const CSV_MISSING_POWER: &str = "CGP;Supply Point Name;Potencia\nCGP-1;SP-1;5.75\nCGP-2;SP-2;\n";

    struct NoFetch;

    #[async_trait]
    impl RuleFetcher for NoFetch {
        async fn fetch(&self, _: &str, _: &str, _: &Secret) -> Result<String, DigichecksError> {
            panic!("hosted checks never fetch");
        }
    }

    struct FixedDataset {
        body: Vec<u8>,
        requested: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DatasetSource for FixedDataset {
        async fn acquire(
            &self,
            dataset_id: &str,
            _cancel: &CancellationToken,
        ) -> Result<Vec<u8>, DigichecksError> {
            self.requested.lock().unwrap().push(dataset_id.to_string());
            Ok(self.body.clone())
        }
    }

    fn runner(body: &str) -> (CheckRunner, Arc<FixedDataset>) {
        let registry = Arc::new(InMemoryRegistry::new());
        let vault = Arc::new(CredentialVault::new(&CredentialVault::generate_key()).unwrap());
        let profile = ConversionProfile::realia_electricity();
        let datasets = Arc::new(FixedDataset {
            body: body.as_bytes().to_vec(),
            requested: Mutex::new(Vec::new()),
        });
        let runner = CheckRunner::new(
            RuleResolver::new(registry, vault, Arc::new(NoFetch)),
            DocumentValidator::new(Arc::new(StaticContextLoader::bundled().unwrap())),
            ConversionPipeline::new(Arc::new(DirectExtractor::new(profile.row_mapping))),
            datasets.clone(),
        );
        (runner, datasets)
    }

    fn check() -> Check {
        Check::from_draft(
            7,
            PublicId::from("ch_power"),
            1,
            CheckDraft {
                name: "Supply points declare power".into(),
                rule_source: "digichecks_hosted".into(),
                rule: REALIA_RULE.into(),
                connector: None,
            },
        )
        .unwrap()
    }

    fn request(kind: DatasetType) -> DataspaceRequest {
        let profile = ConversionProfile::realia_electricity();
        DataspaceRequest {
            dataset_id: "ds-42".into(),
            dataset_type: kind,
            mapping: profile.mapping,
            namespaces: profile.namespaces,
        }
    }

    #[tokio::test]
    async fn test_dataspace_csv_passes() -> anyhow::Result<()> {
        let (runner, datasets) = runner(CSV_OK);
        let verdict = runner
            .run_dataspace_check(&check(), &request(DatasetType::Csv), &CancellationToken::new())
            .await?;
        assert!(verdict.passed(), "{}", verdict.description);
        assert_eq!(*datasets.requested.lock().unwrap(), vec!["ds-42".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn test_dataspace_csv_missing_power_fails() -> anyhow::Result<()> {
        let (runner, _) = runner(CSV_MISSING_POWER);
        let verdict = runner
            .run_dataspace_check(&check(), &request(DatasetType::Csv), &CancellationToken::new())
            .await?;
        assert!(!verdict.passed());
        assert!(verdict.description.contains("SP-2"));
        assert!(!verdict.description.contains("SP-1\n"));
        Ok(())
    }

    #[tokio::test]
    async fn test_run_check_with_supplied_document() -> anyhow::Result<()> {
        let (runner, datasets) = runner("");
        let document: SemanticDocument = serde_json::from_value(serde_json::json!({
            "@context": [
                "https://stdigichecksprod.blob.core.windows.net/public/REALIA_context.jsonld",
                "https://stdigichecksprod.blob.core.windows.net/public/digiChecks_topLevelPermitOntology_context.jsonld"
            ],
            "@graph": [{
                "@id": "ex:SP-9",
                "@type": "realia_otl:ElectricitySupplyPoint",
                "quantitativeProperties": {
                    "realia_otl:Potencia": {"value": 4.6, "hasUnit": "unit:KiloW"}
                },
                "nonQuantitativeProperties": {},
                "relations": {"realia_otl:CGP": "CGP-9"}
            }]
        }))?;

        let verdict = runner
            .run_check(&check(), &document, &CancellationToken::new())
            .await?;
        assert!(verdict.passed(), "{}", verdict.description);
        assert!(datasets.requested.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_cancelled_run_is_aborted() {
        let (runner, _) = runner(CSV_OK);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = runner
            .run_check(
                &check(),
                &SemanticDocument::with_default_context(Vec::new()),
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
