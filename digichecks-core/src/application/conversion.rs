// digichecks-core/src/application/conversion.rs

use indexmap::IndexMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::domain::conversion::{
    ColumnMapping, DatasetType, Markup, SemanticDocument, TabularRows, graph_to_document,
};
use crate::domain::error::DomainError;
use crate::domain::graph::PrefixMap;
use crate::domain::graph::vocab::sml;
use crate::error::DigichecksError;
use crate::infrastructure::extractor::RowMapping;
use crate::infrastructure::spreadsheet::decode_tabular;
use crate::ports::extractor::GraphExtractor;

// --- PROFILES ---

/// A named, ready-made conversion: column mapping, namespace bindings and the
/// row mapping used by the in-process extractor.
#[derive(Debug, Clone)]
pub struct ConversionProfile {
    pub name: &'static str,
    pub mapping: ColumnMapping,
    pub namespaces: PrefixMap,
    pub row_mapping: RowMapping,
}

pub const REALIA_ELECTRICITY: &str = "realia-electricity";

const REALIA_DATASET: &str = "http://example.org/realia/dataset/";
const REALIA_OTL: &str = "http://realia.es/realia-otl/";
const QUDT_UNIT: &str = "http://qudt.org/vocab/unit/";

impl ConversionProfile {
    pub const NAMES: [&'static str; 1] = [REALIA_ELECTRICITY];

    pub fn named(name: &str) -> Option<Self> {
        match name {
            REALIA_ELECTRICITY => Some(Self::realia_electricity()),
            _ => None,
        }
    }

    /// Electricity supply points exported by the REALIA asset register.
    pub fn realia_electricity() -> Self {
        let mapping: ColumnMapping = [
            ("CGP", "CGP"),
            ("CGP Type", "CGPType"),
            ("LGA", "LGA"),
            ("Portal", "Portal"),
            ("Planta", "Planta"),
            ("Mano", "Mano"),
            ("Supply Point Name", "SupplyPointName"),
            ("Tipo Suministro", "Tipo"),
            ("Potencia", "Potencia"),
            ("Potencia Simultanea", "PotenciaSimultánea"),
        ]
        .into_iter()
        .collect();

        let mut namespaces = PrefixMap::empty();
        namespaces.extend([
            ("ex", REALIA_DATASET),
            ("realia_otl", REALIA_OTL),
            ("realia_ds", "http://realia-dataspace.org/data/"),
            ("qudt", "http://qudt.org/schema/qudt/"),
            ("sml", sml::NS),
            ("unit", QUDT_UNIT),
        ]);

        let row_mapping = RowMapping {
            class: format!("{}ElectricitySupplyPoint", REALIA_OTL),
            subject_element: "SupplyPointName".to_string(),
            subject_namespace: REALIA_DATASET.to_string(),
            property_namespace: REALIA_OTL.to_string(),
            measures: IndexMap::from([
                ("Potencia".to_string(), format!("{}KiloW", QUDT_UNIT)),
                ("PotenciaSimultánea".to_string(), format!("{}KiloW", QUDT_UNIT)),
            ]),
        };

        Self {
            name: REALIA_ELECTRICITY,
            mapping,
            namespaces,
            row_mapping,
        }
    }
}

// --- PIPELINE ---

/// Tabular rows -> markup -> knowledge graph -> semantic document.
pub struct ConversionPipeline {
    extractor: Arc<dyn GraphExtractor>,
}

impl ConversionPipeline {
    pub fn new(extractor: Arc<dyn GraphExtractor>) -> Self {
        Self { extractor }
    }

    #[instrument(skip_all, fields(rows = rows.len(), columns = mapping.len()))]
    pub async fn convert(
        &self,
        rows: &TabularRows,
        mapping: &ColumnMapping,
        namespaces: &PrefixMap,
        cancel: &CancellationToken,
    ) -> Result<SemanticDocument, DigichecksError> {
        let markup = Markup::from_rows(rows, mapping);
        debug!(records = markup.records.len(), "Markup built");

        let mut knowledge = self.extractor.extract(&markup, cancel).await?;
        knowledge.prefixes.extend(namespaces.iter());
        info!(triples = knowledge.graph.len(), "Knowledge graph extracted");

        Ok(graph_to_document(&knowledge))
    }

    /// Raw dataset bytes to a document. JSON-LD input is taken as is; tabular
    /// input goes through the full conversion.
    #[instrument(skip(self, bytes, mapping, namespaces, cancel), fields(bytes = bytes.len()))]
    pub async fn convert_dataset(
        &self,
        kind: DatasetType,
        bytes: &[u8],
        mapping: &ColumnMapping,
        namespaces: &PrefixMap,
        cancel: &CancellationToken,
    ) -> Result<SemanticDocument, DigichecksError> {
        if !kind.is_tabular() {
            return Ok(parse_document(bytes)?);
        }
        let rows = decode_tabular(kind, bytes)?;
        self.convert(&rows, mapping, namespaces, cancel).await
    }
}

/// Reads a JSON-LD document carrying both `@context` and `@graph`.
pub fn parse_document(bytes: &[u8]) -> Result<SemanticDocument, DomainError> {
    serde_json::from_slice(bytes).map_err(|e| {
        DomainError::MalformedData(format!(
            "Expected a JSON-LD document with '@context' and '@graph': {}",
            e
        ))
    })
}
