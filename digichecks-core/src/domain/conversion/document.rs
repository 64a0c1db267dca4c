// digichecks-core/src/domain/conversion/document.rs

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Public context documents every generated document refers to.
pub const REALIA_CONTEXT: &str =
    "https://stdigichecksprod.blob.core.windows.net/public/REALIA_context.jsonld";
pub const PERMIT_CONTEXT: &str = "https://stdigichecksprod.blob.core.windows.net/public/digiChecks_topLevelPermitOntology_context.jsonld";

/// Canonical JSON-LD document validated by checks. Produced by the conversion
/// pipeline or supplied directly by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticDocument {
    #[serde(rename = "@context", deserialize_with = "one_or_many")]
    pub context: Vec<Value>,
    #[serde(rename = "@graph", deserialize_with = "one_or_many")]
    pub graph: Vec<Value>,
}

impl SemanticDocument {
    pub fn with_default_context(graph: Vec<Value>) -> Self {
        Self {
            context: vec![
                Value::String(REALIA_CONTEXT.to_string()),
                Value::String(PERMIT_CONTEXT.to_string()),
            ],
            graph,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "@context": self.context,
            "@graph": self.graph,
        })
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}
