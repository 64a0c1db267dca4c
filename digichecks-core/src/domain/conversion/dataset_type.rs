// digichecks-core/src/domain/conversion/dataset_type.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

/// Format of a dataset retrieved from a data space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetType {
    #[serde(rename = "excel")]
    Excel,
    #[serde(rename = "csv")]
    Csv,
    #[serde(rename = "JSON-LD")]
    JsonLd,
}

impl DatasetType {
    pub const ALL: [DatasetType; 3] = [DatasetType::Excel, DatasetType::Csv, DatasetType::JsonLd];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetType::Excel => "excel",
            DatasetType::Csv => "csv",
            DatasetType::JsonLd => "JSON-LD",
        }
    }

    /// Tabular types go through the conversion pipeline.
    pub fn is_tabular(&self) -> bool {
        !matches!(self, DatasetType::JsonLd)
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::UnsupportedDatasetType {
                given: s.to_string(),
                allowed: Self::ALL.map(|t| t.as_str()).join(", "),
            })
    }
}
