// digichecks-core/src/domain/conversion/tabular.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Decoded spreadsheet: a header row and the data rows below it.
/// `None` marks an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularRows {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl TabularRows {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == header.trim())
    }

    /// Cell at (`row`, `column`), treating blanks and short rows as missing.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Ordered mapping from source column to markup element name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, String>", into = "IndexMap<String, String>")]
pub struct ColumnMapping(IndexMap<String, String>);

impl ColumnMapping {
    pub fn new(entries: IndexMap<String, String>) -> Result<Self, DomainError> {
        if let Some((column, target)) = entries.iter().find(|(_, t)| !is_xml_name(t)) {
            return Err(DomainError::MalformedData(format!(
                "Column '{}' maps to '{}', which is not a valid XML element name",
                column, target
            )));
        }
        Ok(Self(entries))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMapping {
    /// Unchecked construction for built-in mappings; user input goes through `new`.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl TryFrom<IndexMap<String, String>> for ColumnMapping {
    type Error = DomainError;

    fn try_from(value: IndexMap<String, String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ColumnMapping> for IndexMap<String, String> {
    fn from(mapping: ColumnMapping) -> Self {
        mapping.0
    }
}

/// XML `Name` production, without the colon (element names carry no prefix here).
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{B7}'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_names() {
        assert!(is_xml_name("SupplyPointName"));
        assert!(is_xml_name("PotenciaSimultánea"));
        assert!(is_xml_name("_x-1.b"));
        assert!(!is_xml_name("Supply Point"));
        assert!(!is_xml_name("1abc"));
        assert!(!is_xml_name(""));
    }

    #[test]
    fn test_mapping_rejects_invalid_targets() {
        let entries = IndexMap::from([("CGP".to_string(), "CGP Type".to_string())]);
        assert!(matches!(
            ColumnMapping::new(entries),
            Err(DomainError::MalformedData(_))
        ));
    }

    #[test]
    fn test_mapping_keeps_order() {
        let mapping: ColumnMapping = serde_json::from_str(r#"{"b": "B", "a": "A"}"#).unwrap();
        let targets: Vec<_> = mapping.iter().map(|(_, t)| t).collect();
        assert_eq!(targets, vec!["B", "A"]);
    }

    #[test]
    fn test_blank_cells_are_missing() {
        let rows = TabularRows::new(
            vec!["a".into(), "b".into()],
            vec![vec![Some("1".into()), Some("  ".into())]],
        );
        assert_eq!(rows.cell(0, 0), Some("1"));
        assert_eq!(rows.cell(0, 1), None);
        assert_eq!(rows.cell(0, 5), None);
    }
}
