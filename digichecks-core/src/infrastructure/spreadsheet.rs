// digichecks-core/src/infrastructure/spreadsheet.rs

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use tracing::debug;

use crate::domain::conversion::{DatasetType, TabularRows};
use crate::domain::error::DomainError;

/// Decodes raw tabular bytes into rows. The first row holds the headers.
pub fn decode_tabular(kind: DatasetType, bytes: &[u8]) -> Result<TabularRows, DomainError> {
    let rows = match kind {
        DatasetType::Excel => decode_workbook(bytes)?,
        DatasetType::Csv => decode_csv(bytes)?,
        DatasetType::JsonLd => {
            return Err(DomainError::MalformedData(
                "JSON-LD datasets are not tabular".to_string(),
            ));
        }
    };
    debug!(kind = %kind, rows = rows.len(), columns = rows.headers.len(), "Decoded dataset");
    Ok(rows)
}

/// First worksheet of an xlsx/xls/ods workbook.
fn decode_workbook(bytes: &[u8]) -> Result<TabularRows, DomainError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| DomainError::MalformedData(format!("Unreadable workbook: {}", e)))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DomainError::MalformedData("Workbook has no worksheet".to_string()))?
        .map_err(|e| DomainError::MalformedData(format!("Unreadable worksheet: {}", e)))?;

    let mut lines = range.rows();
    let headers = match lines.next() {
        Some(first) => first
            .iter()
            .enumerate()
            .map(|(i, cell)| header_name(i, cell_text(cell)))
            .collect(),
        None => Vec::new(),
    };
    let rows = lines
        .map(|line| line.iter().map(cell_text).collect())
        .collect();
    Ok(TabularRows::new(headers, rows))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => Some(other.to_string()),
    }
}

fn decode_csv(bytes: &[u8]) -> Result<TabularRows, DomainError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| DomainError::MalformedData(format!("Unreadable CSV header: {}", e)))?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, Some(h.to_string())))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| DomainError::MalformedData(format!("Unreadable CSV row: {}", e)))?;
        rows.push(record.iter().map(|c| Some(c.to_string())).collect());
    }
    Ok(TabularRows::new(headers, rows))
}

/// `;` when the header line uses it more than `,` (common in Spanish exports).
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let count = |d: u8| first_line.iter().filter(|b| **b == d).count();
    if count(b';') > count(b',') { b';' } else { b',' }
}

fn header_name(index: usize, text: Option<String>) -> String {
    match text.map(|t| t.trim().to_string()) {
        Some(t) if !t.is_empty() => t,
        _ => format!("Unnamed: {}", index),
    }
}
