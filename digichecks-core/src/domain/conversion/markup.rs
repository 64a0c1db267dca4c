// digichecks-core/src/domain/conversion/markup.rs

use super::tabular::{ColumnMapping, TabularRows};

/// Placeholder text for a mapped column that has no value in a row.
pub const MISSING: &str = "N/A";

const DECLARATION: &str = "<?xml version='1.0' encoding='utf-8'?>";

/// Intermediate markup: one record per input row, one field per mapping entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup {
    pub records: Vec<Vec<(String, String)>>,
}

impl Markup {
    /// Builds the records. Missing columns and empty cells become [`MISSING`];
    /// this step never fails.
    pub fn from_rows(rows: &TabularRows, mapping: &ColumnMapping) -> Self {
        let columns: Vec<(Option<usize>, &str)> = mapping
            .iter()
            .map(|(source, target)| (rows.column_index(source), target))
            .collect();

        let records = (0..rows.len())
            .map(|row| {
                columns
                    .iter()
                    .map(|(column, target)| {
                        let text = column
                            .and_then(|c| rows.cell(row, c))
                            .unwrap_or(MISSING);
                        (target.to_string(), text.to_string())
                    })
                    .collect()
            })
            .collect();

        Self { records }
    }

    /// Serializes as `<root><row>...</row></root>` behind the XML declaration.
    pub fn to_xml(&self) -> String {
        let mut out = String::from(DECLARATION);
        out.push('\n');
        if self.records.is_empty() {
            out.push_str("<root />");
            return out;
        }
        out.push_str("<root>");
        for record in &self.records {
            if record.is_empty() {
                out.push_str("<row />");
                continue;
            }
            out.push_str("<row>");
            for (name, text) in record {
                out.push('<');
                out.push_str(name);
                out.push('>');
                out.push_str(&escape_text(text));
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            out.push_str("</row>");
        }
        out.push_str("</root>");
        out
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
