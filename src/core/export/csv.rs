//! CSV serialization of flat rows
//!
//! Output is spreadsheet-friendly: it starts with a UTF-8 byte order mark,
//! every field is quoted, embedded quotes are doubled and records end in CRLF.

use crate::core::transform::FlatRow;
use crate::domain::{HmsExportError, Result};
use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// UTF-8 byte order mark written before the header row
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// How the header row is chosen when rows have different columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderStrategy {
    /// Every column seen in any row, in first-seen order
    #[default]
    Union,
    /// Columns of the first row only; other columns are dropped
    FirstRow,
}

impl HeaderStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderStrategy::Union => "union",
            HeaderStrategy::FirstRow => "first_row",
        }
    }
}

impl fmt::Display for HeaderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderStrategy {
    type Err = HmsExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "union" | "all" => Ok(Self::Union),
            "first_row" | "first" | "legacy" => Ok(Self::FirstRow),
            _ => Err(HmsExportError::Configuration(format!(
                "Invalid CSV header strategy: {s}. Expected 'union' or 'first_row'"
            ))),
        }
    }
}

/// Header columns for `rows` under the given strategy
pub fn collect_header(rows: &[FlatRow], strategy: HeaderStrategy) -> Vec<String> {
    match strategy {
        HeaderStrategy::FirstRow => rows
            .first()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default(),
        HeaderStrategy::Union => {
            let mut header = indexmap::IndexSet::new();
            for row in rows {
                for key in row.keys() {
                    if !header.contains(key) {
                        header.insert(key.clone());
                    }
                }
            }
            header.into_iter().collect()
        }
    }
}

/// Text of one cell
///
/// Null renders empty, whole floats drop their fraction (`37.0` is `37`),
/// and objects or arrays are inlined as compact JSON.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Serialize rows to CSV bytes
///
/// # Errors
///
/// Returns the "No data to export" error when `rows` is empty.
pub fn write_csv(rows: &[FlatRow], strategy: HeaderStrategy) -> Result<Vec<u8>> {
    if rows.is_empty() {
        return Err(HmsExportError::no_data());
    }

    let header = collect_header(rows, strategy);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .has_headers(false)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(&header)?;
    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|column| row.get(column).map(cell_text).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| HmsExportError::Render(format!("Failed to finish CSV output: {e}")))
}
