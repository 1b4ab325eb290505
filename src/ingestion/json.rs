//! JSON reader.
//!
//! Supported input: a JSON array of flat objects, `[{"a":"1"}, {"a":"2"}]`.
//!
//! The header is the key list of the first object, in document order. Every object is
//! projected onto that header. An `InvYear` field is rewritten from a Gregorian year to a
//! three-digit Minguo year before values are stripped of spaces.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Row, Schema};

use super::normalize::{strip_spaces, to_minguo_year};
use super::unified::{read_source_text, ReadOutcome};

/// Field holding an invoice year that is stored in the Minguo calendar.
pub const INVOICE_YEAR_FIELD: &str = "InvYear";

/// Read a JSON file into a [`ReadOutcome`].
pub fn read_json_from_path(path: &Path) -> IngestionResult<ReadOutcome> {
    let text = read_source_text(path)?;
    read_json_from_str(&text)?
        .map(ReadOutcome::from_dataset)
        .ok_or_else(|| IngestionError::EmptyFile {
            path: path.to_path_buf(),
        })
}

/// Read JSON from an in-memory string.
///
/// Returns `Ok(None)` for an empty array.
pub fn read_json_from_str(input: &str) -> IngestionResult<Option<DataSet>> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(IngestionError::SchemaMismatch {
                message: "json must be an array of objects".to_string(),
            });
        }
    };

    let Some(first) = items.first() else {
        return Ok(None);
    };
    let first = first.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
        message: "row 1 is not a json object".to_string(),
    })?;
    let schema = Schema::from_names(first.keys().cloned());

    let mut rows: Vec<Row> = Vec::with_capacity(items.len());
    for (idx0, item) in items.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = item.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!("row {row_num} is not a json object"),
        })?;

        let mut row: Row = Vec::with_capacity(schema.len());
        for field in &schema.fields {
            let jv = obj.get(&field.name).ok_or_else(|| IngestionError::SchemaMismatch {
                message: format!("row {row_num} missing required field '{}'", field.name),
            })?;
            let mut text = json_value_to_text(jv);
            if field.name == INVOICE_YEAR_FIELD {
                if let Some(raw) = text.as_deref() {
                    let converted = to_minguo_year(raw).map_err(|message| IngestionError::Parse {
                        row: row_num,
                        column: field.name.clone(),
                        raw: raw.to_string(),
                        message,
                    })?;
                    text = Some(converted);
                }
            }
            row.push(text.map(|t| strip_spaces(&t)));
        }
        rows.push(row);
    }

    Ok(Some(DataSet::new(schema, rows)))
}

fn json_value_to_text(v: &serde_json::Value) -> Option<String> {
    match v {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
