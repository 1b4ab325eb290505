#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Row, Schema};

use super::unified::ReadOutcome;

/// Read the first worksheet of a spreadsheet (`.xlsx`, `.xls`, `.ods`, etc.).
///
/// Behavior:
/// - Row 0 is the header row
/// - Every later row is a data row, cells rendered as text
/// - Numeric cells keep their textual form; whole numbers print without a fraction
pub fn read_excel_from_path(path: &Path) -> IngestionResult<ReadOutcome> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestionError::EmptyFile {
            path: path.to_path_buf(),
        })?;
    let range = workbook.worksheet_range(&sheet)?;

    let dataset = read_sheet_range(&range).ok_or_else(|| IngestionError::EmptyFile {
        path: path.to_path_buf(),
    })?;
    Ok(ReadOutcome::from_dataset(dataset))
}

fn read_sheet_range(range: &calamine::Range<Data>) -> Option<DataSet> {
    let mut rows_iter = range.rows();
    let header = rows_iter.next()?;
    let schema = Schema::from_names(header.iter().map(cell_to_string));

    let rows: Vec<Row> = rows_iter
        .map(|row| {
            // Short rows are padded to the header width.
            (0..schema.len())
                .map(|i| Some(row.get(i).map(cell_to_string).unwrap_or_default()))
                .collect()
        })
        .collect();

    Some(DataSet::new(schema, rows))
}

fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
