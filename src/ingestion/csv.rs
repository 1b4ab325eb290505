//! CSV reader.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Row, Schema};

use super::unified::ReadOutcome;

/// Read a CSV file: first record is the header, every later record is a data row.
///
/// Rules:
///
/// - Standard CSV quoting and escaping.
/// - Values are kept verbatim (no whitespace stripping).
/// - Records must have as many cells as the header.
pub fn read_csv_from_path(path: &Path) -> IngestionResult<ReadOutcome> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;
    let dataset = read_csv_from_reader(&mut rdr)?.ok_or_else(|| IngestionError::EmptyFile {
        path: path.to_path_buf(),
    })?;
    Ok(ReadOutcome::from_dataset(dataset))
}

/// Read CSV data from an existing CSV reader.
///
/// Returns `Ok(None)` when the input has no header record.
pub fn read_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
) -> IngestionResult<Option<DataSet>> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(None);
    }
    let schema = Schema::from_names(headers.iter());

    let mut rows: Vec<Row> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(|v| Some(v.to_owned())).collect());
    }

    Ok(Some(DataSet::new(schema, rows)))
}
