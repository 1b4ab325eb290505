//! Legacy household registry exports (`.utf8` / `.ucs`).
//!
//! These files have no header line. Each line is a comma-separated record terminated by a
//! sentinel cell. Depending on the producing system a record has 13 or 14 cells once the
//! sentinel is dropped; both shapes are folded into the same 10 columns.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use crate::error::IngestionResult;
use crate::types::{DataSet, Row, Schema};

use super::normalize::{fold_address, strip_spaces};
use super::unified::{read_source_text, InvalidLine, ReadOutcome};

/// Column layout shared by every registry export.
pub const REGISTRY_FIELDS: [&str; 10] = [
    "header",
    "pid",
    "name",
    "birth",
    "householdNumber",
    "address",
    "role",
    "annotation",
    "emigrationType",
    "householdCode",
];

/// Position of the primary key (`pid`).
pub const KEY_INDEX: usize = 1;

/// Cell count of records that lack the `name` column.
const SHORT_RECORD: usize = 13;
/// Cell count of complete records.
const FULL_RECORD: usize = 14;

/// Schema used for every registry export.
pub fn registry_schema() -> Schema {
    Schema::from_names(REGISTRY_FIELDS)
}

/// Read a registry export.
pub fn read_fixed_width_from_path(path: &Path) -> IngestionResult<ReadOutcome> {
    let text = read_source_text(path)?;
    Ok(read_fixed_width_from_str(&text))
}

/// Read a registry export from an in-memory string.
///
/// Lines with the wrong cell count and records whose `pid` was already seen are left out of
/// the dataset and reported in the outcome instead.
pub fn read_fixed_width_from_str(input: &str) -> ReadOutcome {
    let mut rows: Vec<Row> = Vec::new();
    let mut invalid_lines = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut duplicate_keys = BTreeSet::new();

    for (idx0, line) in input.lines().enumerate() {
        let line_no = idx0 + 1;
        let mut cells: Vec<String> = line.trim().split(',').map(strip_spaces).collect();
        cells.pop();

        let row = match normalize_record(cells) {
            Ok(row) => row,
            Err(cells) => {
                invalid_lines.push(InvalidLine { line: line_no, cells });
                continue;
            }
        };

        let key = row[KEY_INDEX].clone().unwrap_or_default();
        if seen.insert(key.clone()) {
            rows.push(row);
        } else {
            duplicate_keys.insert(key);
        }
    }

    ReadOutcome {
        dataset: DataSet::new(registry_schema(), rows),
        invalid_lines,
        duplicate_keys,
    }
}

/// Fold a 13- or 14-cell record into the 10 registry columns.
///
/// Gives the cells back unchanged when the record has any other length.
pub fn normalize_record(mut cells: Vec<String>) -> Result<Row, Vec<String>> {
    match cells.len() {
        SHORT_RECORD => {
            // Address sits at 4 until the missing name column is re-inserted.
            fold_address(&mut cells, 4);
            let mut row: Row = cells.into_iter().map(Some).collect();
            row.insert(2, None);
            Ok(row)
        }
        FULL_RECORD => {
            fold_address(&mut cells, 5);
            Ok(cells.into_iter().map(Some).collect())
        }
        _ => Err(cells),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(s: &str) -> Vec<String> {
        s.split(',').map(str::to_string).collect()
    }

    #[test]
    fn short_record_gets_null_name_and_merged_address() {
        let row = normalize_record(cells("H,A1,0500101,12,Main,St,No,5,F2,r,n,e,c")).unwrap();
        assert_eq!(row.len(), REGISTRY_FIELDS.len());
        assert_eq!(row[2], None);
        assert_eq!(row[5].as_deref(), Some("MainStNo5F2"));
        assert_eq!(row[9].as_deref(), Some("c"));
    }

    #[test]
    fn full_record_merges_address_without_placeholder() {
        let row = normalize_record(cells("H,A1,Lin,0500101,12,Main,St,No,5,F2,r,n,e,c")).unwrap();
        assert_eq!(row.len(), REGISTRY_FIELDS.len());
        assert_eq!(row[2].as_deref(), Some("Lin"));
        assert_eq!(row[5].as_deref(), Some("MainStNo5F2"));
    }

    #[test]
    fn other_lengths_are_rejected() {
        let back = normalize_record(cells("a,b,c")).unwrap_err();
        assert_eq!(back.len(), 3);
    }
}
