//! Delimited text (`.txt`) reader.
//!
//! The first line is a comma-separated header; later lines are comma-separated values padded
//! with ASCII and full-width spaces. No quoting is recognised.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Row, Schema};

use super::normalize::{strip_ascii_spaces, strip_spaces};
use super::unified::{read_source_text, InvalidLine, ReadOutcome};

/// Read a delimited text file.
pub fn read_delimited_from_path(path: &Path) -> IngestionResult<ReadOutcome> {
    let text = read_source_text(path)?;
    read_delimited_from_str(&text).ok_or_else(|| IngestionError::EmptyFile {
        path: path.to_path_buf(),
    })
}

/// Read delimited text from an in-memory string.
///
/// Returns `None` when there is no header line.
pub fn read_delimited_from_str(input: &str) -> Option<ReadOutcome> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(idx0, line)| (idx0 + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header) = lines.next()?;
    let schema = Schema::from_names(header.split(',').map(strip_ascii_spaces));

    let mut rows: Vec<Row> = Vec::new();
    let mut invalid_lines = Vec::new();
    for (line_no, line) in lines {
        let cells: Vec<String> = line.split(',').map(strip_spaces).collect();
        if cells.len() != schema.len() {
            invalid_lines.push(InvalidLine { line: line_no, cells });
            continue;
        }
        rows.push(cells.into_iter().map(Some).collect());
    }

    let mut outcome = ReadOutcome::from_dataset(DataSet::new(schema, rows));
    outcome.invalid_lines = invalid_lines;
    Some(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_spaces_are_removed() {
        let out = read_delimited_from_str("house hold, name\n1,a\n").unwrap();
        let names: Vec<&str> = out.dataset.schema.field_names().collect();
        assert_eq!(names, vec!["household", "name"]);
    }

    #[test]
    fn cells_lose_ascii_and_full_width_spaces() {
        let out = read_delimited_from_str("id,name\r\n 7 ,王\u{3000}大 明\r\n").unwrap();
        assert_eq!(
            out.dataset.rows,
            vec![vec![Some("7".to_string()), Some("王大明".to_string())]]
        );
    }

    #[test]
    fn ragged_lines_are_reported_not_loaded() {
        let out = read_delimited_from_str("a,b\n1,2\n\n3\n4,5\n").unwrap();
        assert_eq!(out.dataset.row_count(), 2);
        assert_eq!(out.invalid_lines.len(), 1);
        assert_eq!(out.invalid_lines[0].line, 4);
    }

    #[test]
    fn blank_input_has_no_header() {
        assert!(read_delimited_from_str("\n  \n").is_none());
    }
}
