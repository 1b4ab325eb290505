use std::path::Path;

use tabular_loader::ingestion::csv::{read_csv_from_path, read_csv_from_reader};
use tabular_loader::IngestionError;

fn some(s: &str) -> Option<String> {
    Some(s.to_string())
}

#[test]
fn read_csv_from_path_keeps_quoted_values() {
    let out = read_csv_from_path(Path::new("tests/fixtures/people.csv")).unwrap();
    let ds = out.dataset;

    let names: Vec<&str> = ds.schema.field_names().collect();
    assert_eq!(names, vec!["id", "name", "city"]);
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0], vec![some("1"), some("Lin, Ada"), some("Taipei")]);
    assert_eq!(ds.rows[1][2], some("New \"Hope\""));
}

#[test]
fn read_csv_keeps_padding_verbatim() {
    let input = "a,b\n x , y\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let ds = read_csv_from_reader(&mut rdr).unwrap().unwrap();
    assert_eq!(ds.rows[0], vec![some(" x "), some(" y")]);
}

#[test]
fn read_csv_errors_on_ragged_record() {
    let input = "a,b\n1,2\n3\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());

    let err = read_csv_from_reader(&mut rdr).unwrap_err();
    assert!(err.to_string().contains("csv error"));
}

#[test]
fn read_csv_empty_input_has_no_header() {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader("".as_bytes());
    assert!(read_csv_from_reader(&mut rdr).unwrap().is_none());
}

#[test]
fn read_csv_missing_file_is_io() {
    let err = read_csv_from_path(Path::new("tests/fixtures/does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, IngestionError::Csv(_)));
}
