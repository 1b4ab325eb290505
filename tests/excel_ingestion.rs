#![cfg(feature = "excel_test_writer")]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tabular_loader::ingestion::excel::read_excel_from_path;
use tabular_loader::ingestion::read_path;
use tabular_loader::IngestionError;

fn tmp_file(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tabular-loader-{name}-{nanos}.xlsx"))
}

fn write_people_xlsx(path: &PathBuf) {
    use rust_xlsxwriter::Workbook;

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1").unwrap();

    ws.write_string(0, 0, "id").unwrap();
    ws.write_string(0, 1, "name").unwrap();
    ws.write_string(0, 2, "score").unwrap();

    ws.write_number(1, 0, 1).unwrap();
    ws.write_string(1, 1, "Ada").unwrap();
    ws.write_number(1, 2, 98.5).unwrap();

    ws.write_number(2, 0, 2).unwrap();
    ws.write_string(2, 1, "Grace").unwrap();

    // Only the first sheet is read.
    let ws2 = wb.add_worksheet();
    ws2.set_name("Ignored").unwrap();
    ws2.write_string(0, 0, "other").unwrap();

    wb.save(path).unwrap();
}

#[test]
fn read_excel_first_row_is_header() {
    let path = tmp_file("people");
    write_people_xlsx(&path);

    let out = read_excel_from_path(&path).unwrap();
    let names: Vec<&str> = out.dataset.schema.field_names().collect();
    assert_eq!(names, vec!["id", "name", "score"]);
    assert_eq!(out.dataset.row_count(), 2);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn read_excel_numbers_keep_textual_form() {
    let path = tmp_file("numbers");
    write_people_xlsx(&path);

    let ds = read_path(&path).unwrap().dataset;
    assert_eq!(ds.rows[0][0].as_deref(), Some("1"));
    assert_eq!(ds.rows[0][2].as_deref(), Some("98.5"));
    assert_eq!(ds.rows[1][2].as_deref(), Some(""));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn read_excel_empty_sheet_is_empty_file() {
    use rust_xlsxwriter::Workbook;

    let path = tmp_file("empty");
    let mut wb = Workbook::new();
    wb.add_worksheet();
    wb.save(&path).unwrap();

    let err = read_excel_from_path(&path).unwrap_err();
    assert!(matches!(err, IngestionError::EmptyFile { .. }));

    let _ = std::fs::remove_file(&path);
}
