use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tabular_loader::ingestion::{
    list_source_files, read_directory, read_path, read_path_as, severity_for_error,
    IngestionSeverity, SourceFormat,
};
use tabular_loader::IngestionError;

fn tmp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("tabular-loader-{name}-{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn read_path_dispatches_on_extension() {
    for (path, columns) in [
        ("tests/fixtures/people.csv", 3),
        ("tests/fixtures/households.txt", 3),
        ("tests/fixtures/invoices.json", 4),
        ("tests/fixtures/registry.utf8", 10),
    ] {
        let out = read_path(path).unwrap();
        assert_eq!(out.dataset.schema.len(), columns, "{path}");
        assert!(
            out.dataset.rows.iter().all(|r| r.len() == columns),
            "{path}: every row has one value per column"
        );
    }
}

#[test]
fn read_path_as_overrides_extension() {
    let out = read_path_as("tests/fixtures/people.csv", SourceFormat::DelimitedText).unwrap();
    // Without quoting rules the quoted comma splits a cell, so that line is skipped.
    assert_eq!(out.invalid_lines.len(), 1);
    assert_eq!(out.dataset.row_count(), 1);
}

#[test]
fn unrecognized_extension_is_unsupported() {
    let err = read_path("tests/fixtures/notes.md").unwrap_err();
    assert!(matches!(err, IngestionError::UnsupportedFormat { .. }));
}

#[test]
fn empty_text_file_is_empty_file_error() {
    let dir = tmp_dir("empty");
    let path = dir.join("empty.txt");
    fs::write(&path, "").unwrap();

    let err = read_path(&path).unwrap_err();
    assert!(matches!(err, IngestionError::EmptyFile { .. }));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn non_utf8_text_sources_are_decode_errors() {
    let dir = tmp_dir("non-utf8");
    for (name, body) in [
        ("bad.txt", &b"id,name\n1,\xff\xfe\n"[..]),
        ("bad.json", &b"[{\"a\":\"\xff\"}]"[..]),
        ("bad.utf8", &b"H,A1,\xc3\x28\n"[..]),
    ] {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();

        let err = read_path(&path).unwrap_err();
        assert!(matches!(err, IngestionError::Decode { .. }), "{name}: {err}");
        assert!(err.to_string().contains(name), "{name}: {err}");
        assert_eq!(severity_for_error(&err), IngestionSeverity::Error, "{name}");
    }

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_directory_listing_keeps_walk_error_text() {
    let missing = tmp_dir("missing-parent").join("no_such_dir");
    let err = list_source_files(&missing).unwrap_err();
    assert!(matches!(err, IngestionError::Io(_)));
    assert!(err.to_string().contains("no_such_dir"), "{err}");
}

#[test]
fn read_directory_returns_results_in_file_name_order() {
    let dir = tmp_dir("dir-order");
    for (i, name) in ["c.csv", "a.csv", "b.txt", "d.bin"].iter().enumerate() {
        let body = if name.ends_with(".bin") {
            "\u{0}\u{1}".to_string()
        } else {
            format!("id,v\n{i},x\n")
        };
        fs::write(dir.join(name), body).unwrap();
    }
    fs::create_dir_all(dir.join("nested")).unwrap();

    let results = read_directory(&dir, Some(4)).unwrap();
    let names: Vec<String> = results
        .iter()
        .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.csv", "b.txt", "c.csv", "d.bin"]);

    let a = results[0].1.as_ref().unwrap();
    assert_eq!(a.dataset.rows[0][0].as_deref(), Some("1"));
    let c = results[2].1.as_ref().unwrap();
    assert_eq!(c.dataset.rows[0][0].as_deref(), Some("0"));
    assert!(matches!(
        results[3].1,
        Err(IngestionError::UnsupportedFormat { .. })
    ));

    let _ = fs::remove_dir_all(&dir);
}
