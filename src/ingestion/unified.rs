//! Unified read entrypoint.
//!
//! Most callers should use [`read_path`] for a single file or [`read_directory`] for a folder.
//!
//! - The [`SourceFormat`] is decided once from the file extension via [`SourceFormat::from_extension`].
//! - The format tag selects a reader function from a static table; readers never log and never
//!   share state, so they can run on worker threads.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use walkdir::WalkDir;

use crate::error::{IngestionError, IngestionResult};
use crate::types::DataSet;

use super::{csv, delimited, fixed_width, json};

/// Supported source formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Spreadsheet,
    /// Comma-delimited `.txt` with a header line and space padding.
    DelimitedText,
    /// JSON array of objects.
    Json,
    /// Legacy registry exports (`.utf8` / `.ucs`) without a header line.
    FixedWidth,
    /// Comma-separated values with standard quoting.
    Csv,
}

/// Extension -> format table. Lookups are case-insensitive.
const EXTENSIONS: &[(&str, SourceFormat)] = &[
    ("xlsx", SourceFormat::Spreadsheet),
    ("xls", SourceFormat::Spreadsheet),
    ("xlsm", SourceFormat::Spreadsheet),
    ("xlsb", SourceFormat::Spreadsheet),
    ("ods", SourceFormat::Spreadsheet),
    ("txt", SourceFormat::DelimitedText),
    ("json", SourceFormat::Json),
    ("utf8", SourceFormat::FixedWidth),
    ("ucs", SourceFormat::FixedWidth),
    ("csv", SourceFormat::Csv),
];

type ReaderFn = fn(&Path) -> IngestionResult<ReadOutcome>;

/// Format -> reader table.
const READERS: &[(SourceFormat, ReaderFn)] = &[
    (SourceFormat::Spreadsheet, read_spreadsheet_dispatch),
    (SourceFormat::DelimitedText, delimited::read_delimited_from_path),
    (SourceFormat::Json, json::read_json_from_path),
    (SourceFormat::FixedWidth, fixed_width::read_fixed_width_from_path),
    (SourceFormat::Csv, csv::read_csv_from_path),
];

impl SourceFormat {
    /// Parse a source format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|&(_, format)| format)
    }

    /// Infer the format of `path` from its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
    }

    fn reader(self) -> ReaderFn {
        READERS
            .iter()
            .find(|(format, _)| *format == self)
            .map(|&(_, reader)| reader)
            .unwrap_or(unregistered_reader)
    }
}

/// A line that was skipped because it did not split into the expected number of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    /// 1-based line number in the source file.
    pub line: usize,
    /// The cells the line split into, after cleansing.
    pub cells: Vec<String>,
}

/// Result of reading one source file.
///
/// Besides the rows, readers report lines they skipped and keys they suppressed, so the
/// caller can log them in a deterministic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    /// Header plus data rows.
    pub dataset: DataSet,
    /// Lines skipped for having the wrong cell count.
    pub invalid_lines: Vec<InvalidLine>,
    /// Primary keys seen more than once (later occurrences were dropped).
    pub duplicate_keys: BTreeSet<String>,
}

impl ReadOutcome {
    /// Outcome with rows only.
    pub fn from_dataset(dataset: DataSet) -> Self {
        Self {
            dataset,
            invalid_lines: Vec::new(),
            duplicate_keys: BTreeSet::new(),
        }
    }
}

/// Read one file, choosing the reader from the file extension.
///
/// Returns [`IngestionError::UnsupportedFormat`] when no reader is registered for the extension.
pub fn read_path(path: impl AsRef<Path>) -> IngestionResult<ReadOutcome> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path).ok_or_else(|| IngestionError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    read_path_as(path, format)
}

/// Read one file with an explicit format, ignoring its extension.
pub fn read_path_as(path: impl AsRef<Path>, format: SourceFormat) -> IngestionResult<ReadOutcome> {
    (format.reader())(path.as_ref())
}

/// List the regular files directly inside `dir`, sorted by file name.
pub fn list_source_files(dir: impl AsRef<Path>) -> IngestionResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| IngestionError::Io(e.into()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Read every file in `dir` in parallel.
///
/// Each file is read by an independent worker. Results are returned in file-name order,
/// paired with the path they came from, regardless of which worker finished first.
///
/// `num_threads = None` uses the platform's available parallelism.
pub fn read_directory(
    dir: impl AsRef<Path>,
    num_threads: Option<usize>,
) -> IngestionResult<Vec<(PathBuf, IngestionResult<ReadOutcome>)>> {
    let files = list_source_files(dir)?;

    let n_threads = num_threads
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
        .max(1);
    let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

    let results: Vec<IngestionResult<ReadOutcome>> =
        pool.install(|| files.par_iter().map(read_path).collect());

    Ok(files.into_iter().zip(results).collect())
}

/// Read a text source. Bytes that are not UTF-8 fail with [`IngestionError::Decode`].
pub(crate) fn read_source_text(path: &Path) -> IngestionResult<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| IngestionError::Decode {
        path: path.to_path_buf(),
        message: e.utf8_error().to_string(),
    })
}

fn unregistered_reader(path: &Path) -> IngestionResult<ReadOutcome> {
    Err(IngestionError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

fn read_spreadsheet_dispatch(path: &Path) -> IngestionResult<ReadOutcome> {
    #[cfg(feature = "excel")]
    {
        super::excel::read_excel_from_path(path)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::SchemaMismatch {
            message: format!(
                "spreadsheet ingestion not enabled (enable cargo feature 'excel'): {}",
                path.display()
            ),
        })
    }
}
