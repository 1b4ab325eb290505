use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for reading source files.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Convenience result type for a whole load run.
pub type LoadResult<T> = Result<T, LoadError>;

/// Error type returned by the format readers.
///
/// Every variant is fatal to the file being read, never to the whole run.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet decoding error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No reader is registered for the file extension.
    #[error("unsupported format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The file decoded but yielded no header (or no records where a header is required).
    #[error("empty file: {}", path.display())]
    EmptyFile { path: PathBuf },

    /// The file is not valid UTF-8 text.
    #[error("cannot decode {} as utf-8: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// The input does not have the expected shape.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be converted.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    Parse {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// The worker pool for the directory read could not be started.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Error type returned by [`crate::store::Store`] implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database driver error (constraint violation, missing column, connectivity, ...).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A value cannot be represented in the store's target text encoding.
    #[error("value in column '{column}' cannot be encoded as {encoding}: {value:?}")]
    Encoding {
        column: String,
        encoding: String,
        value: String,
    },

    /// The configured target encoding label is not known.
    #[error("unknown text encoding label '{label}'")]
    UnknownEncoding { label: String },

    /// A row does not have one value per column.
    #[error("row has {actual} values but the table has {expected} columns")]
    ColumnCount { expected: usize, actual: usize },
}

impl StoreError {
    /// Whether this failure belongs to the class that is repaired and retried.
    pub fn is_encoding(&self) -> bool {
        matches!(self, StoreError::Encoding { .. })
    }
}

/// Error type returned by [`crate::execution::Loader::run`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
