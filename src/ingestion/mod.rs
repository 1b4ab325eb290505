//! Readers for every supported source format.
//!
//! Most callers should use [`read_path`] (from [`unified`]) which:
//!
//! - picks the reader from the file extension
//! - returns the header, the rows, and anything the reader skipped
//!
//! [`read_directory`] reads every file of a folder on a worker pool and hands the results back
//! in file-name order.
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`delimited`]
//! - [`json`]
//! - [`fixed_width`]

pub mod csv;
pub mod delimited;
#[cfg(feature = "excel")]
pub mod excel;
pub mod fixed_width;
pub mod json;
pub mod normalize;
pub mod observability;
pub mod unified;

pub use observability::{
    severity_for_error, CompositeSink, FileSink, IngestionSeverity, LogSink, RunLogs, TracingSink,
    ERROR_LOG, INFO_LOG,
};
pub use unified::{
    list_source_files, read_directory, read_path, read_path_as, InvalidLine, ReadOutcome,
    SourceFormat,
};
