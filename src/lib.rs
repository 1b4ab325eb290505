//! `tabular-loader` loads tabular source files into a relational table, one committed row at a
//! time.
//!
//! A run reads a file (or every file of a directory), takes the field list from the file's
//! header, creates the target table if it does not exist, and inserts every row. Rows whose
//! values cannot be stored in the table's text encoding are repaired and retried once after
//! the first pass; every other failure is logged with the row so it can be replayed by hand.
//!
//! ## What you can load
//!
//! **File formats (selected by extension):**
//!
//! - **Spreadsheets** (Cargo feature `excel`, on by default): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//! - **Delimited text**: `.txt`, comma-separated with space/full-width-space padding
//! - **JSON**: `.json`, an array of flat objects (`InvYear` is converted to a Minguo year)
//! - **Registry exports**: `.utf8`, `.ucs`, headerless 13/14-cell records folded into 10 columns
//! - **CSV**: `.csv`, standard quoting
//!
//! Every column is bounded-width text; values are strings, and `None` is SQL `NULL`.
//!
//! ## Quick example
//!
//! ```no_run
//! use tabular_loader::config::LoadOptions;
//! use tabular_loader::execution::Loader;
//! use tabular_loader::store::SqliteStore;
//!
//! # fn main() -> Result<(), tabular_loader::LoadError> {
//! let store = SqliteStore::open("registry.db")?;
//! let opts = LoadOptions {
//!     table: Some("households".to_string()),
//!     ..Default::default()
//! };
//! let mut loader = Loader::new(store, opts);
//! let report = loader.run("input/households.utf8")?;
//! println!("{}", report.summarize());
//! loader.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! Reading without loading:
//!
//! ```no_run
//! use tabular_loader::ingestion::read_path;
//!
//! # fn main() -> Result<(), tabular_loader::IngestionError> {
//! let outcome = read_path("input/people.csv")?;
//! println!("columns={} rows={}", outcome.dataset.schema.len(), outcome.dataset.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: format readers, cleansing rules and log sinks
//! - [`store`]: the database seam and its SQLite implementation
//! - [`execution`]: table creation, the insert engine and run reports
//! - [`config`]: run options
//! - [`types`]: schema, rows and job description
//! - [`error`]: error types

pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod store;
pub mod types;

pub use error::{IngestionError, IngestionResult, LoadError, LoadResult, StoreError, StoreResult};
