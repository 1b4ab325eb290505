//! Run configuration.
//!
//! [`LoadOptions`] can be built in code (use [`Default`] for common cases) or read from a JSON
//! settings file; every key is optional:
//!
//! ```json
//! { "database": "main", "table": "registry", "text_column_width": 50,
//!   "target_encoding": "big5", "num_threads": 4, "log_dir": "log" }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{IngestionResult, StoreResult};
use crate::ingestion::normalize::strip_whitespace;
use crate::store::{TextEncoding, DEFAULT_TEXT_COLUMN_WIDTH};

/// Options controlling a load run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Database holding the target table.
    pub database: String,
    /// Target table. If `None`, derived from the source file or directory name.
    pub table: Option<String>,
    /// Maximum width of every text column.
    pub text_column_width: usize,
    /// WHATWG label of the encoding text columns are stored in.
    pub target_encoding: String,
    /// Worker threads for directory reads. If `None`, uses available parallelism.
    pub num_threads: Option<usize>,
    /// Directory for `informations.log` / `errors.log`. If `None`, logs go to `tracing` only.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            database: "main".to_string(),
            table: None,
            text_column_width: DEFAULT_TEXT_COLUMN_WIDTH,
            target_encoding: "utf-8".to_string(),
            num_threads: None,
            log_dir: None,
        }
    }
}

impl LoadOptions {
    /// Read options from a JSON settings file.
    pub fn from_json_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Resolve [`Self::target_encoding`].
    pub fn text_encoding(&self) -> StoreResult<TextEncoding> {
        TextEncoding::for_label(&self.target_encoding)
    }

    /// Table name for `source`: the configured name, else the file stem (the full name for a
    /// directory) without whitespace.
    pub fn table_for(&self, source: &Path) -> String {
        if let Some(table) = &self.table {
            return table.clone();
        }
        let name = if source.is_dir() {
            source.file_name()
        } else {
            source.file_stem()
        };
        strip_whitespace(name.and_then(|s| s.to_str()).unwrap_or_default())
    }
}
