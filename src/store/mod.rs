//! The relational store the loader writes into.
//!
//! [`Store`] is the seam between the insert engine and a database connection. It is used only
//! from the sequential insert phase, never from the parallel read phase.

mod sqlite;

use encoding_rs::Encoding;

use crate::error::{StoreError, StoreResult};
use crate::types::{Row, Schema};

pub use sqlite::SqliteStore;

/// Default maximum width of every text column.
pub const DEFAULT_TEXT_COLUMN_WIDTH: usize = 50;

/// Character substituted for anything the target encoding cannot represent.
pub const REPLACEMENT_CHAR: char = '?';

/// A database connection the loader can create tables in and insert rows into.
pub trait Store {
    /// Names of the databases reachable from this connection.
    fn list_databases(&mut self) -> StoreResult<Vec<String>>;

    /// Create `database.table` with one bounded-width text column per field, unless it exists.
    ///
    /// Calling this again with the same schema is a no-op.
    fn create_table(
        &mut self,
        database: &str,
        table: &str,
        schema: &Schema,
        text_width: usize,
    ) -> StoreResult<()>;

    /// Insert one row positionally. The row is not durable until [`Store::commit`].
    fn insert_row(
        &mut self,
        database: &str,
        table: &str,
        schema: &Schema,
        row: &Row,
    ) -> StoreResult<()>;

    /// Commit the pending insert.
    fn commit(&mut self) -> StoreResult<()>;

    /// Encoding text columns are stored in.
    fn text_encoding(&self) -> TextEncoding;

    /// Release the connection.
    fn close(self) -> StoreResult<()>
    where
        Self: Sized;
}

/// Target encoding of the store's text columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    encoding: &'static Encoding,
}

impl TextEncoding {
    /// Look up an encoding by its WHATWG label (`utf-8`, `big5`, `windows-1252`, ...).
    pub fn for_label(label: &str) -> StoreResult<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .map(|encoding| Self { encoding })
            .ok_or_else(|| StoreError::UnknownEncoding {
                label: label.to_string(),
            })
    }

    pub fn utf8() -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Whether every character of `value` can be stored.
    pub fn can_encode(&self, value: &str) -> bool {
        let (_, _, had_errors) = self.encoding.encode(value);
        !had_errors
    }

    /// Checks every value of `row`, naming the first column that cannot be stored.
    pub fn check_row(&self, schema: &Schema, row: &Row) -> StoreResult<()> {
        for (field, value) in schema.fields.iter().zip(row) {
            if let Some(value) = value {
                if !self.can_encode(value) {
                    return Err(StoreError::Encoding {
                        column: field.name.clone(),
                        encoding: self.name().to_string(),
                        value: value.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Best-effort re-encoding: characters the target cannot represent become `?`.
    pub fn repair(&self, value: &str) -> String {
        if self.can_encode(value) {
            return value.to_string();
        }
        let mut buf = [0u8; 4];
        value
            .chars()
            .map(|c| {
                if self.can_encode(c.encode_utf8(&mut buf)) {
                    c
                } else {
                    REPLACEMENT_CHAR
                }
            })
            .collect()
    }

    /// [`Self::repair`] applied to every value of `row`.
    pub fn repair_row(&self, row: &Row) -> Row {
        row.iter()
            .map(|v| v.as_deref().map(|s| self.repair(s)))
            .collect()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::utf8()
    }
}
