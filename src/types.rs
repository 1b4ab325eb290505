//! Core data model types for loading.
//!
//! Readers turn a source file into a [`DataSet`]: an ordered [`Schema`] (the field list that
//! becomes the table's columns) plus rows of text values positioned to match it.

use std::path::PathBuf;

/// A single named column in a [`Schema`].
///
/// Every column is stored as bounded-width text, so a field carries only its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name, used verbatim as the column identifier.
    pub name: String,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Ordered list of fields describing the target table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Create a schema from a list of column names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Field::new).collect())
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// One record: a value per schema field, in schema order. `None` is SQL `NULL`.
pub type Row = Vec<Option<String>>;

/// In-memory table read from one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Row>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Description of one load invocation.
///
/// The field list is fixed once the target table has been created for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestJob {
    /// File or directory the rows come from.
    pub source_path: PathBuf,
    /// Database (schema namespace) holding the target table.
    pub target_database: String,
    /// Target table name.
    pub target_table: String,
    /// Column list of the target table, empty until the table has been created.
    pub field_list: Schema,
    /// Number of rows handed to the insert engine so far.
    pub total_rows: usize,
}

impl IngestJob {
    pub fn new(
        source_path: impl Into<PathBuf>,
        target_database: impl Into<String>,
        target_table: impl Into<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            target_database: target_database.into(),
            target_table: target_table.into(),
            field_list: Schema::default(),
            total_rows: 0,
        }
    }
}
