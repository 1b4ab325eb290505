use std::path::Path;

use rusqlite::{params_from_iter, Connection};

use crate::error::{StoreError, StoreResult};
use crate::types::{Row, Schema};

use super::{Store, TextEncoding};

/// [`Store`] backed by a SQLite connection.
///
/// Databases are SQLite schema names (`main`, `temp`, and anything `ATTACH`ed). Each insert
/// runs in its own transaction, closed by [`Store::commit`] or rolled back if the insert fails.
pub struct SqliteStore {
    conn: Connection,
    encoding: TextEncoding,
}

impl SqliteStore {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            encoding: TextEncoding::default(),
        }
    }

    /// Store text columns in `encoding`; values it cannot represent are rejected on insert.
    pub fn with_text_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Underlying connection, e.g. for reading loaded rows back.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Store for SqliteStore {
    fn list_databases(&mut self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare("PRAGMA database_list")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn create_table(
        &mut self,
        database: &str,
        table: &str,
        schema: &Schema,
        text_width: usize,
    ) -> StoreResult<()> {
        let sql = create_table_sql(database, table, schema, text_width);
        tracing::debug!(%sql, "create table");
        self.conn.execute_batch(&sql)?;
        Ok(())
    }

    fn insert_row(
        &mut self,
        database: &str,
        table: &str,
        schema: &Schema,
        row: &Row,
    ) -> StoreResult<()> {
        if row.len() != schema.len() {
            return Err(StoreError::ColumnCount {
                expected: schema.len(),
                actual: row.len(),
            });
        }
        self.encoding.check_row(schema, row)?;

        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        let sql = insert_sql(database, table, schema);
        let result = self
            .conn
            .prepare_cached(&sql)
            .and_then(|mut stmt| stmt.execute(params_from_iter(row.iter())));
        if let Err(e) = result {
            if !self.conn.is_autocommit() {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn commit(&mut self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            return Ok(());
        }
        // A failed COMMIT (e.g. a deferred constraint) leaves the transaction open.
        if let Err(e) = self.conn.execute_batch("COMMIT") {
            if !self.conn.is_autocommit() {
                let _ = self.conn.execute_batch("ROLLBACK");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn text_encoding(&self) -> TextEncoding {
        self.encoding
    }

    fn close(self) -> StoreResult<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn qualified(database: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(table))
}

pub(crate) fn create_table_sql(
    database: &str,
    table: &str,
    schema: &Schema,
    text_width: usize,
) -> String {
    let columns: Vec<String> = schema
        .field_names()
        .map(|name| {
            let col = quote_ident(name);
            format!("{col} VARCHAR({text_width}) CHECK (length({col}) <= {text_width})")
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified(database, table),
        columns.join(", ")
    )
}

pub(crate) fn insert_sql(database: &str, table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema.field_names().map(quote_ident).collect();
    let params: Vec<String> = (1..=schema.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified(database, table),
        columns.join(", "),
        params.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn create_sql_bounds_every_column() {
        let sql = create_table_sql("main", "people", &Schema::from_names(["id", "name"]), 50);
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"main\".\"people\" (\
             \"id\" VARCHAR(50) CHECK (length(\"id\") <= 50), \
             \"name\" VARCHAR(50) CHECK (length(\"name\") <= 50))"
        );
    }

    #[test]
    fn insert_sql_is_positional() {
        let sql = insert_sql("main", "t", &Schema::from_names(["a", "b", "c"]));
        assert_eq!(
            sql,
            "INSERT INTO \"main\".\"t\" (\"a\", \"b\", \"c\") VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn failed_insert_leaves_no_open_transaction() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let schema = Schema::from_names(["id"]);
        store.create_table("main", "t", &schema, 3).unwrap();

        let too_long: Row = vec![Some("abcd".to_string())];
        assert!(store.insert_row("main", "t", &schema, &too_long).is_err());
        assert!(store.connection().is_autocommit());

        store.insert_row("main", "t", &schema, &vec![Some("abc".to_string())]).unwrap();
        store.commit().unwrap();
        let n: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM t", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }
}
