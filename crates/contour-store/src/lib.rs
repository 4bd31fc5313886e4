//! Contour Storage Layer
//!
//! Implements the RowStore trait on an embedded SQLite database.
//!
//! # Architecture
//!
//! - One in-memory database per process, created explicitly and closed
//!   explicitly; nothing persists across restarts
//! - One DDL file per [`Revision`], loaded when the store is opened
//! - Composite fields are JSON text; the store itself never parses them
//!
//! # Examples
//!
//! ```no_run
//! use contour_domain::Revision;
//! use contour_store::SqliteStore;
//!
//! let store = SqliteStore::in_memory(Revision::Baseline).unwrap();
//! // Store is now ready for row operations
//! store.close().unwrap();
//! ```

#![warn(missing_docs)]

use contour_domain::traits::RowStore;
use contour_domain::{Column, ColumnValue, Revision, Row, Table};
use rusqlite::types::{Type, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Column name is not a plain SQL identifier
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Store handle shared by the adapters
pub type SharedStore = Arc<Mutex<SqliteStore>>;

/// SQLite-based implementation of RowStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Share a store between tasks by
/// wrapping it in a [`SharedStore`].
pub struct SqliteStore {
    conn: Connection,
    revision: Revision,
}

impl SqliteStore {
    /// Open a store at the given path and load the revision's schema
    ///
    /// Use `:memory:` for an in-memory database.
    pub fn open<P: AsRef<Path>>(path: P, revision: Revision) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn, revision };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open a fresh in-memory store
    pub fn in_memory(revision: Revision) -> Result<Self, StoreError> {
        Self::open(":memory:", revision)
    }

    /// Open a fresh in-memory store wrapped for sharing
    pub fn shared(revision: Revision) -> Result<SharedStore, StoreError> {
        Ok(Arc::new(Mutex::new(Self::in_memory(revision)?)))
    }

    /// Revision whose schema this store was created with
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Close the underlying connection
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Database(e))
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = match self.revision {
            Revision::Baseline => include_str!("schema/baseline.sql"),
            Revision::Feature => include_str!("schema/feature.sql"),
        };

        self.conn.execute_batch(schema)?;

        Ok(())
    }

    /// Column names are interpolated into SQL, so only plain identifiers pass
    fn check_column(name: &str) -> Result<(), StoreError> {
        let valid = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if valid {
            Ok(())
        } else {
            Err(StoreError::InvalidColumn(name.to_string()))
        }
    }

    fn to_sql_value(value: &ColumnValue) -> Value {
        match value {
            ColumnValue::Null => Value::Null,
            ColumnValue::Integer(i) => Value::Integer(*i),
            ColumnValue::Real(f) => Value::Real(*f),
            ColumnValue::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Convert a SQLite row into a domain Row
    fn read_row(row: &rusqlite::Row<'_>, names: &[String]) -> rusqlite::Result<Row> {
        let mut id = None;
        let mut out = Row::new(0);

        for (idx, name) in names.iter().enumerate() {
            let value = match row.get_ref(idx)? {
                ValueRef::Null => ColumnValue::Null,
                ValueRef::Integer(i) => ColumnValue::Integer(i),
                ValueRef::Real(f) => ColumnValue::Real(f),
                ValueRef::Text(bytes) => {
                    let text = std::str::from_utf8(bytes).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
                    })?;
                    ColumnValue::Text(text.to_string())
                }
                ValueRef::Blob(_) => {
                    return Err(rusqlite::Error::FromSqlConversionFailure(
                        idx,
                        Type::Blob,
                        "blob columns are not supported".into(),
                    ))
                }
            };

            match (name.as_str(), value) {
                ("id", ColumnValue::Integer(i)) => id = Some(i),
                ("id", _) => {
                    return Err(rusqlite::Error::FromSqlConversionFailure(
                        idx,
                        Type::Integer,
                        "id must be an integer".into(),
                    ))
                }
                (_, value) => {
                    out.columns.insert(name.clone(), value);
                }
            }
        }

        out.id = id.ok_or_else(|| rusqlite::Error::InvalidColumnName("id".to_string()))?;
        Ok(out)
    }

    fn select(&self, table: Table, id: Option<i64>) -> Result<Vec<Row>, StoreError> {
        let sql = match id {
            Some(_) => format!("SELECT * FROM {} WHERE id = ?1", table),
            None => format!("SELECT * FROM {} ORDER BY id", table),
        };

        let mut stmt = self.conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = match id {
            Some(id) => stmt
                .query_row(params![id], |row| Self::read_row(row, &names))
                .optional()?
                .into_iter()
                .collect(),
            None => stmt
                .query_map([], |row| Self::read_row(row, &names))?
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(rows)
    }
}

impl RowStore for SqliteStore {
    type Error = StoreError;

    fn insert(&mut self, table: Table, columns: &[Column]) -> Result<i64, Self::Error> {
        if columns.is_empty() {
            self.conn
                .execute(&format!("INSERT INTO {} DEFAULT VALUES", table), [])?;
            return Ok(self.conn.last_insert_rowid());
        }

        for (name, _) in columns {
            Self::check_column(name)?;
        }

        let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let values: Vec<Value> = columns.iter().map(|(_, v)| Self::to_sql_value(v)).collect();

        self.conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                names.join(", "),
                placeholders.join(", ")
            ),
            params_from_iter(values.iter()),
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get(&self, table: Table, id: i64) -> Result<Option<Row>, Self::Error> {
        Ok(self.select(table, Some(id))?.into_iter().next())
    }

    fn list(&self, table: Table) -> Result<Vec<Row>, Self::Error> {
        self.select(table, None)
    }

    fn update(&mut self, table: Table, id: i64, columns: &[Column]) -> Result<usize, Self::Error> {
        if columns.is_empty() {
            return Ok(usize::from(self.get(table, id)?.is_some()));
        }

        for (name, _) in columns {
            Self::check_column(name)?;
        }

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, (name, _))| format!("{} = ?{}", name, i + 1))
            .collect();
        let mut values: Vec<Value> = columns.iter().map(|(_, v)| Self::to_sql_value(v)).collect();
        values.push(Value::Integer(id));

        let affected = self.conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE id = ?{}",
                table,
                assignments.join(", "),
                values.len()
            ),
            params_from_iter(values.iter()),
        )?;

        Ok(affected)
    }

    fn delete(&mut self, table: Table, id: i64) -> Result<usize, Self::Error> {
        let affected = self
            .conn
            .execute(&format!("DELETE FROM {} WHERE id = ?1", table), params![id])?;
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_column() {
        assert!(SqliteStore::check_column("payment_method").is_ok());
        assert!(SqliteStore::check_column("name; DROP TABLE users").is_err());
        assert!(SqliteStore::check_column("").is_err());
        assert!(SqliteStore::check_column("1st").is_err());
    }

    #[test]
    fn test_revision_is_remembered() {
        let store = SqliteStore::in_memory(Revision::Feature).unwrap();
        assert_eq!(store.revision(), Revision::Feature);
    }
}
