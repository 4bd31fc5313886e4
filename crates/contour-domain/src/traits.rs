//! Trait definitions for external interactions
//!
//! Infrastructure implementations live in other crates.

use crate::{Column, Row, Table};

/// Trait for row-oriented relational storage
///
/// Implemented by the infrastructure layer (contour-store)
pub trait RowStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Insert a row and return the generated id
    fn insert(&mut self, table: Table, columns: &[Column]) -> Result<i64, Self::Error>;

    /// Get a row by id
    fn get(&self, table: Table, id: i64) -> Result<Option<Row>, Self::Error>;

    /// List every row of a table in insertion order
    fn list(&self, table: Table) -> Result<Vec<Row>, Self::Error>;

    /// Replace the listed columns of a row; returns the affected-row count
    fn update(&mut self, table: Table, id: i64, columns: &[Column]) -> Result<usize, Self::Error>;

    /// Hard-delete a row; returns the affected-row count
    fn delete(&mut self, table: Table, id: i64) -> Result<usize, Self::Error>;
}
