//! Row module - the flat record shape the store persists

use std::collections::BTreeMap;
use std::fmt;

/// A persisted table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// `users` table
    Users,
    /// `products` table
    Products,
    /// `orders` table
    Orders,
}

impl Table {
    /// Get the SQL table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Products => "products",
            Table::Orders => "orders",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity exposed by the adapters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A user account
    User,
    /// A catalogue product
    Product,
    /// A placed order
    Order,
}

impl Entity {
    /// Human-readable entity name, used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Entity::User => "User",
            Entity::Product => "Product",
            Entity::Order => "Order",
        }
    }

    /// Table backing this entity
    pub fn table(&self) -> Table {
        match self {
            Entity::User => Table::Users,
            Entity::Product => Table::Products,
            Entity::Order => Table::Orders,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single column value as the relational engine sees it
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// SQL NULL
    Null,
    /// 64-bit integer (also used for booleans, stored as 0/1)
    Integer(i64),
    /// Floating point value
    Real(f64),
    /// Text, including JSON-encoded composite fields
    Text(String),
}

impl ColumnValue {
    /// Whether the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }
}

/// A column name paired with the value to write
pub type Column = (&'static str, ColumnValue);

/// A persisted record: generated id plus every other column by name
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Store-assigned id
    pub id: i64,

    /// Remaining columns, keyed by column name
    pub columns: BTreeMap<String, ColumnValue>,
}

impl Row {
    /// Create an empty row with the given id
    pub fn new(id: i64) -> Self {
        Self {
            id,
            columns: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add a column
    pub fn with(mut self, name: impl Into<String>, value: ColumnValue) -> Self {
        self.columns.insert(name.into(), value);
        self
    }

    /// Get a column value; absent columns read as NULL
    pub fn get(&self, name: &str) -> &ColumnValue {
        static NULL: ColumnValue = ColumnValue::Null;
        self.columns.get(name).unwrap_or(&NULL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_column_reads_as_null() {
        let row = Row::new(7).with("name", ColumnValue::Text("Widget".into()));
        assert_eq!(row.get("name"), &ColumnValue::Text("Widget".into()));
        assert!(row.get("missing").is_null());
    }

    #[test]
    fn test_entity_tables() {
        assert_eq!(Entity::User.table(), Table::Users);
        assert_eq!(Entity::Order.table().as_str(), "orders");
        assert_eq!(Entity::Product.to_string(), "Product");
    }
}
