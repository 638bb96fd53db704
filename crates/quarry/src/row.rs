//! Row mapping traits and utilities

use crate::error::{Error, Result};
use crate::value::Value;

/// A result row: column names paired with values, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row from `(column, value)` pairs.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for (name, value) in pairs {
            columns.push(name.into());
            values.push(value);
        }
        Self { columns, values }
    }

    /// Column names in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a value by column name. The first matching column wins.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Look up a value by column name, erroring when the column is absent.
    pub fn try_get(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| Error::decode(column, "column not present in row"))
    }

    /// Look up a text value by column name.
    pub fn try_str(&self, column: &str) -> Result<&str> {
        self.try_get(column)?.expect_str(column)
    }

    /// Look up an integer value by column name.
    pub fn try_int(&self, column: &str) -> Result<i64> {
        self.try_get(column)?.expect_int(column)
    }

    /// Consume the row into its `(column, value)` pairs.
    pub fn into_pairs(self) -> impl Iterator<Item = (String, Value)> {
        self.columns.into_iter().zip(self.values)
    }
}

/// Trait for mapping a [`Row`] into a typed struct.
pub trait FromRow: Sized {
    /// Build `Self` from a result row.
    fn from_row(row: &Row) -> Result<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(row.clone())
    }
}
