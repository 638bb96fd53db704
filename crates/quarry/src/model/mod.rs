//! A minimal model layer over the query builder.
//!
//! Models are explicit attribute bags (`get`/`set`) hydrated from rows,
//! with an original snapshot for dirty tracking and an existence flag.
//! Behavior that the source framework kept in global statics (lazy-load
//! prevention, auto eager loading, mass-assignment policy) lives in a
//! per-session [`ModelConfig`] passed explicitly.

pub mod collection;
pub mod query;

#[cfg(test)]
mod tests;

pub use collection::Collection;
pub use query::ModelQuery;

use std::collections::{BTreeMap, HashMap};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::query::QueryBuilder;
use crate::row::Row;
use crate::value::{IntoValue, Value};

/// Per-session model behavior. No process-wide state.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Error on lazy relation access instead of querying.
    pub prevent_lazy_loading: bool,
    /// Batch-load a relation for all sibling models on first lazy access.
    pub auto_eager_load: bool,
    /// Whether unlisted attributes are fillable when neither `fillable`
    /// nor `guarded` is set.
    pub allow_unguarded: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            prevent_lazy_loading: false,
            auto_eager_load: true,
            allow_unguarded: true,
        }
    }
}

/// A loaded relation value on a model.
#[derive(Debug, Clone, PartialEq)]
pub enum Related {
    One(Option<Box<Model>>),
    Many(Vec<Model>),
}

/// One record: a table name, an attribute bag, and its persistence state.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    table: String,
    attributes: BTreeMap<String, Value>,
    original: BTreeMap<String, Value>,
    exists: bool,
    fillable: Vec<String>,
    guarded: Vec<String>,
    relations: HashMap<String, Related>,
}

impl Model {
    /// A fresh, non-existing model for `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            attributes: BTreeMap::new(),
            original: BTreeMap::new(),
            exists: false,
            fillable: Vec::new(),
            guarded: Vec::new(),
            relations: HashMap::new(),
        }
    }

    /// Hydrate an existing model from a result row.
    pub fn from_row(table: impl Into<String>, row: &Row) -> Self {
        let mut model = Self::new(table);
        for (column, value) in row.clone().into_pairs() {
            model.attributes.insert(column, value);
        }
        model.original = model.attributes.clone();
        model.exists = true;
        model
    }

    /// Restrict mass assignment to these attributes.
    pub fn fillable(mut self, attributes: &[&str]) -> Self {
        self.fillable = attributes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Block mass assignment of these attributes (`*` blocks all).
    pub fn guarded(mut self, attributes: &[&str]) -> Self {
        self.guarded = attributes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// The model's table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Whether this model is backed by a database row.
    pub fn exists(&self) -> bool {
        self.exists
    }

    // ==================== Attributes ====================

    /// Read one attribute.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Write one attribute directly (not subject to mass-assignment rules).
    pub fn set(&mut self, key: impl Into<String>, value: impl IntoValue) {
        self.attributes.insert(key.into(), value.into_value());
    }

    /// The primary key value, when set.
    pub fn key(&self) -> Option<&Value> {
        self.get("id")
    }

    /// Whether `key` may be mass assigned under this model's lists.
    pub fn is_fillable(&self, key: &str, config: &ModelConfig) -> bool {
        if !self.fillable.is_empty() {
            return self.fillable.iter().any(|f| f == key);
        }
        if self.guarded.iter().any(|g| g == "*") {
            return false;
        }
        if self.guarded.iter().any(|g| g == key) {
            return false;
        }
        if !self.guarded.is_empty() {
            return true;
        }
        config.allow_unguarded
    }

    /// Mass assign attributes, rejecting the first non-fillable key.
    pub fn fill<K, I>(&mut self, attributes: I, config: &ModelConfig) -> Result<&mut Self>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        for (key, value) in attributes {
            let key = key.into();
            if !self.is_fillable(&key, config) {
                return Err(Error::MassAssignment(key));
            }
            self.attributes.insert(key, value);
        }
        Ok(self)
    }

    /// Attributes changed since hydration or the last save.
    pub fn dirty(&self) -> Vec<(String, Value)> {
        self.attributes
            .iter()
            .filter(|(key, value)| self.original.get(*key) != Some(value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Whether any attribute changed.
    pub fn is_dirty(&self) -> bool {
        !self.dirty().is_empty()
    }

    // ==================== Relations ====================

    /// A loaded relation, when present.
    pub fn relation(&self, name: &str) -> Option<&Related> {
        self.relations.get(name)
    }

    /// Whether a relation has been loaded.
    pub fn relation_loaded(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Attach a loaded relation under `name`.
    pub fn set_relation(&mut self, name: impl Into<String>, related: Related) {
        self.relations.insert(name.into(), related);
    }

    // ==================== Persistence ====================

    /// Insert or update this model, then resync the original snapshot.
    pub async fn save(&mut self, conn: &mut Connection) -> Result<()> {
        if self.exists {
            let dirty = self.dirty();
            if !dirty.is_empty() {
                let id = self
                    .key()
                    .cloned()
                    .ok_or_else(|| Error::Other("cannot update a model without an id".into()))?;
                QueryBuilder::new(&self.table)
                    .and_eq("id", id)
                    .update(conn, dirty)
                    .await?;
            }
        } else {
            let columns: Vec<(String, Value)> = self
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            QueryBuilder::new(&self.table).insert(conn, vec![columns]).await?;
            self.exists = true;
        }
        self.original = self.attributes.clone();
        Ok(())
    }

    /// Delete the backing row.
    pub async fn delete(&mut self, conn: &mut Connection) -> Result<()> {
        let id = self
            .key()
            .cloned()
            .ok_or_else(|| Error::Other("cannot delete a model without an id".into()))?;
        QueryBuilder::new(&self.table)
            .and_eq("id", id)
            .delete(conn)
            .await?;
        self.exists = false;
        Ok(())
    }

    /// Look up one model by id.
    pub async fn find(
        conn: &mut Connection,
        table: &str,
        id: impl IntoValue,
    ) -> Result<Option<Model>> {
        let row = QueryBuilder::new(table).find(conn, id).await?;
        Ok(row.map(|row| Model::from_row(table, &row)))
    }

    /// Look up one model by id, erroring with the identity searched.
    pub async fn find_or_fail(
        conn: &mut Connection,
        table: &str,
        id: impl IntoValue,
    ) -> Result<Model> {
        let id = id.into_value();
        Self::find(conn, table, id.clone())
            .await?
            .ok_or_else(|| Error::not_found(format!("no '{table}' model with id {id:?}")))
    }
}
