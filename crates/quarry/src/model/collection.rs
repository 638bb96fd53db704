//! Sibling collections and deferred batched relation loading.
//!
//! Every multi-row query hydrates its models into one collection. The
//! first lazy access of an unloaded relation on any member batch-loads
//! it for every member still lacking it, so N apparent lazy accesses
//! cost one query.

use super::{Model, ModelConfig, Related};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::relations::Relation;
use crate::row::Row;

/// Models hydrated together from one query.
#[derive(Debug, Clone)]
pub struct Collection {
    models: Vec<Model>,
    config: ModelConfig,
}

impl Collection {
    /// Wrap already-hydrated models.
    pub fn new(models: Vec<Model>, config: ModelConfig) -> Self {
        Self { models, config }
    }

    /// Hydrate rows for `table` into a sibling collection.
    pub fn hydrate(table: &str, rows: &[Row], config: ModelConfig) -> Self {
        let models = rows.iter().map(|row| Model::from_row(table, row)).collect();
        Self::new(models, config)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// The member models.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// One member by position.
    pub fn get(&self, index: usize) -> Option<&Model> {
        self.models.get(index)
    }

    /// Consume into the member models.
    pub fn into_models(self) -> Vec<Model> {
        self.models
    }

    /// Batch-load `relation` under `name` for every member lacking it.
    /// One query regardless of member count.
    pub async fn load(
        &mut self,
        conn: &mut Connection,
        name: &str,
        relation: &Relation,
    ) -> Result<()> {
        let missing: Vec<usize> = self
            .models
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.relation_loaded(name))
            .map(|(i, _)| i)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let mut subset: Vec<Model> = missing.iter().map(|&i| self.models[i].clone()).collect();
        relation.eager_load(conn, &mut subset, name).await?;
        for (slot, model) in missing.into_iter().zip(subset) {
            self.models[slot] = model;
        }
        Ok(())
    }

    /// Access a relation on one member, loading it first when needed.
    ///
    /// With auto eager loading on, the load covers every sibling missing
    /// the relation; with it off, lazy-load prevention (when enabled)
    /// errors instead of querying.
    pub async fn relation(
        &mut self,
        conn: &mut Connection,
        index: usize,
        name: &str,
        relation: &Relation,
    ) -> Result<&Related> {
        if index >= self.models.len() {
            return Err(Error::Other(format!(
                "no model at index {index} (collection has {})",
                self.models.len()
            )));
        }
        if !self.models[index].relation_loaded(name) {
            if self.config.auto_eager_load {
                self.load(conn, name, relation).await?;
            } else if self.config.prevent_lazy_loading {
                return Err(Error::LazyLoading {
                    model: self.models[index].table().to_string(),
                    relation: name.to_string(),
                });
            } else {
                let related = relation.get_results(conn, &self.models[index]).await?;
                self.models[index].set_relation(name, related);
            }
        }
        Ok(self.models[index]
            .relation(name)
            .expect("relation loaded above"))
    }
}
