//! Model-returning queries with eager loading.

use super::{Collection, Model, ModelConfig};
use crate::connection::Connection;
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::relations::Relation;

/// A query that hydrates models and eager-loads named relations.
///
/// # Example
///
/// ```ignore
/// let users = ModelQuery::new("users", config.clone())
///     .query(|q| q.and_eq("status", "active"))
///     .with("posts", Relation::has_many("posts", "user_id", "id"))
///     .get(&mut conn)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ModelQuery {
    table: String,
    query: QueryBuilder,
    eager: Vec<(String, Relation)>,
    config: ModelConfig,
}

impl ModelQuery {
    pub fn new(table: &str, config: ModelConfig) -> Self {
        Self {
            table: table.to_string(),
            query: QueryBuilder::new(table),
            eager: Vec::new(),
            config,
        }
    }

    /// Refine the underlying query builder.
    pub fn query(mut self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        self.query = f(self.query);
        self
    }

    /// Eager-load `relation` under `name` after the primary query runs.
    /// The relation name is always explicit.
    pub fn with(mut self, name: &str, relation: Relation) -> Self {
        self.eager.push((name.to_string(), relation));
        self
    }

    /// Execute, hydrate, and run one extra query per eager relation.
    pub async fn get(self, conn: &mut Connection) -> Result<Collection> {
        let rows = self.query.get(conn).await?;
        let mut collection = Collection::hydrate(&self.table, &rows, self.config);
        for (name, relation) in &self.eager {
            collection.load(conn, name, relation).await?;
        }
        Ok(collection)
    }

    /// Execute with `LIMIT 1` and return the first model, eager
    /// relations included.
    pub async fn first(mut self, conn: &mut Connection) -> Result<Option<Model>> {
        self.query = self.query.limit(1);
        let collection = self.get(conn).await?;
        Ok(collection.into_models().into_iter().next())
    }
}
