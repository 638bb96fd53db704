//! Relation descriptors and the eager-loading matcher.
//!
//! A relation is constructed transiently per access, builds one
//! constrained query, and maps result rows back onto parents with a
//! dictionary built in one pass over the results: O(n + m), never
//! O(n * m). Batch queries filter with `WHERE key IN (...)` over the
//! deduplicated parent key set.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::model::{Model, Related};
use crate::query::QueryBuilder;
use crate::value::Value;

/// Prefix aliasing the pivot foreign key into many-to-many result rows,
/// so the grouping key survives the join.
pub const PIVOT_PREFIX: &str = "pivot_";

/// A relation between a parent model and rows of a related table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// One child row keyed by the child's foreign key.
    HasOne {
        related: String,
        foreign_key: String,
        local_key: String,
    },
    /// Many child rows keyed by the child's foreign key.
    HasMany {
        related: String,
        foreign_key: String,
        local_key: String,
    },
    /// The owning row, keyed by the parent's foreign key.
    BelongsTo {
        related: String,
        foreign_key: String,
        owner_key: String,
    },
    /// Many related rows through a pivot table.
    BelongsToMany {
        related: String,
        pivot: String,
        foreign_pivot_key: String,
        related_pivot_key: String,
        parent_key: String,
        related_key: String,
    },
}

impl Relation {
    pub fn has_one(related: &str, foreign_key: &str, local_key: &str) -> Self {
        Self::HasOne {
            related: related.to_string(),
            foreign_key: foreign_key.to_string(),
            local_key: local_key.to_string(),
        }
    }

    pub fn has_many(related: &str, foreign_key: &str, local_key: &str) -> Self {
        Self::HasMany {
            related: related.to_string(),
            foreign_key: foreign_key.to_string(),
            local_key: local_key.to_string(),
        }
    }

    pub fn belongs_to(related: &str, foreign_key: &str, owner_key: &str) -> Self {
        Self::BelongsTo {
            related: related.to_string(),
            foreign_key: foreign_key.to_string(),
            owner_key: owner_key.to_string(),
        }
    }

    pub fn belongs_to_many(
        related: &str,
        pivot: &str,
        foreign_pivot_key: &str,
        related_pivot_key: &str,
        parent_key: &str,
        related_key: &str,
    ) -> Self {
        Self::BelongsToMany {
            related: related.to_string(),
            pivot: pivot.to_string(),
            foreign_pivot_key: foreign_pivot_key.to_string(),
            related_pivot_key: related_pivot_key.to_string(),
            parent_key: parent_key.to_string(),
            related_key: related_key.to_string(),
        }
    }

    /// The related table.
    pub fn related(&self) -> &str {
        match self {
            Self::HasOne { related, .. }
            | Self::HasMany { related, .. }
            | Self::BelongsTo { related, .. }
            | Self::BelongsToMany { related, .. } => related,
        }
    }

    /// Whether matching yields a list rather than a single row.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::HasMany { .. } | Self::BelongsToMany { .. })
    }

    /// The parent column whose value keys the match dictionary.
    fn parent_key_column(&self) -> &str {
        match self {
            Self::HasOne { local_key, .. } | Self::HasMany { local_key, .. } => local_key,
            Self::BelongsTo { foreign_key, .. } => foreign_key,
            Self::BelongsToMany { parent_key, .. } => parent_key,
        }
    }

    /// The result column holding the dictionary key.
    fn result_key_column(&self) -> String {
        match self {
            Self::HasOne { foreign_key, .. } | Self::HasMany { foreign_key, .. } => {
                foreign_key.clone()
            }
            Self::BelongsTo { owner_key, .. } => owner_key.clone(),
            Self::BelongsToMany {
                foreign_pivot_key, ..
            } => format!("{PIVOT_PREFIX}{foreign_pivot_key}"),
        }
    }

    fn parent_key(&self, parent: &Model) -> Option<Value> {
        parent
            .get(self.parent_key_column())
            .filter(|v| !v.is_null())
            .cloned()
    }

    /// Base query with the many-to-many join and pivot alias applied.
    fn new_query(&self) -> QueryBuilder {
        match self {
            Self::BelongsToMany {
                related,
                pivot,
                foreign_pivot_key,
                related_pivot_key,
                related_key,
                ..
            } => {
                let projection = format!("{related}.*");
                let pivot_alias =
                    format!("{pivot}.{foreign_pivot_key} as {PIVOT_PREFIX}{foreign_pivot_key}");
                QueryBuilder::new(related)
                    .select(&[projection.as_str(), pivot_alias.as_str()])
                    .join(
                        pivot,
                        &format!("{pivot}.{related_pivot_key}"),
                        "=",
                        &format!("{related}.{related_key}"),
                    )
            }
            _ => QueryBuilder::new(self.related()),
        }
    }

    /// The single-parent query filter.
    pub fn add_constraints(&self, parent: &Model) -> Result<QueryBuilder> {
        let key = self.parent_key(parent).ok_or_else(|| {
            Error::Other(format!(
                "parent model has no '{}' key for relation on '{}'",
                self.parent_key_column(),
                self.related()
            ))
        })?;
        let query = self.new_query();
        Ok(match self {
            Self::HasOne { foreign_key, .. } | Self::HasMany { foreign_key, .. } => {
                query.and_eq(foreign_key.as_str(), key)
            }
            Self::BelongsTo { owner_key, .. } => query.and_eq(owner_key.as_str(), key),
            Self::BelongsToMany {
                pivot,
                foreign_pivot_key,
                ..
            } => query.and_eq(&format!("{pivot}.{foreign_pivot_key}"), key),
        })
    }

    /// The batch query filter: `key IN (...)` over the deduplicated
    /// parent key set.
    pub fn add_eager_constraints(&self, parents: &[Model]) -> QueryBuilder {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for parent in parents {
            if let Some(key) = self.parent_key(parent) {
                if seen.insert(key.clone()) {
                    keys.push(key);
                }
            }
        }
        let query = self.new_query();
        match self {
            Self::HasOne { foreign_key, .. } | Self::HasMany { foreign_key, .. } => {
                query.where_in(foreign_key.as_str(), keys)
            }
            Self::BelongsTo { owner_key, .. } => query.where_in(owner_key.as_str(), keys),
            Self::BelongsToMany {
                pivot,
                foreign_pivot_key,
                ..
            } => query.where_in(&format!("{pivot}.{foreign_pivot_key}"), keys),
        }
    }

    /// Assign matched results onto each parent under `relation_name`.
    ///
    /// One pass over results builds the dictionary, one pass over
    /// parents assigns from it.
    pub fn match_models(
        &self,
        parents: &mut [Model],
        results: Vec<Model>,
        relation_name: &str,
    ) -> Result<()> {
        let key_column = self.result_key_column();

        if self.is_many() {
            let mut dictionary: HashMap<Value, Vec<Model>> = HashMap::new();
            for child in results {
                let Some(key) = child.get(&key_column).filter(|v| !v.is_null()).cloned() else {
                    continue;
                };
                dictionary.entry(key).or_default().push(child);
            }
            for parent in parents.iter_mut() {
                let matched = self
                    .parent_key(parent)
                    .and_then(|key| dictionary.get(&key).cloned())
                    .unwrap_or_default();
                parent.set_relation(relation_name, Related::Many(matched));
            }
        } else {
            let mut dictionary: HashMap<Value, Model> = HashMap::new();
            for child in results {
                let Some(key) = child.get(&key_column).filter(|v| !v.is_null()).cloned() else {
                    continue;
                };
                dictionary.entry(key).or_insert(child);
            }
            for parent in parents.iter_mut() {
                let matched = self
                    .parent_key(parent)
                    .and_then(|key| dictionary.get(&key).cloned())
                    .map(Box::new);
                parent.set_relation(relation_name, Related::One(matched));
            }
        }
        Ok(())
    }

    /// Single-parent fetch.
    pub async fn get_results(&self, conn: &mut Connection, parent: &Model) -> Result<Related> {
        let query = self.add_constraints(parent)?;
        let rows = query.get(conn).await?;
        let related = self.related().to_string();
        let models: Vec<Model> = rows.iter().map(|r| Model::from_row(&related, r)).collect();
        Ok(if self.is_many() {
            Related::Many(models)
        } else {
            Related::One(models.into_iter().next().map(Box::new))
        })
    }

    /// Batch fetch and match for every parent lacking this relation.
    pub async fn eager_load(
        &self,
        conn: &mut Connection,
        parents: &mut [Model],
        relation_name: &str,
    ) -> Result<()> {
        tracing::debug!(
            target: "quarry::relations",
            relation = relation_name,
            parents = parents.len(),
            "eager load"
        );
        let query = self.add_eager_constraints(parents);
        let rows = query.get(conn).await?;
        let related = self.related().to_string();
        let results: Vec<Model> = rows.iter().map(|r| Model::from_row(&related, r)).collect();
        self.match_models(parents, results, relation_name)
    }
}
