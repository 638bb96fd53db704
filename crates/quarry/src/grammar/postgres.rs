//! PostgreSQL query grammar.

use super::{BaseGrammar, Grammar, GrammarConfig};
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::value::Value;

/// PostgreSQL dialect rule set.
#[derive(Debug, Clone)]
pub struct PostgresGrammar {
    base: BaseGrammar,
}

impl PostgresGrammar {
    pub fn new() -> Self {
        Self {
            base: BaseGrammar::new(GrammarConfig {
                quote: '"',
                extra_operators: &["ilike", "not ilike", "~", "~*", "!~", "!~*", "@>", "<@"],
                offset_requires_limit: false,
            }),
        }
    }
}

impl Default for PostgresGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar for PostgresGrammar {
    fn wrap(&self, identifier: &str) -> String {
        self.base.wrap(identifier)
    }

    fn compile_select(&self, query: &QueryBuilder) -> Result<String> {
        self.base.compile_select(query)
    }

    fn compile_insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<(String, Value)>],
    ) -> Result<(String, Vec<Value>)> {
        self.base.compile_insert(table, columns, rows)
    }

    fn compile_update(
        &self,
        query: &QueryBuilder,
        sets: &[(String, Value)],
    ) -> Result<(String, Vec<Value>)> {
        self.base.compile_update(query, sets)
    }

    fn compile_delete(&self, query: &QueryBuilder) -> Result<String> {
        self.base.compile_delete(query)
    }

    fn compile_upsert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<(String, Value)>],
        conflict_columns: &[&str],
        update_columns: &[&str],
    ) -> Result<(String, Vec<Value>)> {
        self.base
            .compile_conflict_upsert(table, columns, rows, conflict_columns, update_columns)
    }

    fn compile_truncate(&self, table: &str) -> Vec<(String, Vec<Value>)> {
        self.base.compile_truncate(table)
    }
}
