//! SQLite query grammar.

use super::{BaseGrammar, Grammar, GrammarConfig};
use crate::error::Result;
use crate::query::QueryBuilder;
use crate::value::Value;

/// SQLite dialect rule set.
#[derive(Debug, Clone)]
pub struct SqliteGrammar {
    base: BaseGrammar,
}

impl SqliteGrammar {
    pub fn new() -> Self {
        Self {
            base: BaseGrammar::new(GrammarConfig {
                quote: '"',
                extra_operators: &["glob", "match", "regexp"],
                // OFFSET only parses after a LIMIT clause.
                offset_requires_limit: true,
            }),
        }
    }
}

impl Default for SqliteGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar for SqliteGrammar {
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
        // No TRUNCATE statement; clear the table and its rowid sequence.
        vec![
            (format!("DELETE FROM {}", self.base.wrap(table)), Vec::new()),
            (
                "DELETE FROM sqlite_sequence WHERE name = ?".to_string(),
                vec![Value::Str(table.to_string())],
            ),
        ]
    }
}
