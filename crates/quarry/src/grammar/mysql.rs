//! MySQL query grammar.

use super::{BaseGrammar, Grammar, GrammarConfig};
use crate::error::{Error, Result};
use crate::query::QueryBuilder;
use crate::value::Value;

/// MySQL dialect rule set.
#[derive(Debug, Clone)]
pub struct MySqlGrammar {
    base: BaseGrammar,
}

impl MySqlGrammar {
    pub fn new() -> Self {
        Self {
            base: BaseGrammar::new(GrammarConfig {
                quote: '`',
                extra_operators: &["rlike", "regexp", "not regexp", "sounds like"],
                offset_requires_limit: false,
            }),
        }
    }
}

impl Default for MySqlGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl Grammar for MySqlGrammar {
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
        _conflict_columns: &[&str],
        update_columns: &[&str],
    ) -> Result<(String, Vec<Value>)> {
        if update_columns.is_empty() {
            return Err(Error::unsupported("upsert requires update columns"));
        }
        let (insert_sql, bindings) = self.base.compile_insert(table, columns, rows)?;
        let updates: Vec<String> = update_columns
            .iter()
            .map(|c| {
                let wrapped = self.base.wrap(c);
                format!("{wrapped} = VALUES({wrapped})")
            })
            .collect();
        let sql = format!("{insert_sql} ON DUPLICATE KEY UPDATE {}", updates.join(", "));
        Ok((sql, bindings))
    }

    fn compile_truncate(&self, table: &str) -> Vec<(String, Vec<Value>)> {
        self.base.compile_truncate(table)
    }
}
