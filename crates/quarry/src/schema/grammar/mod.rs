//! DDL compilation per dialect.
//!
//! Each dialect grammar turns a [`Blueprint`] into an ordered statement
//! list. ALTER compilation sequences destructive operations before
//! additive ones: drop foreign keys, drop indexes, drop columns, rename
//! columns, add/modify columns, add indexes, add foreign keys. A dialect
//! that cannot express a requested operation fails fast instead of
//! emitting invalid SQL.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlSchemaGrammar;
pub use postgres::PostgresSchemaGrammar;
pub use sqlite::SqliteSchemaGrammar;

use crate::config::Driver;
use crate::error::{Error, Result};
use crate::schema::blueprint::{
    Blueprint, ColumnDefinition, ForeignKeyDefinition, IndexDefinition, IndexKind,
};
use crate::value::Value;

/// SQL keywords allowed as unquoted defaults.
const DEFAULT_KEYWORDS: &[&str] = &[
    "current_timestamp",
    "current_date",
    "current_time",
    "now()",
    "localtimestamp",
];

/// Dialect rule set for compiling blueprints to DDL.
pub trait SchemaGrammar: Send + Sync {
    /// Quote an identifier for this dialect.
    fn wrap(&self, identifier: &str) -> String;

    /// Compile a CREATE-mode blueprint into an ordered statement list.
    fn compile_create(&self, blueprint: &Blueprint) -> Result<Vec<String>>;

    /// Compile an ALTER-mode blueprint into an ordered statement list.
    fn compile_alter(&self, blueprint: &Blueprint) -> Result<Vec<String>>;

    /// Compile DROP TABLE.
    fn compile_drop(&self, table: &str) -> String;

    /// Compile DROP TABLE IF EXISTS.
    fn compile_drop_if_exists(&self, table: &str) -> String;

    /// Compile a table rename.
    fn compile_rename(&self, from: &str, to: &str) -> String;

    /// Catalog query answering whether `table` exists; any row means yes.
    fn compile_has_table(&self, table: &str) -> (String, Vec<Value>);

    /// Catalog query listing columns as rows with `name`/`type` fields.
    fn compile_get_columns(&self, table: &str) -> (String, Vec<Value>);

    /// Map a column definition to the dialect's native type keyword.
    fn type_name(&self, column: &ColumnDefinition) -> Result<String>;
}

/// Build the schema grammar for a driver.
pub fn for_driver(driver: Driver) -> Box<dyn SchemaGrammar> {
    match driver {
        Driver::MySql => Box::new(MySqlSchemaGrammar::new()),
        Driver::Postgres => Box::new(PostgresSchemaGrammar::new()),
        Driver::Sqlite => Box::new(SqliteSchemaGrammar::new()),
    }
}

/// Shared DDL helpers, parameterized by the dialect's quote character and
/// boolean literals.
#[derive(Debug, Clone)]
pub struct SchemaBase {
    pub quote: char,
    pub bool_true: &'static str,
    pub bool_false: &'static str,
}

impl SchemaBase {
    /// Quote one identifier, doubling embedded quote characters.
    pub fn wrap(&self, identifier: &str) -> String {
        let q = self.quote;
        let doubled = format!("{q}{q}");
        let escaped = identifier.replace(q, doubled.as_str());
        format!("{q}{escaped}{q}")
    }

    /// Quote and comma-join a column list.
    pub fn columnize(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.wrap(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Escape a string literal by doubling single quotes.
    pub fn quote_string(&self, s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    /// Render a default value: booleans as dialect literals, numbers
    /// unquoted, recognized keywords unquoted and uppercased, everything
    /// else quoted.
    pub fn default_literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => self.bool_true.to_string(),
            Value::Bool(false) => self.bool_false.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => {
                if DEFAULT_KEYWORDS.contains(&s.to_lowercase().as_str()) {
                    s.to_uppercase()
                } else {
                    self.quote_string(s)
                }
            }
            Value::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Value::Json(j) => self.quote_string(&j.to_string()),
            Value::DateTime(t) => self.quote_string(&t.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }

    /// Require both endpoints of a foreign key before compiling it.
    pub fn check_foreign_key(&self, fk: &ForeignKeyDefinition) -> Result<()> {
        if fk.references.is_empty() || fk.on.is_empty() {
            return Err(Error::unsupported(format!(
                "foreign key '{}' is missing its referenced table or column",
                fk.name
            )));
        }
        Ok(())
    }

    /// Foreign key body shared by every dialect:
    /// `FOREIGN KEY (col) REFERENCES table (col) [ON DELETE ...] [ON UPDATE ...]`.
    pub fn foreign_key_body(&self, fk: &ForeignKeyDefinition) -> Result<String> {
        self.check_foreign_key(fk)?;
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.wrap(&fk.column),
            self.wrap(&fk.on),
            self.wrap(&fk.references)
        );
        if let Some(action) = &fk.on_delete {
            sql.push_str(&format!(" ON DELETE {}", action.to_uppercase()));
        }
        if let Some(action) = &fk.on_update {
            sql.push_str(&format!(" ON UPDATE {}", action.to_uppercase()));
        }
        Ok(sql)
    }
}

/// Explicit indexes plus the single-column ones implied by column flags,
/// excluding primary keys (those compile with the columns).
pub fn effective_indexes(blueprint: &Blueprint) -> Vec<IndexDefinition> {
    let mut out: Vec<IndexDefinition> = blueprint
        .indexes
        .iter()
        .filter(|i| i.kind != IndexKind::Primary)
        .cloned()
        .collect();
    for column in &blueprint.columns {
        if column.unique {
            out.push(IndexDefinition {
                columns: vec![column.name.clone()],
                kind: IndexKind::Unique,
                name: Blueprint::index_name(&blueprint.table, &[&column.name], IndexKind::Unique),
            });
        }
        if column.index {
            out.push(IndexDefinition {
                columns: vec![column.name.clone()],
                kind: IndexKind::Index,
                name: Blueprint::index_name(&blueprint.table, &[&column.name], IndexKind::Index),
            });
        }
    }
    out
}

/// The composite primary key index, when one was declared.
pub fn primary_index(blueprint: &Blueprint) -> Option<&IndexDefinition> {
    blueprint
        .indexes
        .iter()
        .find(|i| i.kind == IndexKind::Primary)
}
