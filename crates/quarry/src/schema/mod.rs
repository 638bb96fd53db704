//! Schema building: blueprints, DDL grammars, and the executor.
//!
//! [`Schema`] records operations as data (migrations build these, and
//! the migrator checksums their compiled form); [`SchemaBuilder`] runs
//! operations against a live connection.
//!
//! # Example
//!
//! ```ignore
//! use quarry::schema::SchemaBuilder;
//!
//! SchemaBuilder::new(&mut conn)
//!     .create("users", |t| {
//!         t.id();
//!         t.string("email").unique();
//!         t.timestamps();
//!     })
//!     .await?;
//! ```

pub mod blueprint;
pub mod grammar;

#[cfg(test)]
mod tests;

pub use blueprint::{
    Blueprint, ColumnDefinition, ColumnType, ForeignKeyDefinition, IndexDefinition, IndexKind,
};

use crate::connection::Connection;
use crate::error::Result;
use crate::schema::grammar::SchemaGrammar;

/// One recorded schema operation.
#[derive(Debug, Clone)]
pub enum SchemaOp {
    Table(Blueprint),
    Drop(String),
    DropIfExists(String),
    Rename(String, String),
    Raw(String),
}

/// An ordered program of schema operations.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    ops: Vec<SchemaOp>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a table creation built by `f`.
    pub fn create(&mut self, table: &str, f: impl FnOnce(&mut Blueprint)) {
        let mut blueprint = Blueprint::new(table);
        blueprint.create = true;
        f(&mut blueprint);
        self.ops.push(SchemaOp::Table(blueprint));
    }

    /// Record a table alteration built by `f`.
    pub fn table(&mut self, table: &str, f: impl FnOnce(&mut Blueprint)) {
        let mut blueprint = Blueprint::new(table);
        f(&mut blueprint);
        self.ops.push(SchemaOp::Table(blueprint));
    }

    /// Record a DROP TABLE.
    pub fn drop(&mut self, table: &str) {
        self.ops.push(SchemaOp::Drop(table.to_string()));
    }

    /// Record a DROP TABLE IF EXISTS.
    pub fn drop_if_exists(&mut self, table: &str) {
        self.ops.push(SchemaOp::DropIfExists(table.to_string()));
    }

    /// Record a table rename.
    pub fn rename(&mut self, from: &str, to: &str) {
        self.ops
            .push(SchemaOp::Rename(from.to_string(), to.to_string()));
    }

    /// Record a raw SQL statement.
    pub fn raw(&mut self, sql: &str) {
        self.ops.push(SchemaOp::Raw(sql.to_string()));
    }

    /// The recorded operations.
    pub fn ops(&self) -> &[SchemaOp] {
        &self.ops
    }

    /// Compile every operation into an ordered statement list.
    ///
    /// A blueprint opened for creation, with columns and no drop/rename
    /// entries, takes the CREATE path; everything else takes ALTER.
    pub fn compile(&self, grammar: &dyn SchemaGrammar) -> Result<Vec<String>> {
        let mut statements = Vec::new();
        for op in &self.ops {
            match op {
                SchemaOp::Table(blueprint) => {
                    if blueprint.is_creating() {
                        statements.extend(grammar.compile_create(blueprint)?);
                    } else {
                        statements.extend(grammar.compile_alter(blueprint)?);
                    }
                }
                SchemaOp::Drop(table) => statements.push(grammar.compile_drop(table)),
                SchemaOp::DropIfExists(table) => {
                    statements.push(grammar.compile_drop_if_exists(table));
                }
                SchemaOp::Rename(from, to) => statements.push(grammar.compile_rename(from, to)),
                SchemaOp::Raw(sql) => statements.push(sql.clone()),
            }
        }
        Ok(statements)
    }
}

/// Executes schema operations against a live connection.
pub struct SchemaBuilder<'c> {
    conn: &'c mut Connection,
}

impl<'c> SchemaBuilder<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    /// Run a recorded schema program.
    pub async fn execute(&mut self, schema: &Schema) -> Result<()> {
        let statements = schema.compile(self.conn.schema_grammar())?;
        for sql in statements {
            self.conn.statement(&sql, &[]).await?;
        }
        Ok(())
    }

    /// Create a table from a blueprint built by `f`.
    pub async fn create(&mut self, table: &str, f: impl FnOnce(&mut Blueprint)) -> Result<()> {
        let mut schema = Schema::new();
        schema.create(table, f);
        self.execute(&schema).await
    }

    /// Alter a table with a blueprint built by `f`.
    pub async fn table(&mut self, table: &str, f: impl FnOnce(&mut Blueprint)) -> Result<()> {
        let mut schema = Schema::new();
        schema.table(table, f);
        self.execute(&schema).await
    }

    /// Drop a table.
    pub async fn drop(&mut self, table: &str) -> Result<()> {
        let sql = self.conn.schema_grammar().compile_drop(table);
        self.conn.statement(&sql, &[]).await.map(|_| ())
    }

    /// Drop a table if it exists.
    pub async fn drop_if_exists(&mut self, table: &str) -> Result<()> {
        let sql = self.conn.schema_grammar().compile_drop_if_exists(table);
        self.conn.statement(&sql, &[]).await.map(|_| ())
    }

    /// Rename a table.
    pub async fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        let sql = self.conn.schema_grammar().compile_rename(from, to);
        self.conn.statement(&sql, &[]).await.map(|_| ())
    }

    /// Whether `table` exists, per the dialect's catalog.
    pub async fn has_table(&mut self, table: &str) -> Result<bool> {
        let (sql, bindings) = self.conn.schema_grammar().compile_has_table(table);
        let rows = self.conn.select(&sql, &bindings).await?;
        Ok(!rows.is_empty())
    }

    /// Column names of `table`, in catalog order.
    pub async fn get_columns(&mut self, table: &str) -> Result<Vec<String>> {
        let (sql, bindings) = self.conn.schema_grammar().compile_get_columns(table);
        let rows = self.conn.select(&sql, &bindings).await?;
        rows.iter()
            .map(|row| row.try_str("name").map(str::to_string))
            .collect()
    }

    /// The native type of one column, lowercased, when present.
    pub async fn get_column_type(&mut self, table: &str, column: &str) -> Result<Option<String>> {
        let (sql, bindings) = self.conn.schema_grammar().compile_get_columns(table);
        let rows = self.conn.select(&sql, &bindings).await?;
        for row in &rows {
            if row.try_str("name")? == column {
                return Ok(Some(row.try_str("type")?.to_lowercase()));
            }
        }
        Ok(None)
    }
}
