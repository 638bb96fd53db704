//! SQLite schema grammar.
//!
//! Foreign keys compile inline in CREATE (they cannot be added later);
//! unique/plain indexes compile as separate `CREATE INDEX` statements.
//! Column modification and foreign-key drops are rejected outright.

use super::{effective_indexes, primary_index, SchemaBase, SchemaGrammar};
use crate::error::{Error, Result};
use crate::schema::blueprint::{Blueprint, ColumnDefinition, ColumnType, IndexKind};
use crate::value::Value;

/// SQLite dialect DDL rule set.
#[derive(Debug, Clone)]
pub struct SqliteSchemaGrammar {
    base: SchemaBase,
}

impl SqliteSchemaGrammar {
    pub fn new() -> Self {
        Self {
            base: SchemaBase {
                quote: '"',
                bool_true: "1",
                bool_false: "0",
            },
        }
    }

    fn column_sql(&self, column: &ColumnDefinition) -> Result<String> {
        // Rowid aliasing only works through this exact column form.
        if column.auto_increment {
            return Ok(format!(
                "{} INTEGER PRIMARY KEY AUTOINCREMENT",
                self.base.wrap(&column.name)
            ));
        }
        let mut sql = format!("{} {}", self.base.wrap(&column.name), self.type_name(column)?);
        sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", self.base.default_literal(default)));
        }
        if column.primary {
            sql.push_str(" PRIMARY KEY");
        }
        Ok(sql)
    }

    fn index_statement(&self, table: &str, kind: IndexKind, name: &str, columns: &[String]) -> Result<String> {
        match kind {
            IndexKind::Unique => Ok(format!(
                "CREATE UNIQUE INDEX {} ON {} ({})",
                self.base.wrap(name),
                self.base.wrap(table),
                self.base.columnize(columns)
            )),
            IndexKind::Index => Ok(format!(
                "CREATE INDEX {} ON {} ({})",
                self.base.wrap(name),
                self.base.wrap(table),
                self.base.columnize(columns)
            )),
            IndexKind::Primary => Err(Error::unsupported(
                "primary keys must be declared when the table is created",
            )),
            IndexKind::Fulltext | IndexKind::Spatial => Err(Error::unsupported(format!(
                "{} indexes are not supported by this dialect",
                kind.suffix()
            ))),
        }
    }
}

impl Default for SqliteSchemaGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGrammar for SqliteSchemaGrammar {
    fn wrap(&self, identifier: &str) -> String {
        self.base.wrap(identifier)
    }

    fn compile_create(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let mut definitions = Vec::new();
        for column in &blueprint.columns {
            definitions.push(self.column_sql(column)?);
        }
        if let Some(primary) = primary_index(blueprint) {
            definitions.push(format!(
                "PRIMARY KEY ({})",
                self.base.columnize(&primary.columns)
            ));
        }
        for fk in &blueprint.foreign_keys {
            definitions.push(self.base.foreign_key_body(fk)?);
        }

        let create = if blueprint.temporary {
            "CREATE TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        };
        let mut statements = vec![format!(
            "{create} {} ({})",
            self.base.wrap(&blueprint.table),
            definitions.join(", ")
        )];
        for index in effective_indexes(blueprint) {
            statements.push(self.index_statement(
                &blueprint.table,
                index.kind,
                &index.name,
                &index.columns,
            )?);
        }
        Ok(statements)
    }

    fn compile_alter(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        if !blueprint.drop_foreign_keys.is_empty() {
            return Err(Error::unsupported(
                "this dialect cannot drop foreign keys from an existing table",
            ));
        }
        if blueprint.columns.iter().any(|c| c.change) {
            return Err(Error::unsupported(
                "this dialect cannot modify existing columns",
            ));
        }
        if !blueprint.foreign_keys.is_empty() {
            return Err(Error::unsupported(
                "this dialect cannot add foreign keys to an existing table",
            ));
        }

        let table = self.base.wrap(&blueprint.table);
        let mut statements = Vec::new();
        for name in &blueprint.drop_indexes {
            statements.push(format!("DROP INDEX {}", self.base.wrap(name)));
        }
        for name in &blueprint.drop_columns {
            statements.push(format!(
                "ALTER TABLE {table} DROP COLUMN {}",
                self.base.wrap(name)
            ));
        }
        for (from, to) in &blueprint.rename_columns {
            statements.push(format!(
                "ALTER TABLE {table} RENAME COLUMN {} TO {}",
                self.base.wrap(from),
                self.base.wrap(to)
            ));
        }
        for column in &blueprint.columns {
            statements.push(format!(
                "ALTER TABLE {table} ADD COLUMN {}",
                self.column_sql(column)?
            ));
        }
        for index in effective_indexes(blueprint) {
            statements.push(self.index_statement(
                &blueprint.table,
                index.kind,
                &index.name,
                &index.columns,
            )?);
        }
        Ok(statements)
    }

    fn compile_drop(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.base.wrap(table))
    }

    fn compile_drop_if_exists(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", self.base.wrap(table))
    }

    fn compile_rename(&self, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.base.wrap(from),
            self.base.wrap(to)
        )
    }

    fn compile_has_table(&self, table: &str) -> (String, Vec<Value>) {
        (
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?".to_string(),
            vec![Value::Str(table.to_string())],
        )
    }

    fn compile_get_columns(&self, table: &str) -> (String, Vec<Value>) {
        (
            "SELECT name, type FROM pragma_table_info(?)".to_string(),
            vec![Value::Str(table.to_string())],
        )
    }

    fn type_name(&self, column: &ColumnDefinition) -> Result<String> {
        Ok(match &column.ty {
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::MediumInteger
            | ColumnType::Integer
            | ColumnType::BigInteger => "integer".to_string(),
            ColumnType::Decimal => "numeric".to_string(),
            ColumnType::Float | ColumnType::Double => "real".to_string(),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Char | ColumnType::String => "varchar".to_string(),
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => "text".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime | ColumnType::Timestamp => "datetime".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Binary => "blob".to_string(),
            ColumnType::Uuid => "varchar".to_string(),
            ColumnType::Json | ColumnType::Jsonb => "text".to_string(),
            ColumnType::Enum => {
                if column.allowed.is_empty() {
                    return Err(Error::unsupported(format!(
                        "enum column '{}' has no allowed values",
                        column.name
                    )));
                }
                let values: Vec<String> = column
                    .allowed
                    .iter()
                    .map(|v| self.base.quote_string(v))
                    .collect();
                format!(
                    "varchar CHECK ({} IN ({}))",
                    self.base.wrap(&column.name),
                    values.join(", ")
                )
            }
            ColumnType::Set => {
                return Err(Error::unsupported(format!(
                    "set columns are not supported by this dialect ('{}')",
                    column.name
                )));
            }
        })
    }
}
