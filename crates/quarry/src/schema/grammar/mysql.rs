//! MySQL schema grammar.
//!
//! Indexes compile as inline `KEY` clauses and foreign keys as inline
//! `CONSTRAINT` clauses, so a CREATE blueprint yields one statement.

use super::{effective_indexes, primary_index, SchemaBase, SchemaGrammar};
use crate::error::{Error, Result};
use crate::schema::blueprint::{Blueprint, ColumnDefinition, ColumnType, IndexKind};
use crate::value::Value;

/// MySQL dialect DDL rule set.
#[derive(Debug, Clone)]
pub struct MySqlSchemaGrammar {
    base: SchemaBase,
}

impl MySqlSchemaGrammar {
    pub fn new() -> Self {
        Self {
            base: SchemaBase {
                quote: '`',
                bool_true: "1",
                bool_false: "0",
            },
        }
    }

    fn column_sql(&self, column: &ColumnDefinition) -> Result<String> {
        let mut sql = format!("{} {}", self.base.wrap(&column.name), self.type_name(column)?);
        if let Some(charset) = &column.charset {
            sql.push_str(&format!(" CHARACTER SET {charset}"));
        }
        if let Some(collation) = &column.collation {
            sql.push_str(&format!(" COLLATE {}", self.base.quote_string(collation)));
        }
        sql.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        if let Some(default) = &column.default {
            sql.push_str(&format!(" DEFAULT {}", self.base.default_literal(default)));
        }
        if column.auto_increment {
            sql.push_str(" AUTO_INCREMENT");
            if column.primary {
                sql.push_str(" PRIMARY KEY");
            }
        }
        if let Some(comment) = &column.comment {
            sql.push_str(&format!(" COMMENT {}", self.base.quote_string(comment)));
        }
        Ok(sql)
    }

    fn index_sql(&self, kind: IndexKind, name: &str, columns: &[String]) -> String {
        let keyword = match kind {
            IndexKind::Primary => return format!("PRIMARY KEY ({})", self.base.columnize(columns)),
            IndexKind::Unique => "UNIQUE KEY",
            IndexKind::Index => "KEY",
            IndexKind::Fulltext => "FULLTEXT KEY",
            IndexKind::Spatial => "SPATIAL KEY",
        };
        format!(
            "{keyword} {} ({})",
            self.base.wrap(name),
            self.base.columnize(columns)
        )
    }
}

impl Default for MySqlSchemaGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGrammar for MySqlSchemaGrammar {
    fn wrap(&self, identifier: &str) -> String {
        self.base.wrap(identifier)
    }

    fn compile_create(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let mut definitions = Vec::new();
        for column in &blueprint.columns {
            definitions.push(self.column_sql(column)?);
        }

        // Non-increment primary flags and composite primaries compile as
        // a table-level clause.
        let flagged: Vec<String> = blueprint
            .columns
            .iter()
            .filter(|c| c.primary && !c.auto_increment)
            .map(|c| c.name.clone())
            .collect();
        if !flagged.is_empty() {
            definitions.push(format!("PRIMARY KEY ({})", self.base.columnize(&flagged)));
        }
        if let Some(primary) = primary_index(blueprint) {
            definitions.push(self.index_sql(IndexKind::Primary, &primary.name, &primary.columns));
        }

        for index in effective_indexes(blueprint) {
            definitions.push(self.index_sql(index.kind, &index.name, &index.columns));
        }

        for fk in &blueprint.foreign_keys {
            definitions.push(format!(
                "CONSTRAINT {} {}",
                self.base.wrap(&fk.name),
                self.base.foreign_key_body(fk)?
            ));
        }

        let create = if blueprint.temporary {
            "CREATE TEMPORARY TABLE"
        } else {
            "CREATE TABLE"
        };
        let mut sql = format!(
            "{create} {} ({})",
            self.base.wrap(&blueprint.table),
            definitions.join(", ")
        );
        if let Some(engine) = &blueprint.engine {
            sql.push_str(&format!(" ENGINE = {engine}"));
        }
        if let Some(charset) = &blueprint.charset {
            sql.push_str(&format!(" DEFAULT CHARACTER SET {charset}"));
        }
        if let Some(collation) = &blueprint.collation {
            sql.push_str(&format!(" COLLATE {}", self.base.quote_string(collation)));
        }
        if let Some(comment) = &blueprint.comment {
            sql.push_str(&format!(" COMMENT = {}", self.base.quote_string(comment)));
        }
        Ok(vec![sql])
    }

    fn compile_alter(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let table = self.base.wrap(&blueprint.table);
        let mut statements = Vec::new();

        for name in &blueprint.drop_foreign_keys {
            statements.push(format!(
                "ALTER TABLE {table} DROP FOREIGN KEY {}",
                self.base.wrap(name)
            ));
        }
        for name in &blueprint.drop_indexes {
            statements.push(format!(
                "ALTER TABLE {table} DROP INDEX {}",
                self.base.wrap(name)
            ));
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
            let keyword = if column.change { "MODIFY" } else { "ADD COLUMN" };
            statements.push(format!(
                "ALTER TABLE {table} {keyword} {}",
                self.column_sql(column)?
            ));
        }
        if let Some(primary) = primary_index(blueprint) {
            statements.push(format!(
                "ALTER TABLE {table} ADD PRIMARY KEY ({})",
                self.base.columnize(&primary.columns)
            ));
        }
        for index in effective_indexes(blueprint) {
            statements.push(format!(
                "ALTER TABLE {table} ADD {}",
                self.index_sql(index.kind, &index.name, &index.columns)
            ));
        }
        for fk in &blueprint.foreign_keys {
            statements.push(format!(
                "ALTER TABLE {table} ADD CONSTRAINT {} {}",
                self.base.wrap(&fk.name),
                self.base.foreign_key_body(fk)?
            ));
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
            "RENAME TABLE {} TO {}",
            self.base.wrap(from),
            self.base.wrap(to)
        )
    }

    fn compile_has_table(&self, table: &str) -> (String, Vec<Value>) {
        (
            "SELECT table_name AS name FROM information_schema.tables \
             WHERE table_schema = DATABASE() AND table_name = ?"
                .to_string(),
            vec![Value::Str(table.to_string())],
        )
    }

    fn compile_get_columns(&self, table: &str) -> (String, Vec<Value>) {
        (
            "SELECT column_name AS name, data_type AS type FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ? ORDER BY ordinal_position"
                .to_string(),
            vec![Value::Str(table.to_string())],
        )
    }

    fn type_name(&self, column: &ColumnDefinition) -> Result<String> {
        let base = match &column.ty {
            ColumnType::TinyInteger => "tinyint".to_string(),
            ColumnType::SmallInteger => "smallint".to_string(),
            ColumnType::MediumInteger => "mediumint".to_string(),
            ColumnType::Integer => "int".to_string(),
            ColumnType::BigInteger => "bigint".to_string(),
            ColumnType::Decimal => format!(
                "decimal({}, {})",
                column.precision.unwrap_or(8),
                column.scale.unwrap_or(2)
            ),
            ColumnType::Float => "float".to_string(),
            ColumnType::Double => "double".to_string(),
            ColumnType::Boolean => "tinyint(1)".to_string(),
            ColumnType::Char => format!("char({})", column.length.unwrap_or(255)),
            ColumnType::String => format!("varchar({})", column.length.unwrap_or(255)),
            ColumnType::Text => "text".to_string(),
            ColumnType::MediumText => "mediumtext".to_string(),
            ColumnType::LongText => "longtext".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime => "datetime".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Timestamp => "timestamp".to_string(),
            ColumnType::Binary => "blob".to_string(),
            ColumnType::Uuid => "char(36)".to_string(),
            ColumnType::Json | ColumnType::Jsonb => "json".to_string(),
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
                format!("enum({})", values.join(", "))
            }
            ColumnType::Set => {
                if column.allowed.is_empty() {
                    return Err(Error::unsupported(format!(
                        "set column '{}' has no allowed values",
                        column.name
                    )));
                }
                let values: Vec<String> = column
                    .allowed
                    .iter()
                    .map(|v| self.base.quote_string(v))
                    .collect();
                format!("set({})", values.join(", "))
            }
        };
        let unsigned = column.unsigned
            && matches!(
                column.ty,
                ColumnType::TinyInteger
                    | ColumnType::SmallInteger
                    | ColumnType::MediumInteger
                    | ColumnType::Integer
                    | ColumnType::BigInteger
                    | ColumnType::Decimal
            );
        Ok(if unsigned {
            format!("{base} unsigned")
        } else {
            base
        })
    }
}
