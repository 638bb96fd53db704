//! PostgreSQL schema grammar.
//!
//! Indexes compile as separate `CREATE INDEX` statements and foreign
//! keys as separate `ALTER TABLE ... ADD CONSTRAINT` statements after
//! the CREATE.

use super::{effective_indexes, primary_index, SchemaBase, SchemaGrammar};
use crate::error::{Error, Result};
use crate::schema::blueprint::{Blueprint, ColumnDefinition, ColumnType, IndexKind};
use crate::value::Value;

/// PostgreSQL dialect DDL rule set.
#[derive(Debug, Clone)]
pub struct PostgresSchemaGrammar {
    base: SchemaBase,
}

impl PostgresSchemaGrammar {
    pub fn new() -> Self {
        Self {
            base: SchemaBase {
                quote: '"',
                bool_true: "true",
                bool_false: "false",
            },
        }
    }

    fn column_sql(&self, column: &ColumnDefinition) -> Result<String> {
        let mut sql = format!("{} {}", self.base.wrap(&column.name), self.type_name(column)?);
        if column.auto_increment && column.primary {
            sql.push_str(" PRIMARY KEY");
            return Ok(sql);
        }
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
        let table = self.base.wrap(table);
        let name = self.base.wrap(name);
        let cols = self.base.columnize(columns);
        Ok(match kind {
            IndexKind::Primary => {
                format!("ALTER TABLE {table} ADD PRIMARY KEY ({cols})")
            }
            IndexKind::Unique => format!("CREATE UNIQUE INDEX {name} ON {table} ({cols})"),
            IndexKind::Index => format!("CREATE INDEX {name} ON {table} ({cols})"),
            IndexKind::Fulltext => {
                let vector = columns
                    .iter()
                    .map(|c| format!("to_tsvector('english', {})", self.base.wrap(c)))
                    .collect::<Vec<_>>()
                    .join(" || ");
                format!("CREATE INDEX {name} ON {table} USING gin(({vector}))")
            }
            IndexKind::Spatial => {
                format!("CREATE INDEX {name} ON {table} USING gist ({cols})")
            }
        })
    }
}

impl Default for PostgresSchemaGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaGrammar for PostgresSchemaGrammar {
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
        for fk in &blueprint.foreign_keys {
            statements.push(format!(
                "ALTER TABLE {} ADD CONSTRAINT {} {}",
                self.base.wrap(&blueprint.table),
                self.base.wrap(&fk.name),
                self.base.foreign_key_body(fk)?
            ));
        }
        // Engine and charset options do not apply; comments have their
        // own statement form.
        if let Some(comment) = &blueprint.comment {
            statements.push(format!(
                "COMMENT ON TABLE {} IS {}",
                self.base.wrap(&blueprint.table),
                self.base.quote_string(comment)
            ));
        }
        Ok(statements)
    }

    fn compile_alter(&self, blueprint: &Blueprint) -> Result<Vec<String>> {
        let table = self.base.wrap(&blueprint.table);
        let mut statements = Vec::new();

        for name in &blueprint.drop_foreign_keys {
            statements.push(format!(
                "ALTER TABLE {table} DROP CONSTRAINT {}",
                self.base.wrap(name)
            ));
        }
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
            if column.change {
                let wrapped = self.base.wrap(&column.name);
                statements.push(format!(
                    "ALTER TABLE {table} ALTER COLUMN {wrapped} TYPE {}",
                    self.type_name(column)?
                ));
                statements.push(format!(
                    "ALTER TABLE {table} ALTER COLUMN {wrapped} {}",
                    if column.nullable {
                        "DROP NOT NULL"
                    } else {
                        "SET NOT NULL"
                    }
                ));
                match &column.default {
                    Some(default) => statements.push(format!(
                        "ALTER TABLE {table} ALTER COLUMN {wrapped} SET DEFAULT {}",
                        self.base.default_literal(default)
                    )),
                    None => statements.push(format!(
                        "ALTER TABLE {table} ALTER COLUMN {wrapped} DROP DEFAULT"
                    )),
                }
            } else {
                statements.push(format!(
                    "ALTER TABLE {table} ADD COLUMN {}",
                    self.column_sql(column)?
                ));
            }
        }
        if let Some(primary) = primary_index(blueprint) {
            statements.push(format!(
                "ALTER TABLE {table} ADD PRIMARY KEY ({})",
                self.base.columnize(&primary.columns)
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
            "ALTER TABLE {} RENAME TO {}",
            self.base.wrap(from),
            self.base.wrap(to)
        )
    }

    fn compile_has_table(&self, table: &str) -> (String, Vec<Value>) {
        (
            "SELECT tablename AS name FROM pg_catalog.pg_tables \
             WHERE schemaname = current_schema() AND tablename = ?"
                .to_string(),
            vec![Value::Str(table.to_string())],
        )
    }

    fn compile_get_columns(&self, table: &str) -> (String, Vec<Value>) {
        (
            "SELECT column_name AS name, data_type AS type FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = ? ORDER BY ordinal_position"
                .to_string(),
            vec![Value::Str(table.to_string())],
        )
    }

    fn type_name(&self, column: &ColumnDefinition) -> Result<String> {
        if column.auto_increment {
            return Ok(match column.ty {
                ColumnType::SmallInteger | ColumnType::TinyInteger => "smallserial".to_string(),
                ColumnType::Integer | ColumnType::MediumInteger => "serial".to_string(),
                ColumnType::BigInteger => "bigserial".to_string(),
                _ => {
                    return Err(Error::unsupported(format!(
                        "auto-increment is not supported for column '{}' of this type",
                        column.name
                    )));
                }
            });
        }
        Ok(match &column.ty {
            ColumnType::TinyInteger | ColumnType::SmallInteger => "smallint".to_string(),
            ColumnType::MediumInteger | ColumnType::Integer => "integer".to_string(),
            ColumnType::BigInteger => "bigint".to_string(),
            ColumnType::Decimal => format!(
                "numeric({}, {})",
                column.precision.unwrap_or(8),
                column.scale.unwrap_or(2)
            ),
            ColumnType::Float => "real".to_string(),
            ColumnType::Double => "double precision".to_string(),
            ColumnType::Boolean => "boolean".to_string(),
            ColumnType::Char => format!("char({})", column.length.unwrap_or(255)),
            ColumnType::String => format!("varchar({})", column.length.unwrap_or(255)),
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => "text".to_string(),
            ColumnType::Date => "date".to_string(),
            ColumnType::DateTime | ColumnType::Timestamp => "timestamp".to_string(),
            ColumnType::Time => "time".to_string(),
            ColumnType::Binary => "bytea".to_string(),
            ColumnType::Uuid => "uuid".to_string(),
            ColumnType::Json => "json".to_string(),
            ColumnType::Jsonb => "jsonb".to_string(),
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
                    "varchar(255) CHECK ({} IN ({}))",
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
