//! SQL text compilation for DML/DQL, per dialect.
//!
//! [`BaseGrammar`] implements the algorithm shared by every dialect,
//! parameterized by a small capability set ([`GrammarConfig`]). Dialect
//! grammars own a `BaseGrammar` and delegate to it, overriding only the
//! pieces that genuinely differ (upsert syntax, truncate, extra
//! operators). Placeholders are always positional `?`; binding order is
//! the left-to-right textual order of placeholders.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;

use crate::config::Driver;
use crate::error::{Error, Result};
use crate::query::clause::{JoinKind, WhereClause};
use crate::query::QueryBuilder;
use crate::value::Value;

/// Comparison operators every dialect accepts.
const BASE_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "like", "not like", "between", "in", "not in",
];

/// Dialect rule set for compiling queries to SQL text.
pub trait Grammar: Send + Sync {
    /// Quote an identifier for this dialect.
    fn wrap(&self, identifier: &str) -> String;

    /// Compile a SELECT statement.
    fn compile_select(&self, query: &QueryBuilder) -> Result<String>;

    /// Compile a multi-row INSERT, returning SQL and bindings.
    fn compile_insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<(String, Value)>],
    ) -> Result<(String, Vec<Value>)>;

    /// Compile an UPDATE over the query's where clauses.
    fn compile_update(
        &self,
        query: &QueryBuilder,
        sets: &[(String, Value)],
    ) -> Result<(String, Vec<Value>)>;

    /// Compile a DELETE over the query's where clauses.
    fn compile_delete(&self, query: &QueryBuilder) -> Result<String>;

    /// Compile an upsert.
    ///
    /// `conflict_columns` are required by the `ON CONFLICT` family and
    /// ignored by the `ON DUPLICATE KEY` family.
    fn compile_upsert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<(String, Value)>],
        conflict_columns: &[&str],
        update_columns: &[&str],
    ) -> Result<(String, Vec<Value>)>;

    /// Compile table truncation as an ordered statement list.
    fn compile_truncate(&self, table: &str) -> Vec<(String, Vec<Value>)>;
}

/// Build the grammar for a driver.
pub fn for_driver(driver: Driver) -> Box<dyn Grammar> {
    match driver {
        Driver::MySql => Box::new(MySqlGrammar::new()),
        Driver::Postgres => Box::new(PostgresGrammar::new()),
        Driver::Sqlite => Box::new(SqliteGrammar::new()),
    }
}

/// Capability set distinguishing one dialect's shared compilation from
/// another's.
#[derive(Debug, Clone)]
pub struct GrammarConfig {
    /// Identifier quote character.
    pub quote: char,
    /// Operators accepted beyond [`BASE_OPERATORS`].
    pub extra_operators: &'static [&'static str],
    /// Whether OFFSET is only valid alongside a LIMIT clause.
    pub offset_requires_limit: bool,
}

/// The dialect-independent compilation algorithm.
#[derive(Debug, Clone)]
pub struct BaseGrammar {
    config: GrammarConfig,
}

impl BaseGrammar {
    pub fn new(config: GrammarConfig) -> Self {
        Self { config }
    }

    /// Quote one identifier, splitting `x as y` aliases and dotted paths.
    ///
    /// `*` and expressions (anything containing `(`) pass through as-is.
    pub fn wrap(&self, identifier: &str) -> String {
        if identifier.contains('(') {
            return identifier.to_string();
        }
        let lower = identifier.to_lowercase();
        if let Some(pos) = lower.find(" as ") {
            let (lhs, rhs) = (&identifier[..pos], &identifier[pos + 4..]);
            return format!("{} AS {}", self.wrap(lhs.trim()), self.wrap(rhs.trim()));
        }
        identifier
            .split('.')
            .map(|segment| self.wrap_segment(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    fn wrap_segment(&self, segment: &str) -> String {
        if segment == "*" {
            return segment.to_string();
        }
        let q = self.config.quote;
        let doubled = format!("{q}{q}");
        let escaped = segment.replace(q, doubled.as_str());
        format!("{q}{escaped}{q}")
    }

    /// Emit one `?` per value, comma separated.
    pub fn parameterize(&self, values: &[Value]) -> String {
        vec!["?"; values.len()].join(", ")
    }

    fn check_operator(&self, operator: &str) -> Result<String> {
        let lower = operator.to_lowercase();
        if BASE_OPERATORS.contains(&lower.as_str())
            || self.config.extra_operators.contains(&lower.as_str())
        {
            Ok(lower.to_uppercase())
        } else {
            Err(Error::unsupported(format!("operator '{operator}'")))
        }
    }

    // ==================== SELECT ====================

    pub fn compile_select(&self, query: &QueryBuilder) -> Result<String> {
        let mut sql = String::from("SELECT ");
        if query.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&self.compile_columns(&query.columns));
        sql.push_str(" FROM ");
        sql.push_str(&self.wrap(&query.table));

        for join in &query.joins {
            sql.push(' ');
            let keyword = join.kind.keyword().to_uppercase();
            if join.kind == JoinKind::Cross {
                sql.push_str(&format!("{keyword} {}", self.wrap(&join.table)));
            } else {
                sql.push_str(&format!(
                    "{keyword} {} ON {} {} {}",
                    self.wrap(&join.table),
                    self.wrap(&join.first),
                    self.check_operator(&join.operator)?,
                    self.wrap(&join.second),
                ));
            }
        }

        if !query.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.compile_wheres(&query.wheres)?);
        }

        if !query.groups.is_empty() {
            sql.push_str(" GROUP BY ");
            let groups: Vec<String> = query.groups.iter().map(|g| self.wrap(g)).collect();
            sql.push_str(&groups.join(", "));
        }

        if !query.havings.is_empty() {
            sql.push_str(" HAVING ");
            let mut parts = Vec::new();
            for (i, having) in query.havings.iter().enumerate() {
                let clause = format!(
                    "{} {} ?",
                    self.wrap(&having.column),
                    self.check_operator(&having.operator)?
                );
                if i == 0 {
                    parts.push(clause);
                } else {
                    parts.push(format!("{} {clause}", having.boolean.keyword().to_uppercase()));
                }
            }
            sql.push_str(&parts.join(" "));
        }

        if !query.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            let orders: Vec<String> = query
                .orders
                .iter()
                .map(|o| format!("{} {}", self.wrap(&o.column), o.direction.keyword().to_uppercase()))
                .collect();
            sql.push_str(&orders.join(", "));
        }

        sql.push_str(&self.compile_limit_offset(query.limit, query.offset));
        Ok(sql)
    }

    fn compile_columns(&self, columns: &[String]) -> String {
        if columns.is_empty() {
            return "*".to_string();
        }
        columns
            .iter()
            .map(|c| self.wrap(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn compile_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        let mut sql = String::new();
        match (limit, offset) {
            (Some(l), Some(o)) => sql.push_str(&format!(" LIMIT {l} OFFSET {o}")),
            (Some(l), None) => sql.push_str(&format!(" LIMIT {l}")),
            (None, Some(o)) => {
                // Some dialects only parse OFFSET after a LIMIT clause.
                if self.config.offset_requires_limit {
                    sql.push_str(&format!(" LIMIT -1 OFFSET {o}"));
                } else {
                    sql.push_str(&format!(" OFFSET {o}"));
                }
            }
            (None, None) => {}
        }
        sql
    }

    // ==================== WHERE ====================

    /// Compile a where list. The first clause omits its connector; every
    /// later clause is prefixed with its own, at every nesting depth.
    pub fn compile_wheres(&self, wheres: &[WhereClause]) -> Result<String> {
        let mut parts = Vec::with_capacity(wheres.len());
        for (i, clause) in wheres.iter().enumerate() {
            let compiled = self.compile_where(clause)?;
            if i == 0 {
                parts.push(compiled);
            } else {
                parts.push(format!(
                    "{} {compiled}",
                    clause.boolean().keyword().to_uppercase()
                ));
            }
        }
        Ok(parts.join(" "))
    }

    fn compile_where(&self, clause: &WhereClause) -> Result<String> {
        match clause {
            WhereClause::Basic {
                column, operator, ..
            } => Ok(format!(
                "{} {} ?",
                self.wrap(column),
                self.check_operator(operator)?
            )),
            WhereClause::In { column, values, .. } => {
                if values.is_empty() {
                    return Ok("1 = 0".to_string());
                }
                Ok(format!(
                    "{} IN ({})",
                    self.wrap(column),
                    self.parameterize(values)
                ))
            }
            WhereClause::NotIn { column, values, .. } => {
                if values.is_empty() {
                    return Ok("1 = 1".to_string());
                }
                Ok(format!(
                    "{} NOT IN ({})",
                    self.wrap(column),
                    self.parameterize(values)
                ))
            }
            WhereClause::Null { column, .. } => Ok(format!("{} IS NULL", self.wrap(column))),
            WhereClause::NotNull { column, .. } => {
                Ok(format!("{} IS NOT NULL", self.wrap(column)))
            }
            WhereClause::Between {
                column, ..
            } => Ok(format!("{} BETWEEN ? AND ?", self.wrap(column))),
            WhereClause::Raw { sql, .. } => Ok(sql.clone()),
            WhereClause::Nested { clauses, .. } => {
                Ok(format!("({})", self.compile_wheres(clauses)?))
            }
        }
    }

    // ==================== INSERT / UPDATE / DELETE ====================

    pub fn compile_insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<(String, Value)>],
    ) -> Result<(String, Vec<Value>)> {
        let mut bindings = Vec::with_capacity(rows.len() * columns.len());
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let row_columns: Vec<&String> = row.iter().map(|(c, _)| c).collect();
            if row_columns.len() != columns.len()
                || row_columns.iter().zip(columns).any(|(a, b)| *a != b)
            {
                return Err(Error::unsupported(
                    "insert rows must share one column list",
                ));
            }
            let values: Vec<Value> = row.iter().map(|(_, v)| v.clone()).collect();
            tuples.push(format!("({})", self.parameterize(&values)));
            bindings.extend(values);
        }
        let column_list: Vec<String> = columns.iter().map(|c| self.wrap(c)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.wrap(table),
            column_list.join(", "),
            tuples.join(", ")
        );
        Ok((sql, bindings))
    }

    pub fn compile_update(
        &self,
        query: &QueryBuilder,
        sets: &[(String, Value)],
    ) -> Result<(String, Vec<Value>)> {
        if sets.is_empty() {
            return Err(Error::unsupported("update requires at least one SET column"));
        }
        let assignments: Vec<String> = sets
            .iter()
            .map(|(c, _)| format!("{} = ?", self.wrap(c)))
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            self.wrap(&query.table),
            assignments.join(", ")
        );
        let mut bindings: Vec<Value> = sets.iter().map(|(_, v)| v.clone()).collect();
        if !query.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.compile_wheres(&query.wheres)?);
            for clause in &query.wheres {
                clause.collect_bindings(&mut bindings);
            }
        }
        Ok((sql, bindings))
    }

    pub fn compile_delete(&self, query: &QueryBuilder) -> Result<String> {
        let mut sql = format!("DELETE FROM {}", self.wrap(&query.table));
        if !query.wheres.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.compile_wheres(&query.wheres)?);
        }
        Ok(sql)
    }

    pub fn compile_truncate(&self, table: &str) -> Vec<(String, Vec<Value>)> {
        vec![(format!("TRUNCATE TABLE {}", self.wrap(table)), Vec::new())]
    }

    /// `ON CONFLICT (...) DO UPDATE SET` upsert, shared by the dialects
    /// that speak it.
    pub fn compile_conflict_upsert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<(String, Value)>],
        conflict_columns: &[&str],
        update_columns: &[&str],
    ) -> Result<(String, Vec<Value>)> {
        if conflict_columns.is_empty() {
            return Err(Error::unsupported(
                "upsert requires conflict columns for this dialect",
            ));
        }
        let (insert_sql, bindings) = self.compile_insert(table, columns, rows)?;
        let conflicts: Vec<String> = conflict_columns.iter().map(|c| self.wrap(c)).collect();
        let updates: Vec<String> = update_columns
            .iter()
            .map(|c| format!("{} = excluded.{}", self.wrap(c), self.wrap(c)))
            .collect();
        let sql = format!(
            "{insert_sql} ON CONFLICT ({}) DO UPDATE SET {}",
            conflicts.join(", "),
            updates.join(", ")
        );
        Ok((sql, bindings))
    }
}
