//! Structured SELECT/INSERT/UPDATE/DELETE query builder.
//!
//! The builder accumulates clauses as data and leaves SQL text generation
//! to a [`Grammar`](crate::grammar::Grammar). Bindings are flattened in
//! exactly the order the grammar emits `?` placeholders.
//!
//! # Example
//!
//! ```ignore
//! use quarry::query::QueryBuilder;
//!
//! let rows = QueryBuilder::new("users")
//!     .select(&["id", "email"])
//!     .and_eq("status", "active")
//!     .where_in("role_id", vec![1, 2, 3])
//!     .order_by_desc("created_at")
//!     .limit(10)
//!     .get(&mut conn)
//!     .await?;
//! ```

pub mod clause;

#[cfg(test)]
mod tests;

pub use clause::{
    BoolOp, Direction, HavingClause, JoinClause, JoinKind, OrderClause, WhereClause,
};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::value::{IntoValue, Value};

/// Structured query builder over one table.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// Target table expression
    pub(crate) table: String,
    /// SELECT columns (empty means `*`)
    pub(crate) columns: Vec<String>,
    /// DISTINCT flag
    pub(crate) distinct: bool,
    /// JOIN clauses
    pub(crate) joins: Vec<JoinClause>,
    /// WHERE clauses
    pub(crate) wheres: Vec<WhereClause>,
    /// GROUP BY columns
    pub(crate) groups: Vec<String>,
    /// HAVING clauses
    pub(crate) havings: Vec<HavingClause>,
    /// ORDER BY clauses
    pub(crate) orders: Vec<OrderClause>,
    /// LIMIT
    pub(crate) limit: Option<u64>,
    /// OFFSET
    pub(crate) offset: Option<u64>,
}

impl QueryBuilder {
    /// Create a builder targeting `table`.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// The target table expression.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The accumulated where clauses.
    pub fn wheres(&self) -> &[WhereClause] {
        &self.wheres
    }

    // ==================== Projection ====================

    /// Set the SELECT column list.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Append one SELECT column.
    pub fn add_select(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Mark the query DISTINCT.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ==================== Joins ====================

    fn join_clause(mut self, kind: JoinKind, table: &str, first: &str, op: &str, second: &str) -> Self {
        self.joins.push(JoinClause {
            kind,
            table: table.to_string(),
            first: first.to_string(),
            operator: op.to_string(),
            second: second.to_string(),
        });
        self
    }

    /// Add an INNER JOIN.
    pub fn join(self, table: &str, first: &str, op: &str, second: &str) -> Self {
        self.join_clause(JoinKind::Inner, table, first, op, second)
    }

    /// Add a LEFT JOIN.
    pub fn left_join(self, table: &str, first: &str, op: &str, second: &str) -> Self {
        self.join_clause(JoinKind::Left, table, first, op, second)
    }

    /// Add a RIGHT JOIN.
    pub fn right_join(self, table: &str, first: &str, op: &str, second: &str) -> Self {
        self.join_clause(JoinKind::Right, table, first, op, second)
    }

    /// Add a CROSS JOIN.
    pub fn cross_join(mut self, table: &str) -> Self {
        self.joins.push(JoinClause {
            kind: JoinKind::Cross,
            table: table.to_string(),
            first: String::new(),
            operator: String::new(),
            second: String::new(),
        });
        self
    }

    // ==================== Where clauses ====================

    /// Add an AND condition: `column <op> ?`.
    pub fn and_where(mut self, column: &str, operator: &str, value: impl IntoValue) -> Self {
        self.wheres.push(WhereClause::Basic {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.into_value(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add an OR condition: `column <op> ?`.
    pub fn or_where(mut self, column: &str, operator: &str, value: impl IntoValue) -> Self {
        self.wheres.push(WhereClause::Basic {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.into_value(),
            boolean: BoolOp::Or,
        });
        self
    }

    /// Add an AND equality condition.
    pub fn and_eq(self, column: &str, value: impl IntoValue) -> Self {
        self.and_where(column, "=", value)
    }

    /// Add an OR equality condition.
    pub fn or_eq(self, column: &str, value: impl IntoValue) -> Self {
        self.or_where(column, "=", value)
    }

    /// Add an AND `IN (...)` condition.
    pub fn where_in<T: IntoValue>(mut self, column: &str, values: Vec<T>) -> Self {
        self.wheres.push(WhereClause::In {
            column: column.to_string(),
            values: values.into_iter().map(IntoValue::into_value).collect(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add an AND `NOT IN (...)` condition.
    pub fn where_not_in<T: IntoValue>(mut self, column: &str, values: Vec<T>) -> Self {
        self.wheres.push(WhereClause::NotIn {
            column: column.to_string(),
            values: values.into_iter().map(IntoValue::into_value).collect(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add an AND `IS NULL` condition.
    pub fn where_null(mut self, column: &str) -> Self {
        self.wheres.push(WhereClause::Null {
            column: column.to_string(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add an AND `IS NOT NULL` condition.
    pub fn where_not_null(mut self, column: &str) -> Self {
        self.wheres.push(WhereClause::NotNull {
            column: column.to_string(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add an AND `BETWEEN ? AND ?` condition.
    pub fn where_between(
        mut self,
        column: &str,
        low: impl IntoValue,
        high: impl IntoValue,
    ) -> Self {
        self.wheres.push(WhereClause::Between {
            column: column.to_string(),
            low: low.into_value(),
            high: high.into_value(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add a raw AND condition with its own bindings.
    ///
    /// # Safety
    ///
    /// The fragment is concatenated into the statement as-is.
    pub fn where_raw<T: IntoValue>(mut self, sql: &str, bindings: Vec<T>) -> Self {
        self.wheres.push(WhereClause::Raw {
            sql: sql.to_string(),
            bindings: bindings.into_iter().map(IntoValue::into_value).collect(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add a parenthesized AND group built by `f` on a fresh sub-builder.
    pub fn where_group(mut self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        let sub = f(QueryBuilder::new(self.table.clone()));
        self.wheres.push(WhereClause::Nested {
            clauses: sub.wheres,
            boolean: BoolOp::And,
        });
        self
    }

    /// Add a parenthesized OR group built by `f` on a fresh sub-builder.
    pub fn or_where_group(mut self, f: impl FnOnce(QueryBuilder) -> QueryBuilder) -> Self {
        let sub = f(QueryBuilder::new(self.table.clone()));
        self.wheres.push(WhereClause::Nested {
            clauses: sub.wheres,
            boolean: BoolOp::Or,
        });
        self
    }

    // ==================== Group / having / order ====================

    /// Add GROUP BY columns.
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.groups.extend(columns.iter().map(|s| s.to_string()));
        self
    }

    /// Add an AND HAVING condition: `column <op> ?`.
    pub fn having(mut self, column: &str, operator: &str, value: impl IntoValue) -> Self {
        self.havings.push(HavingClause {
            column: column.to_string(),
            operator: operator.to_string(),
            value: value.into_value(),
            boolean: BoolOp::And,
        });
        self
    }

    /// Add an ascending ORDER BY.
    pub fn order_by(mut self, column: &str) -> Self {
        self.orders.push(OrderClause {
            column: column.to_string(),
            direction: Direction::Asc,
        });
        self
    }

    /// Add a descending ORDER BY.
    pub fn order_by_desc(mut self, column: &str) -> Self {
        self.orders.push(OrderClause {
            column: column.to_string(),
            direction: Direction::Desc,
        });
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    // ==================== Compilation ====================

    /// The binding list for a SELECT, in placeholder order.
    pub fn bindings(&self) -> Vec<Value> {
        let mut out = Vec::new();
        for clause in &self.wheres {
            clause.collect_bindings(&mut out);
        }
        for having in &self.havings {
            out.push(having.value.clone());
        }
        out
    }

    // ==================== Execution ====================

    /// Run the SELECT and return all rows.
    pub async fn get(self, conn: &mut Connection) -> Result<Vec<Row>> {
        let sql = conn.grammar().compile_select(&self)?;
        conn.select(&sql, &self.bindings()).await
    }

    /// Run the SELECT with `LIMIT 1` and return the first row, if any.
    pub async fn first(mut self, conn: &mut Connection) -> Result<Option<Row>> {
        self.limit = Some(1);
        Ok(self.get(conn).await?.into_iter().next())
    }

    /// Look up one row by `id`.
    pub async fn find(self, conn: &mut Connection, id: impl IntoValue) -> Result<Option<Row>> {
        self.and_eq("id", id).first(conn).await
    }

    /// Look up one row by `id`, erroring when absent.
    pub async fn find_or_fail(self, conn: &mut Connection, id: impl IntoValue) -> Result<Row> {
        let table = self.table.clone();
        let id = id.into_value();
        self.and_eq("id", id.clone())
            .first(conn)
            .await?
            .ok_or_else(|| Error::not_found(format!("no row in '{table}' with id {id:?}")))
    }

    /// Whether any row matches.
    pub async fn exists(self, conn: &mut Connection) -> Result<bool> {
        Ok(self.limit(1).get(conn).await?.into_iter().next().is_some())
    }

    /// Count matching rows.
    pub async fn count(mut self, conn: &mut Connection) -> Result<i64> {
        self.columns = vec!["count(*) as aggregate".to_string()];
        self.orders.clear();
        let row = self
            .get(conn)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::decode("aggregate", "count query returned no rows"))?;
        row.try_int("aggregate")
    }

    /// Collect one column from all matching rows.
    pub async fn pluck(mut self, conn: &mut Connection, column: &str) -> Result<Vec<Value>> {
        self.columns = vec![column.to_string()];
        let rows = self.get(conn).await?;
        rows.into_iter()
            .map(|row| row.try_get(column).cloned())
            .collect()
    }

    /// Insert one or more rows. The first row fixes the column order.
    pub async fn insert(
        self,
        conn: &mut Connection,
        rows: Vec<Vec<(String, Value)>>,
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let columns: Vec<String> = rows[0].iter().map(|(c, _)| c.clone()).collect();
        let (sql, bindings) = conn.grammar().compile_insert(&self.table, &columns, &rows)?;
        conn.statement(&sql, &bindings).await
    }

    /// Insert rows, updating `update_columns` on key conflict.
    ///
    /// `conflict_columns` are required by the `ON CONFLICT` dialect family
    /// and ignored by the `ON DUPLICATE KEY` family.
    pub async fn insert_or_update(
        self,
        conn: &mut Connection,
        rows: Vec<Vec<(String, Value)>>,
        conflict_columns: &[&str],
        update_columns: &[&str],
    ) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let columns: Vec<String> = rows[0].iter().map(|(c, _)| c.clone()).collect();
        let (sql, bindings) = conn.grammar().compile_upsert(
            &self.table,
            &columns,
            &rows,
            conflict_columns,
            update_columns,
        )?;
        conn.statement(&sql, &bindings).await
    }

    /// Update matching rows and return the affected count.
    pub async fn update(
        self,
        conn: &mut Connection,
        sets: Vec<(String, Value)>,
    ) -> Result<u64> {
        let (sql, bindings) = conn.grammar().compile_update(&self, &sets)?;
        conn.statement(&sql, &bindings).await
    }

    /// Delete matching rows and return the affected count.
    pub async fn delete(self, conn: &mut Connection) -> Result<u64> {
        let sql = conn.grammar().compile_delete(&self)?;
        conn.statement(&sql, &self.bindings()).await
    }

    /// Empty the table.
    pub async fn truncate(self, conn: &mut Connection) -> Result<()> {
        for (sql, bindings) in conn.grammar().compile_truncate(&self.table) {
            conn.statement(&sql, &bindings).await?;
        }
        Ok(())
    }
}
