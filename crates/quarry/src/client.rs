//! Generic client trait for unified database access.

use async_trait::async_trait;

use crate::error::Result;
use crate::row::Row;
use crate::value::Value;

/// A prepared-statement-capable database handle.
///
/// This is the seam between the toolkit and the actual wire driver: a
/// [`Connection`](crate::connection::Connection) owns one boxed `Client`
/// and routes every compiled statement through it. Drivers adapt `?`
/// placeholders and [`Value`] bindings to their own protocol.
#[async_trait]
pub trait Client: Send + Sync {
    /// Execute a query and return all rows.
    async fn query(&mut self, sql: &str, bindings: &[Value]) -> Result<Vec<Row>>;

    /// Execute a statement and return the number of affected rows.
    async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<u64>;

    /// Whether a transaction is actually open on the underlying handle.
    ///
    /// DDL on some dialects commits implicitly mid-transaction; the
    /// connection re-checks this before issuing COMMIT or ROLLBACK.
    fn in_transaction(&self) -> bool;
}
