//! Connection: one database handle plus transaction and logging state.
//!
//! Nested transactions are emulated with savepoints: only the outermost
//! `begin_transaction` opens a real transaction, inner calls push a named
//! savepoint. Commit and rollback at depth 1 re-check whether a
//! transaction is still open first, because DDL commits implicitly on
//! some dialects.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use crate::client::Client;
use crate::config::{ConnectionConfig, Driver};
use crate::error::{Error, Result};
use crate::grammar::{self, Grammar};
use crate::row::Row;
use crate::schema::grammar::{self as schema_grammar, SchemaGrammar};
use crate::value::Value;

/// One recorded statement, when query logging is enabled.
#[derive(Debug, Clone)]
pub struct QueryLogEntry {
    pub sql: String,
    pub bindings: usize,
    pub elapsed_ms: u128,
    pub at: chrono::NaiveDateTime,
}

/// A live connection: one client handle, the matching grammar pair, and
/// unsynchronized transaction/log state.
pub struct Connection {
    client: Box<dyn Client>,
    grammar: Box<dyn Grammar>,
    schema_grammar: Box<dyn SchemaGrammar>,
    driver: Driver,
    tx_depth: usize,
    logging: bool,
    query_log: Vec<QueryLogEntry>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("driver", &self.driver)
            .field("tx_depth", &self.tx_depth)
            .field("logging", &self.logging)
            .field("query_log", &self.query_log)
            .finish_non_exhaustive()
    }
}

impl Connection {
    /// Wrap a driver handle with the grammar pair for `driver`.
    pub fn new(driver: Driver, client: Box<dyn Client>) -> Self {
        Self {
            client,
            grammar: grammar::for_driver(driver),
            schema_grammar: schema_grammar::for_driver(driver),
            driver,
            tx_depth: 0,
            logging: false,
            query_log: Vec::new(),
        }
    }

    /// The driver this connection speaks.
    pub fn driver(&self) -> Driver {
        self.driver
    }

    /// The DML/DQL grammar for this connection.
    pub fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    /// The DDL grammar for this connection.
    pub fn schema_grammar(&self) -> &dyn SchemaGrammar {
        self.schema_grammar.as_ref()
    }

    /// Current nested-transaction depth.
    pub fn transaction_depth(&self) -> usize {
        self.tx_depth
    }

    // ==================== Statement execution ====================

    /// Run a query and return its rows, with SQL context on failure.
    pub async fn select(&mut self, sql: &str, bindings: &[Value]) -> Result<Vec<Row>> {
        let started = Instant::now();
        let result = self.client.query(sql, bindings).await;
        self.record(sql, bindings.len(), started);
        result.map_err(|e| Error::query(e.to_string(), sql, bindings.len()))
    }

    /// Run a statement and return the affected row count.
    pub async fn statement(&mut self, sql: &str, bindings: &[Value]) -> Result<u64> {
        let started = Instant::now();
        let result = self.client.execute(sql, bindings).await;
        self.record(sql, bindings.len(), started);
        result.map_err(|e| Error::query(e.to_string(), sql, bindings.len()))
    }

    fn record(&mut self, sql: &str, bindings: usize, started: Instant) {
        let elapsed_ms = started.elapsed().as_millis();
        tracing::debug!(target: "quarry::sql", sql, bindings, elapsed_ms, "statement");
        if self.logging {
            self.query_log.push(QueryLogEntry {
                sql: sql.to_string(),
                bindings,
                elapsed_ms,
                at: chrono::Utc::now().naive_utc(),
            });
        }
    }

    // ==================== Query log ====================

    /// Start recording executed statements.
    pub fn enable_query_log(&mut self) {
        self.logging = true;
    }

    /// Stop recording executed statements.
    pub fn disable_query_log(&mut self) {
        self.logging = false;
    }

    /// Drain and return the recorded statements.
    pub fn flush_query_log(&mut self) -> Vec<QueryLogEntry> {
        std::mem::take(&mut self.query_log)
    }

    // ==================== Transactions ====================

    fn savepoint_name(depth: usize) -> String {
        format!("quarry_sp_{depth}")
    }

    /// Open a transaction, or push a savepoint when one is already open.
    pub async fn begin_transaction(&mut self) -> Result<()> {
        if self.tx_depth == 0 {
            self.statement("BEGIN", &[]).await?;
        } else {
            let name = Self::savepoint_name(self.tx_depth);
            self.statement(&format!("SAVEPOINT {name}"), &[]).await?;
        }
        self.tx_depth += 1;
        Ok(())
    }

    /// Commit the current transaction level.
    ///
    /// At depth 1 this commits for real, unless DDL already committed
    /// implicitly. At deeper levels it only pops the savepoint counter.
    pub async fn commit(&mut self) -> Result<()> {
        match self.tx_depth {
            0 => Err(Error::Other("commit outside of a transaction".to_string())),
            1 => {
                if self.client.in_transaction() {
                    self.statement("COMMIT", &[]).await?;
                }
                self.tx_depth = 0;
                Ok(())
            }
            _ => {
                self.tx_depth -= 1;
                Ok(())
            }
        }
    }

    /// Roll back the current transaction level.
    pub async fn rollback(&mut self) -> Result<()> {
        match self.tx_depth {
            0 => Err(Error::Other("rollback outside of a transaction".to_string())),
            1 => {
                if self.client.in_transaction() {
                    self.statement("ROLLBACK", &[]).await?;
                }
                self.tx_depth = 0;
                Ok(())
            }
            depth => {
                let name = Self::savepoint_name(depth - 1);
                self.statement(&format!("ROLLBACK TO SAVEPOINT {name}"), &[])
                    .await?;
                self.tx_depth -= 1;
                Ok(())
            }
        }
    }

    /// Run `f` inside a transaction: commit on `Ok`, roll back and
    /// rethrow on `Err`. The caller owns any retry policy.
    pub async fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: for<'c> FnOnce(
            &'c mut Connection,
        ) -> Pin<Box<dyn Future<Output = Result<T>> + Send + 'c>>,
    {
        self.begin_transaction().await?;
        let result = f(self).await;
        match result {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(error) => {
                self.rollback().await?;
                Err(error)
            }
        }
    }
}

/// Factory resolving a configuration to a driver handle.
pub type ClientFactory =
    Box<dyn Fn(&ConnectionConfig) -> Result<Box<dyn Client>> + Send + Sync>;

/// Named-connection registry. Connections are created lazily on first
/// use and cached until `disconnect`/`reconnect`.
pub struct ConnectionManager {
    configs: HashMap<String, ConnectionConfig>,
    factory: ClientFactory,
    connections: HashMap<String, Connection>,
}

impl ConnectionManager {
    pub fn new(factory: ClientFactory) -> Self {
        Self {
            configs: HashMap::new(),
            factory,
            connections: HashMap::new(),
        }
    }

    /// Register a named connection configuration.
    pub fn add_connection(&mut self, name: impl Into<String>, config: ConnectionConfig) {
        self.configs.insert(name.into(), config);
    }

    /// Resolve a named connection, creating it on first use.
    pub fn connection(&mut self, name: &str) -> Result<&mut Connection> {
        if !self.connections.contains_key(name) {
            let config = self
                .configs
                .get(name)
                .ok_or_else(|| Error::config(format!("connection '{name}' is not configured")))?;
            let client = (self.factory)(config)?;
            self.connections
                .insert(name.to_string(), Connection::new(config.driver, client));
        }
        Ok(self.connections.get_mut(name).expect("just inserted"))
    }

    /// Drop a cached connection; the next use recreates it.
    pub fn disconnect(&mut self, name: &str) {
        self.connections.remove(name);
    }

    /// Tear down and recreate a named connection.
    pub fn reconnect(&mut self, name: &str) -> Result<&mut Connection> {
        self.disconnect(name);
        self.connection(name)
    }
}
