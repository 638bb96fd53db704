//! # quarry
//!
//! A multi-dialect (MySQL / PostgreSQL / SQLite) database access toolkit.
//!
//! ## Features
//!
//! - **Fluent query builder**: clauses accumulate as data; a per-dialect
//!   grammar compiles them to SQL with positional `?` placeholders
//! - **Blueprint schema builder**: describe columns, indexes, and foreign
//!   keys once; each dialect grammar emits its own DDL
//! - **Migrations**: dependency-ordered execution, batch rollback, and
//!   SHA-256 checksum drift detection
//! - **Models and relations**: attribute-bag models with dirty tracking,
//!   plus N+1-safe eager and auto-eager relation loading
//! - **Explicit state**: connections, grammars, and model behavior are
//!   passed in; there is no global registry
//!
//! ## Query builder
//!
//! ```ignore
//! use quarry::query::QueryBuilder;
//!
//! let users = QueryBuilder::new("users")
//!     .and_eq("status", "active")
//!     .where_in("role_id", vec![1, 2, 3])
//!     .order_by_desc("created_at")
//!     .limit(10)
//!     .get(&mut conn)
//!     .await?;
//! ```
//!
//! ## Schema builder
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

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod grammar;
pub mod migrate;
pub mod model;
pub mod query;
pub mod relations;
pub mod row;
pub mod schema;
pub mod value;

pub use client::Client;
pub use config::{ConnectionConfig, Driver};
pub use connection::{Connection, ConnectionManager, QueryLogEntry};
pub use error::{Error, Result};
pub use grammar::{Grammar, MySqlGrammar, PostgresGrammar, SqliteGrammar};
pub use migrate::{
    Migration, MigrationRepository, MigrationStatus, Migrator, RollbackReport, RunReport,
};
pub use model::{Collection, Model, ModelConfig, ModelQuery, Related};
pub use query::QueryBuilder;
pub use relations::Relation;
pub use row::{FromRow, Row};
pub use schema::{Blueprint, Schema, SchemaBuilder};
pub use value::{IntoValue, Value};
