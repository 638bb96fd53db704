//! Error types for quarry

use thiserror::Error;

/// Result type alias for quarry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum Error {
    /// Connection/configuration error (unsupported driver, missing config)
    #[error("Configuration error: {0}")]
    Config(String),

    /// SQL compilation error (unknown operator, unsupported operation for a dialect)
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Driver-level execution error, wrapped with the statement it came from
    #[error("Query error: {message} (sql: {sql}, bindings: {bindings})")]
    Query {
        message: String,
        sql: String,
        bindings: usize,
    },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Migration error (run/rollback failure, missing down, repository drift)
    #[error("Migration error: {0}")]
    Migration(String),

    /// Circular migration dependency
    #[error("Circular migration dependency: {0}")]
    CircularDependency(String),

    /// Mass assignment of a guarded attribute
    #[error("Mass assignment error: attribute '{0}' is not fillable")]
    MassAssignment(String),

    /// Lazy relation access while lazy loading is prevented
    #[error("Lazy loading violation: relation '{relation}' on '{model}' was not eager loaded")]
    LazyLoading { model: String, relation: String },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a compilation error for an unsupported construct
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Wrap a driver error with the statement that produced it
    pub fn query(message: impl Into<String>, sql: impl Into<String>, bindings: usize) -> Self {
        Self::Query {
            message: message.into(),
            sql: sql.into(),
            bindings,
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a compilation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }

    /// Check if this is a lazy loading violation
    pub fn is_lazy_loading(&self) -> bool {
        matches!(self, Self::LazyLoading { .. })
    }
}
