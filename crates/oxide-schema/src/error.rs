//! Error types for the SQLite backend and its tooling.

use std::path::PathBuf;

use oxide_schema_core::{
    DefinitionError, QueryError, SchemaModificationError, SchemaReadError, SchemaUpdateError,
};

/// Errors that can occur while loading, reading or changing schemas.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Database error outside of a schema operation.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading definition files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A definition file is not valid JSON for a table definition.
    #[error("Failed to parse definition file '{path}': {source}")]
    Json {
        /// Path to the definition file.
        path: PathBuf,
        /// Parse error, including invariant violations.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid definition.
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    /// A query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Reading a live definition failed.
    #[error(transparent)]
    Read(#[from] SchemaReadError),

    /// A single schema change failed.
    #[error(transparent)]
    Modification(#[from] SchemaModificationError),

    /// Updating a table failed.
    #[error(transparent)]
    Update(#[from] SchemaUpdateError),
}

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
