//! Reading table definitions from a live backend.
//!
//! Driver crates implement [`TableDefinitionReader`]; the core only defines
//! the trait so it stays driver-agnostic.

use crate::definitions::TableDefinition;
use crate::error::SchemaReadError;
use crate::query::BoxFuture;

/// Reconstructs the [`TableDefinition`] of an existing table.
pub trait TableDefinitionReader: Send + Sync {
    /// Reads the definition of the table with the given logical name.
    ///
    /// Fails with [`SchemaReadError::TableNotFound`] when there is no such
    /// table.
    fn read_definition<'a>(
        &'a self,
        table: &'a str,
    ) -> BoxFuture<'a, Result<TableDefinition, SchemaReadError>>;
}
