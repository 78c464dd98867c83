//! Capabilities for changing a live schema.

use crate::definitions::{FieldDefinition, IndexDefinition, TableDefinition};
use crate::error::{QueryError, SchemaModificationError};
use crate::query::BoxFuture;

/// Applies single field and index changes to an existing table.
///
/// Each call is one unit of work against the backend. Callers must not run
/// two modifications of the same table concurrently.
pub trait SchemaModifier: Send + Sync {
    /// Adds a field to the table.
    fn add_field<'a>(
        &'a self,
        table: &'a str,
        field: &'a FieldDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>>;

    /// Removes the named field from the table.
    fn remove_field<'a>(
        &'a self,
        table: &'a str,
        field_name: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>>;

    /// Adds an index to the table.
    fn add_index<'a>(
        &'a self,
        table: &'a str,
        index: &'a IndexDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>>;

    /// Removes the named index. Removing a missing index is not an error.
    fn remove_index<'a>(
        &'a self,
        table: &'a str,
        index_name: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>>;
}

impl<M: SchemaModifier + ?Sized> SchemaModifier for &M {
    fn add_field<'a>(
        &'a self,
        table: &'a str,
        field: &'a FieldDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        (**self).add_field(table, field)
    }

    fn remove_field<'a>(
        &'a self,
        table: &'a str,
        field_name: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        (**self).remove_field(table, field_name)
    }

    fn add_index<'a>(
        &'a self,
        table: &'a str,
        index: &'a IndexDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        (**self).add_index(table, index)
    }

    fn remove_index<'a>(
        &'a self,
        table: &'a str,
        index_name: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        (**self).remove_index(table, index_name)
    }
}

/// Creates and drops whole tables.
pub trait TableBuilder: Send + Sync {
    /// Returns whether the table exists.
    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, QueryError>>;

    /// Creates the table with all its indexes.
    fn create_table<'a>(
        &'a self,
        table: &'a TableDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>>;

    /// Drops the table.
    fn drop_table<'a>(&'a self, table: &'a str)
        -> BoxFuture<'a, Result<(), SchemaModificationError>>;
}
