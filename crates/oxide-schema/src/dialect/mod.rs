//! Backend DDL generation.
//!
//! Each dialect turns table definitions and single field/index changes into
//! the DDL text its backend needs, emulating what the backend cannot do
//! natively.

mod sqlite;

pub use sqlite::SqliteSchemaSqlBuilder;

use oxide_schema_core::{FieldDefinition, IndexDefinition, TableDefinition};

/// Trait for backend-specific DDL generation.
///
/// Table names are logical names; implementations format them themselves.
pub trait SchemaSqlBuilder: Send + Sync {
    /// Returns the column definition of a field.
    fn field_sql(&self, field: &FieldDefinition) -> String;

    /// Returns the DDL creating a table together with its indexes.
    fn create_table_sql(&self, table: &TableDefinition) -> String;

    /// Returns the DDL dropping a table.
    fn drop_table_sql(&self, table: &str) -> String;

    /// Returns the DDL adding a field to a table.
    fn add_field_sql(&self, table: &str, field: &FieldDefinition) -> String;

    /// Returns the DDL removing a field from `current`.
    fn remove_field_sql(&self, current: &TableDefinition, field_name: &str) -> String;

    /// Returns the DDL rebuilding `current` as `replacement`, keeping the rows
    /// of the fields both share.
    fn recreate_table_sql(
        &self,
        current: &TableDefinition,
        replacement: &TableDefinition,
    ) -> String;

    /// Returns the DDL adding an index to a table.
    fn add_index_sql(&self, table: &str, index: &IndexDefinition) -> String;

    /// Returns the DDL removing an index. Must not fail on a missing index.
    fn remove_index_sql(&self, table: &str, index_name: &str) -> String;

    /// Returns a standalone statement creating an index under its quoted
    /// name.
    fn create_index_statement(&self, table: &str, index: &IndexDefinition) -> String;

    /// Returns a standalone statement dropping an index by its own quoted
    /// name.
    fn drop_index_statement(&self, index_name: &str) -> String;
}
