//! SQLite backend for `oxide-schema-core`.
//!
//! SQLite can add a column but not drop one, and it keeps the DDL text of
//! every table in its catalog. This crate builds on both facts:
//!
//! - **Dialect** - DDL generation, emulating field removal by recreating the
//!   table (rename, create, copy rows, drop)
//! - **Reader** - parses the stored `CREATE TABLE`/`CREATE INDEX` text back
//!   into a [`TableDefinition`]
//! - **Modifier** - executes the DDL through sqlx, one transaction per
//!   operation, with an optional dry run
//! - **Query** - plain select/insert/update/delete over a `SqlitePool`
//!
//! # Example
//!
//! ```rust,no_run
//! use oxide_schema::prelude::*;
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! # async fn run() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let pool = SqlitePoolOptions::new().connect("sqlite:db.sqlite3").await?;
//! let modifier = SqliteSchemaModifier::new(pool);
//!
//! let desired = load_table_definition("items.json")?;
//! if modifier.table_exists(desired.name()).await? {
//!     let current = modifier.reader().read_definition(desired.name()).await?;
//!     SimpleTableSchemaUpdater::new(&modifier)
//!         .update_table(&current, &desired)
//!         .await?;
//! } else {
//!     modifier.create_table(&desired).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Print the live definition of a table as JSON
//! oxide-schema show items
//!
//! # Bring the live table in line with a JSON definition
//! oxide-schema sync items.json --indexes
//!
//! # Show the DDL without executing it
//! oxide-schema sync items.json --dry-run
//! ```

use std::path::Path;

use oxide_schema_core::TableDefinition;

pub mod dialect;
pub mod error;
pub mod escaper;
pub mod modifier;
pub mod query;
pub mod reader;

pub use error::{Result, SchemaError};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dialect::{SchemaSqlBuilder, SqliteSchemaSqlBuilder};
    pub use crate::error::{Result, SchemaError};
    pub use crate::escaper::SqliteEscaper;
    pub use crate::load_table_definition;
    pub use crate::modifier::SqliteSchemaModifier;
    pub use crate::query::SqliteQueryInterface;
    pub use crate::reader::SqliteTableDefinitionReader;
    pub use oxide_schema_core::prelude::*;
}

/// Loads a table definition from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a valid
/// table definition.
pub fn load_table_definition(path: impl AsRef<Path>) -> Result<TableDefinition> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| SchemaError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use oxide_schema_core::{IndexKind, TypeKind};

    use super::*;

    fn write_definition(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_table_definition() {
        let file = write_definition(
            r#"{
                "name": "items",
                "fields": [
                    {"name": "id", "type": {"kind": "integer"}, "nullable": false,
                     "attributes": ["autoincrement"]},
                    {"name": "label", "type": {"kind": "varchar", "size": 64}}
                ],
                "indexes": [
                    {"name": "PRIMARY", "columns": ["id"], "kind": "primary"}
                ]
            }"#,
        );

        let table = load_table_definition(file.path()).unwrap();
        assert_eq!(table.name(), "items");
        assert!(table.field("id").unwrap().is_auto_increment());
        assert_eq!(table.field("label").unwrap().type_def().size(), Some(64));
        assert_eq!(table.field("label").unwrap().type_def().kind(), TypeKind::Varchar);
        assert_eq!(table.primary_index().unwrap().kind(), IndexKind::Primary);
    }

    #[test]
    fn test_load_invalid_definition() {
        let file = write_definition(
            r#"{"name": "items", "fields": [
                {"name": "a", "type": {"kind": "integer"}},
                {"name": "a", "type": {"kind": "blob"}}
            ]}"#,
        );

        let err = load_table_definition(file.path()).unwrap_err();
        assert!(matches!(err, SchemaError::Json { .. }));
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table_definition("/nonexistent/items.json").unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }
}
