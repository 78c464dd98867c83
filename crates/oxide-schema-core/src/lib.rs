//! Abstract table definitions and schema reconciliation.
//!
//! `oxide-schema-core` describes tables independently of any backend and
//! reconciles such a description with a live table:
//!
//! - **Definitions** - immutable [`TableDefinition`], [`FieldDefinition`],
//!   [`IndexDefinition`] and [`TypeDefinition`] values with checked invariants
//! - **Updater** - diffs a current and a desired definition by field name and
//!   drives a [`SchemaModifier`]
//! - **Collaborators** - traits for the backend side: [`SchemaModifier`],
//!   [`TableBuilder`], [`TableDefinitionReader`], [`QueryInterface`],
//!   [`Escaper`] and [`TableNameFormatter`]
//!
//! Backends (see the `oxide-schema` crate for SQLite) implement the
//! collaborator traits.
//!
//! # Example
//!
//! ```rust
//! use oxide_schema_core::prelude::*;
//!
//! let table = TableDefinition::new(
//!     "items",
//!     [
//!         FieldDefinition::new("id", TypeKind::Integer)?
//!             .not_null()
//!             .auto_increment(),
//!         FieldDefinition::new("label", TypeDefinition::varchar(64))?,
//!     ],
//!     [IndexDefinition::new("PRIMARY", ["id"], IndexKind::Primary)?],
//! )?;
//!
//! let smaller = table.mutate_field_away("label");
//! assert!(table.has_field_with_name("label"));
//! assert!(!smaller.has_field_with_name("label"));
//! # Ok::<(), DefinitionError>(())
//! ```

pub mod definitions;
pub mod error;
pub mod escape;
pub mod modifier;
pub mod query;
pub mod reader;
pub mod updater;

pub use definitions::{
    DefaultValue, FieldAttribute, FieldDefinition, IndexDefinition, IndexKind, TableDefinition,
    TypeDefinition, TypeKind,
};
pub use error::{
    BoxError, DefinitionError, QueryError, SchemaModificationError, SchemaReadError,
    SchemaUpdateError,
};
pub use escape::{Escaper, TableNameFormatter, TablePrefix};
pub use modifier::{SchemaModifier, TableBuilder};
pub use query::{BoxFuture, Conditions, QueryInterface, Row, SelectOptions, Value, Values};
pub use reader::TableDefinitionReader;
pub use updater::{SimpleTableSchemaUpdater, TableSchemaUpdater};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::definitions::{
        DefaultValue, FieldAttribute, FieldDefinition, IndexDefinition, IndexKind,
        TableDefinition, TypeDefinition, TypeKind,
    };
    pub use crate::error::{
        DefinitionError, QueryError, SchemaModificationError, SchemaReadError,
        SchemaUpdateError,
    };
    pub use crate::escape::{Escaper, TableNameFormatter, TablePrefix};
    pub use crate::modifier::{SchemaModifier, TableBuilder};
    pub use crate::query::{QueryInterface, SelectOptions, Value};
    pub use crate::reader::TableDefinitionReader;
    pub use crate::updater::{SimpleTableSchemaUpdater, TableSchemaUpdater};
}
