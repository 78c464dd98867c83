//! Error types for definitions, queries and schema modifications.

use crate::definitions::TableDefinition;
use crate::query::{Conditions, Values};

/// Boxed error used as the source of backend failures.
///
/// The core stays driver-agnostic, so backend errors (sqlx, IO, ...) are
/// carried behind this alias.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A definition was constructed from malformed input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// A table, field or index was given an empty name.
    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    /// Two fields of the same table share a name.
    #[error("Table '{table}' declares field '{field}' more than once")]
    DuplicateField {
        /// Table name.
        table: String,
        /// The repeated field name.
        field: String,
    },

    /// Two indexes of the same table share a name.
    #[error("Table '{table}' declares index '{index}' more than once")]
    DuplicateIndex {
        /// Table name.
        table: String,
        /// The repeated index name.
        index: String,
    },

    /// More than one index of kind PRIMARY.
    #[error("Table '{table}' has more than one primary index ('{first}' and '{second}')")]
    MultiplePrimaryIndexes {
        /// Table name.
        table: String,
        /// The primary index seen first.
        first: String,
        /// The second primary index.
        second: String,
    },

    /// An auto-increment field that is not a plain, signed INTEGER.
    #[error("Auto-increment field '{field}' of table '{table}' must be a signed INTEGER, not {ty}")]
    AutoIncrementType {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
        /// The rejected type, as rendered in DDL.
        ty: String,
    },

    /// An auto-increment field that is not the only column of the PRIMARY
    /// index.
    #[error("Auto-increment field '{field}' of table '{table}' must be the sole primary key column")]
    AutoIncrementNotPrimary {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
    },

    /// An index without any column.
    #[error("Index '{0}' must cover at least one column")]
    EmptyIndex(String),

    /// A size was given to a type kind that does not take one.
    #[error("Type {kind} does not take a size (got {size})")]
    UnexpectedSize {
        /// The type keyword.
        kind: &'static str,
        /// The rejected size.
        size: u32,
    },
}

/// A query against the backend failed.
///
/// Every variant keeps what was attempted so callers can report it.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Checking for the existence of a table failed.
    #[error("Could not check whether table '{table}' exists: {source}")]
    TableExistsFailed {
        /// Table name.
        table: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// A select failed.
    #[error("Select from '{table}' failed: {source}")]
    SelectFailed {
        /// Table name.
        table: String,
        /// Selected fields.
        fields: Vec<String>,
        /// Conditions of the select.
        conditions: Conditions,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// An insert failed.
    #[error("Insert into '{table}' failed: {source}")]
    InsertFailed {
        /// Table name.
        table: String,
        /// Values that were to be inserted.
        values: Values,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// An update failed.
    #[error("Update of '{table}' failed: {source}")]
    UpdateFailed {
        /// Table name.
        table: String,
        /// New values.
        values: Values,
        /// Conditions selecting the updated rows.
        conditions: Conditions,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// A delete failed.
    #[error("Delete from '{table}' failed: {source}")]
    DeleteFailed {
        /// Table name.
        table: String,
        /// Conditions selecting the deleted rows.
        conditions: Conditions,
        /// Backend error.
        #[source]
        source: BoxError,
    },
}

/// Reading a table definition from a live backend failed.
#[derive(Debug, thiserror::Error)]
pub enum SchemaReadError {
    /// The table does not exist.
    #[error("Table '{0}' does not exist")]
    TableNotFound(String),

    /// The stored DDL could not be turned into a definition.
    #[error("Cannot read definition of table '{table}' from `{sql}`: {reason}")]
    MalformedDefinition {
        /// Table name.
        table: String,
        /// The offending DDL text.
        sql: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The catalog query failed.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The parsed pieces do not form a valid definition.
    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// A single add/remove operation against a live table failed.
#[derive(Debug, thiserror::Error)]
pub enum SchemaModificationError {
    /// Adding a field failed.
    #[error("Could not add field '{field}' to table '{table}': {source}")]
    FieldAdditionFailed {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// Removing a field failed.
    #[error("Could not remove field '{field}' from table '{table}': {source}")]
    FieldRemovalFailed {
        /// Table name.
        table: String,
        /// Field name.
        field: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// Adding an index failed.
    #[error("Could not add index '{index}' to table '{table}': {source}")]
    IndexAdditionFailed {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// Removing an index failed.
    #[error("Could not remove index '{index}' from table '{table}': {source}")]
    IndexRemovalFailed {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// Creating a table failed.
    #[error("Could not create table '{table}': {source}")]
    TableCreationFailed {
        /// Table name.
        table: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// Dropping a table failed.
    #[error("Could not drop table '{table}': {source}")]
    TableDeletionFailed {
        /// Table name.
        table: String,
        /// Backend error.
        #[source]
        source: BoxError,
    },

    /// The change would leave the table with an invalid definition.
    #[error("Change to table '{table}' is not a valid definition: {source}")]
    InvalidChange {
        /// Table name.
        table: String,
        /// Why the changed definition is rejected.
        #[source]
        source: DefinitionError,
    },

    /// The current definition, needed to rebuild the table, could not be read.
    #[error("Definition of table '{table}' is unavailable: {source}")]
    DefinitionUnavailable {
        /// Table name.
        table: String,
        /// Read error.
        #[source]
        source: SchemaReadError,
    },
}

/// Bringing a table in line with a desired definition failed.
#[derive(Debug, thiserror::Error)]
pub enum SchemaUpdateError {
    /// The current and desired definitions describe different tables.
    #[error("Cannot update table '{current_name}' to '{new_name}': the tables need to have the same name")]
    Mismatch {
        /// Name of the current definition.
        current_name: String,
        /// Name of the desired definition.
        new_name: String,
    },

    /// A modification failed part way through; earlier ones are not undone.
    #[error("Updating table '{}' failed: {message}", .current.name())]
    Failed {
        /// The definition the update started from.
        current: Box<TableDefinition>,
        /// The definition the update was heading to.
        new: Box<TableDefinition>,
        /// Message of the underlying failure.
        message: String,
        /// The failed modification.
        #[source]
        source: SchemaModificationError,
    },
}

/// Result type for definition construction.
pub type Result<T> = std::result::Result<T, DefinitionError>;
