//! Value types describing tables.
//!
//! Definitions are created by callers (the desired schema) or by a
//! [`TableDefinitionReader`](crate::reader::TableDefinitionReader) (the
//! observed schema). They carry no identity beyond structural equality.

mod field;
mod index;
mod table;
mod type_def;

pub use field::{DefaultValue, FieldAttribute, FieldDefinition};
pub use index::{IndexDefinition, IndexKind};
pub use table::TableDefinition;
pub use type_def::{TypeDefinition, TypeKind};
