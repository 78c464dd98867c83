#![allow(dead_code)]

use oxide_schema::prelude::*;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub async fn pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap_or_else(|e| panic!("Failed to open in-memory database: {e}"))
}

#[must_use]
pub fn field(name: &str, kind: impl Into<TypeDefinition>) -> FieldDefinition {
    FieldDefinition::new(name, kind).unwrap()
}

#[must_use]
pub fn index(name: &str, columns: &[&str], kind: IndexKind) -> IndexDefinition {
    IndexDefinition::new(name, columns.iter().copied(), kind).unwrap()
}

#[must_use]
pub fn different_field_types() -> TableDefinition {
    TableDefinition::with_fields(
        "different_field_types",
        [
            field("intfield", TypeKind::Integer),
            field("floatfield", TypeKind::Float),
            field("textfield", TypeKind::Blob),
            field("tinyintfield", TypeKind::TinyInt),
        ],
    )
    .unwrap()
}

#[must_use]
pub fn autoinc_field() -> TableDefinition {
    TableDefinition::new(
        "autoinc_field",
        [field("autoinc", TypeKind::Integer).not_null().auto_increment()],
        [index("PRIMARY", &["autoinc"], IndexKind::Primary)],
    )
    .unwrap()
}

#[must_use]
pub fn not_null_fields() -> TableDefinition {
    TableDefinition::with_fields(
        "not_null_fields",
        [
            field("intfield", TypeKind::Integer)
                .not_null()
                .default(DefaultValue::Integer(42)),
            field("textfield", TypeKind::Blob).not_null(),
        ],
    )
    .unwrap()
}

#[must_use]
pub fn default_field_values_and_indexes() -> TableDefinition {
    TableDefinition::new(
        "default_field_values_and_indexes",
        [
            field("textfield", TypeKind::Blob).not_null(),
            field("intfield", TypeKind::Integer)
                .not_null()
                .default(DefaultValue::Integer(3)),
            field("floatfield", TypeKind::Float),
            field("tinyintfield", TypeKind::TinyInt)
                .not_null()
                .default(DefaultValue::Integer(1)),
        ],
        [
            index("PRIMARY", &["intfield"], IndexKind::Primary),
            index("uniqueIndexName", &["floatfield"], IndexKind::Unique),
            index("somename", &["intfield", "floatfield"], IndexKind::Index),
        ],
    )
    .unwrap()
}

#[must_use]
pub fn statements() -> TableDefinition {
    TableDefinition::new(
        "statements",
        [
            field("row_id", TypeKind::Integer).not_null().auto_increment(),
            field("entity_type", TypeDefinition::varchar(8)).not_null(),
            field("entity_id", TypeDefinition::varchar(16)).not_null(),
            field("property_id", TypeDefinition::varchar(16)).not_null(),
            field("statement_rank", TypeKind::TinyInt).not_null(),
            field("value", TypeKind::Decimal).not_null(),
        ],
        [
            index("PRIMARY", &["row_id"], IndexKind::Primary),
            index("entity_id_index", &["entity_id"], IndexKind::Index),
            index("property_id_index", &["property_id"], IndexKind::Index),
            index(
                "value_property",
                &["value", "property_id", "entity_id"],
                IndexKind::Unique,
            ),
            index("value", &["value"], IndexKind::Index),
        ],
    )
    .unwrap()
}

#[must_use]
pub fn reference_tables() -> Vec<TableDefinition> {
    vec![
        different_field_types(),
        autoinc_field(),
        not_null_fields(),
        default_field_values_and_indexes(),
        statements(),
    ]
}
