//! SQLite dialect.
//!
//! SQLite cannot drop a column in the versions this dialect targets, so
//! removing a field uses the "table recreation" strategy: rename the table,
//! create the replacement, recreate the surviving indexes, copy the rows and
//! drop the renamed original. All statements form one DDL string.

use oxide_schema_core::{
    Escaper, FieldAttribute, FieldDefinition, IndexDefinition, IndexKind, TableDefinition,
    TableNameFormatter, TablePrefix, TypeKind,
};

use super::SchemaSqlBuilder;
use crate::escaper::SqliteEscaper;
use crate::query::quote_identifier;

/// Suffix of the renamed original table during recreation.
const TMP_SUFFIX: &str = "_tmp";

/// SQLite DDL builder.
#[derive(Debug, Clone, Default)]
pub struct SqliteSchemaSqlBuilder<E = SqliteEscaper, F = TablePrefix> {
    escaper: E,
    formatter: F,
}

impl SqliteSchemaSqlBuilder {
    /// Creates a builder with the SQLite escaper and no table prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder prefixing every table name.
    #[must_use]
    pub const fn with_prefix(prefix: TablePrefix) -> Self {
        Self {
            escaper: SqliteEscaper,
            formatter: prefix,
        }
    }
}

impl<E: Escaper, F: TableNameFormatter> SqliteSchemaSqlBuilder<E, F> {
    /// Returns the table-name formatter.
    #[must_use]
    pub const fn formatter(&self) -> &F {
        &self.formatter
    }

    /// Returns the type keyword used for a kind.
    const fn type_keyword(kind: TypeKind) -> &'static str {
        match kind {
            TypeKind::Integer => "INT",
            TypeKind::BigInt => "BIGINT",
            TypeKind::TinyInt => "TINYINT",
            TypeKind::Float => "FLOAT",
            TypeKind::Decimal => "DECIMAL",
            TypeKind::Blob => "BLOB",
            TypeKind::Varchar => "VARCHAR",
        }
    }

    fn type_sql(field: &FieldDefinition) -> String {
        // AUTOINCREMENT is only accepted on an INTEGER PRIMARY KEY.
        if field.is_auto_increment() {
            return "INTEGER PRIMARY KEY AUTOINCREMENT".to_string();
        }

        let ty = field.type_def();
        let mut sql = Self::type_keyword(ty.kind()).to_string();
        if let Some(size) = ty.size() {
            sql.push_str(&format!("({size})"));
        }
        if field.has_attribute(FieldAttribute::Unsigned) {
            sql.push_str(" UNSIGNED");
        }
        sql
    }

    /// Whether the primary index is already expressed by an inline
    /// `PRIMARY KEY AUTOINCREMENT` column.
    fn primary_is_inline(table: &TableDefinition, primary: &IndexDefinition) -> bool {
        match primary.columns() {
            [column] => table
                .field(column)
                .is_some_and(FieldDefinition::is_auto_increment),
            _ => false,
        }
    }

    fn index_statement(table_name: &str, index_name: &str, index: &IndexDefinition) -> String {
        let unique = match index.kind() {
            IndexKind::Primary | IndexKind::Unique => "UNIQUE ",
            IndexKind::Index => "",
        };
        format!(
            "CREATE {unique}INDEX {index_name} ON {table_name} ({});",
            index.columns().join(",")
        )
    }

    /// Create-table path shared by table creation and recreation.
    fn create_table_statements(&self, table_name: &str, table: &TableDefinition) -> String {
        let mut columns: Vec<String> = table
            .fields()
            .values()
            .map(|field| self.field_sql(field))
            .collect();

        if let Some(primary) = table.primary_index() {
            if !Self::primary_is_inline(table, primary) {
                columns.push(format!("PRIMARY KEY ({})", primary.columns().join(", ")));
            }
        }

        let mut sql = format!("CREATE TABLE {table_name} ({});", columns.join(", "));
        for index in table.indexes().values().filter(|i| !i.is_primary()) {
            sql.push_str(&Self::index_statement(table_name, index.name(), index));
        }
        sql
    }
}

impl<E: Escaper, F: TableNameFormatter> SchemaSqlBuilder for SqliteSchemaSqlBuilder<E, F> {
    fn field_sql(&self, field: &FieldDefinition) -> String {
        let mut parts = vec![field.name().to_string(), Self::type_sql(field)];

        let default = field.default_value();
        if default.is_set() {
            parts.push(format!("DEFAULT {}", self.escaper.escape_value(default)));
        }

        parts.push(if field.is_nullable() { "NULL" } else { "NOT NULL" }.to_string());
        parts.join(" ")
    }

    fn create_table_sql(&self, table: &TableDefinition) -> String {
        let table_name = self.formatter.format_table_name(table.name());
        self.create_table_statements(&table_name, table)
    }

    fn drop_table_sql(&self, table: &str) -> String {
        format!("DROP TABLE {}", self.formatter.format_table_name(table))
    }

    fn add_field_sql(&self, table: &str, field: &FieldDefinition) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {}",
            self.formatter.format_table_name(table),
            self.field_sql(field)
        )
    }

    fn remove_field_sql(&self, current: &TableDefinition, field_name: &str) -> String {
        let remaining = current
            .indexes()
            .values()
            .filter(|index| index.references(field_name))
            .fold(current.mutate_field_away(field_name), |table, index| {
                table.mutate_index_away(index.name())
            });
        self.recreate_table_sql(current, &remaining)
    }

    fn recreate_table_sql(
        &self,
        current: &TableDefinition,
        replacement: &TableDefinition,
    ) -> String {
        let table_name = self.formatter.format_table_name(current.name());
        let tmp_name = format!("{table_name}{TMP_SUFFIX}");

        let columns = replacement
            .fields()
            .keys()
            .filter(|name| current.has_field_with_name(name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!("ALTER TABLE {table_name} RENAME TO {tmp_name};");
        sql.push_str(&self.create_table_statements(&table_name, replacement));
        sql.push_str(&format!(
            "INSERT INTO {table_name}({columns}) SELECT {columns} FROM {tmp_name};"
        ));
        sql.push_str(&format!("DROP TABLE {tmp_name};"));
        sql
    }

    fn add_index_sql(&self, table: &str, index: &IndexDefinition) -> String {
        Self::index_statement(&self.formatter.format_table_name(table), index.name(), index)
    }

    fn create_index_statement(&self, table: &str, index: &IndexDefinition) -> String {
        Self::index_statement(
            &self.formatter.format_table_name(table),
            &quote_identifier(index.name()),
            index,
        )
    }

    fn remove_index_sql(&self, table: &str, index_name: &str) -> String {
        format!(
            "DROP INDEX IF EXISTS {}.{index_name}",
            self.formatter.format_table_name(table)
        )
    }

    fn drop_index_statement(&self, index_name: &str) -> String {
        format!("DROP INDEX IF EXISTS {}", quote_identifier(index_name))
    }
}
