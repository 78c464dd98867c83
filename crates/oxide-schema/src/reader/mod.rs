//! Reading table definitions back from the SQLite catalog.
//!
//! SQLite keeps the DDL text of every table and index in `sqlite_master`.
//! The reader selects that text through a [`QueryInterface`] and parses it
//! into a [`TableDefinition`].

mod lexer;
mod parser;

pub use lexer::{Lexer, SyntaxError, Token};
pub use parser::{parse_create_index, parse_create_table, ParsedTable, PRIMARY_INDEX_NAME};

use oxide_schema_core::query::conditions;
use oxide_schema_core::{
    BoxFuture, IndexDefinition, QueryInterface, SchemaReadError, SelectOptions, TableDefinition,
    TableDefinitionReader, TableNameFormatter, TablePrefix, Value,
};
use tracing::debug;

/// The SQLite catalog table.
const SQLITE_MASTER: &str = "sqlite_master";

/// Reads definitions of SQLite tables.
#[derive(Debug, Clone)]
pub struct SqliteTableDefinitionReader<Q, F = TablePrefix> {
    query: Q,
    formatter: F,
}

impl<Q: QueryInterface> SqliteTableDefinitionReader<Q> {
    /// Creates a reader for unprefixed tables.
    #[must_use]
    pub fn new(query: Q) -> Self {
        Self {
            query,
            formatter: TablePrefix::default(),
        }
    }
}

impl<Q: QueryInterface, F: TableNameFormatter> SqliteTableDefinitionReader<Q, F> {
    /// Creates a reader formatting table names with `formatter`.
    #[must_use]
    pub const fn with_formatter(query: Q, formatter: F) -> Self {
        Self { query, formatter }
    }

    async fn read(&self, table: &str) -> Result<TableDefinition, SchemaReadError> {
        let name = self.formatter.format_table_name(table);
        if !self.query.table_exists(&name).await? {
            return Err(SchemaReadError::TableNotFound(name));
        }

        let table_rows = self
            .query
            .select(
                SQLITE_MASTER,
                &["sql"],
                &conditions([("type", "table"), ("name", name.as_str())]),
                &SelectOptions::new().limit(1),
            )
            .await?;
        let sql = table_rows
            .first()
            .and_then(|row| row.get("sql"))
            .and_then(Value::as_text)
            .ok_or_else(|| SchemaReadError::TableNotFound(name.clone()))?;
        debug!("Parsing definition of {name}: {sql}");

        let parsed = parse_create_table(sql).map_err(|e| malformed(&name, sql, e))?;

        let index_rows = self
            .query
            .select(
                SQLITE_MASTER,
                &["sql", "name"],
                &conditions([("type", "index"), ("tbl_name", name.as_str())]),
                &SelectOptions::new(),
            )
            .await?;

        let mut indexes: Vec<IndexDefinition> = Vec::new();
        for row in &index_rows {
            // Automatic indexes backing constraints have no SQL.
            let Some(index_sql) = row.get("sql").and_then(Value::as_text) else {
                continue;
            };
            let index = parse_create_index(index_sql).map_err(|e| malformed(&name, index_sql, e))?;
            let shadows_primary = parsed
                .primary
                .as_ref()
                .is_some_and(|primary| primary.name() == index.name());
            if !shadows_primary {
                indexes.push(index);
            }
        }
        indexes.extend(parsed.primary);

        Ok(TableDefinition::new(table, parsed.fields, indexes)?)
    }
}

fn malformed(table: &str, sql: &str, err: SyntaxError) -> SchemaReadError {
    match err {
        SyntaxError::Definition(e) => SchemaReadError::Definition(e),
        other => SchemaReadError::MalformedDefinition {
            table: table.to_string(),
            sql: sql.to_string(),
            reason: other.to_string(),
        },
    }
}

impl<Q: QueryInterface, F: TableNameFormatter> TableDefinitionReader
    for SqliteTableDefinitionReader<Q, F>
{
    fn read_definition<'a>(
        &'a self,
        table: &'a str,
    ) -> BoxFuture<'a, Result<TableDefinition, SchemaReadError>> {
        Box::pin(self.read(table))
    }
}

#[cfg(test)]
mod tests {
    use oxide_schema_core::{
        Conditions, DefaultValue, FieldDefinition, IndexKind, QueryError, Row, TypeKind, Values,
    };

    use super::*;
    use crate::dialect::{SchemaSqlBuilder, SqliteSchemaSqlBuilder};

    /// Serves a fixed catalog.
    struct FakeCatalog {
        tables: Vec<(String, String)>,
        indexes: Vec<(String, Option<String>, String)>,
    }

    impl FakeCatalog {
        fn row(sql: Option<&str>, name: &str) -> Row {
            let mut row = Row::new();
            row.insert("sql".to_string(), sql.map_or(Value::Null, Value::from));
            row.insert("name".to_string(), Value::from(name));
            row
        }
    }

    impl QueryInterface for FakeCatalog {
        fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, QueryError>> {
            Box::pin(async move { Ok(self.tables.iter().any(|(name, _)| *name == table)) })
        }

        fn select<'a>(
            &'a self,
            table: &'a str,
            _fields: &'a [&'a str],
            conditions: &'a Conditions,
            _options: &'a SelectOptions,
        ) -> BoxFuture<'a, Result<Vec<Row>, QueryError>> {
            Box::pin(async move {
                assert_eq!(table, SQLITE_MASTER);
                let kind = conditions["type"].as_text().unwrap();
                let rows = if kind == "table" {
                    let name = conditions["name"].as_text().unwrap();
                    self.tables
                        .iter()
                        .filter(|(n, _)| *n == name)
                        .map(|(n, sql)| Self::row(Some(sql), n))
                        .collect()
                } else {
                    let tbl_name = conditions["tbl_name"].as_text().unwrap();
                    self.indexes
                        .iter()
                        .filter(|(_, _, t)| *t == tbl_name)
                        .map(|(n, sql, _)| Self::row(sql.as_deref(), n))
                        .collect()
                };
                Ok(rows)
            })
        }

        fn insert<'a>(
            &'a self,
            _table: &'a str,
            _values: &'a Values,
        ) -> BoxFuture<'a, Result<i64, QueryError>> {
            Box::pin(async { Ok(0) })
        }

        fn update<'a>(
            &'a self,
            _table: &'a str,
            _values: &'a Values,
            _conditions: &'a Conditions,
        ) -> BoxFuture<'a, Result<u64, QueryError>> {
            Box::pin(async { Ok(0) })
        }

        fn delete<'a>(
            &'a self,
            _table: &'a str,
            _conditions: &'a Conditions,
        ) -> BoxFuture<'a, Result<u64, QueryError>> {
            Box::pin(async { Ok(0) })
        }
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog {
            tables: vec![(
                "dbNametableName".to_string(),
                "CREATE TABLE dbNametableName (primaryField INT NOT NULL, textField BLOB NULL, \
                 intField INT DEFAULT 42 NOT NULL, PRIMARY KEY (textField, primaryField))"
                    .to_string(),
            )],
            indexes: vec![
                (
                    "indexName".to_string(),
                    Some(
                        "CREATE INDEX indexName ON dbNametableName (intField,textField)"
                            .to_string(),
                    ),
                    "dbNametableName".to_string(),
                ),
                (
                    "sqlite_autoindex_dbNametableName_1".to_string(),
                    None,
                    "dbNametableName".to_string(),
                ),
            ],
        }
    }

    #[tokio::test]
    async fn test_read_definition() {
        let reader =
            SqliteTableDefinitionReader::with_formatter(catalog(), TablePrefix::new("dbName"));

        let definition = reader.read_definition("tableName").await.unwrap();

        let expected = TableDefinition::new(
            "tableName",
            [
                FieldDefinition::new("primaryField", TypeKind::Integer)
                    .unwrap()
                    .not_null(),
                FieldDefinition::new("textField", TypeKind::Blob).unwrap(),
                FieldDefinition::new("intField", TypeKind::Integer)
                    .unwrap()
                    .not_null()
                    .default(DefaultValue::Integer(42)),
            ],
            [
                IndexDefinition::new("indexName", ["intField", "textField"], IndexKind::Index)
                    .unwrap(),
                IndexDefinition::new(
                    PRIMARY_INDEX_NAME,
                    ["textField", "primaryField"],
                    IndexKind::Primary,
                )
                .unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(definition, expected);
    }

    #[tokio::test]
    async fn test_read_missing_table() {
        let reader = SqliteTableDefinitionReader::new(catalog());
        let err = reader.read_definition("tableName").await.unwrap_err();
        assert!(matches!(err, SchemaReadError::TableNotFound(name) if name == "tableName"));
    }

    #[tokio::test]
    async fn test_read_malformed_definition() {
        let reader = SqliteTableDefinitionReader::new(FakeCatalog {
            tables: vec![(
                "geo".to_string(),
                "CREATE TABLE geo (shape GEOMETRY NULL)".to_string(),
            )],
            indexes: vec![],
        });
        let err = reader.read_definition("geo").await.unwrap_err();
        assert!(matches!(
            err,
            SchemaReadError::MalformedDefinition { table, .. } if table == "geo"
        ));
    }

    #[tokio::test]
    async fn test_reads_back_created_table() {
        let table = TableDefinition::new(
            "tableName",
            [
                FieldDefinition::new("primaryField", TypeKind::Integer)
                    .unwrap()
                    .not_null(),
                FieldDefinition::new("textField", TypeKind::Blob).unwrap(),
                FieldDefinition::new("intField", TypeKind::Integer)
                    .unwrap()
                    .not_null()
                    .default(DefaultValue::Integer(42)),
            ],
            [
                IndexDefinition::new("INDEX", ["intField", "primaryField"], IndexKind::Index)
                    .unwrap(),
            ],
        )
        .unwrap();

        let ddl = SqliteSchemaSqlBuilder::new().create_table_sql(&table);
        let mut statements = ddl.split(';').filter(|s| !s.is_empty());
        let create_table = statements.next().unwrap().to_string();
        let create_index = statements.next().unwrap().to_string();

        let reader = SqliteTableDefinitionReader::new(FakeCatalog {
            tables: vec![("tableName".to_string(), create_table)],
            indexes: vec![("INDEX".to_string(), Some(create_index), "tableName".to_string())],
        });

        assert_eq!(reader.read_definition("tableName").await.unwrap(), table);
    }
}
