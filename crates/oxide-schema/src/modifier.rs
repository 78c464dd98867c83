//! Executing schema modifier and table builder for SQLite.
//!
//! Every operation turns into one DDL batch from the [`SchemaSqlBuilder`],
//! run inside a transaction so a failed recreate leaves the table untouched.

use oxide_schema_core::{
    BoxError, BoxFuture, DefinitionError, FieldDefinition, IndexDefinition, QueryError,
    QueryInterface, SchemaModificationError, SchemaModifier, TableBuilder, TableDefinition,
    TableDefinitionReader, TableNameFormatter, TablePrefix,
};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::dialect::{SchemaSqlBuilder, SqliteSchemaSqlBuilder};
use crate::query::SqliteQueryInterface;
use crate::reader::SqliteTableDefinitionReader;

/// Applies schema changes to a SQLite database.
pub struct SqliteSchemaModifier<
    B = SqliteSchemaSqlBuilder,
    R = SqliteTableDefinitionReader<SqliteQueryInterface>,
> {
    query: SqliteQueryInterface,
    builder: B,
    reader: R,
    prefix: TablePrefix,
    dry_run: bool,
}

impl SqliteSchemaModifier {
    /// Creates a modifier for unprefixed tables.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_prefix(pool, TablePrefix::default())
    }

    /// Creates a modifier whose builder and reader share `prefix`.
    #[must_use]
    pub fn with_prefix(pool: SqlitePool, prefix: TablePrefix) -> Self {
        let query = SqliteQueryInterface::new(pool);
        Self {
            builder: SqliteSchemaSqlBuilder::with_prefix(prefix.clone()),
            reader: SqliteTableDefinitionReader::with_formatter(query.clone(), prefix.clone()),
            query,
            prefix,
            dry_run: false,
        }
    }
}

impl<B: SchemaSqlBuilder, R: TableDefinitionReader> SqliteSchemaModifier<B, R> {
    /// Enables dry-run mode (SQL is printed but not executed).
    #[must_use]
    pub const fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the DDL builder.
    #[must_use]
    pub const fn builder(&self) -> &B {
        &self.builder
    }

    /// Returns the definition reader.
    #[must_use]
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Runs the statements in a single transaction.
    async fn execute(&self, statements: &[String]) -> Result<(), sqlx::Error> {
        if self.dry_run {
            warn!("Dry run, DDL is printed but not executed");
            for sql in statements {
                println!("{sql}");
            }
            return Ok(());
        }

        let mut tx = self.query.pool().begin().await?;
        for sql in statements {
            debug!(sql = %sql, "Executing SQL");
            sqlx::Executor::execute(&mut *tx, sqlx::raw_sql(sql)).await?;
        }
        tx.commit().await
    }

    async fn current_definition(
        &self,
        table: &str,
    ) -> Result<TableDefinition, SchemaModificationError> {
        self.reader.read_definition(table).await.map_err(|source| {
            SchemaModificationError::DefinitionUnavailable {
                table: table.to_string(),
                source,
            }
        })
    }

    /// Rebuilds `current` with `recreate_sql` in one transaction.
    async fn recreate(
        &self,
        current: &TableDefinition,
        recreate_sql: String,
    ) -> Result<(), sqlx::Error> {
        // Index names are database-wide and stay with the renamed table.
        let mut statements: Vec<String> = current
            .indexes()
            .values()
            .filter(|index| !index.is_primary())
            .map(|index| self.builder.drop_index_statement(index.name()))
            .collect();
        statements.push(recreate_sql);
        self.execute(&statements).await
    }

    async fn remove_field_batch(
        &self,
        table: &str,
        field_name: &str,
    ) -> Result<(), SchemaModificationError> {
        let current = self.current_definition(table).await?;
        let sql = self.builder.remove_field_sql(&current, field_name);

        self.recreate(&current, sql)
            .await
            .map_err(|e| SchemaModificationError::FieldRemovalFailed {
                table: table.to_string(),
                field: field_name.to_string(),
                source: boxed(e),
            })
    }

    /// SQLite has no standalone primary key; the table is rebuilt with it.
    async fn add_primary_index(
        &self,
        table: &str,
        index: &IndexDefinition,
    ) -> Result<(), SchemaModificationError> {
        let current = self.current_definition(table).await?;
        let replacement = current
            .mutate_indexes(current.indexes().values().chain([index]).cloned())
            .map_err(|source| invalid_change(table, source))?;
        let sql = self.builder.recreate_table_sql(&current, &replacement);

        self.recreate(&current, sql)
            .await
            .map_err(|e| SchemaModificationError::IndexAdditionFailed {
                table: table.to_string(),
                index: index.name().to_string(),
                source: boxed(e),
            })
    }

    async fn remove_index_batch(
        &self,
        table: &str,
        index_name: &str,
    ) -> Result<(), SchemaModificationError> {
        let current = self.current_definition(table).await?;
        let failed = |e| SchemaModificationError::IndexRemovalFailed {
            table: table.to_string(),
            index: index_name.to_string(),
            source: boxed(e),
        };

        if !current.index(index_name).is_some_and(IndexDefinition::is_primary) {
            // SQLite reads `table.index` as `schema.index`; index names are global.
            let sql = self.builder.drop_index_statement(index_name);
            return self.execute(&[sql]).await.map_err(failed);
        }

        let replacement = current
            .mutate_indexes(
                current
                    .indexes()
                    .values()
                    .filter(|index| index.name() != index_name)
                    .cloned(),
            )
            .map_err(|source| invalid_change(table, source))?;
        let sql = self.builder.recreate_table_sql(&current, &replacement);
        self.recreate(&current, sql).await.map_err(failed)
    }
}

fn boxed(err: sqlx::Error) -> BoxError {
    Box::new(err)
}

fn invalid_change(table: &str, source: DefinitionError) -> SchemaModificationError {
    SchemaModificationError::InvalidChange {
        table: table.to_string(),
        source,
    }
}

impl<B: SchemaSqlBuilder, R: TableDefinitionReader> SchemaModifier for SqliteSchemaModifier<B, R> {
    fn add_field<'a>(
        &'a self,
        table: &'a str,
        field: &'a FieldDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        Box::pin(async move {
            let sql = self.builder.add_field_sql(table, field);
            self.execute(&[sql])
                .await
                .map_err(|e| SchemaModificationError::FieldAdditionFailed {
                    table: table.to_string(),
                    field: field.name().to_string(),
                    source: boxed(e),
                })
        })
    }

    fn remove_field<'a>(
        &'a self,
        table: &'a str,
        field_name: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        Box::pin(self.remove_field_batch(table, field_name))
    }

    fn add_index<'a>(
        &'a self,
        table: &'a str,
        index: &'a IndexDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        Box::pin(async move {
            if index.is_primary() {
                return self.add_primary_index(table, index).await;
            }

            let sql = self.builder.create_index_statement(table, index);
            self.execute(&[sql])
                .await
                .map_err(|e| SchemaModificationError::IndexAdditionFailed {
                    table: table.to_string(),
                    index: index.name().to_string(),
                    source: boxed(e),
                })
        })
    }

    fn remove_index<'a>(
        &'a self,
        table: &'a str,
        index_name: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        Box::pin(self.remove_index_batch(table, index_name))
    }
}

impl<B: SchemaSqlBuilder, R: TableDefinitionReader> TableBuilder for SqliteSchemaModifier<B, R> {
    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, QueryError>> {
        Box::pin(async move {
            let name = self.prefix.format_table_name(table);
            self.query.table_exists(&name).await
        })
    }

    fn create_table<'a>(
        &'a self,
        table: &'a TableDefinition,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        Box::pin(async move {
            let sql = self.builder.create_table_sql(table);
            self.execute(&[sql])
                .await
                .map_err(|e| SchemaModificationError::TableCreationFailed {
                    table: table.name().to_string(),
                    source: boxed(e),
                })?;
            info!(table = %table.name(), "Created table");
            Ok(())
        })
    }

    fn drop_table<'a>(
        &'a self,
        table: &'a str,
    ) -> BoxFuture<'a, Result<(), SchemaModificationError>> {
        Box::pin(async move {
            let sql = self.builder.drop_table_sql(table);
            self.execute(&[sql])
                .await
                .map_err(|e| SchemaModificationError::TableDeletionFailed {
                    table: table.to_string(),
                    source: boxed(e),
                })?;
            info!(table = %table, "Dropped table");
            Ok(())
        })
    }
}
