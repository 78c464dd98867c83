//! [`QueryInterface`] over an sqlx SQLite pool.

use oxide_schema_core::{
    BoxError, BoxFuture, Conditions, QueryError, QueryInterface, Row, SelectOptions, Value,
    Values,
};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};
use tracing::debug;

type RawQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Runs plain queries on a SQLite pool.
#[derive(Debug, Clone)]
pub struct SqliteQueryInterface {
    pool: SqlitePool,
}

impl SqliteQueryInterface {
    /// Creates a query interface on the given pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Returns the pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Quotes an identifier with double quotes.
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn bind_value<'q>(query: RawQuery<'q>, value: &Value) -> RawQuery<'q> {
    match value {
        Value::Null => query.bind(Option::<i64>::None),
        Value::Integer(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.clone()),
        Value::Blob(b) => query.bind(b.clone()),
    }
}

/// Builds `WHERE a = ? AND b IS NULL`, or nothing without conditions.
fn where_clause(conditions: &Conditions) -> String {
    if conditions.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = conditions
        .iter()
        .map(|(column, value)| match value {
            Value::Null => format!("{} IS NULL", quote_identifier(column)),
            _ => format!("{} = ?", quote_identifier(column)),
        })
        .collect();
    format!(" WHERE {}", parts.join(" AND "))
}

fn bind_conditions<'q>(mut query: RawQuery<'q>, conditions: &Conditions) -> RawQuery<'q> {
    for value in conditions.values().filter(|v| **v != Value::Null) {
        query = bind_value(query, value);
    }
    query
}

fn select_sql(
    table: &str,
    fields: &[&str],
    conditions: &Conditions,
    options: &SelectOptions,
) -> String {
    let columns = if fields.is_empty() {
        "*".to_string()
    } else {
        fields
            .iter()
            .map(|f| quote_identifier(f))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut sql = format!(
        "SELECT {columns} FROM {}{}",
        quote_identifier(table),
        where_clause(conditions)
    );
    if !options.order_by.is_empty() {
        let order: Vec<String> = options.order_by.iter().map(|c| quote_identifier(c)).collect();
        sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
    }
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

/// Decodes a row by the storage class of each value.
fn decode_row(row: &SqliteRow) -> Result<Row, sqlx::Error> {
    let mut decoded = Row::new();
    for column in row.columns() {
        let ordinal = column.ordinal();
        let raw = row.try_get_raw(ordinal)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            let storage = raw.type_info().name().to_string();
            match storage.as_str() {
                "INTEGER" => Value::Integer(row.try_get(ordinal)?),
                "REAL" => Value::Float(row.try_get(ordinal)?),
                "TEXT" => Value::Text(row.try_get(ordinal)?),
                _ => Value::Blob(row.try_get(ordinal)?),
            }
        };
        decoded.insert(column.name().to_string(), value);
    }
    Ok(decoded)
}

fn boxed(err: sqlx::Error) -> BoxError {
    Box::new(err)
}

impl QueryInterface for SqliteQueryInterface {
    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, QueryError>> {
        Box::pin(async move {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| QueryError::TableExistsFailed {
                table: table.to_string(),
                source: boxed(e),
            })?;
            Ok(count > 0)
        })
    }

    fn select<'a>(
        &'a self,
        table: &'a str,
        fields: &'a [&'a str],
        conditions: &'a Conditions,
        options: &'a SelectOptions,
    ) -> BoxFuture<'a, Result<Vec<Row>, QueryError>> {
        Box::pin(async move {
            let sql = select_sql(table, fields, conditions, options);
            debug!("Executing: {sql}");

            let failed = |e: sqlx::Error| QueryError::SelectFailed {
                table: table.to_string(),
                fields: fields.iter().map(ToString::to_string).collect(),
                conditions: conditions.clone(),
                source: boxed(e),
            };

            let rows = bind_conditions(sqlx::query(&sql), conditions)
                .fetch_all(&self.pool)
                .await
                .map_err(failed)?;
            rows.iter()
                .map(decode_row)
                .collect::<Result<Vec<_>, _>>()
                .map_err(failed)
        })
    }

    fn insert<'a>(
        &'a self,
        table: &'a str,
        values: &'a Values,
    ) -> BoxFuture<'a, Result<i64, QueryError>> {
        Box::pin(async move {
            let columns: Vec<String> = values.keys().map(|c| quote_identifier(c)).collect();
            let placeholders = vec!["?"; values.len()].join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({placeholders})",
                quote_identifier(table),
                columns.join(", ")
            );
            debug!("Executing: {sql}");

            let mut query = sqlx::query(&sql);
            for value in values.values() {
                query = bind_value(query, value);
            }
            let result = query
                .execute(&self.pool)
                .await
                .map_err(|e| QueryError::InsertFailed {
                    table: table.to_string(),
                    values: values.clone(),
                    source: boxed(e),
                })?;
            Ok(result.last_insert_rowid())
        })
    }

    fn update<'a>(
        &'a self,
        table: &'a str,
        values: &'a Values,
        conditions: &'a Conditions,
    ) -> BoxFuture<'a, Result<u64, QueryError>> {
        Box::pin(async move {
            let assignments: Vec<String> = values
                .keys()
                .map(|c| format!("{} = ?", quote_identifier(c)))
                .collect();
            let sql = format!(
                "UPDATE {} SET {}{}",
                quote_identifier(table),
                assignments.join(", "),
                where_clause(conditions)
            );
            debug!("Executing: {sql}");

            let mut query = sqlx::query(&sql);
            for value in values.values() {
                query = bind_value(query, value);
            }
            let result = bind_conditions(query, conditions)
                .execute(&self.pool)
                .await
                .map_err(|e| QueryError::UpdateFailed {
                    table: table.to_string(),
                    values: values.clone(),
                    conditions: conditions.clone(),
                    source: boxed(e),
                })?;
            Ok(result.rows_affected())
        })
    }

    fn delete<'a>(
        &'a self,
        table: &'a str,
        conditions: &'a Conditions,
    ) -> BoxFuture<'a, Result<u64, QueryError>> {
        Box::pin(async move {
            let sql = format!(
                "DELETE FROM {}{}",
                quote_identifier(table),
                where_clause(conditions)
            );
            debug!("Executing: {sql}");

            let result = bind_conditions(sqlx::query(&sql), conditions)
                .execute(&self.pool)
                .await
                .map_err(|e| QueryError::DeleteFailed {
                    table: table.to_string(),
                    conditions: conditions.clone(),
                    source: boxed(e),
                })?;
            Ok(result.rows_affected())
        })
    }
}
