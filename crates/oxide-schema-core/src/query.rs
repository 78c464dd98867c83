//! Query execution collaborator.
//!
//! The reader and the executing schema modifiers talk to the backend only
//! through [`QueryInterface`]. Driver crates provide the implementation.

use std::future::Future;
use std::pin::Pin;

use indexmap::IndexMap;

use crate::error::QueryError;

/// A boxed future for async backend operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A value read from or written to a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// Binary data.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Column values keyed by column name.
pub type Values = IndexMap<String, Value>;

/// Equality conditions, all of which must hold.
pub type Conditions = IndexMap<String, Value>;

/// A result row keyed by column name.
pub type Row = IndexMap<String, Value>;

/// Builds [`Conditions`] from `(column, value)` pairs.
#[must_use]
pub fn conditions<I, K, V>(pairs: I) -> Conditions
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Extra options of a select.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectOptions {
    /// Columns to order by, ascending.
    pub order_by: Vec<String>,
    /// Maximum number of rows.
    pub limit: Option<u64>,
}

impl SelectOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an ORDER BY column.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    /// Sets the row limit.
    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Executes plain queries against a backend.
///
/// Table names are used as given; formatting is the caller's concern.
pub trait QueryInterface: Send + Sync {
    /// Returns whether the table exists.
    fn table_exists<'a>(&'a self, table: &'a str) -> BoxFuture<'a, Result<bool, QueryError>>;

    /// Selects `fields` of the rows matching `conditions`.
    fn select<'a>(
        &'a self,
        table: &'a str,
        fields: &'a [&'a str],
        conditions: &'a Conditions,
        options: &'a SelectOptions,
    ) -> BoxFuture<'a, Result<Vec<Row>, QueryError>>;

    /// Inserts one row and returns its row id.
    fn insert<'a>(
        &'a self,
        table: &'a str,
        values: &'a Values,
    ) -> BoxFuture<'a, Result<i64, QueryError>>;

    /// Updates the rows matching `conditions`, returning how many changed.
    fn update<'a>(
        &'a self,
        table: &'a str,
        values: &'a Values,
        conditions: &'a Conditions,
    ) -> BoxFuture<'a, Result<u64, QueryError>>;

    /// Deletes the rows matching `conditions`, returning how many went.
    fn delete<'a>(
        &'a self,
        table: &'a str,
        conditions: &'a Conditions,
    ) -> BoxFuture<'a, Result<u64, QueryError>>;
}
