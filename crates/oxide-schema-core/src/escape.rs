//! Value escaping and table-name formatting.
//!
//! DDL builders never embed a raw value or table name; they go through these
//! collaborators instead.

use crate::definitions::DefaultValue;

/// Renders a value as backend SQL text.
pub trait Escaper: Send + Sync {
    /// Returns `value` as a SQL literal or expression.
    ///
    /// Never called with [`DefaultValue::None`].
    fn escape_value(&self, value: &DefaultValue) -> String;
}

/// Maps a logical table name to the name used by the backend.
pub trait TableNameFormatter: Send + Sync {
    /// Returns the backend name of `name`.
    fn format_table_name(&self, name: &str) -> String;
}

/// Formatter prepending a fixed prefix to every table name.
///
/// The empty prefix leaves names untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePrefix {
    prefix: String,
}

impl TablePrefix {
    /// Creates a formatter with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl TableNameFormatter for TablePrefix {
    fn format_table_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }
}
