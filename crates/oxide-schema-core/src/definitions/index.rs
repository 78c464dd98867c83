//! Index definitions.

use serde::{Deserialize, Serialize};

use crate::error::{DefinitionError, Result};

/// Kind of an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// The primary key of the table.
    Primary,
    /// Unique index.
    Unique,
    /// Plain index.
    #[default]
    Index,
}

/// A named, ordered set of columns.
///
/// Column order is significant: it is the column order of the composite
/// index in generated DDL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IndexRepr")]
pub struct IndexDefinition {
    name: String,
    columns: Vec<String>,
    kind: IndexKind,
}

impl IndexDefinition {
    /// Creates an index.
    ///
    /// # Errors
    ///
    /// Fails when the name is empty or no column is given.
    pub fn new<I, S>(name: impl Into<String>, columns: I, kind: IndexKind) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName("Index"));
        }
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(DefinitionError::EmptyIndex(name));
        }
        Ok(Self {
            name,
            columns,
            kind,
        })
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in index order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> IndexKind {
        self.kind
    }

    /// Returns whether this is the primary index.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        matches!(self.kind, IndexKind::Primary)
    }

    /// Returns whether the index covers `column`.
    #[must_use]
    pub fn references(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

#[derive(Deserialize)]
struct IndexRepr {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    kind: IndexKind,
}

impl TryFrom<IndexRepr> for IndexDefinition {
    type Error = DefinitionError;

    fn try_from(repr: IndexRepr) -> Result<Self> {
        Self::new(repr.name, repr.columns, repr.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_order_is_kept() {
        let index = IndexDefinition::new("name", ["b", "a"], IndexKind::Index).unwrap();
        assert_eq!(index.columns(), ["b".to_string(), "a".to_string()]);
        assert!(index.references("a"));
        assert!(!index.references("c"));
    }

    #[test]
    fn test_order_matters_for_equality() {
        let ab = IndexDefinition::new("i", ["a", "b"], IndexKind::Unique).unwrap();
        let ba = IndexDefinition::new("i", ["b", "a"], IndexKind::Unique).unwrap();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_invalid_indexes() {
        assert_eq!(
            IndexDefinition::new("", ["a"], IndexKind::Index),
            Err(DefinitionError::EmptyName("Index"))
        );
        assert_eq!(
            IndexDefinition::new("i", Vec::<String>::new(), IndexKind::Index),
            Err(DefinitionError::EmptyIndex("i".to_string()))
        );
    }

    #[test]
    fn test_kind_defaults_to_plain_index() {
        let index: IndexDefinition =
            serde_json::from_str(r#"{"name":"o","columns":["o"]}"#).unwrap();
        assert_eq!(index.kind(), IndexKind::Index);
        assert!(!index.is_primary());
    }
}
