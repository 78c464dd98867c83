//! Table definitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{FieldAttribute, FieldDefinition, IndexDefinition, TypeKind};
use crate::error::{DefinitionError, Result};

/// A table: a name, its fields and its indexes.
///
/// Fields and indexes are keyed by name. Fields keep their declaration order,
/// which is the column order of generated DDL. The value is immutable: every
/// `mutate_*` method returns a new definition.
///
/// Equality compares fields in order and indexes by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "TableRepr", into = "TableRepr")]
pub struct TableDefinition {
    name: String,
    fields: IndexMap<String, FieldDefinition>,
    indexes: IndexMap<String, IndexDefinition>,
}

impl TableDefinition {
    /// Creates a table definition.
    ///
    /// # Errors
    ///
    /// Fails with a [`DefinitionError`] when the name is empty, a field or
    /// index name is repeated, more than one index is PRIMARY, or an
    /// auto-increment field is not a signed INTEGER forming the whole PRIMARY
    /// index.
    pub fn new<F, I>(name: impl Into<String>, fields: F, indexes: I) -> Result<Self>
    where
        F: IntoIterator<Item = FieldDefinition>,
        I: IntoIterator<Item = IndexDefinition>,
    {
        let name = name.into();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName("Table"));
        }
        let fields = Self::collect_fields(&name, fields)?;
        let indexes = Self::collect_indexes(&name, indexes)?;
        Self {
            name,
            fields,
            indexes,
        }
        .checked()
    }

    /// Creates a table definition without indexes.
    ///
    /// # Errors
    ///
    /// See [`TableDefinition::new`].
    pub fn with_fields<F>(name: impl Into<String>, fields: F) -> Result<Self>
    where
        F: IntoIterator<Item = FieldDefinition>,
    {
        Self::new(name, fields, [])
    }

    /// Checks that every auto-increment field can be written as
    /// `INTEGER PRIMARY KEY AUTOINCREMENT` and read back unchanged.
    fn checked(self) -> Result<Self> {
        for field in self.fields.values().filter(|f| f.is_auto_increment()) {
            let ty = field.type_def();
            let unsigned = field.has_attribute(FieldAttribute::Unsigned);
            if ty.kind() != TypeKind::Integer || ty.size().is_some() || unsigned {
                return Err(DefinitionError::AutoIncrementType {
                    table: self.name.clone(),
                    field: field.name().to_string(),
                    ty: if unsigned {
                        format!("{} UNSIGNED", ty.kind())
                    } else {
                        ty.kind().to_string()
                    },
                });
            }

            let sole_primary = self
                .primary_index()
                .is_some_and(|primary| primary.columns() == [field.name()]);
            if !sole_primary {
                return Err(DefinitionError::AutoIncrementNotPrimary {
                    table: self.name.clone(),
                    field: field.name().to_string(),
                });
            }
        }
        Ok(self)
    }

    fn collect_fields<F>(table: &str, fields: F) -> Result<IndexMap<String, FieldDefinition>>
    where
        F: IntoIterator<Item = FieldDefinition>,
    {
        let mut map = IndexMap::new();
        for field in fields {
            if map.contains_key(field.name()) {
                return Err(DefinitionError::DuplicateField {
                    table: table.to_string(),
                    field: field.name().to_string(),
                });
            }
            map.insert(field.name().to_string(), field);
        }
        Ok(map)
    }

    fn collect_indexes<I>(table: &str, indexes: I) -> Result<IndexMap<String, IndexDefinition>>
    where
        I: IntoIterator<Item = IndexDefinition>,
    {
        let mut map: IndexMap<String, IndexDefinition> = IndexMap::new();
        for index in indexes {
            if map.contains_key(index.name()) {
                return Err(DefinitionError::DuplicateIndex {
                    table: table.to_string(),
                    index: index.name().to_string(),
                });
            }
            if index.is_primary() {
                if let Some(first) = map.values().find(|i| i.is_primary()) {
                    return Err(DefinitionError::MultiplePrimaryIndexes {
                        table: table.to_string(),
                        first: first.name().to_string(),
                        second: index.name().to_string(),
                    });
                }
            }
            map.insert(index.name().to_string(), index);
        }
        Ok(map)
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields keyed by name, in declaration order.
    #[must_use]
    pub const fn fields(&self) -> &IndexMap<String, FieldDefinition> {
        &self.fields
    }

    /// Returns the indexes keyed by name.
    #[must_use]
    pub const fn indexes(&self) -> &IndexMap<String, IndexDefinition> {
        &self.indexes
    }

    /// Returns the field with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.get(name)
    }

    /// Returns the index with the given name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&IndexDefinition> {
        self.indexes.get(name)
    }

    /// Returns the PRIMARY index, if any.
    #[must_use]
    pub fn primary_index(&self) -> Option<&IndexDefinition> {
        self.indexes.values().find(|i| i.is_primary())
    }

    /// Returns whether a field with this name exists.
    #[must_use]
    pub fn has_field_with_name(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns whether an index with this name exists.
    #[must_use]
    pub fn has_index_with_name(&self, name: &str) -> bool {
        self.indexes.contains_key(name)
    }

    /// Returns a copy with another name.
    ///
    /// # Errors
    ///
    /// Fails when `name` is empty.
    pub fn mutate_name(&self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName("Table"));
        }
        Ok(Self {
            name,
            fields: self.fields.clone(),
            indexes: self.indexes.clone(),
        })
    }

    /// Returns a copy with the fields replaced.
    ///
    /// # Errors
    ///
    /// Fails when a field name is repeated or an auto-increment field does
    /// not match the PRIMARY index.
    pub fn mutate_fields<F>(&self, fields: F) -> Result<Self>
    where
        F: IntoIterator<Item = FieldDefinition>,
    {
        Self {
            name: self.name.clone(),
            fields: Self::collect_fields(&self.name, fields)?,
            indexes: self.indexes.clone(),
        }
        .checked()
    }

    /// Returns a copy with the indexes replaced.
    ///
    /// # Errors
    ///
    /// Fails when an index name is repeated, more than one index is PRIMARY,
    /// or the PRIMARY index no longer matches an auto-increment field.
    pub fn mutate_indexes<I>(&self, indexes: I) -> Result<Self>
    where
        I: IntoIterator<Item = IndexDefinition>,
    {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            indexes: Self::collect_indexes(&self.name, indexes)?,
        }
        .checked()
    }

    /// Returns a copy without the named field; unchanged if there is none.
    ///
    /// Indexes are left alone, even those covering the field.
    #[must_use]
    pub fn mutate_field_away(&self, name: &str) -> Self {
        let mut fields = self.fields.clone();
        fields.shift_remove(name);
        Self {
            name: self.name.clone(),
            fields,
            indexes: self.indexes.clone(),
        }
    }

    /// Returns a copy without the named index; unchanged if there is none.
    #[must_use]
    pub fn mutate_index_away(&self, name: &str) -> Self {
        let mut indexes = self.indexes.clone();
        indexes.shift_remove(name);
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            indexes,
        }
    }
}

impl PartialEq for TableDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.fields.len() == other.fields.len()
            && self.fields.iter().eq(other.fields.iter())
            && self.indexes == other.indexes
    }
}

#[derive(Serialize, Deserialize)]
struct TableRepr {
    name: String,
    fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    indexes: Vec<IndexDefinition>,
}

impl TryFrom<TableRepr> for TableDefinition {
    type Error = DefinitionError;

    fn try_from(repr: TableRepr) -> Result<Self> {
        Self::new(repr.name, repr.fields, repr.indexes)
    }
}

impl From<TableDefinition> for TableRepr {
    fn from(table: TableDefinition) -> Self {
        Self {
            name: table.name,
            fields: table.fields.into_values().collect(),
            indexes: table.indexes.into_values().collect(),
        }
    }
}
