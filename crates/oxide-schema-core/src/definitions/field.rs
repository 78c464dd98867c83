//! Field (column) definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::TypeDefinition;
use crate::error::{DefinitionError, Result};

/// Default value of a field.
///
/// `None` means the field has no default at all, which is distinct from an
/// explicit `NULL` default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DefaultValue {
    /// No default value.
    #[default]
    None,
    /// NULL default.
    Null,
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// SQL expression (e.g., "CURRENT_TIMESTAMP").
    ///
    /// Backends write anything but a bare keyword in parentheses, and read a
    /// parenthesised default back without them.
    Expression(String),
}

impl DefaultValue {
    /// Returns `true` unless this is [`DefaultValue::None`].
    #[must_use]
    pub const fn is_set(&self) -> bool {
        !self.is_none()
    }

    const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// Extra column attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAttribute {
    /// Numeric column without sign.
    Unsigned,
    /// Column value is generated by the backend on insert.
    AutoIncrement,
}

/// A column of a table.
///
/// Built with [`FieldDefinition::new`] and the consuming builder methods;
/// once built it is never changed in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FieldRepr")]
pub struct FieldDefinition {
    name: String,
    #[serde(rename = "type")]
    type_def: TypeDefinition,
    nullable: bool,
    #[serde(skip_serializing_if = "DefaultValue::is_none")]
    default: DefaultValue,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    attributes: BTreeSet<FieldAttribute>,
}

impl FieldDefinition {
    /// Creates a nullable field without default or attributes.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::EmptyName`] when `name` is empty.
    pub fn new(name: impl Into<String>, type_def: impl Into<TypeDefinition>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DefinitionError::EmptyName("Field"));
        }
        Ok(Self {
            name,
            type_def: type_def.into(),
            nullable: true,
            default: DefaultValue::None,
            attributes: BTreeSet::new(),
        })
    }

    /// Sets the field as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets whether the field accepts NULL.
    #[must_use]
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Adds an attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: FieldAttribute) -> Self {
        self.attributes.insert(attribute);
        self
    }

    /// Marks the field as unsigned.
    #[must_use]
    pub fn unsigned(self) -> Self {
        self.attribute(FieldAttribute::Unsigned)
    }

    /// Marks the field as auto-incrementing.
    #[must_use]
    pub fn auto_increment(self) -> Self {
        self.attribute(FieldAttribute::AutoIncrement)
    }

    /// Returns the name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type.
    #[must_use]
    pub const fn type_def(&self) -> &TypeDefinition {
        &self.type_def
    }

    /// Returns whether NULL is accepted.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns the default value.
    #[must_use]
    pub const fn default_value(&self) -> &DefaultValue {
        &self.default
    }

    /// Returns the attributes.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeSet<FieldAttribute> {
        &self.attributes
    }

    /// Returns whether the given attribute is set.
    #[must_use]
    pub fn has_attribute(&self, attribute: FieldAttribute) -> bool {
        self.attributes.contains(&attribute)
    }

    /// Returns whether the field auto-increments.
    #[must_use]
    pub fn is_auto_increment(&self) -> bool {
        self.has_attribute(FieldAttribute::AutoIncrement)
    }
}

#[derive(Deserialize)]
struct FieldRepr {
    name: String,
    #[serde(rename = "type")]
    type_def: TypeDefinition,
    #[serde(default = "nullable_by_default")]
    nullable: bool,
    #[serde(default)]
    default: DefaultValue,
    #[serde(default)]
    attributes: BTreeSet<FieldAttribute>,
}

const fn nullable_by_default() -> bool {
    true
}

impl TryFrom<FieldRepr> for FieldDefinition {
    type Error = DefinitionError;

    fn try_from(repr: FieldRepr) -> Result<Self> {
        let mut field = Self::new(repr.name, repr.type_def)?
            .nullable(repr.nullable)
            .default(repr.default);
        field.attributes = repr.attributes;
        Ok(field)
    }
}
