//! Column types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DefinitionError, Result};

/// The kind of a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// 8-bit integer.
    TinyInt,
    /// Floating point number.
    Float,
    /// Exact decimal number.
    Decimal,
    /// Binary or text large object.
    Blob,
    /// Variable-length character string.
    Varchar,
}

impl TypeKind {
    /// Returns the canonical keyword of this kind.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::TinyInt => "TINYINT",
            Self::Float => "FLOAT",
            Self::Decimal => "DECIMAL",
            Self::Blob => "BLOB",
            Self::Varchar => "VARCHAR",
        }
    }

    /// Returns whether a size may be attached to this kind.
    #[must_use]
    pub const fn takes_size(self) -> bool {
        matches!(self, Self::Varchar)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A column type: a kind plus optional size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TypeRepr")]
pub struct TypeDefinition {
    kind: TypeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
}

impl TypeDefinition {
    /// Creates a type without size.
    #[must_use]
    pub const fn new(kind: TypeKind) -> Self {
        Self { kind, size: None }
    }

    /// Creates a type with a size.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::UnexpectedSize`] when the kind does not
    /// take a size.
    pub const fn sized(kind: TypeKind, size: u32) -> Result<Self> {
        if !kind.takes_size() {
            return Err(DefinitionError::UnexpectedSize {
                kind: kind.keyword(),
                size,
            });
        }
        Ok(Self {
            kind,
            size: Some(size),
        })
    }

    /// Shorthand for a `VARCHAR(size)`.
    #[must_use]
    pub const fn varchar(size: u32) -> Self {
        Self {
            kind: TypeKind::Varchar,
            size: Some(size),
        }
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns the size, if any.
    #[must_use]
    pub const fn size(&self) -> Option<u32> {
        self.size
    }
}

impl From<TypeKind> for TypeDefinition {
    fn from(kind: TypeKind) -> Self {
        Self::new(kind)
    }
}

#[derive(Deserialize)]
struct TypeRepr {
    kind: TypeKind,
    #[serde(default)]
    size: Option<u32>,
}

impl TryFrom<TypeRepr> for TypeDefinition {
    type Error = DefinitionError;

    fn try_from(repr: TypeRepr) -> Result<Self> {
        match repr.size {
            Some(size) => Self::sized(repr.kind, size),
            None => Ok(Self::new(repr.kind)),
        }
    }
}
