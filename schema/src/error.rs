//! Property and value errors.

use std::fmt;

use crate::TypeTag;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when declaring properties or converting values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A property with this name is already declared.
    DuplicateProperty { name: String },

    /// No property with this name is declared.
    UnknownProperty { name: String },

    /// A tag spelling did not name any known type.
    UnknownTypeTag { tag: String },

    /// The value has no type tag and the declared type is not a reference.
    UntypedValue { name: String },

    /// The property set already holds the maximum number of properties.
    TooManyProperties { max: usize },

    /// A value could not be converted to the declared type.
    TypeMismatch {
        expected: TypeTag,
        found: Option<TypeTag>,
    },

    /// A property index is past the end of the set.
    IndexOutOfRange { index: u16, count: usize },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateProperty { name } => write!(f, "duplicate property {name:?}"),
            Self::UnknownProperty { name } => write!(f, "unknown property {name:?}"),
            Self::UnknownTypeTag { tag } => write!(f, "unknown type tag {tag:?}"),
            Self::UntypedValue { name } => {
                write!(f, "property {name:?} has a default with no type")
            }
            Self::TooManyProperties { max } => {
                write!(f, "property limit reached: at most {max} properties")
            }
            Self::TypeMismatch { expected, found } => match found {
                Some(found) => write!(f, "type mismatch: expected {expected}, found {found}"),
                None => write!(f, "type mismatch: expected {expected}, found untyped value"),
            },
            Self::IndexOutOfRange { index, count } => {
                write!(f, "property index {index} out of range for {count} properties")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
