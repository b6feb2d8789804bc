//! Per-actor replicated property sets.

use std::collections::HashMap;

use crate::error::{SchemaError, SchemaResult};
use crate::{TypeTag, TypedValue};

/// Index value reserved as the end-of-properties marker on the wire.
pub const END_OF_PROPERTIES: u16 = u16::MAX;

/// Maximum number of properties a set can hold.
///
/// Indices run from 0 to `MAX_PROPERTIES - 1` so none collides with
/// [`END_OF_PROPERTIES`].
pub const MAX_PROPERTIES: usize = END_OF_PROPERTIES as usize;

/// How a property's type and default are declared.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyDefault {
    /// The default value; its kind fixes the property type.
    Value(TypedValue),
    /// A type with no natural default. The default becomes the type's null.
    Marker(TypeTag),
}

impl PropertyDefault {
    /// Builds a marker default from a tag spelling.
    pub fn marker(tag: &str) -> SchemaResult<Self> {
        TypeTag::parse(tag)
            .map(Self::Marker)
            .ok_or_else(|| SchemaError::UnknownTypeTag {
                tag: tag.to_owned(),
            })
    }
}

impl From<TypedValue> for PropertyDefault {
    fn from(value: TypedValue) -> Self {
        Self::Value(value)
    }
}

impl From<TypeTag> for PropertyDefault {
    fn from(tag: TypeTag) -> Self {
        Self::Marker(tag)
    }
}

/// A single declared property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    name: String,
    tag: TypeTag,
    default: TypedValue,
    value: TypedValue,
    overridden: bool,
}

impl Property {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        self.tag
    }

    #[must_use]
    pub const fn default_value(&self) -> &TypedValue {
        &self.default
    }

    #[must_use]
    pub const fn value(&self) -> &TypedValue {
        &self.value
    }

    /// Returns `true` if an initial value was set explicitly.
    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Returns `true` if the current value equals the declared default.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.value == self.default
    }
}

/// Ordered, named, typed property collection for one actor.
///
/// Indices are assigned in declaration order and are never reused, so both
/// ends of a connection agree on them as long as they declare the same
/// properties in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySet {
    properties: Vec<Property>,
    by_name: HashMap<String, u16>,
}

impl PropertySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a property and returns its index.
    ///
    /// Fails without changing the set if the name is taken, the default has
    /// no type, or the set is full.
    pub fn add_property(
        &mut self,
        name: &str,
        default: impl Into<PropertyDefault>,
    ) -> SchemaResult<u16> {
        if self.by_name.contains_key(name) {
            return Err(SchemaError::DuplicateProperty {
                name: name.to_owned(),
            });
        }
        let index = u16::try_from(self.properties.len())
            .ok()
            .filter(|index| *index != END_OF_PROPERTIES)
            .ok_or(SchemaError::TooManyProperties {
                max: MAX_PROPERTIES,
            })?;
        let (tag, default) = match default.into() {
            PropertyDefault::Value(value) => {
                let tag = value.type_tag().ok_or_else(|| SchemaError::UntypedValue {
                    name: name.to_owned(),
                })?;
                (tag, value)
            }
            PropertyDefault::Marker(tag) => (tag, TypedValue::null_of(tag)),
        };
        self.properties.push(Property {
            name: name.to_owned(),
            tag,
            value: default.clone(),
            default,
            overridden: false,
        });
        self.by_name.insert(name.to_owned(), index);
        Ok(index)
    }

    /// Overrides a property's starting value.
    pub fn set_initial_value(&mut self, name: &str, value: TypedValue) -> SchemaResult<()> {
        let index = self.require_index(name)?;
        self.set_value(index, value)?;
        self.properties[usize::from(index)].overridden = true;
        Ok(())
    }

    /// Replaces the value at `index`, coercing it to the declared type.
    pub fn set_value(&mut self, index: u16, value: TypedValue) -> SchemaResult<()> {
        let count = self.properties.len();
        let property = self
            .properties
            .get_mut(usize::from(index))
            .ok_or(SchemaError::IndexOutOfRange { index, count })?;
        property.value = value.coerce(property.tag)?;
        Ok(())
    }

    /// Returns the current value of a property.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&TypedValue> {
        self.property(name).map(Property::value)
    }

    /// Returns the index of a property, if declared.
    #[must_use]
    pub fn property_index(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    /// Looks up the index of a declared property or fails.
    pub fn require_index(&self, name: &str) -> SchemaResult<u16> {
        self.property_index(name)
            .ok_or_else(|| SchemaError::UnknownProperty {
                name: name.to_owned(),
            })
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.property_index(name).and_then(|index| self.get(index))
    }

    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Property> {
        self.properties.get(usize::from(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates properties in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Property)> {
        (0u16..).zip(self.properties.iter())
    }

    /// Iterates properties whose initial value was set explicitly.
    pub fn overrides(&self) -> impl Iterator<Item = (u16, &Property)> {
        self.iter().filter(|(_, property)| property.overridden)
    }
}
