//! Typed values carried by calls and replicated properties.

use crate::error::{SchemaError, SchemaResult};
use crate::TypeTag;

/// Opaque handle to an object owned by the host object model.
///
/// The replication layer never dereferences it; identity is all it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectRef(u64);

impl ObjectRef {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for ObjectRef {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<ObjectRef> for u64 {
    fn from(value: ObjectRef) -> Self {
        value.raw()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// Euler rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rotator {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Affine transform, encoded as rotation then translation then scale.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub rotation: Quat,
    pub translation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::default(),
            scale: Vec3::ONE,
        }
    }
}

/// A value of one of the wire-encodable kinds.
///
/// `Null` is the untyped "no value" produced by callers that have nothing
/// better to offer. It has no tag of its own: it is accepted only where a
/// reference tag is declared and becomes that tag's null reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypedValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
    Vector(Vec3),
    Vector2(Vec2),
    Rotator(Rotator),
    Quat(Quat),
    LinearColor(LinearColor),
    Transform(Transform),
    Object(Option<ObjectRef>),
    /// Object reference that also carries script-side identity.
    Glue(Option<ObjectRef>),
    /// Fully-qualified class name.
    Class(Option<String>),
    Null,
}

// Bounds of the i32 range as exact f32 values.
const I32_MIN_F32: f32 = -2_147_483_648.0;
const I32_END_F32: f32 = 2_147_483_648.0;

impl TypedValue {
    /// Returns the tag for this value, or `None` for an untyped value.
    #[must_use]
    pub const fn type_tag(&self) -> Option<TypeTag> {
        let tag = match self {
            Self::Float(_) => TypeTag::Float,
            Self::Int(_) => TypeTag::Int,
            Self::Bool(_) => TypeTag::Bool,
            Self::Bytes(_) => TypeTag::Bytes,
            Self::Str(_) => TypeTag::Str,
            Self::Vector(_) => TypeTag::Vector,
            Self::Vector2(_) => TypeTag::Vector2,
            Self::Rotator(_) => TypeTag::Rotator,
            Self::Quat(_) => TypeTag::Quat,
            Self::LinearColor(_) => TypeTag::LinearColor,
            Self::Transform(_) => TypeTag::Transform,
            Self::Object(_) => TypeTag::Object,
            Self::Glue(_) => TypeTag::Glue,
            Self::Class(_) => TypeTag::Class,
            Self::Null => return None,
        };
        Some(tag)
    }

    /// Returns the tag spelling for this value, or `""` for an untyped value.
    #[must_use]
    pub const fn type_tag_str(&self) -> &'static str {
        match self.type_tag() {
            Some(tag) => tag.as_str(),
            None => "",
        }
    }

    /// Returns the "no natural default" value for a tag.
    ///
    /// Scalars and structs take their zero value; references are null.
    #[must_use]
    pub fn null_of(tag: TypeTag) -> Self {
        match tag {
            TypeTag::Float => Self::Float(0.0),
            TypeTag::Int => Self::Int(0),
            TypeTag::Bool => Self::Bool(false),
            TypeTag::Bytes => Self::Bytes(Vec::new()),
            TypeTag::Str => Self::Str(String::new()),
            TypeTag::Vector => Self::Vector(Vec3::default()),
            TypeTag::Vector2 => Self::Vector2(Vec2::default()),
            TypeTag::Rotator => Self::Rotator(Rotator::default()),
            TypeTag::Quat => Self::Quat(Quat::IDENTITY),
            TypeTag::LinearColor => Self::LinearColor(LinearColor::default()),
            TypeTag::Transform => Self::Transform(Transform::default()),
            TypeTag::Object => Self::Object(None),
            TypeTag::Glue => Self::Glue(None),
            TypeTag::Class => Self::Class(None),
        }
    }

    /// Converts the value to the declared tag.
    ///
    /// Only wire-compatible scalar conversions are performed: an integer is
    /// accepted for a float, a float with no fractional part for an integer,
    /// 0/1 for a bool and a bool for an integer. `Null` becomes the null
    /// reference of a reference tag. Everything else, including any mismatch
    /// between structured kinds, is an error.
    pub fn coerce(self, tag: TypeTag) -> SchemaResult<Self> {
        if self.type_tag() == Some(tag) {
            return Ok(self);
        }
        match (tag, self) {
            #[allow(clippy::cast_precision_loss)]
            (TypeTag::Float, Self::Int(value)) => Ok(Self::Float(value as f32)),
            #[allow(clippy::cast_possible_truncation)]
            (TypeTag::Int, Self::Float(value))
                if value.fract() == 0.0 && (I32_MIN_F32..I32_END_F32).contains(&value) =>
            {
                Ok(Self::Int(value as i32))
            }
            (TypeTag::Int, Self::Bool(value)) => Ok(Self::Int(i32::from(value))),
            (TypeTag::Bool, Self::Int(0)) => Ok(Self::Bool(false)),
            (TypeTag::Bool, Self::Int(1)) => Ok(Self::Bool(true)),
            (TypeTag::Object, Self::Null) => Ok(Self::Object(None)),
            (TypeTag::Glue, Self::Null) => Ok(Self::Glue(None)),
            (TypeTag::Class, Self::Null) => Ok(Self::Class(None)),
            (expected, other) => Err(SchemaError::TypeMismatch {
                expected,
                found: other.type_tag(),
            }),
        }
    }
}

impl From<f32> for TypedValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for TypedValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for TypedValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for TypedValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec3> for TypedValue {
    fn from(value: Vec3) -> Self {
        Self::Vector(value)
    }
}

impl From<ObjectRef> for TypedValue {
    fn from(value: ObjectRef) -> Self {
        Self::Object(Some(value))
    }
}
