//! Typed values and replicated property sets for netrep.
//!
//! This crate defines what can travel over the wire and how an actor
//! declares the state it keeps synchronized:
//! - Type tags and the [`TypedValue`] sum type
//! - Scalar coercion rules between wire-compatible kinds
//! - [`PropertySet`], the per-actor ordered property holder
//! - Deterministic layout hashing for version-skew diagnostics
//!
//! # Design Principles
//!
//! - **Runtime-declared** - Properties are declared at runtime, not derived from Rust types.
//! - **Exhaustive dispatch** - Adding a value kind forces every match to be updated.
//! - **No silent conversion** - Only lossless scalar coercions are allowed.

mod error;
mod hash;
mod property;
mod tag;
mod value;

pub use error::{SchemaError, SchemaResult};
pub use hash::property_set_hash;
pub use property::{Property, PropertyDefault, PropertySet, END_OF_PROPERTIES, MAX_PROPERTIES};
pub use tag::TypeTag;
pub use value::{LinearColor, ObjectRef, Quat, Rotator, Transform, TypedValue, Vec2, Vec3};
