//! Typed value marshalling and property sync payloads for netrep.
//!
//! This crate ties together bitstream, wire and schema to turn typed values
//! into call payloads and back:
//!
//! # Features
//!
//! - Tag-directed marshal/unmarshal for every [`TypeTag`](schema::TypeTag)
//! - Object identity through a [`GuidCache`] (authoritative or local)
//! - Typed call signatures (`name|T1,T2`) with auto-marshalled arguments
//! - Override-only and full property snapshots, and incremental changes
//!
//! # Design Principles
//!
//! - **Exact inverses** - `unmarshal(marshal(v)) == v` for every tag.
//! - **All or nothing** - A failed field drops the whole message; a failed
//!   sync never partially applies.
//! - **Unresolved is null** - A reference this end cannot resolve decodes as
//!   null instead of failing the message.

mod error;
mod guid;
mod limits;
mod marshal;
mod signature;
mod update;

pub use error::{CodecError, CodecResult, LimitKind};
pub use guid::{GuidCache, GuidRegistry, LocalGuidTable};
pub use limits::CodecLimits;
pub use marshal::{marshal, unmarshal, BOOL_WIRE_SIZE};
pub use signature::{
    check_call_name, decode_args, encode_args, parse_tag, typed_signature, Signature,
    TAG_SEPARATOR,
};
pub use update::{
    decode_update, encode_changes, encode_snapshot, PropertyUpdate, SnapshotKind,
    UPDATE_SIGNATURE,
};
pub use wire::Limits as WireLimits;
