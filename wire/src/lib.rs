//! Destination flags and channel message framing for netrep.
//!
//! This crate handles the binary format of the messages a replication
//! channel exchanges: channel identity, signature definitions and routed
//! calls. It knows what a call looks like on the wire, but not how its
//! payload is encoded or where it should be routed.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Flag values and message layouts never change meaning.
//! - **Bounded decoding** - Every length is validated against [`Limits`].
//! - **No domain knowledge** - Payloads are opaque bytes at this layer.

mod error;
mod flags;
mod guid;
mod limits;
mod message;

pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use flags::Where;
pub use guid::NetGuid;
pub use limits::Limits;
pub use message::{
    check_call_fits, decode_message, encode_message, peek_kind, ChannelMessage, MessageKind,
    CALL_HEADER_SIZE,
};
