//! Error types for routing, channels and actor replication.

use std::fmt;

use codec::CodecError;
use schema::{ObjectRef, SchemaError};
use wire::{DecodeError, EncodeError, NetGuid};

use crate::peer::{NetMode, PeerId};

/// Result type for replication operations.
pub type ReplicationResult<T> = Result<T, ReplicationError>;

/// Errors raised while routing calls or handling channel traffic.
///
/// None of these is fatal to a session: the affected message is dropped and
/// everything else carries on.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ReplicationError {
    /// A call asked to be delivered nowhere.
    NowhereFlags,

    /// The target object is invalid or already destroyed.
    InvalidObject { object: ObjectRef },

    /// The actor never registered replicated properties.
    NotRegistered { object: ObjectRef },

    /// A received call names a guid this machine cannot resolve.
    UnknownRecipient { guid: NetGuid },

    /// A received call uses a signature id that was never defined.
    UnknownSignature { id: u16 },

    /// A channel direction ran out of signature ids.
    SignatureTableFull { max: usize },

    /// The channel has been closed.
    ChannelClosed { peer: PeerId },

    /// No channel is open to the destination peer.
    MissingChannel { peer: PeerId },

    /// A second channel to the same peer was opened.
    ChannelAlreadyOpen { peer: PeerId },

    /// The operation is not available in this net mode.
    UnsupportedMode {
        mode: NetMode,
        operation: &'static str,
    },

    /// Every client channel id is in use.
    PeerIdsExhausted,

    /// Marshalling failure.
    Codec(CodecError),

    /// Property declaration or lookup failure.
    Schema(SchemaError),

    /// A received message could not be decoded.
    Decode(DecodeError),

    /// An outgoing message could not be encoded.
    Encode(EncodeError),
}

impl From<CodecError> for ReplicationError {
    fn from(err: CodecError) -> Self {
        Self::Codec(err)
    }
}

impl From<SchemaError> for ReplicationError {
    fn from(err: SchemaError) -> Self {
        Self::Schema(err)
    }
}

impl From<DecodeError> for ReplicationError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<EncodeError> for ReplicationError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl fmt::Display for ReplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NowhereFlags => write!(f, "call has no destination"),
            Self::InvalidObject { object } => {
                write!(f, "object {} is invalid or destroyed", object.raw())
            }
            Self::NotRegistered { object } => {
                write!(f, "object {} has no replicated properties", object.raw())
            }
            Self::UnknownRecipient { guid } => write!(f, "unknown recipient {guid}"),
            Self::UnknownSignature { id } => write!(f, "unknown signature id {id}"),
            Self::SignatureTableFull { max } => {
                write!(f, "signature table full ({max} entries)")
            }
            Self::ChannelClosed { peer } => write!(f, "channel to {peer} is closed"),
            Self::MissingChannel { peer } => write!(f, "no channel to {peer}"),
            Self::ChannelAlreadyOpen { peer } => write!(f, "channel to {peer} already open"),
            Self::UnsupportedMode { mode, operation } => {
                write!(f, "{operation} is not available in {mode} mode")
            }
            Self::PeerIdsExhausted => write!(f, "no free channel id"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::Decode(e) => write!(f, "decode error: {e}"),
            Self::Encode(e) => write!(f, "encode error: {e}"),
        }
    }
}

impl std::error::Error for ReplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Decode(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}
