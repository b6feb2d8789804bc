//! Channel message encoding and decoding.
//!
//! Each transport message carries exactly one channel message:
//!
//! ```text
//! Init          [u8 1][u32 channel_id]
//! SignatureDef  [u8 2][u16 id][u16 len][utf-8 signature]
//! Call          [u8 3][u8 where][u32 recipient][u16 signature id][payload...]
//! ```
//!
//! All integers are little-endian. A call payload runs to the end of the
//! message.

use bitstream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;
use crate::{NetGuid, Where};

/// Size of a call message before its payload.
pub const CALL_HEADER_SIZE: usize = 1 + 1 + 4 + 2;

/// Message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Init = 1,
    SignatureDef = 2,
    Call = 3,
}

impl MessageKind {
    /// Parses a message kind from a raw byte.
    pub fn parse(kind: u8) -> Result<Self, DecodeError> {
        match kind {
            1 => Ok(Self::Init),
            2 => Ok(Self::SignatureDef),
            3 => Ok(Self::Call),
            _ => Err(DecodeError::UnknownKind { kind }),
        }
    }
}

/// A decoded channel message borrowing from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMessage<'a> {
    /// Host tells a newly connected client its channel id.
    Init { channel_id: u32 },
    /// Binds a signature string to a per-channel id.
    SignatureDef { id: u16, signature: &'a str },
    /// A routed call.
    Call {
        flags: Where,
        recipient: NetGuid,
        signature_id: u16,
        payload: &'a [u8],
    },
}

impl ChannelMessage<'_> {
    #[must_use]
    pub const fn kind(&self) -> MessageKind {
        match self {
            Self::Init { .. } => MessageKind::Init,
            Self::SignatureDef { .. } => MessageKind::SignatureDef,
            Self::Call { .. } => MessageKind::Call,
        }
    }
}

/// Encodes a channel message into a fresh buffer.
pub fn encode_message(message: &ChannelMessage<'_>, limits: &Limits) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ByteWriter::new();
    writer.write_u8(message.kind() as u8);
    match *message {
        ChannelMessage::Init { channel_id } => {
            writer.write_u32(channel_id);
        }
        ChannelMessage::SignatureDef { id, signature } => {
            check_encode_limit(
                LimitKind::SignatureLength,
                limits.max_signature_len,
                signature.len(),
            )?;
            writer.write_u16(id);
            writer
                .write_str_u16(signature)
                .map_err(|_| EncodeError::LengthOverflow {
                    length: signature.len(),
                })?;
        }
        ChannelMessage::Call {
            flags,
            recipient,
            signature_id,
            payload,
        } => {
            check_encode_limit(
                LimitKind::PayloadBytes,
                limits.max_payload_bytes,
                payload.len(),
            )?;
            writer.write_u8(flags.raw());
            writer.write_u32(recipient.raw());
            writer.write_u16(signature_id);
            writer.write_raw(payload);
        }
    }
    check_encode_limit(
        LimitKind::MessageBytes,
        limits.max_message_bytes,
        writer.len(),
    )?;
    Ok(writer.finish())
}

/// Checks that a call with this signature and payload fits within `limits`,
/// including the signature definition it may need first.
///
/// Encoding the same call later cannot fail on size once this passes.
pub fn check_call_fits(
    signature: &str,
    payload: &[u8],
    limits: &Limits,
) -> Result<(), EncodeError> {
    check_encode_limit(
        LimitKind::SignatureLength,
        limits.max_signature_len,
        signature.len(),
    )?;
    if u16::try_from(signature.len()).is_err() {
        return Err(EncodeError::LengthOverflow {
            length: signature.len(),
        });
    }
    check_encode_limit(
        LimitKind::MessageBytes,
        limits.max_message_bytes,
        1 + 2 + 2 + signature.len(),
    )?;
    check_encode_limit(
        LimitKind::PayloadBytes,
        limits.max_payload_bytes,
        payload.len(),
    )?;
    check_encode_limit(
        LimitKind::MessageBytes,
        limits.max_message_bytes,
        CALL_HEADER_SIZE + payload.len(),
    )
}

/// Decodes one channel message.
pub fn decode_message<'a>(buf: &'a [u8], limits: &Limits) -> WireResult<ChannelMessage<'a>> {
    if buf.is_empty() {
        return Err(DecodeError::EmptyMessage);
    }
    check_decode_limit(LimitKind::MessageBytes, limits.max_message_bytes, buf.len())?;

    let mut reader = ByteReader::new(buf);
    let kind = MessageKind::parse(reader.read_u8()?)?;
    let message = match kind {
        MessageKind::Init => {
            let channel_id = reader.read_u32()?;
            ensure_consumed(&reader)?;
            ChannelMessage::Init { channel_id }
        }
        MessageKind::SignatureDef => {
            let id = reader.read_u16()?;
            let signature = reader.read_str_u16()?;
            check_decode_limit(
                LimitKind::SignatureLength,
                limits.max_signature_len,
                signature.len(),
            )?;
            ensure_consumed(&reader)?;
            ChannelMessage::SignatureDef { id, signature }
        }
        MessageKind::Call => {
            let raw_flags = reader.read_u8()?;
            let flags = Where::from_raw(raw_flags);
            if !flags.is_valid() {
                return Err(DecodeError::InvalidFlags { flags: raw_flags });
            }
            let recipient = NetGuid::new(reader.read_u32()?);
            let signature_id = reader.read_u16()?;
            let payload = reader.read_rest();
            check_decode_limit(
                LimitKind::PayloadBytes,
                limits.max_payload_bytes,
                payload.len(),
            )?;
            ChannelMessage::Call {
                flags,
                recipient,
                signature_id,
                payload,
            }
        }
    };
    Ok(message)
}

/// Reads the message kind without decoding the body.
pub fn peek_kind(buf: &[u8]) -> WireResult<MessageKind> {
    let kind = buf.first().copied().ok_or(DecodeError::EmptyMessage)?;
    MessageKind::parse(kind)
}

fn ensure_consumed(reader: &ByteReader<'_>) -> WireResult<()> {
    if reader.is_empty() {
        Ok(())
    } else {
        Err(DecodeError::TrailingBytes {
            remaining: reader.remaining(),
        })
    }
}

fn check_decode_limit(kind: LimitKind, limit: usize, actual: usize) -> WireResult<()> {
    if actual > limit {
        return Err(DecodeError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}

fn check_encode_limit(kind: LimitKind, limit: usize, actual: usize) -> Result<(), EncodeError> {
    if actual > limit {
        return Err(EncodeError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}
