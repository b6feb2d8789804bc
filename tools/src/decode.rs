use std::collections::HashMap;
use std::fmt::Write as _;

use anyhow::Result;
use codec::{
    decode_args, decode_update, CodecError, CodecLimits, CodecResult, GuidCache, Signature,
    UPDATE_SIGNATURE,
};
use schema::{ObjectRef, PropertySet, TypedValue};
use serde::Serialize;
use wire::{decode_message, ChannelMessage, Limits, NetGuid};

use crate::capture::read_capture;

/// Every message of a capture, decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedCapture {
    pub total_bytes: usize,
    pub messages: Vec<DecodedMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedMessage {
    Init {
        channel_id: u32,
    },
    SignatureDef {
        id: u16,
        signature: String,
    },
    Call {
        flags: String,
        recipient: u32,
        signature_id: u16,
        /// `None` if the capture never defined the id.
        signature: Option<String>,
        body: CallBody,
    },
    Malformed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallBody {
    /// Opaque payload.
    Raw { bytes: Vec<u8> },
    /// Arguments of a typed signature.
    Args { name: String, args: Vec<TypedValue> },
    /// A property sync decoded against a manifest.
    Update {
        initial: bool,
        entries: Vec<UpdateEntry>,
    },
    /// The payload did not match its signature or manifest.
    Invalid { error: String, bytes: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateEntry {
    pub index: u16,
    pub name: String,
    pub value: TypedValue,
}

/// Shows object references by their guid.
struct GuidsAsObjects;

impl GuidCache for GuidsAsObjects {
    fn resolve(&self, guid: NetGuid) -> Option<ObjectRef> {
        (!guid.is_null()).then(|| ObjectRef::new(u64::from(guid.raw())))
    }

    fn guid_of(&self, object: ObjectRef) -> Option<NetGuid> {
        u32::try_from(object.raw()).ok().map(NetGuid::new)
    }

    fn get_or_assign(&mut self, object: ObjectRef) -> CodecResult<NetGuid> {
        self.guid_of(object).ok_or(CodecError::GuidsExhausted)
    }
}

/// Decodes a capture.
///
/// Signature ids resolve through the definitions seen so far. Property
/// syncs are decoded only when `properties` gives their layout.
pub fn decode_capture(
    bytes: &[u8],
    properties: Option<&PropertySet>,
    wire_limits: &Limits,
    codec_limits: &CodecLimits,
) -> Result<DecodedCapture> {
    let messages = read_capture(bytes)?;
    let total_bytes = messages.iter().map(|message| message.len()).sum();
    let mut signatures: HashMap<u16, String> = HashMap::new();
    let mut decoded = Vec::with_capacity(messages.len());

    for message in messages {
        let entry = match decode_message(message, wire_limits) {
            Ok(ChannelMessage::Init { channel_id }) => DecodedMessage::Init { channel_id },
            Ok(ChannelMessage::SignatureDef { id, signature }) => {
                signatures.insert(id, signature.to_owned());
                DecodedMessage::SignatureDef {
                    id,
                    signature: signature.to_owned(),
                }
            }
            Ok(ChannelMessage::Call {
                flags,
                recipient,
                signature_id,
                payload,
            }) => {
                let signature = signatures.get(&signature_id).cloned();
                let body = match &signature {
                    Some(signature) => {
                        decode_body(signature, payload, properties, codec_limits)
                    }
                    None => CallBody::Raw {
                        bytes: payload.to_vec(),
                    },
                };
                DecodedMessage::Call {
                    flags: flags.to_string(),
                    recipient: recipient.raw(),
                    signature_id,
                    signature,
                    body,
                }
            }
            Err(err) => DecodedMessage::Malformed {
                error: err.to_string(),
            },
        };
        decoded.push(entry);
    }

    Ok(DecodedCapture {
        total_bytes,
        messages: decoded,
    })
}

fn decode_body(
    signature: &str,
    payload: &[u8],
    properties: Option<&PropertySet>,
    limits: &CodecLimits,
) -> CallBody {
    let invalid = |error: CodecError| CallBody::Invalid {
        error: error.to_string(),
        bytes: payload.to_vec(),
    };

    if signature == UPDATE_SIGNATURE {
        let Some(properties) = properties else {
            return CallBody::Raw {
                bytes: payload.to_vec(),
            };
        };
        return match decode_update(properties, payload, &GuidsAsObjects, limits) {
            Ok(update) => CallBody::Update {
                initial: update.initial,
                entries: update
                    .entries
                    .into_iter()
                    .map(|(index, value)| UpdateEntry {
                        index,
                        name: properties
                            .get(index)
                            .map_or_else(String::new, |property| property.name().to_owned()),
                        value,
                    })
                    .collect(),
            },
            Err(err) => invalid(err),
        };
    }

    let parsed = match Signature::parse(signature) {
        Ok(parsed) => parsed,
        Err(err) => return invalid(err),
    };
    match parsed.arg_tags() {
        Some(tags) => match decode_args(tags, payload, &GuidsAsObjects, limits) {
            Ok(args) => CallBody::Args {
                name: parsed.name().to_owned(),
                args,
            },
            Err(err) => invalid(err),
        },
        None => CallBody::Raw {
            bytes: payload.to_vec(),
        },
    }
}

/// Renders a decoded capture one message per line.
pub fn format_decode_pretty(capture: &DecodedCapture) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} messages, {} bytes",
        capture.messages.len(),
        capture.total_bytes
    );
    for (index, message) in capture.messages.iter().enumerate() {
        let _ = write!(out, "[{index}] ");
        match message {
            DecodedMessage::Init { channel_id } => {
                let _ = writeln!(out, "init channel {channel_id}");
            }
            DecodedMessage::SignatureDef { id, signature } => {
                let _ = writeln!(out, "sig #{id} = {signature}");
            }
            DecodedMessage::Call {
                flags,
                recipient,
                signature_id,
                signature,
                body,
            } => {
                let name = signature
                    .clone()
                    .unwrap_or_else(|| format!("#{signature_id}"));
                let _ = writeln!(out, "call {name} -> guid {recipient} [{flags}]");
                format_body(&mut out, body);
            }
            DecodedMessage::Malformed { error } => {
                let _ = writeln!(out, "malformed: {error}");
            }
        }
    }
    out
}

fn format_body(out: &mut String, body: &CallBody) {
    match body {
        CallBody::Raw { bytes } => {
            let _ = writeln!(out, "    {} raw bytes", bytes.len());
        }
        CallBody::Args { args, .. } => {
            for (index, arg) in args.iter().enumerate() {
                let _ = writeln!(out, "    arg {index}: {arg:?}");
            }
        }
        CallBody::Update { initial, entries } => {
            let kind = if *initial { "initial" } else { "delta" };
            let _ = writeln!(out, "    {kind} sync, {} entries", entries.len());
            for entry in entries {
                let _ = writeln!(out, "    {} ({}): {:?}", entry.name, entry.index, entry.value);
            }
        }
        CallBody::Invalid { error, bytes } => {
            let _ = writeln!(out, "    invalid payload ({} bytes): {error}", bytes.len());
        }
    }
}
