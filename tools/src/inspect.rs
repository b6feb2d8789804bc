use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;
use wire::{decode_message, ChannelMessage, Limits};

use crate::capture::read_capture;

/// Structural summary of a capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub messages: usize,
    pub total_bytes: usize,
    pub inits: usize,
    pub signature_defs: usize,
    pub calls: usize,
    pub malformed: usize,
    /// Payload bytes across all calls.
    pub payload_bytes: usize,
    /// Signature table as defined in the capture.
    pub signatures: BTreeMap<u16, String>,
    /// Call count per signature; ids never defined show as `#id`.
    pub calls_by_signature: BTreeMap<String, usize>,
}

/// Summarises a capture without decoding payloads.
///
/// Malformed messages are counted, not fatal.
pub fn inspect_capture(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let messages = read_capture(bytes)?;
    let mut report = InspectReport {
        messages: messages.len(),
        total_bytes: messages.iter().map(|message| message.len()).sum(),
        ..InspectReport::default()
    };

    for message in messages {
        match decode_message(message, limits) {
            Ok(ChannelMessage::Init { .. }) => report.inits += 1,
            Ok(ChannelMessage::SignatureDef { id, signature }) => {
                report.signature_defs += 1;
                report.signatures.insert(id, signature.to_owned());
            }
            Ok(ChannelMessage::Call {
                signature_id,
                payload,
                ..
            }) => {
                report.calls += 1;
                report.payload_bytes += payload.len();
                let name = report
                    .signatures
                    .get(&signature_id)
                    .cloned()
                    .unwrap_or_else(|| format!("#{signature_id}"));
                *report.calls_by_signature.entry(name).or_default() += 1;
            }
            Err(_) => report.malformed += 1,
        }
    }
    Ok(report)
}
