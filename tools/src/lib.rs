//! Introspection and debugging tools for netrep channels.
//!
//! This crate works on captures of channel traffic:
//!
//! - Summarise message counts, signature tables and sizes
//! - Decode every message, including typed call arguments
//! - Name the entries of property syncs given a property manifest
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Make it easy to see what went over the wire.
//! - **Tolerant of bad input** - A malformed message is reported, not fatal.

mod capture;
mod decode;
mod inspect;
mod manifest;

pub use capture::{read_capture, write_capture};
pub use decode::{
    decode_capture, format_decode_pretty, CallBody, DecodedCapture, DecodedMessage, UpdateEntry,
};
pub use inspect::{inspect_capture, InspectReport};
pub use manifest::{manifest_to_properties, parse_manifest, ManifestEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use codec::{encode_args, encode_changes, CodecLimits, LocalGuidTable, UPDATE_SIGNATURE};
    use schema::{ObjectRef, TypedValue};
    use wire::{encode_message, ChannelMessage, Limits, NetGuid, Where};

    const MANIFEST: &str = r#"[{"name":"hp","tag":"I"},{"name":"name","tag":"S"}]"#;

    fn call(signature_id: u16, payload: &[u8]) -> Vec<u8> {
        encode_message(
            &ChannelMessage::Call {
                flags: Where::LOCAL | Where::INTERNAL,
                recipient: NetGuid::new(1),
                signature_id,
                payload,
            },
            &Limits::default(),
        )
        .unwrap()
    }

    fn def(id: u16, signature: &str) -> Vec<u8> {
        encode_message(&ChannelMessage::SignatureDef { id, signature }, &Limits::default())
            .unwrap()
    }

    fn sample_capture() -> Vec<u8> {
        let layout = parse_manifest(MANIFEST).unwrap();
        let mut guids = LocalGuidTable::new();
        let limits = CodecLimits::default();
        let update = encode_changes(
            &layout,
            &[("name", TypedValue::from("bob"))],
            true,
            &mut guids,
            &limits,
        )
        .unwrap();
        let (fire, args) = encode_args(
            "Fire",
            &[TypedValue::Int(3), TypedValue::from(ObjectRef::new(7))],
            &mut guids,
            &limits,
        )
        .unwrap();

        write_capture([
            encode_message(&ChannelMessage::Init { channel_id: 2 }, &Limits::default()).unwrap(),
            def(0, UPDATE_SIGNATURE),
            call(0, &update),
            def(1, &fire),
            call(1, &args),
            call(9, &[1, 2]),
            vec![0xFF],
        ])
        .unwrap()
    }

    #[test]
    fn public_api_exports() {
        let _ = InspectReport::default();
        let _ = read_capture(&[]);
        let _ = ManifestEntry {
            name: "hp".into(),
            tag: "I".into(),
        };
    }

    #[test]
    fn inspect_counts_by_kind() {
        let report = inspect_capture(&sample_capture(), &Limits::default()).unwrap();
        assert_eq!(report.messages, 7);
        assert_eq!(report.inits, 1);
        assert_eq!(report.signature_defs, 2);
        assert_eq!(report.calls, 3);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.signatures[&1], "Fire|I,O");
        assert_eq!(report.calls_by_signature[UPDATE_SIGNATURE], 1);
        assert_eq!(report.calls_by_signature["#9"], 1);
    }

    #[test]
    fn decode_names_sync_entries_and_arguments() {
        let layout = parse_manifest(MANIFEST).unwrap();
        let capture = decode_capture(
            &sample_capture(),
            Some(&layout),
            &Limits::default(),
            &CodecLimits::default(),
        )
        .unwrap();

        assert_eq!(capture.messages[0], DecodedMessage::Init { channel_id: 2 });
        let DecodedMessage::Call { body, .. } = &capture.messages[2] else {
            panic!("expected call, got {:?}", capture.messages[2]);
        };
        assert_eq!(
            body,
            &CallBody::Update {
                initial: true,
                entries: vec![UpdateEntry {
                    index: 1,
                    name: "name".into(),
                    value: TypedValue::from("bob"),
                }],
            }
        );

        let DecodedMessage::Call { body, .. } = &capture.messages[4] else {
            panic!("expected call, got {:?}", capture.messages[4]);
        };
        assert_eq!(
            body,
            &CallBody::Args {
                name: "Fire".into(),
                args: vec![TypedValue::Int(3), TypedValue::from(ObjectRef::new(1))],
            }
        );

        let DecodedMessage::Call {
            signature, body, ..
        } = &capture.messages[5]
        else {
            panic!("expected call, got {:?}", capture.messages[5]);
        };
        assert_eq!(signature, &None);
        assert_eq!(body, &CallBody::Raw { bytes: vec![1, 2] });
        assert!(matches!(capture.messages[6], DecodedMessage::Malformed { .. }));

        let pretty = format_decode_pretty(&capture);
        assert!(pretty.starts_with("7 messages"));
        assert!(pretty.contains("call Fire|I,O -> guid 1"));
    }

    #[test]
    fn sync_without_manifest_stays_raw() {
        let capture = decode_capture(
            &sample_capture(),
            None,
            &Limits::default(),
            &CodecLimits::default(),
        )
        .unwrap();
        let DecodedMessage::Call { body, .. } = &capture.messages[2] else {
            panic!("expected call");
        };
        assert!(matches!(body, CallBody::Raw { .. }));
    }
}
