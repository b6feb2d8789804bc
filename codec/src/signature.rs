//! Call signatures and auto-marshalled argument lists.
//!
//! A call made with raw bytes travels under its bare operation name. A call
//! made with typed arguments travels under `name|T1,T2,...`, and its payload
//! is the arguments marshalled back to back in that order.

use bitstream::{ByteReader, ByteWriter};
use schema::{TypeTag, TypedValue};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::guid::GuidCache;
use crate::limits::CodecLimits;
use crate::marshal::{check_limit, marshal, unmarshal};

/// Separates the operation name from its argument tags.
pub const TAG_SEPARATOR: char = '|';

/// A parsed call signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature<'a> {
    name: &'a str,
    arg_tags: Option<Vec<TypeTag>>,
}

impl<'a> Signature<'a> {
    /// Splits a signature into name and (for typed calls) argument tags.
    pub fn parse(signature: &'a str) -> CodecResult<Self> {
        let (name, tags) = match signature.split_once(TAG_SEPARATOR) {
            Some((name, tags)) => (name, Some(tags)),
            None => (signature, None),
        };
        if name.is_empty() {
            return Err(CodecError::InvalidSignature {
                signature: signature.to_owned(),
            });
        }
        let arg_tags = tags
            .map(|tags| {
                if tags.is_empty() {
                    Ok(Vec::new())
                } else {
                    tags.split(',').map(parse_tag).collect()
                }
            })
            .transpose()?;
        Ok(Self { name, arg_tags })
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// Returns the argument tags of a typed signature.
    #[must_use]
    pub fn arg_tags(&self) -> Option<&[TypeTag]> {
        self.arg_tags.as_deref()
    }

    #[must_use]
    pub const fn is_typed(&self) -> bool {
        self.arg_tags.is_some()
    }
}

/// Parses a tag spelling, failing on anything unknown.
pub fn parse_tag(tag: &str) -> CodecResult<TypeTag> {
    TypeTag::parse(tag).ok_or_else(|| CodecError::UnknownTag {
        tag: tag.to_owned(),
    })
}

/// Checks that `name` can travel as a bare operation name.
///
/// It must be non-empty and must not contain [`TAG_SEPARATOR`], which the
/// receiver would read as the start of argument tags.
pub fn check_call_name(name: &str) -> CodecResult<()> {
    if name.is_empty() || name.contains(TAG_SEPARATOR) {
        return Err(CodecError::InvalidSignature {
            signature: name.to_owned(),
        });
    }
    Ok(())
}

/// Builds `name|T1,T2,...`.
#[must_use]
pub fn typed_signature(name: &str, tags: &[TypeTag]) -> String {
    let mut signature = String::with_capacity(name.len() + 1 + tags.len() * 3);
    signature.push_str(name);
    signature.push(TAG_SEPARATOR);
    for (i, tag) in tags.iter().enumerate() {
        if i > 0 {
            signature.push(',');
        }
        signature.push_str(tag.as_str());
    }
    signature
}

/// Marshals a typed argument list.
///
/// Returns the typed signature and the payload. Every argument must carry a
/// type; an untyped `Null` has no tag to derive and is rejected.
pub fn encode_args(
    name: &str,
    args: &[TypedValue],
    guids: &mut dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<(String, Vec<u8>)> {
    check_call_name(name)?;
    check_limit(LimitKind::CallArguments, limits.max_call_args, args.len())?;

    let mut tags = Vec::with_capacity(args.len());
    let mut writer = ByteWriter::new();
    for (index, arg) in args.iter().enumerate() {
        let tag = arg
            .type_tag()
            .ok_or(CodecError::UntypedArgument { index })?;
        marshal(tag, arg, &mut writer, guids, limits)?;
        tags.push(tag);
    }
    Ok((typed_signature(name, &tags), writer.finish()))
}

/// Unmarshals a typed argument list, requiring the payload to be consumed.
pub fn decode_args(
    tags: &[TypeTag],
    payload: &[u8],
    guids: &dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<Vec<TypedValue>> {
    check_limit(LimitKind::CallArguments, limits.max_call_args, tags.len())?;

    let mut reader = ByteReader::new(payload);
    let mut args = Vec::with_capacity(tags.len());
    for tag in tags {
        if reader.is_empty() {
            return Err(CodecError::ArgumentCountMismatch {
                expected: tags.len(),
                actual: args.len(),
            });
        }
        args.push(unmarshal(*tag, &mut reader, guids, limits)?);
    }
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::LocalGuidTable;

    #[test]
    fn call_names_reject_separator() {
        assert!(check_call_name("Fire").is_ok());
        for name in ["", "Fire|I", "|"] {
            assert_eq!(
                check_call_name(name),
                Err(CodecError::InvalidSignature {
                    signature: name.to_owned()
                })
            );
        }
    }

    #[test]
    fn bare_signature() {
        let signature = Signature::parse("Fire").unwrap();
        assert_eq!(signature.name(), "Fire");
        assert!(!signature.is_typed());
        assert_eq!(signature.arg_tags(), None);
    }

    #[test]
    fn typed_signature_parses() {
        let signature = Signature::parse("Hit|F,O,V2").unwrap();
        assert_eq!(signature.name(), "Hit");
        assert_eq!(
            signature.arg_tags(),
            Some(&[TypeTag::Float, TypeTag::Object, TypeTag::Vector2][..])
        );
    }

    #[test]
    fn typed_signature_without_args() {
        let signature = Signature::parse("Ping|").unwrap();
        assert_eq!(signature.arg_tags(), Some(&[][..]));
        assert_eq!(typed_signature("Ping", &[]), "Ping|");
    }

    #[test]
    fn unknown_tag_rejected() {
        let err = Signature::parse("Hit|F,Z").unwrap_err();
        assert_eq!(err, CodecError::UnknownTag { tag: "Z".into() });
    }

    #[test]
    fn empty_name_rejected() {
        assert!(matches!(
            Signature::parse("|F"),
            Err(CodecError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn args_round_trip() {
        let mut guids = LocalGuidTable::new();
        let limits = CodecLimits::default();
        let args = vec![
            TypedValue::Float(1.5),
            TypedValue::from("hello"),
            TypedValue::Bool(true),
        ];
        let (signature, payload) = encode_args("Say", &args, &mut guids, &limits).unwrap();
        assert_eq!(signature, "Say|F,S,B");

        let parsed = Signature::parse(&signature).unwrap();
        let decoded = decode_args(parsed.arg_tags().unwrap(), &payload, &guids, &limits).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn untyped_argument_rejected() {
        let mut guids = LocalGuidTable::new();
        let err = encode_args(
            "Say",
            &[TypedValue::Int(1), TypedValue::Null],
            &mut guids,
            &CodecLimits::default(),
        )
        .unwrap_err();
        assert_eq!(err, CodecError::UntypedArgument { index: 1 });
    }

    #[test]
    fn separator_in_name_rejected() {
        let mut guids = LocalGuidTable::new();
        assert!(encode_args("a|b", &[], &mut guids, &CodecLimits::default()).is_err());
    }

    #[test]
    fn short_payload_reports_count() {
        let guids = LocalGuidTable::new();
        let err = decode_args(
            &[TypeTag::Int, TypeTag::Int],
            &7i32.to_le_bytes(),
            &guids,
            &CodecLimits::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CodecError::ArgumentCountMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn trailing_payload_rejected() {
        let guids = LocalGuidTable::new();
        let err = decode_args(&[], &[1], &guids, &CodecLimits::default()).unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes { remaining: 1 });
    }

    #[test]
    fn too_many_arguments_rejected() {
        let mut guids = LocalGuidTable::new();
        let args = vec![TypedValue::Int(0); 17];
        let err = encode_args("Many", &args, &mut guids, &CodecLimits::for_testing()).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::CallArguments,
                ..
            }
        ));
    }
}
