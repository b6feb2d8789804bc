//! Tag-directed value marshalling.
//!
//! Every [`TypeTag`] has exactly one wire layout:
//!
//! ```text
//! F  f32                      I  i32
//! B  u32 (0 or 1)             by u32 length + bytes
//! S  u16 length + UTF-8       V  3 x f32 (x, y, z)
//! V2 2 x f32 (x, y)           R  3 x f32 (pitch, yaw, roll)
//! Q  4 x f32 (x, y, z, w)     LC 4 x f32 (r, g, b, a)
//! T  Q then V (translation) then V (scale)
//! O  u32 guid (0 = null)      P  u32 guid (0 = null)
//! C  class name as S ("" = null)
//! ```

use bitstream::{ByteReader, ByteWriter};
use schema::{
    LinearColor, ObjectRef, Quat, Rotator, SchemaError, Transform, TypeTag, TypedValue, Vec2, Vec3,
};
use wire::NetGuid;

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::guid::GuidCache;
use crate::limits::CodecLimits;

/// Bytes a bool occupies on the wire.
pub const BOOL_WIRE_SIZE: usize = 4;

/// Writes `value` using the layout of `tag`.
///
/// The value is coerced to `tag` first. On failure nothing is left in
/// `writer` from this call, but the caller still owns the whole message and
/// must drop it.
pub fn marshal(
    tag: TypeTag,
    value: &TypedValue,
    writer: &mut ByteWriter,
    guids: &mut dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<()> {
    let coerced;
    let value = if value.type_tag() == Some(tag) {
        value
    } else {
        coerced = value.clone().coerce(tag)?;
        &coerced
    };

    let start = writer.len();
    let result = write_value(tag, value, writer, guids, limits);
    if result.is_err() {
        writer.truncate(start);
    }
    result
}

/// Reads one value laid out as `tag`.
///
/// A reference whose guid is unknown here decodes as a null reference.
pub fn unmarshal(
    tag: TypeTag,
    reader: &mut ByteReader<'_>,
    guids: &dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<TypedValue> {
    let value = match tag {
        TypeTag::Float => TypedValue::Float(reader.read_f32()?),
        TypeTag::Int => TypedValue::Int(reader.read_i32()?),
        TypeTag::Bool => match reader.read_u32()? {
            0 => TypedValue::Bool(false),
            1 => TypedValue::Bool(true),
            raw => return Err(CodecError::InvalidBool { raw }),
        },
        TypeTag::Bytes => {
            let bytes = reader.read_bytes_u32()?;
            check_limit(LimitKind::BytesLength, limits.max_bytes_len, bytes.len())?;
            TypedValue::Bytes(bytes.to_vec())
        }
        TypeTag::Str => TypedValue::Str(read_string(reader, limits)?.to_owned()),
        TypeTag::Vector => TypedValue::Vector(read_vec3(reader)?),
        TypeTag::Vector2 => TypedValue::Vector2(Vec2 {
            x: reader.read_f32()?,
            y: reader.read_f32()?,
        }),
        TypeTag::Rotator => TypedValue::Rotator(Rotator {
            pitch: reader.read_f32()?,
            yaw: reader.read_f32()?,
            roll: reader.read_f32()?,
        }),
        TypeTag::Quat => TypedValue::Quat(read_quat(reader)?),
        TypeTag::LinearColor => TypedValue::LinearColor(LinearColor {
            r: reader.read_f32()?,
            g: reader.read_f32()?,
            b: reader.read_f32()?,
            a: reader.read_f32()?,
        }),
        TypeTag::Transform => TypedValue::Transform(Transform {
            rotation: read_quat(reader)?,
            translation: read_vec3(reader)?,
            scale: read_vec3(reader)?,
        }),
        TypeTag::Object => TypedValue::Object(read_object(reader, guids)?),
        TypeTag::Glue => TypedValue::Glue(read_object(reader, guids)?),
        TypeTag::Class => {
            let name = read_string(reader, limits)?;
            TypedValue::Class((!name.is_empty()).then(|| name.to_owned()))
        }
    };
    Ok(value)
}

fn write_value(
    tag: TypeTag,
    value: &TypedValue,
    writer: &mut ByteWriter,
    guids: &mut dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<()> {
    match value {
        TypedValue::Float(v) => writer.write_f32(*v),
        TypedValue::Int(v) => writer.write_i32(*v),
        TypedValue::Bool(v) => writer.write_u32(u32::from(*v)),
        TypedValue::Bytes(bytes) => {
            check_limit(LimitKind::BytesLength, limits.max_bytes_len, bytes.len())?;
            writer.write_bytes_u32(bytes)?;
        }
        TypedValue::Str(s) => write_string(s, writer, limits)?,
        TypedValue::Vector(v) => write_vec3(*v, writer),
        TypedValue::Vector2(v) => {
            writer.write_f32(v.x);
            writer.write_f32(v.y);
        }
        TypedValue::Rotator(r) => {
            writer.write_f32(r.pitch);
            writer.write_f32(r.yaw);
            writer.write_f32(r.roll);
        }
        TypedValue::Quat(q) => write_quat(*q, writer),
        TypedValue::LinearColor(c) => {
            writer.write_f32(c.r);
            writer.write_f32(c.g);
            writer.write_f32(c.b);
            writer.write_f32(c.a);
        }
        TypedValue::Transform(t) => {
            write_quat(t.rotation, writer);
            write_vec3(t.translation, writer);
            write_vec3(t.scale, writer);
        }
        TypedValue::Object(object) | TypedValue::Glue(object) => {
            let guid = match object {
                Some(object) => guids.get_or_assign(*object)?,
                None => NetGuid::NULL,
            };
            writer.write_u32(guid.raw());
        }
        TypedValue::Class(name) => write_string(name.as_deref().unwrap_or(""), writer, limits)?,
        TypedValue::Null => {
            return Err(CodecError::Schema(SchemaError::TypeMismatch {
                expected: tag,
                found: None,
            }))
        }
    }
    Ok(())
}

fn write_string(value: &str, writer: &mut ByteWriter, limits: &CodecLimits) -> CodecResult<()> {
    check_limit(LimitKind::StringLength, limits.max_string_len, value.len())?;
    writer.write_str_u16(value)?;
    Ok(())
}

fn read_string<'a>(reader: &mut ByteReader<'a>, limits: &CodecLimits) -> CodecResult<&'a str> {
    let value = reader.read_str_u16()?;
    check_limit(LimitKind::StringLength, limits.max_string_len, value.len())?;
    Ok(value)
}

fn write_vec3(v: Vec3, writer: &mut ByteWriter) {
    writer.write_f32(v.x);
    writer.write_f32(v.y);
    writer.write_f32(v.z);
}

fn read_vec3(reader: &mut ByteReader<'_>) -> CodecResult<Vec3> {
    Ok(Vec3::new(
        reader.read_f32()?,
        reader.read_f32()?,
        reader.read_f32()?,
    ))
}

fn write_quat(q: Quat, writer: &mut ByteWriter) {
    writer.write_f32(q.x);
    writer.write_f32(q.y);
    writer.write_f32(q.z);
    writer.write_f32(q.w);
}

fn read_quat(reader: &mut ByteReader<'_>) -> CodecResult<Quat> {
    Ok(Quat {
        x: reader.read_f32()?,
        y: reader.read_f32()?,
        z: reader.read_f32()?,
        w: reader.read_f32()?,
    })
}

fn read_object(
    reader: &mut ByteReader<'_>,
    guids: &dyn GuidCache,
) -> CodecResult<Option<ObjectRef>> {
    let guid = NetGuid::new(reader.read_u32()?);
    if guid.is_null() {
        return Ok(None);
    }
    let object = guids.resolve(guid);
    if object.is_none() {
        log::warn!("{guid} does not resolve to a known object, decoding as null");
    }
    Ok(object)
}

pub(crate) fn check_limit(kind: LimitKind, limit: usize, actual: usize) -> CodecResult<()> {
    if actual > limit {
        return Err(CodecError::LimitsExceeded {
            kind,
            limit,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::LocalGuidTable;
    use bitstream::ByteError;

    fn encode(tag: TypeTag, value: &TypedValue, guids: &mut LocalGuidTable) -> CodecResult<Vec<u8>> {
        let mut writer = ByteWriter::new();
        marshal(tag, value, &mut writer, guids, &CodecLimits::default())?;
        Ok(writer.finish())
    }

    fn decode(tag: TypeTag, bytes: &[u8], guids: &LocalGuidTable) -> CodecResult<TypedValue> {
        let mut reader = ByteReader::new(bytes);
        let value = unmarshal(tag, &mut reader, guids, &CodecLimits::default())?;
        assert!(reader.is_empty());
        Ok(value)
    }

    #[test]
    fn bool_occupies_four_bytes() {
        let mut guids = LocalGuidTable::new();
        let bytes = encode(TypeTag::Bool, &TypedValue::Bool(true), &mut guids).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0]);
        assert_eq!(bytes.len(), BOOL_WIRE_SIZE);
    }

    #[test]
    fn bool_other_than_zero_or_one_rejected() {
        let guids = LocalGuidTable::new();
        let err = decode(TypeTag::Bool, &[2, 0, 0, 0], &guids).unwrap_err();
        assert_eq!(err, CodecError::InvalidBool { raw: 2 });
    }

    #[test]
    fn string_layout() {
        let mut guids = LocalGuidTable::new();
        let bytes = encode(TypeTag::Str, &TypedValue::from("bob"), &mut guids).unwrap();
        assert_eq!(bytes, vec![3, 0, b'b', b'o', b'b']);
    }

    #[test]
    fn transform_field_order() {
        let mut guids = LocalGuidTable::new();
        let transform = Transform {
            rotation: Quat::IDENTITY,
            translation: Vec3::new(1.0, 2.0, 3.0),
            scale: Vec3::ONE,
        };
        let bytes = encode(TypeTag::Transform, &TypedValue::Transform(transform), &mut guids).unwrap();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[12..16], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &1.0f32.to_le_bytes());
        assert_eq!(decode(TypeTag::Transform, &bytes, &guids).unwrap(), TypedValue::Transform(transform));
    }

    #[test]
    fn null_reference_does_not_touch_registry() {
        let mut guids = LocalGuidTable::new();
        let bytes = encode(TypeTag::Object, &TypedValue::Object(None), &mut guids).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(guids.is_empty());
        assert_eq!(decode(TypeTag::Object, &bytes, &guids).unwrap(), TypedValue::Object(None));
    }

    #[test]
    fn untyped_null_accepted_for_reference() {
        let mut guids = LocalGuidTable::new();
        let bytes = encode(TypeTag::Glue, &TypedValue::Null, &mut guids).unwrap();
        assert_eq!(decode(TypeTag::Glue, &bytes, &guids).unwrap(), TypedValue::Glue(None));
    }

    #[test]
    fn object_reference_round_trips_through_guid() {
        let mut guids = LocalGuidTable::new();
        let object = ObjectRef::new(42);
        let bytes = encode(TypeTag::Object, &TypedValue::from(object), &mut guids).unwrap();
        assert_eq!(bytes, vec![1, 0, 0, 0]);
        assert_eq!(decode(TypeTag::Object, &bytes, &guids).unwrap(), TypedValue::Object(Some(object)));
    }

    #[test]
    fn unknown_guid_decodes_as_null() {
        let guids = LocalGuidTable::new();
        let value = decode(TypeTag::Object, &[9, 0, 0, 0], &guids).unwrap();
        assert_eq!(value, TypedValue::Object(None));
    }

    #[test]
    fn class_is_sent_by_name() {
        let mut guids = LocalGuidTable::new();
        let value = TypedValue::Class(Some("/Game/Hero.Hero_C".into()));
        let bytes = encode(TypeTag::Class, &value, &mut guids).unwrap();
        assert!(guids.is_empty());
        assert_eq!(decode(TypeTag::Class, &bytes, &guids).unwrap(), value);
        let empty = encode(TypeTag::Class, &TypedValue::Class(None), &mut guids).unwrap();
        assert_eq!(empty, vec![0, 0]);
    }

    #[test]
    fn int_is_coerced_to_float() {
        let mut guids = LocalGuidTable::new();
        let bytes = encode(TypeTag::Float, &TypedValue::Int(2), &mut guids).unwrap();
        assert_eq!(bytes, 2.0f32.to_le_bytes().to_vec());
    }

    #[test]
    fn structured_mismatch_writes_nothing() {
        let mut guids = LocalGuidTable::new();
        let mut writer = ByteWriter::new();
        writer.write_u8(0xEE);
        let err = marshal(
            TypeTag::Vector,
            &TypedValue::Int(1),
            &mut writer,
            &mut guids,
            &CodecLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Schema(SchemaError::TypeMismatch { .. })));
        assert_eq!(writer.as_slice(), &[0xEE]);
    }

    #[test]
    fn oversized_string_rejected() {
        let mut guids = LocalGuidTable::new();
        let mut writer = ByteWriter::new();
        let err = marshal(
            TypeTag::Str,
            &TypedValue::Str("x".repeat(300)),
            &mut writer,
            &mut guids,
            &CodecLimits::for_testing(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitsExceeded {
                kind: LimitKind::StringLength,
                ..
            }
        ));
        assert!(writer.is_empty());
    }

    #[test]
    fn truncated_input_is_eof() {
        let guids = LocalGuidTable::new();
        let err = decode(TypeTag::Vector, &[0, 0, 0, 0], &guids).unwrap_err();
        assert!(matches!(err, CodecError::Bytes(ByteError::UnexpectedEof { .. })));
    }
}
