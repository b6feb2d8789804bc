//! Property sync payloads.
//!
//! ```text
//! [u8 initial (0|1)] ([u16 index][value by declared tag])* [u16 0xFFFF]
//! ```
//!
//! Indices refer to the receiver's own [`PropertySet`], so both ends must
//! have declared the same properties in the same order.

use bitstream::{ByteReader, ByteWriter};
use schema::{PropertySet, TypeTag, TypedValue, END_OF_PROPERTIES};

use crate::error::{CodecError, CodecResult, LimitKind};
use crate::guid::GuidCache;
use crate::limits::CodecLimits;
use crate::marshal::{check_limit, marshal, unmarshal};

/// Reserved signature of property sync calls.
pub const UPDATE_SIGNATURE: &str = "__nrupdate__";

/// Which properties a snapshot includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Only properties given an explicit initial value.
    ///
    /// Valid when every receiver starts from the declared defaults.
    OverridesOnly,
    /// Every property's current value.
    Full,
}

/// A decoded sync payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyUpdate {
    /// Set for spawn-time and late-joiner snapshots.
    pub initial: bool,
    /// `(index, value)` pairs in payload order.
    pub entries: Vec<(u16, TypedValue)>,
}

impl PropertyUpdate {
    /// Writes every entry into `set` and returns the changed names in
    /// payload order.
    ///
    /// All entries are checked before any is written, so a failure leaves
    /// `set` untouched.
    pub fn apply(self, set: &mut PropertySet) -> CodecResult<Vec<String>> {
        let count = set.len();
        let mut staged = Vec::with_capacity(self.entries.len());
        for (index, value) in self.entries {
            let property = set
                .get(index)
                .ok_or(CodecError::PropertyIndexOutOfRange { index, count })?;
            let value = value.coerce(property.tag())?;
            staged.push((index, property.name().to_owned(), value));
        }

        let mut names = Vec::with_capacity(staged.len());
        for (index, name, value) in staged {
            set.set_value(index, value)?;
            names.push(name);
        }
        Ok(names)
    }
}

/// Encodes a snapshot of `set` with the initial-state bit set.
pub fn encode_snapshot(
    set: &PropertySet,
    kind: SnapshotKind,
    guids: &mut dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    let entries: Vec<_> = match kind {
        SnapshotKind::OverridesOnly => set
            .overrides()
            .map(|(index, p)| (index, p.tag(), p.value()))
            .collect(),
        SnapshotKind::Full => set
            .iter()
            .map(|(index, p)| (index, p.tag(), p.value()))
            .collect(),
    };
    write_payload(true, &entries, guids, limits)
}

/// Encodes named changes against the layout of `set`.
///
/// Values are coerced to each property's declared type. `set` itself is not
/// modified; receivers (including a local one) apply the payload.
pub fn encode_changes(
    set: &PropertySet,
    changes: &[(&str, TypedValue)],
    initial: bool,
    guids: &mut dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    let mut entries = Vec::with_capacity(changes.len());
    for (name, value) in changes {
        let index = set.require_index(name)?;
        let tag = set
            .get(index)
            .map(schema::Property::tag)
            .ok_or(CodecError::PropertyIndexOutOfRange {
                index,
                count: set.len(),
            })?;
        entries.push((index, tag, value));
    }
    write_payload(initial, &entries, guids, limits)
}

fn write_payload(
    initial: bool,
    entries: &[(u16, TypeTag, &TypedValue)],
    guids: &mut dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<Vec<u8>> {
    check_limit(
        LimitKind::UpdateEntries,
        limits.max_update_entries,
        entries.len(),
    )?;
    let mut writer = ByteWriter::with_capacity(3 + entries.len() * 6);
    writer.write_u8(u8::from(initial));
    for (index, tag, value) in entries {
        writer.write_u16(*index);
        marshal(*tag, value, &mut writer, guids, limits)?;
    }
    writer.write_u16(END_OF_PROPERTIES);
    Ok(writer.finish())
}

/// Decodes a sync payload against the receiver's property layout.
pub fn decode_update(
    set: &PropertySet,
    payload: &[u8],
    guids: &dyn GuidCache,
    limits: &CodecLimits,
) -> CodecResult<PropertyUpdate> {
    let mut reader = ByteReader::new(payload);
    let initial = match reader.read_u8()? {
        0 => false,
        1 => true,
        raw => return Err(CodecError::InvalidInitialFlag { raw }),
    };

    let mut entries = Vec::new();
    loop {
        if reader.is_empty() {
            return Err(CodecError::MissingTerminator);
        }
        let index = reader.read_u16()?;
        if index == END_OF_PROPERTIES {
            break;
        }
        let property = set.get(index).ok_or(CodecError::PropertyIndexOutOfRange {
            index,
            count: set.len(),
        })?;
        check_limit(
            LimitKind::UpdateEntries,
            limits.max_update_entries,
            entries.len() + 1,
        )?;
        let value = unmarshal(property.tag(), &mut reader, guids, limits)?;
        entries.push((index, value));
    }

    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }
    Ok(PropertyUpdate { initial, entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::LocalGuidTable;

    fn hp_and_name() -> PropertySet {
        let mut set = PropertySet::new();
        set.add_property("hp", TypedValue::Int(100)).unwrap();
        set.add_property("name", TypedValue::from("bob")).unwrap();
        set
    }

    #[test]
    fn override_snapshot_of_untouched_set_is_empty() {
        let set = hp_and_name();
        let mut guids = LocalGuidTable::new();
        let payload =
            encode_snapshot(&set, SnapshotKind::OverridesOnly, &mut guids, &CodecLimits::default())
                .unwrap();
        assert_eq!(payload, vec![1, 0xFF, 0xFF]);
    }

    #[test]
    fn change_layout() {
        let set = hp_and_name();
        let mut guids = LocalGuidTable::new();
        let payload = encode_changes(
            &set,
            &[("hp", TypedValue::Int(80))],
            false,
            &mut guids,
            &CodecLimits::default(),
        )
        .unwrap();
        assert_eq!(payload, vec![0, 0, 0, 80, 0, 0, 0, 0xFF, 0xFF]);
    }

    #[test]
    fn full_snapshot_round_trip() {
        let mut set = hp_and_name();
        set.set_value(0, TypedValue::Int(80)).unwrap();
        let mut guids = LocalGuidTable::new();
        let limits = CodecLimits::default();
        let payload = encode_snapshot(&set, SnapshotKind::Full, &mut guids, &limits).unwrap();

        let update = decode_update(&hp_and_name(), &payload, &guids, &limits).unwrap();
        assert!(update.initial);
        assert_eq!(
            update.entries,
            vec![(0, TypedValue::Int(80)), (1, TypedValue::from("bob"))]
        );
    }

    #[test]
    fn unknown_change_name_rejected() {
        let set = hp_and_name();
        let mut guids = LocalGuidTable::new();
        let err = encode_changes(
            &set,
            &[("mana", TypedValue::Int(1))],
            false,
            &mut guids,
            &CodecLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::Schema(_)));
    }

    #[test]
    fn index_beyond_layout_is_version_skew() {
        let set = hp_and_name();
        let guids = LocalGuidTable::new();
        let payload = [0, 5, 0, 1, 0, 0, 0, 0xFF, 0xFF];
        let err = decode_update(&set, &payload, &guids, &CodecLimits::default()).unwrap_err();
        assert_eq!(err, CodecError::PropertyIndexOutOfRange { index: 5, count: 2 });
    }

    #[test]
    fn missing_terminator() {
        let set = hp_and_name();
        let guids = LocalGuidTable::new();
        let err = decode_update(&set, &[0, 0, 0, 1, 0, 0, 0], &guids, &CodecLimits::default())
            .unwrap_err();
        assert_eq!(err, CodecError::MissingTerminator);
    }

    #[test]
    fn bad_initial_flag() {
        let set = hp_and_name();
        let guids = LocalGuidTable::new();
        let err = decode_update(&set, &[2, 0xFF, 0xFF], &guids, &CodecLimits::default()).unwrap_err();
        assert_eq!(err, CodecError::InvalidInitialFlag { raw: 2 });
    }

    #[test]
    fn trailing_bytes_after_terminator() {
        let set = hp_and_name();
        let guids = LocalGuidTable::new();
        let err = decode_update(&set, &[0, 0xFF, 0xFF, 7], &guids, &CodecLimits::default())
            .unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes { remaining: 1 });
    }

    #[test]
    fn apply_reports_names_in_payload_order() {
        let mut set = hp_and_name();
        let update = PropertyUpdate {
            initial: false,
            entries: vec![(1, TypedValue::from("amy")), (0, TypedValue::Int(5))],
        };
        let names = update.apply(&mut set).unwrap();
        assert_eq!(names, vec!["name".to_owned(), "hp".to_owned()]);
        assert_eq!(set.value("hp"), Some(&TypedValue::Int(5)));
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut set = hp_and_name();
        let before = set.clone();
        let update = PropertyUpdate {
            initial: false,
            entries: vec![(0, TypedValue::Int(5)), (9, TypedValue::Int(1))],
        };
        assert!(update.apply(&mut set).is_err());
        assert_eq!(set, before);
    }
}
