//! Deterministic property-set layout hashing.

use blake3::Hasher;

use crate::{PropertySet, TypeTag};

/// Computes a deterministic hash of a property set's declared layout.
///
/// Only names and types in index order contribute; current values do not.
/// Two machines that declared the same properties in the same order produce
/// the same hash.
#[must_use]
pub fn property_set_hash(set: &PropertySet) -> u64 {
    let mut hasher = Hasher::new();
    write_u32(&mut hasher, u32::try_from(set.len()).unwrap_or(u32::MAX));

    for (index, property) in set.iter() {
        write_u16(&mut hasher, index);
        write_str(&mut hasher, property.name());
        write_tag(&mut hasher, property.tag());
    }

    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}

fn write_tag(hasher: &mut Hasher, tag: TypeTag) {
    write_str(hasher, tag.as_str());
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_u32(hasher, u32::try_from(value.len()).unwrap_or(u32::MAX));
    hasher.update(value.as_bytes());
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}

fn write_u32(hasher: &mut Hasher, value: u32) {
    hasher.update(&value.to_le_bytes());
}
