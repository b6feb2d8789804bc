//! Property manifests: the declared layout of an actor's replicated
//! properties, used to name the entries of a property sync.

use anyhow::{anyhow, Context, Result};
use schema::{PropertySet, TypeTag};
use serde::{Deserialize, Serialize};

/// One declared property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Wire spelling of the type tag, such as `I` or `V`.
    pub tag: String,
}

/// Parses a JSON list of `{name, tag}` entries, in declaration order.
pub fn parse_manifest(json: &str) -> Result<PropertySet> {
    let entries: Vec<ManifestEntry> = serde_json::from_str(json).context("parse manifest json")?;
    manifest_to_properties(&entries)
}

/// Builds the property layout a manifest describes.
pub fn manifest_to_properties(entries: &[ManifestEntry]) -> Result<PropertySet> {
    let mut set = PropertySet::new();
    for entry in entries {
        let tag = TypeTag::parse(&entry.tag)
            .ok_or_else(|| anyhow!("property {}: unknown tag {:?}", entry.name, entry.tag))?;
        set.add_property(&entry.name, tag)
            .with_context(|| format!("property {}", entry.name))?;
    }
    Ok(set)
}
