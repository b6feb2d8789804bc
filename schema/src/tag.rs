//! Short type tags naming each wire-encodable value kind.

use std::fmt;

/// Type tag for a replicated value or call argument.
///
/// Each tag has a unique one- or two-character spelling that appears in
/// typed call signatures (`name|F,I`) and in property manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeTag {
    Float,
    Int,
    Bool,
    Bytes,
    Str,
    Vector,
    Vector2,
    Rotator,
    Quat,
    LinearColor,
    Transform,
    Object,
    Glue,
    Class,
}

impl TypeTag {
    /// Every tag, in a fixed order.
    pub const ALL: [Self; 14] = [
        Self::Float,
        Self::Int,
        Self::Bool,
        Self::Bytes,
        Self::Str,
        Self::Vector,
        Self::Vector2,
        Self::Rotator,
        Self::Quat,
        Self::LinearColor,
        Self::Transform,
        Self::Object,
        Self::Glue,
        Self::Class,
    ];

    /// Returns the wire spelling of the tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float => "F",
            Self::Int => "I",
            Self::Bool => "B",
            Self::Bytes => "by",
            Self::Str => "S",
            Self::Vector => "V",
            Self::Vector2 => "V2",
            Self::Rotator => "R",
            Self::Quat => "Q",
            Self::LinearColor => "LC",
            Self::Transform => "T",
            Self::Object => "O",
            Self::Glue => "P",
            Self::Class => "C",
        }
    }

    /// Parses a tag from its wire spelling.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == tag)
    }

    /// Returns `true` for tags whose values reference objects by identity.
    #[must_use]
    pub const fn is_reference(self) -> bool {
        matches!(self, Self::Object | Self::Glue | Self::Class)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn spellings_are_unique() {
        let spellings: HashSet<_> = TypeTag::ALL.iter().map(|tag| tag.as_str()).collect();
        assert_eq!(spellings.len(), TypeTag::ALL.len());
    }

    #[test]
    fn parse_inverts_as_str() {
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::parse(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn parse_rejects_unknown_and_empty() {
        assert_eq!(TypeTag::parse(""), None);
        assert_eq!(TypeTag::parse("X"), None);
        assert_eq!(TypeTag::parse("f"), None);
    }

    #[test]
    fn reference_tags() {
        assert!(TypeTag::Object.is_reference());
        assert!(TypeTag::Glue.is_reference());
        assert!(TypeTag::Class.is_reference());
        assert!(!TypeTag::Int.is_reference());
    }
}
