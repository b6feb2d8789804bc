//! Per-channel signature interning.
//!
//! Each direction of a channel keeps its own table. The sender assigns ids
//! in first-use order starting at 0 and defines each one on the wire before
//! its first call; the receiver learns ids only from those definitions.

use std::collections::HashMap;

use crate::error::{ReplicationError, ReplicationResult};

/// Signatures this end has defined for the peer.
#[derive(Debug, Clone)]
pub struct OutboundSignatures {
    ids: HashMap<String, u16>,
    max: usize,
}

impl OutboundSignatures {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            ids: HashMap::new(),
            max: max.min(usize::from(u16::MAX) + 1),
        }
    }

    #[must_use]
    pub fn get(&self, signature: &str) -> Option<u16> {
        self.ids.get(signature).copied()
    }

    /// Returns the id the next new signature would receive.
    pub fn next_id(&self) -> ReplicationResult<u16> {
        if self.ids.len() >= self.max {
            return Err(ReplicationError::SignatureTableFull { max: self.max });
        }
        u16::try_from(self.ids.len())
            .map_err(|_| ReplicationError::SignatureTableFull { max: self.max })
    }

    /// Records `signature` under `id` as returned by [`next_id`](Self::next_id).
    pub fn insert(&mut self, signature: &str, id: u16) {
        self.ids.insert(signature.to_owned(), id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Signatures the peer has defined for this end.
#[derive(Debug, Clone)]
pub struct InboundSignatures {
    names: HashMap<u16, String>,
    max: usize,
}

impl InboundSignatures {
    #[must_use]
    pub fn new(max: usize) -> Self {
        Self {
            names: HashMap::new(),
            max,
        }
    }

    /// Binds `id` to `signature`, replacing any earlier binding.
    pub fn define(&mut self, id: u16, signature: &str) -> ReplicationResult<()> {
        if usize::from(id) >= self.max {
            return Err(ReplicationError::SignatureTableFull { max: self.max });
        }
        self.names.insert(id, signature.to_owned());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: u16) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_first_use() {
        let mut table = OutboundSignatures::new(8);
        assert_eq!(table.next_id().unwrap(), 0);
        table.insert("Fire", 0);
        assert_eq!(table.next_id().unwrap(), 1);
        table.insert("Jump", 1);
        assert_eq!(table.get("Fire"), Some(0));
        assert_eq!(table.get("Jump"), Some(1));
        assert_eq!(table.get("Duck"), None);
    }

    #[test]
    fn full_table_rejects_new_signature() {
        let mut table = OutboundSignatures::new(1);
        table.insert("Fire", table.next_id().unwrap());
        assert_eq!(
            table.next_id().unwrap_err(),
            ReplicationError::SignatureTableFull { max: 1 }
        );
    }

    #[test]
    fn inbound_define_and_resolve() {
        let mut table = InboundSignatures::new(4);
        table.define(2, "Fire|F").unwrap();
        assert_eq!(table.get(2), Some("Fire|F"));
        assert_eq!(table.get(0), None);
        assert!(table.define(4, "Overflow").is_err());
    }
}
