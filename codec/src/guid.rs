//! Object identity across the wire.
//!
//! A [`GuidCache`] maps object handles to small integers. In a connected
//! session the host's net layer owns the authoritative cache and shares it
//! with this crate; without one, [`LocalGuidTable`] stands in.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use schema::ObjectRef;
use wire::NetGuid;

use crate::error::{CodecError, CodecResult};

/// Maps object handles to network identifiers and back.
pub trait GuidCache {
    /// Returns the object for `guid`, if known.
    fn resolve(&self, guid: NetGuid) -> Option<ObjectRef>;

    /// Returns the identifier already assigned to `object`, if any.
    fn guid_of(&self, object: ObjectRef) -> Option<NetGuid>;

    /// Returns the identifier for `object`, assigning one on first use.
    ///
    /// The same object always yields the same identifier for the life of
    /// the mapping.
    fn get_or_assign(&mut self, object: ObjectRef) -> CodecResult<NetGuid>;
}

/// Process-local identifier table.
///
/// Hands out strictly increasing identifiers starting at 1 and never forgets
/// a mapping: evicting an entry would strand references the other end may
/// still hold. Memory therefore grows with the number of distinct objects
/// ever marshalled.
#[derive(Debug, Clone)]
pub struct LocalGuidTable {
    by_guid: HashMap<NetGuid, ObjectRef>,
    by_object: HashMap<ObjectRef, NetGuid>,
    next_guid: u32,
}

impl Default for LocalGuidTable {
    fn default() -> Self {
        Self {
            by_guid: HashMap::new(),
            by_object: HashMap::new(),
            next_guid: 1,
        }
    }
}

impl LocalGuidTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a mapping assigned elsewhere, e.g. mirrored from the host.
    ///
    /// Later local assignments continue above the highest registered id.
    pub fn register(&mut self, guid: NetGuid, object: ObjectRef) {
        if guid.is_null() {
            return;
        }
        if let Some(previous) = self.by_object.insert(object, guid) {
            self.by_guid.remove(&previous);
        }
        if let Some(previous) = self.by_guid.insert(guid, object) {
            if previous != object {
                self.by_object.remove(&previous);
            }
        }
        if guid.raw() >= self.next_guid {
            self.next_guid = guid.raw().saturating_add(1);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_guid.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_guid.is_empty()
    }
}

impl GuidCache for LocalGuidTable {
    fn resolve(&self, guid: NetGuid) -> Option<ObjectRef> {
        self.by_guid.get(&guid).copied()
    }

    fn guid_of(&self, object: ObjectRef) -> Option<NetGuid> {
        self.by_object.get(&object).copied()
    }

    fn get_or_assign(&mut self, object: ObjectRef) -> CodecResult<NetGuid> {
        if let Some(guid) = self.by_object.get(&object) {
            return Ok(*guid);
        }
        if self.next_guid == u32::MAX {
            return Err(CodecError::GuidsExhausted);
        }
        let guid = NetGuid::new(self.next_guid);
        self.next_guid += 1;
        self.by_object.insert(object, guid);
        self.by_guid.insert(guid, object);
        Ok(guid)
    }
}

/// Shared handle to a cache owned elsewhere (single-threaded).
impl<T: GuidCache> GuidCache for Rc<RefCell<T>> {
    fn resolve(&self, guid: NetGuid) -> Option<ObjectRef> {
        self.borrow().resolve(guid)
    }

    fn guid_of(&self, object: ObjectRef) -> Option<NetGuid> {
        self.borrow().guid_of(object)
    }

    fn get_or_assign(&mut self, object: ObjectRef) -> CodecResult<NetGuid> {
        self.borrow_mut().get_or_assign(object)
    }
}

/// The identifier source a session marshals through.
pub enum GuidRegistry {
    /// Delegates to the connection layer's authoritative cache.
    Authoritative(Box<dyn GuidCache>),
    /// Falls back to a process-local table.
    Local(LocalGuidTable),
}

impl GuidRegistry {
    #[must_use]
    pub fn local() -> Self {
        Self::Local(LocalGuidTable::new())
    }

    #[must_use]
    pub fn authoritative(cache: impl GuidCache + 'static) -> Self {
        Self::Authoritative(Box::new(cache))
    }

    #[must_use]
    pub const fn is_authoritative(&self) -> bool {
        matches!(self, Self::Authoritative(_))
    }
}

impl Default for GuidRegistry {
    fn default() -> Self {
        Self::local()
    }
}

impl fmt::Debug for GuidRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authoritative(_) => f.write_str("GuidRegistry::Authoritative(..)"),
            Self::Local(table) => f
                .debug_tuple("GuidRegistry::Local")
                .field(&table.len())
                .finish(),
        }
    }
}

impl GuidCache for GuidRegistry {
    fn resolve(&self, guid: NetGuid) -> Option<ObjectRef> {
        match self {
            Self::Authoritative(cache) => cache.resolve(guid),
            Self::Local(table) => table.resolve(guid),
        }
    }

    fn guid_of(&self, object: ObjectRef) -> Option<NetGuid> {
        match self {
            Self::Authoritative(cache) => cache.guid_of(object),
            Self::Local(table) => table.guid_of(object),
        }
    }

    fn get_or_assign(&mut self, object: ObjectRef) -> CodecResult<NetGuid> {
        match self {
            Self::Authoritative(cache) => cache.get_or_assign(object),
            Self::Local(table) => table.get_or_assign(object),
        }
    }
}
