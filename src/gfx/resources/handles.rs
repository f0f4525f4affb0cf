//! Opaque handles and per-kind resource tables
//!
//! Callers never hold native GPU objects directly; they hold a [`Handle`],
//! an opaque 64-bit key into a [`ResourceTable`] that exclusively owns the
//! resource. Tables are backed by a generational slotmap, so a handle to a
//! removed resource misses instead of aliasing a reused slot.
//!
//! The raw value 0 is reserved: it is never issued by any table and always
//! resolves to `None`, so a zeroed handle in a draw entry means "skip this
//! slot".

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use slotmap::{DefaultKey, Key, KeyData, SlotMap};

/// Opaque typed identifier for one resource in a [`ResourceTable`]
pub struct Handle<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// The null handle; never issued by a table, always resolves to absent
    pub const NULL: Handle<T> = Handle {
        raw: 0,
        _marker: PhantomData,
    };

    /// Reconstructs a handle from its raw integer value
    ///
    /// Only values previously obtained from [`Handle::raw`] (or 0) are
    /// meaningful; anything else simply fails to resolve.
    pub fn from_raw(raw: u64) -> Self {
        Handle {
            raw,
            _marker: PhantomData,
        }
    }

    /// The underlying 64-bit key
    pub fn raw(&self) -> u64 {
        self.raw
    }

    pub fn is_null(&self) -> bool {
        self.raw == 0
    }

    fn key(&self) -> DefaultKey {
        KeyData::from_ffi(self.raw).into()
    }
}

// Manual impls: deriving would bound T unnecessarily.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}
impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
impl<T> Eq for Handle<T> {}
impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}
impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NULL
    }
}
impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({:#x})", self.raw)
    }
}

/// Generational arena mapping handles to resources of one kind
///
/// The table owns its resources; dropping an entry releases the underlying
/// object once nothing on the GPU side references it anymore.
pub struct ResourceTable<T> {
    slots: SlotMap<DefaultKey, T>,
}

impl<T> ResourceTable<T> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::new(),
        }
    }

    /// Stores a resource and returns its handle
    pub fn insert(&mut self, resource: T) -> Handle<T> {
        let key = self.slots.insert(resource);
        Handle::from_raw(key.data().as_ffi())
    }

    /// Resolves a handle, returning `None` for null, stale or foreign keys
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.is_null() {
            return None;
        }
        self.slots.get(handle.key())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.is_null() {
            return None;
        }
        self.slots.get_mut(handle.key())
    }

    /// Removes a resource, returning it if the handle was live
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if handle.is_null() {
            return None;
        }
        self.slots.remove(handle.key())
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        !handle.is_null() && self.slots.contains_key(handle.key())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T> Default for ResourceTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
