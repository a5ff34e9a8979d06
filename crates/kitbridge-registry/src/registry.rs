//! WrapperRegistry - identity index from native objects to their wrappers.
//!
//! This module provides [`WrapperRegistry`], the lookup table that keeps at most
//! one live wrapper per bridged native object. It maps an [`IdentityKey`]
//! (family tag + generation-tagged native id) to a [`WeakSlot`].
//!
//! # Ownership
//!
//! The registry owns neither side. Entries are weak: a slot whose wrapper has
//! been finalized simply fails to resolve against the [`WrapperHeap`]. The
//! bridge removes entries on both teardown paths, so the table stays bounded
//! by the number of live bridged pairs.
//!
//! # Thread Safety
//!
//! `WrapperRegistry` is **not thread-safe**. Callers that share it across
//! threads must put the registry, the heap and the tree behind one lock so
//! that lookup-then-insert is a single critical section.
//!
//! # Example
//!
//! ```
//! use std::any::TypeId;
//!
//! use kitbridge_core::{IdentityKey, NativeId, TreeId, TypeTag, WeakSlot, WrapperHeap, WrapperObject};
//! use kitbridge_registry::WrapperRegistry;
//!
//! let mut heap = WrapperHeap::new();
//! let mut registry = WrapperRegistry::new();
//!
//! let native = NativeId::new(TreeId::new(1), 0, 0);
//! let tag = TypeTag::from_name("Element");
//! let handle = heap.allocate(WrapperObject::new(tag, TypeId::of::<()>(), "Element", native));
//! let key = IdentityKey::new(tag, native);
//!
//! registry.insert(key, WeakSlot::new(handle), &heap).unwrap();
//! assert_eq!(registry.lookup(&key), Some(WeakSlot::new(handle)));
//! ```

use rustc_hash::FxHashMap;

use kitbridge_core::{BridgeError, BridgeResult, IdentityKey, WeakSlot, WrapperHeap};

/// Identity index from bridged native objects to their wrappers.
#[derive(Debug, Default)]
pub struct WrapperRegistry {
    entries: FxHashMap<IdentityKey, WeakSlot>,
}

impl WrapperRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Find the slot registered for `key`. Never creates entries.
    #[inline]
    pub fn lookup(&self, key: &IdentityKey) -> Option<WeakSlot> {
        self.entries.get(key).copied()
    }

    /// Register `slot` for `key`.
    ///
    /// An existing entry is overwritten only when its wrapper is no longer
    /// alive in `heap`; the displaced stale slot is returned. Replacing a live
    /// entry is refused with [`BridgeError::DuplicateWrapper`].
    pub fn insert(
        &mut self,
        key: IdentityKey,
        slot: WeakSlot,
        heap: &WrapperHeap,
    ) -> BridgeResult<Option<WeakSlot>> {
        if let Some(existing) = self.entries.get(&key)
            && existing.is_live(heap)
        {
            return Err(BridgeError::DuplicateWrapper {
                key,
                existing: existing.handle(),
            });
        }
        Ok(self.entries.insert(key, slot))
    }

    /// Remove the entry for `key`. Removing an absent key is a no-op.
    pub fn remove(&mut self, key: &IdentityKey) -> Option<WeakSlot> {
        self.entries.remove(key)
    }

    /// Remove the entry for `key` only if it still refers to `slot`.
    ///
    /// Returns true if an entry was removed.
    pub fn remove_matching(&mut self, key: &IdentityKey, slot: WeakSlot) -> bool {
        if self.entries.get(key) == Some(&slot) {
            self.entries.remove(key);
            return true;
        }
        false
    }

    /// Check whether `key` has an entry, live or not.
    #[inline]
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&IdentityKey, &WeakSlot)> {
        self.entries.iter()
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
