//! Reference-counted wrapper objects.
//!
//! [`WrapperHeap`] stores the wrapper side of the bridge in a generational
//! arena with an external reference count per slot. Releasing the last
//! reference frees the slot and hands the finalized [`WrapperObject`] back to
//! the caller, which is the zero-count notification the bridge reacts to.

use std::any::TypeId;
use std::fmt;

use bitflags::bitflags;

use crate::{Bridged, NativeId, TypeTag, WrapperHandle};

bitflags! {
    /// Bridge bookkeeping carried by each wrapper.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WrapperFlags: u8 {
        /// The wrapper is the registry entry for its native object.
        const REGISTERED = 1 << 0;
        /// An invalidation hook for this wrapper is installed on the native object.
        const HOOKED = 1 << 1;
        /// The native object was destroyed while this wrapper was alive.
        const INVALIDATED = 1 << 2;
    }
}

/// The wrapper side of a bridged pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperObject {
    tag: TypeTag,
    type_id: TypeId,
    type_name: &'static str,
    native: Option<NativeId>,
    flags: WrapperFlags,
}

impl WrapperObject {
    /// Create a wrapper pointing at `native`.
    pub fn new(tag: TypeTag, type_id: TypeId, type_name: &'static str, native: NativeId) -> Self {
        Self {
            tag,
            type_id,
            type_name,
            native: Some(native),
            flags: WrapperFlags::empty(),
        }
    }

    /// Wrapper for `native` bridged as `T`.
    pub fn of<T: Bridged>(native: NativeId) -> Self {
        Self::new(T::type_tag(), TypeId::of::<T>(), T::type_name(), native)
    }

    /// Family tag this wrapper was constructed for.
    #[inline]
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Rust type of the native object this wrapper was constructed for.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Check whether this wrapper was constructed for native type `T`.
    #[inline]
    pub fn is<T: Bridged>(&self) -> bool {
        self.type_id == TypeId::of::<T>() && self.tag == T::type_tag()
    }

    /// Family name this wrapper was constructed for.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Back-reference to the native object, `None` once invalidated.
    #[inline]
    pub fn native(&self) -> Option<NativeId> {
        self.native
    }

    #[inline]
    pub fn flags(&self) -> WrapperFlags {
        self.flags
    }

    #[inline]
    pub fn is_invalidated(&self) -> bool {
        self.flags.contains(WrapperFlags::INVALIDATED)
    }

    /// Set bookkeeping flags.
    pub fn mark(&mut self, flags: WrapperFlags) {
        self.flags.insert(flags);
    }

    /// Sever the back-reference. Returns the object it pointed at, if any.
    pub fn invalidate(&mut self) -> Option<NativeId> {
        self.flags.remove(WrapperFlags::REGISTERED | WrapperFlags::HOOKED);
        self.flags.insert(WrapperFlags::INVALIDATED);
        self.native.take()
    }
}

/// Non-owning reference to a wrapper.
///
/// Resolving a slot checks the handle's generation, so a slot whose wrapper
/// has been finalized resolves to nothing even after the heap reuses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeakSlot(WrapperHandle);

impl WeakSlot {
    #[inline]
    pub const fn new(handle: WrapperHandle) -> Self {
        Self(handle)
    }

    /// The handle this slot refers to, live or not.
    #[inline]
    pub const fn handle(self) -> WrapperHandle {
        self.0
    }

    /// The handle, if its wrapper is still alive. Does not add a reference.
    pub fn upgrade(self, heap: &WrapperHeap) -> Option<WrapperHandle> {
        heap.contains(self.0).then_some(self.0)
    }

    pub fn is_live(self, heap: &WrapperHeap) -> bool {
        heap.contains(self.0)
    }
}

/// Outcome of [`WrapperHeap::release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// References remain; carries the new count.
    Retained(u32),
    /// The last reference was dropped and the slot freed.
    Finalized(WrapperObject),
    /// The handle was stale.
    Stale,
}

/// Heap storage for wrappers with generational indices.
///
/// Wrappers are stored in a Vec with generation tracking. When a wrapper
/// is finalized its slot is reused but the generation is incremented, which
/// lets stale handles be detected at runtime.
pub struct WrapperHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
    live: usize,
}

struct HeapSlot {
    generation: u32,
    object: Option<WrapperObject>,
    ref_count: u32,
}

impl WrapperHeap {
    /// Create a new empty heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Create an empty heap with room for `capacity` wrappers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Allocate a wrapper with a reference count of one.
    pub fn allocate(&mut self, object: WrapperObject) -> WrapperHandle {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.object = Some(object);
            slot.ref_count = 1;
            WrapperHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HeapSlot {
                generation: 0,
                object: Some(object),
                ref_count: 1,
            });
            WrapperHandle::new(index, 0)
        }
    }

    fn slot(&self, handle: WrapperHandle) -> Option<&HeapSlot> {
        let slot = self.slots.get(handle.index() as usize)?;
        (slot.generation == handle.generation() && slot.object.is_some()).then_some(slot)
    }

    fn slot_mut(&mut self, handle: WrapperHandle) -> Option<&mut HeapSlot> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        (slot.generation == handle.generation() && slot.object.is_some()).then_some(slot)
    }

    /// Check whether the handle refers to a live wrapper.
    pub fn contains(&self, handle: WrapperHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Get a wrapper. Returns None if the handle is stale.
    pub fn get(&self, handle: WrapperHandle) -> Option<&WrapperObject> {
        self.slot(handle)?.object.as_ref()
    }

    /// Get a mutable wrapper. Returns None if the handle is stale.
    pub fn get_mut(&mut self, handle: WrapperHandle) -> Option<&mut WrapperObject> {
        self.slot_mut(handle)?.object.as_mut()
    }

    /// Increment reference count.
    pub fn add_ref(&mut self, handle: WrapperHandle) -> bool {
        match self.slot_mut(handle) {
            Some(slot) => {
                slot.ref_count = slot.ref_count.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrement reference count, finalizing the wrapper at zero.
    pub fn release(&mut self, handle: WrapperHandle) -> Release {
        let Some(slot) = self.slot_mut(handle) else {
            return Release::Stale;
        };
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 {
            return Release::Retained(slot.ref_count);
        }

        let object = slot.object.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index());
        self.live -= 1;
        match object {
            Some(object) => Release::Finalized(object),
            None => Release::Stale,
        }
    }

    /// Get the reference count for a wrapper.
    pub fn ref_count(&self, handle: WrapperHandle) -> Option<u32> {
        self.slot(handle).map(|slot| slot.ref_count)
    }

    /// Iterate over live wrappers.
    pub fn iter(&self) -> impl Iterator<Item = (WrapperHandle, &WrapperObject)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let object = slot.object.as_ref()?;
            Some((WrapperHandle::new(index as u32, slot.generation), object))
        })
    }

    /// Number of live wrappers.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl Default for WrapperHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WrapperHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperHeap")
            .field("live", &self.live)
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}
