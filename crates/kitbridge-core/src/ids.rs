//! Generation-tagged identifiers for native objects and wrappers.
//!
//! Both sides of the bridge are addressed by `(index, generation)` pairs. When
//! a slot is freed its generation advances, so an id that outlived its object
//! can never alias whatever is allocated into the slot next. Native ids also
//! carry the [`TreeId`] of the tree that issued them, so ids from two trees
//! never compare equal.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::{Bridged, TypeTag};

static NEXT_TREE: AtomicU32 = AtomicU32::new(1);

/// Identity of a [`NativeTree`](crate::NativeTree).
///
/// Every tree draws a fresh id when it is created; `TreeId(0)` is never
/// issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u32);

impl TreeId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Draw an id no other tree in this process has.
    pub(crate) fn next() -> Self {
        Self(NEXT_TREE.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree#{}", self.0)
    }
}

/// Identity of a native object stored in a [`NativeTree`](crate::NativeTree).
///
/// # Example
///
/// ```
/// use kitbridge_core::{NativeId, TreeId};
///
/// let id = NativeId::new(TreeId::new(1), 3, 1);
/// assert_eq!(id.tree(), TreeId::new(1));
/// assert_eq!(id.index(), 3);
/// assert_eq!(id.generation(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId {
    tree: TreeId,
    index: u32,
    generation: u32,
}

impl NativeId {
    /// Create a native id from its tree, slot index and generation.
    #[inline]
    pub const fn new(tree: TreeId, index: u32, generation: u32) -> Self {
        Self {
            tree,
            index,
            generation,
        }
    }

    /// Tree that issued this id.
    #[inline]
    pub const fn tree(self) -> TreeId {
        self.tree
    }

    /// Slot index in the owning tree.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "native#{}:{}v{}", self.tree.0, self.index, self.generation)
    }
}

/// Handle to a wrapper object stored in a [`WrapperHeap`](crate::WrapperHeap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperHandle {
    index: u32,
    generation: u32,
}

impl WrapperHandle {
    /// Create a wrapper handle from its slot index and generation.
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index in the heap.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at allocation time.
    #[inline]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for WrapperHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wrapper#{}v{}", self.index, self.generation)
    }
}

/// Registry key: a native object seen through one bridged family.
///
/// Only meaningful while `native` is alive. Once the object is destroyed its
/// generation is retired, so a stale key never matches a new object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    /// Family tag of the bridge instantiation.
    pub family: TypeTag,
    /// The native object.
    pub native: NativeId,
}

impl IdentityKey {
    /// Create a key from a family tag and native id.
    #[inline]
    pub const fn new(family: TypeTag, native: NativeId) -> Self {
        Self { family, native }
    }

    /// Key for `native` bridged as `T`.
    #[inline]
    pub fn of<T: Bridged>(native: NativeId) -> Self {
        Self::new(T::type_tag(), native)
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.native, self.family)
    }
}
