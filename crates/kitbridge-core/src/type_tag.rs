//! Deterministic type tags for bridged families.
//!
//! A [`TypeTag`] is a 64-bit hash of a bridged type's name. Wrappers record the
//! tag of the native type they were constructed for, and every unwrap compares
//! tags before handing out a native reference.
//!
//! # Examples
//!
//! ```
//! use kitbridge_core::TypeTag;
//!
//! let element = TypeTag::from_name("Element");
//! assert_eq!(element, TypeTag::from_name("Element"));
//! assert_ne!(element, TypeTag::from_name("Text"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain marker mixed into every family tag.
const FAMILY: u64 = 0x2fac10b63a6cc57c;

/// A deterministic 64-bit tag identifying a bridged type family.
///
/// The same name always produces the same tag, so tags can be computed
/// independently by every bridge instantiation without a shared counter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeTag(pub u64);

impl TypeTag {
    /// Empty/invalid tag constant.
    pub const EMPTY: TypeTag = TypeTag(0);

    /// Create a tag from a bridged type name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeTag(FAMILY ^ xxh64(name.as_bytes(), 0))
    }

    /// Check if this is the empty tag.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeTag({:#018x})", self.0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
