//! The `Bridged` trait for native types that cross the wrapper boundary.
//!
//! Every native type that can be handed to foreign bindings implements
//! [`Bridged`]. The trait supplies the family name and the [`TypeTag`] used to
//! key the registry and to type-check unwraps.
//!
//! # Example
//!
//! ```
//! use kitbridge_core::{Bridged, TypeTag};
//!
//! struct Element {
//!     tag_name: String,
//! }
//!
//! impl Bridged for Element {
//!     fn type_name() -> &'static str {
//!         "Element"
//!     }
//! }
//!
//! assert_eq!(Element::type_tag(), TypeTag::from_name("Element"));
//! ```

use std::any::Any;

use crate::TypeTag;

/// A native type with a bridge instantiation.
///
/// Values are stored type-erased in a [`NativeTree`](crate::NativeTree), so
/// implementors must be `Send + Sync + 'static`.
pub trait Bridged: Any + Send + Sync {
    /// The family name reported by wrappers of this type.
    fn type_name() -> &'static str;

    /// The tag wrappers of this type carry.
    fn type_tag() -> TypeTag {
        TypeTag::from_name(Self::type_name())
    }
}
