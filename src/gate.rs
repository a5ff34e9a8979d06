//! Build-time selection of bridged families.
//!
//! A family is bridged by implementing [`Bridged`] for its native type,
//! normally through [`impl_bridged!`](crate::impl_bridged). The macro forwards
//! outer attributes, so gating an instantiation behind cargo features is a
//! matter of putting the same `#[cfg(...)]` on the type and on the macro call.
//! A disabled family leaves nothing behind: no type, no `Bridged` impl, no
//! monomorphized kit/core code and no entry in [`compiled_families`].
//!
//! ```
//! use kitbridge::impl_bridged;
//!
//! pub struct Comment {
//!     pub data: String,
//! }
//!
//! impl_bridged!(Comment => "Comment");
//!
//! #[cfg(feature = "video")]
//! pub struct VideoTrack;
//!
//! impl_bridged!(#[cfg(feature = "video")] VideoTrack => "VideoTrack");
//! ```

use kitbridge_core::{Bridged, TypeTag};

/// Implement [`Bridged`](kitbridge_core::Bridged) for a native type.
///
/// Outer attributes (typically `#[cfg(...)]`) are applied to the generated impl.
#[macro_export]
macro_rules! impl_bridged {
    ($(#[$meta:meta])* $ty:ty => $name:literal) => {
        $(#[$meta])*
        impl $crate::Bridged for $ty {
            fn type_name() -> &'static str {
                $name
            }
        }
    };
}

/// Name and tag of a family compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FamilyInfo {
    pub name: &'static str,
    pub tag: TypeTag,
}

impl FamilyInfo {
    pub fn of<T: Bridged>() -> Self {
        Self {
            name: T::type_name(),
            tag: T::type_tag(),
        }
    }
}

/// Families of [`dom`](crate::dom) bridged in this build configuration.
pub fn compiled_families() -> Vec<FamilyInfo> {
    use crate::dom::*;

    #[allow(unused_mut)]
    let mut families = vec![
        FamilyInfo::of::<Document>(),
        FamilyInfo::of::<Element>(),
        FamilyInfo::of::<Text>(),
    ];
    #[cfg(any(feature = "video", feature = "audio"))]
    families.push(FamilyInfo::of::<MediaElement>());
    #[cfg(all(feature = "video", feature = "media-controller"))]
    families.push(FamilyInfo::of::<MediaController>());
    families
}
