//! Per-family view of the bridge.
//!
//! Generated binding code for a family talks to the bridge through a fixed
//! pair of entry points: `kit` (native → wrapper) and `core`
//! (wrapper → native). [`TypedBridge`] pins the family so call sites do not
//! repeat the turbofish.

use std::marker::PhantomData;

use kitbridge_core::{Bridged, NativeId, NativeTree, WrapperHandle};

use crate::Bridge;

/// Kit/core entry points for family `T`.
///
/// ```
/// use kitbridge::{Bridge, TypedBridge};
/// use kitbridge::dom::Text;
/// use kitbridge::NativeTree;
///
/// type TextBridge = TypedBridge<Text>;
///
/// let mut tree = NativeTree::new();
/// let mut bridge = Bridge::new();
/// let node = tree.insert_root(Text::new("hi"));
///
/// let wrapper = TextBridge::kit(&mut bridge, &mut tree, Some(node));
/// assert_eq!(TextBridge::core(&bridge, wrapper), Some(node));
/// assert_eq!(TextBridge::core_ref(&bridge, &tree, wrapper).map(|t| t.data.as_str()), Some("hi"));
/// ```
pub struct TypedBridge<T: Bridged>(PhantomData<fn() -> T>);

impl<T: Bridged> TypedBridge<T> {
    /// See [`Bridge::get_or_create`].
    #[inline]
    pub fn kit(
        bridge: &mut Bridge,
        tree: &mut NativeTree,
        native: Option<NativeId>,
    ) -> Option<WrapperHandle> {
        bridge.get_or_create::<T>(tree, native)
    }

    /// See [`Bridge::unwrap`].
    #[inline]
    pub fn core(bridge: &Bridge, wrapper: Option<WrapperHandle>) -> Option<NativeId> {
        bridge.unwrap::<T>(wrapper)
    }

    /// See [`Bridge::unwrap_ref`].
    #[inline]
    pub fn core_ref<'t>(
        bridge: &Bridge,
        tree: &'t NativeTree,
        wrapper: Option<WrapperHandle>,
    ) -> Option<&'t T> {
        bridge.unwrap_ref::<T>(tree, wrapper)
    }
}
