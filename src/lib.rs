//! kitbridge - an identity-preserving bridge between tree-owned native objects
//! and reference-counted wrappers.
//!
//! Native objects live in a [`NativeTree`] and are destroyed by their owner.
//! Foreign bindings see them only through wrappers obtained from a [`Bridge`]:
//!
//! - [`Bridge::get_or_create`] returns the one live wrapper for an object,
//!   creating it on first access
//! - [`Bridge::unwrap`] resolves a wrapper back to its object, checking the
//!   family tag and failing cleanly once the object is gone
//! - [`Bridge::release`] drops a wrapper reference
//! - [`Bridge::destroy_native`] tears down objects and invalidates their wrappers
//!
//! ## Crate Layout
//!
//! - `kitbridge-core`: ids, type tags, the native tree and the wrapper heap
//! - `kitbridge-registry`: the identity registry
//! - this crate: the bridge operations, configuration, family gating and the
//!   lock-guarded [`SharedBridge`] (feature `sync`)
//!
//! ## Example
//!
//! ```
//! use kitbridge::{Bridge, NativeTree};
//! use kitbridge::dom::{Document, Element};
//!
//! let mut tree = NativeTree::new();
//! let mut bridge = Bridge::new();
//!
//! let doc = tree.insert_root(Document::new("https://example.org"));
//! let body = tree.append_child(doc, Element::new("body")).unwrap();
//!
//! let wrapper = bridge.get_or_create::<Element>(&mut tree, Some(body)).unwrap();
//! assert_eq!(bridge.get_or_create::<Element>(&mut tree, Some(body)), Some(wrapper));
//!
//! // Destroying the document takes the body with it.
//! bridge.destroy_native(&mut tree, doc).unwrap();
//! assert!(bridge.unwrap::<Element>(Some(wrapper)).is_none());
//! assert_eq!(bridge.registered(), 0);
//! ```

mod bridge;
mod config;
pub mod dom;
mod gate;
#[cfg(feature = "sync")]
mod sync;
mod typed;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use gate::{FamilyInfo, compiled_families};
#[cfg(feature = "sync")]
pub use sync::SharedBridge;
pub use typed::TypedBridge;

pub use kitbridge_core::{
    BridgeError, BridgeResult, Bridged, IdentityKey, InvalidationHook, InvalidationSink,
    NativeId, NativeTree, TreeId, TypeTag, UnwrapError, WeakSlot, WrapperFlags, WrapperHandle,
    WrapperHeap, WrapperObject,
};
pub use kitbridge_registry::WrapperRegistry;
