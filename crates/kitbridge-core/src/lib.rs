//! Core types for kitbridge.
//!
//! This crate holds the two object stores the bridge sits between and the
//! vocabulary shared by both sides:
//!
//! - [`NativeTree`]: owner of native objects (no reference counts, explicit
//!   destruction, one invalidation-hook list per object)
//! - [`WrapperHeap`]: reference-counted wrapper objects handed to foreign code
//! - [`NativeId`], [`WrapperHandle`], [`IdentityKey`]: generation-tagged ids
//! - [`TypeTag`] and the [`Bridged`] trait: family identity for type checks
//! - [`InvalidationHook`] and [`InvalidationSink`]: the native teardown path

mod bridged;
pub mod error;
mod hook;
mod ids;
mod native_tree;
mod type_tag;
mod wrapper_heap;

pub use bridged::Bridged;
pub use error::{BridgeError, BridgeResult, UnwrapError};
pub use hook::{InvalidationHook, InvalidationSink};
pub use ids::{IdentityKey, NativeId, TreeId, WrapperHandle};
pub use native_tree::NativeTree;
pub use type_tag::TypeTag;
pub use wrapper_heap::{Release, WeakSlot, WrapperFlags, WrapperHeap, WrapperObject};
