//! Lock-guarded bridge for multi-threaded hosts.
//!
//! [`SharedBridge`] puts a [`Bridge`] and its [`NativeTree`] behind a single
//! `parking_lot::Mutex`. Every public operation takes the lock once, so the
//! kit path's lookup, construction and insertion run as one critical section
//! and two threads can never both create a wrapper for the same object.
//! Reference counts are only touched under the same lock.

use std::sync::Arc;

use parking_lot::Mutex;

use kitbridge_core::{BridgeResult, Bridged, NativeId, NativeTree, WrapperHandle};

use crate::{Bridge, BridgeConfig};

struct SharedState {
    bridge: Bridge,
    tree: NativeTree,
}

/// Cloneable, thread-safe handle to a bridge and the tree it serves.
#[derive(Clone)]
pub struct SharedBridge {
    inner: Arc<Mutex<SharedState>>,
}

impl SharedBridge {
    pub fn new(tree: NativeTree) -> Self {
        Self::with_config(tree, BridgeConfig::default())
    }

    pub fn with_config(tree: NativeTree, config: BridgeConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SharedState {
                bridge: Bridge::with_config(config),
                tree,
            })),
        }
    }

    /// Add a parentless native object.
    pub fn insert_root<T: Bridged>(&self, value: T) -> NativeId {
        self.inner.lock().tree.insert_root(value)
    }

    /// Add a native object under `parent`.
    pub fn append_child<T: Bridged>(&self, parent: NativeId, value: T) -> BridgeResult<NativeId> {
        self.inner.lock().tree.append_child(parent, value)
    }

    /// See [`Bridge::get_or_create`].
    pub fn get_or_create<T: Bridged>(&self, native: Option<NativeId>) -> Option<WrapperHandle> {
        let mut state = self.inner.lock();
        let SharedState { bridge, tree } = &mut *state;
        bridge.get_or_create::<T>(tree, native)
    }

    /// See [`Bridge::unwrap`].
    pub fn unwrap<T: Bridged>(&self, wrapper: Option<WrapperHandle>) -> Option<NativeId> {
        self.inner.lock().bridge.unwrap::<T>(wrapper)
    }

    /// Run `f` on the native value behind `wrapper` while holding the lock.
    pub fn with_native<T: Bridged, R>(
        &self,
        wrapper: Option<WrapperHandle>,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let mut state = self.inner.lock();
        let SharedState { bridge, tree } = &mut *state;
        bridge.unwrap_mut::<T>(tree, wrapper).map(f)
    }

    pub fn add_ref(&self, wrapper: WrapperHandle) -> bool {
        self.inner.lock().bridge.add_ref(wrapper)
    }

    /// See [`Bridge::release`].
    pub fn release(&self, wrapper: WrapperHandle) -> bool {
        let mut state = self.inner.lock();
        let SharedState { bridge, tree } = &mut *state;
        bridge.release(tree, wrapper)
    }

    /// See [`Bridge::destroy_native`].
    pub fn destroy_native(&self, native: NativeId) -> BridgeResult<usize> {
        let mut state = self.inner.lock();
        let SharedState { bridge, tree } = &mut *state;
        bridge.destroy_native(tree, native)
    }

    /// Read-only access to the tree.
    pub fn with_tree<R>(&self, f: impl FnOnce(&NativeTree) -> R) -> R {
        f(&self.inner.lock().tree)
    }

    pub fn ref_count(&self, wrapper: WrapperHandle) -> Option<u32> {
        self.inner.lock().bridge.ref_count(wrapper)
    }

    pub fn live_wrappers(&self) -> usize {
        self.inner.lock().bridge.live_wrappers()
    }

    pub fn registered(&self) -> usize {
        self.inner.lock().bridge.registered()
    }

    /// See [`Bridge::audit`].
    pub fn audit(&self) -> BridgeResult<()> {
        let state = self.inner.lock();
        state.bridge.audit(&state.tree)
    }
}
