//! The wrap/unwrap identity bridge.
//!
//! [`Bridge`] owns the [`WrapperRegistry`] and the [`WrapperHeap`] and exposes
//! the boundary operations generated binding code calls:
//!
//! - [`Bridge::get_or_create`] ("kit"): native → wrapper, identity-stable
//! - [`Bridge::unwrap`] ("core"): wrapper → native, type-checked
//! - [`Bridge::release`]: drop a wrapper reference, finalizing at zero
//!
//! The native side is a [`NativeTree`] passed in by the caller. The bridge
//! never owns native objects; it installs an [`InvalidationHook`] on each one
//! it wraps and implements [`InvalidationSink`] so the tree can sever wrappers
//! when it destroys objects. A bridge serves exactly one tree: the first tree
//! it is handed binds it, and any other tree is refused.
//!
//! # Teardown orders
//!
//! - Native first: the tree fires the hook, the wrapper loses its
//!   back-reference and its registry entry, and later unwraps fail.
//! - Wrapper first: the final release removes the registry entry and detaches
//!   the hook; the native object lives on and the next kit call creates a new
//!   wrapper.
//!
//! # Example
//!
//! ```
//! use kitbridge::Bridge;
//! use kitbridge::dom::Element;
//! use kitbridge::NativeTree;
//!
//! let mut tree = NativeTree::new();
//! let mut bridge = Bridge::new();
//! let div = tree.insert_root(Element::new("div"));
//!
//! let first = bridge.get_or_create::<Element>(&mut tree, Some(div));
//! let second = bridge.get_or_create::<Element>(&mut tree, Some(div));
//! assert_eq!(first, second);
//! assert_eq!(bridge.unwrap::<Element>(first), Some(div));
//!
//! bridge.destroy_native(&mut tree, div).unwrap();
//! assert_eq!(bridge.unwrap::<Element>(first), None);
//! ```

use kitbridge_core::{
    BridgeError, BridgeResult, Bridged, IdentityKey, InvalidationHook, InvalidationSink,
    NativeId, NativeTree, Release, TreeId, UnwrapError, WeakSlot, WrapperFlags, WrapperHandle,
    WrapperHeap, WrapperObject,
};
use kitbridge_registry::WrapperRegistry;

use crate::BridgeConfig;

/// Registry, wrapper heap and the operations that keep them consistent.
#[derive(Debug, Default)]
pub struct Bridge {
    registry: WrapperRegistry,
    heap: WrapperHeap,
    config: BridgeConfig,
    tree: Option<TreeId>,
}

impl Bridge {
    /// Create a bridge with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BridgeConfig) -> Self {
        Self {
            registry: WrapperRegistry::with_capacity(config.registry_capacity()),
            heap: WrapperHeap::with_capacity(config.wrapper_capacity()),
            config,
            tree: None,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn registry(&self) -> &WrapperRegistry {
        &self.registry
    }

    pub fn heap(&self) -> &WrapperHeap {
        &self.heap
    }

    /// The tree this bridge serves, once it has been handed one.
    pub fn tree(&self) -> Option<TreeId> {
        self.tree
    }

    /// Bind to `tree` on first use; refuse any other tree afterwards.
    fn serve(&mut self, tree: &NativeTree) -> BridgeResult<()> {
        match self.tree {
            None => {
                self.tree = Some(tree.id());
                Ok(())
            }
            Some(bound) => check_tree(bound, tree),
        }
    }

    // ==========================================================================
    // Boundary operations
    // ==========================================================================

    /// Get the wrapper for `native`, creating it on first access.
    ///
    /// Returns `None` for a `None` input, a destroyed object, an object that
    /// does not store a `T`, or a tree other than the one this bridge serves.
    /// While a wrapper is alive every call returns that same handle with one
    /// more reference held by the caller.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_or_create<T: Bridged>(
        &mut self,
        tree: &mut NativeTree,
        native: Option<NativeId>,
    ) -> Option<WrapperHandle> {
        let native = native?;
        if let Err(err) = self.serve(tree) {
            tracing::debug!(family = T::type_name(), %native, %err, "kit rejected");
            return None;
        }
        if !tree.is::<T>(native) {
            tracing::debug!(
                family = T::type_name(),
                %native,
                found = tree.type_name(native).unwrap_or("<destroyed>"),
                "kit rejected: native object is gone or has another type"
            );
            return None;
        }

        let key = IdentityKey::of::<T>(native);
        if let Some(handle) = self
            .registry
            .lookup(&key)
            .and_then(|slot| slot.upgrade(&self.heap))
        {
            self.heap.add_ref(handle);
            tracing::trace!(family = T::type_name(), %native, wrapper = %handle, "kit hit");
            return Some(handle);
        }

        let handle = self.wrap::<T>(tree, native);
        self.check_invariants(tree);
        Some(handle)
    }

    /// Construct and register a wrapper for `native`.
    ///
    /// `native` must be alive and must not already have a live wrapper in
    /// family `T`; both are contract violations and panic.
    pub(crate) fn wrap<T: Bridged>(
        &mut self,
        tree: &mut NativeTree,
        native: NativeId,
    ) -> WrapperHandle {
        let key = IdentityKey::of::<T>(native);
        if let Some(existing) = self
            .registry
            .lookup(&key)
            .and_then(|slot| slot.upgrade(&self.heap))
        {
            panic!("wrap called for {key}, which is already wrapped by {existing}");
        }

        let handle = self.heap.allocate(WrapperObject::of::<T>(native));
        let hook = InvalidationHook::new(key, handle);
        if let Err(err) = tree.install_hook(native, hook) {
            panic!("wrap called for an object that is not alive: {err}");
        }
        if let Err(err) = self.registry.insert(key, WeakSlot::new(handle), &self.heap) {
            panic!("wrap raced an existing registration: {err}");
        }
        if let Some(object) = self.heap.get_mut(handle) {
            object.mark(WrapperFlags::REGISTERED | WrapperFlags::HOOKED);
        }

        tracing::debug!(family = T::type_name(), %native, wrapper = %handle, "wrapper created");
        handle
    }

    /// Resolve a wrapper to the native object it stands for.
    ///
    /// Returns `None` for a `None` input, a finalized or invalidated wrapper,
    /// or a wrapper constructed for another native type.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn unwrap<T: Bridged>(&self, wrapper: Option<WrapperHandle>) -> Option<NativeId> {
        match self.try_unwrap::<T>(wrapper) {
            Ok(native) => Some(native),
            Err(UnwrapError::Null) => None,
            Err(err) => {
                tracing::debug!(family = T::type_name(), %err, "core rejected wrapper");
                None
            }
        }
    }

    /// Like [`unwrap`](Self::unwrap), reporting why resolution failed.
    pub fn try_unwrap<T: Bridged>(
        &self,
        wrapper: Option<WrapperHandle>,
    ) -> Result<NativeId, UnwrapError> {
        let handle = wrapper.ok_or(UnwrapError::Null)?;
        let object = self.heap.get(handle).ok_or(UnwrapError::Stale(handle))?;
        if !object.is::<T>() {
            return Err(UnwrapError::TypeMismatch {
                expected: T::type_name(),
                found: object.type_name(),
            });
        }
        object.native().ok_or(UnwrapError::Invalidated(handle))
    }

    /// Resolve a wrapper all the way to the native value.
    pub fn unwrap_ref<'t, T: Bridged>(
        &self,
        tree: &'t NativeTree,
        wrapper: Option<WrapperHandle>,
    ) -> Option<&'t T> {
        tree.get::<T>(self.unwrap::<T>(wrapper)?)
    }

    /// Resolve a wrapper to a mutable native value.
    pub fn unwrap_mut<'t, T: Bridged>(
        &self,
        tree: &'t mut NativeTree,
        wrapper: Option<WrapperHandle>,
    ) -> Option<&'t mut T> {
        tree.get_mut::<T>(self.unwrap::<T>(wrapper)?)
    }

    // ==========================================================================
    // Reference counting
    // ==========================================================================

    /// Take another reference on a wrapper. Returns false for stale handles.
    pub fn add_ref(&mut self, wrapper: WrapperHandle) -> bool {
        self.heap.add_ref(wrapper)
    }

    /// Drop a reference. Returns true if this finalized the wrapper.
    ///
    /// A tree other than the one this bridge serves is refused and the
    /// reference is kept.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn release(&mut self, tree: &mut NativeTree, wrapper: WrapperHandle) -> bool {
        if let Err(err) = self.serve(tree) {
            tracing::debug!(%wrapper, %err, "release rejected");
            return false;
        }
        match self.heap.release(wrapper) {
            Release::Retained(_) => false,
            Release::Stale => {
                tracing::debug!(%wrapper, "release on a finalized wrapper");
                false
            }
            Release::Finalized(object) => {
                self.finalize(tree, wrapper, object);
                self.check_invariants(tree);
                true
            }
        }
    }

    fn finalize(&mut self, tree: &mut NativeTree, wrapper: WrapperHandle, object: WrapperObject) {
        if let Some(native) = object.native() {
            let key = IdentityKey::new(object.tag(), native);
            // A registered wrapper is, by construction, the entry for its key.
            if object.flags().contains(WrapperFlags::REGISTERED) {
                self.registry.remove(&key);
            }
            if object.flags().contains(WrapperFlags::HOOKED)
                && let Err(err) = tree.detach_hook(native, &InvalidationHook::new(key, wrapper))
            {
                tracing::debug!(%wrapper, %err, "finalized wrapper had no hook to detach");
            }
        }
        tracing::debug!(
            family = object.type_name(),
            %wrapper,
            invalidated = object.is_invalidated(),
            "wrapper finalized"
        );
    }

    // ==========================================================================
    // Native teardown
    // ==========================================================================

    /// Destroy a native object and its subtree, invalidating their wrappers.
    ///
    /// Returns the number of native objects destroyed.
    pub fn destroy_native(&mut self, tree: &mut NativeTree, native: NativeId) -> BridgeResult<usize> {
        self.serve(tree)?;
        let destroyed = tree.destroy(native, self)?;
        self.check_invariants(tree);
        Ok(destroyed)
    }

    // ==========================================================================
    // Introspection
    // ==========================================================================

    /// The live wrapper for `native` in family `T`, without taking a reference.
    pub fn wrapper_for<T: Bridged>(&self, native: NativeId) -> Option<WrapperHandle> {
        self.registry
            .lookup(&IdentityKey::of::<T>(native))
            .and_then(|slot| slot.upgrade(&self.heap))
    }

    pub fn ref_count(&self, wrapper: WrapperHandle) -> Option<u32> {
        self.heap.ref_count(wrapper)
    }

    /// Check whether a live wrapper has lost its native object.
    pub fn is_invalidated(&self, wrapper: WrapperHandle) -> bool {
        self.heap
            .get(wrapper)
            .is_some_and(WrapperObject::is_invalidated)
    }

    /// Number of live wrappers, including invalidated ones.
    pub fn live_wrappers(&self) -> usize {
        self.heap.len()
    }

    /// Number of registry entries.
    pub fn registered(&self) -> usize {
        self.registry.len()
    }

    /// Verify the bridge against `tree`.
    ///
    /// Every registry entry must point at a live wrapper that points back at a
    /// live native object carrying the matching hook, and every live wrapper
    /// must either be its object's registered wrapper or be invalidated.
    pub fn audit(&self, tree: &NativeTree) -> BridgeResult<()> {
        if let Some(bound) = self.tree {
            check_tree(bound, tree)?;
        }
        for (key, slot) in self.registry.iter() {
            let wrapper = slot.handle();
            let Some(object) = self.heap.get(wrapper) else {
                return Err(violation(format!(
                    "registry entry {key} points at finalized {wrapper}"
                )));
            };
            if !tree.contains(key.native) {
                return Err(violation(format!(
                    "registry entry {key} outlived its native object"
                )));
            }
            if object.native() != Some(key.native) || object.tag() != key.family {
                return Err(violation(format!(
                    "{wrapper} does not point back at {key}"
                )));
            }
            if !object.flags().contains(WrapperFlags::REGISTERED) {
                return Err(violation(format!(
                    "{wrapper} is registered for {key} but not marked registered"
                )));
            }
            if tree.hook_for(key.native, key) != Some(&InvalidationHook::new(*key, wrapper)) {
                return Err(violation(format!(
                    "{key} has no invalidation hook for {wrapper}"
                )));
            }
        }

        for (wrapper, object) in self.heap.iter() {
            match object.native() {
                Some(native) => {
                    if !tree.contains(native) {
                        return Err(violation(format!(
                            "{wrapper} points at destroyed {native}"
                        )));
                    }
                    let key = IdentityKey::new(object.tag(), native);
                    let marked = WrapperFlags::REGISTERED | WrapperFlags::HOOKED;
                    if !object.flags().contains(marked) {
                        return Err(violation(format!(
                            "{wrapper} points at {native} without registry entry or hook"
                        )));
                    }
                    if self.registry.lookup(&key) != Some(WeakSlot::new(wrapper)) {
                        return Err(violation(format!(
                            "{wrapper} is not the registered wrapper for {key}"
                        )));
                    }
                }
                None if !object.is_invalidated() => {
                    return Err(violation(format!(
                        "{wrapper} has no back-reference but was never invalidated"
                    )));
                }
                None => {}
            }
        }
        Ok(())
    }

    fn check_invariants(&self, tree: &NativeTree) {
        if cfg!(debug_assertions)
            && self.config.audit()
            && let Err(err) = self.audit(tree)
        {
            panic!("bridge audit failed: {err}");
        }
    }
}

fn violation(message: String) -> BridgeError {
    BridgeError::InvariantViolation(message)
}

fn check_tree(bound: TreeId, tree: &NativeTree) -> BridgeResult<()> {
    if bound == tree.id() {
        Ok(())
    } else {
        Err(BridgeError::ForeignTree {
            expected: bound,
            found: tree.id(),
        })
    }
}

impl InvalidationSink for Bridge {
    fn invalidate(&mut self, hook: InvalidationHook) {
        self.registry
            .remove_matching(&hook.key, WeakSlot::new(hook.wrapper));
        match self.heap.get_mut(hook.wrapper) {
            Some(object) => {
                object.invalidate();
                tracing::debug!(
                    family = object.type_name(),
                    native = %hook.key.native,
                    wrapper = %hook.wrapper,
                    "wrapper invalidated"
                );
            }
            None => {
                tracing::debug!(wrapper = %hook.wrapper, "hook fired for a finalized wrapper");
            }
        }
    }
}
