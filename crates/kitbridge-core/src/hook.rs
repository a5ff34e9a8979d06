//! Invalidation hooks installed on native objects.

use crate::{IdentityKey, WrapperHandle};

/// Record left on a native object by the bridge when it wraps that object.
///
/// The owner of the object hands each hook to an [`InvalidationSink`] before
/// the object's storage is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidationHook {
    /// Registry key of the bridged pair.
    pub key: IdentityKey,
    /// Wrapper whose back-reference must be cleared.
    pub wrapper: WrapperHandle,
}

impl InvalidationHook {
    /// Create a hook for `wrapper` registered under `key`.
    #[inline]
    pub const fn new(key: IdentityKey, wrapper: WrapperHandle) -> Self {
        Self { key, wrapper }
    }
}

/// Receiver of hooks fired by a native object's destruction path.
///
/// Closures implement this trait, which is convenient when tearing down a tree
/// that was never bridged.
pub trait InvalidationSink {
    /// Called once per hook, before the hooked object is freed.
    fn invalidate(&mut self, hook: InvalidationHook);
}

impl<F: FnMut(InvalidationHook)> InvalidationSink for F {
    fn invalidate(&mut self, hook: InvalidationHook) {
        self(hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NativeId, TreeId, TypeTag};

    #[test]
    fn closures_are_sinks() {
        let mut fired = Vec::new();
        let hook = InvalidationHook::new(
            IdentityKey::new(TypeTag(1), NativeId::new(TreeId::new(1), 0, 0)),
            WrapperHandle::new(0, 0),
        );

        let mut sink = |hook: InvalidationHook| fired.push(hook);
        sink.invalidate(hook);

        assert_eq!(fired, vec![hook]);
    }
}
