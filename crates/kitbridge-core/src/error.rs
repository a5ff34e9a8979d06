//! Error types for the bridge.
//!
//! ```text
//! UnwrapError  - why a wrapper could not be resolved to its native object
//! BridgeError  - collaborator failures and invariant audit results
//! ```
//!
//! Boundary operations never surface these to foreign callers: `unwrap` and
//! `get_or_create` collapse them to `None`. They exist for diagnostics and for
//! the fallible collaborator APIs (`NativeTree`, `WrapperRegistry`).

use thiserror::Error;

use crate::{IdentityKey, NativeId, TreeId, WrapperHandle};

/// Reasons an unwrap fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnwrapError {
    /// No wrapper was supplied.
    #[error("null wrapper")]
    Null,

    /// The wrapper handle refers to a finalized wrapper.
    #[error("wrapper {0} has been finalized")]
    Stale(WrapperHandle),

    /// The wrapper outlived its native object.
    #[error("wrapper {0} was invalidated: its native object is gone")]
    Invalidated(WrapperHandle),

    /// The wrapper belongs to another family.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Family the caller unwrapped as.
        expected: &'static str,
        /// Family the wrapper was constructed for.
        found: &'static str,
    },
}

/// Errors reported by the native tree, the registry and the audit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The native object is not alive.
    #[error("native object {0} is not alive")]
    StaleNative(NativeId),

    /// A bridge was handed a tree other than the one it serves.
    #[error("bridge serves {expected}, got {found}")]
    ForeignTree {
        /// Tree the bridge is bound to.
        expected: TreeId,
        /// Tree that was passed in.
        found: TreeId,
    },

    /// A live wrapper is already registered for this key.
    #[error("live wrapper {existing} already registered for {key}")]
    DuplicateWrapper {
        /// The contested key.
        key: IdentityKey,
        /// The wrapper currently registered.
        existing: WrapperHandle,
    },

    /// The native object carries no such invalidation hook.
    #[error("no invalidation hook for {key} on {native}")]
    NoSuchHook {
        /// Object whose hook list was searched.
        native: NativeId,
        /// Key of the missing hook.
        key: IdentityKey,
    },

    /// An audit found the bridge in an inconsistent state.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result alias for bridge collaborators.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TreeId, TypeTag};

    #[test]
    fn unwrap_error_display() {
        let err = UnwrapError::TypeMismatch {
            expected: "Element",
            found: "Text",
        };
        assert_eq!(format!("{err}"), "type mismatch: expected Element, found Text");

        let err = UnwrapError::Invalidated(WrapperHandle::new(1, 0));
        assert_eq!(
            format!("{err}"),
            "wrapper wrapper#1v0 was invalidated: its native object is gone"
        );
    }

    #[test]
    fn bridge_error_display() {
        let key = IdentityKey::new(TypeTag(2), NativeId::new(TreeId::new(1), 0, 0));
        let err = BridgeError::DuplicateWrapper {
            key,
            existing: WrapperHandle::new(5, 1),
        };
        assert_eq!(
            format!("{err}"),
            "live wrapper wrapper#5v1 already registered for native#1:0v0@0x0000000000000002"
        );

        let err = BridgeError::StaleNative(NativeId::new(TreeId::new(1), 3, 4));
        assert_eq!(format!("{err}"), "native object native#1:3v4 is not alive");

        let err = BridgeError::ForeignTree {
            expected: TreeId::new(1),
            found: TreeId::new(2),
        };
        assert_eq!(format!("{err}"), "bridge serves tree#1, got tree#2");
    }
}
