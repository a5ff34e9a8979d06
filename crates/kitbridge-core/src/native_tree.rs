//! Tree-owned native objects.
//!
//! [`NativeTree`] is the owning structure for native objects: values are not
//! reference counted, they live until their owner destroys them. Nodes are
//! stored in a generational arena, so a [`NativeId`] held past its object's
//! destruction resolves to nothing instead of to whatever reuses the slot.
//! Ids carry the issuing tree's [`TreeId`] and resolve only in that tree.
//!
//! Each node has one hook point, a list of [`InvalidationHook`]s. Destroying a
//! node destroys its whole subtree, children first, and every hook of every
//! destroyed node is handed to the caller's [`InvalidationSink`] before that
//! node's storage is released.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::{BridgeError, BridgeResult};
use crate::{IdentityKey, InvalidationHook, InvalidationSink, NativeId, TreeId};

/// Generational arena of type-erased native objects arranged as a forest.
pub struct NativeTree {
    id: TreeId,
    slots: Vec<NodeSlot>,
    free_list: Vec<u32>,
    live: usize,
}

struct NodeSlot {
    generation: u32,
    node: Option<Node>,
}

struct Node {
    value: Box<dyn Any + Send + Sync>,
    type_id: TypeId,
    type_name: &'static str,
    parent: Option<NativeId>,
    children: Vec<NativeId>,
    hooks: Vec<InvalidationHook>,
}

impl Node {
    fn new<T: Any + Send + Sync>(value: T, parent: Option<NativeId>) -> Self {
        Self {
            value: Box::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            parent,
            children: Vec::new(),
            hooks: Vec::new(),
        }
    }
}

impl NativeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            id: TreeId::next(),
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Create an empty tree with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: TreeId::next(),
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Identity of this tree, carried by every id it issues.
    #[inline]
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Insert a parentless object.
    pub fn insert_root<T: Any + Send + Sync>(&mut self, value: T) -> NativeId {
        self.allocate(Node::new(value, None))
    }

    /// Insert an object as the last child of `parent`.
    pub fn append_child<T: Any + Send + Sync>(
        &mut self,
        parent: NativeId,
        value: T,
    ) -> BridgeResult<NativeId> {
        if !self.contains(parent) {
            return Err(BridgeError::StaleNative(parent));
        }
        let id = self.allocate(Node::new(value, Some(parent)));
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        Ok(id)
    }

    fn allocate(&mut self, node: Node) -> NativeId {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NativeId::new(self.id, index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(NodeSlot {
                generation: 0,
                node: Some(node),
            });
            NativeId::new(self.id, index, 0)
        }
    }

    fn node(&self, id: NativeId) -> Option<&Node> {
        if id.tree() != self.id {
            return None;
        }
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NativeId) -> Option<&mut Node> {
        if id.tree() != self.id {
            return None;
        }
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    /// Check whether `id` refers to a live object.
    pub fn contains(&self, id: NativeId) -> bool {
        self.node(id).is_some()
    }

    /// Check whether `id` is alive and stores a `T`.
    pub fn is<T: Any>(&self, id: NativeId) -> bool {
        self.node(id).is_some_and(|node| node.type_id == TypeId::of::<T>())
    }

    /// Get an immutable reference to an object.
    ///
    /// Returns None if the id is stale or the type doesn't match.
    pub fn get<T: Any>(&self, id: NativeId) -> Option<&T> {
        self.node(id)?.value.downcast_ref::<T>()
    }

    /// Get a mutable reference to an object.
    ///
    /// Returns None if the id is stale or the type doesn't match.
    pub fn get_mut<T: Any>(&mut self, id: NativeId) -> Option<&mut T> {
        self.node_mut(id)?.value.downcast_mut::<T>()
    }

    /// Rust type name of the stored object.
    pub fn type_name(&self, id: NativeId) -> Option<&'static str> {
        self.node(id).map(|node| node.type_name)
    }

    /// Parent of a live object, if it has one.
    pub fn parent(&self, id: NativeId) -> Option<NativeId> {
        self.node(id)?.parent
    }

    /// Children of a live object; empty for stale ids.
    pub fn children(&self, id: NativeId) -> &[NativeId] {
        self.node(id).map_or(&[][..], |node| node.children.as_slice())
    }

    /// Hooks currently installed on an object; empty for stale ids.
    pub fn hooks(&self, id: NativeId) -> &[InvalidationHook] {
        self.node(id).map_or(&[][..], |node| node.hooks.as_slice())
    }

    /// Install an invalidation hook on a live object.
    pub fn install_hook(&mut self, id: NativeId, hook: InvalidationHook) -> BridgeResult<()> {
        let node = self.node_mut(id).ok_or(BridgeError::StaleNative(id))?;
        node.hooks.push(hook);
        Ok(())
    }

    /// Remove a previously installed hook so it will not fire.
    pub fn detach_hook(
        &mut self,
        id: NativeId,
        hook: &InvalidationHook,
    ) -> BridgeResult<InvalidationHook> {
        let node = self.node_mut(id).ok_or(BridgeError::StaleNative(id))?;
        let position = node
            .hooks
            .iter()
            .position(|installed| installed == hook)
            .ok_or(BridgeError::NoSuchHook {
                native: id,
                key: hook.key,
            })?;
        Ok(node.hooks.swap_remove(position))
    }

    /// Find the hook a family installed on an object.
    pub fn hook_for(&self, id: NativeId, key: &IdentityKey) -> Option<&InvalidationHook> {
        self.hooks(id).iter().find(|hook| hook.key == *key)
    }

    /// Destroy an object and its whole subtree.
    ///
    /// Children are destroyed before their parents. For each destroyed node,
    /// its hooks are passed to `sink` before the node's value is dropped.
    /// Returns the number of objects destroyed.
    pub fn destroy<S>(&mut self, id: NativeId, sink: &mut S) -> BridgeResult<usize>
    where
        S: InvalidationSink + ?Sized,
    {
        let parent = self.node(id).ok_or(BridgeError::StaleNative(id))?.parent;
        if let Some(parent) = parent
            && let Some(node) = self.node_mut(parent)
        {
            node.children.retain(|child| *child != id);
        }

        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            order.push(next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().copied());
            }
        }

        // Reversed pre-order visits every descendant before its ancestor.
        for victim in order.iter().rev() {
            self.release_node(*victim, sink);
        }
        Ok(order.len())
    }

    fn release_node<S>(&mut self, id: NativeId, sink: &mut S)
    where
        S: InvalidationSink + ?Sized,
    {
        let hooks = match self.node_mut(id) {
            Some(node) => std::mem::take(&mut node.hooks),
            None => return,
        };
        for hook in hooks {
            sink.invalidate(hook);
        }

        let slot = &mut self.slots[id.index() as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index());
        self.live -= 1;
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if the tree holds no objects.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl Default for NativeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NativeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeTree")
            .field("live", &self.live)
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TypeTag, WrapperHandle};

    fn hook(native: NativeId, family: &str) -> InvalidationHook {
        InvalidationHook::new(
            IdentityKey::new(TypeTag::from_name(family), native),
            WrapperHandle::new(native.index(), 0),
        )
    }

    fn discard(_: InvalidationHook) {}

    #[test]
    fn insert_and_get() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(42i32);

        assert_eq!(tree.get::<i32>(id), Some(&42));
        assert!(tree.is::<i32>(id));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn get_mut_updates_value() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(String::from("a"));

        if let Some(value) = tree.get_mut::<String>(id) {
            value.push('b');
        }

        assert_eq!(tree.get::<String>(id).map(String::as_str), Some("ab"));
    }

    #[test]
    fn wrong_type_is_none() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(42i32);

        assert!(tree.get::<String>(id).is_none());
        assert!(!tree.is::<String>(id));
    }

    #[test]
    fn append_child_links_parent() {
        let mut tree = NativeTree::new();
        let root = tree.insert_root("root");
        let child = tree.append_child(root, "child").unwrap();

        assert_eq!(tree.parent(child), Some(root));
        assert_eq!(tree.children(root), &[child]);
    }

    #[test]
    fn append_child_to_stale_parent_fails() {
        let mut tree = NativeTree::new();
        let root = tree.insert_root(1u8);
        tree.destroy(root, &mut discard).unwrap();

        assert_eq!(
            tree.append_child(root, 2u8),
            Err(BridgeError::StaleNative(root))
        );
    }

    #[test]
    fn destroy_retires_generation() {
        let mut tree = NativeTree::new();
        let first = tree.insert_root(1u32);
        tree.destroy(first, &mut discard).unwrap();

        let second = tree.insert_root(2u32);

        assert_eq!(first.index(), second.index());
        assert_ne!(first, second);
        assert!(tree.get::<u32>(first).is_none());
        assert_eq!(tree.get::<u32>(second), Some(&2));
    }

    #[test]
    fn destroy_subtree_children_first() {
        let mut tree = NativeTree::new();
        let root = tree.insert_root("root");
        let child = tree.append_child(root, "child").unwrap();
        let grandchild = tree.append_child(child, "grandchild").unwrap();
        for id in [root, child, grandchild] {
            tree.install_hook(id, hook(id, "Node")).unwrap();
        }

        let mut fired = Vec::new();
        let destroyed = tree
            .destroy(root, &mut |hook: InvalidationHook| fired.push(hook.key.native))
            .unwrap();

        assert_eq!(destroyed, 3);
        assert_eq!(fired, vec![grandchild, child, root]);
        assert!(tree.is_empty());
    }

    #[test]
    fn destroy_detaches_from_parent() {
        let mut tree = NativeTree::new();
        let root = tree.insert_root(0u8);
        let a = tree.append_child(root, 1u8).unwrap();
        let b = tree.append_child(root, 2u8).unwrap();

        tree.destroy(a, &mut discard).unwrap();

        assert_eq!(tree.children(root), &[b]);
        assert!(tree.contains(root));
    }

    #[test]
    fn destroy_stale_fails() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(0u8);
        tree.destroy(id, &mut discard).unwrap();

        assert_eq!(
            tree.destroy(id, &mut discard),
            Err(BridgeError::StaleNative(id))
        );
    }

    #[test]
    fn detach_hook_stops_it_firing() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(0u8);
        let node_hook = hook(id, "Node");
        let element_hook = hook(id, "Element");
        tree.install_hook(id, node_hook).unwrap();
        tree.install_hook(id, element_hook).unwrap();

        assert_eq!(tree.detach_hook(id, &node_hook), Ok(node_hook));
        assert_eq!(tree.hooks(id), &[element_hook]);

        let mut fired = Vec::new();
        tree.destroy(id, &mut |hook: InvalidationHook| fired.push(hook))
            .unwrap();
        assert_eq!(fired, vec![element_hook]);
    }

    #[test]
    fn detach_missing_hook() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(0u8);
        let missing = hook(id, "Node");

        assert_eq!(
            tree.detach_hook(id, &missing),
            Err(BridgeError::NoSuchHook {
                native: id,
                key: missing.key,
            })
        );
    }

    #[test]
    fn hook_for_finds_by_key() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(0u8);
        let installed = hook(id, "Node");
        tree.install_hook(id, installed).unwrap();

        assert_eq!(tree.hook_for(id, &installed.key), Some(&installed));
        assert!(tree.hook_for(id, &hook(id, "Text").key).is_none());
    }

    #[test]
    fn stale_accessors_are_empty() {
        let mut tree = NativeTree::new();
        let id = tree.insert_root(0u8);
        tree.destroy(id, &mut discard).unwrap();

        assert!(tree.children(id).is_empty());
        assert!(tree.hooks(id).is_empty());
        assert!(tree.parent(id).is_none());
        assert!(tree.type_name(id).is_none());
    }

    #[test]
    fn ids_resolve_only_in_their_tree() {
        let mut a = NativeTree::new();
        let mut b = NativeTree::new();
        let in_a = a.insert_root(1u8);
        let in_b = b.insert_root(2u8);

        assert_ne!(a.id(), b.id());
        assert_eq!(in_a.index(), in_b.index());
        assert_ne!(in_a, in_b);
        assert!(!b.contains(in_a));
        assert!(b.get::<u8>(in_a).is_none());
        assert_eq!(
            b.install_hook(in_a, hook(in_a, "Node")),
            Err(BridgeError::StaleNative(in_a))
        );
        assert_eq!(
            b.destroy(in_a, &mut discard),
            Err(BridgeError::StaleNative(in_a))
        );
        assert_eq!(b.get::<u8>(in_b), Some(&2));
    }

    #[test]
    fn debug_output() {
        let tree = NativeTree::default();
        assert_eq!(
            format!("{tree:?}"),
            "NativeTree { live: 0, slot_count: 0, free_count: 0 }"
        );
    }
}
