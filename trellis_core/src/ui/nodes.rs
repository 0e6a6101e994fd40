// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node creation, properties and top-level order.

use kurbo::Vec2;

use crate::handle::{INVALID, NodeHandle};
use crate::node::NodeFlags;
use crate::state::UserInterfaceStates;

use super::UserInterface;

impl UserInterface {
    /// Number of allocated node slots.
    #[must_use]
    pub fn node_capacity(&self) -> u32 {
        self.nodes.slots.capacity()
    }

    /// Number of live nodes.
    ///
    /// Removed nodes and their descendants are counted until the next
    /// [`clean`](Self::clean).
    #[must_use]
    pub fn node_used_count(&self) -> u32 {
        self.nodes.slots.used_count()
    }

    /// Whether `handle` refers to a live node.
    #[must_use]
    pub fn is_node_handle_valid(&self, handle: NodeHandle) -> bool {
        !handle.is_null() && self.nodes.is_valid(handle)
    }

    fn assert_node(&self, handle: NodeHandle, what: &str) {
        assert!(
            self.is_node_handle_valid(handle),
            "UserInterface::{what}(): invalid handle {handle:?}"
        );
    }

    pub(super) fn node_handle(&self, id: u32) -> NodeHandle {
        if id == INVALID {
            NodeHandle::NULL
        } else {
            NodeHandle::new(id, self.nodes.slots.generation(id))
        }
    }

    /// Creates a node.
    ///
    /// A node without a parent is a root. Roots are top-level and appended to
    /// the end of the top-level order, so they're drawn on top of everything
    /// created before.
    ///
    /// # Panics
    ///
    /// Panics if `parent` isn't Null or valid, or all node slots are taken.
    pub fn create_node(
        &mut self,
        parent: NodeHandle,
        offset: Vec2,
        size: Vec2,
        flags: NodeFlags,
    ) -> NodeHandle {
        assert!(
            parent.is_null() || self.nodes.is_valid(parent),
            "UserInterface::create_node(): invalid parent handle {parent:?}"
        );
        let handle = self.nodes.create(parent, offset, size, flags);
        self.state |= UserInterfaceStates::NEEDS_NODE_UPDATE;
        handle
    }

    /// Removes a node.
    ///
    /// The handle is invalid right away. Descendants, attached data, layouts
    /// and animations are removed on the next [`clean`](Self::clean).
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        self.assert_node(handle, "remove_node");
        self.nodes.remove(handle.id());
        self.state |= UserInterfaceStates::NEEDS_NODE_CLEAN;
    }

    /// Parent node, or Null for a root.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn node_parent(&self, handle: NodeHandle) -> NodeHandle {
        self.assert_node(handle, "node_parent");
        self.nodes.parent[handle.id() as usize]
    }

    /// Offset relative to the parent, as set by the user.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn node_offset(&self, handle: NodeHandle) -> Vec2 {
        self.assert_node(handle, "node_offset");
        self.nodes.offset[handle.id() as usize]
    }

    /// Sets the offset relative to the parent.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn set_node_offset(&mut self, handle: NodeHandle, offset: Vec2) {
        self.assert_node(handle, "set_node_offset");
        self.nodes.offset[handle.id() as usize] = offset;
        self.state |= UserInterfaceStates::NEEDS_LAYOUT_UPDATE;
    }

    /// Size, as set by the user.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn node_size(&self, handle: NodeHandle) -> Vec2 {
        self.assert_node(handle, "node_size");
        self.nodes.size[handle.id() as usize]
    }

    /// Sets the size.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn set_node_size(&mut self, handle: NodeHandle, size: Vec2) {
        self.assert_node(handle, "set_node_size");
        self.nodes.size[handle.id() as usize] = size;
        self.state |= UserInterfaceStates::NEEDS_LAYOUT_UPDATE;
    }

    /// Own opacity. The effective opacity is the product of all ancestors'.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn node_opacity(&self, handle: NodeHandle) -> f32 {
        self.assert_node(handle, "node_opacity");
        self.nodes.opacity[handle.id() as usize]
    }

    /// Sets the own opacity.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn set_node_opacity(&mut self, handle: NodeHandle, opacity: f32) {
        self.assert_node(handle, "set_node_opacity");
        self.nodes.opacity[handle.id() as usize] = opacity;
        self.state |= UserInterfaceStates::NEEDS_NODE_OPACITY_UPDATE;
    }

    /// Own flags.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn node_flags(&self, handle: NodeHandle) -> NodeFlags {
        self.assert_node(handle, "node_flags");
        self.nodes.flags[handle.id() as usize]
    }

    /// Replaces the own flags, scheduling only the work the changed flags
    /// affect.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn set_node_flags(&mut self, handle: NodeHandle, flags: NodeFlags) {
        self.assert_node(handle, "set_node_flags");
        self.set_node_flags_internal(handle.id(), flags);
    }

    /// Adds flags to the own flags.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn add_node_flags(&mut self, handle: NodeHandle, flags: NodeFlags) {
        self.assert_node(handle, "add_node_flags");
        let current = self.nodes.flags[handle.id() as usize];
        self.set_node_flags_internal(handle.id(), current | flags);
    }

    /// Removes flags from the own flags.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn clear_node_flags(&mut self, handle: NodeHandle, flags: NodeFlags) {
        self.assert_node(handle, "clear_node_flags");
        let current = self.nodes.flags[handle.id() as usize];
        self.set_node_flags_internal(handle.id(), current - flags);
    }

    fn set_node_flags_internal(&mut self, id: u32, flags: NodeFlags) {
        let changed = self.nodes.flags[id as usize] ^ flags;
        self.nodes.flags[id as usize] = flags;
        self.state |= flags_state(changed);
    }

    // -- Top-level order --

    /// Number of nodes that can be in the top-level order.
    #[must_use]
    pub fn node_order_capacity(&self) -> u32 {
        self.nodes.slots.capacity()
    }

    /// Number of top-level nodes, ordered or not.
    #[must_use]
    pub fn node_order_used_count(&self) -> u32 {
        self.nodes.top_level_count
    }

    /// Whether the node is top-level, i.e. drawn and hit-tested as its own
    /// subtree. Roots are always top-level.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn is_node_top_level(&self, handle: NodeHandle) -> bool {
        self.assert_node(handle, "is_node_top_level");
        self.nodes.top_level[handle.id() as usize]
    }

    /// Whether the node is top-level and part of the order.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn is_node_ordered(&self, handle: NodeHandle) -> bool {
        self.assert_node(handle, "is_node_ordered");
        let idx = handle.id() as usize;
        self.nodes.top_level[idx] && self.nodes.ordered[idx]
    }

    /// Root drawn first, or Null if nothing is ordered.
    #[must_use]
    pub fn node_order_first(&self) -> NodeHandle {
        self.node_handle(self.nodes.order_first_root())
    }

    /// Root drawn last, or Null if nothing is ordered.
    #[must_use]
    pub fn node_order_last(&self) -> NodeHandle {
        self.node_handle(self.nodes.order_last_root())
    }

    /// Ordered node in the same scope drawn before `handle`, or Null.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or isn't top-level.
    #[must_use]
    pub fn node_order_previous(&self, handle: NodeHandle) -> NodeHandle {
        self.assert_top_level(handle, "node_order_previous");
        self.node_handle(self.nodes.order_previous_sibling(handle.id()))
    }

    /// Ordered node in the same scope drawn after `handle` and everything
    /// nested in it, or Null.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or isn't top-level.
    #[must_use]
    pub fn node_order_next(&self, handle: NodeHandle) -> NodeHandle {
        self.assert_top_level(handle, "node_order_next");
        self.node_handle(self.nodes.order_next_sibling(handle.id()))
    }

    /// Last node of the range ordered relative to `handle`, which is
    /// `handle` itself if nothing is nested in it.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or isn't top-level.
    #[must_use]
    pub fn node_order_last_nested(&self, handle: NodeHandle) -> NodeHandle {
        self.assert_top_level(handle, "node_order_last_nested");
        self.node_handle(self.nodes.order_last_nested[handle.id() as usize])
    }

    fn assert_top_level(&self, handle: NodeHandle, what: &str) {
        self.assert_node(handle, what);
        assert!(
            self.nodes.top_level[handle.id() as usize],
            "UserInterface::{what}(): {handle:?} isn't top-level"
        );
    }

    /// Orders the node before `before`, or last in its scope if `before` is
    /// Null. A non-root node becomes top-level, drawn after everything in
    /// its closest top-level ancestor's range that it's ordered after.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, `before` isn't Null or an ordered
    /// node in the same scope, or a non-top-level `handle` has top-level
    /// descendants.
    pub fn set_node_order(&mut self, handle: NodeHandle, before: NodeHandle) {
        self.assert_node(handle, "set_node_order");
        let id = handle.id();
        let scope = self.nodes.closest_top_level_ancestor(id);
        let before_id = if before.is_null() {
            INVALID
        } else {
            assert!(
                self.nodes.is_valid(before),
                "UserInterface::set_node_order(): invalid before handle {before:?}"
            );
            assert!(
                before != handle,
                "UserInterface::set_node_order(): can't order {handle:?} before itself"
            );
            let before_idx = before.id() as usize;
            assert!(
                self.nodes.top_level[before_idx] && self.nodes.ordered[before_idx],
                "UserInterface::set_node_order(): {before:?} isn't ordered"
            );
            assert!(
                self.nodes.closest_top_level_ancestor(before.id()) == scope,
                "UserInterface::set_node_order(): {before:?} isn't in the same scope as {handle:?}"
            );
            before.id()
        };
        if !self.nodes.top_level[id as usize] {
            assert!(
                !self.nodes.has_nested_top_level(id),
                "UserInterface::set_node_order(): {handle:?} has top-level descendants"
            );
        }
        self.nodes.set_order(id, before_id);
        self.state |= UserInterfaceStates::NEEDS_NODE_UPDATE;
    }

    /// Takes the node and everything nested in it out of the order, so it's
    /// neither drawn nor receives events. Does nothing if it isn't ordered.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn clear_node_order(&mut self, handle: NodeHandle) {
        self.assert_node(handle, "clear_node_order");
        if self.nodes.clear_order(handle.id()) {
            self.state |= UserInterfaceStates::NEEDS_NODE_UPDATE;
        }
    }

    /// Makes a non-root top-level node an ordinary part of its parent's
    /// subtree again. Does nothing if it isn't top-level.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or is a root.
    pub fn flatten_node_order(&mut self, handle: NodeHandle) {
        self.assert_node(handle, "flatten_node_order");
        assert!(
            !self.nodes.parent[handle.id() as usize].is_null(),
            "UserInterface::flatten_node_order(): {handle:?} is a root node"
        );
        if self.nodes.flatten_order(handle.id()) {
            self.state |= UserInterfaceStates::NEEDS_NODE_UPDATE;
        }
    }
}

/// Work scheduled by a change of the given flags.
fn flags_state(changed: NodeFlags) -> UserInterfaceStates {
    let mut state = UserInterfaceStates::empty();
    if changed.contains(NodeFlags::HIDDEN) {
        state |= UserInterfaceStates::NEEDS_NODE_UPDATE;
    }
    if changed.contains(NodeFlags::CLIP) {
        state |= UserInterfaceStates::NEEDS_NODE_CLIP_UPDATE;
    }
    if changed.intersects(NodeFlags::DISABLED | NodeFlags::FOCUSABLE) {
        state |= UserInterfaceStates::NEEDS_NODE_ENABLED_UPDATE;
    }
    state
}
