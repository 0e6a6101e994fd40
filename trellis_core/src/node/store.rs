// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node allocation, hierarchy links and lazy removal.

use alloc::vec::Vec;

use kurbo::Vec2;

use super::{NodeFlags, NodeStore};
use crate::handle::{DATA_GENERATION_BITS, DATA_ID_BITS, INVALID, NodeHandle};
use crate::slots::Slots;

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    pub(crate) fn new() -> Self {
        Self {
            slots: Slots::new(DATA_ID_BITS, DATA_GENERATION_BITS),
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            prev_sibling: Vec::new(),
            offset: Vec::new(),
            size: Vec::new(),
            opacity: Vec::new(),
            flags: Vec::new(),
            top_level: Vec::new(),
            ordered: Vec::new(),
            order_prev: Vec::new(),
            order_next: Vec::new(),
            order_last_nested: Vec::new(),
            order_first: INVALID,
            order_last: INVALID,
            top_level_count: 0,
            pending_removed: Vec::new(),
        }
    }

    // -- Allocation --

    /// Creates a node. A root node is appended to the end of the top-level
    /// order, a child node is appended to its parent's children.
    ///
    /// The caller is responsible for validating `parent`.
    pub(crate) fn create(
        &mut self,
        parent: NodeHandle,
        offset: Vec2,
        size: Vec2,
        flags: NodeFlags,
    ) -> NodeHandle {
        let (id, generation) = self.slots.create("UserInterface::create_node()");
        let idx = id as usize;
        if idx == self.parent.len() {
            self.parent.push(parent);
            self.first_child.push(INVALID);
            self.last_child.push(INVALID);
            self.next_sibling.push(INVALID);
            self.prev_sibling.push(INVALID);
            self.offset.push(offset);
            self.size.push(size);
            self.opacity.push(1.0);
            self.flags.push(flags);
            self.top_level.push(false);
            self.ordered.push(false);
            self.order_prev.push(INVALID);
            self.order_next.push(INVALID);
            self.order_last_nested.push(id);
        } else {
            // Reused slot, links were reset when it was recycled.
            self.parent[idx] = parent;
            self.offset[idx] = offset;
            self.size[idx] = size;
            self.opacity[idx] = 1.0;
            self.flags[idx] = flags;
        }

        if parent.is_null() {
            self.top_level[idx] = true;
            self.top_level_count += 1;
            self.order_last_nested[idx] = id;
            self.link_order_range(id, INVALID);
        } else {
            self.link_child(parent.id(), id);
        }

        NodeHandle::new(id, generation)
    }

    /// Whether the handle refers to a live node.
    #[inline]
    pub(crate) fn is_valid(&self, handle: NodeHandle) -> bool {
        self.slots.is_valid(handle.id(), handle.generation())
    }

    /// Marks a node as removed.
    ///
    /// The handle becomes invalid immediately and the node disappears from
    /// its parent's children and from the top-level order. The subtree is
    /// discovered and freed by the next [`clean`](Self::clean).
    pub(crate) fn remove(&mut self, id: u32) {
        let parent = self.parent[id as usize];
        if !parent.is_null() {
            self.unlink_child(parent.id(), id);
        }
        self.discard(id);
        self.pending_removed.push(id);
    }

    /// Whether [`clean`](Self::clean) has work to do.
    #[inline]
    pub(crate) fn needs_clean(&self) -> bool {
        !self.pending_removed.is_empty()
    }

    /// Frees all removed nodes together with their descendants and returns
    /// the ids of every freed slot.
    ///
    /// Descendants are found by walking down from each removed node, so the
    /// cost is linear in the size of the removed subtrees.
    pub(crate) fn clean(&mut self) -> Vec<u32> {
        let mut stack = core::mem::take(&mut self.pending_removed);
        let mut removed = Vec::new();
        while let Some(id) = stack.pop() {
            let mut child = self.first_child[id as usize];
            while child != INVALID {
                let next = self.next_sibling[child as usize];
                self.discard(child);
                stack.push(child);
                child = next;
            }
            removed.push(id);
        }

        for &id in &removed {
            let idx = id as usize;
            self.parent[idx] = NodeHandle::NULL;
            self.first_child[idx] = INVALID;
            self.last_child[idx] = INVALID;
            self.next_sibling[idx] = INVALID;
            self.prev_sibling[idx] = INVALID;
            self.top_level[idx] = false;
            self.ordered[idx] = false;
            self.order_prev[idx] = INVALID;
            self.order_next[idx] = INVALID;
            self.order_last_nested[idx] = id;
            self.slots.recycle(id);
        }
        removed
    }

    // -- Internal helpers --

    /// Invalidates the handle and takes the node out of the top-level order,
    /// leaving hierarchy links intact for [`clean`](Self::clean) to follow.
    fn discard(&mut self, id: u32) {
        if self.top_level[id as usize] {
            if self.ordered[id as usize] {
                self.unlink_order_range(id);
            }
            self.top_level_count -= 1;
        }
        self.slots.retire(id);
    }

    /// Appends `child` as the last child of `parent`.
    fn link_child(&mut self, parent: u32, child: u32) {
        let last = self.last_child[parent as usize];
        self.prev_sibling[child as usize] = last;
        self.next_sibling[child as usize] = INVALID;
        if last == INVALID {
            self.first_child[parent as usize] = child;
        } else {
            self.next_sibling[last as usize] = child;
        }
        self.last_child[parent as usize] = child;
    }

    /// Removes `child` from the child list of `parent`. The parent handle
    /// stored in `child` is kept.
    fn unlink_child(&mut self, parent: u32, child: u32) {
        let prev = self.prev_sibling[child as usize];
        let next = self.next_sibling[child as usize];
        if prev == INVALID {
            self.first_child[parent as usize] = next;
        } else {
            self.next_sibling[prev as usize] = next;
        }
        if next == INVALID {
            self.last_child[parent as usize] = prev;
        } else {
            self.prev_sibling[next as usize] = prev;
        }
        self.prev_sibling[child as usize] = INVALID;
        self.next_sibling[child as usize] = INVALID;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn root(store: &mut NodeStore) -> NodeHandle {
        store.create(NodeHandle::NULL, Vec2::ZERO, Vec2::new(10.0, 10.0), NodeFlags::empty())
    }

    fn child(store: &mut NodeStore, parent: NodeHandle) -> NodeHandle {
        store.create(parent, Vec2::ZERO, Vec2::new(5.0, 5.0), NodeFlags::empty())
    }

    #[test]
    fn create_links_children_in_order() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        let a = child(&mut store, r);
        let b = child(&mut store, r);
        let c = child(&mut store, r);
        let kids: Vec<u32> = store.children(r.id()).collect();
        assert_eq!(kids, vec![a.id(), b.id(), c.id()]);
        assert!(store.top_level[r.id() as usize]);
        assert!(!store.top_level[a.id() as usize]);
        assert_eq!(store.top_level_count, 1);
    }

    #[test]
    fn remove_is_lazy_for_descendants() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        let a = child(&mut store, r);
        let aa = child(&mut store, a);
        let b = child(&mut store, r);

        store.remove(a.id());
        assert!(!store.is_valid(a));
        // Descendants stay valid until clean.
        assert!(store.is_valid(aa));
        assert_eq!(store.children(r.id()).collect::<Vec<_>>(), vec![b.id()]);
        assert!(store.needs_clean());

        let mut removed = store.clean();
        removed.sort_unstable();
        assert_eq!(removed, vec![a.id(), aa.id()]);
        assert!(!store.is_valid(aa));
        assert!(store.is_valid(b));
        assert!(store.is_valid(r));
        assert!(!store.needs_clean());
    }

    #[test]
    fn removed_slots_recycled_only_after_clean() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        store.remove(r.id());
        assert_eq!(store.slots.used_count(), 1);
        let other = root(&mut store);
        assert_ne!(other.id(), r.id());
        store.clean();
        assert_eq!(store.slots.used_count(), 1);
        let reused = root(&mut store);
        assert_eq!(reused.id(), r.id());
        assert_ne!(reused.generation(), r.generation());
    }

    #[test]
    fn removing_middle_child_keeps_sibling_links() {
        let mut store = NodeStore::new();
        let r = root(&mut store);
        let a = child(&mut store, r);
        let b = child(&mut store, r);
        let c = child(&mut store, r);
        store.remove(b.id());
        assert_eq!(store.children(r.id()).collect::<Vec<_>>(), vec![a.id(), c.id()]);
        store.remove(c.id());
        let d = child(&mut store, r);
        assert_eq!(store.children(r.id()).collect::<Vec<_>>(), vec![a.id(), d.id()]);
    }
}
