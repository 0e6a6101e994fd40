// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Top-level node order.
//!
//! The order is a single doubly-linked list over node ids. Root nodes appear
//! in it directly. A nested top-level node is linked somewhere after its
//! closest top-level ancestor, before that ancestor's last nested node, so a
//! top-level node together with everything nested in it is always a
//! contiguous range `[id ..= order_last_nested[id]]`.
//!
//! A range taken out of the list with [`NodeStore::clear_order`] keeps its
//! internal links, so nested nodes come back in the same relative order once
//! the node is ordered again.

use super::NodeStore;
use crate::handle::INVALID;

impl NodeStore {
    /// Moves or inserts the range of top-level node `id` before `before`, or
    /// at the end of its scope if `before` is [`INVALID`].
    ///
    /// If `id` wasn't top-level yet, it becomes one. The caller checks that
    /// `before` is ordered and shares the scope of `id`, and that a node
    /// being promoted doesn't already contain ordered nested top-level nodes.
    pub(crate) fn set_order(&mut self, id: u32, before: u32) {
        let idx = id as usize;
        if !self.top_level[idx] {
            self.top_level[idx] = true;
            self.top_level_count += 1;
            self.order_prev[idx] = INVALID;
            self.order_next[idx] = INVALID;
            self.order_last_nested[idx] = id;
        } else if self.ordered[idx] {
            self.unlink_order_range(id);
        }
        self.link_order_range(id, before);
    }

    /// Takes the range of `id` out of the order. Returns `false` if the node
    /// isn't top-level or isn't ordered.
    pub(crate) fn clear_order(&mut self, id: u32) -> bool {
        if !self.top_level[id as usize] || !self.ordered[id as usize] {
            return false;
        }
        self.unlink_order_range(id);
        true
    }

    /// Makes a non-root top-level node a regular part of its parent's
    /// hierarchy again. Returns `false` if the node isn't top-level.
    ///
    /// Nodes nested in it stay top-level. If `id` was ordered they keep their
    /// place in the order, otherwise they end up unordered.
    pub(crate) fn flatten_order(&mut self, id: u32) -> bool {
        let idx = id as usize;
        if !self.top_level[idx] {
            return false;
        }

        let last = self.order_last_nested[idx];
        if self.ordered[idx] {
            let prev = self.order_prev[idx];
            let next = self.order_next[idx];
            debug_assert!(prev != INVALID, "nested top-level node without a predecessor");
            self.order_next[prev as usize] = next;
            if next == INVALID {
                if self.order_last == id {
                    self.order_last = prev;
                }
            } else {
                self.order_prev[next as usize] = prev;
            }
            if last == id {
                self.shrink_last_nested(id, id, prev);
            }
        } else if last != id {
            // Detach every directly nested range from the dangling chain.
            let mut nested = self.order_next[idx];
            loop {
                let nested_last = self.order_last_nested[nested as usize];
                let after = self.order_next[nested_last as usize];
                self.order_prev[nested as usize] = INVALID;
                self.order_next[nested_last as usize] = INVALID;
                self.ordered[nested as usize] = false;
                if nested_last == last {
                    break;
                }
                nested = after;
            }
        }

        self.top_level[idx] = false;
        self.ordered[idx] = false;
        self.order_prev[idx] = INVALID;
        self.order_next[idx] = INVALID;
        self.order_last_nested[idx] = id;
        self.top_level_count -= 1;
        true
    }

    /// Whether any ordered top-level node sits somewhere in the subtree of
    /// the (non-top-level) node `id`.
    pub(crate) fn has_nested_top_level(&self, id: u32) -> bool {
        let scope = self.closest_top_level_ancestor(id);
        if scope == INVALID {
            return false;
        }
        let end = self.order_last_nested[scope as usize];
        let mut current = scope;
        while current != end {
            current = self.order_next[current as usize];
            if self.is_descendant(current, id) {
                return true;
            }
        }
        false
    }

    /// Whether `id` is a (transitive) child of `ancestor`.
    pub(crate) fn is_descendant(&self, id: u32, ancestor: u32) -> bool {
        let mut parent = self.parent[id as usize];
        while !parent.is_null() {
            if parent.id() == ancestor {
                return true;
            }
            parent = self.parent[parent.id() as usize];
        }
        false
    }

    // -- Queries --

    /// First root in the order.
    pub(crate) fn order_first_root(&self) -> u32 {
        self.order_first
    }

    /// Last root in the order.
    pub(crate) fn order_last_root(&self) -> u32 {
        let mut current = self.order_last;
        if current == INVALID {
            return INVALID;
        }
        loop {
            let scope = self.closest_top_level_ancestor(current);
            if scope == INVALID {
                return current;
            }
            current = scope;
        }
    }

    /// Previous ordered node in the same scope as `id`, skipping ranges
    /// nested in it.
    pub(crate) fn order_previous_sibling(&self, id: u32) -> u32 {
        if !self.ordered[id as usize] {
            return INVALID;
        }
        let scope = self.closest_top_level_ancestor(id);
        let mut prev = self.order_prev[id as usize];
        if prev == INVALID || prev == scope {
            return INVALID;
        }
        loop {
            let prev_scope = self.closest_top_level_ancestor(prev);
            if prev_scope == scope {
                return prev;
            }
            prev = prev_scope;
        }
    }

    /// Next ordered node in the same scope as `id`, skipping ranges nested
    /// in it.
    pub(crate) fn order_next_sibling(&self, id: u32) -> u32 {
        if !self.ordered[id as usize] {
            return INVALID;
        }
        let next = self.order_next[self.order_last_nested[id as usize] as usize];
        if next == INVALID {
            return INVALID;
        }
        let scope = self.closest_top_level_ancestor(id);
        if scope != INVALID
            && self.order_last_nested[scope as usize] == self.order_last_nested[id as usize]
        {
            return INVALID;
        }
        next
    }

    // -- Internal helpers --

    /// Links the range of `id` before `before`, or after the last node
    /// nested in the scope of `id` if `before` is [`INVALID`].
    fn link_order_range(&mut self, id: u32, before: u32) {
        let last = self.order_last_nested[id as usize];
        let scope = self.closest_top_level_ancestor(id);
        let (prev, next) = if before != INVALID {
            (self.order_prev[before as usize], before)
        } else if scope == INVALID {
            (self.order_last, INVALID)
        } else {
            let prev = self.order_last_nested[scope as usize];
            (prev, self.order_next[prev as usize])
        };

        self.order_prev[id as usize] = prev;
        self.order_next[last as usize] = next;
        if prev == INVALID {
            self.order_first = id;
        } else {
            self.order_next[prev as usize] = id;
        }
        if next == INVALID {
            if self.order_last == prev {
                self.order_last = last;
            }
        } else {
            self.order_prev[next as usize] = last;
        }

        if before == INVALID && scope != INVALID {
            let mut ancestor = scope;
            while ancestor != INVALID && self.order_last_nested[ancestor as usize] == prev {
                self.order_last_nested[ancestor as usize] = last;
                ancestor = self.closest_top_level_ancestor(ancestor);
            }
        }
        self.ordered[id as usize] = true;
    }

    /// Takes the range of the ordered top-level node `id` out of whatever
    /// chain it's linked into.
    pub(crate) fn unlink_order_range(&mut self, id: u32) {
        let last = self.order_last_nested[id as usize];
        let prev = self.order_prev[id as usize];
        let next = self.order_next[last as usize];

        if prev == INVALID {
            if self.order_first == id {
                self.order_first = next;
            }
        } else {
            self.order_next[prev as usize] = next;
        }
        if next == INVALID {
            if self.order_last == last {
                self.order_last = prev;
            }
        } else {
            self.order_prev[next as usize] = prev;
        }

        self.shrink_last_nested(id, last, prev);
        self.order_prev[id as usize] = INVALID;
        self.order_next[last as usize] = INVALID;
        self.ordered[id as usize] = false;
    }

    /// Ancestor ranges of `id` that ended at `last` now end at `prev`.
    fn shrink_last_nested(&mut self, id: u32, last: u32, prev: u32) {
        let mut ancestor = self.closest_top_level_ancestor(id);
        while ancestor != INVALID && self.order_last_nested[ancestor as usize] == last {
            self.order_last_nested[ancestor as usize] = prev;
            ancestor = self.closest_top_level_ancestor(ancestor);
        }
    }
}
