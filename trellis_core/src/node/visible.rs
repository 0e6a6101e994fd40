// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visible node order.

use alloc::vec::Vec;
use core::ops::Range;

use super::{NodeFlags, NodeStore};
use crate::handle::INVALID;

/// Visible nodes in draw order.
///
/// Every ordered top-level node that isn't hidden, itself or through an
/// ancestor, contributes one subtree laid out in pre-order. Nested top-level
/// nodes aren't part of their parent's subtree, they get their own entry at
/// their place in the top-level order.
#[derive(Debug, Default)]
pub(crate) struct VisibleNodes {
    /// Visible node ids, back to front.
    pub(crate) nodes: Vec<u32>,
    /// For each entry in `nodes`, how many of the following entries are its
    /// descendants.
    pub(crate) subtree_len: Vec<u32>,
    /// Index into `nodes` where each top-level subtree starts.
    pub(crate) top_level: Vec<u32>,
    /// Whether a node id is visible.
    pub(crate) mask: Vec<bool>,
}

enum Visit {
    Enter(u32),
    Exit(usize),
}

impl VisibleNodes {
    /// Range in [`nodes`](Self::nodes) covered by the `i`-th top-level subtree.
    pub(crate) fn top_level_range(&self, i: usize) -> Range<usize> {
        let start = self.top_level[i] as usize;
        start..start + self.subtree_len[start] as usize + 1
    }

    /// Indices into [`nodes`](Self::nodes) of the direct children of the
    /// entry at `index`, first to last.
    pub(crate) fn children_of(&self, index: usize, out: &mut Vec<usize>) {
        out.clear();
        let end = index + self.subtree_len[index] as usize + 1;
        let mut child = index + 1;
        while child < end {
            out.push(child);
            child += self.subtree_len[child] as usize + 1;
        }
    }
}

impl NodeStore {
    /// Walks the top-level order and collects visible nodes into `out`.
    pub(crate) fn collect_visible(&self, out: &mut VisibleNodes) {
        out.nodes.clear();
        out.subtree_len.clear();
        out.top_level.clear();
        out.mask.clear();
        out.mask.resize(self.parent.len(), false);

        let mut stack = Vec::new();
        let mut top = self.order_first;
        while top != INVALID {
            if !self.hidden_in_hierarchy(top) {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "visible node count is bounded by node capacity"
                )]
                out.top_level.push(out.nodes.len() as u32);
                stack.push(Visit::Enter(top));
                while let Some(visit) = stack.pop() {
                    match visit {
                        Visit::Enter(id) => {
                            let index = out.nodes.len();
                            out.nodes.push(id);
                            out.subtree_len.push(0);
                            out.mask[id as usize] = true;
                            stack.push(Visit::Exit(index));
                            // Pushed last to first so the first child is
                            // visited first.
                            let mut child = self.last_child[id as usize];
                            while child != INVALID {
                                if !self.top_level[child as usize]
                                    && !self.flags[child as usize].contains(NodeFlags::HIDDEN)
                                {
                                    stack.push(Visit::Enter(child));
                                }
                                child = self.prev_sibling[child as usize];
                            }
                        }
                        Visit::Exit(index) => {
                            #[expect(
                                clippy::cast_possible_truncation,
                                reason = "visible node count is bounded by node capacity"
                            )]
                            let len = (out.nodes.len() - index - 1) as u32;
                            out.subtree_len[index] = len;
                        }
                    }
                }
            }
            top = self.order_next[top as usize];
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Vec2;

    use super::*;
    use crate::handle::NodeHandle;

    fn node(store: &mut NodeStore, parent: NodeHandle, flags: NodeFlags) -> NodeHandle {
        store.create(parent, Vec2::ZERO, Vec2::new(1.0, 1.0), flags)
    }

    #[test]
    fn pre_order_per_top_level() {
        let mut store = NodeStore::new();
        let r1 = node(&mut store, NodeHandle::NULL, NodeFlags::empty());
        let a = node(&mut store, r1, NodeFlags::empty());
        let aa = node(&mut store, a, NodeFlags::empty());
        let b = node(&mut store, r1, NodeFlags::empty());
        let r2 = node(&mut store, NodeHandle::NULL, NodeFlags::empty());

        let mut visible = VisibleNodes::default();
        store.collect_visible(&mut visible);
        assert_eq!(
            visible.nodes,
            vec![r1.id(), a.id(), aa.id(), b.id(), r2.id()]
        );
        assert_eq!(visible.subtree_len, vec![3, 1, 0, 0, 0]);
        assert_eq!(visible.top_level, vec![0, 4]);
        assert_eq!(visible.top_level_range(0), 0..4);
        assert_eq!(visible.top_level_range(1), 4..5);

        let mut children = Vec::new();
        visible.children_of(0, &mut children);
        assert_eq!(children, vec![1, 3]);
    }

    #[test]
    fn hidden_subtrees_are_skipped() {
        let mut store = NodeStore::new();
        let r1 = node(&mut store, NodeHandle::NULL, NodeFlags::empty());
        let a = node(&mut store, r1, NodeFlags::HIDDEN);
        let _aa = node(&mut store, a, NodeFlags::empty());
        let b = node(&mut store, r1, NodeFlags::empty());
        let r2 = node(&mut store, NodeHandle::NULL, NodeFlags::HIDDEN);

        let mut visible = VisibleNodes::default();
        store.collect_visible(&mut visible);
        assert_eq!(visible.nodes, vec![r1.id(), b.id()]);
        assert!(!visible.mask[a.id() as usize]);
        assert!(!visible.mask[r2.id() as usize]);
    }

    #[test]
    fn nested_top_level_gets_own_subtree() {
        let mut store = NodeStore::new();
        let r1 = node(&mut store, NodeHandle::NULL, NodeFlags::empty());
        let a = node(&mut store, r1, NodeFlags::empty());
        let b = node(&mut store, r1, NodeFlags::empty());
        let r2 = node(&mut store, NodeHandle::NULL, NodeFlags::empty());
        store.set_order(a.id(), INVALID);

        let mut visible = VisibleNodes::default();
        store.collect_visible(&mut visible);
        assert_eq!(visible.nodes, vec![r1.id(), b.id(), a.id(), r2.id()]);
        assert_eq!(visible.top_level, vec![0, 2, 3]);

        // Hiding the parent hides the nested top-level node as well.
        store.flags[r1.id() as usize] = NodeFlags::HIDDEN;
        store.collect_visible(&mut visible);
        assert_eq!(visible.nodes, vec![r2.id()]);

        // Cleared nodes aren't visible.
        store.flags[r1.id() as usize] = NodeFlags::empty();
        store.clear_order(a.id());
        store.collect_visible(&mut visible);
        assert_eq!(visible.nodes, vec![r1.id(), b.id(), r2.id()]);
    }
}
