// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use crate::handle::INVALID;

use super::NodeStore;

/// An iterator over the ids of the direct children of a node, first to last.
///
/// Created by [`NodeStore::children`].
#[derive(Debug)]
pub(crate) struct Children<'a> {
    store: &'a NodeStore,
    current: u32,
}

impl<'a> Children<'a> {
    pub(crate) fn new(store: &'a NodeStore, first: u32) -> Self {
        Self {
            store,
            current: first,
        }
    }
}

impl Iterator for Children<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.current == INVALID {
            return None;
        }
        let id = self.current;
        self.current = self.store.next_sibling[id as usize];
        Some(id)
    }
}

impl NodeStore {
    /// Iterates the direct children of node `id`.
    pub(crate) fn children(&self, id: u32) -> Children<'_> {
        Children::new(self, self.first_child[id as usize])
    }

    /// Id of the closest ancestor of `id` that is top-level, or [`INVALID`]
    /// for root nodes.
    pub(crate) fn closest_top_level_ancestor(&self, id: u32) -> u32 {
        let mut parent = self.parent[id as usize];
        while !parent.is_null() {
            let p = parent.id();
            if self.top_level[p as usize] {
                return p;
            }
            parent = self.parent[p as usize];
        }
        INVALID
    }

    /// Whether `id` or any of its ancestors has [`NodeFlags::HIDDEN`].
    ///
    /// [`NodeFlags::HIDDEN`]: super::NodeFlags::HIDDEN
    pub(crate) fn hidden_in_hierarchy(&self, id: u32) -> bool {
        let mut current = id;
        loop {
            if self.flags[current as usize].contains(super::NodeFlags::HIDDEN) {
                return true;
            }
            let parent = self.parent[current as usize];
            if parent.is_null() {
                return false;
            }
            current = parent.id();
        }
    }
}
