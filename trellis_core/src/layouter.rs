// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layouters: components that compute node offsets and sizes.
//!
//! A concrete layouter embeds a [`LayouterCore`] that allocates layout
//! handles, each assigned to exactly one node. During
//! [`UserInterface::update`](crate::UserInterface::update) the layouts of
//! all visible nodes are ordered so that a layout always runs after the
//! layouts of its closest laid-out ancestor, and each layouter gets to
//! rewrite the offsets and sizes of its nodes.

use alloc::vec::Vec;
use core::any::Any;

use bitflags::bitflags;
use kurbo::{Size, Vec2};

use crate::handle::{
    DATA_GENERATION_BITS, DATA_ID_BITS, LayoutHandle, LayouterDataHandle, LayouterHandle,
    NodeHandle,
};
use crate::slots::Slots;

bitflags! {
    /// Pending work of a layouter.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayouterStates: u8 {
        /// Layout parameters changed.
        const NEEDS_UPDATE = 1 << 0;
        /// Layouts were added or removed.
        const NEEDS_ASSIGNMENT_UPDATE = Self::NEEDS_UPDATE.bits() | 1 << 1;
    }
}

/// Layout handle allocation and node assignments of a layouter.
#[derive(Debug)]
pub struct LayouterCore {
    handle: LayouterHandle,
    state: LayouterStates,
    slots: Slots,
    nodes: Vec<NodeHandle>,
}

impl LayouterCore {
    /// Creates the core of a layouter with a handle returned from
    /// [`UserInterface::create_layouter`](crate::UserInterface::create_layouter).
    ///
    /// # Panics
    ///
    /// Panics if `handle` is Null.
    #[must_use]
    pub fn new(handle: LayouterHandle) -> Self {
        assert!(!handle.is_null(), "LayouterCore::new(): handle is null");
        Self {
            handle,
            state: LayouterStates::empty(),
            slots: Slots::new(DATA_ID_BITS, DATA_GENERATION_BITS),
            nodes: Vec::new(),
        }
    }

    /// Handle of the layouter.
    #[must_use]
    pub fn handle(&self) -> LayouterHandle {
        self.handle
    }

    /// Pending work.
    #[must_use]
    pub fn state(&self) -> LayouterStates {
        self.state
    }

    /// Marks layouts as needing an update.
    pub fn set_needs_update(&mut self) {
        self.state |= LayouterStates::NEEDS_UPDATE;
    }

    pub(crate) fn clear_state(&mut self, states: LayouterStates) {
        self.state.remove(states);
    }

    /// Number of layout slots allocated so far.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Number of live layouts.
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.slots.used_count()
    }

    /// Whether `handle` refers to a live layout of this layouter.
    #[must_use]
    pub fn is_handle_valid(&self, handle: LayoutHandle) -> bool {
        handle.layouter() == self.handle && self.is_local_handle_valid(handle.data())
    }

    /// Whether `handle` refers to a live layout of this layouter.
    #[must_use]
    pub fn is_local_handle_valid(&self, handle: LayouterDataHandle) -> bool {
        self.slots.is_valid(handle.id(), handle.generation())
    }

    /// Adds a layout to `node`.
    ///
    /// The node isn't validated here; layouts assigned to a node that
    /// doesn't exist are removed on the next clean. A node can have at most
    /// one layout from each layouter, which the user interface checks when
    /// ordering layouts.
    ///
    /// # Panics
    ///
    /// Panics if `node` is Null.
    pub fn add(&mut self, node: NodeHandle) -> LayoutHandle {
        assert!(!node.is_null(), "LayouterCore::add(): node is null");
        let (id, generation) = self.slots.create("LayouterCore::add()");
        let idx = id as usize;
        if idx == self.nodes.len() {
            self.nodes.push(node);
        } else {
            self.nodes[idx] = node;
        }
        self.state |= LayouterStates::NEEDS_ASSIGNMENT_UPDATE;
        LayoutHandle::new(self.handle, LayouterDataHandle::new(id, generation))
    }

    /// Removes a layout.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove(&mut self, handle: LayoutHandle) {
        assert!(
            self.is_handle_valid(handle),
            "LayouterCore::remove(): invalid handle {handle:?}"
        );
        self.nodes[handle.id() as usize] = NodeHandle::NULL;
        self.slots.remove(handle.id());
        self.state |= LayouterStates::NEEDS_ASSIGNMENT_UPDATE;
    }

    /// Node the layout is assigned to.
    ///
    /// # Panics
    ///
    /// Panics if `layout` isn't valid.
    #[must_use]
    pub fn node(&self, layout: LayouterDataHandle) -> NodeHandle {
        assert!(
            self.is_local_handle_valid(layout),
            "LayouterCore::node(): invalid handle {layout:?}"
        );
        self.nodes[layout.id() as usize]
    }

    /// Node assignments of all layout slots, indexed by layout id. Free slots
    /// hold Null.
    #[must_use]
    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Removes layouts of nodes that no longer exist and returns their ids.
    pub(crate) fn clean_nodes(&mut self, node_generations: &[u16]) -> Vec<u32> {
        let mut removed = Vec::new();
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            if node.is_null() {
                continue;
            }
            let alive = node_generations
                .get(node.id() as usize)
                .is_some_and(|&generation| u32::from(generation) == node.generation());
            if !alive {
                *node = NodeHandle::NULL;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "layout slot count is bounded by 1 << DATA_ID_BITS"
                )]
                removed.push(idx as u32);
            }
        }
        for &id in &removed {
            self.slots.remove(id);
        }
        if !removed.is_empty() {
            self.state |= LayouterStates::NEEDS_ASSIGNMENT_UPDATE;
        }
        removed
    }
}

/// A layouter.
pub trait Layouter: Any {
    /// The embedded core.
    fn core(&self) -> &LayouterCore;

    /// The embedded core.
    fn core_mut(&mut self) -> &mut LayouterCore;

    /// The user interface size changed.
    fn set_size(&mut self, size: Size) {
        _ = size;
    }

    /// Layouts with the given ids were removed because their nodes were.
    fn clean(&mut self, removed: &[u32]) {
        _ = removed;
    }

    /// Computes one pass of layouts.
    ///
    /// `layout_ids` lists the layouts to compute, parents before children.
    /// `top_level_layout_ids` is the subset whose parent layout, if any,
    /// belongs to a different pass and is already final. `node_offsets` and
    /// `node_sizes` are indexed by node id and hold the results of earlier
    /// passes; the layouter overwrites entries of its own nodes and may read
    /// any other.
    fn update(
        &mut self,
        layout_ids: &[u32],
        top_level_layout_ids: &[u32],
        node_offsets: &mut [Vec2],
        node_sizes: &mut [Vec2],
    );
}
