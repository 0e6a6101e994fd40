// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node hierarchy storage.
//!
//! Nodes live in struct-of-arrays storage indexed by the id part of their
//! [`NodeHandle`](crate::handle::NodeHandle). Besides own properties
//! (offset, size, opacity, flags) each slot carries:
//!
//! - **Hierarchy links**: parent handle plus first/last child and sibling
//!   indices, so that subtrees can be walked without scanning all nodes.
//! - **Top-level order links**: nodes that are drawn and hit-tested
//!   independently of their place in the hierarchy form a doubly-linked
//!   list. A top-level node and everything ordered relative to it form a
//!   contiguous range ending at its *last nested* node, so moving a top-level
//!   node moves its nested top-level nodes along.
//!
//! Removal is lazy: [`NodeStore::remove`] invalidates the handle right away
//! and unlinks the node from its parent, but descendants are only discovered
//! and freed by [`NodeStore::clean`].

mod order;
mod store;
mod traverse;
mod visible;

use alloc::vec::Vec;

use bitflags::bitflags;
use kurbo::Vec2;

use crate::handle::NodeHandle;
use crate::slots::Slots;

pub(crate) use self::traverse::Children;
pub(crate) use self::visible::VisibleNodes;

bitflags! {
    /// Per-node behavior flags.
    ///
    /// [`HIDDEN`](Self::HIDDEN), [`NO_EVENTS`](Self::NO_EVENTS) and
    /// [`DISABLED`](Self::DISABLED) apply to the whole subtree regardless of
    /// the children's own flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node and its subtree are neither drawn nor receive events.
        const HIDDEN = 1 << 0;
        /// Contents of children are clipped to the node rectangle.
        const CLIP = 1 << 1;
        /// The node and its subtree don't receive events.
        const NO_EVENTS = 1 << 2;
        /// The node and its subtree are drawn as disabled and don't receive
        /// events.
        const DISABLED = Self::NO_EVENTS.bits() | 1 << 3;
        /// The node can be focused by a press or an explicit focus event.
        const FOCUSABLE = 1 << 4;
    }
}

/// Struct-of-arrays storage for all nodes.
#[derive(Debug)]
pub(crate) struct NodeStore {
    // -- Allocation --
    pub(crate) slots: Slots,

    // -- Hierarchy --
    pub(crate) parent: Vec<NodeHandle>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) prev_sibling: Vec<u32>,

    // -- Own properties --
    pub(crate) offset: Vec<Vec2>,
    pub(crate) size: Vec<Vec2>,
    pub(crate) opacity: Vec<f32>,
    pub(crate) flags: Vec<NodeFlags>,

    // -- Top-level order --
    pub(crate) top_level: Vec<bool>,
    pub(crate) ordered: Vec<bool>,
    pub(crate) order_prev: Vec<u32>,
    pub(crate) order_next: Vec<u32>,
    pub(crate) order_last_nested: Vec<u32>,
    pub(crate) order_first: u32,
    pub(crate) order_last: u32,
    pub(crate) top_level_count: u32,

    // -- Lifecycle tracking --
    pub(crate) pending_removed: Vec<u32>,
}
