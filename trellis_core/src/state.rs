// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User interface dirty state.
//!
//! [`UserInterfaceStates`] accumulates what has to be recomputed before the
//! interface can be drawn or receive events. Each flag includes every flag it
//! implies, so that setting a broad flag automatically schedules all the
//! narrower passes it depends on:
//!
//! ```text
//! NEEDS_NODE_CLEAN ─┬─► NEEDS_DATA_CLEAN
//!                   └─► NEEDS_NODE_UPDATE ─┬─► NEEDS_NODE_OPACITY_UPDATE ──────────────┐
//!                                          └─► NEEDS_LAYOUT_ASSIGNMENT_UPDATE          │
//!                                                └─► NEEDS_LAYOUT_UPDATE               │
//!                                                      └─► NEEDS_NODE_CLIP_UPDATE      │
//!                                                            └─► NEEDS_NODE_ENABLED_UPDATE
//!                                                                  └─► NEEDS_DATA_ATTACHMENT_UPDATE
//!                                                                        └─► NEEDS_DATA_UPDATE ◄┘
//! NEEDS_ANIMATION_ADVANCE (independent)
//! ```
//!
//! Flags are only ever cleared in bulk by
//! [`UserInterface::clean`](crate::UserInterface::clean),
//! [`update`](crate::UserInterface::update) and
//! [`advance_animations`](crate::UserInterface::advance_animations).

use bitflags::bitflags;

bitflags! {
    /// Pending work of a [`UserInterface`](crate::UserInterface).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct UserInterfaceStates: u16 {
        /// A layer has data that needs to be uploaded or recomputed.
        const NEEDS_DATA_UPDATE = 1 << 0;
        /// Data were attached to or detached from nodes.
        const NEEDS_DATA_ATTACHMENT_UPDATE = Self::NEEDS_DATA_UPDATE.bits() | 1 << 1;
        /// Node event or focus eligibility changed.
        const NEEDS_NODE_ENABLED_UPDATE = Self::NEEDS_DATA_ATTACHMENT_UPDATE.bits() | 1 << 2;
        /// Clip rectangles and culling need to be recomputed.
        const NEEDS_NODE_CLIP_UPDATE = Self::NEEDS_NODE_ENABLED_UPDATE.bits() | 1 << 3;
        /// Node offsets or sizes changed and layouts need to run.
        const NEEDS_LAYOUT_UPDATE = Self::NEEDS_NODE_CLIP_UPDATE.bits() | 1 << 4;
        /// Layouts were added or removed.
        const NEEDS_LAYOUT_ASSIGNMENT_UPDATE = Self::NEEDS_LAYOUT_UPDATE.bits() | 1 << 5;
        /// Node opacities changed.
        const NEEDS_NODE_OPACITY_UPDATE = Self::NEEDS_DATA_UPDATE.bits() | 1 << 6;
        /// Node hierarchy, visibility or top-level order changed.
        const NEEDS_NODE_UPDATE = Self::NEEDS_LAYOUT_ASSIGNMENT_UPDATE.bits()
            | Self::NEEDS_NODE_OPACITY_UPDATE.bits()
            | 1 << 7;
        /// A layer has removed data that animators may still reference.
        const NEEDS_DATA_CLEAN = 1 << 8;
        /// Nodes were removed and their subtrees and attachments have to be
        /// cleaned up.
        const NEEDS_NODE_CLEAN = Self::NEEDS_NODE_UPDATE.bits()
            | Self::NEEDS_DATA_CLEAN.bits()
            | 1 << 9;
        /// An animator has animations that need to be advanced.
        const NEEDS_ANIMATION_ADVANCE = 1 << 10;
    }
}
