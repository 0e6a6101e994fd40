// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Renderer interface.
//!
//! The user interface doesn't draw anything itself. It tells a [`Renderer`]
//! which state the next layer hooks expect, and the renderer sets up blending,
//! scissoring and compositing framebuffers accordingly.

use core::any::Any;

use bitflags::bitflags;

/// Target a renderer draws into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RendererTargetState {
    /// Before the first layer of a frame.
    Initial,
    /// A layer is compositing previously drawn content.
    Composite,
    /// A layer is drawing.
    Draw,
    /// After the last layer of a frame.
    Final,
}

bitflags! {
    /// Draw state requested by the layer about to draw.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct RendererDrawStates: u8 {
        /// Blending is enabled.
        const BLENDING = 1 << 0;
        /// Scissor test is enabled.
        const SCISSOR = 1 << 1;
    }
}

/// Renderer driven by [`UserInterface::draw`](crate::UserInterface::draw).
///
/// Transitions are only issued when the target or the draw states actually
/// change. A frame always starts with [`RendererTargetState::Initial`] and
/// ends with [`RendererTargetState::Final`].
pub trait Renderer: Any {
    /// Called when the framebuffer size changes, and once when the renderer
    /// is set.
    fn setup_framebuffers(&mut self, size: (u32, u32));

    /// Switches to a new target and draw state.
    fn transition(&mut self, target: RendererTargetState, states: RendererDrawStates);
}
