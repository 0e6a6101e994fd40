// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The user interface.
//!
//! [`UserInterface`] owns the node hierarchy and the layer, layouter and
//! animator registries, and drives them through a fixed pipeline:
//!
//! 1. **Clean**: frees removed node subtrees and everything attached to them.
//! 2. **Update**: recomputes visible order, layouts, absolute offsets, clip
//!    rectangles, inherited flags and per-layer draw lists, as far as the
//!    accumulated [`UserInterfaceStates`] require.
//! 3. **Advance animations**: runs animators in kind order.
//! 4. **Draw**: hands per top-level draw ranges to layers, driving the
//!    renderer through its target states.
//!
//! Input events call [`update`](UserInterface::update) first, so they always
//! see the same node rectangles the last draw would.

mod animation;
mod clean;
mod draw;
mod events;
mod layout;
mod nodes;
mod registries;
mod update;

#[cfg(test)]
mod testing;

use alloc::boxed::Box;
use core::any::Any;
use core::fmt;

use kurbo::{Point, Size};

use crate::animator::{AnimatorInstance, AnimatorStates};
use crate::handle::NodeHandle;
use crate::layer::{Layer, LayerStates};
use crate::layouter::{Layouter, LayouterStates};
use crate::node::NodeStore;
use crate::registry::Registry;
use crate::renderer::{Renderer, RendererDrawStates, RendererTargetState};
use crate::state::UserInterfaceStates;
use crate::time::Nanoseconds;
use crate::trace::{PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink, Tracer};
#[cfg(feature = "trace-rich")]
use crate::trace::{InteractionChange, InteractionSlot};

use self::layout::LayoutPlan;
use self::update::Frame;

/// A retained-mode user interface.
pub struct UserInterface {
    size: Size,
    window_size: Size,
    framebuffer_size: (u32, u32),
    state: UserInterfaceStates,

    nodes: NodeStore,
    layers: Registry<Box<dyn Layer>>,
    layouters: Registry<Box<dyn Layouter>>,
    animators: Registry<AnimatorInstance>,

    renderer: Option<Box<dyn Renderer>>,
    renderer_state: (RendererTargetState, RendererDrawStates),

    frame: Frame,
    layout: LayoutPlan,

    pressed: NodeHandle,
    captured: NodeHandle,
    hovered: NodeHandle,
    focused: NodeHandle,
    global_pointer: Option<Point>,

    animation_time: Nanoseconds,

    trace_sink: Option<Box<dyn TraceSink>>,
    trace_serial: u64,
}

impl fmt::Debug for UserInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserInterface")
            .field("size", &self.size)
            .field("window_size", &self.window_size)
            .field("framebuffer_size", &self.framebuffer_size)
            .field("state", &self.state)
            .field("nodes", &self.nodes.slots.used_count())
            .field("layers", &self.layers.used_count())
            .field("layouters", &self.layouters.used_count())
            .field("animators", &self.animators.used_count())
            .field("has_renderer", &self.renderer.is_some())
            .field("pressed", &self.pressed)
            .field("captured", &self.captured)
            .field("hovered", &self.hovered)
            .field("focused", &self.focused)
            .field("animation_time", &self.animation_time)
            .finish_non_exhaustive()
    }
}

fn assert_sizes(what: &str, size: Size, window_size: Size, framebuffer_size: (u32, u32)) {
    assert!(
        size.width > 0.0
            && size.height > 0.0
            && window_size.width > 0.0
            && window_size.height > 0.0
            && framebuffer_size.0 > 0
            && framebuffer_size.1 > 0,
        "UserInterface::{what}(): expected non-zero sizes, got {size:?}, {window_size:?} and {framebuffer_size:?}"
    );
}

impl UserInterface {
    /// Creates an empty user interface.
    ///
    /// `size` is the coordinate space nodes are positioned in,
    /// `window_size` the space pointer positions arrive in and
    /// `framebuffer_size` the pixel size renderers and layers draw into.
    ///
    /// # Panics
    ///
    /// Panics if any of the sizes is zero.
    #[must_use]
    pub fn new(size: Size, window_size: Size, framebuffer_size: (u32, u32)) -> Self {
        assert_sizes("new", size, window_size, framebuffer_size);
        Self {
            size,
            window_size,
            framebuffer_size,
            state: UserInterfaceStates::empty(),
            nodes: NodeStore::new(),
            layers: Registry::new(),
            layouters: Registry::new(),
            animators: Registry::new(),
            renderer: None,
            renderer_state: (RendererTargetState::Final, RendererDrawStates::empty()),
            frame: Frame::default(),
            layout: LayoutPlan::default(),
            pressed: NodeHandle::NULL,
            captured: NodeHandle::NULL,
            hovered: NodeHandle::NULL,
            focused: NodeHandle::NULL,
            global_pointer: None,
            animation_time: Nanoseconds::ZERO,
            trace_sink: None,
            trace_serial: 0,
        }
    }

    /// User interface size.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Window size pointer events are expressed in.
    #[must_use]
    pub fn window_size(&self) -> Size {
        self.window_size
    }

    /// Framebuffer size in pixels.
    #[must_use]
    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.framebuffer_size
    }

    /// Changes all three sizes.
    ///
    /// Layers and layouters are notified if the user interface or the
    /// framebuffer size changed, the renderer if the framebuffer size did.
    /// A changed user interface size schedules a layout update.
    ///
    /// # Panics
    ///
    /// Panics if any of the sizes is zero.
    pub fn set_size(&mut self, size: Size, window_size: Size, framebuffer_size: (u32, u32)) {
        assert_sizes("set_size", size, window_size, framebuffer_size);
        let size_changed = size != self.size;
        let framebuffer_changed = framebuffer_size != self.framebuffer_size;
        self.size = size;
        self.window_size = window_size;
        self.framebuffer_size = framebuffer_size;

        if size_changed || framebuffer_changed {
            for id in self.layers.ordered_ids() {
                if let Some(layer) = self.layers.instance_mut(id) {
                    layer.set_size(size, framebuffer_size);
                }
            }
        }
        if size_changed {
            for id in self.layouters.ordered_ids() {
                if let Some(layouter) = self.layouters.instance_mut(id) {
                    layouter.set_size(size);
                }
            }
            self.state |= UserInterfaceStates::NEEDS_LAYOUT_UPDATE;
        }
        if framebuffer_changed {
            if let Some(renderer) = &mut self.renderer {
                renderer.setup_framebuffers(framebuffer_size);
            }
        }
        tracing::debug!(?size, ?window_size, ?framebuffer_size, "user interface resized");
    }

    // -- Renderer --

    /// Sets the renderer used by [`draw`](Self::draw).
    ///
    /// # Panics
    ///
    /// Panics if a renderer is already set.
    pub fn set_renderer_instance<R: Renderer>(&mut self, renderer: R) {
        assert!(
            self.renderer.is_none(),
            "UserInterface::set_renderer_instance(): instance already set"
        );
        let mut renderer: Box<dyn Renderer> = Box::new(renderer);
        renderer.setup_framebuffers(self.framebuffer_size);
        self.renderer = Some(renderer);
    }

    /// Whether a renderer is set.
    #[must_use]
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// The renderer.
    ///
    /// # Panics
    ///
    /// Panics if no renderer is set.
    #[must_use]
    pub fn renderer(&self) -> &dyn Renderer {
        match &self.renderer {
            Some(renderer) => &**renderer,
            None => panic!("UserInterface::renderer(): no renderer instance set"),
        }
    }

    /// The renderer.
    ///
    /// # Panics
    ///
    /// Panics if no renderer is set.
    pub fn renderer_mut(&mut self) -> &mut dyn Renderer {
        match &mut self.renderer {
            Some(renderer) => &mut **renderer,
            None => panic!("UserInterface::renderer_mut(): no renderer instance set"),
        }
    }

    /// The renderer as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if no renderer is set or it isn't an `R`.
    #[must_use]
    pub fn renderer_as<R: Renderer>(&self) -> &R {
        let any: &dyn Any = self.renderer();
        match any.downcast_ref() {
            Some(renderer) => renderer,
            None => panic!(
                "UserInterface::renderer_as(): renderer isn't a {}",
                core::any::type_name::<R>()
            ),
        }
    }

    // -- State --

    /// Pending work, combining what the user interface tracks itself with
    /// the states of all layers, layouters and animators.
    #[must_use]
    pub fn state(&self) -> UserInterfaceStates {
        let mut state = self.state;
        if self.nodes.needs_clean() {
            state |= UserInterfaceStates::NEEDS_NODE_CLEAN;
        }
        for id in self.layers.ordered_ids() {
            let Some(layer) = self.layers.instance(id) else {
                continue;
            };
            let layer_state = layer.core().state();
            if layer_state.contains(LayerStates::NEEDS_DATA_CLEAN) {
                state |= UserInterfaceStates::NEEDS_DATA_CLEAN;
            }
            if layer_state.contains(LayerStates::NEEDS_ATTACHMENT_UPDATE) {
                state |= UserInterfaceStates::NEEDS_DATA_ATTACHMENT_UPDATE;
            }
            if layer_state.intersects(LayerStates::SETTABLE) {
                state |= UserInterfaceStates::NEEDS_DATA_UPDATE;
            }
        }
        for id in self.layouters.ordered_ids() {
            let Some(layouter) = self.layouters.instance(id) else {
                continue;
            };
            let layouter_state = layouter.core().state();
            if layouter_state.contains(LayouterStates::NEEDS_ASSIGNMENT_UPDATE) {
                state |= UserInterfaceStates::NEEDS_LAYOUT_ASSIGNMENT_UPDATE;
            } else if layouter_state.contains(LayouterStates::NEEDS_UPDATE) {
                state |= UserInterfaceStates::NEEDS_LAYOUT_UPDATE;
            }
        }
        for id in self.animators.ordered_ids() {
            let Some(animator) = self.animators.instance(id) else {
                continue;
            };
            if animator
                .animator()
                .core()
                .state()
                .contains(AnimatorStates::NEEDS_ADVANCE)
            {
                state |= UserInterfaceStates::NEEDS_ANIMATION_ADVANCE;
            }
        }
        state
    }

    /// Time of the last [`advance_animations`](Self::advance_animations).
    #[must_use]
    pub fn animation_time(&self) -> Nanoseconds {
        self.animation_time
    }

    // -- Interaction state --

    /// Node the primary pointer was pressed on, or Null.
    ///
    /// The handle may be stale until the next [`update`](Self::update).
    #[must_use]
    pub fn current_pressed_node(&self) -> NodeHandle {
        self.pressed
    }

    /// Node capturing pointer events, or Null.
    ///
    /// The handle may be stale until the next [`update`](Self::update).
    #[must_use]
    pub fn current_captured_node(&self) -> NodeHandle {
        self.captured
    }

    /// Node hovered by the primary pointer, or Null.
    ///
    /// The handle may be stale until the next [`update`](Self::update).
    #[must_use]
    pub fn current_hovered_node(&self) -> NodeHandle {
        self.hovered
    }

    /// Focused node, or Null.
    ///
    /// The handle may be stale until the next [`update`](Self::update).
    #[must_use]
    pub fn current_focused_node(&self) -> NodeHandle {
        self.focused
    }

    /// Last known position of the primary pointer in user interface
    /// coordinates.
    #[must_use]
    pub fn current_global_pointer_position(&self) -> Option<Point> {
        self.global_pointer
    }

    // -- Tracing --

    /// Installs a sink receiving pipeline trace events. Only has an effect
    /// with the `trace` feature enabled.
    pub fn set_trace_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.trace_sink = Some(sink);
    }

    /// Removes and returns the trace sink.
    pub fn take_trace_sink(&mut self) -> Option<Box<dyn TraceSink>> {
        self.trace_sink.take()
    }

    fn tracer(&mut self) -> Tracer<'_> {
        let sink: Option<&mut dyn TraceSink> = match &mut self.trace_sink {
            Some(sink) => Some(&mut **sink),
            None => None,
        };
        Tracer::new(sink)
    }

    fn begin_phase(&mut self, phase: PhaseKind) -> u64 {
        self.trace_serial += 1;
        let serial = self.trace_serial;
        self.tracer()
            .phase_begin(&PhaseBeginEvent { serial, phase });
        serial
    }

    fn end_phase(&mut self, serial: u64, phase: PhaseKind) {
        self.tracer().phase_end(&PhaseEndEvent { serial, phase });
    }

    // -- Interaction updates --

    fn set_pressed(&mut self, node: NodeHandle) {
        if self.pressed != node {
            self.pressed = node;
            #[cfg(feature = "trace-rich")]
            self.trace_interaction(InteractionSlot::Pressed, node);
        }
    }

    fn set_captured(&mut self, node: NodeHandle) {
        if self.captured != node {
            self.captured = node;
            #[cfg(feature = "trace-rich")]
            self.trace_interaction(InteractionSlot::Captured, node);
        }
    }

    fn set_hovered(&mut self, node: NodeHandle) {
        if self.hovered != node {
            self.hovered = node;
            #[cfg(feature = "trace-rich")]
            self.trace_interaction(InteractionSlot::Hovered, node);
        }
    }

    fn set_focused(&mut self, node: NodeHandle) {
        if self.focused != node {
            self.focused = node;
            #[cfg(feature = "trace-rich")]
            self.trace_interaction(InteractionSlot::Focused, node);
        }
    }

    #[cfg(feature = "trace-rich")]
    fn trace_interaction(&mut self, slot: InteractionSlot, node: NodeHandle) {
        let change = InteractionChange {
            serial: self.trace_serial,
            slot,
            node: node.bits(),
        };
        self.tracer().interaction_change(&change);
    }
}
