// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layers: owners of drawable and interactive data attached to nodes.
//!
//! A concrete layer embeds a [`LayerCore`] that allocates data handles and
//! tracks which node each data is attached to. The concrete layer keeps the
//! actual payload (quads, text, hit areas) in its own storage indexed by the
//! data id. The [`UserInterface`](crate::UserInterface) calls the [`Layer`]
//! hooks during cleanup, update, draw and event dispatch.

use alloc::vec::Vec;
use core::any::Any;

use bitflags::bitflags;
use kurbo::{Rect, Size, Vec2};

use crate::event::{
    FocusEvent, KeyEvent, PointerEvent, PointerMoveEvent, TextInputEvent, VisibilityLostEvent,
};
use crate::handle::{
    DATA_GENERATION_BITS, DATA_ID_BITS, DataHandle, LayerDataHandle, LayerHandle, NodeHandle,
};
use crate::renderer::Renderer;
use crate::slots::Slots;

bitflags! {
    /// What a layer does.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayerFeatures: u8 {
        /// The layer draws its data.
        const DRAW = 1 << 0;
        /// Drawing needs blending enabled.
        const DRAW_USES_BLENDING = Self::DRAW.bits() | 1 << 1;
        /// Drawing needs the scissor test enabled.
        const DRAW_USES_SCISSOR = Self::DRAW.bits() | 1 << 2;
        /// The layer composites previously drawn content before drawing.
        const COMPOSITE = Self::DRAW.bits() | 1 << 3;
        /// The layer's data receive events.
        const EVENT = 1 << 4;
        /// Data animators can animate the layer's data.
        const ANIMATE_DATA = 1 << 5;
        /// Style animators can animate the layer's styles.
        const ANIMATE_STYLES = 1 << 6;
    }
}

bitflags! {
    /// Pending work of a layer.
    ///
    /// The `NEEDS_NODE_*` flags are only ever passed to
    /// [`Layer::update`] by the user interface. The data flags are set by
    /// the layer itself through [`LayerCore::set_needs_update`] or implicitly
    /// by creating, removing and attaching data.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LayerStates: u16 {
        /// Node offsets, sizes or clip rectangles changed.
        const NEEDS_NODE_OFFSET_SIZE_UPDATE = 1 << 0;
        /// Node draw order or culling changed.
        const NEEDS_NODE_ORDER_UPDATE = 1 << 1;
        /// Effective enabled state of nodes changed.
        const NEEDS_NODE_ENABLED_UPDATE = 1 << 2;
        /// Effective opacity of nodes changed.
        const NEEDS_NODE_OPACITY_UPDATE = 1 << 3;
        /// Per-data state changed.
        const NEEDS_DATA_UPDATE = 1 << 4;
        /// State common to all data changed.
        const NEEDS_COMMON_DATA_UPDATE = 1 << 5;
        /// State shared with other layers changed.
        const NEEDS_SHARED_DATA_UPDATE = 1 << 6;
        /// Data were attached to different nodes.
        const NEEDS_ATTACHMENT_UPDATE = Self::NEEDS_NODE_ORDER_UPDATE.bits() | 1 << 7;
        /// Data were removed and animators attached to them need cleanup.
        const NEEDS_DATA_CLEAN = 1 << 8;
    }
}

impl LayerStates {
    /// Flags a layer may set on itself through
    /// [`LayerCore::set_needs_update`].
    pub const SETTABLE: Self = Self::NEEDS_DATA_UPDATE
        .union(Self::NEEDS_COMMON_DATA_UPDATE)
        .union(Self::NEEDS_SHARED_DATA_UPDATE);

    /// Flags consumed by [`Layer::update`].
    pub const UPDATE: Self = Self::SETTABLE
        .union(Self::NEEDS_ATTACHMENT_UPDATE)
        .union(Self::NEEDS_NODE_OFFSET_SIZE_UPDATE)
        .union(Self::NEEDS_NODE_ENABLED_UPDATE)
        .union(Self::NEEDS_NODE_OPACITY_UPDATE);
}

/// Data handle allocation and node attachments of a layer.
#[derive(Debug)]
pub struct LayerCore {
    handle: LayerHandle,
    features: LayerFeatures,
    state: LayerStates,
    slots: Slots,
    nodes: Vec<NodeHandle>,
}

impl LayerCore {
    /// Creates the core of a layer with a handle returned from
    /// [`UserInterface::create_layer`](crate::UserInterface::create_layer).
    ///
    /// # Panics
    ///
    /// Panics if `handle` is Null.
    #[must_use]
    pub fn new(handle: LayerHandle, features: LayerFeatures) -> Self {
        assert!(!handle.is_null(), "LayerCore::new(): handle is null");
        Self {
            handle,
            features,
            state: LayerStates::empty(),
            slots: Slots::new(DATA_ID_BITS, DATA_GENERATION_BITS),
            nodes: Vec::new(),
        }
    }

    /// Handle of the layer.
    #[must_use]
    pub fn handle(&self) -> LayerHandle {
        self.handle
    }

    /// What the layer does.
    #[must_use]
    pub fn features(&self) -> LayerFeatures {
        self.features
    }

    /// Pending work.
    #[must_use]
    pub fn state(&self) -> LayerStates {
        self.state
    }

    /// Marks data of the layer as needing an update.
    ///
    /// # Panics
    ///
    /// Panics if `states` contains anything outside of
    /// [`LayerStates::SETTABLE`].
    pub fn set_needs_update(&mut self, states: LayerStates) {
        assert!(
            LayerStates::SETTABLE.contains(states),
            "LayerCore::set_needs_update(): expected a subset of {:?} but got {states:?}",
            LayerStates::SETTABLE
        );
        self.state |= states;
    }

    pub(crate) fn clear_state(&mut self, states: LayerStates) {
        self.state.remove(states);
    }

    /// Number of data slots allocated so far.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Number of live data.
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.slots.used_count()
    }

    /// Whether `handle` refers to live data of this layer.
    #[must_use]
    pub fn is_handle_valid(&self, handle: DataHandle) -> bool {
        handle.layer() == self.handle && self.is_local_handle_valid(handle.data())
    }

    /// Whether `handle` refers to live data of this layer.
    #[must_use]
    pub fn is_local_handle_valid(&self, handle: LayerDataHandle) -> bool {
        self.slots.is_valid(handle.id(), handle.generation())
    }

    /// Per-slot data generations.
    #[must_use]
    pub fn generations(&self) -> &[u16] {
        self.slots.generations()
    }

    /// Allocates data attached to `node`, which can be Null.
    ///
    /// The node isn't validated here; data attached to a node that doesn't
    /// exist are removed on the next clean.
    pub fn create(&mut self, node: NodeHandle) -> DataHandle {
        let (id, generation) = self.slots.create("LayerCore::create()");
        let idx = id as usize;
        if idx == self.nodes.len() {
            self.nodes.push(node);
        } else {
            self.nodes[idx] = node;
        }
        self.state |= LayerStates::NEEDS_DATA_UPDATE;
        if !node.is_null() {
            self.state |= LayerStates::NEEDS_ATTACHMENT_UPDATE;
        }
        DataHandle::new(self.handle, LayerDataHandle::new(id, generation))
    }

    /// Removes data.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove(&mut self, handle: DataHandle) {
        assert!(
            self.is_handle_valid(handle),
            "LayerCore::remove(): invalid handle {handle:?}"
        );
        self.remove_local(handle.data());
    }

    /// Removes data by its local handle.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove_local(&mut self, handle: LayerDataHandle) {
        assert!(
            self.is_local_handle_valid(handle),
            "LayerCore::remove(): invalid handle {handle:?}"
        );
        let idx = handle.id() as usize;
        if !self.nodes[idx].is_null() {
            self.state |= LayerStates::NEEDS_ATTACHMENT_UPDATE;
        }
        self.nodes[idx] = NodeHandle::NULL;
        self.slots.remove(handle.id());
        self.state |= LayerStates::NEEDS_DATA_CLEAN;
    }

    /// Attaches data to `node`, or detaches it if `node` is Null.
    ///
    /// # Panics
    ///
    /// Panics if `data` isn't valid.
    pub fn attach(&mut self, data: LayerDataHandle, node: NodeHandle) {
        assert!(
            self.is_local_handle_valid(data),
            "LayerCore::attach(): invalid handle {data:?}"
        );
        self.nodes[data.id() as usize] = node;
        self.state |= LayerStates::NEEDS_ATTACHMENT_UPDATE;
    }

    /// Node the data is attached to.
    ///
    /// # Panics
    ///
    /// Panics if `data` isn't valid.
    #[must_use]
    pub fn node(&self, data: LayerDataHandle) -> NodeHandle {
        assert!(
            self.is_local_handle_valid(data),
            "LayerCore::node(): invalid handle {data:?}"
        );
        self.nodes[data.id() as usize]
    }

    /// Node attachments of all data slots, indexed by data id. Free slots
    /// hold Null.
    #[must_use]
    pub fn nodes(&self) -> &[NodeHandle] {
        &self.nodes
    }

    /// Removes data attached to nodes that no longer exist and returns their
    /// ids.
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
                    reason = "data slot count is bounded by 1 << DATA_ID_BITS"
                )]
                removed.push(idx as u32);
            }
        }
        for &id in &removed {
            self.slots.remove(id);
        }
        if !removed.is_empty() {
            self.state |= LayerStates::NEEDS_DATA_CLEAN;
        }
        removed
    }
}

/// Node geometry and state shared by [`Layer::update`], [`Layer::draw`] and
/// [`Layer::composite`]. All slices are indexed by node id.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a> {
    /// Absolute node offsets after layout.
    pub offsets: &'a [Vec2],
    /// Node sizes after layout.
    pub sizes: &'a [Vec2],
    /// Effective node opacities.
    pub opacities: &'a [f32],
    /// Whether nodes are effectively enabled.
    pub enabled: &'a [bool],
    /// Clip rectangle each node is clipped to.
    pub clip_rects: &'a [Rect],
}

/// Arguments of [`Layer::update`].
#[derive(Clone, Copy, Debug)]
pub struct LayerUpdate<'a> {
    /// Ids of data on visible, non-culled nodes, in draw order.
    pub data_ids: &'a [u32],
    /// Node geometry.
    pub nodes: NodeView<'a>,
}

/// Arguments of [`Layer::draw`] and [`Layer::composite`].
///
/// The user interface draws one top-level subtree at a time. `data_ids` is
/// the same list as passed to the last [`Layer::update`], `range` selects the
/// part belonging to the current subtree.
#[derive(Clone, Debug)]
pub struct LayerDraw<'a> {
    /// Ids of all data on visible, non-culled nodes, in draw order.
    pub data_ids: &'a [u32],
    /// Part of `data_ids` to draw.
    pub range: core::ops::Range<usize>,
    /// Node geometry.
    pub nodes: NodeView<'a>,
}

/// A layer.
///
/// Only [`core`](Self::core) and [`core_mut`](Self::core_mut) are required,
/// every hook has an empty default.
pub trait Layer: Any {
    /// The embedded core.
    fn core(&self) -> &LayerCore;

    /// The embedded core.
    fn core_mut(&mut self) -> &mut LayerCore;

    /// The user interface size or the framebuffer size changed.
    fn set_size(&mut self, size: Size, framebuffer_size: (u32, u32)) {
        _ = (size, framebuffer_size);
    }

    /// Data with the given ids were removed because their nodes were.
    fn clean(&mut self, removed: &[u32]) {
        _ = removed;
    }

    /// Recomputes whatever `states` says is out of date.
    fn update(&mut self, states: LayerStates, update: &LayerUpdate<'_>) {
        _ = (states, update);
    }

    /// Composites previously drawn content. Only called for layers with
    /// [`LayerFeatures::COMPOSITE`].
    fn composite(&mut self, renderer: &mut dyn Renderer, draw: &LayerDraw<'_>) {
        _ = (renderer, draw);
    }

    /// Draws a range of data. Only called for layers with
    /// [`LayerFeatures::DRAW`].
    fn draw(&mut self, renderer: &mut dyn Renderer, draw: &LayerDraw<'_>) {
        _ = (renderer, draw);
    }

    /// A pointer was pressed on the data's node.
    fn pointer_press_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        _ = (data_id, event);
    }

    /// A pointer was released on the data's node.
    fn pointer_release_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        _ = (data_id, event);
    }

    /// The primary pointer was pressed and released on the data's node.
    fn pointer_tap_or_click_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        _ = (data_id, event);
    }

    /// A pointer moved over the data's node, or anywhere if the node
    /// captures the pointer.
    fn pointer_move_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        _ = (data_id, event);
    }

    /// The primary pointer entered the data's node.
    fn pointer_enter_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        _ = (data_id, event);
    }

    /// The primary pointer left the data's node.
    fn pointer_leave_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        _ = (data_id, event);
    }

    /// The data's node is about to get focused.
    fn focus_event(&mut self, data_id: u32, event: &mut FocusEvent) {
        _ = (data_id, event);
    }

    /// The data's node lost focus.
    fn blur_event(&mut self, data_id: u32, event: &mut FocusEvent) {
        _ = (data_id, event);
    }

    /// A key was pressed while the data's node was focused or hovered.
    fn key_press_event(&mut self, data_id: u32, event: &mut KeyEvent) {
        _ = (data_id, event);
    }

    /// A key was released while the data's node was focused or hovered.
    fn key_release_event(&mut self, data_id: u32, event: &mut KeyEvent) {
        _ = (data_id, event);
    }

    /// Text was entered while the data's node was focused.
    fn text_input_event(&mut self, data_id: u32, event: &mut TextInputEvent) {
        _ = (data_id, event);
    }

    /// The data's node was pressed, hovered or focused and no longer is
    /// because it got hidden or disabled.
    fn visibility_lost_event(&mut self, data_id: u32, event: &mut VisibilityLostEvent) {
        _ = (data_id, event);
    }
}
