// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame update.
//!
//! [`UserInterface::update`] walks the dirty lattice top-down and redoes only
//! the steps whose flag is set:
//!
//! | Flag | Step |
//! |------|------|
//! | `NEEDS_NODE_UPDATE` | visible node order |
//! | `NEEDS_LAYOUT_ASSIGNMENT_UPDATE` | layout ordering |
//! | `NEEDS_LAYOUT_UPDATE` | layouts, absolute offsets |
//! | `NEEDS_NODE_CLIP_UPDATE` | clip rectangles, culling |
//! | `NEEDS_NODE_ENABLED_UPDATE` | inherited enabled and event flags, interaction revalidation |
//! | `NEEDS_NODE_OPACITY_UPDATE` | inherited opacity |
//! | `NEEDS_DATA_ATTACHMENT_UPDATE` | per-node data and per-layer draw lists |
//! | `NEEDS_DATA_UPDATE` | layer update hooks |
//!
//! Because each flag implies the ones below it, a broad change recomputes
//! everything derived from it.

use alloc::vec::Vec;
use core::ops::Range;

use kurbo::{Rect, Vec2};

use crate::event::VisibilityLostEvent;
use crate::handle::{DataHandle, LayerDataHandle, NodeHandle};
use crate::layer::{LayerFeatures, LayerStates, LayerUpdate, NodeView};
use crate::node::{NodeFlags, VisibleNodes};
use crate::state::UserInterfaceStates;
use crate::trace::{PhaseKind, UpdateSummary};

use super::UserInterface;

/// Everything [`UserInterface::update`] derives from nodes and attachments.
///
/// Per-node vectors are indexed by node id and sized to the node capacity.
#[derive(Debug, Default)]
pub(crate) struct Frame {
    pub(crate) visible: VisibleNodes,
    /// Offsets relative to the parent after layouting.
    pub(crate) offsets: Vec<Vec2>,
    /// Sizes after layouting.
    pub(crate) sizes: Vec<Vec2>,
    pub(crate) absolute: Vec<Vec2>,
    pub(crate) clip_rects: Vec<Rect>,
    /// Whether a visible node overlaps its clip rectangle.
    pub(crate) drawn: Vec<bool>,
    pub(crate) enabled: Vec<bool>,
    pub(crate) events_enabled: Vec<bool>,
    pub(crate) opacities: Vec<f32>,
    /// Data attached to each visible node, in layer order. Includes nodes
    /// culled by their clip rectangle, which still get focus and key events.
    pub(crate) node_data: Vec<Vec<DataHandle>>,
    /// Data ids of drawn nodes per layer id, in draw order.
    pub(crate) layer_data: Vec<Vec<u32>>,
    /// Per layer id, the range of `layer_data` covered by each top-level
    /// subtree.
    pub(crate) layer_ranges: Vec<Vec<Range<usize>>>,
}

impl Frame {
    fn resize(&mut self, node_capacity: usize, layer_capacity: usize) {
        self.offsets.resize(node_capacity, Vec2::ZERO);
        self.sizes.resize(node_capacity, Vec2::ZERO);
        self.absolute.resize(node_capacity, Vec2::ZERO);
        self.clip_rects.resize(node_capacity, Rect::ZERO);
        self.drawn.resize(node_capacity, false);
        self.enabled.resize(node_capacity, false);
        self.events_enabled.resize(node_capacity, false);
        self.opacities.resize(node_capacity, 1.0);
        self.node_data.resize_with(node_capacity, Vec::new);
        self.layer_data.resize_with(layer_capacity, Vec::new);
        self.layer_ranges.resize_with(layer_capacity, Vec::new);
    }

    /// Node properties as layers see them.
    pub(crate) fn node_view(&self) -> NodeView<'_> {
        NodeView {
            offsets: &self.absolute,
            sizes: &self.sizes,
            opacities: &self.opacities,
            enabled: &self.enabled,
            clip_rects: &self.clip_rects,
        }
    }

    /// Rectangle of a node in user interface coordinates.
    pub(crate) fn rect(&self, id: u32) -> Rect {
        let idx = id as usize;
        Rect::from_origin_size(self.absolute[idx].to_point(), self.sizes[idx].to_size())
    }

    /// Part of a node that can receive events, its rectangle cut by its clip.
    pub(crate) fn event_rect(&self, id: u32) -> Rect {
        self.rect(id).intersect(self.clip_rects[id as usize])
    }
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

impl UserInterface {
    /// Brings everything derived from nodes, layouts and attachments up to
    /// date and lets layers update their data.
    ///
    /// Calls [`clean`](Self::clean) first. Does nothing if
    /// [`state`](Self::state) doesn't contain any of the
    /// [`NEEDS_NODE_UPDATE`](UserInterfaceStates::NEEDS_NODE_UPDATE) flags.
    /// Interaction references to nodes that are no longer visible, enabled
    /// or focusable are reset here.
    pub fn update(&mut self) {
        self.clean();
        let states = self.state();
        if !states.intersects(UserInterfaceStates::NEEDS_NODE_UPDATE) {
            return;
        }
        let serial = self.begin_phase(PhaseKind::Update);
        let node_capacity = self.nodes.parent.len();
        let layer_capacity = self.layers.capacity() as usize;
        self.frame.resize(node_capacity, layer_capacity);

        if states.contains(UserInterfaceStates::NEEDS_NODE_UPDATE) {
            self.nodes.collect_visible(&mut self.frame.visible);
        }
        let mut layout_passes = 0;
        if states.contains(UserInterfaceStates::NEEDS_LAYOUT_ASSIGNMENT_UPDATE) {
            self.order_layouts();
        }
        if states.contains(UserInterfaceStates::NEEDS_LAYOUT_UPDATE) {
            self.run_layouts();
            layout_passes = self.layout.passes.len();
            self.compute_absolute_offsets();
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_CLIP_UPDATE) {
            self.compute_clip_rects();
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_ENABLED_UPDATE) {
            self.compute_enabled();
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_OPACITY_UPDATE) {
            self.compute_opacities();
        }
        if states.contains(UserInterfaceStates::NEEDS_DATA_ATTACHMENT_UPDATE) {
            self.collect_draw_lists();
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_ENABLED_UPDATE) {
            self.revalidate_interaction();
        }
        let layers_updated = self.update_layers(states);

        self.state.remove(UserInterfaceStates::NEEDS_NODE_UPDATE);

        let visible = &self.frame.visible;
        let drawn = visible
            .nodes
            .iter()
            .filter(|&&id| self.frame.drawn[id as usize])
            .count();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "counts are bounded by node and layer capacities"
        )]
        let summary = UpdateSummary {
            serial,
            states: states.bits(),
            visible_nodes: visible.nodes.len() as u32,
            drawn_nodes: drawn as u32,
            top_level_count: visible.top_level.len() as u32,
            layers_updated,
            layout_passes: layout_passes as u32,
        };
        tracing::debug!(
            states = ?states,
            visible = summary.visible_nodes,
            drawn = summary.drawn_nodes,
            "updated user interface"
        );
        self.tracer().update_summary(&summary);
        self.end_phase(serial, PhaseKind::Update);
    }

    fn compute_absolute_offsets(&mut self) {
        let frame = &mut self.frame;
        for &id in &frame.visible.nodes {
            let parent = self.nodes.parent[id as usize];
            let base = if parent.is_null() {
                Vec2::ZERO
            } else {
                frame.absolute[parent.id() as usize]
            };
            frame.absolute[id as usize] = base + frame.offsets[id as usize];
        }
    }

    fn compute_clip_rects(&mut self) {
        let frame = &mut self.frame;
        let ui_rect = Rect::from_origin_size(kurbo::Point::ZERO, self.size);
        let mut stack: Vec<(usize, Rect)> = Vec::new();
        for t in 0..frame.visible.top_level.len() {
            stack.clear();
            for i in frame.visible.top_level_range(t) {
                while stack.last().is_some_and(|&(end, _)| end <= i) {
                    stack.pop();
                }
                let clip = stack.last().map_or(ui_rect, |&(_, rect)| rect);
                let id = frame.visible.nodes[i];
                let idx = id as usize;
                let rect = Rect::from_origin_size(
                    frame.absolute[idx].to_point(),
                    frame.sizes[idx].to_size(),
                );
                frame.clip_rects[idx] = clip;
                frame.drawn[idx] = overlaps(rect, clip);
                if self.nodes.flags[idx].contains(NodeFlags::CLIP) {
                    let end = i + frame.visible.subtree_len[i] as usize + 1;
                    stack.push((end, clip.intersect(rect)));
                }
            }
        }
    }

    fn compute_enabled(&mut self) {
        let frame = &mut self.frame;
        for &id in &frame.visible.nodes {
            let idx = id as usize;
            let flags = self.nodes.flags[idx];
            let parent = self.nodes.parent[idx];
            let (enabled, events) = if parent.is_null() {
                (true, true)
            } else {
                let p = parent.id() as usize;
                (frame.enabled[p], frame.events_enabled[p])
            };
            frame.enabled[idx] = enabled && !flags.contains(NodeFlags::DISABLED);
            frame.events_enabled[idx] = events && !flags.intersects(NodeFlags::NO_EVENTS);
        }
    }

    fn compute_opacities(&mut self) {
        let frame = &mut self.frame;
        for &id in &frame.visible.nodes {
            let idx = id as usize;
            let parent = self.nodes.parent[idx];
            let base = if parent.is_null() {
                1.0
            } else {
                frame.opacities[parent.id() as usize]
            };
            frame.opacities[idx] = base * self.nodes.opacity[idx];
        }
    }

    fn collect_draw_lists(&mut self) {
        let layer_ids = self.layers.ordered_ids();
        let frame = &mut self.frame;
        for list in &mut frame.node_data {
            list.clear();
        }
        for &layer_id in &layer_ids {
            let Some(layer) = self.layers.instance(layer_id) else {
                continue;
            };
            let core = layer.core();
            let generations = core.generations();
            for (data, node) in core.nodes().iter().enumerate() {
                if node.is_null() || !self.nodes.is_valid(*node) {
                    continue;
                }
                let idx = node.id() as usize;
                if !frame.visible.mask[idx] {
                    continue;
                }
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "data slot count is bounded by 1 << DATA_ID_BITS"
                )]
                let local = LayerDataHandle::new(data as u32, u32::from(generations[data]));
                frame.node_data[idx].push(DataHandle::new(core.handle(), local));
            }
        }

        for list in &mut frame.layer_data {
            list.clear();
        }
        for ranges in &mut frame.layer_ranges {
            ranges.clear();
        }
        let mut starts = Vec::with_capacity(layer_ids.len());
        for t in 0..frame.visible.top_level.len() {
            starts.clear();
            starts.extend(
                layer_ids
                    .iter()
                    .map(|&id| frame.layer_data[id as usize].len()),
            );
            for i in frame.visible.top_level_range(t) {
                let id = frame.visible.nodes[i];
                if !frame.drawn[id as usize] {
                    continue;
                }
                for data in &frame.node_data[id as usize] {
                    frame.layer_data[data.layer().id() as usize].push(data.id());
                }
            }
            for (&layer_id, &start) in layer_ids.iter().zip(&starts) {
                let end = frame.layer_data[layer_id as usize].len();
                frame.layer_ranges[layer_id as usize].push(start..end);
            }
        }
    }

    /// Whether a node is visible with events enabled, regardless of its clip
    /// rectangle.
    fn accepts_events(&self, id: u32) -> bool {
        let idx = id as usize;
        idx < self.frame.visible.mask.len()
            && self.frame.visible.mask[idx]
            && self.frame.events_enabled[idx]
    }

    /// Whether a node can currently receive pointer events.
    pub(super) fn is_node_interactive(&self, id: u32) -> bool {
        self.accepts_events(id) && self.frame.drawn[id as usize]
    }

    /// Whether a node can currently get focus. Clipped nodes can.
    pub(super) fn is_node_focusable(&self, id: u32) -> bool {
        self.accepts_events(id) && self.nodes.flags[id as usize].contains(NodeFlags::FOCUSABLE)
    }

    fn revalidate_interaction(&mut self) {
        let mut lost: Vec<NodeHandle> = Vec::new();
        let mut keep = |ui: &Self, node: NodeHandle, focus: bool| -> bool {
            if node.is_null() {
                return true;
            }
            let ok = ui.nodes.is_valid(node)
                && if focus {
                    ui.is_node_focusable(node.id())
                } else {
                    ui.is_node_interactive(node.id())
                };
            if !ok && ui.nodes.is_valid(node) && !lost.contains(&node) {
                lost.push(node);
            }
            ok
        };
        let pressed = keep(self, self.pressed, false);
        let captured = keep(self, self.captured, false);
        let hovered = keep(self, self.hovered, false);
        let focused = keep(self, self.focused, true);
        if !pressed {
            self.set_pressed(NodeHandle::NULL);
        }
        if !captured {
            self.set_captured(NodeHandle::NULL);
        }
        if !hovered {
            self.set_hovered(NodeHandle::NULL);
        }
        if !focused {
            self.set_focused(NodeHandle::NULL);
        }

        for node in lost {
            let mut event = VisibilityLostEvent {
                pressed: self.pressed == node,
                hovering: self.hovered == node,
            };
            for layer_id in self.layers.ordered_ids() {
                let Some(layer) = self.layers.instance_mut(layer_id) else {
                    continue;
                };
                if !layer.core().features().contains(LayerFeatures::EVENT) {
                    continue;
                }
                let ids: Vec<u32> = layer
                    .core()
                    .nodes()
                    .iter()
                    .enumerate()
                    .filter(|&(_, n)| *n == node)
                    .map(|(data, _)| {
                        #[expect(
                            clippy::cast_possible_truncation,
                            reason = "data slot count is bounded by 1 << DATA_ID_BITS"
                        )]
                        let data = data as u32;
                        data
                    })
                    .collect();
                for data in ids {
                    layer.visibility_lost_event(data, &mut event);
                }
            }
        }
    }

    /// Calls layer update hooks and returns how many layers were updated.
    fn update_layers(&mut self, states: UserInterfaceStates) -> u32 {
        let mut derived = LayerStates::empty();
        if states.contains(UserInterfaceStates::NEEDS_DATA_ATTACHMENT_UPDATE) {
            derived |= LayerStates::NEEDS_NODE_ORDER_UPDATE;
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_ENABLED_UPDATE) {
            derived |= LayerStates::NEEDS_NODE_ENABLED_UPDATE;
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_CLIP_UPDATE) {
            derived |=
                LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE | LayerStates::NEEDS_NODE_ORDER_UPDATE;
        }
        if states.contains(UserInterfaceStates::NEEDS_NODE_OPACITY_UPDATE) {
            derived |= LayerStates::NEEDS_NODE_OPACITY_UPDATE;
        }

        let mut updated = 0;
        for layer_id in self.layers.ordered_ids() {
            let Some(layer) = self.layers.instance_mut(layer_id) else {
                continue;
            };
            let layer_states = derived | (layer.core().state() & LayerStates::UPDATE);
            if layer_states.is_empty() {
                continue;
            }
            let update = LayerUpdate {
                data_ids: self
                    .frame
                    .layer_data
                    .get(layer_id as usize)
                    .map_or(&[], Vec::as_slice),
                nodes: self.frame.node_view(),
            };
            layer.update(layer_states, &update);
            layer.core_mut().clear_state(LayerStates::UPDATE);
            updated += 1;
        }
        updated
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Size;

    use super::super::testing::{Call, RecordingLayer, log, ui};
    use super::*;
    use crate::handle::LayerHandle;

    fn node(ui: &mut UserInterface, parent: NodeHandle, offset: (f64, f64), size: (f64, f64)) -> NodeHandle {
        ui.create_node(
            parent,
            Vec2::new(offset.0, offset.1),
            Vec2::new(size.0, size.1),
            NodeFlags::empty(),
        )
    }

    #[test]
    fn absolute_offsets_accumulate() {
        let mut ui = ui();
        let root = node(&mut ui, NodeHandle::NULL, (10.0, 10.0), (50.0, 50.0));
        let child = node(&mut ui, root, (5.0, 6.0), (10.0, 10.0));
        let grandchild = node(&mut ui, child, (1.0, 1.0), (2.0, 2.0));
        ui.update();
        assert_eq!(ui.frame.absolute[grandchild.id() as usize], Vec2::new(16.0, 17.0));
        assert_eq!(ui.frame.rect(child.id()), Rect::new(15.0, 16.0, 25.0, 26.0));
    }

    #[test]
    fn clipping_culls_nodes_outside() {
        let mut ui = ui();
        let root = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (50.0, 50.0));
        ui.add_node_flags(root, NodeFlags::CLIP);
        let inside = node(&mut ui, root, (10.0, 10.0), (10.0, 10.0));
        let partly = node(&mut ui, root, (45.0, 45.0), (10.0, 10.0));
        let outside = node(&mut ui, root, (60.0, 0.0), (10.0, 10.0));
        let touching = node(&mut ui, root, (50.0, 0.0), (10.0, 10.0));
        let offscreen = node(&mut ui, NodeHandle::NULL, (200.0, 0.0), (10.0, 10.0));
        ui.update();
        assert!(ui.frame.drawn[inside.id() as usize]);
        assert!(ui.frame.drawn[partly.id() as usize]);
        assert!(!ui.frame.drawn[outside.id() as usize]);
        assert!(!ui.frame.drawn[touching.id() as usize]);
        assert!(!ui.frame.drawn[offscreen.id() as usize]);
        assert_eq!(
            ui.frame.event_rect(partly.id()),
            Rect::new(45.0, 45.0, 50.0, 50.0)
        );
    }

    #[test]
    fn flags_and_opacity_are_inherited() {
        let mut ui = ui();
        let root = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (50.0, 50.0));
        let child = node(&mut ui, root, (0.0, 0.0), (10.0, 10.0));
        ui.set_node_opacity(root, 0.5);
        ui.set_node_opacity(child, 0.5);
        ui.add_node_flags(root, NodeFlags::DISABLED);
        ui.update();
        assert_eq!(ui.frame.opacities[child.id() as usize], 0.25);
        assert!(!ui.frame.enabled[child.id() as usize]);
        assert!(!ui.frame.events_enabled[child.id() as usize]);

        ui.set_node_flags(root, NodeFlags::NO_EVENTS);
        ui.update();
        assert!(ui.frame.enabled[child.id() as usize]);
        assert!(!ui.frame.events_enabled[child.id() as usize]);
    }

    #[test]
    fn draw_lists_follow_top_level_order() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(RecordingLayer::new(layer, LayerFeatures::DRAW));
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (10.0, 10.0));
        let a_child = node(&mut ui, a, (0.0, 0.0), (5.0, 5.0));
        let b = node(&mut ui, NodeHandle::NULL, (20.0, 0.0), (10.0, 10.0));
        let core = ui.layer_mut(layer).core_mut();
        let db = core.create(b);
        let dchild = core.create(a_child);
        let da = core.create(a);
        ui.update();

        let id = layer.id() as usize;
        assert_eq!(ui.frame.layer_data[id], vec![da.id(), dchild.id(), db.id()]);
        assert_eq!(ui.frame.layer_ranges[id], vec![0..2, 2..3]);

        ui.set_node_order(a, NodeHandle::NULL);
        ui.update();
        assert_eq!(ui.frame.layer_data[id], vec![db.id(), da.id(), dchild.id()]);
        assert_eq!(ui.frame.layer_ranges[id], vec![0..1, 1..3]);
    }

    #[test]
    fn culled_data_stays_out_of_draw_lists() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(RecordingLayer::new(layer, LayerFeatures::DRAW));
        let root = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (50.0, 50.0));
        ui.add_node_flags(root, NodeFlags::CLIP);
        let inside = node(&mut ui, root, (10.0, 10.0), (10.0, 10.0));
        let outside = node(&mut ui, root, (60.0, 0.0), (10.0, 10.0));
        let core = ui.layer_mut(layer).core_mut();
        let din = core.create(inside);
        let dout = core.create(outside);
        ui.update();

        assert_eq!(ui.frame.layer_data[layer.id() as usize], vec![din.id()]);
        assert_eq!(ui.frame.node_data[outside.id() as usize], vec![dout]);
    }

    #[test]
    fn update_is_idempotent() {
        let mut ui = ui();
        let calls = log();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(
            RecordingLayer::new(layer, LayerFeatures::DRAW).with_log(calls.clone()),
        );
        let root = node(&mut ui, NodeHandle::NULL, (10.0, 10.0), (50.0, 50.0));
        ui.add_node_flags(root, NodeFlags::CLIP);
        let child = node(&mut ui, root, (40.0, 5.0), (20.0, 20.0));
        let other = node(&mut ui, NodeHandle::NULL, (70.0, 70.0), (10.0, 10.0));
        ui.set_node_opacity(child, 0.5);
        let core = ui.layer_mut(layer).core_mut();
        core.create(child);
        core.create(other);
        core.create(root);

        ui.update();
        assert_eq!(ui.state(), UserInterfaceStates::empty());
        let layer_data = ui.frame.layer_data.clone();
        let layer_ranges = ui.frame.layer_ranges.clone();
        let absolute = ui.frame.absolute.clone();
        let clip_rects = ui.frame.clip_rects.clone();
        let opacities = ui.frame.opacities.clone();
        let updates = calls.borrow().len();

        ui.update();
        assert_eq!(ui.state(), UserInterfaceStates::empty());
        assert_eq!(ui.frame.layer_data, layer_data);
        assert_eq!(ui.frame.layer_ranges, layer_ranges);
        assert_eq!(ui.frame.absolute, absolute);
        assert_eq!(ui.frame.clip_rects, clip_rects);
        assert_eq!(ui.frame.opacities, opacities);
        assert_eq!(calls.borrow().len(), updates);
        assert_eq!(
            ui.frame.clip_rects[child.id() as usize],
            Rect::new(10.0, 10.0, 60.0, 60.0)
        );
    }

    #[test]
    fn layer_update_gets_derived_states() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        let calls = log();
        ui.set_layer_instance(
            RecordingLayer::new(layer, LayerFeatures::DRAW).with_log(calls.clone()),
        );
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (10.0, 10.0));
        let data = ui.layer_mut(layer).core_mut().create(a);
        ui.update();
        assert_eq!(
            calls.borrow().last(),
            Some(&Call::Update(
                LayerStates::NEEDS_NODE_OFFSET_SIZE_UPDATE
                    | LayerStates::NEEDS_ATTACHMENT_UPDATE
                    | LayerStates::NEEDS_NODE_ENABLED_UPDATE
                    | LayerStates::NEEDS_NODE_OPACITY_UPDATE
                    | LayerStates::NEEDS_DATA_UPDATE,
                vec![data.id()]
            ))
        );
        assert_eq!(ui.layer(layer).core().state(), LayerStates::empty());

        ui.set_node_opacity(a, 0.5);
        ui.update();
        assert_eq!(
            calls.borrow().last(),
            Some(&Call::Update(
                LayerStates::NEEDS_NODE_OPACITY_UPDATE,
                vec![data.id()]
            ))
        );

        let len = calls.borrow().len();
        ui.update();
        assert_eq!(calls.borrow().len(), len);
    }

    #[test]
    fn hiding_a_hovered_node_sends_visibility_lost() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        let calls = log();
        ui.set_layer_instance(
            RecordingLayer::new(layer, LayerFeatures::EVENT).with_log(calls.clone()),
        );
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (10.0, 10.0));
        let data = ui.layer_mut(layer).core_mut().create(a);
        ui.update();
        ui.hovered = a;
        ui.focused = a;

        ui.add_node_flags(a, NodeFlags::HIDDEN);
        ui.update();
        assert_eq!(ui.current_hovered_node(), NodeHandle::NULL);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
        assert!(
            calls
                .borrow()
                .contains(&Call::VisibilityLost(data.id(), false, false))
        );
    }

    #[test]
    fn losing_focusable_only_resets_focus() {
        let mut ui = ui();
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0), (10.0, 10.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        ui.update();
        ui.hovered = a;
        ui.focused = a;
        ui.clear_node_flags(a, NodeFlags::FOCUSABLE);
        ui.update();
        assert_eq!(ui.current_hovered_node(), a);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
    }

    #[test]
    fn resize_relayouts() {
        let mut ui = ui();
        let a = node(&mut ui, NodeHandle::NULL, (150.0, 0.0), (10.0, 10.0));
        ui.update();
        assert!(!ui.frame.drawn[a.id() as usize]);
        ui.set_size(Size::new(200.0, 200.0), Size::new(200.0, 200.0), (200, 200));
        ui.update();
        assert!(ui.frame.drawn[a.id() as usize]);
    }
}
