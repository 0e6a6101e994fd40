// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event dispatch.
//!
//! Pointer positions arrive in window coordinates and are scaled to the
//! user interface size once per event. Hit testing walks top-level subtrees
//! front to back and, within a subtree, children front to back before their
//! parent. Every data with [`LayerFeatures::EVENT`] on a hit node gets the
//! event; the walk stops at the first node where any of them accepts.
//!
//! Four references persist between events:
//!
//! - **pressed**: node an accepted primary press landed on, reset by the
//!   primary release or when the pointer leaves it uncaptured,
//! - **captured**: node receiving all pointer events regardless of position,
//! - **hovered**: node under the primary pointer that accepted the move,
//! - **focused**: node receiving key and text input.
//!
//! All of them are revalidated by [`UserInterface::update`], which every
//! entry point calls first.

use alloc::vec::Vec;

use kurbo::{Point, Size, Vec2};

use crate::event::{FocusEvent, KeyEvent, PointerEvent, PointerMoveEvent, TextInputEvent};
use crate::handle::NodeHandle;
use crate::layer::{Layer, LayerFeatures};
use crate::trace::{EventDispatch, EventKind, PhaseKind};

use super::UserInterface;

/// What the user interface fills in before each hook call.
struct NodeContext {
    position: Option<Point>,
    node_size: Size,
    pressed: bool,
    hovering: bool,
}

trait NodeEvent {
    fn accepted(&self) -> bool;
    fn set_accepted(&mut self, accepted: bool);
    fn prepare(&mut self, context: &NodeContext);

    fn captured(&self) -> bool {
        false
    }

    fn set_captured(&mut self, _: bool) {}
}

impl NodeEvent for PointerEvent {
    fn accepted(&self) -> bool {
        self.accepted
    }

    fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    fn prepare(&mut self, context: &NodeContext) {
        self.position = context.position.unwrap_or(Point::ZERO);
        self.node_size = context.node_size;
        self.hovering = context.hovering;
    }

    fn captured(&self) -> bool {
        self.captured
    }

    fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }
}

impl NodeEvent for PointerMoveEvent {
    fn accepted(&self) -> bool {
        self.accepted
    }

    fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    fn prepare(&mut self, context: &NodeContext) {
        self.position = context.position.unwrap_or(Point::ZERO);
        self.node_size = context.node_size;
        self.hovering = context.hovering;
    }

    fn captured(&self) -> bool {
        self.captured
    }

    fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }
}

impl NodeEvent for FocusEvent {
    fn accepted(&self) -> bool {
        self.accepted
    }

    fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    fn prepare(&mut self, context: &NodeContext) {
        self.pressed = context.pressed;
        self.hovering = context.hovering;
    }
}

impl NodeEvent for KeyEvent {
    fn accepted(&self) -> bool {
        self.accepted
    }

    fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    fn prepare(&mut self, context: &NodeContext) {
        self.position = context.position;
        self.node_size = context.node_size;
        self.hovering = context.hovering;
    }
}

impl NodeEvent for TextInputEvent {
    fn accepted(&self) -> bool {
        self.accepted
    }

    fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    fn prepare(&mut self, _: &NodeContext) {}
}

impl UserInterface {
    fn to_ui_position(&self, global: Point) -> Point {
        Point::new(
            global.x * self.size.width / self.window_size.width,
            global.y * self.size.height / self.window_size.height,
        )
    }

    fn begin_event(&mut self, what: &str, accepted: bool) -> u64 {
        assert!(!accepted, "UserInterface::{what}(): event already accepted");
        self.update();
        self.begin_phase(PhaseKind::Event)
    }

    fn end_event(&mut self, serial: u64, kind: EventKind, node: NodeHandle, accepted: bool) {
        tracing::trace!(?kind, ?node, accepted, "dispatched event");
        let dispatch = EventDispatch {
            serial,
            kind,
            node: node.bits(),
            accepted,
        };
        self.tracer().event_dispatch(&dispatch);
        self.end_phase(serial, PhaseKind::Event);
    }

    /// Hands `event` to every event data on node `id`, front-most layer
    /// first, and returns whether any of them accepted it.
    fn call_on_node<E, F>(
        &mut self,
        id: u32,
        global: Option<Point>,
        event: &mut E,
        hook: &F,
    ) -> bool
    where
        E: NodeEvent,
        F: Fn(&mut dyn Layer, u32, &mut E),
    {
        let node = self.node_handle(id);
        let idx = id as usize;
        let context = NodeContext {
            position: global.map(|position| position - self.frame.absolute[idx]),
            node_size: self.frame.sizes[idx].to_size(),
            pressed: self.pressed == node,
            hovering: self.hovered == node,
        };
        event.prepare(&context);

        let mut accepted = false;
        for data in self.frame.node_data[idx].iter().rev() {
            let Some(layer) = self.layers.instance_mut(data.layer().id()) else {
                continue;
            };
            if !layer.core().features().contains(LayerFeatures::EVENT) {
                continue;
            }
            event.set_accepted(false);
            hook(&mut **layer, data.id(), event);
            accepted |= event.accepted();
        }
        event.set_accepted(accepted);
        accepted
    }

    /// Finds the front-most node at `position` accepting `event`.
    ///
    /// Each visited node sees the capture flag `event` came in with, so on
    /// return it holds what the accepting node's handlers left there.
    fn hit_test<E, F>(&mut self, position: Point, event: &mut E, hook: &F) -> Option<u32>
    where
        E: NodeEvent,
        F: Fn(&mut dyn Layer, u32, &mut E),
    {
        let captured = event.captured();
        for t in (0..self.frame.visible.top_level.len()).rev() {
            let index = self.frame.visible.top_level[t] as usize;
            if let Some(id) = self.hit_node(index, position, captured, event, hook) {
                return Some(id);
            }
        }
        event.set_captured(captured);
        None
    }

    fn hit_node<E, F>(
        &mut self,
        index: usize,
        position: Point,
        captured: bool,
        event: &mut E,
        hook: &F,
    ) -> Option<u32>
    where
        E: NodeEvent,
        F: Fn(&mut dyn Layer, u32, &mut E),
    {
        let id = self.frame.visible.nodes[index];
        if !self.frame.events_enabled[id as usize]
            || !self.frame.event_rect(id).contains(position)
        {
            return None;
        }
        let mut children = Vec::new();
        self.frame.visible.children_of(index, &mut children);
        for &child in children.iter().rev() {
            if let Some(hit) = self.hit_node(child, position, captured, event, hook) {
                return Some(hit);
            }
        }
        event.set_captured(captured);
        self.call_on_node(id, Some(position), event, hook).then_some(id)
    }

    fn blur(&mut self, node: NodeHandle, event: &FocusEvent) {
        let mut blur = FocusEvent::new(event.time());
        self.call_on_node(node.id(), None, &mut blur, &|layer, data, event| {
            layer.blur_event(data, event);
        });
    }

    fn focus(&mut self, node: NodeHandle, event: &mut FocusEvent) -> bool {
        self.call_on_node(node.id(), None, event, &|layer, data, event| {
            layer.focus_event(data, event);
        })
    }

    /// Moves focus after a focusing press accepted on `node`, or landing
    /// nowhere if Null.
    fn focus_on_press(&mut self, node: NodeHandle, event: &mut FocusEvent) {
        if !node.is_null() && node == self.focused {
            if !self.focus(node, event) {
                self.blur(node, event);
                self.set_focused(NodeHandle::NULL);
            }
            return;
        }
        if !self.focused.is_null() {
            self.blur(self.focused, event);
            self.set_focused(NodeHandle::NULL);
        }
        if !node.is_null() && self.is_node_focusable(node.id()) && self.focus(node, event) {
            self.set_focused(node);
        }
    }

    /// Dispatches a pointer press at `global_position`, in window
    /// coordinates.
    ///
    /// A secondary press goes straight to the captured node if there's one.
    /// Otherwise the press is hit tested; for a primary press the accepting
    /// node becomes pressed and, unless a handler called
    /// [`set_captured(false)`](PointerEvent::set_captured), captured. A
    /// primary press with a [focusing](crate::Pointer::focuses) pointer also
    /// moves focus: the focused node is blurred unless it's the pressed one,
    /// and the pressed node gets a focus event if it's
    /// [`FOCUSABLE`](crate::NodeFlags::FOCUSABLE).
    ///
    /// Returns whether the press was accepted.
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted.
    pub fn pointer_press_event(&mut self, global_position: Point, event: &mut PointerEvent) -> bool {
        let serial = self.begin_event("pointer_press_event", event.accepted);
        let position = self.to_ui_position(global_position);
        let primary = event.is_primary();
        if primary {
            self.global_pointer = Some(position);
        }
        let press = |layer: &mut dyn Layer, data, event: &mut PointerEvent| {
            layer.pointer_press_event(data, event);
        };

        let captured = self.captured;
        let (node, accepted) = if !primary && !captured.is_null() {
            event.captured = true;
            let accepted = self.call_on_node(captured.id(), Some(position), event, &press);
            if !event.captured {
                self.set_captured(NodeHandle::NULL);
            }
            (captured, accepted)
        } else {
            event.captured = true;
            let hit = self.hit_test(position, event, &press);
            let node = hit.map_or(NodeHandle::NULL, |id| self.node_handle(id));
            if primary {
                self.set_pressed(node);
                self.set_captured(if event.captured { node } else { NodeHandle::NULL });
            }
            (node, hit.is_some())
        };

        if primary && event.pointer().focuses() {
            let mut focus = FocusEvent::new(event.time());
            self.focus_on_press(node, &mut focus);
        }

        self.end_event(serial, EventKind::PointerPress, node, accepted);
        accepted
    }

    /// Dispatches a pointer release at `global_position`, in window
    /// coordinates.
    ///
    /// Goes to the captured node if there's one, otherwise it's hit tested.
    /// An accepted primary release inside the pressed node is followed by a
    /// tap-or-click event on it. A primary release then resets both the
    /// pressed and the captured node. For other pointers the handlers can
    /// release the capture or make the accepting node capture.
    ///
    /// Returns whether the release was accepted.
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted.
    pub fn pointer_release_event(
        &mut self,
        global_position: Point,
        event: &mut PointerEvent,
    ) -> bool {
        let serial = self.begin_event("pointer_release_event", event.accepted);
        let position = self.to_ui_position(global_position);
        let primary = event.is_primary();
        if primary {
            self.global_pointer = Some(position);
        }
        let release = |layer: &mut dyn Layer, data, event: &mut PointerEvent| {
            layer.pointer_release_event(data, event);
        };

        let pressed = self.pressed;
        let captured = self.captured;
        let (node, accepted) = if captured.is_null() {
            event.captured = false;
            let hit = self.hit_test(position, event, &release);
            (hit.map_or(NodeHandle::NULL, |id| self.node_handle(id)), hit.is_some())
        } else {
            event.captured = true;
            let accepted = self.call_on_node(captured.id(), Some(position), event, &release);
            (captured, accepted)
        };

        if primary {
            let inside = !node.is_null() && self.frame.event_rect(node.id()).contains(position);
            if accepted && inside && !pressed.is_null() && node == pressed {
                let mut tap = event.clone();
                tap.accepted = false;
                self.call_on_node(node.id(), Some(position), &mut tap, &|layer, data, event| {
                    layer.pointer_tap_or_click_event(data, event);
                });
            }
            self.set_pressed(NodeHandle::NULL);
            self.set_captured(NodeHandle::NULL);
        } else if captured.is_null() {
            if event.captured && !node.is_null() {
                self.set_captured(node);
            }
        } else if !event.captured {
            self.set_captured(NodeHandle::NULL);
        }

        self.end_event(serial, EventKind::PointerRelease, node, accepted);
        accepted
    }

    /// Dispatches a pointer move to `global_position`, in window
    /// coordinates.
    ///
    /// With a captured node the move goes to it, and for the primary
    /// pointer the captured node gets enter and leave events as the pointer
    /// crosses its edges. Handlers can release the capture, for other
    /// pointers only when the move is accepted. Without one the
    /// move is hit tested; a primary move landing on a different node than
    /// the hovered one sends a leave event to the old node and an enter
    /// event to the new one, and leaving the pressed node resets it. Any of
    /// the handlers can capture the pointer.
    ///
    /// Returns whether the move was accepted.
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted.
    pub fn pointer_move_event(
        &mut self,
        global_position: Point,
        event: &mut PointerMoveEvent,
    ) -> bool {
        let serial = self.begin_event("pointer_move_event", event.accepted);
        let position = self.to_ui_position(global_position);
        let primary = event.is_primary();
        event.relative_position = if primary {
            self.global_pointer
                .map_or(Vec2::ZERO, |previous| position - previous)
        } else {
            Vec2::ZERO
        };
        if primary {
            self.global_pointer = Some(position);
        }
        let on_move = |layer: &mut dyn Layer, data, event: &mut PointerMoveEvent| {
            layer.pointer_move_event(data, event);
        };
        let on_enter = |layer: &mut dyn Layer, data, event: &mut PointerMoveEvent| {
            layer.pointer_enter_event(data, event);
        };
        let on_leave = |layer: &mut dyn Layer, data, event: &mut PointerMoveEvent| {
            layer.pointer_leave_event(data, event);
        };

        let captured = self.captured;
        let (node, accepted) = if captured.is_null() {
            event.captured = false;
            let hit = self.hit_test(position, event, &on_move);
            let node = hit.map_or(NodeHandle::NULL, |id| self.node_handle(id));
            let mut capture = event.captured;
            if primary {
                let previous = self.hovered;
                if node != previous {
                    self.set_hovered(node);
                    if !previous.is_null() {
                        let mut leave = event.clone();
                        leave.accepted = false;
                        leave.relative_position = Vec2::ZERO;
                        leave.captured = false;
                        self.call_on_node(previous.id(), Some(position), &mut leave, &on_leave);
                    }
                    if !node.is_null() {
                        let mut enter = event.clone();
                        enter.accepted = false;
                        enter.relative_position = Vec2::ZERO;
                        enter.captured = capture;
                        self.call_on_node(node.id(), Some(position), &mut enter, &on_enter);
                        capture = enter.captured;
                    }
                }
                if self.pressed != node {
                    self.set_pressed(NodeHandle::NULL);
                }
            }
            if capture && !node.is_null() {
                self.set_captured(node);
            }
            (node, hit.is_some())
        } else {
            event.captured = true;
            let accepted = self.call_on_node(captured.id(), Some(position), event, &on_move);
            let mut capture = event.captured;
            if primary {
                let inside = self.frame.event_rect(captured.id()).contains(position);
                let hovered = if inside && accepted {
                    captured
                } else {
                    NodeHandle::NULL
                };
                let previous = self.hovered;
                if hovered != previous {
                    self.set_hovered(hovered);
                    let mut crossing = event.clone();
                    crossing.accepted = false;
                    crossing.relative_position = Vec2::ZERO;
                    crossing.captured = capture;
                    if previous == captured {
                        self.call_on_node(captured.id(), Some(position), &mut crossing, &on_leave);
                    } else if hovered == captured {
                        self.call_on_node(captured.id(), Some(position), &mut crossing, &on_enter);
                    }
                    capture = crossing.captured;
                }
            }
            if !capture && (primary || accepted) {
                self.set_captured(NodeHandle::NULL);
            }
            (captured, accepted)
        };

        self.end_event(serial, EventKind::PointerMove, node, accepted);
        accepted
    }

    /// Focuses `node`, or blurs the focused node if `node` is Null.
    ///
    /// If `node` can't get focus because it isn't visible, has events
    /// disabled or isn't [`FOCUSABLE`](crate::NodeFlags::FOCUSABLE),
    /// nothing happens and the focused node stays. Otherwise `node` gets the
    /// focus event. If accepted, the previously focused node is blurred and
    /// `node` becomes focused; if not, the previous focus stays. Focusing the
    /// already focused node sends the focus event again and blurs it only if
    /// rejected. Nodes outside their clip rectangle can be focused.
    ///
    /// Returns whether `node` is now focused.
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted or `node` is neither Null nor
    /// valid.
    pub fn focus_event(&mut self, node: NodeHandle, event: &mut FocusEvent) -> bool {
        let serial = self.begin_event("focus_event", event.accepted);
        assert!(
            node.is_null() || self.nodes.is_valid(node),
            "UserInterface::focus_event(): invalid handle {node:?}"
        );

        let accepted = if node.is_null() {
            if !self.focused.is_null() {
                self.blur(self.focused, event);
                self.set_focused(NodeHandle::NULL);
            }
            false
        } else if !self.is_node_focusable(node.id()) {
            false
        } else if node == self.focused {
            let accepted = self.focus(node, event);
            if !accepted {
                self.blur(node, event);
                self.set_focused(NodeHandle::NULL);
            }
            accepted
        } else {
            let accepted = self.focus(node, event);
            if accepted {
                if !self.focused.is_null() {
                    self.blur(self.focused, event);
                }
                self.set_focused(node);
            }
            accepted
        };

        self.end_event(serial, EventKind::Focus, node, accepted);
        accepted
    }

    fn key_event<F>(&mut self, what: &str, kind: EventKind, event: &mut KeyEvent, hook: &F) -> bool
    where
        F: Fn(&mut dyn Layer, u32, &mut KeyEvent),
    {
        let serial = self.begin_event(what, event.accepted);
        let focused = self.focused;
        let (node, accepted) = if !focused.is_null() {
            (focused, self.call_on_node(focused.id(), None, event, hook))
        } else if let Some(position) = self.global_pointer {
            let hit = self.hit_test(position, event, hook);
            (hit.map_or(NodeHandle::NULL, |id| self.node_handle(id)), hit.is_some())
        } else {
            (NodeHandle::NULL, false)
        };
        self.end_event(serial, kind, node, accepted);
        accepted
    }

    /// Dispatches a key press to the focused node, or if nothing is focused,
    /// hit tests it at the last primary pointer position.
    ///
    /// Returns whether the key press was accepted.
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted.
    pub fn key_press_event(&mut self, event: &mut KeyEvent) -> bool {
        self.key_event("key_press_event", EventKind::KeyPress, event, &|layer, data, event| {
            layer.key_press_event(data, event);
        })
    }

    /// Dispatches a key release, routed like
    /// [`key_press_event`](Self::key_press_event).
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted.
    pub fn key_release_event(&mut self, event: &mut KeyEvent) -> bool {
        self.key_event(
            "key_release_event",
            EventKind::KeyRelease,
            event,
            &|layer, data, event| {
                layer.key_release_event(data, event);
            },
        )
    }

    /// Dispatches text input to the focused node. Returns `false` right away
    /// if nothing is focused.
    ///
    /// # Panics
    ///
    /// Panics if `event` is already accepted.
    pub fn text_input_event(&mut self, event: &mut TextInputEvent) -> bool {
        let serial = self.begin_event("text_input_event", event.accepted);
        let focused = self.focused;
        let accepted = !focused.is_null()
            && self.call_on_node(focused.id(), None, event, &|layer, data, event| {
                layer.text_input_event(data, event);
            });
        self.end_event(serial, EventKind::TextInput, focused, accepted);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::super::testing::{Call, Log, RecordingLayer, log, ui};
    use super::*;
    use crate::event::{Key, Modifiers, Pointer, PointerEventSource, Pointers};
    use crate::handle::LayerHandle;
    use crate::node::NodeFlags;
    use crate::time::Nanoseconds;

    fn setup(mut ui: UserInterface) -> (UserInterface, LayerHandle, Log) {
        let calls = log();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(RecordingLayer::new(layer, LayerFeatures::EVENT).with_log(calls.clone()));
        (ui, layer, calls)
    }

    fn node(ui: &mut UserInterface, parent: NodeHandle, rect: (f64, f64, f64, f64)) -> NodeHandle {
        ui.create_node(
            parent,
            Vec2::new(rect.0, rect.1),
            Vec2::new(rect.2, rect.3),
            NodeFlags::empty(),
        )
    }

    fn data(ui: &mut UserInterface, layer: LayerHandle, node: NodeHandle) -> u32 {
        ui.layer_mut(layer).core_mut().create(node).id()
    }

    /// Drains the log, dropping update calls.
    fn take(calls: &Log) -> Vec<Call> {
        calls
            .borrow_mut()
            .drain(..)
            .filter(|call| !matches!(call, Call::Update(..)))
            .collect()
    }

    fn pointer(primary: bool) -> PointerEvent {
        PointerEvent::new(
            Nanoseconds::ZERO,
            PointerEventSource::Mouse,
            Pointer::MouseLeft,
            primary,
            0,
            Modifiers::empty(),
        )
    }

    fn movement() -> PointerMoveEvent {
        PointerMoveEvent::new(
            Nanoseconds::ZERO,
            PointerEventSource::Mouse,
            None,
            Pointers::empty(),
            true,
            0,
            Modifiers::empty(),
        )
    }

    fn secondary_movement() -> PointerMoveEvent {
        PointerMoveEvent::new(
            Nanoseconds::ZERO,
            PointerEventSource::Touch,
            None,
            Pointers::empty(),
            false,
            1,
            Modifiers::empty(),
        )
    }

    fn press(ui: &mut UserInterface, x: f64, y: f64) -> bool {
        ui.pointer_press_event(Point::new(x, y), &mut pointer(true))
    }

    fn release(ui: &mut UserInterface, x: f64, y: f64) -> bool {
        ui.pointer_release_event(Point::new(x, y), &mut pointer(true))
    }

    fn move_to(ui: &mut UserInterface, x: f64, y: f64) -> bool {
        ui.pointer_move_event(Point::new(x, y), &mut movement())
    }

    fn key() -> KeyEvent {
        KeyEvent::new(Nanoseconds::ZERO, Key::Enter, Modifiers::empty())
    }

    #[test]
    fn press_goes_to_front_most_node() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (10.0, 10.0, 50.0, 50.0));
        data(&mut ui, layer, a);
        let db = data(&mut ui, layer, b);

        assert!(press(&mut ui, 20.0, 20.0));
        assert_eq!(take(&calls), vec![Call::Press(db, Point::new(10.0, 10.0))]);
        assert_eq!(ui.current_pressed_node(), b);
        assert_eq!(ui.current_captured_node(), b);
    }

    #[test]
    fn unaccepted_press_falls_through_to_nodes_behind() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (10.0, 10.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        let db = data(&mut ui, layer, b);
        ui.layer_as_mut::<RecordingLayer>(layer).accept = false;

        assert!(!press(&mut ui, 20.0, 20.0));
        assert_eq!(
            take(&calls),
            vec![
                Call::Press(db, Point::new(10.0, 10.0)),
                Call::Press(da, Point::new(20.0, 20.0)),
            ]
        );
        assert_eq!(ui.current_pressed_node(), NodeHandle::NULL);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn events_bubble_from_children_to_parents() {
        let (mut ui, layer, calls) = setup(ui());
        let parent = node(&mut ui, NodeHandle::NULL, (10.0, 10.0, 80.0, 80.0));
        let child = node(&mut ui, parent, (10.0, 10.0, 20.0, 20.0));
        let muted = node(&mut ui, parent, (0.0, 0.0, 80.0, 80.0));
        ui.add_node_flags(muted, NodeFlags::NO_EVENTS);
        let dparent = data(&mut ui, layer, parent);
        data(&mut ui, layer, muted);

        assert!(press(&mut ui, 25.0, 25.0));
        assert_eq!(take(&calls), vec![Call::Press(dparent, Point::new(15.0, 15.0))]);
        assert_eq!(ui.current_pressed_node(), parent);
        assert_ne!(ui.current_pressed_node(), child);
    }

    #[test]
    fn positions_are_scaled_from_window() {
        let ui = UserInterface::new(Size::new(100.0, 100.0), Size::new(200.0, 200.0), (200, 200));
        let (mut ui, layer, calls) = setup(ui);
        let a = node(&mut ui, NodeHandle::NULL, (10.0, 10.0, 20.0, 20.0));
        let da = data(&mut ui, layer, a);

        assert!(press(&mut ui, 40.0, 40.0));
        assert_eq!(take(&calls), vec![Call::Press(da, Point::new(10.0, 10.0))]);
        assert_eq!(ui.current_global_pointer_position(), Some(Point::new(20.0, 20.0)));
    }

    #[test]
    fn release_on_pressed_node_taps() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        press(&mut ui, 20.0, 20.0);
        take(&calls);

        assert!(release(&mut ui, 25.0, 25.0));
        let at = Point::new(25.0, 25.0);
        assert_eq!(take(&calls), vec![Call::Release(da, at), Call::TapOrClick(da, at)]);
        assert_eq!(ui.current_pressed_node(), NodeHandle::NULL);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn captured_release_outside_does_not_tap() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        press(&mut ui, 20.0, 20.0);
        take(&calls);

        assert!(release(&mut ui, 90.0, 90.0));
        assert_eq!(take(&calls), vec![Call::Release(da, Point::new(90.0, 90.0))]);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn declined_capture_hit_tests_release() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        data(&mut ui, layer, a);
        ui.layer_as_mut::<RecordingLayer>(layer).capture = Some(false);
        press(&mut ui, 20.0, 20.0);
        assert_eq!(ui.current_pressed_node(), a);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
        take(&calls);

        assert!(!release(&mut ui, 90.0, 90.0));
        assert_eq!(take(&calls), vec![]);
        assert_eq!(ui.current_pressed_node(), NodeHandle::NULL);
    }

    #[test]
    fn secondary_press_goes_to_captured_node() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        press(&mut ui, 20.0, 20.0);
        take(&calls);

        assert!(ui.pointer_press_event(Point::new(90.0, 90.0), &mut pointer(false)));
        assert_eq!(take(&calls), vec![Call::Press(da, Point::new(90.0, 90.0))]);
        assert_eq!(ui.current_captured_node(), a);
        assert_eq!(ui.current_global_pointer_position(), Some(Point::new(20.0, 20.0)));
    }

    #[test]
    fn moves_enter_and_leave_nodes() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (60.0, 0.0, 30.0, 30.0));
        let da = data(&mut ui, layer, a);
        let db = data(&mut ui, layer, b);

        assert!(move_to(&mut ui, 10.0, 10.0));
        assert_eq!(
            take(&calls),
            vec![Call::Move(da, Point::new(10.0, 10.0)), Call::Enter(da)]
        );
        assert_eq!(ui.current_hovered_node(), a);

        assert!(move_to(&mut ui, 70.0, 10.0));
        assert_eq!(
            take(&calls),
            vec![
                Call::Move(db, Point::new(10.0, 10.0)),
                Call::Leave(da),
                Call::Enter(db),
            ]
        );
        assert_eq!(ui.current_hovered_node(), b);

        assert!(!move_to(&mut ui, 95.0, 95.0));
        assert_eq!(take(&calls), vec![Call::Leave(db)]);
        assert_eq!(ui.current_hovered_node(), NodeHandle::NULL);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn captured_node_gets_moves_outside() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        move_to(&mut ui, 10.0, 10.0);
        press(&mut ui, 10.0, 10.0);
        take(&calls);

        assert!(move_to(&mut ui, 95.0, 95.0));
        assert_eq!(
            take(&calls),
            vec![Call::Move(da, Point::new(95.0, 95.0)), Call::Leave(da)]
        );
        assert_eq!(ui.current_hovered_node(), NodeHandle::NULL);
        assert_eq!(ui.current_captured_node(), a);

        assert!(move_to(&mut ui, 10.0, 10.0));
        assert_eq!(
            take(&calls),
            vec![Call::Move(da, Point::new(10.0, 10.0)), Call::Enter(da)]
        );
        assert_eq!(ui.current_hovered_node(), a);

        assert!(release(&mut ui, 10.0, 10.0));
        let at = Point::new(10.0, 10.0);
        assert_eq!(take(&calls), vec![Call::Release(da, at), Call::TapOrClick(da, at)]);
    }

    #[test]
    fn leaving_an_uncaptured_pressed_node_cancels_the_press() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (60.0, 0.0, 30.0, 30.0));
        let da = data(&mut ui, layer, a);
        data(&mut ui, layer, b);
        ui.layer_as_mut::<RecordingLayer>(layer).capture = Some(false);
        press(&mut ui, 10.0, 10.0);
        move_to(&mut ui, 70.0, 10.0);
        assert_eq!(ui.current_pressed_node(), NodeHandle::NULL);
        take(&calls);

        release(&mut ui, 10.0, 10.0);
        assert_eq!(take(&calls), vec![Call::Release(da, Point::new(10.0, 10.0))]);
    }

    #[test]
    fn move_handler_can_capture() {
        let (mut ui, layer, _) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        data(&mut ui, layer, a);
        ui.layer_as_mut::<RecordingLayer>(layer).capture = Some(true);
        move_to(&mut ui, 10.0, 10.0);
        assert_eq!(ui.current_captured_node(), a);

        ui.layer_as_mut::<RecordingLayer>(layer).capture = Some(false);
        move_to(&mut ui, 20.0, 20.0);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn capture_comes_only_from_the_accepting_node() {
        let (mut ui, back, calls) = setup(ui());
        let front = ui.create_layer(LayerHandle::NULL);
        let mut grabby = RecordingLayer::new(front, LayerFeatures::EVENT).with_log(calls.clone());
        grabby.accept = false;
        grabby.capture = Some(true);
        ui.set_layer_instance(grabby);
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (10.0, 10.0, 50.0, 50.0));
        let da = data(&mut ui, back, a);
        let db = data(&mut ui, front, b);

        assert!(move_to(&mut ui, 20.0, 20.0));
        assert_eq!(
            take(&calls),
            vec![
                Call::Move(db, Point::new(10.0, 10.0)),
                Call::Move(da, Point::new(20.0, 20.0)),
                Call::Enter(da),
            ]
        );
        assert_eq!(ui.current_hovered_node(), a);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn secondary_move_releases_capture_only_when_accepted() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        press(&mut ui, 10.0, 10.0);
        assert_eq!(ui.current_captured_node(), a);
        take(&calls);

        let recording = ui.layer_as_mut::<RecordingLayer>(layer);
        recording.accept = false;
        recording.capture = Some(false);
        assert!(!ui.pointer_move_event(Point::new(90.0, 90.0), &mut secondary_movement()));
        assert_eq!(take(&calls), vec![Call::Move(da, Point::new(90.0, 90.0))]);
        assert_eq!(ui.current_captured_node(), a);

        ui.layer_as_mut::<RecordingLayer>(layer).accept = true;
        assert!(ui.pointer_move_event(Point::new(90.0, 90.0), &mut secondary_movement()));
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
        assert_eq!(ui.current_pressed_node(), a);
    }

    #[test]
    fn secondary_release_can_capture() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        ui.layer_as_mut::<RecordingLayer>(layer).capture = Some(true);

        assert!(ui.pointer_release_event(Point::new(10.0, 10.0), &mut pointer(false)));
        assert_eq!(take(&calls), vec![Call::Release(da, Point::new(10.0, 10.0))]);
        assert_eq!(ui.current_captured_node(), a);
        assert_eq!(ui.current_pressed_node(), NodeHandle::NULL);

        ui.layer_as_mut::<RecordingLayer>(layer).capture = Some(false);
        assert!(ui.pointer_release_event(Point::new(90.0, 90.0), &mut pointer(false)));
        assert_eq!(take(&calls), vec![Call::Release(da, Point::new(90.0, 90.0))]);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
    }

    #[test]
    fn press_moves_focus() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (60.0, 60.0, 20.0, 20.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);
        let db = data(&mut ui, layer, b);

        press(&mut ui, 10.0, 10.0);
        release(&mut ui, 10.0, 10.0);
        assert_eq!(ui.current_focused_node(), a);
        take(&calls);

        press(&mut ui, 10.0, 10.0);
        assert_eq!(
            take(&calls),
            vec![Call::Press(da, Point::new(10.0, 10.0)), Call::Focus(da)]
        );
        release(&mut ui, 10.0, 10.0);
        take(&calls);

        press(&mut ui, 70.0, 70.0);
        assert_eq!(
            take(&calls),
            vec![Call::Press(db, Point::new(10.0, 10.0)), Call::Blur(da)]
        );
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
    }

    #[test]
    fn press_outside_blurs() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);
        press(&mut ui, 10.0, 10.0);
        release(&mut ui, 10.0, 10.0);
        take(&calls);

        assert!(!press(&mut ui, 90.0, 90.0));
        assert_eq!(take(&calls), vec![Call::Blur(da)]);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
    }

    #[test]
    fn explicit_focus_keeps_focus_on_unfocusable_target() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (60.0, 60.0, 20.0, 20.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);
        data(&mut ui, layer, b);

        assert!(ui.focus_event(a, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![Call::Focus(da)]);
        assert_eq!(ui.current_focused_node(), a);

        assert!(!ui.focus_event(b, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![]);
        assert_eq!(ui.current_focused_node(), a);

        assert!(!ui.focus_event(NodeHandle::NULL, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![Call::Blur(da)]);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
    }

    #[test]
    fn rejected_focus_leaves_nothing_focused() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);
        ui.layer_as_mut::<RecordingLayer>(layer).accept = false;

        assert!(!ui.focus_event(a, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![Call::Focus(da)]);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
    }

    #[test]
    fn rejected_focus_keeps_previous_focus() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (60.0, 60.0, 20.0, 20.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        ui.add_node_flags(b, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);
        let db = data(&mut ui, layer, b);
        assert!(ui.focus_event(a, &mut FocusEvent::new(Nanoseconds::ZERO)));
        take(&calls);

        ui.layer_as_mut::<RecordingLayer>(layer).accept = false;
        assert!(!ui.focus_event(b, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![Call::Focus(db)]);
        assert_eq!(ui.current_focused_node(), a);

        ui.layer_as_mut::<RecordingLayer>(layer).accept = true;
        assert!(ui.focus_event(b, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![Call::Focus(db), Call::Blur(da)]);
        assert_eq!(ui.current_focused_node(), b);
    }

    #[test]
    fn clipped_node_can_be_focused() {
        let (mut ui, layer, calls) = setup(ui());
        let clip = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        ui.add_node_flags(clip, NodeFlags::CLIP);
        let child = node(&mut ui, clip, (60.0, 0.0, 20.0, 20.0));
        ui.add_node_flags(child, NodeFlags::FOCUSABLE);
        let dchild = data(&mut ui, layer, child);

        assert!(ui.focus_event(child, &mut FocusEvent::new(Nanoseconds::ZERO)));
        assert_eq!(take(&calls), vec![Call::Focus(dchild)]);
        assert_eq!(ui.current_focused_node(), child);

        assert!(!press(&mut ui, 65.0, 5.0));
        assert_eq!(take(&calls), vec![Call::Blur(dchild)]);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);

        ui.focus_event(child, &mut FocusEvent::new(Nanoseconds::ZERO));
        ui.set_node_offset(child, Vec2::new(70.0, 0.0));
        ui.update();
        assert_eq!(ui.current_focused_node(), child);
        take(&calls);
        assert!(ui.key_press_event(&mut key()));
        assert_eq!(take(&calls), vec![Call::KeyPress(dchild, None)]);
    }

    #[test]
    fn keys_go_to_focused_node_or_under_pointer() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);

        assert!(!ui.key_press_event(&mut key()));
        assert_eq!(take(&calls), vec![]);

        move_to(&mut ui, 5.0, 5.0);
        take(&calls);
        assert!(ui.key_press_event(&mut key()));
        assert_eq!(take(&calls), vec![Call::KeyPress(da, Some(Point::new(5.0, 5.0)))]);

        ui.focus_event(a, &mut FocusEvent::new(Nanoseconds::ZERO));
        move_to(&mut ui, 95.0, 95.0);
        take(&calls);
        assert!(ui.key_release_event(&mut key()));
        assert_eq!(take(&calls), vec![Call::KeyRelease(da, None)]);
    }

    #[test]
    fn text_input_needs_focus() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        ui.add_node_flags(a, NodeFlags::FOCUSABLE);
        let da = data(&mut ui, layer, a);
        move_to(&mut ui, 5.0, 5.0);
        take(&calls);

        assert!(!ui.text_input_event(&mut TextInputEvent::new(Nanoseconds::ZERO, "hi")));
        assert_eq!(take(&calls), vec![]);

        ui.focus_event(a, &mut FocusEvent::new(Nanoseconds::ZERO));
        take(&calls);
        assert!(ui.text_input_event(&mut TextInputEvent::new(Nanoseconds::ZERO, "hi")));
        assert_eq!(take(&calls), vec![Call::TextInput(da, "hi".into())]);
    }

    #[test]
    fn hiding_pressed_node_resets_interaction() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let da = data(&mut ui, layer, a);
        move_to(&mut ui, 10.0, 10.0);
        press(&mut ui, 10.0, 10.0);
        take(&calls);

        ui.add_node_flags(a, NodeFlags::HIDDEN);
        assert!(!release(&mut ui, 10.0, 10.0));
        assert_eq!(take(&calls), vec![Call::VisibilityLost(da, false, false)]);
        assert_eq!(ui.current_pressed_node(), NodeHandle::NULL);
        assert_eq!(ui.current_captured_node(), NodeHandle::NULL);
        assert_eq!(ui.current_hovered_node(), NodeHandle::NULL);
    }

    #[test]
    fn disabling_keeps_hover_on_other_nodes() {
        let (mut ui, layer, calls) = setup(ui());
        let a = node(&mut ui, NodeHandle::NULL, (0.0, 0.0, 50.0, 50.0));
        let b = node(&mut ui, NodeHandle::NULL, (60.0, 0.0, 30.0, 30.0));
        ui.add_node_flags(b, NodeFlags::FOCUSABLE);
        data(&mut ui, layer, a);
        let db = data(&mut ui, layer, b);
        move_to(&mut ui, 10.0, 10.0);
        ui.focus_event(b, &mut FocusEvent::new(Nanoseconds::ZERO));
        take(&calls);

        ui.add_node_flags(b, NodeFlags::DISABLED);
        ui.update();
        assert_eq!(take(&calls), vec![Call::VisibilityLost(db, false, false)]);
        assert_eq!(ui.current_hovered_node(), a);
        assert_eq!(ui.current_focused_node(), NodeHandle::NULL);
    }

    #[test]
    #[should_panic(expected = "UserInterface::pointer_press_event(): event already accepted")]
    fn accepted_event_panics() {
        let mut ui = ui();
        let mut event = pointer(true);
        event.set_accepted(true);
        ui.pointer_press_event(Point::ZERO, &mut event);
    }
}
