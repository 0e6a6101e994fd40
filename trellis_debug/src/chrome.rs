// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Phases become duration events, everything else instant events.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for record in decode(bytes) {
        let ts = nanos_to_us(record.elapsed_nanos);
        match record.event {
            RecordedEvent::PhaseBegin(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Pipeline",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "serial": e.serial,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Pipeline",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "args": {
                        "serial": e.serial,
                    }
                }));
            }
            RecordedEvent::UpdateSummary(s) => {
                events.push(json!({
                    "ph": "i",
                    "name": "UpdateSummary",
                    "cat": "Summary",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "serial": s.serial,
                        "states": format!("{:#06x}", s.states),
                        "visible_nodes": s.visible_nodes,
                        "drawn_nodes": s.drawn_nodes,
                        "top_level_count": s.top_level_count,
                        "layers_updated": s.layers_updated,
                        "layout_passes": s.layout_passes,
                    }
                }));
            }
            RecordedEvent::EventDispatch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.kind),
                    "cat": "Event",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "serial": e.serial,
                        "node": e.node,
                        "accepted": e.accepted,
                    }
                }));
            }
            RecordedEvent::InteractionChange(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.slot),
                    "cat": "Interaction",
                    "ts": ts,
                    "pid": 0,
                    "tid": 0,
                    "s": "t",
                    "args": {
                        "serial": e.serial,
                        "node": e.node,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[expect(
    clippy::cast_precision_loss,
    reason = "microsecond timestamps don't need more than 52 bits"
)]
fn nanos_to_us(nanos: u64) -> f64 {
    nanos as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kurbo::{Point, Size, Vec2};
    use trellis_core::event::{Modifiers, Pointer, PointerEvent, PointerEventSource};
    use trellis_core::trace::{
        EventDispatch, EventKind, InteractionChange, InteractionSlot, PhaseBeginEvent,
        PhaseEndEvent, PhaseKind, TraceSink, UpdateSummary,
    };
    use trellis_core::{
        Layer, LayerCore, LayerFeatures, LayerHandle, Nanoseconds, NodeFlags, NodeHandle,
        UserInterface,
    };

    use super::*;
    use crate::recorder::RecorderSink;

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_phase_begin(&PhaseBeginEvent {
            serial: 1,
            phase: PhaseKind::Event,
        });
        rec.on_event_dispatch(&EventDispatch {
            serial: 1,
            kind: EventKind::KeyPress,
            node: 0,
            accepted: false,
        });
        rec.on_phase_end(&PhaseEndEvent {
            serial: 1,
            phase: PhaseKind::Event,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        // Should parse as a JSON array.
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "B");
        assert_eq!(parsed[0]["name"], "Event");

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "KeyPress");
        assert_eq!(parsed[1]["args"]["accepted"], false);

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "Event");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }

    /// Lets the test read the recording while the user interface owns the
    /// sink.
    struct Shared(Rc<RefCell<RecorderSink>>);

    impl TraceSink for Shared {
        fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
            self.0.borrow_mut().on_phase_begin(e);
        }

        fn on_phase_end(&mut self, e: &PhaseEndEvent) {
            self.0.borrow_mut().on_phase_end(e);
        }

        fn on_update_summary(&mut self, s: &UpdateSummary) {
            self.0.borrow_mut().on_update_summary(s);
        }

        fn on_event_dispatch(&mut self, e: &EventDispatch) {
            self.0.borrow_mut().on_event_dispatch(e);
        }

        fn on_interaction_change(&mut self, e: &InteractionChange) {
            self.0.borrow_mut().on_interaction_change(e);
        }
    }

    struct Button {
        core: LayerCore,
    }

    impl Layer for Button {
        fn core(&self) -> &LayerCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut LayerCore {
            &mut self.core
        }

        fn pointer_press_event(&mut self, _: u32, event: &mut PointerEvent) {
            event.set_accepted(true);
        }
    }

    #[test]
    fn user_interface_trace_exports() {
        let recorder = Rc::new(RefCell::new(RecorderSink::new()));
        let mut ui = UserInterface::new(Size::new(100.0, 100.0), Size::new(100.0, 100.0), (100, 100));
        ui.set_trace_sink(Box::new(Shared(recorder.clone())));

        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(Button {
            core: LayerCore::new(layer, LayerFeatures::EVENT),
        });
        let node = ui.create_node(
            NodeHandle::NULL,
            Vec2::ZERO,
            Vec2::new(50.0, 50.0),
            NodeFlags::empty(),
        );
        ui.layer_mut(layer).core_mut().create(node);

        let mut press = PointerEvent::new(
            Nanoseconds::ZERO,
            PointerEventSource::Mouse,
            Pointer::MouseLeft,
            true,
            0,
            Modifiers::empty(),
        );
        assert!(ui.pointer_press_event(Point::new(10.0, 10.0), &mut press));

        let recorded: Vec<_> = decode(recorder.borrow().as_bytes())
            .map(|r| r.event)
            .collect();
        assert!(
            recorded
                .iter()
                .any(|e| matches!(e, RecordedEvent::UpdateSummary(s) if s.visible_nodes == 1))
        );
        assert!(recorded.iter().any(|e| matches!(
            e,
            RecordedEvent::EventDispatch(d)
                if d.kind == EventKind::PointerPress && d.accepted && d.node == node.bits()
        )));
        assert!(recorded.iter().any(|e| matches!(
            e,
            RecordedEvent::InteractionChange(c)
                if c.slot == InteractionSlot::Pressed && c.node == node.bits()
        )));

        let mut out = Vec::new();
        export(recorder.borrow().as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), recorded.len());
        let begins = parsed.iter().filter(|e| e["ph"] == "B").count();
        let ends = parsed.iter().filter(|e| e["ph"] == "E").count();
        assert_eq!(begins, ends);
    }
}
