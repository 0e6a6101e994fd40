// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Node handles
//! are printed as `id:generation`.

use std::io::Write;

use trellis_core::NodeHandle;
use trellis_core::trace::{
    EventDispatch, EventKind, InteractionChange, InteractionSlot, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TraceSink, UpdateSummary,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn phase_name(phase: PhaseKind) -> &'static str {
    match phase {
        PhaseKind::Clean => "clean",
        PhaseKind::Update => "update",
        PhaseKind::AdvanceAnimations => "animate",
        PhaseKind::Draw => "draw",
        PhaseKind::Event => "event",
    }
}

fn event_name(kind: EventKind) -> &'static str {
    match kind {
        EventKind::PointerPress => "press",
        EventKind::PointerRelease => "release",
        EventKind::PointerMove => "move",
        EventKind::Focus => "focus",
        EventKind::KeyPress => "key-press",
        EventKind::KeyRelease => "key-release",
        EventKind::TextInput => "text",
    }
}

fn slot_name(slot: InteractionSlot) -> &'static str {
    match slot {
        InteractionSlot::Pressed => "pressed",
        InteractionSlot::Captured => "captured",
        InteractionSlot::Hovered => "hovered",
        InteractionSlot::Focused => "focused",
    }
}

/// Formats raw node handle bits.
struct Node(u32);

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = NodeHandle::from_bits(self.0);
        if node.is_null() {
            f.write_str("-")
        } else {
            write!(f, "{}:{}", node.id(), node.generation())
        }
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:begin] #{} {}",
            e.serial,
            phase_name(e.phase),
        );
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        let _ = writeln!(
            self.writer,
            "[phase:end] #{} {}",
            e.serial,
            phase_name(e.phase),
        );
    }

    fn on_update_summary(&mut self, s: &UpdateSummary) {
        let _ = writeln!(
            self.writer,
            "[update] #{} states={:#06x} visible={} drawn={} top-level={} \
             layers={} layouts={}",
            s.serial,
            s.states,
            s.visible_nodes,
            s.drawn_nodes,
            s.top_level_count,
            s.layers_updated,
            s.layout_passes,
        );
    }

    fn on_event_dispatch(&mut self, e: &EventDispatch) {
        let accepted = if e.accepted { "accepted" } else { "ignored" };
        let _ = writeln!(
            self.writer,
            "[event] #{} {} node={} {accepted}",
            e.serial,
            event_name(e.kind),
            Node(e.node),
        );
    }

    fn on_interaction_change(&mut self, e: &InteractionChange) {
        let _ = writeln!(
            self.writer,
            "[interaction] #{} {}={}",
            e.serial,
            slot_name(e.slot),
            Node(e.node),
        );
    }
}
