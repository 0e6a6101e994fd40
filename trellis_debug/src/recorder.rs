// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as fixed-size little-endian records, each prefixed by a tag and
//! the nanoseconds elapsed since the recorder was created. [`decode`] reads
//! them back as an iterator of [`Record`].

use std::time::Instant;

use trellis_core::trace::{
    EventDispatch, EventKind, InteractionChange, InteractionSlot, PhaseBeginEvent, PhaseEndEvent,
    PhaseKind, TraceSink, UpdateSummary,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_PHASE_BEGIN: u8 = 1;
const TAG_PHASE_END: u8 = 2;
const TAG_UPDATE_SUMMARY: u8 = 3;
const TAG_EVENT_DISPATCH: u8 = 4;
const TAG_INTERACTION_CHANGE: u8 = 5;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug)]
pub struct RecorderSink {
    buf: Vec<u8>,
    start: Instant,
}

impl Default for RecorderSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecorderSink {
    /// Creates an empty recorder. Timestamps count from now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    // -- encoding helpers --------------------------------------------------

    fn write_header(&mut self, tag: u8) {
        self.write_u8(tag);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "u64 nanoseconds cover centuries of recording"
        )]
        let elapsed = self.start.elapsed().as_nanos() as u64;
        self.write_u64(elapsed);
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        self.write_header(TAG_PHASE_BEGIN);
        self.write_u64(e.serial);
        self.write_u8(e.phase.code());
    }

    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        self.write_header(TAG_PHASE_END);
        self.write_u64(e.serial);
        self.write_u8(e.phase.code());
    }

    fn on_update_summary(&mut self, s: &UpdateSummary) {
        self.write_header(TAG_UPDATE_SUMMARY);
        self.write_u64(s.serial);
        self.write_u16(s.states);
        self.write_u32(s.visible_nodes);
        self.write_u32(s.drawn_nodes);
        self.write_u32(s.top_level_count);
        self.write_u32(s.layers_updated);
        self.write_u32(s.layout_passes);
    }

    fn on_event_dispatch(&mut self, e: &EventDispatch) {
        self.write_header(TAG_EVENT_DISPATCH);
        self.write_u64(e.serial);
        self.write_u8(e.kind.code());
        self.write_u32(e.node);
        self.write_u8(u8::from(e.accepted));
    }

    fn on_interaction_change(&mut self, e: &InteractionChange) {
        self.write_header(TAG_INTERACTION_CHANGE);
        self.write_u64(e.serial);
        self.write_u8(e.slot.code());
        self.write_u32(e.node);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`PhaseBeginEvent`].
    PhaseBegin(PhaseBeginEvent),
    /// A [`PhaseEndEvent`].
    PhaseEnd(PhaseEndEvent),
    /// An [`UpdateSummary`].
    UpdateSummary(UpdateSummary),
    /// An [`EventDispatch`].
    EventDispatch(EventDispatch),
    /// An [`InteractionChange`].
    InteractionChange(InteractionChange),
}

/// A decoded event with the time it was recorded at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Record {
    /// Nanoseconds since the recorder was created.
    pub elapsed_nanos: u64,
    /// The event.
    pub event: RecordedEvent,
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`Record`].
///
/// Iteration stops at the first truncated or unknown record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn read<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.read::<1>().map(|[v]| v)
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.read().map(u16::from_le_bytes)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.read().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.read().map(u64::from_le_bytes)
    }

    fn read_phase(&mut self) -> Option<PhaseKind> {
        PhaseKind::from_code(self.read_u8()?)
    }

    fn decode_phase_begin(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseBegin(PhaseBeginEvent {
            serial: self.read_u64()?,
            phase: self.read_phase()?,
        }))
    }

    fn decode_phase_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::PhaseEnd(PhaseEndEvent {
            serial: self.read_u64()?,
            phase: self.read_phase()?,
        }))
    }

    fn decode_update_summary(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::UpdateSummary(UpdateSummary {
            serial: self.read_u64()?,
            states: self.read_u16()?,
            visible_nodes: self.read_u32()?,
            drawn_nodes: self.read_u32()?,
            top_level_count: self.read_u32()?,
            layers_updated: self.read_u32()?,
            layout_passes: self.read_u32()?,
        }))
    }

    fn decode_event_dispatch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::EventDispatch(EventDispatch {
            serial: self.read_u64()?,
            kind: EventKind::from_code(self.read_u8()?)?,
            node: self.read_u32()?,
            accepted: self.read_u8()? != 0,
        }))
    }

    fn decode_interaction_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::InteractionChange(InteractionChange {
            serial: self.read_u64()?,
            slot: InteractionSlot::from_code(self.read_u8()?)?,
            node: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        let elapsed_nanos = self.read_u64()?;
        let event = match tag {
            TAG_PHASE_BEGIN => self.decode_phase_begin(),
            TAG_PHASE_END => self.decode_phase_end(),
            TAG_UPDATE_SUMMARY => self.decode_update_summary(),
            TAG_EVENT_DISPATCH => self.decode_event_dispatch(),
            TAG_INTERACTION_CHANGE => self.decode_interaction_change(),
            _ => None,
        }?;
        Some(Record {
            elapsed_nanos,
            event,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn events(rec: &RecorderSink) -> Vec<RecordedEvent> {
        decode(rec.as_bytes()).map(|r| r.event).collect()
    }

    #[test]
    fn records_all_event_types_in_order() {
        let mut rec = RecorderSink::new();
        let begin = PhaseBeginEvent {
            serial: 3,
            phase: PhaseKind::Update,
        };
        let summary = UpdateSummary {
            serial: 3,
            states: 0x3ff,
            visible_nodes: 12,
            drawn_nodes: 9,
            top_level_count: 2,
            layers_updated: 4,
            layout_passes: 1,
        };
        let end = PhaseEndEvent {
            serial: 3,
            phase: PhaseKind::Update,
        };
        let dispatch = EventDispatch {
            serial: 4,
            kind: EventKind::PointerRelease,
            node: 0x0010_0002,
            accepted: true,
        };
        let change = InteractionChange {
            serial: 4,
            slot: InteractionSlot::Captured,
            node: 0,
        };
        rec.on_phase_begin(&begin);
        rec.on_update_summary(&summary);
        rec.on_phase_end(&end);
        rec.on_event_dispatch(&dispatch);
        rec.on_interaction_change(&change);

        assert_eq!(
            events(&rec),
            vec![
                RecordedEvent::PhaseBegin(begin),
                RecordedEvent::UpdateSummary(summary),
                RecordedEvent::PhaseEnd(end),
                RecordedEvent::EventDispatch(dispatch),
                RecordedEvent::InteractionChange(change),
            ]
        );
    }

    #[test]
    fn timestamps_do_not_go_backwards() {
        let mut rec = RecorderSink::new();
        for serial in 0..4 {
            rec.on_phase_begin(&PhaseBeginEvent {
                serial,
                phase: PhaseKind::Draw,
            });
        }
        let stamps: Vec<_> = decode(rec.as_bytes()).map(|r| r.elapsed_nanos).collect();
        assert_eq!(stamps.len(), 4);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "got {stamps:?}");
    }

    #[test]
    fn truncated_record_stops_decoding() {
        let mut rec = RecorderSink::new();
        rec.on_phase_begin(&PhaseBeginEvent {
            serial: 1,
            phase: PhaseKind::Clean,
        });
        rec.on_phase_end(&PhaseEndEvent {
            serial: 1,
            phase: PhaseKind::Clean,
        });
        let bytes = rec.into_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn unknown_tag_stops_decoding() {
        let mut bytes = vec![0xff];
        bytes.extend_from_slice(&0_u64.to_le_bytes());
        assert_eq!(decode(&bytes).count(), 0);
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        assert_eq!(decode(&[]).count(), 0);
    }
}
