// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the user interface pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`UserInterface`](crate::UserInterface) calls at each pipeline stage. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing. When **on**, each
//! method performs a single `Option` branch before dispatching.
//!
//! Events carry a `serial` instead of a timestamp: the core has no clock, so
//! sinks that want wall-clock time stamp events on arrival.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).
//! - `trace-rich` (implies `trace`): gates [`InteractionChange`] events and
//!   the corresponding `TraceSink` method.

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which pipeline stage is being measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    /// Removal of nodes and everything attached to them.
    Clean,
    /// Visibility, layout, clipping and layer updates.
    Update,
    /// Advancing animators to a new time.
    AdvanceAnimations,
    /// Compositing and drawing all layers.
    Draw,
    /// Dispatching a single input event.
    Event,
}

impl PhaseKind {
    /// Stable numeric code, used by binary recorders.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Clean => 0,
            Self::Update => 1,
            Self::AdvanceAnimations => 2,
            Self::Draw => 3,
            Self::Event => 4,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Clean,
            1 => Self::Update,
            2 => Self::AdvanceAnimations,
            3 => Self::Draw,
            4 => Self::Event,
            _ => return None,
        })
    }
}

/// Which input entry point dispatched an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`UserInterface::pointer_press_event`](crate::UserInterface::pointer_press_event).
    PointerPress,
    /// [`UserInterface::pointer_release_event`](crate::UserInterface::pointer_release_event).
    PointerRelease,
    /// [`UserInterface::pointer_move_event`](crate::UserInterface::pointer_move_event).
    PointerMove,
    /// [`UserInterface::focus_event`](crate::UserInterface::focus_event).
    Focus,
    /// [`UserInterface::key_press_event`](crate::UserInterface::key_press_event).
    KeyPress,
    /// [`UserInterface::key_release_event`](crate::UserInterface::key_release_event).
    KeyRelease,
    /// [`UserInterface::text_input_event`](crate::UserInterface::text_input_event).
    TextInput,
}

impl EventKind {
    /// Stable numeric code, used by binary recorders.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::PointerPress => 0,
            Self::PointerRelease => 1,
            Self::PointerMove => 2,
            Self::Focus => 3,
            Self::KeyPress => 4,
            Self::KeyRelease => 5,
            Self::TextInput => 6,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::PointerPress,
            1 => Self::PointerRelease,
            2 => Self::PointerMove,
            3 => Self::Focus,
            4 => Self::KeyPress,
            5 => Self::KeyRelease,
            6 => Self::TextInput,
            _ => return None,
        })
    }
}

/// Which interaction reference changed.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InteractionSlot {
    /// The node a primary press was accepted on.
    Pressed,
    /// The node receiving all pointer events.
    Captured,
    /// The node under the primary pointer.
    Hovered,
    /// The node receiving key and text input.
    Focused,
}

#[cfg(feature = "trace-rich")]
impl InteractionSlot {
    /// Stable numeric code, used by binary recorders.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Pressed => 0,
            Self::Captured => 1,
            Self::Hovered => 2,
            Self::Focused => 3,
        }
    }

    /// Inverse of [`code`](Self::code).
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Pressed,
            1 => Self::Captured,
            2 => Self::Hovered,
            3 => Self::Focused,
            _ => return None,
        })
    }
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Marks the beginning of a pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseBeginEvent {
    /// Monotonically increasing counter, shared by all events of one user
    /// interface.
    pub serial: u64,
    /// Which stage is starting.
    pub phase: PhaseKind,
}

/// Marks the end of a pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseEndEvent {
    /// Serial of the matching [`PhaseBeginEvent`].
    pub serial: u64,
    /// Which stage is ending.
    pub phase: PhaseKind,
}

/// Emitted at the end of every `update()` that did any work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Serial of the update phase.
    pub serial: u64,
    /// Raw [`UserInterfaceStates`](crate::UserInterfaceStates) bits that
    /// were handled.
    pub states: u16,
    /// Nodes that are part of a visible hierarchy.
    pub visible_nodes: u32,
    /// Visible nodes that weren't culled by clipping.
    pub drawn_nodes: u32,
    /// Visible top-level subtrees.
    pub top_level_count: u32,
    /// Layers whose update hook was called.
    pub layers_updated: u32,
    /// Layout passes that were run.
    pub layout_passes: u32,
}

/// Emitted after an input event was dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventDispatch {
    /// Serial of the event phase.
    pub serial: u64,
    /// Which entry point was called.
    pub kind: EventKind,
    /// Raw [`NodeHandle`](crate::NodeHandle) bits of the node that received
    /// the event, or zero if none did.
    pub node: u32,
    /// Whether any data accepted the event.
    pub accepted: bool,
}

/// An interaction reference was set or reset.
#[cfg(feature = "trace-rich")]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InteractionChange {
    /// Serial of the surrounding phase.
    pub serial: u64,
    /// Which reference changed.
    pub slot: InteractionSlot,
    /// Raw [`NodeHandle`](crate::NodeHandle) bits of the new node, zero if
    /// reset.
    pub node: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the user interface.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called at the beginning of a pipeline stage.
    fn on_phase_begin(&mut self, e: &PhaseBeginEvent) {
        _ = e;
    }

    /// Called at the end of a pipeline stage.
    fn on_phase_end(&mut self, e: &PhaseEndEvent) {
        _ = e;
    }

    /// Called with a summary of a finished update.
    fn on_update_summary(&mut self, s: &UpdateSummary) {
        _ = s;
    }

    /// Called after an input event was dispatched.
    fn on_event_dispatch(&mut self, e: &EventDispatch) {
        _ = e;
    }

    /// Called when an interaction reference changes (requires `trace-rich`
    /// feature).
    #[cfg(feature = "trace-rich")]
    fn on_interaction_change(&mut self, e: &InteractionChange) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink, if any.
    #[inline]
    #[must_use]
    pub fn new(sink: Option<&'a mut dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::new(None)
    }

    /// Emits a [`PhaseBeginEvent`].
    #[inline]
    pub fn phase_begin(&mut self, e: &PhaseBeginEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_begin(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`PhaseEndEvent`].
    #[inline]
    pub fn phase_end(&mut self, e: &PhaseEndEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_phase_end(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`UpdateSummary`].
    #[inline]
    pub fn update_summary(&mut self, s: &UpdateSummary) {
        #[cfg(feature = "trace")]
        if let Some(sink) = &mut self.sink {
            sink.on_update_summary(s);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = s;
        }
    }

    /// Emits an [`EventDispatch`].
    #[inline]
    pub fn event_dispatch(&mut self, e: &EventDispatch) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_event_dispatch(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`InteractionChange`] (requires `trace-rich` feature).
    #[cfg(feature = "trace-rich")]
    #[inline]
    pub fn interaction_change(&mut self, e: &InteractionChange) {
        if let Some(s) = &mut self.sink {
            s.on_interaction_change(e);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
