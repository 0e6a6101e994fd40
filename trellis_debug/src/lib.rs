// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording, pretty-printing, and Chrome trace export for trellis
//! diagnostics.
//!
//! This crate provides [`TraceSink`](trellis_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from recorded
//!   bytes.
//!
//! The core has no clock, so the recorder stamps each event with the time
//! elapsed since it was created.

pub mod chrome;
pub mod pretty;
pub mod recorder;
