// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode user interface core.
//!
//! `trellis_core` owns a hierarchy of rectangular nodes and dispatches
//! drawing, layout, animation and input to pluggable layers, layouters and
//! animators. It is `no_std` compatible (with `alloc`). Everything is
//! addressed through generational handles, so a stale handle is detected
//! instead of aliasing a recycled slot.
//!
//! # Architecture
//!
//! Mutations only record what became dirty. The actual work happens in a
//! pipeline that runs lazily, driven by [`UserInterfaceStates`]:
//!
//! ```text
//!   create / remove / set_* ──► UserInterfaceStates
//!                                      │
//!   advance_animations() ──────────────┤
//!                                      ▼
//!   clean() ──► update() ──► visible order, layouts, clip rects,
//!                 │          enabled and opacity, draw lists
//!                 │
//!                 ├──► Layer::update()
//!                 │
//!   events ───────┼──► hit test ──► Layer::*_event()
//!                 │
//!   draw() ───────┴──► Renderer::transition() ──► Layer::draw()
//! ```
//!
//! **[`UserInterface`]**: The owner of all state. Node, layer, layouter and
//! animator lifecycles, the clean/update/draw pipeline and event dispatch.
//!
//! **[`handle`]**: Packed generational handles. Small handles for layers,
//! layouters and animators, data handles for the items they own, and
//! composite handles pairing the two.
//!
//! **[`layer`]**: The [`Layer`](layer::Layer) trait for anything attaching
//! drawable or event-handling data to nodes, with
//! [`LayerCore`](layer::LayerCore) doing the bookkeeping.
//!
//! **[`layouter`]**: The [`Layouter`](layouter::Layouter) trait computing
//! node offsets and sizes, run in dependency order.
//!
//! **[`animator`]**: Time-based animations in four flavors: generic, node,
//! data and style animators.
//!
//! **[`event`]**: Pointer, focus, key and text input events.
//!
//! **[`renderer`]**: The [`Renderer`](renderer::Renderer) trait and the
//! target state transitions issued while drawing.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! pipeline instrumentation, with zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).
//! - `trace-rich` (disabled by default, implies `trace`): Gates interaction
//!   change events for the pressed, captured, hovered and focused nodes.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animator;
pub mod event;
pub mod handle;
pub mod layer;
pub mod layouter;
mod node;
mod registry;
pub mod renderer;
mod slots;
pub mod state;
pub mod time;
pub mod trace;
mod ui;

pub use self::animator::{
    AnimationFlags, AnimationState, Animator, AnimatorCore, AnimatorFeatures, DataAnimator,
    GenericAnimator, NodeAnimator, StyleAnimator,
};
pub use self::event::{
    FocusEvent, Key, KeyEvent, Modifiers, Pointer, PointerEvent, PointerEventSource,
    PointerMoveEvent, Pointers, TextInputEvent, VisibilityLostEvent,
};
pub use self::handle::{
    AnimationHandle, AnimatorDataHandle, AnimatorHandle, DataHandle, LayerDataHandle,
    LayerHandle, LayoutHandle, LayouterDataHandle, LayouterHandle, NodeHandle,
};
pub use self::layer::{Layer, LayerCore, LayerFeatures, LayerStates};
pub use self::layouter::{Layouter, LayouterCore};
pub use self::node::NodeFlags;
pub use self::renderer::{Renderer, RendererDrawStates, RendererTargetState};
pub use self::state::UserInterfaceStates;
pub use self::time::Nanoseconds;
pub use self::ui::UserInterface;
