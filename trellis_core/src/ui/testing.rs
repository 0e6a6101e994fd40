// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording layer, layouter, animator and renderer doubles for the
//! user interface tests.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::{Point, Size, Vec2};

use crate::animator::{
    AnimationUpdate, Animator, AnimatorCore, AnimatorFeatures, DataAnimator, GenericAnimator,
    NodeAnimationTarget, NodeAnimations, NodeAnimator, StyleAnimator,
};
use crate::event::{
    FocusEvent, KeyEvent, PointerEvent, PointerMoveEvent, TextInputEvent, VisibilityLostEvent,
};
use crate::handle::{AnimatorHandle, LayerHandle, LayouterHandle};
use crate::layer::{Layer, LayerCore, LayerDraw, LayerFeatures, LayerStates, LayerUpdate};
use crate::layouter::{Layouter, LayouterCore};
use crate::renderer::{Renderer, RendererDrawStates, RendererTargetState};
use crate::time::Nanoseconds;

use super::UserInterface;

/// A 100x100 user interface drawn into a 200x200 framebuffer.
pub(crate) fn ui() -> UserInterface {
    UserInterface::new(Size::new(100.0, 100.0), Size::new(100.0, 100.0), (200, 200))
}

/// Hook calls shared between doubles so their relative order is visible.
pub(crate) type Log = Rc<RefCell<Vec<Call>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    Update(LayerStates, Vec<u32>),
    Composite(LayerHandle, Vec<u32>),
    Draw(LayerHandle, Vec<u32>),
    Transition(RendererTargetState, RendererDrawStates),
    Press(u32, Point),
    Release(u32, Point),
    TapOrClick(u32, Point),
    Move(u32, Point),
    Enter(u32),
    Leave(u32),
    Focus(u32),
    Blur(u32),
    KeyPress(u32, Option<Point>),
    KeyRelease(u32, Option<Point>),
    TextInput(u32, String),
    VisibilityLost(u32, bool, bool),
    Advance(AnimatorHandle, Nanoseconds, Vec<u32>),
}

/// Layer logging every hook call.
///
/// Accepts all events unless `accept` is cleared, and sets `capture` on
/// press and move events if it's set.
#[derive(Debug)]
pub(crate) struct RecordingLayer {
    core: LayerCore,
    log: Log,
    pub(crate) size: Option<(Size, (u32, u32))>,
    pub(crate) cleaned: Vec<Vec<u32>>,
    pub(crate) accept: bool,
    pub(crate) capture: Option<bool>,
}

impl RecordingLayer {
    pub(crate) fn new(handle: LayerHandle, features: LayerFeatures) -> Self {
        Self {
            core: LayerCore::new(handle, features),
            log: log(),
            size: None,
            cleaned: Vec::new(),
            accept: true,
            capture: None,
        }
    }

    pub(crate) fn with_log(mut self, log: Log) -> Self {
        self.log = log;
        self
    }

    fn push(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl Layer for RecordingLayer {
    fn core(&self) -> &LayerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayerCore {
        &mut self.core
    }

    fn set_size(&mut self, size: Size, framebuffer_size: (u32, u32)) {
        self.size = Some((size, framebuffer_size));
    }

    fn clean(&mut self, removed: &[u32]) {
        self.cleaned.push(removed.to_vec());
    }

    fn update(&mut self, states: LayerStates, update: &LayerUpdate<'_>) {
        self.push(Call::Update(states, update.data_ids.to_vec()));
    }

    fn composite(&mut self, _: &mut dyn Renderer, draw: &LayerDraw<'_>) {
        let ids = draw.data_ids[draw.range.clone()].to_vec();
        self.push(Call::Composite(self.core.handle(), ids));
    }

    fn draw(&mut self, _: &mut dyn Renderer, draw: &LayerDraw<'_>) {
        let ids = draw.data_ids[draw.range.clone()].to_vec();
        self.push(Call::Draw(self.core.handle(), ids));
    }

    fn pointer_press_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        self.push(Call::Press(data_id, event.position()));
        if let Some(capture) = self.capture {
            event.set_captured(capture);
        }
        event.set_accepted(self.accept);
    }

    fn pointer_release_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        self.push(Call::Release(data_id, event.position()));
        if let Some(capture) = self.capture {
            event.set_captured(capture);
        }
        event.set_accepted(self.accept);
    }

    fn pointer_tap_or_click_event(&mut self, data_id: u32, event: &mut PointerEvent) {
        self.push(Call::TapOrClick(data_id, event.position()));
        event.set_accepted(self.accept);
    }

    fn pointer_move_event(&mut self, data_id: u32, event: &mut PointerMoveEvent) {
        self.push(Call::Move(data_id, event.position()));
        if let Some(capture) = self.capture {
            event.set_captured(capture);
        }
        event.set_accepted(self.accept);
    }

    fn pointer_enter_event(&mut self, data_id: u32, _: &mut PointerMoveEvent) {
        self.push(Call::Enter(data_id));
    }

    fn pointer_leave_event(&mut self, data_id: u32, _: &mut PointerMoveEvent) {
        self.push(Call::Leave(data_id));
    }

    fn focus_event(&mut self, data_id: u32, event: &mut FocusEvent) {
        self.push(Call::Focus(data_id));
        event.set_accepted(self.accept);
    }

    fn blur_event(&mut self, data_id: u32, _: &mut FocusEvent) {
        self.push(Call::Blur(data_id));
    }

    fn key_press_event(&mut self, data_id: u32, event: &mut KeyEvent) {
        self.push(Call::KeyPress(data_id, event.position()));
        event.set_accepted(self.accept);
    }

    fn key_release_event(&mut self, data_id: u32, event: &mut KeyEvent) {
        self.push(Call::KeyRelease(data_id, event.position()));
        event.set_accepted(self.accept);
    }

    fn text_input_event(&mut self, data_id: u32, event: &mut TextInputEvent) {
        self.push(Call::TextInput(data_id, String::from(event.text())));
        event.set_accepted(self.accept);
    }

    fn visibility_lost_event(&mut self, data_id: u32, event: &mut VisibilityLostEvent) {
        self.push(Call::VisibilityLost(
            data_id,
            event.is_node_pressed(),
            event.is_node_hovered(),
        ));
    }
}

/// Layouter recording its update calls as `(layout ids, top-level ids)`.
///
/// With `offset` set, every laid out node gets that offset.
#[derive(Debug)]
pub(crate) struct RecordingLayouter {
    core: LayouterCore,
    pub(crate) size: Option<Size>,
    pub(crate) cleaned: Vec<Vec<u32>>,
    pub(crate) calls: Vec<(Vec<u32>, Vec<u32>)>,
    pub(crate) offset: Option<Vec2>,
}

impl RecordingLayouter {
    pub(crate) fn new(handle: LayouterHandle) -> Self {
        Self {
            core: LayouterCore::new(handle),
            size: None,
            cleaned: Vec::new(),
            calls: Vec::new(),
            offset: None,
        }
    }
}

impl Layouter for RecordingLayouter {
    fn core(&self) -> &LayouterCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut LayouterCore {
        &mut self.core
    }

    fn set_size(&mut self, size: Size) {
        self.size = Some(size);
    }

    fn clean(&mut self, removed: &[u32]) {
        self.cleaned.push(removed.to_vec());
    }

    fn update(
        &mut self,
        layout_ids: &[u32],
        top_level_layout_ids: &[u32],
        node_offsets: &mut [Vec2],
        _node_sizes: &mut [Vec2],
    ) {
        self.calls
            .push((layout_ids.to_vec(), top_level_layout_ids.to_vec()));
        if let Some(offset) = self.offset {
            for &id in layout_ids {
                let node = self.core.nodes()[id as usize];
                node_offsets[node.id() as usize] = offset;
            }
        }
    }
}

/// Animator usable as any of the four kinds.
///
/// As a node animator it sets the opacity of attached nodes to the
/// animation factor, and with `remove_nodes` marks them for removal once
/// the factor reaches one. As a data or style animator it marks the layer
/// data as needing an update.
#[derive(Debug)]
pub(crate) struct RecordingAnimator {
    core: AnimatorCore,
    log: Log,
    pub(crate) cleaned: Vec<Vec<u32>>,
    pub(crate) remove_nodes: bool,
}

impl RecordingAnimator {
    pub(crate) fn new(handle: AnimatorHandle, features: AnimatorFeatures) -> Self {
        Self::with_core(AnimatorCore::new(handle, features))
    }

    pub(crate) fn with_core(core: AnimatorCore) -> Self {
        Self {
            core,
            log: log(),
            cleaned: Vec::new(),
            remove_nodes: false,
        }
    }

    pub(crate) fn with_log(mut self, log: Log) -> Self {
        self.log = log;
        self
    }

    fn record(&self, update: &AnimationUpdate<'_>) {
        self.log.borrow_mut().push(Call::Advance(
            self.core.handle(),
            update.time,
            update.active.to_vec(),
        ));
    }
}

impl Animator for RecordingAnimator {
    fn core(&self) -> &AnimatorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut AnimatorCore {
        &mut self.core
    }

    fn clean(&mut self, removed: &[u32]) {
        self.cleaned.push(removed.to_vec());
    }
}

impl GenericAnimator for RecordingAnimator {
    fn advance(&mut self, update: &AnimationUpdate<'_>) {
        self.record(update);
    }
}

impl NodeAnimator for RecordingAnimator {
    fn advance(
        &mut self,
        update: &AnimationUpdate<'_>,
        target: &mut NodeAnimationTarget<'_>,
    ) -> NodeAnimations {
        self.record(update);
        let mut changed = NodeAnimations::empty();
        for &id in update.active {
            let node = self.core.node_of(id);
            if node.is_null() {
                continue;
            }
            let factor = update.factors[id as usize];
            target.opacities[node.id() as usize] = factor;
            changed |= NodeAnimations::OPACITY;
            if self.remove_nodes && factor >= 1.0 {
                target.remove[node.id() as usize] = true;
                changed |= NodeAnimations::REMOVAL;
            }
        }
        changed
    }
}

impl DataAnimator for RecordingAnimator {
    fn advance(&mut self, update: &AnimationUpdate<'_>, layer: &mut dyn Layer) {
        self.record(update);
        layer
            .core_mut()
            .set_needs_update(LayerStates::NEEDS_DATA_UPDATE);
    }
}

impl StyleAnimator for RecordingAnimator {
    fn advance(&mut self, update: &AnimationUpdate<'_>, layer: &mut dyn Layer) {
        self.record(update);
        layer
            .core_mut()
            .set_needs_update(LayerStates::NEEDS_COMMON_DATA_UPDATE);
    }
}

/// Renderer logging framebuffer setups and transitions.
#[derive(Debug)]
pub(crate) struct RecordingRenderer {
    log: Log,
    pub(crate) framebuffers: Vec<(u32, u32)>,
}

impl RecordingRenderer {
    pub(crate) fn new(log: Log) -> Self {
        Self {
            log,
            framebuffers: Vec::new(),
        }
    }
}

impl Renderer for RecordingRenderer {
    fn setup_framebuffers(&mut self, size: (u32, u32)) {
        self.framebuffers.push(size);
    }

    fn transition(&mut self, target: RendererTargetState, states: RendererDrawStates) {
        self.log
            .borrow_mut()
            .push(Call::Transition(target, states));
    }
}
