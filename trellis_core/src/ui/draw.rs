// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drawing.

use crate::layer::{LayerDraw, LayerFeatures};
use crate::renderer::{Renderer, RendererDrawStates, RendererTargetState};
use crate::trace::PhaseKind;

use super::UserInterface;

/// Issues a renderer transition unless the renderer is already there.
fn transition(
    renderer: &mut dyn Renderer,
    current: &mut (RendererTargetState, RendererDrawStates),
    target: RendererTargetState,
    states: RendererDrawStates,
) {
    if *current != (target, states) {
        renderer.transition(target, states);
        *current = (target, states);
    }
}

fn draw_states(features: LayerFeatures) -> RendererDrawStates {
    let mut states = RendererDrawStates::empty();
    if features.contains(LayerFeatures::DRAW_USES_BLENDING) {
        states |= RendererDrawStates::BLENDING;
    }
    if features.contains(LayerFeatures::DRAW_USES_SCISSOR) {
        states |= RendererDrawStates::SCISSOR;
    }
    states
}

impl UserInterface {
    /// Draws the user interface.
    ///
    /// Calls [`update`](Self::update) first. Top-level subtrees are drawn
    /// back to front, and for each of them every layer with
    /// [`LayerFeatures::DRAW`] draws its data from that subtree, again back
    /// to front. The renderer goes through
    /// [`Initial`](RendererTargetState::Initial), then
    /// [`Composite`](RendererTargetState::Composite) before each compositing
    /// layer and [`Draw`](RendererTargetState::Draw) before each drawing
    /// one, and ends in [`Final`](RendererTargetState::Final).
    ///
    /// # Panics
    ///
    /// Panics if no renderer is set.
    pub fn draw(&mut self) {
        self.update();
        assert!(
            self.renderer.is_some(),
            "UserInterface::draw(): no renderer instance set"
        );
        let serial = self.begin_phase(PhaseKind::Draw);
        let layer_ids = self.layers.ordered_ids();
        let mut draws = 0_usize;

        if let Some(renderer) = self.renderer.as_deref_mut() {
            let state = &mut self.renderer_state;
            transition(
                renderer,
                state,
                RendererTargetState::Initial,
                RendererDrawStates::empty(),
            );
            for t in 0..self.frame.visible.top_level.len() {
                for &layer_id in &layer_ids {
                    let Some(layer) = self.layers.instance_mut(layer_id) else {
                        continue;
                    };
                    let features = layer.core().features();
                    if !features.contains(LayerFeatures::DRAW) {
                        continue;
                    }
                    let Some(range) = self
                        .frame
                        .layer_ranges
                        .get(layer_id as usize)
                        .and_then(|ranges| ranges.get(t))
                        .cloned()
                    else {
                        continue;
                    };
                    if range.is_empty() {
                        continue;
                    }
                    let draw = LayerDraw {
                        data_ids: &self.frame.layer_data[layer_id as usize],
                        range,
                        nodes: self.frame.node_view(),
                    };
                    if features.contains(LayerFeatures::COMPOSITE) {
                        transition(
                            renderer,
                            state,
                            RendererTargetState::Composite,
                            RendererDrawStates::empty(),
                        );
                        layer.composite(renderer, &draw);
                    }
                    transition(
                        renderer,
                        state,
                        RendererTargetState::Draw,
                        draw_states(features),
                    );
                    layer.draw(renderer, &draw);
                    draws += 1;
                }
            }
            transition(
                renderer,
                state,
                RendererTargetState::Final,
                RendererDrawStates::empty(),
            );
        }

        tracing::trace!(draws, "drew user interface");
        self.end_phase(serial, PhaseKind::Draw);
    }
}
