// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Removal cascade.
//!
//! Removing a node only invalidates its handle. [`UserInterface::clean`]
//! then frees the whole subtree and, in order:
//!
//! 1. drops layer data, layouts and node animations attached to freed nodes,
//! 2. drops data animations attached to data freed in step 1 or removed
//!    directly from a layer.

use crate::animator::AnimatorFeatures;
use crate::layer::LayerStates;
use crate::state::UserInterfaceStates;
use crate::trace::PhaseKind;

use super::UserInterface;

impl UserInterface {
    /// Frees removed nodes together with everything attached to them.
    ///
    /// Does nothing unless [`state`](Self::state) contains
    /// [`NEEDS_NODE_CLEAN`](UserInterfaceStates::NEEDS_NODE_CLEAN) or
    /// [`NEEDS_DATA_CLEAN`](UserInterfaceStates::NEEDS_DATA_CLEAN). Called
    /// implicitly by [`update`](Self::update).
    pub fn clean(&mut self) {
        let state = self.state();
        if !state.contains(UserInterfaceStates::NEEDS_DATA_CLEAN) {
            return;
        }
        let serial = self.begin_phase(PhaseKind::Clean);

        if state.contains(UserInterfaceStates::NEEDS_NODE_CLEAN) {
            let removed = self.nodes.clean();
            let node_generations = self.nodes.slots.generations();
            let mut data = 0;
            let mut layouts = 0;
            let mut animations = 0;

            for id in self.layers.ordered_ids() {
                let Some(layer) = self.layers.instance_mut(id) else {
                    continue;
                };
                let ids = layer.core_mut().clean_nodes(node_generations);
                if !ids.is_empty() {
                    data += ids.len();
                    layer.clean(&ids);
                }
            }
            for id in self.layouters.ordered_ids() {
                let Some(layouter) = self.layouters.instance_mut(id) else {
                    continue;
                };
                let ids = layouter.core_mut().clean_nodes(node_generations);
                if !ids.is_empty() {
                    layouts += ids.len();
                    layouter.clean(&ids);
                }
            }
            for id in self.animators.ordered_ids() {
                let Some(instance) = self.animators.instance_mut(id) else {
                    continue;
                };
                let animator = instance.animator_mut();
                if !animator
                    .core()
                    .features()
                    .contains(AnimatorFeatures::NODE_ATTACHMENT)
                {
                    continue;
                }
                let ids = animator.core_mut().clean_nodes(node_generations);
                if !ids.is_empty() {
                    animations += ids.len();
                    animator.clean(&ids);
                }
            }
            tracing::debug!(
                nodes = removed.len(),
                data,
                layouts,
                animations,
                "removed node subtrees"
            );
        }

        for layer_id in self.layers.ordered_ids() {
            let Some(layer) = self.layers.instance_mut(layer_id) else {
                continue;
            };
            if !layer.core().state().contains(LayerStates::NEEDS_DATA_CLEAN) {
                continue;
            }
            let handle = layer.core().handle();
            let data_generations = layer.core().generations();
            for id in self.animators.ordered_ids() {
                let Some(instance) = self.animators.instance_mut(id) else {
                    continue;
                };
                let animator = instance.animator_mut();
                let core = animator.core();
                if !core.features().contains(AnimatorFeatures::DATA_ATTACHMENT)
                    || core.layer() != handle
                {
                    continue;
                }
                let ids = animator.core_mut().clean_data(data_generations);
                if !ids.is_empty() {
                    animator.clean(&ids);
                }
            }
            layer.core_mut().clear_state(LayerStates::NEEDS_DATA_CLEAN);
        }

        self.state.remove(
            UserInterfaceStates::NEEDS_NODE_CLEAN.difference(UserInterfaceStates::NEEDS_NODE_UPDATE),
        );
        self.end_phase(serial, PhaseKind::Clean);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use kurbo::Vec2;

    use super::super::testing::{RecordingAnimator, RecordingLayer, RecordingLayouter, ui};
    use super::*;
    use crate::animator::{AnimationFlags, AnimatorCore};
    use crate::handle::{LayerHandle, LayouterHandle, NodeHandle};
    use crate::layer::LayerFeatures;
    use crate::node::NodeFlags;
    use crate::time::Nanoseconds;

    fn node(ui: &mut UserInterface, parent: NodeHandle) -> NodeHandle {
        ui.create_node(parent, Vec2::ZERO, Vec2::new(10.0, 10.0), NodeFlags::empty())
    }

    #[test]
    fn removing_a_node_cascades_to_attachments() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(RecordingLayer::new(layer, LayerFeatures::DRAW));
        let layouter = ui.create_layouter(LayouterHandle::NULL);
        ui.set_layouter_instance(RecordingLayouter::new(layouter));
        let animator = ui.create_animator();
        ui.set_node_animator_instance(RecordingAnimator::new(
            animator,
            AnimatorFeatures::NODE_ATTACHMENT,
        ));

        let root = node(&mut ui, NodeHandle::NULL);
        let child = node(&mut ui, root);
        let grandchild = node(&mut ui, child);
        let other = node(&mut ui, NodeHandle::NULL);

        let data = ui.layer_mut(layer).core_mut().create(grandchild);
        let kept = ui.layer_mut(layer).core_mut().create(other);
        let layout = ui.layouter_mut(layouter).core_mut().add(child);
        let animation = ui.animator_mut(animator).core_mut().create(
            Nanoseconds::ZERO,
            Nanoseconds(10),
            1,
            AnimationFlags::empty(),
        );
        ui.attach_node_animation(grandchild, animation);

        ui.remove_node(root);
        assert!(!ui.is_node_handle_valid(root));
        assert!(ui.is_node_handle_valid(grandchild));
        assert_eq!(ui.node_used_count(), 4);

        ui.clean();
        assert!(!ui.is_node_handle_valid(child));
        assert!(!ui.is_node_handle_valid(grandchild));
        assert_eq!(ui.node_used_count(), 1);
        assert!(!ui.is_data_handle_valid(data));
        assert!(ui.is_data_handle_valid(kept));
        assert!(!ui.is_layout_handle_valid(layout));
        assert!(!ui.is_animation_handle_valid(animation));
        assert_eq!(
            ui.layer_as::<RecordingLayer>(layer).cleaned,
            vec![vec![data.id()]]
        );
        assert_eq!(
            ui.layouter_as::<RecordingLayouter>(layouter).cleaned,
            vec![vec![layout.id()]]
        );
        assert_eq!(
            ui.animator_as::<RecordingAnimator>(animator).cleaned,
            vec![vec![animation.id()]]
        );
        assert!(!ui.state().contains(UserInterfaceStates::NEEDS_DATA_CLEAN));
        assert!(ui.state().contains(UserInterfaceStates::NEEDS_NODE_UPDATE));
    }

    #[test]
    fn removing_data_cascades_to_data_animations() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(RecordingLayer::new(layer, LayerFeatures::ANIMATE_DATA));
        let animator = ui.create_animator();
        let mut core = AnimatorCore::new(animator, AnimatorFeatures::DATA_ATTACHMENT);
        core.set_layer(layer);
        ui.set_data_animator_instance(RecordingAnimator::with_core(core));

        let data = ui.layer_mut(layer).core_mut().create(NodeHandle::NULL);
        let animation = ui.animator_mut(animator).core_mut().create(
            Nanoseconds::ZERO,
            Nanoseconds(10),
            1,
            AnimationFlags::empty(),
        );
        ui.attach_data_animation(data, animation);

        ui.layer_mut(layer).core_mut().remove(data);
        assert!(ui.state().contains(UserInterfaceStates::NEEDS_DATA_CLEAN));
        ui.clean();
        assert!(!ui.is_animation_handle_valid(animation));
        assert!(!ui.state().contains(UserInterfaceStates::NEEDS_DATA_CLEAN));
    }

    #[test]
    fn clean_without_removals_is_a_no_op() {
        let mut ui = ui();
        let a = node(&mut ui, NodeHandle::NULL);
        ui.clean();
        assert!(ui.is_node_handle_valid(a));
        assert!(ui.state().contains(UserInterfaceStates::NEEDS_NODE_UPDATE));
    }

    #[test]
    fn clean_on_clean_interface_is_a_no_op() {
        let mut ui = ui();
        let layer = ui.create_layer(LayerHandle::NULL);
        ui.set_layer_instance(RecordingLayer::new(layer, LayerFeatures::DRAW));
        let root = node(&mut ui, NodeHandle::NULL);
        let child = node(&mut ui, root);
        let kept = node(&mut ui, NodeHandle::NULL);
        let data = ui.layer_mut(layer).core_mut().create(kept);
        ui.remove_node(root);
        ui.update();
        assert_eq!(ui.state(), UserInterfaceStates::empty());
        assert!(!ui.is_node_handle_valid(child));
        let used = ui.node_used_count();

        ui.clean();
        ui.clean();
        assert_eq!(ui.state(), UserInterfaceStates::empty());
        assert_eq!(ui.node_used_count(), used);
        assert!(ui.is_node_handle_valid(kept));
        assert!(ui.is_data_handle_valid(data));
        assert!(ui.layer_as::<RecordingLayer>(layer).cleaned.is_empty());
    }
}
