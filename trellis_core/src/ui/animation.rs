// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation advance.

use alloc::vec::Vec;

use crate::animator::{
    AnimationUpdate, AnimatorInstance, AnimatorKind, NodeAnimationTarget, NodeAnimations,
};
use crate::state::UserInterfaceStates;
use crate::time::Nanoseconds;
use crate::trace::PhaseKind;

use super::UserInterface;

const KIND_ORDER: [AnimatorKind; 4] = [
    AnimatorKind::Generic,
    AnimatorKind::Node,
    AnimatorKind::Data,
    AnimatorKind::Style,
];

impl UserInterface {
    /// Advances all animators to `time`.
    ///
    /// Generic animators run first, then node, data and style animators,
    /// each group in creation order. Node animator results are applied to
    /// the dirty state right away, so a node marked for removal is gone
    /// before data animators run. Played out animations without
    /// [`KEEP_ONCE_PLAYED`](crate::AnimationFlags::KEEP_ONCE_PLAYED) are
    /// removed.
    ///
    /// Calls [`clean`](Self::clean) first.
    ///
    /// # Panics
    ///
    /// Panics if `time` is less than [`animation_time`](Self::animation_time).
    pub fn advance_animations(&mut self, time: Nanoseconds) {
        assert!(
            time >= self.animation_time,
            "UserInterface::advance_animations(): expected a time at least {:?} but got {time:?}",
            self.animation_time
        );
        self.clean();

        if self
            .state()
            .contains(UserInterfaceStates::NEEDS_ANIMATION_ADVANCE)
        {
            let serial = self.begin_phase(PhaseKind::AdvanceAnimations);
            let mut active = Vec::new();
            let mut factors = Vec::new();
            let mut remove = Vec::new();
            let mut node_remove = Vec::new();
            let mut advanced = 0_usize;
            let ids = self.animators.ordered_ids();

            for kind in KIND_ORDER {
                for &id in &ids {
                    let Some(instance) = self.animators.instance_mut(id) else {
                        continue;
                    };
                    if instance.kind() != kind {
                        continue;
                    }
                    let core = instance.animator_mut().core_mut();
                    if core.state().is_empty() {
                        continue;
                    }
                    core.update(time, &mut active, &mut factors, &mut remove);
                    if !active.is_empty() {
                        advanced += 1;
                        let update = AnimationUpdate {
                            time,
                            active: &active,
                            factors: &factors,
                        };
                        match &mut *instance {
                            AnimatorInstance::Generic(animator) => animator.advance(&update),
                            AnimatorInstance::Node(animator) => {
                                node_remove.clear();
                                node_remove.resize(self.nodes.parent.len(), false);
                                let mut target = NodeAnimationTarget {
                                    offsets: &mut self.nodes.offset,
                                    sizes: &mut self.nodes.size,
                                    opacities: &mut self.nodes.opacity,
                                    flags: &mut self.nodes.flags,
                                    remove: &mut node_remove,
                                };
                                let changed = animator.advance(&update, &mut target);
                                if changed.contains(NodeAnimations::OFFSET_SIZE) {
                                    self.state |= UserInterfaceStates::NEEDS_LAYOUT_UPDATE;
                                }
                                if changed.contains(NodeAnimations::OPACITY) {
                                    self.state |= UserInterfaceStates::NEEDS_NODE_OPACITY_UPDATE;
                                }
                                if changed.contains(NodeAnimations::ENABLED) {
                                    self.state |= UserInterfaceStates::NEEDS_NODE_ENABLED_UPDATE;
                                }
                                if changed.contains(NodeAnimations::CLIP) {
                                    self.state |= UserInterfaceStates::NEEDS_NODE_CLIP_UPDATE;
                                }
                                if changed.contains(NodeAnimations::REMOVAL) {
                                    for (node, _) in
                                        node_remove.iter().enumerate().filter(|&(_, r)| *r)
                                    {
                                        #[expect(
                                            clippy::cast_possible_truncation,
                                            reason = "node count is bounded by 1 << DATA_ID_BITS"
                                        )]
                                        let node = node as u32;
                                        if self.nodes.slots.is_occupied(node) {
                                            self.nodes.remove(node);
                                            self.state |= UserInterfaceStates::NEEDS_NODE_CLEAN;
                                        }
                                    }
                                }
                            }
                            AnimatorInstance::Data(animator) => {
                                let layer = animator.core().layer();
                                if let Some(layer) = self.layers.instance_mut(layer.id()) {
                                    animator.advance(&update, &mut **layer);
                                }
                            }
                            AnimatorInstance::Style(animator) => {
                                let layer = animator.core().layer();
                                if let Some(layer) = self.layers.instance_mut(layer.id()) {
                                    animator.advance(&update, &mut **layer);
                                }
                            }
                        }
                    }
                    if !remove.is_empty() {
                        let animator = instance.animator_mut();
                        animator.core_mut().remove_ids(&remove);
                        animator.clean(&remove);
                    }
                }
            }

            tracing::debug!(?time, advanced, "advanced animations");
            self.end_phase(serial, PhaseKind::AdvanceAnimations);
        }

        self.animation_time = time;
    }
}
