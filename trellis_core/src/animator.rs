// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animators: time-based interpolation of node, data and style properties.
//!
//! A concrete animator embeds an [`AnimatorCore`] that owns the timeline of
//! every animation: when it started, how long one iteration takes, how many
//! times it repeats and whether it's paused or stopped. On each
//! [`UserInterface::advance_animations`](crate::UserInterface::advance_animations)
//! the core works out which animations are active and their interpolation
//! factors, and the animator applies them through one of the kind-specific
//! traits:
//!
//! - [`GenericAnimator`] touches nothing the user interface knows about.
//! - [`NodeAnimator`] writes node offsets, sizes, opacities and flags, and
//!   can schedule nodes for removal.
//! - [`DataAnimator`] animates data of one layer with
//!   [`LayerFeatures::ANIMATE_DATA`](crate::LayerFeatures::ANIMATE_DATA).
//! - [`StyleAnimator`] animates styles of one layer with
//!   [`LayerFeatures::ANIMATE_STYLES`](crate::LayerFeatures::ANIMATE_STYLES).

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use bitflags::bitflags;
use kurbo::Vec2;

use crate::handle::{
    AnimationHandle, AnimatorDataHandle, AnimatorHandle, DATA_GENERATION_BITS, DATA_ID_BITS,
    DataHandle, LayerDataHandle, LayerHandle, NodeHandle,
};
use crate::layer::Layer;
use crate::node::NodeFlags;
use crate::slots::Slots;
use crate::time::Nanoseconds;

bitflags! {
    /// What animations of an animator can be attached to.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AnimatorFeatures: u8 {
        /// Animations can be attached to nodes and are removed with them.
        const NODE_ATTACHMENT = 1 << 0;
        /// Animations can be attached to data of one layer and are removed
        /// with them.
        const DATA_ATTACHMENT = 1 << 1;
    }
}

bitflags! {
    /// Pending work of an animator.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AnimatorStates: u8 {
        /// Some animations are scheduled, playing or paused.
        const NEEDS_ADVANCE = 1 << 0;
    }
}

bitflags! {
    /// Per-animation behavior flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AnimationFlags: u8 {
        /// Don't remove the animation once it stops.
        const KEEP_ONCE_PLAYED = 1 << 0;
    }
}

bitflags! {
    /// Node properties a [`NodeAnimator`] changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeAnimations: u8 {
        /// Offsets or sizes.
        const OFFSET_SIZE = 1 << 0;
        /// Opacities.
        const OPACITY = 1 << 1;
        /// Event or disabled flags.
        const ENABLED = 1 << 2;
        /// Clip flags.
        const CLIP = 1 << 3;
        /// Some nodes were marked for removal.
        const REMOVAL = 1 << 4;
    }
}

/// Where an animation is on its timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationState {
    /// Start time is in the future.
    Scheduled,
    /// Running.
    Playing,
    /// Paused at some point of its timeline.
    Paused,
    /// Played out or explicitly stopped.
    Stopped,
}

#[derive(Clone, Copy, Debug)]
struct Animation {
    started: Nanoseconds,
    duration: Nanoseconds,
    repeat_count: u32,
    paused: Nanoseconds,
    stopped: Nanoseconds,
    flags: AnimationFlags,
    node: NodeHandle,
    data: LayerDataHandle,
}

impl Animation {
    const EMPTY: Self = Self {
        started: Nanoseconds::ZERO,
        duration: Nanoseconds::ZERO,
        repeat_count: 0,
        paused: Nanoseconds::MAX,
        stopped: Nanoseconds::MAX,
        flags: AnimationFlags::empty(),
        node: NodeHandle::NULL,
        data: LayerDataHandle::NULL,
    };

    fn end(&self) -> Nanoseconds {
        if self.repeat_count == 0 {
            Nanoseconds::MAX
        } else {
            self.started + self.duration * i64::from(self.repeat_count)
        }
    }

    fn state_at(&self, time: Nanoseconds) -> AnimationState {
        if time >= self.stopped {
            return AnimationState::Stopped;
        }
        if time < self.started {
            return AnimationState::Scheduled;
        }
        let end = self.end();
        if time >= self.paused {
            return if self.paused >= end {
                AnimationState::Stopped
            } else {
                AnimationState::Paused
            };
        }
        if time >= end {
            AnimationState::Stopped
        } else {
            AnimationState::Playing
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "factors are in 0..=1, f32 precision is plenty"
    )]
    fn factor_at(&self, time: Nanoseconds, state: AnimationState) -> f32 {
        let at = match state {
            AnimationState::Scheduled => return 0.0,
            AnimationState::Stopped => return 1.0,
            AnimationState::Paused => self.paused,
            AnimationState::Playing => time,
        };
        let elapsed = (at - self.started).get().max(0);
        let duration = self.duration.get();
        ((elapsed % duration) as f64 / duration as f64) as f32
    }
}

/// Timelines and attachments of an animator's animations.
#[derive(Debug)]
pub struct AnimatorCore {
    handle: AnimatorHandle,
    features: AnimatorFeatures,
    layer: LayerHandle,
    state: AnimatorStates,
    time: Nanoseconds,
    slots: Slots,
    animations: Vec<Animation>,
}

impl AnimatorCore {
    /// Creates the core of an animator with a handle returned from
    /// [`UserInterface::create_animator`](crate::UserInterface::create_animator).
    ///
    /// # Panics
    ///
    /// Panics if `handle` is Null.
    #[must_use]
    pub fn new(handle: AnimatorHandle, features: AnimatorFeatures) -> Self {
        assert!(!handle.is_null(), "AnimatorCore::new(): handle is null");
        Self {
            handle,
            features,
            layer: LayerHandle::NULL,
            state: AnimatorStates::empty(),
            time: Nanoseconds::ZERO,
            slots: Slots::new(DATA_ID_BITS, DATA_GENERATION_BITS),
            animations: Vec::new(),
        }
    }

    /// Handle of the animator.
    #[must_use]
    pub fn handle(&self) -> AnimatorHandle {
        self.handle
    }

    /// What animations can be attached to.
    #[must_use]
    pub fn features(&self) -> AnimatorFeatures {
        self.features
    }

    /// Pending work.
    #[must_use]
    pub fn state(&self) -> AnimatorStates {
        self.state
    }

    /// Time of the last advance.
    #[must_use]
    pub fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Layer whose data animations are attached to, Null if not set.
    #[must_use]
    pub fn layer(&self) -> LayerHandle {
        self.layer
    }

    /// Sets the layer whose data animations are attached to.
    ///
    /// # Panics
    ///
    /// Panics if the animator doesn't have
    /// [`AnimatorFeatures::DATA_ATTACHMENT`], if `layer` is Null or if a
    /// layer was already set.
    pub fn set_layer(&mut self, layer: LayerHandle) {
        assert!(
            self.features.contains(AnimatorFeatures::DATA_ATTACHMENT),
            "AnimatorCore::set_layer(): feature {:?} not supported",
            AnimatorFeatures::DATA_ATTACHMENT
        );
        assert!(!layer.is_null(), "AnimatorCore::set_layer(): layer is null");
        assert!(
            self.layer.is_null(),
            "AnimatorCore::set_layer(): layer already set to {:?}",
            self.layer
        );
        self.layer = layer;
    }

    /// Number of animation slots allocated so far.
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Number of live animations.
    #[must_use]
    pub fn used_count(&self) -> u32 {
        self.slots.used_count()
    }

    /// Whether `handle` refers to a live animation of this animator.
    #[must_use]
    pub fn is_handle_valid(&self, handle: AnimationHandle) -> bool {
        handle.animator() == self.handle && self.is_local_handle_valid(handle.data())
    }

    /// Whether `handle` refers to a live animation of this animator.
    #[must_use]
    pub fn is_local_handle_valid(&self, handle: AnimatorDataHandle) -> bool {
        self.slots.is_valid(handle.id(), handle.generation())
    }

    /// Creates an animation starting at `start`, with one iteration lasting
    /// `duration`, repeated `repeat_count` times or forever if zero.
    ///
    /// # Panics
    ///
    /// Panics if `duration` isn't positive.
    pub fn create(
        &mut self,
        start: Nanoseconds,
        duration: Nanoseconds,
        repeat_count: u32,
        flags: AnimationFlags,
    ) -> AnimationHandle {
        assert!(
            duration > Nanoseconds::ZERO,
            "AnimatorCore::create(): expected positive duration, got {duration:?}"
        );
        let (id, generation) = self.slots.create("AnimatorCore::create()");
        let animation = Animation {
            started: start,
            duration,
            repeat_count,
            flags,
            ..Animation::EMPTY
        };
        if id as usize == self.animations.len() {
            self.animations.push(animation);
        } else {
            self.animations[id as usize] = animation;
        }
        self.state |= AnimatorStates::NEEDS_ADVANCE;
        AnimationHandle::new(self.handle, AnimatorDataHandle::new(id, generation))
    }

    /// Removes an animation.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove(&mut self, handle: AnimationHandle) {
        assert!(
            self.is_handle_valid(handle),
            "AnimatorCore::remove(): invalid handle {handle:?}"
        );
        self.remove_id(handle.id());
    }

    fn remove_id(&mut self, id: u32) {
        self.animations[id as usize] = Animation::EMPTY;
        self.slots.remove(id);
    }

    fn get(&self, handle: AnimationHandle, what: &str) -> &Animation {
        assert!(
            self.is_handle_valid(handle),
            "AnimatorCore::{what}(): invalid handle {handle:?}"
        );
        &self.animations[handle.id() as usize]
    }

    fn get_mut(&mut self, handle: AnimationHandle, what: &str) -> &mut Animation {
        assert!(
            self.is_handle_valid(handle),
            "AnimatorCore::{what}(): invalid handle {handle:?}"
        );
        &mut self.animations[handle.id() as usize]
    }

    /// Start time of the animation.
    #[must_use]
    pub fn started(&self, handle: AnimationHandle) -> Nanoseconds {
        self.get(handle, "started").started
    }

    /// Duration of one iteration.
    #[must_use]
    pub fn duration(&self, handle: AnimationHandle) -> Nanoseconds {
        self.get(handle, "duration").duration
    }

    /// Iteration count, zero for repeating forever.
    #[must_use]
    pub fn repeat_count(&self, handle: AnimationHandle) -> u32 {
        self.get(handle, "repeat_count").repeat_count
    }

    /// Behavior flags.
    #[must_use]
    pub fn flags(&self, handle: AnimationHandle) -> AnimationFlags {
        self.get(handle, "flags").flags
    }

    /// Replaces behavior flags.
    pub fn set_flags(&mut self, handle: AnimationHandle, flags: AnimationFlags) {
        self.get_mut(handle, "set_flags").flags = flags;
    }

    /// Node the animation is attached to, Null if none.
    #[must_use]
    pub fn node(&self, handle: AnimationHandle) -> NodeHandle {
        self.get(handle, "node").node
    }

    /// Data the animation is attached to, Null if none.
    #[must_use]
    pub fn data(&self, handle: AnimationHandle) -> DataHandle {
        let data = self.get(handle, "data").data;
        if data.is_null() {
            DataHandle::NULL
        } else {
            DataHandle::new(self.layer, data)
        }
    }

    /// Node attached to the animation with the given id, as listed in
    /// [`AnimationUpdate::active`]. Null for free slots.
    #[must_use]
    pub fn node_of(&self, id: u32) -> NodeHandle {
        self.animations
            .get(id as usize)
            .map_or(NodeHandle::NULL, |animation| animation.node)
    }

    /// Local data handle attached to the animation with the given id, as
    /// listed in [`AnimationUpdate::active`]. Null for free slots.
    #[must_use]
    pub fn data_of(&self, id: u32) -> LayerDataHandle {
        self.animations
            .get(id as usize)
            .map_or(LayerDataHandle::NULL, |animation| animation.data)
    }

    /// Attaches the animation to `node`, or detaches it if Null.
    ///
    /// # Panics
    ///
    /// Panics if the animator doesn't have
    /// [`AnimatorFeatures::NODE_ATTACHMENT`] or `handle` isn't valid.
    pub fn attach_node(&mut self, handle: AnimationHandle, node: NodeHandle) {
        assert!(
            self.features.contains(AnimatorFeatures::NODE_ATTACHMENT),
            "AnimatorCore::attach_node(): feature {:?} not supported",
            AnimatorFeatures::NODE_ATTACHMENT
        );
        self.get_mut(handle, "attach_node").node = node;
    }

    /// Attaches the animation to data of the animator's layer, or detaches
    /// it if Null.
    ///
    /// # Panics
    ///
    /// Panics if the animator doesn't have
    /// [`AnimatorFeatures::DATA_ATTACHMENT`], no layer was set or `handle`
    /// isn't valid.
    pub fn attach_data(&mut self, handle: AnimationHandle, data: LayerDataHandle) {
        assert!(
            self.features.contains(AnimatorFeatures::DATA_ATTACHMENT),
            "AnimatorCore::attach_data(): feature {:?} not supported",
            AnimatorFeatures::DATA_ATTACHMENT
        );
        assert!(
            !self.layer.is_null(),
            "AnimatorCore::attach_data(): no layer set"
        );
        self.get_mut(handle, "attach_data").data = data;
    }

    /// Starts or resumes the animation at `time`.
    ///
    /// A paused animation continues from where it was paused, anything else
    /// restarts from the beginning.
    pub fn play(&mut self, handle: AnimationHandle, time: Nanoseconds) {
        let animation = self.get_mut(handle, "play");
        if animation.state_at(time) == AnimationState::Paused {
            animation.started = animation.started + (time - animation.paused);
        } else {
            animation.started = time;
        }
        animation.paused = Nanoseconds::MAX;
        animation.stopped = Nanoseconds::MAX;
        self.state |= AnimatorStates::NEEDS_ADVANCE;
    }

    /// Pauses the animation at `time`.
    pub fn pause(&mut self, handle: AnimationHandle, time: Nanoseconds) {
        self.get_mut(handle, "pause").paused = time;
        self.state |= AnimatorStates::NEEDS_ADVANCE;
    }

    /// Stops the animation at `time`.
    pub fn stop(&mut self, handle: AnimationHandle, time: Nanoseconds) {
        self.get_mut(handle, "stop").stopped = time;
        self.state |= AnimatorStates::NEEDS_ADVANCE;
    }

    /// State of the animation at the time of the last advance.
    #[must_use]
    pub fn animation_state(&self, handle: AnimationHandle) -> AnimationState {
        self.get(handle, "animation_state").state_at(self.time)
    }

    /// Interpolation factor of the animation at the time of the last
    /// advance, in `0.0..=1.0`.
    #[must_use]
    pub fn factor(&self, handle: AnimationHandle) -> f32 {
        let animation = self.get(handle, "factor");
        animation.factor_at(self.time, animation.state_at(self.time))
    }

    /// Moves the timeline to `time`.
    ///
    /// Fills `active` with ids of animations that are playing or changed
    /// their state since the last advance, `factors` with their
    /// interpolation factors indexed by id, and `remove` with ids of played
    /// out animations that aren't kept. Returns whether any animation still
    /// needs advancing.
    pub(crate) fn update(
        &mut self,
        time: Nanoseconds,
        active: &mut Vec<u32>,
        factors: &mut Vec<f32>,
        remove: &mut Vec<u32>,
    ) -> bool {
        active.clear();
        remove.clear();
        factors.clear();
        factors.resize(self.animations.len(), 0.0);

        let mut needs_advance = false;
        for (idx, animation) in self.animations.iter().enumerate() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "animation slot count is bounded by 1 << DATA_ID_BITS"
            )]
            let id = idx as u32;
            if !self.slots.is_occupied(id) {
                continue;
            }
            let before = animation.state_at(self.time);
            let now = animation.state_at(time);
            let changed = now != before
                && before != AnimationState::Stopped
                && matches!(now, AnimationState::Paused | AnimationState::Stopped);
            if now == AnimationState::Playing || changed {
                active.push(id);
                factors[idx] = animation.factor_at(time, now);
            }
            if now == AnimationState::Stopped {
                if !animation.flags.contains(AnimationFlags::KEEP_ONCE_PLAYED) {
                    remove.push(id);
                }
            } else {
                needs_advance = true;
            }
        }

        self.time = time;
        self.state.set(AnimatorStates::NEEDS_ADVANCE, needs_advance);
        needs_advance
    }

    /// Removes animations with given ids, as produced by
    /// [`update`](Self::update).
    pub(crate) fn remove_ids(&mut self, ids: &[u32]) {
        for &id in ids {
            self.remove_id(id);
        }
    }

    /// Removes animations attached to nodes that no longer exist and returns
    /// their ids.
    pub(crate) fn clean_nodes(&mut self, node_generations: &[u16]) -> Vec<u32> {
        let removed: Vec<u32> = self
            .animations
            .iter()
            .enumerate()
            .filter(|(_, animation)| {
                let node = animation.node;
                !node.is_null()
                    && !node_generations
                        .get(node.id() as usize)
                        .is_some_and(|&generation| u32::from(generation) == node.generation())
            })
            .map(|(idx, _)| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "animation slot count is bounded by 1 << DATA_ID_BITS"
                )]
                let id = idx as u32;
                id
            })
            .collect();
        self.remove_ids(&removed);
        removed
    }

    /// Removes animations attached to data that no longer exist and returns
    /// their ids.
    pub(crate) fn clean_data(&mut self, data_generations: &[u16]) -> Vec<u32> {
        let removed: Vec<u32> = self
            .animations
            .iter()
            .enumerate()
            .filter(|(_, animation)| {
                let data = animation.data;
                !data.is_null()
                    && !data_generations
                        .get(data.id() as usize)
                        .is_some_and(|&generation| u32::from(generation) == data.generation())
            })
            .map(|(idx, _)| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "animation slot count is bounded by 1 << DATA_ID_BITS"
                )]
                let id = idx as u32;
                id
            })
            .collect();
        self.remove_ids(&removed);
        removed
    }
}

/// Active animations passed to the kind-specific `advance()` hooks.
#[derive(Clone, Copy, Debug)]
pub struct AnimationUpdate<'a> {
    /// Time the animator advanced to.
    pub time: Nanoseconds,
    /// Ids of animations to apply.
    pub active: &'a [u32],
    /// Interpolation factors indexed by animation id, only meaningful for
    /// ids in `active`.
    pub factors: &'a [f32],
}

/// Node properties a [`NodeAnimator`] can write, indexed by node id.
#[derive(Debug)]
pub struct NodeAnimationTarget<'a> {
    /// Own node offsets.
    pub offsets: &'a mut [Vec2],
    /// Own node sizes.
    pub sizes: &'a mut [Vec2],
    /// Own node opacities.
    pub opacities: &'a mut [f32],
    /// Own node flags.
    pub flags: &'a mut [NodeFlags],
    /// Set to `true` to remove a node after the advance.
    pub remove: &'a mut [bool],
}

/// An animator. Implement one of the kind traits on top of this.
pub trait Animator: Any {
    /// The embedded core.
    fn core(&self) -> &AnimatorCore;

    /// The embedded core.
    fn core_mut(&mut self) -> &mut AnimatorCore;

    /// Animations with the given ids were removed because they played out
    /// or their node or data were removed.
    fn clean(&mut self, removed: &[u32]) {
        _ = removed;
    }
}

/// Animator not touching any user interface state.
pub trait GenericAnimator: Animator {
    /// Applies active animations.
    fn advance(&mut self, update: &AnimationUpdate<'_>);
}

/// Animator of node properties.
pub trait NodeAnimator: Animator {
    /// Applies active animations to `target` and reports what changed.
    fn advance(
        &mut self,
        update: &AnimationUpdate<'_>,
        target: &mut NodeAnimationTarget<'_>,
    ) -> NodeAnimations;
}

/// Animator of layer data.
pub trait DataAnimator: Animator {
    /// Applies active animations to data of `layer`.
    fn advance(&mut self, update: &AnimationUpdate<'_>, layer: &mut dyn Layer);
}

/// Animator of layer styles.
pub trait StyleAnimator: Animator {
    /// Applies active animations to styles of `layer`.
    fn advance(&mut self, update: &AnimationUpdate<'_>, layer: &mut dyn Layer);
}

/// Kind of an animator, in advance order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum AnimatorKind {
    Generic,
    Node,
    Data,
    Style,
}

pub(crate) enum AnimatorInstance {
    Generic(Box<dyn GenericAnimator>),
    Node(Box<dyn NodeAnimator>),
    Data(Box<dyn DataAnimator>),
    Style(Box<dyn StyleAnimator>),
}

impl core::fmt::Debug for AnimatorInstance {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("AnimatorInstance")
            .field(&self.kind())
            .field(self.animator().core())
            .finish()
    }
}

impl AnimatorInstance {
    pub(crate) fn kind(&self) -> AnimatorKind {
        match self {
            Self::Generic(_) => AnimatorKind::Generic,
            Self::Node(_) => AnimatorKind::Node,
            Self::Data(_) => AnimatorKind::Data,
            Self::Style(_) => AnimatorKind::Style,
        }
    }

    pub(crate) fn animator(&self) -> &dyn Animator {
        match self {
            Self::Generic(a) => &**a,
            Self::Node(a) => &**a,
            Self::Data(a) => &**a,
            Self::Style(a) => &**a,
        }
    }

    pub(crate) fn animator_mut(&mut self) -> &mut dyn Animator {
        match self {
            Self::Generic(a) => &mut **a,
            Self::Node(a) => &mut **a,
            Self::Data(a) => &mut **a,
            Self::Style(a) => &mut **a,
        }
    }
}
