// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer, layouter and animator registration.

use alloc::boxed::Box;
use core::any::{Any, type_name};

use crate::animator::{
    Animator, AnimatorFeatures, AnimatorInstance, DataAnimator, GenericAnimator, NodeAnimator,
    StyleAnimator,
};
use crate::handle::{
    AnimationHandle, AnimatorHandle, DataHandle, INVALID, LayerHandle, LayoutHandle,
    LayouterHandle, NodeHandle,
};
use crate::layer::{Layer, LayerFeatures};
use crate::layouter::Layouter;
use crate::state::UserInterfaceStates;

use super::UserInterface;

impl UserInterface {
    // -- Layers --

    /// Number of allocated layer slots.
    #[must_use]
    pub fn layer_capacity(&self) -> u32 {
        self.layers.capacity()
    }

    /// Number of live layers.
    #[must_use]
    pub fn layer_used_count(&self) -> u32 {
        self.layers.used_count()
    }

    /// Whether `handle` refers to a live layer.
    #[must_use]
    pub fn is_layer_handle_valid(&self, handle: LayerHandle) -> bool {
        !handle.is_null() && self.layers.is_valid(handle.id(), handle.generation())
    }

    /// Whether `handle` refers to live data of a layer with an instance.
    #[must_use]
    pub fn is_data_handle_valid(&self, handle: DataHandle) -> bool {
        self.is_layer_handle_valid(handle.layer())
            && self
                .layers
                .instance(handle.layer().id())
                .is_some_and(|layer| layer.core().is_handle_valid(handle))
    }

    fn layer_handle(&self, id: u32) -> LayerHandle {
        if id == INVALID {
            LayerHandle::NULL
        } else {
            LayerHandle::new(id, self.layers.generation(id))
        }
    }

    /// First layer in draw order, or Null.
    #[must_use]
    pub fn layer_first(&self) -> LayerHandle {
        self.layer_handle(self.layers.first())
    }

    /// Last layer in draw order, or Null.
    #[must_use]
    pub fn layer_last(&self) -> LayerHandle {
        self.layer_handle(self.layers.last())
    }

    /// Layer drawn before `handle`, or Null.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn layer_previous(&self, handle: LayerHandle) -> LayerHandle {
        self.assert_layer(handle, "layer_previous");
        self.layer_handle(self.layers.previous(handle.id()))
    }

    /// Layer drawn after `handle`, or Null.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn layer_next(&self, handle: LayerHandle) -> LayerHandle {
        self.assert_layer(handle, "layer_next");
        self.layer_handle(self.layers.next(handle.id()))
    }

    fn assert_layer(&self, handle: LayerHandle, what: &str) {
        assert!(
            self.is_layer_handle_valid(handle),
            "UserInterface::{what}(): invalid handle {handle:?}"
        );
    }

    /// Reserves a layer drawn before `before`, or last if `before` is Null.
    ///
    /// The returned handle is passed to the layer's [`LayerCore`], the layer
    /// itself is then installed with
    /// [`set_layer_instance`](Self::set_layer_instance).
    ///
    /// [`LayerCore`]: crate::LayerCore
    ///
    /// # Panics
    ///
    /// Panics if `before` isn't Null or valid, or all layer slots are taken.
    pub fn create_layer(&mut self, before: LayerHandle) -> LayerHandle {
        assert!(
            before.is_null() || self.is_layer_handle_valid(before),
            "UserInterface::create_layer(): invalid before handle {before:?}"
        );
        let before = if before.is_null() {
            INVALID
        } else {
            before.id()
        };
        let (id, generation) = self.layers.create("UserInterface::create_layer()", before);
        LayerHandle::new(id, generation)
    }

    /// Installs the layer for a handle from
    /// [`create_layer`](Self::create_layer) and tells it the current sizes.
    ///
    /// # Panics
    ///
    /// Panics if the layer's handle isn't valid or already has an instance.
    pub fn set_layer_instance<L: Layer>(&mut self, layer: L) {
        let handle = layer.core().handle();
        self.assert_layer(handle, "set_layer_instance");
        assert!(
            !self.layers.has_instance(handle.id()),
            "UserInterface::set_layer_instance(): instance for {handle:?} already set"
        );
        let mut layer: Box<dyn Layer> = Box::new(layer);
        layer.set_size(self.size, self.framebuffer_size);
        self.layers.set_instance(handle.id(), layer);
        self.state |= UserInterfaceStates::NEEDS_DATA_ATTACHMENT_UPDATE;
    }

    /// Whether the layer has an instance set.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn has_layer_instance(&self, handle: LayerHandle) -> bool {
        self.assert_layer(handle, "has_layer_instance");
        self.layers.has_instance(handle.id())
    }

    /// The layer.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or has no instance.
    #[must_use]
    pub fn layer(&self, handle: LayerHandle) -> &dyn Layer {
        self.assert_layer(handle, "layer");
        match self.layers.instance(handle.id()) {
            Some(layer) => &**layer,
            None => panic!("UserInterface::layer(): {handle:?} has no instance set"),
        }
    }

    /// The layer.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or has no instance.
    pub fn layer_mut(&mut self, handle: LayerHandle) -> &mut dyn Layer {
        self.assert_layer(handle, "layer_mut");
        match self.layers.instance_mut(handle.id()) {
            Some(layer) => &mut **layer,
            None => panic!("UserInterface::layer_mut(): {handle:?} has no instance set"),
        }
    }

    /// The layer as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, has no instance or it isn't an `L`.
    #[must_use]
    pub fn layer_as<L: Layer>(&self, handle: LayerHandle) -> &L {
        let any: &dyn Any = self.layer(handle);
        match any.downcast_ref() {
            Some(layer) => layer,
            None => panic!(
                "UserInterface::layer_as(): {handle:?} isn't a {}",
                type_name::<L>()
            ),
        }
    }

    /// The layer as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, has no instance or it isn't an `L`.
    pub fn layer_as_mut<L: Layer>(&mut self, handle: LayerHandle) -> &mut L {
        let any: &mut dyn Any = self.layer_mut(handle);
        match any.downcast_mut() {
            Some(layer) => layer,
            None => panic!(
                "UserInterface::layer_as_mut(): {handle:?} isn't a {}",
                type_name::<L>()
            ),
        }
    }

    /// Removes a layer together with its instance.
    ///
    /// Data and style animators bound to the layer are removed as well, their
    /// animations would otherwise point to data that no longer exists.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove_layer(&mut self, handle: LayerHandle) {
        self.assert_layer(handle, "remove_layer");
        for id in self.animators.ordered_ids() {
            let bound = self
                .animators
                .instance(id)
                .is_some_and(|animator| animator.animator().core().layer() == handle);
            if bound {
                self.animators.remove(id);
            }
        }
        self.layers.remove(handle.id());
        self.state |= UserInterfaceStates::NEEDS_DATA_ATTACHMENT_UPDATE;
        tracing::debug!(?handle, "layer removed");
    }

    /// Attaches layer data to a node, or detaches it if `node` is Null.
    ///
    /// # Panics
    ///
    /// Panics if `node` isn't Null or valid, or `data` isn't valid.
    pub fn attach_data(&mut self, node: NodeHandle, data: DataHandle) {
        assert!(
            node.is_null() || self.nodes.is_valid(node),
            "UserInterface::attach_data(): invalid node handle {node:?}"
        );
        assert!(
            self.is_data_handle_valid(data),
            "UserInterface::attach_data(): invalid data handle {data:?}"
        );
        self.layer_mut(data.layer())
            .core_mut()
            .attach(data.data(), node);
    }

    // -- Layouters --

    /// Number of allocated layouter slots.
    #[must_use]
    pub fn layouter_capacity(&self) -> u32 {
        self.layouters.capacity()
    }

    /// Number of live layouters.
    #[must_use]
    pub fn layouter_used_count(&self) -> u32 {
        self.layouters.used_count()
    }

    /// Whether `handle` refers to a live layouter.
    #[must_use]
    pub fn is_layouter_handle_valid(&self, handle: LayouterHandle) -> bool {
        !handle.is_null() && self.layouters.is_valid(handle.id(), handle.generation())
    }

    /// Whether `handle` refers to a live layout of a layouter with an
    /// instance.
    #[must_use]
    pub fn is_layout_handle_valid(&self, handle: LayoutHandle) -> bool {
        self.is_layouter_handle_valid(handle.layouter())
            && self
                .layouters
                .instance(handle.layouter().id())
                .is_some_and(|layouter| layouter.core().is_handle_valid(handle))
    }

    fn layouter_handle(&self, id: u32) -> LayouterHandle {
        if id == INVALID {
            LayouterHandle::NULL
        } else {
            LayouterHandle::new(id, self.layouters.generation(id))
        }
    }

    /// First layouter in run order, or Null.
    #[must_use]
    pub fn layouter_first(&self) -> LayouterHandle {
        self.layouter_handle(self.layouters.first())
    }

    /// Last layouter in run order, or Null.
    #[must_use]
    pub fn layouter_last(&self) -> LayouterHandle {
        self.layouter_handle(self.layouters.last())
    }

    /// Layouter running before `handle`, or Null.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn layouter_previous(&self, handle: LayouterHandle) -> LayouterHandle {
        self.assert_layouter(handle, "layouter_previous");
        self.layouter_handle(self.layouters.previous(handle.id()))
    }

    /// Layouter running after `handle`, or Null.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn layouter_next(&self, handle: LayouterHandle) -> LayouterHandle {
        self.assert_layouter(handle, "layouter_next");
        self.layouter_handle(self.layouters.next(handle.id()))
    }

    fn assert_layouter(&self, handle: LayouterHandle, what: &str) {
        assert!(
            self.is_layouter_handle_valid(handle),
            "UserInterface::{what}(): invalid handle {handle:?}"
        );
    }

    /// Reserves a layouter running before `before`, or last if `before` is
    /// Null.
    ///
    /// # Panics
    ///
    /// Panics if `before` isn't Null or valid, or all layouter slots are
    /// taken.
    pub fn create_layouter(&mut self, before: LayouterHandle) -> LayouterHandle {
        assert!(
            before.is_null() || self.is_layouter_handle_valid(before),
            "UserInterface::create_layouter(): invalid before handle {before:?}"
        );
        let before = if before.is_null() {
            INVALID
        } else {
            before.id()
        };
        let (id, generation) = self
            .layouters
            .create("UserInterface::create_layouter()", before);
        LayouterHandle::new(id, generation)
    }

    /// Installs the layouter for a handle from
    /// [`create_layouter`](Self::create_layouter) and tells it the current
    /// size.
    ///
    /// # Panics
    ///
    /// Panics if the layouter's handle isn't valid or already has an
    /// instance.
    pub fn set_layouter_instance<L: Layouter>(&mut self, layouter: L) {
        let handle = layouter.core().handle();
        self.assert_layouter(handle, "set_layouter_instance");
        assert!(
            !self.layouters.has_instance(handle.id()),
            "UserInterface::set_layouter_instance(): instance for {handle:?} already set"
        );
        let mut layouter: Box<dyn Layouter> = Box::new(layouter);
        layouter.set_size(self.size);
        self.layouters.set_instance(handle.id(), layouter);
        self.state |= UserInterfaceStates::NEEDS_LAYOUT_ASSIGNMENT_UPDATE;
    }

    /// Whether the layouter has an instance set.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn has_layouter_instance(&self, handle: LayouterHandle) -> bool {
        self.assert_layouter(handle, "has_layouter_instance");
        self.layouters.has_instance(handle.id())
    }

    /// The layouter.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or has no instance.
    #[must_use]
    pub fn layouter(&self, handle: LayouterHandle) -> &dyn Layouter {
        self.assert_layouter(handle, "layouter");
        match self.layouters.instance(handle.id()) {
            Some(layouter) => &**layouter,
            None => panic!("UserInterface::layouter(): {handle:?} has no instance set"),
        }
    }

    /// The layouter.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or has no instance.
    pub fn layouter_mut(&mut self, handle: LayouterHandle) -> &mut dyn Layouter {
        self.assert_layouter(handle, "layouter_mut");
        match self.layouters.instance_mut(handle.id()) {
            Some(layouter) => &mut **layouter,
            None => panic!("UserInterface::layouter_mut(): {handle:?} has no instance set"),
        }
    }

    /// The layouter as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, has no instance or it isn't an `L`.
    #[must_use]
    pub fn layouter_as<L: Layouter>(&self, handle: LayouterHandle) -> &L {
        let any: &dyn Any = self.layouter(handle);
        match any.downcast_ref() {
            Some(layouter) => layouter,
            None => panic!(
                "UserInterface::layouter_as(): {handle:?} isn't a {}",
                type_name::<L>()
            ),
        }
    }

    /// The layouter as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, has no instance or it isn't an `L`.
    pub fn layouter_as_mut<L: Layouter>(&mut self, handle: LayouterHandle) -> &mut L {
        let any: &mut dyn Any = self.layouter_mut(handle);
        match any.downcast_mut() {
            Some(layouter) => layouter,
            None => panic!(
                "UserInterface::layouter_as_mut(): {handle:?} isn't a {}",
                type_name::<L>()
            ),
        }
    }

    /// Removes a layouter together with its instance.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove_layouter(&mut self, handle: LayouterHandle) {
        self.assert_layouter(handle, "remove_layouter");
        self.layouters.remove(handle.id());
        self.state |= UserInterfaceStates::NEEDS_LAYOUT_ASSIGNMENT_UPDATE;
        tracing::debug!(?handle, "layouter removed");
    }

    // -- Animators --

    /// Number of allocated animator slots.
    #[must_use]
    pub fn animator_capacity(&self) -> u32 {
        self.animators.capacity()
    }

    /// Number of live animators.
    #[must_use]
    pub fn animator_used_count(&self) -> u32 {
        self.animators.used_count()
    }

    /// Whether `handle` refers to a live animator.
    #[must_use]
    pub fn is_animator_handle_valid(&self, handle: AnimatorHandle) -> bool {
        !handle.is_null() && self.animators.is_valid(handle.id(), handle.generation())
    }

    /// Whether `handle` refers to a live animation of an animator with an
    /// instance.
    #[must_use]
    pub fn is_animation_handle_valid(&self, handle: AnimationHandle) -> bool {
        self.is_animator_handle_valid(handle.animator())
            && self
                .animators
                .instance(handle.animator().id())
                .is_some_and(|animator| animator.animator().core().is_handle_valid(handle))
    }

    fn assert_animator(&self, handle: AnimatorHandle, what: &str) {
        assert!(
            self.is_animator_handle_valid(handle),
            "UserInterface::{what}(): invalid handle {handle:?}"
        );
    }

    /// Reserves an animator.
    ///
    /// # Panics
    ///
    /// Panics if all animator slots are taken.
    pub fn create_animator(&mut self) -> AnimatorHandle {
        let (id, generation) = self
            .animators
            .create("UserInterface::create_animator()", INVALID);
        AnimatorHandle::new(id, generation)
    }

    fn set_animator_instance(&mut self, instance: AnimatorInstance, what: &str) {
        let handle = instance.animator().core().handle();
        self.assert_animator(handle, what);
        assert!(
            !self.animators.has_instance(handle.id()),
            "UserInterface::{what}(): instance for {handle:?} already set"
        );
        self.animators.set_instance(handle.id(), instance);
    }

    fn assert_animator_layer(&self, animator: &dyn Animator, feature: LayerFeatures, what: &str) {
        let core = animator.core();
        assert!(
            core.features().contains(AnimatorFeatures::DATA_ATTACHMENT),
            "UserInterface::{what}(): data attachment not supported by {:?}",
            core.handle()
        );
        let layer = core.layer();
        assert!(
            self.is_layer_handle_valid(layer) && self.layers.has_instance(layer.id()),
            "UserInterface::{what}(): {:?} isn't bound to a layer with an instance",
            core.handle()
        );
        assert!(
            self.layer(layer).core().features().contains(feature),
            "UserInterface::{what}(): {layer:?} doesn't support {feature:?}"
        );
    }

    /// Installs an animator that doesn't touch user interface state.
    ///
    /// # Panics
    ///
    /// Panics if the animator's handle isn't valid or already has an
    /// instance.
    pub fn set_generic_animator_instance<A: GenericAnimator>(&mut self, animator: A) {
        self.set_animator_instance(
            AnimatorInstance::Generic(Box::new(animator)),
            "set_generic_animator_instance",
        );
    }

    /// Installs a node animator.
    ///
    /// # Panics
    ///
    /// Panics if the animator's handle isn't valid, already has an instance
    /// or the animator doesn't support node attachment.
    pub fn set_node_animator_instance<A: NodeAnimator>(&mut self, animator: A) {
        assert!(
            animator
                .core()
                .features()
                .contains(AnimatorFeatures::NODE_ATTACHMENT),
            "UserInterface::set_node_animator_instance(): node attachment not supported by {:?}",
            animator.core().handle()
        );
        self.set_animator_instance(
            AnimatorInstance::Node(Box::new(animator)),
            "set_node_animator_instance",
        );
    }

    /// Installs a data animator. Its layer has to be set and support
    /// [`LayerFeatures::ANIMATE_DATA`].
    ///
    /// # Panics
    ///
    /// Panics if the animator's handle isn't valid, already has an instance
    /// or the layer requirements aren't met.
    pub fn set_data_animator_instance<A: DataAnimator>(&mut self, animator: A) {
        self.assert_animator_layer(
            &animator,
            LayerFeatures::ANIMATE_DATA,
            "set_data_animator_instance",
        );
        self.set_animator_instance(
            AnimatorInstance::Data(Box::new(animator)),
            "set_data_animator_instance",
        );
    }

    /// Installs a style animator. Its layer has to be set and support
    /// [`LayerFeatures::ANIMATE_STYLES`].
    ///
    /// # Panics
    ///
    /// Panics if the animator's handle isn't valid, already has an instance
    /// or the layer requirements aren't met.
    pub fn set_style_animator_instance<A: StyleAnimator>(&mut self, animator: A) {
        self.assert_animator_layer(
            &animator,
            LayerFeatures::ANIMATE_STYLES,
            "set_style_animator_instance",
        );
        self.set_animator_instance(
            AnimatorInstance::Style(Box::new(animator)),
            "set_style_animator_instance",
        );
    }

    /// Whether the animator has an instance set.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    #[must_use]
    pub fn has_animator_instance(&self, handle: AnimatorHandle) -> bool {
        self.assert_animator(handle, "has_animator_instance");
        self.animators.has_instance(handle.id())
    }

    /// The animator.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or has no instance.
    #[must_use]
    pub fn animator(&self, handle: AnimatorHandle) -> &dyn Animator {
        self.assert_animator(handle, "animator");
        match self.animators.instance(handle.id()) {
            Some(animator) => animator.animator(),
            None => panic!("UserInterface::animator(): {handle:?} has no instance set"),
        }
    }

    /// The animator.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid or has no instance.
    pub fn animator_mut(&mut self, handle: AnimatorHandle) -> &mut dyn Animator {
        self.assert_animator(handle, "animator_mut");
        match self.animators.instance_mut(handle.id()) {
            Some(animator) => animator.animator_mut(),
            None => panic!("UserInterface::animator_mut(): {handle:?} has no instance set"),
        }
    }

    /// The animator as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, has no instance or it isn't an `A`.
    #[must_use]
    pub fn animator_as<A: Animator>(&self, handle: AnimatorHandle) -> &A {
        let any: &dyn Any = self.animator(handle);
        match any.downcast_ref() {
            Some(animator) => animator,
            None => panic!(
                "UserInterface::animator_as(): {handle:?} isn't a {}",
                type_name::<A>()
            ),
        }
    }

    /// The animator as its concrete type.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid, has no instance or it isn't an `A`.
    pub fn animator_as_mut<A: Animator>(&mut self, handle: AnimatorHandle) -> &mut A {
        let any: &mut dyn Any = self.animator_mut(handle);
        match any.downcast_mut() {
            Some(animator) => animator,
            None => panic!(
                "UserInterface::animator_as_mut(): {handle:?} isn't a {}",
                type_name::<A>()
            ),
        }
    }

    /// Removes an animator together with its instance.
    ///
    /// # Panics
    ///
    /// Panics if `handle` isn't valid.
    pub fn remove_animator(&mut self, handle: AnimatorHandle) {
        self.assert_animator(handle, "remove_animator");
        self.animators.remove(handle.id());
        tracing::debug!(?handle, "animator removed");
    }

    /// Attaches an animation to a node, or detaches it if `node` is Null.
    /// The animation is removed when the node is.
    ///
    /// # Panics
    ///
    /// Panics if `node` isn't Null or valid, `animation` isn't valid or its
    /// animator doesn't support node attachment.
    pub fn attach_node_animation(&mut self, node: NodeHandle, animation: AnimationHandle) {
        assert!(
            node.is_null() || self.nodes.is_valid(node),
            "UserInterface::attach_node_animation(): invalid node handle {node:?}"
        );
        assert!(
            self.is_animation_handle_valid(animation),
            "UserInterface::attach_node_animation(): invalid animation handle {animation:?}"
        );
        self.animator_mut(animation.animator())
            .core_mut()
            .attach_node(animation, node);
    }

    /// Attaches an animation to layer data, or detaches it if `data` is Null.
    /// The animation is removed when the data is.
    ///
    /// # Panics
    ///
    /// Panics if `data` isn't Null or valid, `animation` isn't valid, its
    /// animator doesn't support data attachment or is bound to a different
    /// layer than `data` belongs to.
    pub fn attach_data_animation(&mut self, data: DataHandle, animation: AnimationHandle) {
        assert!(
            data.is_null() || self.is_data_handle_valid(data),
            "UserInterface::attach_data_animation(): invalid data handle {data:?}"
        );
        assert!(
            self.is_animation_handle_valid(animation),
            "UserInterface::attach_data_animation(): invalid animation handle {animation:?}"
        );
        let core = self.animator_mut(animation.animator()).core_mut();
        assert!(
            data.is_null() || core.layer() == data.layer(),
            "UserInterface::attach_data_animation(): expected data of {:?} but got {data:?}",
            core.layer()
        );
        core.attach_data(animation, data.data());
    }
}
