// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input events dispatched to layer data.
//!
//! Events are created by the caller, passed to one of the
//! [`UserInterface`](crate::UserInterface) entry points and then handed to
//! the [`Layer`](crate::Layer) event hooks of every data attached to the node
//! they end up on. The user interface fills in node-relative positions,
//! the node size and the hover state before each hook call; hooks report back
//! through [`set_accepted`](PointerEvent::set_accepted) and, for pointer
//! events, [`set_captured`](PointerEvent::set_captured).

use alloc::string::String;

use bitflags::bitflags;
use kurbo::{Point, Size, Vec2};

use crate::time::Nanoseconds;

/// Device an event originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEventSource {
    /// A mouse or touchpad.
    Mouse,
    /// A touchscreen.
    Touch,
    /// A pen tablet.
    Pen,
}

/// A single pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pointer {
    /// Left mouse button.
    MouseLeft,
    /// Middle mouse button.
    MouseMiddle,
    /// Right mouse button.
    MouseRight,
    /// A finger on a touchscreen.
    Finger,
    /// A pen tip.
    Pen,
    /// A pen eraser.
    Eraser,
}

impl Pointer {
    /// Whether pressing this pointer moves focus.
    #[must_use]
    pub const fn focuses(self) -> bool {
        matches!(self, Self::MouseLeft | Self::Finger | Self::Pen)
    }

    /// The corresponding [`Pointers`] bit.
    #[must_use]
    pub const fn bit(self) -> Pointers {
        match self {
            Self::MouseLeft => Pointers::MOUSE_LEFT,
            Self::MouseMiddle => Pointers::MOUSE_MIDDLE,
            Self::MouseRight => Pointers::MOUSE_RIGHT,
            Self::Finger => Pointers::FINGER,
            Self::Pen => Pointers::PEN,
            Self::Eraser => Pointers::ERASER,
        }
    }
}

bitflags! {
    /// Set of pressed pointers.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Pointers: u8 {
        /// Left mouse button.
        const MOUSE_LEFT = 1 << 0;
        /// Middle mouse button.
        const MOUSE_MIDDLE = 1 << 1;
        /// Right mouse button.
        const MOUSE_RIGHT = 1 << 2;
        /// A finger.
        const FINGER = 1 << 3;
        /// A pen tip.
        const PEN = 1 << 4;
        /// A pen eraser.
        const ERASER = 1 << 5;
    }
}

bitflags! {
    /// Keyboard modifiers held during an event.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 1 << 0;
        /// Ctrl.
        const CTRL = 1 << 1;
        /// Alt.
        const ALT = 1 << 2;
        /// Super, Windows or Command key.
        const SUPER = 1 << 3;
    }
}

/// A key.
///
/// Only keys with a UI meaning get their own variant, everything that
/// produces a character is [`Char`](Self::Char).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Enter or Return.
    Enter,
    /// Escape.
    Escape,
    /// Tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Delete.
    Delete,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// Space bar.
    Space,
    /// A key producing a character.
    Char(char),
    /// Any other key, identified by a platform scan code.
    Other(u32),
}

/// Pointer press, release and tap-or-click event.
#[derive(Clone, Debug)]
pub struct PointerEvent {
    time: Nanoseconds,
    source: PointerEventSource,
    pointer: Pointer,
    primary: bool,
    id: u64,
    modifiers: Modifiers,
    pub(crate) position: Point,
    pub(crate) node_size: Size,
    pub(crate) accepted: bool,
    pub(crate) captured: bool,
    pub(crate) hovering: bool,
}

impl PointerEvent {
    /// Creates an event for `pointer`.
    ///
    /// `primary` marks the pointer that drives hover, focus and
    /// tap-or-click, typically the mouse or the first finger touching the
    /// screen. `id` distinguishes concurrent pointers of the same kind.
    #[must_use]
    pub fn new(
        time: Nanoseconds,
        source: PointerEventSource,
        pointer: Pointer,
        primary: bool,
        id: u64,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            time,
            source,
            pointer,
            primary,
            id,
            modifiers,
            position: Point::ZERO,
            node_size: Size::ZERO,
            accepted: false,
            captured: false,
            hovering: false,
        }
    }

    /// Event timestamp.
    #[must_use]
    pub fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Originating device.
    #[must_use]
    pub fn source(&self) -> PointerEventSource {
        self.source
    }

    /// Pointer that was pressed or released.
    #[must_use]
    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    /// Whether the event comes from the primary pointer.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Pointer id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Held keyboard modifiers.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Position relative to the node the event is dispatched to.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Size of the node the event is dispatched to.
    #[must_use]
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    /// Whether the event was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accepts or rejects the event.
    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    /// Whether the node the event is dispatched to captures the pointer.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Requests or releases pointer capture on the node.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Whether the primary pointer hovers the node.
    #[must_use]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }
}

/// Pointer move, enter and leave event.
#[derive(Clone, Debug)]
pub struct PointerMoveEvent {
    time: Nanoseconds,
    source: PointerEventSource,
    pointer: Option<Pointer>,
    pointers: Pointers,
    primary: bool,
    id: u64,
    modifiers: Modifiers,
    pub(crate) position: Point,
    pub(crate) relative_position: Vec2,
    pub(crate) node_size: Size,
    pub(crate) accepted: bool,
    pub(crate) captured: bool,
    pub(crate) hovering: bool,
}

impl PointerMoveEvent {
    /// Creates a move event.
    ///
    /// `pointer` is the pointer whose state changed together with the move,
    /// if any. `pointers` are all pointers pressed during the move.
    #[must_use]
    pub fn new(
        time: Nanoseconds,
        source: PointerEventSource,
        pointer: Option<Pointer>,
        pointers: Pointers,
        primary: bool,
        id: u64,
        modifiers: Modifiers,
    ) -> Self {
        Self {
            time,
            source,
            pointer,
            pointers,
            primary,
            id,
            modifiers,
            position: Point::ZERO,
            relative_position: Vec2::ZERO,
            node_size: Size::ZERO,
            accepted: false,
            captured: false,
            hovering: false,
        }
    }

    /// Event timestamp.
    #[must_use]
    pub fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Originating device.
    #[must_use]
    pub fn source(&self) -> PointerEventSource {
        self.source
    }

    /// Pointer whose state changed together with the move.
    #[must_use]
    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    /// All pointers pressed during the move.
    #[must_use]
    pub fn pointers(&self) -> Pointers {
        self.pointers
    }

    /// Whether the event comes from the primary pointer.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// Pointer id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Held keyboard modifiers.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Position relative to the node the event is dispatched to.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Movement since the previous primary pointer event, zero for the first
    /// one and for secondary pointers.
    #[must_use]
    pub fn relative_position(&self) -> Vec2 {
        self.relative_position
    }

    /// Size of the node the event is dispatched to.
    #[must_use]
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    /// Whether the event was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accepts or rejects the event.
    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    /// Whether the node the event is dispatched to captures the pointer.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Requests or releases pointer capture on the node.
    pub fn set_captured(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Whether the primary pointer hovers the node.
    #[must_use]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }
}

/// Focus and blur event.
#[derive(Clone, Debug)]
pub struct FocusEvent {
    time: Nanoseconds,
    pub(crate) accepted: bool,
    pub(crate) pressed: bool,
    pub(crate) hovering: bool,
}

impl FocusEvent {
    /// Creates a focus event.
    #[must_use]
    pub fn new(time: Nanoseconds) -> Self {
        Self {
            time,
            accepted: false,
            pressed: false,
            hovering: false,
        }
    }

    /// Event timestamp.
    #[must_use]
    pub fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Whether the event was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accepts or rejects the event.
    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    /// Whether the node is currently pressed.
    #[must_use]
    pub fn is_node_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the primary pointer hovers the node.
    #[must_use]
    pub fn is_node_hovered(&self) -> bool {
        self.hovering
    }
}

/// Key press and release event.
#[derive(Clone, Debug)]
pub struct KeyEvent {
    time: Nanoseconds,
    key: Key,
    modifiers: Modifiers,
    pub(crate) position: Option<Point>,
    pub(crate) node_size: Size,
    pub(crate) accepted: bool,
    pub(crate) hovering: bool,
}

impl KeyEvent {
    /// Creates a key event.
    #[must_use]
    pub fn new(time: Nanoseconds, key: Key, modifiers: Modifiers) -> Self {
        Self {
            time,
            key,
            modifiers,
            position: None,
            node_size: Size::ZERO,
            accepted: false,
            hovering: false,
        }
    }

    /// Event timestamp.
    #[must_use]
    pub fn time(&self) -> Nanoseconds {
        self.time
    }

    /// The key.
    #[must_use]
    pub fn key(&self) -> Key {
        self.key
    }

    /// Held keyboard modifiers.
    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Pointer position relative to the node, or [`None`] if the event went
    /// to the focused node.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    /// Size of the node the event is dispatched to.
    #[must_use]
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    /// Whether the event was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accepts or rejects the event.
    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }

    /// Whether the primary pointer hovers the node.
    #[must_use]
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }
}

/// Text input event, always dispatched to the focused node.
#[derive(Clone, Debug)]
pub struct TextInputEvent {
    time: Nanoseconds,
    text: String,
    pub(crate) accepted: bool,
}

impl TextInputEvent {
    /// Creates a text input event.
    #[must_use]
    pub fn new(time: Nanoseconds, text: impl Into<String>) -> Self {
        Self {
            time,
            text: text.into(),
            accepted: false,
        }
    }

    /// Event timestamp.
    #[must_use]
    pub fn time(&self) -> Nanoseconds {
        self.time
    }

    /// Input text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the event was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accepts or rejects the event.
    pub fn set_accepted(&mut self, accepted: bool) {
        self.accepted = accepted;
    }
}

/// Sent to data of a node that stopped being pressed, hovered or focused
/// because it was hidden, disabled or lost its focusability.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityLostEvent {
    pub(crate) pressed: bool,
    pub(crate) hovering: bool,
}

impl VisibilityLostEvent {
    /// Whether the node stays pressed. Only ever the case for nodes that
    /// remain visible but lost focus.
    #[must_use]
    pub fn is_node_pressed(&self) -> bool {
        self.pressed
    }

    /// Whether the node stays hovered. Only ever the case for nodes that
    /// remain visible but lost focus.
    #[must_use]
    pub fn is_node_hovered(&self) -> bool {
        self.hovering
    }
}
