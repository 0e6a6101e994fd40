// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generation-checked handle types.
//!
//! Every object owned by a [`UserInterface`](crate::UserInterface) is
//! referenced from the outside by a handle packing a slot index and a
//! generation counter into a fixed-width integer. The generation is bumped
//! whenever the slot is freed, so a handle kept around after its object was
//! removed is detected as stale instead of silently aliasing a new object.
//!
//! | Family | Type | Id bits | Generation bits |
//! |--------|------|---------|-----------------|
//! | Layer, layouter, animator | `u16` | 8 | 8 |
//! | Node, layer data, layout data, animation data | `u32` | 20 | 12 |
//! | Data, layout, animation | `u64` | parent + 20 | parent + 12 |
//!
//! Composite handles keep the local data handle in the low 32 bits and the
//! owning layer/layouter/animator handle in the next 16 bits. A handle with
//! all bits zero is the Null handle. Generations start at 1, so Null is never
//! valid.

use core::fmt;

/// Number of bits used for the id part of layer, layouter and animator handles.
pub const SMALL_ID_BITS: u32 = 8;

/// Number of bits used for the generation part of layer, layouter and
/// animator handles.
pub const SMALL_GENERATION_BITS: u32 = 8;

/// Number of bits used for the id part of node and per-instance data handles.
pub const DATA_ID_BITS: u32 = 20;

/// Number of bits used for the generation part of node and per-instance data
/// handles.
pub const DATA_GENERATION_BITS: u32 = 12;

/// Sentinel used in index fields for "no slot".
pub(crate) const INVALID: u32 = u32::MAX;

macro_rules! small_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u16);

        impl $name {
            /// The Null handle.
            pub const NULL: Self = Self(0);

            /// Composes a handle from an id and a generation.
            ///
            /// # Panics
            ///
            /// Panics if either part doesn't fit into its bit range.
            #[inline]
            #[must_use]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "both parts are range-checked to fit 8 bits"
            )]
            pub const fn new(id: u32, generation: u32) -> Self {
                assert!(
                    id < 1 << SMALL_ID_BITS && generation < 1 << SMALL_GENERATION_BITS,
                    "handle id or generation out of range"
                );
                Self((id | generation << SMALL_ID_BITS) as u16)
            }

            /// Creates a handle from its packed representation.
            #[inline]
            #[must_use]
            pub const fn from_bits(bits: u16) -> Self {
                Self(bits)
            }

            /// Returns the packed representation.
            #[inline]
            #[must_use]
            pub const fn bits(self) -> u16 {
                self.0
            }

            /// Slot index.
            #[inline]
            #[must_use]
            pub const fn id(self) -> u32 {
                self.0 as u32 & ((1 << SMALL_ID_BITS) - 1)
            }

            /// Generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                (self.0 as u32) >> SMALL_ID_BITS
            }

            /// Whether this is the Null handle.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    return write!(f, concat!(stringify!($name), "::NULL"));
                }
                write!(
                    f,
                    concat!(stringify!($name), "({:#x}, {:#x})"),
                    self.id(),
                    self.generation()
                )
            }
        }
    };
}

macro_rules! data_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// The Null handle.
            pub const NULL: Self = Self(0);

            /// Composes a handle from an id and a generation.
            ///
            /// # Panics
            ///
            /// Panics if either part doesn't fit into its bit range.
            #[inline]
            #[must_use]
            pub const fn new(id: u32, generation: u32) -> Self {
                assert!(
                    id < 1 << DATA_ID_BITS && generation < 1 << DATA_GENERATION_BITS,
                    "handle id or generation out of range"
                );
                Self(id | generation << DATA_ID_BITS)
            }

            /// Creates a handle from its packed representation.
            #[inline]
            #[must_use]
            pub const fn from_bits(bits: u32) -> Self {
                Self(bits)
            }

            /// Returns the packed representation.
            #[inline]
            #[must_use]
            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Slot index.
            #[inline]
            #[must_use]
            pub const fn id(self) -> u32 {
                self.0 & ((1 << DATA_ID_BITS) - 1)
            }

            /// Generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.0 >> DATA_ID_BITS
            }

            /// Whether this is the Null handle.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    return write!(f, concat!(stringify!($name), "::NULL"));
                }
                write!(
                    f,
                    concat!(stringify!($name), "({:#x}, {:#x})"),
                    self.id(),
                    self.generation()
                )
            }
        }
    };
}

macro_rules! composite_handle {
    (
        $(#[$meta:meta])* $name:ident,
        $parent:ident, $parent_fn:ident,
        $local:ident
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            /// The Null handle.
            pub const NULL: Self = Self(0);

            /// Composes a handle from the owning handle and a local data handle.
            #[inline]
            #[must_use]
            pub const fn new(parent: $parent, data: $local) -> Self {
                Self((parent.bits() as u64) << 32 | data.bits() as u64)
            }

            /// Creates a handle from its packed representation.
            #[inline]
            #[must_use]
            pub const fn from_bits(bits: u64) -> Self {
                Self(bits)
            }

            /// Returns the packed representation.
            #[inline]
            #[must_use]
            pub const fn bits(self) -> u64 {
                self.0
            }

            /// The owning handle part.
            #[inline]
            #[must_use]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "the owning handle occupies exactly bits 32..48"
            )]
            pub const fn $parent_fn(self) -> $parent {
                $parent::from_bits((self.0 >> 32) as u16)
            }

            /// The local data handle part.
            #[inline]
            #[must_use]
            #[expect(
                clippy::cast_possible_truncation,
                reason = "the local handle occupies exactly the low 32 bits"
            )]
            pub const fn data(self) -> $local {
                $local::from_bits(self.0 as u32)
            }

            /// Slot index of the local data part.
            #[inline]
            #[must_use]
            pub const fn id(self) -> u32 {
                self.data().id()
            }

            /// Generation of the local data part.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.data().generation()
            }

            /// Whether this is the Null handle.
            #[inline]
            #[must_use]
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    return write!(f, concat!(stringify!($name), "::NULL"));
                }
                let parent = self.$parent_fn();
                write!(
                    f,
                    concat!(stringify!($name), "({{{:#x}, {:#x}}}, {{{:#x}, {:#x}}})"),
                    parent.id(),
                    parent.generation(),
                    self.id(),
                    self.generation()
                )
            }
        }
    };
}

small_handle!(
    /// Handle to a layer registered in a user interface.
    LayerHandle
);
small_handle!(
    /// Handle to a layouter registered in a user interface.
    LayouterHandle
);
small_handle!(
    /// Handle to an animator registered in a user interface.
    AnimatorHandle
);

data_handle!(
    /// Handle to a node in a user interface.
    NodeHandle
);
data_handle!(
    /// Handle to data local to a single layer.
    LayerDataHandle
);
data_handle!(
    /// Handle to a layout local to a single layouter.
    LayouterDataHandle
);
data_handle!(
    /// Handle to an animation local to a single animator.
    AnimatorDataHandle
);

composite_handle!(
    /// Layer data handle qualified with the layer it belongs to.
    DataHandle,
    LayerHandle,
    layer,
    LayerDataHandle
);
composite_handle!(
    /// Layout handle qualified with the layouter it belongs to.
    LayoutHandle,
    LayouterHandle,
    layouter,
    LayouterDataHandle
);
composite_handle!(
    /// Animation handle qualified with the animator it belongs to.
    AnimationHandle,
    AnimatorHandle,
    animator,
    AnimatorDataHandle
);
