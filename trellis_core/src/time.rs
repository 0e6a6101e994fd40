// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Signed nanosecond time values.
//!
//! [`Nanoseconds`] is used both for points in time (animation time, event
//! timestamps) and for durations. The core never reads a clock; the caller
//! decides what the epoch is. Arithmetic saturates at the representable range
//! so that "never" sentinels ([`Nanoseconds::MAX`]) survive additions.

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

/// A point in time or a duration, in nanoseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Nanoseconds(pub i64);

impl Nanoseconds {
    /// Zero.
    pub const ZERO: Self = Self(0);

    /// Largest representable value, used as "never".
    pub const MAX: Self = Self(i64::MAX);

    /// Smallest representable value.
    pub const MIN: Self = Self(i64::MIN);

    /// Creates a value from milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Creates a value from seconds.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Returns the raw nanosecond count.
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Returns the smaller of two values.
    #[inline]
    #[must_use]
    pub const fn min(self, other: Self) -> Self {
        if self.0 < other.0 { self } else { other }
    }

    /// Returns the larger of two values.
    #[inline]
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self.0 > other.0 { self } else { other }
    }
}

impl Add for Nanoseconds {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for Nanoseconds {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Mul<i64> for Nanoseconds {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: i64) -> Self {
        Self(self.0.saturating_mul(rhs))
    }
}

impl Neg for Nanoseconds {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl fmt::Debug for Nanoseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MAX => write!(f, "Nanoseconds::MAX"),
            Self::MIN => write!(f, "Nanoseconds::MIN"),
            Self(ns) => write!(f, "Nanoseconds({ns})"),
        }
    }
}
