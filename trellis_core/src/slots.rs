// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational slot allocation shared by every handle family.

use alloc::collections::VecDeque;
use alloc::vec::Vec;

/// Slot allocator with per-slot generation counters.
///
/// Freed slots are reused first-in first-out so that a freshly freed slot
/// isn't immediately handed out again, which spreads generation increments
/// over all slots. A slot whose generation would overflow its bit range is
/// disabled and never reused.
#[derive(Debug)]
pub(crate) struct Slots {
    /// Generation of the handle currently (or next) living in each slot.
    /// Zero marks a disabled slot.
    generation: Vec<u16>,
    occupied: Vec<bool>,
    free_list: VecDeque<u32>,
    id_bits: u32,
    generation_bits: u32,
}

impl Slots {
    pub(crate) fn new(id_bits: u32, generation_bits: u32) -> Self {
        Self {
            generation: Vec::new(),
            occupied: Vec::new(),
            free_list: VecDeque::new(),
            id_bits,
            generation_bits,
        }
    }

    /// Number of slots allocated so far, occupied or not.
    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "slot count is bounded by 1 << id_bits"
    )]
    pub(crate) fn capacity(&self) -> u32 {
        self.generation.len() as u32
    }

    /// Number of slots that aren't available for reuse.
    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "free list length is bounded by the slot count"
    )]
    pub(crate) fn used_count(&self) -> u32 {
        self.capacity() - self.free_list.len() as u32
    }

    /// Allocates a slot and returns its `(id, generation)`.
    ///
    /// # Panics
    ///
    /// Panics if all `1 << id_bits` slots are in use.
    pub(crate) fn create(&mut self, what: &str) -> (u32, u32) {
        let id = if let Some(id) = self.free_list.pop_front() {
            id
        } else {
            let id = self.capacity();
            assert!(
                id < 1 << self.id_bits,
                "{what}: can only have at most {} objects",
                1_u32 << self.id_bits
            );
            self.generation.push(1);
            self.occupied.push(false);
            id
        };
        self.occupied[id as usize] = true;
        (id, u32::from(self.generation[id as usize]))
    }

    /// Whether `(id, generation)` refers to an occupied slot.
    #[inline]
    pub(crate) fn is_valid(&self, id: u32, generation: u32) -> bool {
        (id as usize) < self.generation.len()
            && self.occupied[id as usize]
            && u32::from(self.generation[id as usize]) == generation
    }

    /// Whether the slot is currently occupied.
    #[inline]
    pub(crate) fn is_occupied(&self, id: u32) -> bool {
        self.occupied[id as usize]
    }

    /// Generation of the handle living in `id`.
    #[inline]
    pub(crate) fn generation(&self, id: u32) -> u32 {
        u32::from(self.generation[id as usize])
    }

    /// Per-slot generations, for comparing against generations stored in
    /// attachments.
    #[inline]
    pub(crate) fn generations(&self) -> &[u16] {
        &self.generation
    }

    /// Invalidates the handle living in `id` without making the slot
    /// available again. Pair with [`recycle`](Self::recycle).
    #[expect(
        clippy::cast_possible_truncation,
        reason = "generation is bounded by 1 << generation_bits <= 1 << 12"
    )]
    pub(crate) fn retire(&mut self, id: u32) {
        debug_assert!(self.occupied[id as usize], "retiring a free slot");
        self.occupied[id as usize] = false;
        let next = u32::from(self.generation[id as usize]) + 1;
        self.generation[id as usize] = if next == 1 << self.generation_bits {
            0
        } else {
            next as u16
        };
    }

    /// Makes a retired slot available for reuse, unless its generation
    /// overflowed.
    pub(crate) fn recycle(&mut self, id: u32) {
        if self.generation[id as usize] != 0 {
            self.free_list.push_back(id);
        }
    }

    /// Retires and recycles in one step.
    pub(crate) fn remove(&mut self, id: u32) {
        self.retire(id);
        self.recycle(id);
    }
}
