// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered instance registry used for layers, layouters and animators.

use alloc::vec::Vec;

use crate::handle::{INVALID, SMALL_GENERATION_BITS, SMALL_ID_BITS};
use crate::slots::Slots;

/// Generation-checked slots holding an optional instance each, linked into a
/// single order.
///
/// A slot is allocated first and gets its instance later, so a handle can be
/// passed to the instance's constructor. Callers walk the order with
/// [`first`](Self::first) and [`next`](Self::next) and look instances up by
/// id, which keeps the registry borrowable mutably inside the loop.
#[derive(Debug)]
pub(crate) struct Registry<T> {
    slots: Slots,
    instances: Vec<Option<T>>,
    previous: Vec<u32>,
    next: Vec<u32>,
    first: u32,
    last: u32,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Slots::new(SMALL_ID_BITS, SMALL_GENERATION_BITS),
            instances: Vec::new(),
            previous: Vec::new(),
            next: Vec::new(),
            first: INVALID,
            last: INVALID,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    #[inline]
    pub(crate) fn used_count(&self) -> u32 {
        self.slots.used_count()
    }

    #[inline]
    pub(crate) fn is_valid(&self, id: u32, generation: u32) -> bool {
        self.slots.is_valid(id, generation)
    }

    #[inline]
    pub(crate) fn generation(&self, id: u32) -> u32 {
        self.slots.generation(id)
    }

    /// Allocates a slot and links it before `before`, or at the end if
    /// `before` is [`INVALID`]. The caller validates `before`.
    pub(crate) fn create(&mut self, what: &str, before: u32) -> (u32, u32) {
        let (id, generation) = self.slots.create(what);
        let idx = id as usize;
        if idx == self.instances.len() {
            self.instances.push(None);
            self.previous.push(INVALID);
            self.next.push(INVALID);
        }

        let prev = if before == INVALID {
            self.last
        } else {
            self.previous[before as usize]
        };
        self.previous[idx] = prev;
        self.next[idx] = before;
        if prev == INVALID {
            self.first = id;
        } else {
            self.next[prev as usize] = id;
        }
        if before == INVALID {
            self.last = id;
        } else {
            self.previous[before as usize] = id;
        }
        (id, generation)
    }

    /// Unlinks and frees the slot, returning its instance.
    pub(crate) fn remove(&mut self, id: u32) -> Option<T> {
        let idx = id as usize;
        let prev = self.previous[idx];
        let next = self.next[idx];
        if prev == INVALID {
            self.first = next;
        } else {
            self.next[prev as usize] = next;
        }
        if next == INVALID {
            self.last = prev;
        } else {
            self.previous[next as usize] = prev;
        }
        self.previous[idx] = INVALID;
        self.next[idx] = INVALID;
        self.slots.remove(id);
        self.instances[idx].take()
    }

    #[inline]
    pub(crate) fn has_instance(&self, id: u32) -> bool {
        self.instances[id as usize].is_some()
    }

    pub(crate) fn set_instance(&mut self, id: u32, instance: T) {
        self.instances[id as usize] = Some(instance);
    }

    #[inline]
    pub(crate) fn instance(&self, id: u32) -> Option<&T> {
        self.instances.get(id as usize)?.as_ref()
    }

    #[inline]
    pub(crate) fn instance_mut(&mut self, id: u32) -> Option<&mut T> {
        self.instances.get_mut(id as usize)?.as_mut()
    }

    /// Ids of all slots that currently hold an instance, in order.
    pub(crate) fn ordered_ids(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut id = self.first;
        while id != INVALID {
            if self.instances[id as usize].is_some() {
                out.push(id);
            }
            id = self.next[id as usize];
        }
        out
    }

    #[inline]
    pub(crate) fn first(&self) -> u32 {
        self.first
    }

    #[inline]
    pub(crate) fn last(&self) -> u32 {
        self.last
    }

    #[inline]
    pub(crate) fn previous(&self, id: u32) -> u32 {
        self.previous[id as usize]
    }

    #[inline]
    pub(crate) fn next(&self, id: u32) -> u32 {
        self.next[id as usize]
    }
}
