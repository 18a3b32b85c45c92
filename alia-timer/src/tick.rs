// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Frame ticks: a host-supplied monotonic counter in
//! arbitrary units, compared with wraparound tolerance so a `u32` counter
//! that eventually wraps around still orders correctly across the wrap.

use std::cmp::Ordering;

/// A point in time, in ticks since some host-chosen epoch. Exposes its
/// representation directly rather than hiding a private field behind
/// constructor-only access.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Tick(pub u32);

impl Tick {
    /// `self - other`, tolerant of `u32` wraparound: meaningful as long as
    /// the true difference fits in an `i32`.
    pub fn wrapping_diff(self, other: Tick) -> i32 {
        self.0.wrapping_sub(other.0) as i32
    }

    pub fn wrapping_add(self, delta: u32) -> Tick {
        Tick(self.0.wrapping_add(delta))
    }
}

impl PartialOrd for Tick {
    fn partial_cmp(&self, other: &Tick) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tick {
    fn cmp(&self, other: &Tick) -> Ordering {
        self.wrapping_diff(*other).cmp(&0)
    }
}
