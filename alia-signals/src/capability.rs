// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The read/write capability lattice.
//!
//! Both tiers are linear chains (`unreadable ⊂ readable ⊂ movable ⊂
//! move-activated`, `unwritable ⊂ writable ⊂ clearable`), so ordinary
//! derived [`Ord`] on a small enum already gives the subset relationship
//! needed here — no bit-flag lattice is needed. [`Capability`] is the
//! runtime-checked counterpart to `alia-signals`'s `Readable`/`Writable`/
//! `Movable`/`Clearable` marker traits; most call sites use the marker
//! traits, and a handful that need to accept a boxed, capability-erased
//! signal check `Capability::satisfies` instead.

use std::cmp::Ordering;

/// How a signal may be read.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum ReadTier {
    Unreadable,
    Readable,
    Movable,
    MoveActivated,
}

/// How a signal may be written.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum WriteTier {
    Unwritable,
    Writable,
    Clearable,
}

/// The full capability of a signal: a point in the read × write lattice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Capability {
    pub read: ReadTier,
    pub write: WriteTier,
}

impl Capability {
    pub const NONE: Capability = Capability {
        read: ReadTier::Unreadable,
        write: WriteTier::Unwritable,
    };

    pub const fn new(read: ReadTier, write: WriteTier) -> Capability {
        Capability { read, write }
    }

    /// True iff a signal with `self`'s capability can stand in anywhere a
    /// signal of `required` capability is expected: `self.read >=
    /// required.read && self.write >= required.write`.
    pub fn satisfies(&self, required: Capability) -> bool {
        self.read >= required.read && self.write >= required.write
    }

    pub fn intersect(self, other: Capability) -> Capability {
        Capability {
            read: self.read.min(other.read),
            write: self.write.min(other.write),
        }
    }

    pub fn union(self, other: Capability) -> Capability {
        Capability {
            read: self.read.max(other.read),
            write: self.write.max(other.write),
        }
    }
}

impl PartialOrd for Capability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.read.cmp(&other.read), self.write.cmp(&other.write)) {
            (Ordering::Equal, Ordering::Equal) => Some(Ordering::Equal),
            (Ordering::Less | Ordering::Equal, Ordering::Less | Ordering::Equal) => {
                Some(Ordering::Less)
            }
            (Ordering::Greater | Ordering::Equal, Ordering::Greater | Ordering::Equal) => {
                Some(Ordering::Greater)
            }
            _ => None,
        }
    }
}
