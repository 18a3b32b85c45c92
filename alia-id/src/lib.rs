// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Polymorphic, comparable, clonable identity values.
//!
//! An [`Id`] is alia's answer to "does this still refer to the same thing".
//! Signals attach an `Id` to their current value (the *value id*); the data
//! graph attaches one to each entry in a naming context (the *name*). Two
//! different concrete representations of "the same identity" never compare
//! equal by construction: an `Id` built from `42i32` is never equal to one
//! built from `42i64`, and ids of genuinely different shapes (a `Simple` vs a
//! `Pair`) never compare equal either.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

mod erased;
mod simple;

pub use simple::{combine_ids, unit_id};

use erased::ErasedValue;

/// A strict-weak-order, equality-comparable, clonable identity.
///
/// `Id` is a closed sum over the concrete representations the runtime
/// actually needs. Each variant is cheap to construct and to compare;
/// only [`Id::Simple`] allocates.
pub enum Id {
    /// The distinguished "no identity" value. Never equal to anything but
    /// another `Null`.
    Null,
    /// The distinguished identity shared by every unit-like ("no
    /// meaningful payload") value, e.g. constant signals.
    Unit,
    /// A type-erased copy of some `T: Eq + Ord + Clone + 'static`.
    Simple(Box<dyn ErasedValue>),
    /// Identity by address: two `ByAddress` ids are equal iff they were
    /// built from the same memory location *at construction time*. Cloning
    /// an `Id::ByAddress` copies the recorded address, not the pointee.
    ByAddress(ByAddressId),
    /// Lexicographic composition of two ids, used to build compound
    /// identities (e.g. a list item's "index or key" combined with its
    /// container's id).
    Pair(Box<Id>, Box<Id>),
    /// A reference-counted id: cloning shares ownership of the same
    /// allocation rather than deep-copying it. Used when an id is
    /// expensive to construct but cheap to share, e.g. a captured id handed
    /// out to many readers in the same traversal.
    Ref(Rc<Id>),
}

/// The kind discriminant used to order ids of different shapes against one
/// another. Arbitrary but fixed, so that `Ord` stays total and stable across
/// runs.
fn kind_rank(id: &Id) -> u8 {
    match id {
        Id::Null => 0,
        Id::Unit => 1,
        Id::Simple(_) => 2,
        Id::ByAddress(_) => 3,
        Id::Pair(..) => 4,
        Id::Ref(_) => 5,
    }
}

impl Id {
    /// Builds a `Simple` id from a value's address, without copying the
    /// value. Used by `direct()` signals and other adaptors over an
    /// existing place, where identity should change iff the caller swaps in
    /// a different underlying storage location.
    pub fn by_address<T>(value: &T) -> Id {
        Id::ByAddress(ByAddressId {
                address: value as *const T as usize,
                type_name: std::any::type_name::<T>(),
        })
    }

    /// Composes `self` and `other` into a `Pair` id. `combine_ids` in
    /// [`simple`] folds more than two ids using this.
    pub fn paired_with(self, other: Id) -> Id {
        Id::Pair(Box::new(self), Box::new(other))
    }

    /// True for the two sentinel ids (`Null`, `Unit`); these never
    /// allocate and are always "already available".
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Id::Null | Id::Unit)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Null => write!(f, "Id::Null"),
            Id::Unit => write!(f, "Id::Unit"),
            Id::Simple(v) => write!(f, "Id::Simple({v:?})"),
            Id::ByAddress(b) => write!(f, "Id::ByAddress({:#x}@{})", b.address, b.type_name),
            Id::Pair(a, b) => write!(f, "Id::Pair({a:?}, {b:?})"),
            Id::Ref(r) => write!(f, "Id::Ref({r:?})"),
        }
    }
}

impl Clone for Id {
    fn clone(&self) -> Id {
        match self {
            Id::Null => Id::Null,
            Id::Unit => Id::Unit,
            Id::Simple(v) => Id::Simple(v.clone_erased()),
            Id::ByAddress(b) => Id::ByAddress(*b),
            Id::Pair(a, b) => Id::Pair(a.clone(), b.clone()),
            Id::Ref(r) => Id::Ref(r.clone()),
        }
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Id) -> bool {
        match (self, other) {
            (Id::Null, Id::Null) | (Id::Unit, Id::Unit) => true,
            (Id::Simple(a), Id::Simple(b)) => a.eq_erased(b.as_any_ref()),
            (Id::ByAddress(a), Id::ByAddress(b)) => a == b,
            (Id::Pair(a1, a2), Id::Pair(b1, b2)) => a1 == b1 && a2 == b2,
            (Id::Ref(a), Id::Ref(b)) => Rc::ptr_eq(a, b) || **a == **b,
            // An `Id::Ref` is transparent for equality: unwrap it against a
            // non-`Ref` counterpart too, so that capturing a `Ref` and later
            // comparing against the plain id it wraps still works.
            (Id::Ref(a), b) => **a == *b,
            (a, Id::Ref(b)) => *a == **b,
            _ => false,
        }
    }
}

impl Eq for Id {}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Id) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Id) -> Ordering {
        match (self, other) {
            (Id::Ref(a), b) => (**a).cmp(b),
            (a, Id::Ref(b)) => a.cmp(&**b),
            (Id::Null, Id::Null) | (Id::Unit, Id::Unit) => Ordering::Equal,
            (Id::Simple(a), Id::Simple(b)) => {
                match a.type_name().cmp(b.type_name()) {
                    Ordering::Equal => a.cmp_erased(b.as_any_ref()),
                    other => other,
                }
            }
            (Id::ByAddress(a), Id::ByAddress(b)) => a.cmp(b),
            (Id::Pair(a1, a2), Id::Pair(b1, b2)) => a1.cmp(b1).then_with(|| a2.cmp(b2)),
            _ => kind_rank(self).cmp(&kind_rank(other)),
        }
    }
}

/// Identity by the address of some `T`. See [`Id::by_address`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ByAddressId {
    address: usize,
    type_name: &'static str,
}

impl Ord for ByAddressId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.type_name
        .cmp(other.type_name)
        .then_with(|| self.address.cmp(&other.address))
    }
}
impl PartialOrd for ByAddressId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Constructs a `Simple` id from any comparable, clonable, `'static` value.
pub fn simple_id<T>(value: T) -> Id
where
    T: Any + Clone + Eq + Ord + fmt::Debug + 'static,
{
    Id::Simple(Box::new(simple::Wrapped(value)))
}

/// Free-function form of [`Id::by_address`], for call sites that prefer a
/// plain function over an associated one.
pub fn by_address_id<T>(value: &T) -> Id {
    Id::by_address(value)
}

/// A heap-owned copy of an [`Id`], suitable for storing across traversals.
///
/// `capture` re-uses the existing allocation when the incoming id has the
/// same concrete shape as what's already captured, so a deep copy avoids
/// reallocation. This matters for `Simple` ids of a `Copy` payload
/// captured every frame: after the first capture, subsequent captures of
/// an equal-shaped id never allocate.
#[derive(Debug, Default)]
pub struct CapturedId(Option<Id>);

impl CapturedId {
    pub fn new() -> CapturedId {
        CapturedId(None)
    }

    /// True once `capture` has been called at least once.
    pub fn is_initialized(&self) -> bool {
        self.0.is_some()
    }

    /// Leaves `self` deep-equal to `id`, with no borrowed references into
    /// `id` retained.
    pub fn capture(&mut self, id: &Id) {
        match (&mut self.0, id) {
            (Some(Id::Simple(existing)), Id::Simple(incoming))
            if existing.type_name() == incoming.type_name() =>
            {
                existing.recapture_from(incoming.as_ref());
            }
            _ => self.0 = Some(id.clone()),
        }
    }

    /// True iff `self` is initialized and compares equal to `id`.
    pub fn matches(&self, id: &Id) -> bool {
        matches!(&self.0, Some(existing) if existing == id)
    }

    pub fn get(&self) -> Option<&Id> {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests;
