// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::any::Any;
use std::cmp::Ordering;
use std::fmt::Debug;

/// Object-safe interface over a concrete `T: Any + Clone + Eq + Ord + Debug`,
/// implemented only by [`crate::simple::Wrapped`]. Kept as a private trait so
/// that `Id::Simple` can hold a `Box<dyn ErasedValue>` without exposing the
/// downcast machinery to callers.
pub(crate) trait ErasedValue: Debug {
    fn as_any_ref(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
    fn eq_erased(&self, other: &dyn Any) -> bool;
    fn cmp_erased(&self, other: &dyn Any) -> Ordering;
    fn clone_erased(&self) -> Box<dyn ErasedValue>;
    /// Overwrites `self` in place with `other`'s payload, reusing `self`'s
    /// allocation. Only ever called after the caller has confirmed
    /// `self.type_name() == other.type_name()`.
    fn recapture_from(&mut self, other: &dyn ErasedValue);
}
