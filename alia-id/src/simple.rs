// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

use crate::erased::ErasedValue;
use crate::Id;

/// The concrete payload behind `Id::Simple`.
#[derive(Debug)]
pub(crate) struct Wrapped<T>(pub(crate) T);

impl<T> ErasedValue for Wrapped<T>
where
    T: Any + Clone + Eq + Ord + fmt::Debug + 'static,
{
    fn as_any_ref(&self) -> &dyn Any {
        &self.0
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn eq_erased(&self, other: &dyn Any) -> bool {
        match other.downcast_ref::<T>() {
            Some(other) => self.0 == *other,
            None => false,
        }
    }

    fn cmp_erased(&self, other: &dyn Any) -> Ordering {
        match other.downcast_ref::<T>() {
            Some(other) => self.0.cmp(other),
            // Callers only invoke this after confirming `type_name()` matches.
            None => unreachable!("cmp_erased called across mismatched concrete types"),
        }
    }

    fn clone_erased(&self) -> Box<dyn ErasedValue> {
        Box::new(Wrapped(self.0.clone()))
    }

    fn recapture_from(&mut self, other: &dyn ErasedValue) {
        let other = other
            .as_any_ref()
            .downcast_ref::<T>()
            .expect("recapture_from called across mismatched concrete types");
        self.0 = other.clone();
    }
}

/// Alias for [`crate::simple_id`] applied to `()`; every constant / unit-like
/// signal shares this id.
pub fn unit_id() -> Id {
    Id::Unit
}

/// Folds any number of ids into one compound id via left-associative
/// [`Id::paired_with`]. `combine_ids()` with no arguments is `Id::Unit`
/// (there is nothing to distinguish); `combine_ids(a)` is just `a`.
pub fn combine_ids(ids: impl IntoIterator<Item = Id>) -> Id {
    let mut iter = ids.into_iter();
    let Some(first) = iter.next() else {
        return Id::Unit;
    };
    iter.fold(first, Id::paired_with)
}

