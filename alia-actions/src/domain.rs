// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Domain-specific actions: `toggle`, `push_back`, `erase_index`,
//! `erase_key`, `apply`. Each reads-then-latches-then-writes
//! like [`crate::action::Copy`], but is a dedicated struct rather than a
//! literal `Copy` + derived-signal composition, since the signal types
//! involved (`Readable` + `Writable` on the same handle) generally aren't
//! `Clone`, so there's no cheap way to hand one read-only view to a
//! combinator and a write view to another. Functionally each is still
//! exactly "read, latch, write."

use std::collections::BTreeMap;
use std::marker::PhantomData;

use alia_signals::{write_signal, Readable, Writable};

use crate::action::{Action, Action1};
use crate::error::ActionError;

/// `toggle(flag) = flag <<= !flag`.
pub struct Toggle<S> {
    flag: S,
}

pub fn toggle<S: Readable<bool> + Writable<bool>>(flag: S) -> Toggle<S> {
    Toggle { flag }
}

impl<S: Readable<bool> + Writable<bool>> Action for Toggle<S> {
    fn is_ready(&self) -> bool {
        self.flag.has_value() && self.flag.ready_to_write()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let next = !*self.flag.read();
        latch()?;
        write_signal(&mut self.flag, next).map_err(ActionError::from)
    }
}

/// An [`Action1`] that appends its argument to `container`. Typically used
/// through [`crate::action::bind`]:
/// `bind(push_back(items), new_item)`.
pub struct PushBack<Item, S> {
    container: S,
    _marker: PhantomData<Item>,
}

pub fn push_back<Item, S>(container: S) -> PushBack<Item, S>
where
    S: Readable<Vec<Item>> + Writable<Vec<Item>>,
{
    PushBack {
        container,
        _marker: PhantomData,
    }
}

impl<Item: Clone, S: Readable<Vec<Item>> + Writable<Vec<Item>>> Action1<Item> for PushBack<Item, S> {
    fn is_ready(&self) -> bool {
        self.container.has_value() && self.container.ready_to_write()
    }
    fn perform(
        &mut self,
        arg: Item,
        latch: &mut dyn FnMut() -> Result<(), ActionError>,
    ) -> Result<(), ActionError> {
        let mut items = self.container.read().into_owned();
        items.push(arg);
        latch()?;
        write_signal(&mut self.container, items).map_err(ActionError::from)
    }
}

/// Removes the element at `index` from `container`. A no-op, reported as not ready, if
/// `index` is out of bounds.
pub struct EraseIndex<Item, S, I> {
    container: S,
    index: I,
    _marker: PhantomData<Item>,
}

pub fn erase_index<Item, S, I>(container: S, index: I) -> EraseIndex<Item, S, I>
where
    S: Readable<Vec<Item>> + Writable<Vec<Item>>,
    I: Readable<usize>,
{
    EraseIndex {
        container,
        index,
        _marker: PhantomData,
    }
}

impl<Item: Clone, S: Readable<Vec<Item>> + Writable<Vec<Item>>, I: Readable<usize>> Action
    for EraseIndex<Item, S, I>
{
    fn is_ready(&self) -> bool {
        self.container.has_value()
            && self.container.ready_to_write()
            && self.index.has_value()
            && *self.index.read() < self.container.read().len()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let mut items = self.container.read().into_owned();
        let index = *self.index.read();
        if index >= items.len() {
            return Ok(());
        }
        items.remove(index);
        latch()?;
        write_signal(&mut self.container, items).map_err(ActionError::from)
    }
}

/// Removes the entry for `key` from `container`.
pub struct EraseKey<K, V, S, KS> {
    container: S,
    key: KS,
    _marker: PhantomData<(K, V)>,
}

pub fn erase_key<K, V, S, KS>(container: S, key: KS) -> EraseKey<K, V, S, KS>
where
    S: Readable<BTreeMap<K, V>> + Writable<BTreeMap<K, V>>,
    KS: Readable<K>,
{
    EraseKey {
        container,
        key,
        _marker: PhantomData,
    }
}

impl<K: Clone + Ord, V: Clone, S: Readable<BTreeMap<K, V>> + Writable<BTreeMap<K, V>>, KS: Readable<K>>
    Action for EraseKey<K, V, S, KS>
{
    fn is_ready(&self) -> bool {
        self.container.has_value() && self.container.ready_to_write() && self.key.has_value()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let mut items = self.container.read().into_owned();
        let key = self.key.read().into_owned();
        latch()?;
        items.remove(&key);
        write_signal(&mut self.container, items).map_err(ActionError::from)
    }
}

/// `apply(f, state, args…) = state <<= lazy_apply(f, state, args…)`,
/// specialized to a single-argument `f` folding `state` into its own
/// next value.
pub struct ApplyAction<X, S, F> {
    state: S,
    f: F,
    _marker: PhantomData<X>,
}

pub fn apply_action<X, S, F>(state: S, f: F) -> ApplyAction<X, S, F>
where
    S: Readable<X> + Writable<X>,
    F: Fn(&X) -> X,
{
    ApplyAction {
        state,
        f,
        _marker: PhantomData,
    }
}

impl<X, S: Readable<X> + Writable<X>, F: Fn(&X) -> X> Action for ApplyAction<X, S, F> {
    fn is_ready(&self) -> bool {
        self.state.has_value() && self.state.ready_to_write()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let next = (self.f)(self.state.read().as_ref());
        latch()?;
        write_signal(&mut self.state, next).map_err(ActionError::from)
    }
}
