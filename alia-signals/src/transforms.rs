// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Signal transforms: thin adaptors that change how an
//! underlying signal is read or written without recomputing its value.
//! `signal_cast`, `add_default`, `unwrap`, the `mask*` family, `has_value`,
//! `ready_to_write`, `minimize_id_changes`, `simplify_id`, and the
//! movability-activating `activate` (named to avoid the `move` keyword) all
//! live here. `deflicker` is driven by a timer and so lives in
//! `alia-timer` instead; see DESIGN.md.

use std::borrow::Cow;
use std::cell::RefCell;
use std::marker::PhantomData;

use alia_id::Id;

use crate::capability::{Capability, ReadTier, WriteTier};
use crate::error::SignalError;
use crate::signal::{Movable, Readable, Signal, Writable};

/// Reinterprets a signal of `T` as a signal of `U` via `From`/`TryFrom`-free
/// closures, for cases where the two types are known to be the same
/// underlying representation (`signal_cast`).
pub struct SignalCast<T, U, S, Fwd, Rev> {
    inner: S,
    to: Fwd,
    from: Rev,
    _marker: PhantomData<fn(T) -> U>,
}

pub fn signal_cast<T, U, S, Fwd, Rev>(inner: S, to: Fwd, from: Rev) -> SignalCast<T, U, S, Fwd, Rev>
where
    S: Signal<T>,
    Fwd: Fn(&T) -> U,
    Rev: Fn(&U) -> T,
{
    SignalCast {
        inner,
        to,
        from,
        _marker: PhantomData,
    }
}

impl<T, U, S: Signal<T>, Fwd: Fn(&T) -> U, Rev: Fn(&U) -> T> Signal<U>
    for SignalCast<T, U, S, Fwd, Rev>
{
    fn has_value(&self) -> bool {
        self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        self.inner.capability()
    }
    fn is_invalidated(&self) -> bool {
        self.inner.is_invalidated()
    }
    fn invalidate(&mut self, error: SignalError) -> bool {
        self.inner.invalidate(error)
    }
}

impl<T: Clone, U: Clone, S: Readable<T>, Fwd: Fn(&T) -> U, Rev: Fn(&U) -> T> Readable<U>
    for SignalCast<T, U, S, Fwd, Rev>
{
    fn read(&self) -> Cow<'_, U> {
        Cow::Owned((self.to)(self.inner.read().as_ref()))
    }
}

impl<T, U, S: Writable<T>, Fwd: Fn(&T) -> U, Rev: Fn(&U) -> T> Writable<U>
    for SignalCast<T, U, S, Fwd, Rev>
{
    fn ready_to_write(&self) -> bool {
        self.inner.ready_to_write()
    }
    fn write(&mut self, value: U) -> Result<(), SignalError> {
        self.inner.write((self.from)(&value))
    }
}

/// Falls back to `T::default()` when `inner` has no value, rather than
/// propagating the absence (`add_default`).
pub struct AddDefault<T, S> {
    inner: S,
    default: T,
}

pub fn add_default<T: Default, S: Signal<T>>(inner: S) -> AddDefault<T, S> {
    AddDefault {
        inner,
        default: T::default(),
    }
}

impl<T, S: Signal<T>> Signal<T> for AddDefault<T, S> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        if self.inner.has_value() {
            self.inner.value_id()
        } else {
            alia_id::unit_id()
        }
    }
    fn capability(&self) -> Capability {
        Capability::new(self.inner.capability().read.max(ReadTier::Readable), WriteTier::Unwritable)
    }
}

impl<T: Clone, S: Readable<T>> Readable<T> for AddDefault<T, S> {
    fn read(&self) -> Cow<'_, T> {
        if self.inner.has_value() {
            self.inner.read()
        } else {
            Cow::Owned(self.default.clone())
        }
    }
}

/// Projects a signal of `Option<T>` to a signal of `T` that has no value
/// whenever the option is `None` (`unwrap`).
pub struct Unwrap<T, S> {
    inner: S,
    _marker: PhantomData<T>,
}

pub fn unwrap<T: Clone, S: Readable<Option<T>>>(inner: S) -> Unwrap<T, S> {
    Unwrap {
        inner,
        _marker: PhantomData,
    }
}

impl<T: Clone, S: Readable<Option<T>>> Signal<T> for Unwrap<T, S> {
    fn has_value(&self) -> bool {
        self.inner.has_value() && self.inner.read().is_some()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        Capability::new(self.inner.capability().read, WriteTier::Unwritable)
    }
}

impl<T: Clone, S: Readable<Option<T>>> Readable<T> for Unwrap<T, S> {
    fn read(&self) -> Cow<'_, T> {
        match self.inner.read() {
            Cow::Borrowed(Some(v)) => Cow::Owned(v.clone()),
            Cow::Owned(Some(v)) => Cow::Owned(v),
            _ => panic!("read() called on unwrap() signal holding None"),
        }
    }
}

/// Gates both read and write readiness on `flag` (`mask`).
pub struct Mask<T, S, F> {
    inner: S,
    flag: F,
    _marker: PhantomData<T>,
}

pub fn mask<T, S, F>(inner: S, flag: F) -> Mask<T, S, F>
where
    S: Signal<T>,
    F: Readable<bool>,
{
    Mask {
        inner,
        flag,
        _marker: PhantomData,
    }
}

impl<T, S: Signal<T>, F: Readable<bool>> Mask<T, S, F> {
    fn gate_open(&self) -> bool {
        self.flag.has_value() && *self.flag.read()
    }
}

impl<T, S: Signal<T>, F: Readable<bool>> Signal<T> for Mask<T, S, F> {
    fn has_value(&self) -> bool {
        self.gate_open() && self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        self.inner.capability()
    }
}

impl<T: Clone, S: Readable<T>, F: Readable<bool>> Readable<T> for Mask<T, S, F> {
    fn read(&self) -> Cow<'_, T> {
        self.inner.read()
    }
}

impl<T, S: Writable<T>, F: Readable<bool>> Writable<T> for Mask<T, S, F> {
    fn ready_to_write(&self) -> bool {
        self.gate_open() && self.inner.ready_to_write()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        self.inner.write(value)
    }
}

/// Gates only read readiness on `flag`, leaving writes unaffected.
pub struct MaskReads<T, S, F> {
    inner: S,
    flag: F,
    _marker: PhantomData<T>,
}

pub fn mask_reads<T, S, F>(inner: S, flag: F) -> MaskReads<T, S, F>
where
    S: Signal<T>,
    F: Readable<bool>,
{
    MaskReads {
        inner,
        flag,
        _marker: PhantomData,
    }
}

impl<T, S: Signal<T>, F: Readable<bool>> Signal<T> for MaskReads<T, S, F> {
    fn has_value(&self) -> bool {
        self.flag.has_value() && *self.flag.read() && self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        self.inner.capability()
    }
}

impl<T: Clone, S: Readable<T>, F: Readable<bool>> Readable<T> for MaskReads<T, S, F> {
    fn read(&self) -> Cow<'_, T> {
        self.inner.read()
    }
}

impl<T, S: Writable<T>, F: Readable<bool>> Writable<T> for MaskReads<T, S, F> {
    fn ready_to_write(&self) -> bool {
        self.inner.ready_to_write()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        self.inner.write(value)
    }
}

/// Gates only write readiness on `flag`, leaving reads unaffected.
pub struct MaskWrites<T, S, F> {
    inner: S,
    flag: F,
    _marker: PhantomData<T>,
}

pub fn mask_writes<T, S, F>(inner: S, flag: F) -> MaskWrites<T, S, F>
where
    S: Signal<T>,
    F: Readable<bool>,
{
    MaskWrites {
        inner,
        flag,
        _marker: PhantomData,
    }
}

impl<T, S: Signal<T>, F: Readable<bool>> Signal<T> for MaskWrites<T, S, F> {
    fn has_value(&self) -> bool {
        self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        self.inner.capability()
    }
}

impl<T: Clone, S: Readable<T>, F: Readable<bool>> Readable<T> for MaskWrites<T, S, F> {
    fn read(&self) -> Cow<'_, T> {
        self.inner.read()
    }
}

impl<T, S: Writable<T>, F: Readable<bool>> Writable<T> for MaskWrites<T, S, F> {
    fn ready_to_write(&self) -> bool {
        self.flag.has_value() && *self.flag.read() && self.inner.ready_to_write()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        self.inner.write(value)
    }
}

/// Projects any signal to a `bool` signal of its own `has_value()`. Always
/// itself has a value.
pub struct HasValueSignal<T, S> {
    inner: S,
    _marker: PhantomData<T>,
}

pub fn has_value<T, S: Signal<T>>(inner: S) -> HasValueSignal<T, S> {
    HasValueSignal {
        inner,
        _marker: PhantomData,
    }
}

impl<T, S: Signal<T>> Signal<bool> for HasValueSignal<T, S> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        if self.inner.has_value() {
            alia_id::unit_id()
        } else {
            Id::Null
        }
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<T, S: Signal<T>> Readable<bool> for HasValueSignal<T, S> {
    fn read(&self) -> Cow<'_, bool> {
        Cow::Owned(self.inner.has_value())
    }
}

/// Projects a writable signal to a `bool` signal of its own
/// `ready_to_write()` (`ready_to_write`).
pub struct ReadyToWrite<T, S> {
    inner: S,
    _marker: PhantomData<T>,
}

pub fn ready_to_write<T, S: Writable<T>>(inner: S) -> ReadyToWrite<T, S> {
    ReadyToWrite {
        inner,
        _marker: PhantomData,
    }
}

impl<T, S: Writable<T>> Signal<bool> for ReadyToWrite<T, S> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        if self.inner.ready_to_write() {
            alia_id::unit_id()
        } else {
            Id::Null
        }
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<T, S: Writable<T>> Readable<bool> for ReadyToWrite<T, S> {
    fn read(&self) -> Cow<'_, bool> {
        Cow::Owned(self.inner.ready_to_write())
    }
}

/// Debounces `inner`'s id changes: keeps returning the last-read value (and
/// its id) as long as a freshly read value compares structurally equal,
/// only emitting a new id when the value has actually changed. Also backs
/// `simplify_id`, which is the same behavior under a different name for
/// callers projecting away a fine-grained id onto a coarse equality check.
pub struct MinimizeIdChanges<T, S> {
    inner: S,
    last: RefCell<Option<(T, Id)>>,
}

pub fn minimize_id_changes<T: Clone + PartialEq, S: Readable<T>>(inner: S) -> MinimizeIdChanges<T, S> {
    MinimizeIdChanges {
        inner,
        last: RefCell::new(None),
    }
}

/// Alias for [`minimize_id_changes`] under its other name for the same
/// transform.
pub fn simplify_id<T: Clone + PartialEq, S: Readable<T>>(inner: S) -> MinimizeIdChanges<T, S> {
    minimize_id_changes(inner)
}

impl<T: Clone + PartialEq, S: Readable<T>> MinimizeIdChanges<T, S> {
    fn refresh(&self) {
        if !self.inner.has_value() {
            return;
        }
        let value = self.inner.read().into_owned();
        let mut last = self.last.borrow_mut();
        let changed = match &*last {
            Some((prev, _)) => *prev != value,
            None => true,
        };
        if changed {
            *last = Some((value, self.inner.value_id()));
        }
    }
}

impl<T: Clone + PartialEq, S: Readable<T>> Signal<T> for MinimizeIdChanges<T, S> {
    fn has_value(&self) -> bool {
        self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.refresh();
        self.last
        .borrow()
        .as_ref()
        .map(|(_, id)| id.clone())
        .unwrap_or(Id::Null)
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<T: Clone + PartialEq, S: Readable<T>> Readable<T> for MinimizeIdChanges<T, S> {
    fn read(&self) -> Cow<'_, T> {
        self.refresh();
        Cow::Owned(
            self.last
            .borrow()
            .as_ref()
            .expect("read() called on minimize_id_changes() signal with has_value() == false")
            .0
            .clone(),
        )
    }
}

/// Activates movability on a merely-readable signal by cloning on move
/// (`move`, renamed here since `move` is a reserved word).
pub struct Activated<T, S> {
    inner: S,
    _marker: PhantomData<T>,
}

pub fn activate<T, S: Signal<T>>(inner: S) -> Activated<T, S> {
    Activated {
        inner,
        _marker: PhantomData,
    }
}

impl<T, S: Signal<T>> Signal<T> for Activated<T, S> {
    fn has_value(&self) -> bool {
        self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::MoveActivated, self.inner.capability().write)
    }
}

impl<T: Clone, S: Readable<T>> Readable<T> for Activated<T, S> {
    fn read(&self) -> Cow<'_, T> {
        self.inner.read()
    }
}

impl<T: Clone, S: Readable<T>> Movable<T> for Activated<T, S> {
    fn move_out(&mut self) -> T {
        self.inner.read().into_owned()
    }
}

impl<T, S: Writable<T>> Writable<T> for Activated<T, S> {
    fn ready_to_write(&self) -> bool {
        self.inner.ready_to_write()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        self.inner.write(value)
    }
}

/// Stores the last write error from `inner` and reports `has_value() ==
/// false` while it's active, clearing automatically once `inner`'s value
/// id moves on ("Validation", `validated_signal`).
pub struct Validated<T, S> {
    inner: S,
    error: RefCell<Option<SignalError>>,
    error_since: RefCell<Option<Id>>,
    _marker: PhantomData<T>,
}

pub fn validated<T, S: Signal<T>>(inner: S) -> Validated<T, S> {
    Validated {
        inner,
        error: RefCell::new(None),
        error_since: RefCell::new(None),
        _marker: PhantomData,
    }
}

impl<T, S: Signal<T>> Validated<T, S> {
    /// Drops a stale error once the underlying value has moved on from the
    /// id it was recorded against.
    fn refresh(&self) {
        let current = if self.inner.has_value() {
            Some(self.inner.value_id())
        } else {
            None
        };
        let mut since = self.error_since.borrow_mut();
        if *since != current {
            *self.error.borrow_mut() = None;
            *since = None;
        }
    }
}

impl<T, S: Signal<T>> Signal<T> for Validated<T, S> {
    fn has_value(&self) -> bool {
        self.refresh();
        self.error.borrow().is_none() && self.inner.has_value()
    }
    fn value_id(&self) -> Id {
        self.inner.value_id()
    }
    fn capability(&self) -> Capability {
        self.inner.capability()
    }
    fn is_invalidated(&self) -> bool {
        self.refresh();
        self.error.borrow().is_some()
    }
    fn invalidate(&mut self, error: SignalError) -> bool {
        *self.error.get_mut() = Some(error);
        *self.error_since.get_mut() = if self.inner.has_value() {
            Some(self.inner.value_id())
        } else {
            None
        };
        true
    }
}

impl<T: Clone, S: Readable<T>> Readable<T> for Validated<T, S> {
    fn read(&self) -> Cow<'_, T> {
        self.refresh();
        self.inner.read()
    }
}

impl<T, S: Writable<T>> Writable<T> for Validated<T, S> {
    fn ready_to_write(&self) -> bool {
        self.inner.ready_to_write()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        self.inner.write(value)
    }
}
