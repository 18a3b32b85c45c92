// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::borrow::Cow;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use alia_id::Id;

use crate::capability::{Capability, ReadTier, WriteTier};
use crate::error::SignalError;
use crate::signal::{Movable, Readable, Signal, Writable};

/// A constant signal: always has a value, never writable. Move-activated.
pub struct ValueSignal<T> {
    value: T,
}

/// Constructs a constant signal over `v`. A constant signal's value never
/// changes for the life of the signal, so its `value_id` is always
/// `unit_id` — there is nothing for a consumer to usefully diff against.
pub fn value<T: Clone + 'static>(v: T) -> ValueSignal<T> {
    ValueSignal { value: v }
}

impl<T> Signal<T> for ValueSignal<T> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        alia_id::unit_id()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::MoveActivated, WriteTier::Unwritable)
    }
}

impl<T: Clone> Readable<T> for ValueSignal<T> {
    fn read(&self) -> Cow<'_, T> {
        Cow::Borrowed(&self.value)
    }
}

impl<T: Clone> Movable<T> for ValueSignal<T> {
    fn move_out(&mut self) -> T {
        self.value.clone()
    }
}

/// A duplex view over a shared, interior-mutable place: reading borrows it,
/// writing replaces it. Built on this runtime's `Rc<RefCell<_>>` sharing
/// convention (see `alia-context`'s module docs) in place of a raw
/// reference, since a signal may outlive the stack frame that produced it.
pub struct Direct<T> {
    cell: Rc<RefCell<T>>,
    value: T,
    id: Id,
}

pub fn direct<T: Clone + 'static>(cell: Rc<RefCell<T>>) -> Direct<T> {
    let value = cell.borrow().clone();
    let id = Id::by_address(&*cell);
    Direct { cell, value, id }
}

impl<T: Clone> Direct<T> {
    fn refresh_snapshot(&mut self) {
        self.value = self.cell.borrow().clone();
    }
}

impl<T: Clone + 'static> Signal<T> for Direct<T> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        // Identity tracks the underlying storage location, not the value:
        // `direct` signals are cheap precisely because callers are expected
        // to re-read every frame rather than diff by id.
        self.id.clone()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<T: Clone + 'static> Readable<T> for Direct<T> {
    fn read(&self) -> Cow<'_, T> {
        Cow::Borrowed(&self.value)
    }
}

impl<T: Clone + 'static> Writable<T> for Direct<T> {
    fn ready_to_write(&self) -> bool {
        true
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        *self.cell.borrow_mut() = value;
        self.refresh_snapshot();
        Ok(())
    }
}

/// A signal that never has a value. Used as a placeholder default in
/// generic code.
pub struct Empty<T>(PhantomData<T>);

pub fn empty<T>() -> Empty<T> {
    Empty(PhantomData)
}

impl<T> Signal<T> for Empty<T> {
    fn has_value(&self) -> bool {
        false
    }
    fn value_id(&self) -> Id {
        Id::Null
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Unreadable, WriteTier::Unwritable)
    }
}

/// A constant signal holding `T::default()`.
pub fn default_initialized<T: Default + Clone + 'static>() -> ValueSignal<T> {
    value(T::default())
}
