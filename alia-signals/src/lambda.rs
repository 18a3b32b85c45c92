// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::borrow::Cow;
use std::marker::PhantomData;

use alia_id::Id;

use crate::capability::{Capability, ReadTier, WriteTier};
use crate::error::SignalError;
use crate::signal::{Readable, Signal, Writable};

/// Builds a read-only signal from plain closures. `id_fn` defaults to
/// `unit_id` (see [`lambda_reader_with_id`]) when the value's identity
/// can't usefully be distinguished from its presence.
pub struct LambdaReader<T, HasFn, ReadFn, IdFn> {
    has_value: HasFn,
    read: ReadFn,
    id: IdFn,
    _value: PhantomData<fn() -> T>,
}

pub fn lambda_reader<T, HasFn, ReadFn>(
    has_value: HasFn,
    read: ReadFn,
) -> LambdaReader<T, HasFn, ReadFn, fn() -> Id>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
{
    LambdaReader {
        has_value,
        read,
        id: alia_id::unit_id as fn() -> Id,
        _value: PhantomData,
    }
}

pub fn lambda_reader_with_id<T, HasFn, ReadFn, IdFn>(
    has_value: HasFn,
    read: ReadFn,
    id: IdFn,
) -> LambdaReader<T, HasFn, ReadFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    IdFn: Fn() -> Id,
{
    LambdaReader {
        has_value,
        read,
        id,
        _value: PhantomData,
    }
}

impl<T, HasFn, ReadFn, IdFn> Signal<T> for LambdaReader<T, HasFn, ReadFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    IdFn: Fn() -> Id,
{
    fn has_value(&self) -> bool {
        (self.has_value)()
    }
    fn value_id(&self) -> Id {
        (self.id)()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<T: Clone, HasFn, ReadFn, IdFn> Readable<T> for LambdaReader<T, HasFn, ReadFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    IdFn: Fn() -> Id,
{
    fn read(&self) -> Cow<'_, T> {
        Cow::Owned((self.read)())
    }
}

/// A signal whose value never changes and is computed once per call to
/// `read` but always carries `unit_id` (`lambda_constant`).
pub struct LambdaConstant<T, ReadFn> {
    read: ReadFn,
    _value: PhantomData<fn() -> T>,
}

pub fn lambda_constant<T, ReadFn: Fn() -> T>(read: ReadFn) -> LambdaConstant<T, ReadFn> {
    LambdaConstant {
        read,
        _value: PhantomData,
    }
}

impl<T, ReadFn: Fn() -> T> Signal<T> for LambdaConstant<T, ReadFn> {
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

impl<T: Clone, ReadFn: Fn() -> T> Readable<T> for LambdaConstant<T, ReadFn> {
    fn read(&self) -> Cow<'_, T> {
        Cow::Owned((self.read)())
    }
}

/// Builds a duplex (readable + writable) signal from closures.
pub struct LambdaDuplex<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn> {
    has_value: HasFn,
    read: ReadFn,
    ready_to_write: ReadyFn,
    write: WriteFn,
    id: IdFn,
    _value: PhantomData<fn() -> T>,
}

#[allow(clippy::too_many_arguments)]
pub fn lambda_duplex<T, HasFn, ReadFn, ReadyFn, WriteFn>(
    has_value: HasFn,
    read: ReadFn,
    ready_to_write: ReadyFn,
    write: WriteFn,
) -> LambdaDuplex<T, HasFn, ReadFn, ReadyFn, WriteFn, fn() -> Id>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    ReadyFn: Fn() -> bool,
    WriteFn: FnMut(T) -> Result<(), SignalError>,
{
    LambdaDuplex {
        has_value,
        read,
        ready_to_write,
        write,
        id: alia_id::unit_id as fn() -> Id,
        _value: PhantomData,
    }
}

#[allow(clippy::too_many_arguments)]
pub fn lambda_duplex_with_id<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn>(
    has_value: HasFn,
    read: ReadFn,
    ready_to_write: ReadyFn,
    write: WriteFn,
    id: IdFn,
) -> LambdaDuplex<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    ReadyFn: Fn() -> bool,
    WriteFn: FnMut(T) -> Result<(), SignalError>,
    IdFn: Fn() -> Id,
{
    LambdaDuplex {
        has_value,
        read,
        ready_to_write,
        write,
        id,
        _value: PhantomData,
    }
}

impl<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn> Signal<T>
    for LambdaDuplex<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    ReadyFn: Fn() -> bool,
    WriteFn: FnMut(T) -> Result<(), SignalError>,
    IdFn: Fn() -> Id,
{
    fn has_value(&self) -> bool {
        (self.has_value)()
    }
    fn value_id(&self) -> Id {
        (self.id)()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<T: Clone, HasFn, ReadFn, ReadyFn, WriteFn, IdFn> Readable<T>
    for LambdaDuplex<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    ReadyFn: Fn() -> bool,
    WriteFn: FnMut(T) -> Result<(), SignalError>,
    IdFn: Fn() -> Id,
{
    fn read(&self) -> Cow<'_, T> {
        Cow::Owned((self.read)())
    }
}

impl<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn> Writable<T>
    for LambdaDuplex<T, HasFn, ReadFn, ReadyFn, WriteFn, IdFn>
where
    HasFn: Fn() -> bool,
    ReadFn: Fn() -> T,
    ReadyFn: Fn() -> bool,
    WriteFn: FnMut(T) -> Result<(), SignalError>,
    IdFn: Fn() -> Id,
{
    fn ready_to_write(&self) -> bool {
        (self.ready_to_write)()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        (self.write)(value)
    }
}
