// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::borrow::Cow;

use alia_id::Id;

use crate::capability::Capability;
use crate::error::SignalError;

/// The operation set every signal supports, independent of capability
///. Reading, writing, moving, and clearing are exposed
/// through the capability-gated marker traits below; a bare `Signal` can
/// only be asked whether it currently has a value and what that value's
/// identity is.
pub trait Signal<T> {
    /// True iff the signal currently denotes a value.
    fn has_value(&self) -> bool;

    /// An id that changes iff the underlying value changes, and is stable
    /// while it doesn't. Must only be called when `has_value()` is true.
    fn value_id(&self) -> Id;

    /// The signal's actual capability (read tier, write tier).
    fn capability(&self) -> Capability;

    /// True iff a previous [`Writable::write`] raised a validation error
    /// this signal is still reporting through `has_value() == false`.
    fn is_invalidated(&self) -> bool {
        false
    }

    /// Offers a validation error back to the signal for it to absorb by
    /// invalidating itself. Returns `true` if the signal accepted it (in
    /// which case the error should not be re-raised); `false` means the
    /// caller must propagate the error itself.
    fn invalidate(&mut self, _error: SignalError) -> bool {
        false
    }
}

/// Capability marker for signals whose read tier is at least `readable`.
///
/// `read` returns a [`Cow`] rather than a bare `&T`: signals backed
/// directly by a stored value (`value`, `direct`) borrow it for free,
/// while signals that recompute on every read (`lazy_apply` and friends)
/// return an owned value without needing unsound interior-mutable caching
/// to manufacture a borrow.
pub trait Readable<T: Clone>: Signal<T> {
    /// Reads the current value. Only valid when `has_value()` is true.
    fn read(&self) -> Cow<'_, T>;
}

/// Capability marker for signals whose read tier is at least `movable`.
pub trait Movable<T: Clone>: Readable<T> {
    /// Takes ownership of the current value, leaving the signal's slot
    /// logically empty until it is next written or recomputed.
    fn move_out(&mut self) -> T;
}

/// Capability marker for signals whose write tier is at least `writable`.
pub trait Writable<T>: Signal<T> {
    /// True iff a write would currently be accepted.
    fn ready_to_write(&self) -> bool;

    /// Performs the write. Returns `Err` on a validation failure; the
    /// caller (see [`crate::write_signal`]) is responsible for offering it
    /// back via [`Signal::invalidate`].
    fn write(&mut self, value: T) -> Result<(), SignalError>;
}

/// Capability marker for signals whose write tier is at least `clearable`.
pub trait Clearable<T>: Writable<T> {
    fn clear(&mut self) -> Result<(), SignalError>;
}

/// Performs [`Signal`]'s documented write contract ("Write
/// semantics"): a silent no-op if the signal isn't ready, otherwise
/// propagate or absorb a validation error via `invalidate`.
pub fn write_signal<T, S: Writable<T> + ?Sized>(signal: &mut S, value: T) -> Result<(), SignalError> {
    if !signal.ready_to_write() {
        return Ok(());
    }
    match signal.write(value) {
        Ok(()) => Ok(()),
        Err(err) => {
            if signal.invalidate(err.clone()) {
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

/// Reads `signal`'s value id and, on change, reports the new value or its
/// loss ("Change observation"). `captured` must be primed with
/// [`alia_id::CapturedId::new`] before the first call.
pub fn refresh_signal_view<T, S, OnNew, OnLost>(
    captured: &mut alia_id::CapturedId,
    signal: &S,
    mut on_new: OnNew,
    mut on_lost: OnLost,
) where
    T: Clone,
    S: Readable<T> + ?Sized,
    OnNew: FnMut(&T),
    OnLost: FnMut(),
{
    if signal.has_value() {
        let id = signal.value_id();
        if !captured.matches(&id) {
            captured.capture(&id);
            on_new(signal.read().as_ref());
        }
    } else if captured.is_initialized() {
        on_lost();
        *captured = alia_id::CapturedId::new();
    }
}
