// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The action trait and the combinators that don't belong to a specific
//! container/collection domain (those live in `domain.rs`).
//!
//! **Latch point.** `perform`'s `latch` callback is the *intermediary*:
//! every action reads whatever input it needs first, then calls `latch`
//! exactly once, then performs its actual side effect. [`Pair`] composes
//! two actions so that both latches fire — in left-to-right order — before
//! either effect runs, and the effects then run in nested order (`b`
//! before `a`); see its doc comment for how the composition achieves that
//! from a single recursive call.

use std::marker::PhantomData;

use alia_signals::{write_signal, Readable, Writable};

use crate::error::ActionError;

/// A nullary deferred effect.
pub trait Action {
    /// True iff calling [`Action::perform`] right now would do something.
    fn is_ready(&self) -> bool;

    /// Reads any inputs, calls `latch` exactly once at the latch point, then
    /// applies the effect. Implementations that read nothing may call
    /// `latch` immediately.
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError>;
}

/// An action that additionally expects one argument supplied at perform
/// time — the shape `a << signal` ([`Bind`]) produces from an inner
/// `Action1`.
pub trait Action1<X> {
    fn is_ready(&self) -> bool;
    fn perform(
        &mut self,
        arg: X,
        latch: &mut dyn FnMut() -> Result<(), ActionError>,
    ) -> Result<(), ActionError>;
}

/// The top-level call site: gates on [`Action::is_ready`] and performs with
/// a no-op intermediary (`perform_action`).
pub fn perform_action<A: Action + ?Sized>(action: &mut A) -> Result<(), ActionError> {
    if !action.is_ready() {
        return Ok(());
    }
    action.perform(&mut || Ok(()))
}

/// [`Action1`] counterpart of [`perform_action`].
pub fn perform_action1<X, A: Action1<X> + ?Sized>(action: &mut A, arg: X) -> Result<(), ActionError> {
    if !action.is_ready() {
        return Ok(());
    }
    action.perform(arg, &mut || Ok(()))
}

/// Sequences two actions so both latch before either effects (`(a, b)`).
///
/// `perform` calls `a.perform(|| b.perform(latch))`: `a` reads its inputs
/// and reaches its own latch point first, which runs the closure — `b`
/// then reads its inputs and reaches *its* latch point, which finally
/// calls the real `latch`. Only then does `b` apply its effect, returning
/// control to `a`, which applies its effect last. The two latches fire in
/// left-to-right (`a`, then `b`) order; the two effects fire in nested
/// (`b`, then `a`) order.
pub struct Pair<A, B> {
    a: A,
    b: B,
}

pub fn pair<A: Action, B: Action>(a: A, b: B) -> Pair<A, B> {
    Pair { a, b }
}

impl<A: Action, B: Action> Action for Pair<A, B> {
    fn is_ready(&self) -> bool {
        self.a.is_ready() && self.b.is_ready()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let Pair { a, b } = self;
        a.perform(&mut || b.perform(&mut *latch))
    }
}

/// Binds a signal's current value as the argument to an [`Action1`]
/// (`a << signal`). Ready only when the signal has a value
/// and the inner action is ready.
pub struct Bind<X, S, A> {
    signal: S,
    inner: A,
    _marker: PhantomData<X>,
}

pub fn bind<X: Clone, S: Readable<X>, A: Action1<X>>(inner: A, signal: S) -> Bind<X, S, A> {
    Bind {
        signal,
        inner,
        _marker: PhantomData,
    }
}

impl<X: Clone, S: Readable<X>, A: Action1<X>> Action for Bind<X, S, A> {
    fn is_ready(&self) -> bool {
        self.signal.has_value() && self.inner.is_ready()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let value = self.signal.read().into_owned();
        self.inner.perform(value, latch)
    }
}

/// Writes `source`'s value into `sink` (`sink <<= source`).
/// Reads `source` into a temporary, latches, then writes — so a later
/// stage of a [`Pair`] observes `source`'s pre-write value if it also
/// reads it.
pub struct Copy<T, Sink, Source> {
    sink: Sink,
    source: Source,
    _marker: PhantomData<T>,
}

pub fn copy<T, Sink: Writable<T>, Source: Readable<T>>(sink: Sink, source: Source) -> Copy<T, Sink, Source> {
    Copy {
        sink,
        source,
        _marker: PhantomData,
    }
}

impl<T, Sink: Writable<T>, Source: Readable<T>> Action for Copy<T, Sink, Source> {
    fn is_ready(&self) -> bool {
        self.source.has_value() && self.sink.ready_to_write()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        let value = self.source.read().into_owned();
        latch()?;
        write_signal(&mut self.sink, value).map_err(ActionError::from)
    }
}

/// Lifts a plain closure into an always-ready action. Use [`callback_with_readiness`] for a custom predicate.
pub struct Callback<F> {
    effect: F,
}

pub fn callback<F: FnMut() -> Result<(), ActionError>>(effect: F) -> Callback<F> {
    Callback { effect }
}

impl<F: FnMut() -> Result<(), ActionError>> Action for Callback<F> {
    fn is_ready(&self) -> bool {
        true
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        latch()?;
        (self.effect)()
    }
}

/// [`Callback`] with an explicit readiness predicate.
pub struct CallbackWithReadiness<F, R> {
    effect: F,
    ready: R,
}

pub fn callback_with_readiness<F, R>(effect: F, ready: R) -> CallbackWithReadiness<F, R>
where
    F: FnMut() -> Result<(), ActionError>,
    R: Fn() -> bool,
{
    CallbackWithReadiness { effect, ready }
}

impl<F: FnMut() -> Result<(), ActionError>, R: Fn() -> bool> Action for CallbackWithReadiness<F, R> {
    fn is_ready(&self) -> bool {
        (self.ready)()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        latch()?;
        (self.effect)()
    }
}

/// Adds `flag.has_value() ∧ flag.read()` to `inner`'s readiness.
pub struct Mask<A, F> {
    inner: A,
    flag: F,
}

pub fn mask<A: Action, F: Readable<bool>>(inner: A, flag: F) -> Mask<A, F> {
    Mask { inner, flag }
}

impl<A: Action, F: Readable<bool>> Action for Mask<A, F> {
    fn is_ready(&self) -> bool {
        self.flag.has_value() && *self.flag.read() && self.inner.is_ready()
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        self.inner.perform(latch)
    }
}

/// Always reports ready; performs only if `inner` actually is. A `perform` call on a not-actually-ready inner
/// action is a silent no-op — there is no effect to latch, so `latch` is
/// not called either.
pub struct OnlyIfReady<A> {
    inner: A,
}

pub fn only_if_ready<A: Action>(inner: A) -> OnlyIfReady<A> {
    OnlyIfReady { inner }
}

impl<A: Action> Action for OnlyIfReady<A> {
    fn is_ready(&self) -> bool {
        true
    }
    fn perform(&mut self, latch: &mut dyn FnMut() -> Result<(), ActionError>) -> Result<(), ActionError> {
        if self.inner.is_ready() {
            self.inner.perform(latch)
        } else {
            Ok(())
        }
    }
}
