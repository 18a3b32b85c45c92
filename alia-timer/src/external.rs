// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The host operations the timing subsystem calls through (//! external interface table, restricted to the timing-related rows).

use crate::tick::Tick;

/// Host services alia's timing code calls through rather than touching
/// wall-clock time or a scheduler directly.
///
/// Defined here, in the lower layer, rather than on `alia-system`, because
/// `Timer::start`, `get_raw_animation_tick_count`, `ValueSmoother::update`,
/// and `AsyncReporter` all call through it directly; `alia-system` (which
/// depends on this crate) supplies the concrete, synchronous default
/// implementation used outside of tests ("System object").
pub trait ExternalInterface {
    /// The current tick count, in the host's chosen units.
    fn get_tick_count(&self) -> Tick;

    /// Requests that the host refresh the UI again soon for animation
    /// purposes, without necessarily redoing a full event-dispatch pass.
    fn schedule_animation_refresh(&self);

    /// Requests a timer callback no earlier than `time`. Hosts may
    /// coalesce overlapping requests; [`crate::TimerQueue`] tolerates
    /// being woken early, late, or with several requests simultaneously
    /// ready.
    fn schedule_timer_event(&self, time: Tick);

    /// Hands the host a thunk to run later, off this dispatch's call
    /// stack, to report the outcome of an asynchronous operation.
    ///
    /// Intentionally not `Send`: alia's data graph is single-threaded and
    /// `Rc`-based. A host whose async work genuinely runs on
    /// another thread is responsible for bridging back to the UI thread
    /// before ever touching an [`crate::AsyncReporter`].
    fn schedule_asynchronous_update(&self, thunk: Box<dyn FnOnce()>);
}
