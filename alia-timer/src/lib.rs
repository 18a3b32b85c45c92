// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Ticks, the timer/async scheduler, animation helpers, value smoothing,
//! deflickering, and asynchronous requests.

mod animation;
mod async_request;
mod curve;
mod deflicker;
mod external;
mod scheduler;
mod smoothing;
mod tick;
mod timer;

#[cfg(test)]
mod tests;

pub use animation::{get_animation_timer, get_raw_animation_tick_count, get_raw_animation_ticks_left, AnimationTimer};
pub use async_request::{async_request, AsyncReporter, AsyncResult};
pub use curve::{Curve, DEFAULT_CURVE, EASE_IN_CURVE, EASE_IN_OUT_CURVE, EASE_OUT_CURVE, LINEAR_CURVE};
pub use deflicker::{deflicker, Deflicker};
pub use external::ExternalInterface;
pub use scheduler::TimerQueue;
pub use smoothing::{default_transition, get_value_smoother, smooth, Interpolate, Smooth, Transition, ValueSmoother};
pub use tick::Tick;
pub use timer::{get_timer, Timer};
