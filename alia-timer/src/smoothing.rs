// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Smoothly interpolating signal values over time (`smooth`), built on a
//! `value_smoother` state machine and its raw/post-curve variants.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_id::{simple_id, Id};
use alia_routing::{get_component, ComponentHandle, RoutingError};
use alia_signals::{Capability, ReadTier, Readable, Signal, SignalError, WriteTier, Writable};

use crate::animation::get_raw_animation_tick_count;
use crate::curve::{Curve, DEFAULT_CURVE};
use crate::external::ExternalInterface;
use crate::tick::Tick;

/// How long a transition lasts and along what curve.
#[derive(Clone, Copy, Debug)]
pub struct Transition {
    pub duration: u32,
    pub curve: Curve,
}

pub fn default_transition() -> Transition {
    Transition {
        duration: 400,
        curve: DEFAULT_CURVE,
    }
}

/// Types smoothing can interpolate between: a value that supports
/// scalar-weighted linear interpolation, such as a floating-point
/// coordinate or size. The original's equivalent is templated directly on
/// the arithmetic operators a `Value` type provides; this trait names that
/// requirement explicitly instead.
pub trait Interpolate: Clone + PartialEq + Default {
    fn interpolate(old: &Self, new: &Self, fraction: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(old: &f64, new: &f64, fraction: f64) -> f64 {
        old + (new - old) * fraction
    }
}

impl Interpolate for f32 {
    fn interpolate(old: &f32, new: &f32, fraction: f64) -> f32 {
        old + (new - old) * fraction as f32
    }
}

struct ValueSmootherState<T> {
    old_value: T,
    new_value: T,
    displayed: T,
    transition: Transition,
    start_tick: Tick,
    in_transition: bool,
    version: u64,
}

impl<T: Interpolate> ValueSmootherState<T> {
    fn new(initial: T) -> ValueSmootherState<T> {
        ValueSmootherState {
            old_value: initial.clone(),
            new_value: initial.clone(),
            displayed: initial,
            transition: default_transition(),
            start_tick: Tick(0),
            in_transition: false,
            version: 0,
        }
    }
}

fn interpolated<T: Interpolate>(state: &ValueSmootherState<T>, now: Tick) -> T {
    if !state.in_transition || state.transition.duration == 0 {
        return state.new_value.clone();
    }
    let elapsed = state.start_tick.wrapping_diff(now);
    if elapsed <= 0 {
        return state.old_value.clone();
    }
    if elapsed as u32 >= state.transition.duration {
        return state.new_value.clone();
    }
    let progress = f64::from(elapsed as u32) / f64::from(state.transition.duration);
    let fraction = state.transition.curve.evaluate(progress);
    T::interpolate(&state.old_value, &state.new_value, fraction)
}

fn set_displayed<T: Interpolate>(state: &mut ValueSmootherState<T>, now: Tick) {
    let value = interpolated(state, now);
    if state.in_transition {
        let elapsed = state.start_tick.wrapping_diff(now);
        if elapsed >= 0 && elapsed as u32 >= state.transition.duration {
            state.in_transition = false;
        }
    }
    if state.displayed != value {
        state.version += 1;
    }
    state.displayed = value;
}

/// A persistent, per-call-site interpolator between successive values of
/// some input.
pub struct ValueSmoother<T> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    container: ComponentHandle,
    _marker: std::marker::PhantomData<T>,
}

pub fn get_value_smoother<T: Interpolate + 'static>(
    ctx: &Context,
    parent: &ComponentHandle,
    initial: impl FnOnce() -> T,
) -> Result<ValueSmoother<T>, RoutingError> {
    let container = get_component(ctx, parent)?;
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _) = graph
        .get_or_create_node(&mut traversal, || ValueSmootherState::new(initial()))
        .expect("get_value_smoother() data node reused as a different kind of node");
        node
    };
    Ok(ValueSmoother {
            graph: ctx.graph().clone(),
            node,
            container,
            _marker: std::marker::PhantomData,
    })
}

impl<T: Interpolate + 'static> ValueSmoother<T> {
    /// Immediately abandons any in-progress transition and snaps to
    /// `value` (`reset_smoothing`) — used when smoothing
    /// should not apply to the next observed change, e.g. an explicit
    /// write through [`smooth`]'s writable side.
    pub fn reset(&self, value: T, now: Tick) {
        let mut graph = self.graph.borrow_mut();
        let state = graph.get_mut::<ValueSmootherState<T>>(self.node);
        state.old_value = value.clone();
        state.new_value = value;
        state.in_transition = false;
        set_displayed(state, now);
    }

    /// Advances the smoother against `x` and returns the interpolated
    /// value for this frame (`smooth_raw`). `is_refresh`
    /// must be the current pass's `EventTraversal::is_refresh()`: a new
    /// transition only ever starts on a true refresh, not merely because
    /// `x` is later observed to differ during a broadcast pass.
    pub fn update(&self, x: &T, is_refresh: bool, now: Tick, transition: Transition, external: &dyn ExternalInterface) -> T {
        {
            let mut graph = self.graph.borrow_mut();
            let state = graph.get_mut::<ValueSmootherState<T>>(self.node);

            if is_refresh && *x != state.new_value {
                // If we're already transitioning away from `x` back toward
                // `state.old_value`, reverse smoothly from however far the
                // transition has gotten rather than restarting a
                // full-length transition.
                let duration = if state.in_transition && *x == state.old_value {
                    let elapsed = state.start_tick.wrapping_diff(now).max(0) as u32;
                    elapsed.min(transition.duration)
                } else {
                    transition.duration
                };
                let current = interpolated(state, now);
                state.old_value = current;
                state.new_value = x.clone();
                state.transition = Transition {
                    duration,
                    curve: transition.curve,
                };
                state.start_tick = now;
                state.in_transition = true;
            }

            set_displayed(state, now);
        }

        let (in_transition, displayed) = {
            let graph = self.graph.borrow();
            let state = graph.get::<ValueSmootherState<T>>(self.node);
            (state.in_transition, state.displayed.clone())
        };
        if in_transition {
            get_raw_animation_tick_count(&self.container, external);
        }
        displayed
    }

    pub fn is_in_transition(&self) -> bool {
        self.graph.borrow().get::<ValueSmootherState<T>>(self.node).in_transition
    }
}

/// Wraps a duplex signal so reads are smoothly interpolated and writes
/// pass straight through (`smooth`). A direct write snaps
/// the smoother to the written value rather than transitioning to it —
/// matching `reset_smoothing`'s role in the original.
pub struct Smooth<T, A> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    arg: RefCell<A>,
    has_value: bool,
    now: Tick,
    _marker: std::marker::PhantomData<T>,
}

#[allow(clippy::too_many_arguments)]
pub fn smooth<T, A>(
    ctx: &Context,
    parent: &ComponentHandle,
    arg: A,
    is_refresh: bool,
    now: Tick,
    transition: Transition,
    external: &dyn ExternalInterface,
) -> Result<Smooth<T, A>, RoutingError>
where
    T: Interpolate + 'static,
    A: Readable<T> + Writable<T>,
{
    let has_value = arg.has_value();
    let smoother = get_value_smoother(ctx, parent, T::default)?;
    if has_value {
        let x = arg.read().into_owned();
        smoother.update(&x, is_refresh, now, transition, external);
    }
    Ok(Smooth {
            graph: smoother.graph,
            node: smoother.node,
            arg: RefCell::new(arg),
            has_value,
            now,
            _marker: std::marker::PhantomData,
    })
}

impl<T: Interpolate + 'static, A> Signal<T> for Smooth<T, A> {
    fn has_value(&self) -> bool {
        self.has_value
    }
    fn value_id(&self) -> Id {
        simple_id(self.graph.borrow().get::<ValueSmootherState<T>>(self.node).version)
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<T: Interpolate + 'static, A> Readable<T> for Smooth<T, A> {
    fn read(&self) -> Cow<'_, T> {
        Cow::Owned(self.graph.borrow().get::<ValueSmootherState<T>>(self.node).displayed.clone())
    }
}

impl<T: Interpolate + 'static, A: Writable<T>> Writable<T> for Smooth<T, A> {
    fn ready_to_write(&self) -> bool {
        self.arg.borrow().ready_to_write()
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        self.arg.get_mut().write(value.clone())?;
        let mut graph = self.graph.borrow_mut();
        let state = graph.get_mut::<ValueSmootherState<T>>(self.node);
        state.old_value = value.clone();
        state.new_value = value;
        state.in_transition = false;
        set_displayed(state, self.now);
        Ok(())
    }
}
