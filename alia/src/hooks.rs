// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Effect hooks: one-shot or transition-triggered side effects tied to a
//! call site's persistent state, gated by default to refresh passes (the
//! only passes that are allowed to redefine what's current) with an
//! `_observed` variant of each for code that wants to react on any pass.

use alia_context::Context;
use alia_id::CapturedId;
use alia_routing::RoutingError;
use alia_signals::{refresh_signal_view, Readable};

use crate::internal::event_traversal;

fn is_refresh(ctx: &Context) -> Result<bool, RoutingError> {
    Ok(event_traversal(ctx)?.borrow().is_refresh())
}

/// Runs `f` exactly once, the first refresh pass this call site is ever
/// visited on.
pub fn on_init(ctx: &Context, f: impl FnOnce(&Context)) -> Result<(), RoutingError> {
    if !is_refresh(ctx)? {
        return Ok(());
    }
    let graph = ctx.graph().clone();
    let (_node, created) = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        g.get_or_create_node(&mut traversal, || ())?
    };
    if created {
        f(ctx);
    }
    Ok(())
}

fn on_activate_impl(
    ctx: &Context,
    is_active: bool,
    gate_to_refresh: bool,
    f: impl FnOnce(&Context),
) -> Result<(), RoutingError> {
    if gate_to_refresh && !is_refresh(ctx)? {
        return Ok(());
    }
    let graph = ctx.graph().clone();
    let (node, _) = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        g.get_or_create_node(&mut traversal, || false)?
    };
    let was_active = *graph.borrow().get::<bool>(node);
    if is_active && !was_active {
        f(ctx);
    }
    *graph.borrow_mut().get_mut::<bool>(node) = is_active;
    Ok(())
}

/// Runs `f` on the refresh pass where `is_active` first becomes true
/// after being false (or never having been visited before).
pub fn on_activate(ctx: &Context, is_active: bool, f: impl FnOnce(&Context)) -> Result<(), RoutingError> {
    on_activate_impl(ctx, is_active, true, f)
}

/// Like [`on_activate`], but reacts on any pass, not only refreshes.
pub fn on_activate_observed(ctx: &Context, is_active: bool, f: impl FnOnce(&Context)) -> Result<(), RoutingError> {
    on_activate_impl(ctx, is_active, false, f)
}

/// Extracts the persistent [`CapturedId`] at this call site for the
/// duration of `scope`, so the signal-watching callbacks `scope` runs
/// never execute while the data graph's `RefCell` is borrowed.
fn with_captured_id<R>(
    ctx: &Context,
    scope: impl FnOnce(&mut CapturedId) -> R,
) -> Result<R, RoutingError> {
    let graph = ctx.graph().clone();
    let node = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        g.get_or_create_node(&mut traversal, CapturedId::new)?.0
    };
    let mut captured = std::mem::replace(graph.borrow_mut().get_mut::<CapturedId>(node), CapturedId::new());
    let result = scope(&mut captured);
    *graph.borrow_mut().get_mut::<CapturedId>(node) = captured;
    Ok(result)
}

fn on_value_change_impl<T, S>(
    ctx: &Context,
    signal: &S,
    gate_to_refresh: bool,
    mut on_new: impl FnMut(&Context, &T),
    mut on_lost: impl FnMut(&Context),
) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    if gate_to_refresh && !is_refresh(ctx)? {
        return Ok(());
    }
    with_captured_id(ctx, |captured| {
        refresh_signal_view(captured, signal, |v| on_new(ctx, v), || on_lost(ctx));
    })
}

/// Runs `f` on a refresh pass where `signal`'s value id has changed since
/// the last refresh (including its first ever appearance).
pub fn on_value_change<T, S>(ctx: &Context, signal: &S, f: impl FnMut(&Context, &T)) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    on_value_change_impl(ctx, signal, true, f, |_ctx| {})
}

/// Like [`on_value_change`], but reacts on any pass the new value is
/// observed on, not only refreshes.
pub fn on_value_change_observed<T, S>(
    ctx: &Context,
    signal: &S,
    f: impl FnMut(&Context, &T),
) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    on_value_change_impl(ctx, signal, false, f, |_ctx| {})
}

fn on_value_gain_impl<T, S>(
    ctx: &Context,
    signal: &S,
    gate_to_refresh: bool,
    mut f: impl FnMut(&Context, &T),
) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    if gate_to_refresh && !is_refresh(ctx)? {
        return Ok(());
    }
    with_captured_id(ctx, |captured| {
        let was_initialized = captured.is_initialized();
        refresh_signal_view(
            captured,
            signal,
            |v| {
                if !was_initialized {
                    f(ctx, v);
                }
            },
            || {},
        );
    })
}

/// Runs `f` on a refresh pass where `signal` newly has a value after not
/// having one (including its first ever appearance).
pub fn on_value_gain<T, S>(ctx: &Context, signal: &S, f: impl FnMut(&Context, &T)) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    on_value_gain_impl(ctx, signal, true, f)
}

/// Like [`on_value_gain`], but reacts on any pass, not only refreshes.
pub fn on_value_gain_observed<T, S>(
    ctx: &Context,
    signal: &S,
    f: impl FnMut(&Context, &T),
) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    on_value_gain_impl(ctx, signal, false, f)
}

fn on_value_loss_impl<T, S>(
    ctx: &Context,
    signal: &S,
    gate_to_refresh: bool,
    mut f: impl FnMut(&Context),
) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    if gate_to_refresh && !is_refresh(ctx)? {
        return Ok(());
    }
    with_captured_id(ctx, |captured| {
        refresh_signal_view(captured, signal, |_v: &T| {}, || f(ctx));
    })
}

/// Runs `f` on a refresh pass where `signal` loses its value after having
/// had one.
pub fn on_value_loss<T, S>(ctx: &Context, signal: &S, f: impl FnMut(&Context)) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    on_value_loss_impl(ctx, signal, true, f)
}

/// Like [`on_value_loss`], but reacts on any pass, not only refreshes.
pub fn on_value_loss_observed<T, S>(ctx: &Context, signal: &S, f: impl FnMut(&Context)) -> Result<(), RoutingError>
where
    T: Clone + 'static,
    S: Readable<T>,
{
    on_value_loss_impl(ctx, signal, false, f)
}
