// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Retaining a signal's last-seen value for a grace period after it's
//! lost (`deflicker`). Lives here rather than in
//! `alia-signals` because it needs the timing subsystem's raw animation
//! ticks to know when the grace period has run out; putting it in
//! `alia-signals` would make that crate depend on this one, inverting the
//! workspace's layering.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_id::{simple_id, Id};
use alia_routing::{get_component, ComponentHandle, RoutingError};
use alia_signals::{Capability, ReadTier, Readable, Signal, WriteTier};

use crate::animation::get_raw_animation_tick_count;
use crate::external::ExternalInterface;
use crate::tick::Tick;

struct DeflickerState<T> {
    retained: Option<T>,
    lost_at: Option<Tick>,
    version: u64,
}

/// Wraps `arg` so that losing its value doesn't immediately propagate:
/// the last value read is retained for `delay` ticks, giving a value that
/// flickers in and out across single frames a chance to settle before
/// downstream code ever observes the loss.
pub struct Deflicker<T, A> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    arg: A,
    _marker: std::marker::PhantomData<T>,
}

pub fn deflicker<T, A>(
    ctx: &Context,
    parent: &ComponentHandle,
    arg: A,
    delay: u32,
    now: Tick,
    external: &dyn ExternalInterface,
) -> Result<Deflicker<T, A>, RoutingError>
where
    T: Clone + PartialEq + 'static,
    A: Readable<T>,
{
    let container = get_component(ctx, parent)?;
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _) = graph
        .get_or_create_node(&mut traversal, || DeflickerState::<T> {
                retained: None,
                lost_at: None,
                version: 0,
        })
        .expect("deflicker() data node reused as a different kind of node");
        node
    };

    {
        let mut graph = ctx.graph().borrow_mut();
        let state = graph.get_mut::<DeflickerState<T>>(node);
        if arg.has_value() {
            let value = arg.read().into_owned();
            if state.retained.as_ref() != Some(&value) {
                state.version += 1;
            }
            state.retained = Some(value);
            state.lost_at = None;
        } else {
            match state.lost_at {
                None => state.lost_at = Some(now),
                Some(lost_at) if now.wrapping_diff(lost_at) >= delay as i32 => {
                    if state.retained.is_some() {
                        state.version += 1;
                    }
                    state.retained = None;
                }
                Some(_) => {}
            }
        }
    }

    let still_waiting = {
        let graph = ctx.graph().borrow();
        let state = graph.get::<DeflickerState<T>>(node);
        state.lost_at.is_some() && state.retained.is_some()
    };
    if still_waiting {
        get_raw_animation_tick_count(&container, external);
    }

    Ok(Deflicker {
            graph: ctx.graph().clone(),
            node,
            arg,
            _marker: std::marker::PhantomData,
    })
}

impl<T: Clone + PartialEq + 'static, A> Signal<T> for Deflicker<T, A> {
    fn has_value(&self) -> bool {
        self.graph.borrow().get::<DeflickerState<T>>(self.node).retained.is_some()
    }
    fn value_id(&self) -> Id {
        simple_id(self.graph.borrow().get::<DeflickerState<T>>(self.node).version)
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<T: Clone + PartialEq + 'static, A> Readable<T> for Deflicker<T, A> {
    fn read(&self) -> Cow<'_, T> {
        let graph = self.graph.borrow();
        Cow::Owned(
            graph
            .get::<DeflickerState<T>>(self.node)
            .retained
            .clone()
            .expect("read() called on a deflicker() signal with has_value() == false"),
        )
    }
}

// `arg` is kept alive for the lifetime of the signal even though this
// module doesn't read it again after construction: callers hold the
// original argument's ownership (e.g. `Rc<RefCell<_>>` sharing) through
// `Deflicker`, matching the other combinators' convention of owning their
// inputs for as long as the derived signal lives.
impl<T, A> Deflicker<T, A> {
    pub fn arg(&self) -> &A {
        &self.arg
    }
}
