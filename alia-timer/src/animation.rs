// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Raw animation ticks and the per-call-site countdown timer built on
//! top of them.

use std::cell::RefCell;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_routing::{get_component, mark_animating_component, ComponentHandle, RoutingError};

use crate::external::ExternalInterface;
use crate::tick::Tick;

/// Always marks `container` animating and requests a refresh, then
/// returns the host's current tick count. Every caller that wants to
/// animate smoothly calls this (directly or indirectly) on every refresh
/// pass, so the system keeps refreshing as long as anything is watching
/// the clock.
pub fn get_raw_animation_tick_count(container: &ComponentHandle, external: &dyn ExternalInterface) -> Tick {
    mark_animating_component(container);
    external.schedule_animation_refresh();
    external.get_tick_count()
}

/// Stateless counterpart to [`AnimationTimer::ticks_left`]: ticks remaining
/// until `end`, given the host's current tick count, with no persistent
/// timer node required. Marks `container` animating and requests a refresh
/// only while ticks genuinely remain; returns 0 once `end` has passed.
pub fn get_raw_animation_ticks_left(
    container: &ComponentHandle,
    external: &dyn ExternalInterface,
    end: Tick,
) -> u32 {
    let remaining = end.wrapping_diff(external.get_tick_count());
    if remaining <= 0 {
        return 0;
    }
    mark_animating_component(container);
    external.schedule_animation_refresh();
    remaining as u32
}

struct AnimationTimerState {
    active: bool,
    end_tick: Tick,
}

/// A persistent, per-call-site countdown:
/// [`AnimationTimer::start`] arms it to end `duration`
/// ticks from now; [`AnimationTimer::ticks_left`] reports the ticks
/// remaining, marking the caller animating and requesting a refresh only
/// while time genuinely remains — once the deadline passes, it stops
/// asking for further refreshes on its own.
pub struct AnimationTimer {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    container: ComponentHandle,
}

pub fn get_animation_timer(ctx: &Context, parent: &ComponentHandle) -> Result<AnimationTimer, RoutingError> {
    let container = get_component(ctx, parent)?;
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _) = graph
        .get_or_create_node(&mut traversal, || AnimationTimerState {
                active: false,
                end_tick: Tick(0),
        })
        .expect("get_animation_timer() data node reused as a different kind of node");
        node
    };
    Ok(AnimationTimer {
            graph: ctx.graph().clone(),
            node,
            container,
    })
}

impl AnimationTimer {
    pub fn start(&self, now: Tick, duration: u32) {
        let mut graph = self.graph.borrow_mut();
        let state = graph.get_mut::<AnimationTimerState>(self.node);
        state.active = true;
        state.end_tick = now.wrapping_add(duration);
    }

    pub fn is_active(&self) -> bool {
        self.graph.borrow().get::<AnimationTimerState>(self.node).active
    }

    /// Ticks remaining until the timer ends, or 0 if it has already ended
    /// or was never started.
    pub fn ticks_left(&self, now: Tick, external: &dyn ExternalInterface) -> u32 {
        let remaining = {
            let mut graph = self.graph.borrow_mut();
            let state = graph.get_mut::<AnimationTimerState>(self.node);
            if !state.active {
                None
            } else {
                let remaining = state.end_tick.wrapping_diff(now);
                if remaining <= 0 {
                    state.active = false;
                    None
                } else {
                    Some(remaining as u32)
                }
            }
        };
        match remaining {
            Some(ticks) => {
                mark_animating_component(&self.container);
                external.schedule_animation_refresh();
                ticks
            }
            None => 0,
        }
    }
}
