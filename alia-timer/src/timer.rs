// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Per-call-site one-shot timers ("Timer").

use std::cell::RefCell;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_routing::{get_component, ComponentHandle, RoutingError};

use crate::external::ExternalInterface;
use crate::scheduler::TimerQueue;
use crate::tick::Tick;

struct TimerState {
    scheduled: Option<Tick>,
}

/// A persistent, per-call-site one-shot timer. Arming it registers a
/// request with a [`TimerQueue`]; the dispatch loop marks the owning
/// container dirty when the request comes due, and the component's next
/// refresh calls [`Timer::poll`] to consume the firing.
pub struct Timer {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    container: ComponentHandle,
}

pub fn get_timer(ctx: &Context, parent: &ComponentHandle) -> Result<Timer, RoutingError> {
    let container = get_component(ctx, parent)?;
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _) = graph
        .get_or_create_node(&mut traversal, || TimerState { scheduled: None })
        .expect("get_timer() data node reused as a different kind of node");
        node
    };
    Ok(Timer {
            graph: ctx.graph().clone(),
            node,
            container,
    })
}

impl Timer {
    /// Arms the timer to fire `duration` ticks after `now`, registering
    /// the request with `queue` and asking `external` to wake the host
    /// up no later than then.
    pub fn start(&self, queue: &mut TimerQueue, external: &dyn ExternalInterface, now: Tick, duration: u32) {
        let trigger = now.wrapping_add(duration);
        self.graph.borrow_mut().get_mut::<TimerState>(self.node).scheduled = Some(trigger);
        queue.schedule(&self.container, trigger);
        external.schedule_timer_event(trigger);
    }

    /// Cancels a pending firing without waiting for it to come due.
    pub fn stop(&self, queue: &mut TimerQueue) {
        self.graph.borrow_mut().get_mut::<TimerState>(self.node).scheduled = None;
        queue.unschedule(&self.container);
    }

    pub fn is_scheduled(&self) -> bool {
        self.graph.borrow().get::<TimerState>(self.node).scheduled.is_some()
    }

    /// True the first time this is called at or after the timer's
    /// trigger tick; clears the pending trigger so a later `poll` returns
    /// `false` until [`Timer::start`] is called again.
    pub fn poll(&self, now: Tick) -> bool {
        let mut graph = self.graph.borrow_mut();
        let state = graph.get_mut::<TimerState>(self.node);
        match state.scheduled {
            Some(trigger) if trigger.wrapping_diff(now) <= 0 => {
                state.scheduled = None;
                true
            }
            _ => false,
        }
    }
}
