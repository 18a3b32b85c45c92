// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::cell::RefCell;
use std::rc::Rc;

use alia_context::{Context, Tag};
use alia_graph::{DataGraph, Traversal};
use alia_routing::{
    mark_dirty_component, ComponentHandle, Event, EventTraversal, EventTraversalTag, RoutingError,
    ScopedContainer,
};
use alia_timer::{ExternalInterface, Tick, TimerQueue};

use crate::error::DispatchError;
use crate::external::SyncExternalInterface;
use crate::options::SystemOptions;

/// What a controller reaches for via [`SystemTag`] to use the timing
/// subsystem: the host's clock/scheduler and the shared queue of pending
/// timer requests. Bundled together because every `alia-timer` entry point
/// that schedules anything needs both at once.
pub struct SystemHandle {
    pub external: Rc<dyn ExternalInterface>,
    pub timer_queue: Rc<RefCell<TimerQueue>>,
}

/// The context tag under which a running [`System`] publishes its
/// [`SystemHandle`] (dynamic extension chain, same pattern
/// as [`alia_routing::EventTraversalTag`]).
pub struct SystemTag;

impl Tag for SystemTag {
    type Data = SystemHandle;
    const NAME: &'static str = "system";
}

/// The top-level runtime object a host constructs once and drives for the
/// life of a running UI ("System loop & error isolation").
///
/// Holds one [`Context`] for the whole run, rather than building a fresh
/// one per pass: the data graph and component tree have to persist across
/// frames, so only the traversal cursor gets reset (see [`System::dispatch_pass`]).
pub struct System {
    ctx: Context,
    root: ComponentHandle,
    options: SystemOptions,
    error_handler: RefCell<Option<Box<dyn FnMut(DispatchError)>>>,
    controller: RefCell<Box<dyn FnMut(&Context) -> Result<(), RoutingError>>>,
}

impl System {
    /// Builds a system with the default options and a synchronous,
    /// steady-clock [`SyncExternalInterface`].
    pub fn new(controller: impl FnMut(&Context) -> Result<(), RoutingError> + 'static) -> System {
        System::with_options(SystemOptions::default(), Rc::new(SyncExternalInterface::new()), controller)
    }

    pub fn with_options(
        options: SystemOptions,
        external: Rc<dyn ExternalInterface>,
        controller: impl FnMut(&Context) -> Result<(), RoutingError> + 'static,
    ) -> System {
        let graph = DataGraph::new();
        let root_node = graph.root();
        let base_ctx = Context::new(graph, Traversal::begin(root_node, true));
        let handle = SystemHandle {
            external,
            timer_queue: Rc::new(RefCell::new(TimerQueue::new())),
        };
        let ctx = base_ctx.extend::<SystemTag>(handle);
        System {
            ctx,
            root: ComponentHandle::new_root(),
            options,
            error_handler: RefCell::new(None),
            controller: RefCell::new(Box::new(controller)),
        }
    }

    pub fn options(&self) -> SystemOptions {
        self.options
    }

    /// The root container driving passes sees the dirty/animating bits
    /// set by writes anywhere in the component tree, since everything
    /// propagates up to it (`mark_dirty_component`).
    pub fn root(&self) -> &ComponentHandle {
        &self.root
    }

    /// Installs a handler called with any error a controller call itself
    /// returns (as opposed to one isolated locally via [`System::isolate_errors`]).
    /// Replaces any previously installed handler.
    pub fn set_error_handler(&self, handler: impl FnMut(DispatchError) + 'static) {
        *self.error_handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Catches an error from a self-contained piece of work instead of
    /// letting it unwind the rest of the traversal, routing it to the
    /// system's installed error handler instead. `RoutingError::Aborted`
    /// is swallowed silently: a component that calls
    /// [`alia_routing::abort_traversal`] is ending its own work on
    /// purpose, not failing.
    pub fn isolate_errors<R>(&self, f: impl FnOnce() -> Result<R, RoutingError>) -> Option<R> {
        match f() {
            Ok(value) => Some(value),
            Err(RoutingError::Aborted) => None,
            Err(err) => {
                self.report_error(err);
                None
            }
        }
    }

    fn report_error(&self, err: RoutingError) -> DispatchError {
        let dispatch_err = DispatchError::from(err);
        match self.error_handler.borrow_mut().as_mut() {
            Some(handler) => handler(dispatch_err.clone()),
            None => log::warn!("{dispatch_err}"),
        }
        dispatch_err
    }

    /// Resets the traversal cursor to the root and runs the controller
    /// once under a fresh [`EventTraversal`], wrapping it in the root's
    /// [`ScopedContainer`] scope the way every other container visit is.
    fn dispatch_pass(&self, refreshing: bool, event_traversal: EventTraversal) -> Result<(), RoutingError> {
        let root_node = self.ctx.graph().borrow().root();
        *self.ctx.traversal().borrow_mut() = Traversal::begin(root_node, refreshing);
        let pass_ctx = self.ctx.clone().extend::<EventTraversalTag>(RefCell::new(event_traversal));
        let traversal_cell = pass_ctx
            .get::<EventTraversalTag>()
            .expect("just extended this context with EventTraversalTag");
        let scope = ScopedContainer::begin(traversal_cell, &self.root);
        let outcome = (self.controller.borrow_mut())(&pass_ctx);
        scope.end();
        match outcome {
            Ok(()) | Err(RoutingError::Aborted) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Runs refresh passes until the root container comes out of a pass
    /// clean, or until [`SystemOptions::max_refresh_passes`] is hit: a
    /// hard bound to catch cycles. A controller that keeps writing state
    /// on every refresh (an accidental cycle) is exactly what the bound
    /// guards against.
    pub fn refresh_system(&self) -> Result<(), DispatchError> {
        let mut passes = 0u32;
        loop {
            passes += 1;
            let event_traversal = EventTraversal::new_refresh(&self.root);
            if let Err(err) = self.dispatch_pass(true, event_traversal) {
                return Err(self.report_error(err));
            }
            if !self.root.is_dirty() {
                return Ok(());
            }
            if passes >= self.options.max_refresh_passes {
                log::warn!(
                    "refresh_system did not settle within {} passes; the controller may be stuck in a cycle",
                    self.options.max_refresh_passes
                );
                return Ok(());
            }
        }
    }

    /// Runs the user's one-shot event, broadcast to every container, then
    /// a refresh.
    pub fn dispatch_event(&self, event: Event) -> Result<(), DispatchError> {
        let event_traversal = EventTraversal::new_broadcast(&self.root, event);
        if let Err(err) = self.dispatch_pass(false, event_traversal) {
            return Err(self.report_error(err));
        }
        self.refresh_system()
    }

    /// Like [`System::dispatch_event`], but routed to a single container
    /// and the ancestors on its path rather than broadcast everywhere
    /// ("Targeted event").
    pub fn dispatch_targeted_event(&self, target: &ComponentHandle, event: Event) -> Result<(), DispatchError> {
        let event_traversal = EventTraversal::new_targeted(&self.root, target, event);
        if let Err(err) = self.dispatch_pass(false, event_traversal) {
            return Err(self.report_error(err));
        }
        self.refresh_system()
    }

    /// Pulls every timer request whose trigger tick has arrived out of
    /// the shared queue and marks its target dirty, so the next
    /// [`System::refresh_system`] call actually revisits it. A host calls
    /// this when the tick its `ExternalInterface::schedule_timer_event`
    /// asked for arrives.
    pub fn deliver_due_timers(&self, now: Tick) {
        let handle = self
        .ctx
        .get::<SystemTag>()
        .expect("System always extends its own context with SystemTag");
        let mut due = Vec::new();
        handle.timer_queue.borrow_mut().issue_ready(now, |target| due.push(target.clone()));
        for target in due {
            mark_dirty_component(&target);
        }
    }
}
