// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::cell::Cell;
use std::rc::Rc;

use alia_routing::{mark_dirty_component, ComponentError, Event, EventTraversalTag, RoutingError};
use alia_timer::Tick;

use super::*;

#[test]
fn refresh_system_runs_exactly_one_pass_when_nothing_stays_dirty() {
    let _logger = env_logger::try_init();
    let passes = Rc::new(Cell::new(0u32));
    let passes2 = passes.clone();
    let sys = System::new(move |_ctx| {
        passes2.set(passes2.get() + 1);
        Ok(())
    });
    sys.refresh_system().unwrap();
    assert_eq!(passes.get(), 1);
}

#[test]
fn refresh_system_keeps_going_while_the_controller_keeps_dirtying_the_root() {
    let _logger = env_logger::try_init();
    let passes = Rc::new(Cell::new(0u32));
    let passes2 = passes.clone();
    let remaining = Rc::new(Cell::new(2u32));
    let remaining2 = remaining.clone();
    let sys = System::new(move |ctx| {
        passes2.set(passes2.get() + 1);
        if remaining2.get() > 0 {
            remaining2.set(remaining2.get() - 1);
            let traversal = ctx.get::<EventTraversalTag>().unwrap();
            let root = traversal.borrow().active_container().unwrap().clone();
            mark_dirty_component(&root);
        }
        Ok(())
    });
    sys.refresh_system().unwrap();
    assert_eq!(remaining.get(), 0);
    assert_eq!(passes.get(), 3, "two re-dirtyings plus the final clean pass");
}

#[test]
fn refresh_system_stops_at_the_configured_bound_instead_of_looping_forever() {
    let _logger = env_logger::try_init();
    let passes = Rc::new(Cell::new(0u32));
    let passes2 = passes.clone();
    let sys = System::with_options(
        SystemOptions::default().with_max_refresh_passes(5),
        Rc::new(SyncExternalInterface::new()),
        move |ctx| {
            passes2.set(passes2.get() + 1);
            let traversal = ctx.get::<EventTraversalTag>().unwrap();
            let root = traversal.borrow().active_container().unwrap().clone();
            mark_dirty_component(&root);
            Ok(())
        },
    );
    sys.refresh_system().unwrap();
    assert_eq!(passes.get(), 5, "a controller that never settles is cut off at the bound");
}

struct Clicked;

#[test]
fn dispatch_event_runs_the_event_then_a_refresh() {
    let _logger = env_logger::try_init();
    let seen_events = Rc::new(Cell::new(0u32));
    let seen_events2 = seen_events.clone();
    let refreshes = Rc::new(Cell::new(0u32));
    let refreshes2 = refreshes.clone();
    let sys = System::new(move |ctx| {
        let traversal = ctx.get::<EventTraversalTag>().unwrap();
        if traversal.borrow().event().downcast::<Clicked>().is_some() {
            seen_events2.set(seen_events2.get() + 1);
        } else {
            refreshes2.set(refreshes2.get() + 1);
        }
        Ok(())
    });
    sys.dispatch_event(Event::new(Clicked)).unwrap();
    assert_eq!(seen_events.get(), 1);
    assert_eq!(refreshes.get(), 1);
}

#[test]
fn isolate_errors_reports_to_the_installed_handler_without_propagating() {
    let _logger = env_logger::try_init();
    let handled = Rc::new(Cell::new(0u32));
    let handled2 = handled.clone();
    let sys = System::new(|_ctx| Ok(()));
    sys.set_error_handler(move |_err| handled2.set(handled2.get() + 1));

    let result = sys.isolate_errors(|| -> Result<(), RoutingError> {
        Err(RoutingError::Component(ComponentError::new("widget blew up")))
    });

    assert!(result.is_none(), "the call doesn't unwind; it resolves to None");
    assert_eq!(handled.get(), 1);
}

#[test]
fn isolate_errors_swallows_an_aborted_traversal_silently_without_reporting_it() {
    let _logger = env_logger::try_init();
    let handled = Rc::new(Cell::new(0u32));
    let handled2 = handled.clone();
    let sys = System::new(|_ctx| Ok(()));
    sys.set_error_handler(move |_err| handled2.set(handled2.get() + 1));

    let result = sys.isolate_errors(|| -> Result<(), RoutingError> { Err(RoutingError::Aborted) });

    assert!(result.is_none());
    assert_eq!(handled.get(), 0, "an abort is intentional control flow, not a reported fault");
}

#[test]
fn deliver_due_timers_marks_the_target_dirty_so_the_next_refresh_revisits_it() {
    let _logger = env_logger::try_init();
    let scheduled = Rc::new(Cell::new(false));
    let scheduled2 = scheduled.clone();
    let sys = System::new(move |ctx| {
        if !scheduled2.get() {
            scheduled2.set(true);
            let handle = ctx.require::<SystemTag>().unwrap();
            let traversal = ctx.get::<EventTraversalTag>().unwrap();
            let root = traversal.borrow().active_container().unwrap().clone();
            handle.timer_queue.borrow_mut().schedule(&root, Tick(100));
        }
        Ok(())
    });

    sys.refresh_system().unwrap();
    assert!(!sys.root().is_dirty(), "nothing dirtied the root; the timer isn't due yet");

    sys.deliver_due_timers(Tick(100));
    assert!(sys.root().is_dirty(), "the due timer's target is marked dirty immediately");

    sys.refresh_system().unwrap();
    assert!(!sys.root().is_dirty(), "the refresh pass consumed it");
}
