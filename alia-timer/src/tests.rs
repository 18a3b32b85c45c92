// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, Traversal};
use alia_id::Id;
use alia_routing::{get_component, ComponentHandle};
use alia_signals::{direct, Capability, ReadTier, Readable, Signal, WriteTier};

use super::*;

fn root_context() -> (Context, ComponentHandle) {
    let graph = DataGraph::new();
    let root_node = graph.root();
    let ctx = Context::new(graph, Traversal::begin(root_node, true));
    let root = ComponentHandle::new_root();
    (ctx, root)
}

fn next_frame(ctx: &Context, refreshing: bool) {
    let root = ctx.graph().borrow().root();
    *ctx.traversal().borrow_mut() = Traversal::begin(root, refreshing);
}

/// A recording stand-in for a real host: every method just logs what it
/// was asked to do, so tests can assert on it.
#[derive(Default)]
struct TestExternal {
    tick: RefCell<Tick>,
    animation_refreshes_requested: RefCell<u32>,
    timer_events_requested: RefCell<Vec<Tick>>,
}

impl ExternalInterface for TestExternal {
    fn get_tick_count(&self) -> Tick {
        *self.tick.borrow()
    }
    fn schedule_animation_refresh(&self) {
        *self.animation_refreshes_requested.borrow_mut() += 1;
    }
    fn schedule_timer_event(&self, time: Tick) {
        self.timer_events_requested.borrow_mut().push(time);
    }
    fn schedule_asynchronous_update(&self, thunk: Box<dyn FnOnce()>) {
        thunk();
    }
}

#[test]
fn tick_ordering_tolerates_wraparound() {
    let before_wrap = Tick(u32::MAX - 1);
    let after_wrap = Tick(1);
    assert!(after_wrap > before_wrap);
    assert_eq!(after_wrap.wrapping_diff(before_wrap), 3);
}

#[test]
fn timer_queue_delivers_requests_in_trigger_order() {
    let mut queue = TimerQueue::new();
    let a = ComponentHandle::new_root();
    let b = ComponentHandle::new_root();
    queue.schedule(&a, Tick(20));
    queue.schedule(&b, Tick(10));

    let mut delivered = Vec::new();
    queue.issue_ready(Tick(100), |target| {
        delivered.push(if target.same_container(&b) { "b" } else { "a" });
    });
    assert_eq!(delivered, vec!["b", "a"]);
}

#[test]
fn timer_queue_does_not_redeliver_a_request_scheduled_during_its_own_pass() {
    let mut queue = TimerQueue::new();
    let a = ComponentHandle::new_root();
    queue.schedule(&a, Tick(10));

    let mut deliveries = 0;
    queue.issue_ready(Tick(100), |target| {
        deliveries += 1;
        // Rescheduling `a` itself, mid-pass, must not cause it to be
        // redelivered within this same `issue_ready` call.
        queue.schedule(target, Tick(50));
    });
    assert_eq!(deliveries, 1);
    assert_eq!(queue.next_trigger(), Some(Tick(50)));
}

#[test]
fn timer_schedules_and_polls_through_the_queue() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let timer = get_timer(&ctx, &child).unwrap();
    let external = TestExternal::default();
    let mut queue = TimerQueue::new();

    timer.start(&mut queue, &external, Tick(0), 100);
    assert!(timer.is_scheduled());
    assert_eq!(*external.timer_events_requested.borrow(), vec![Tick(100)]);
    assert!(!timer.poll(Tick(50)), "not due yet");

    let mut fired = false;
    queue.issue_ready(Tick(100), |_| fired = true);
    assert!(fired);
    assert!(timer.poll(Tick(100)));
    assert!(!timer.is_scheduled(), "poll() consumes the firing");
    assert!(!timer.poll(Tick(200)), "a consumed firing doesn't repeat");
}

#[test]
fn animation_timer_reports_zero_once_its_deadline_passes() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let timer = get_animation_timer(&ctx, &child).unwrap();
    let external = TestExternal::default();

    timer.start(Tick(0), 100);
    assert_eq!(timer.ticks_left(Tick(40), &external), 60);
    assert_eq!(*external.animation_refreshes_requested.borrow(), 1);

    assert_eq!(timer.ticks_left(Tick(150), &external), 0);
    assert!(!timer.is_active());
    // No further refresh requested once the deadline has passed.
    assert_eq!(*external.animation_refreshes_requested.borrow(), 1);
}

#[test]
fn raw_animation_ticks_left_reports_zero_once_end_passes() {
    let root = ComponentHandle::new_root();
    let external = TestExternal::default();

    *external.tick.borrow_mut() = Tick(40);
    assert_eq!(get_raw_animation_ticks_left(&root, &external, Tick(100)), 60);
    assert_eq!(*external.animation_refreshes_requested.borrow(), 1);

    *external.tick.borrow_mut() = Tick(150);
    assert_eq!(get_raw_animation_ticks_left(&root, &external, Tick(100)), 0);
    // No refresh requested once the deadline has passed.
    assert_eq!(*external.animation_refreshes_requested.borrow(), 1);
}

#[test]
fn curve_endpoints_pass_through_regardless_of_control_points() {
    for curve in [DEFAULT_CURVE, LINEAR_CURVE, EASE_IN_CURVE, EASE_OUT_CURVE, EASE_IN_OUT_CURVE] {
        assert!((curve.evaluate(0.0)).abs() < 1e-6);
        assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn linear_curve_is_the_identity() {
    for x in [0.0, 0.25, 0.5, 0.75, 1.0] {
        assert!((LINEAR_CURVE.evaluate(x) - x).abs() < 1e-6);
    }
}

#[test]
fn value_smoother_interpolates_then_settles_on_the_new_value() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let smoother = get_value_smoother(&ctx, &child, || 0.0f64).unwrap();
    let external = TestExternal::default();
    let transition = Transition {
        duration: 100,
        curve: LINEAR_CURVE,
    };

    let start = smoother.update(&1.0, true, Tick(0), transition, &external);
    assert!((start - 0.0).abs() < 1e-9, "a transition starts from the old value");

    let midpoint = smoother.update(&1.0, true, Tick(50), transition, &external);
    assert!((midpoint - 0.5).abs() < 1e-6);
    assert!(smoother.is_in_transition());

    let end = smoother.update(&1.0, true, Tick(100), transition, &external);
    assert!((end - 1.0).abs() < 1e-9);
    assert!(!smoother.is_in_transition(), "the transition ends once its duration elapses");
}

#[test]
fn value_smoother_ignores_a_change_observed_outside_a_refresh_pass() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let smoother = get_value_smoother(&ctx, &child, || 0.0f64).unwrap();
    let external = TestExternal::default();
    let transition = default_transition();

    let value = smoother.update(&5.0, false, Tick(0), transition, &external);
    assert!((value - 0.0).abs() < 1e-9, "a non-refresh pass never starts a transition");
}

#[test]
fn smooth_write_snaps_instead_of_transitioning() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let cell = Rc::new(RefCell::new(0.0f64));
    let arg = direct(cell.clone());
    let external = TestExternal::default();

    let mut s = smooth(&ctx, &child, arg, true, Tick(0), default_transition(), &external).unwrap();
    alia_signals::write_signal(&mut s, 42.0).unwrap();
    assert!((s.read().into_owned() - 42.0).abs() < 1e-9);
    assert!((*cell.borrow() - 42.0).abs() < 1e-9);
}

#[test]
fn async_request_relaunches_only_when_the_argument_id_changes() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let launches = RefCell::new(0);

    let result = async_request::<i32>(&ctx, &child, alia_id::simple_id(1), |reporter| {
        *launches.borrow_mut() += 1;
        reporter.report_ready(10);
    })
        .unwrap();
    assert!(result.has_value());
    assert_eq!(result.read().into_owned(), 10);
    assert_eq!(*launches.borrow(), 1);

    next_frame(&ctx, true);
    let result = async_request::<i32>(&ctx, &child, alia_id::simple_id(1), |reporter| {
        *launches.borrow_mut() += 1;
        reporter.report_ready(20);
    })
        .unwrap();
    assert_eq!(*launches.borrow(), 1, "an unchanged argument id doesn't relaunch");
    assert_eq!(result.read().into_owned(), 10);

    next_frame(&ctx, true);
    let result = async_request::<i32>(&ctx, &child, alia_id::simple_id(2), |reporter| {
        *launches.borrow_mut() += 1;
        reporter.report_ready(20);
    })
        .unwrap();
    assert_eq!(*launches.borrow(), 2);
    assert_eq!(result.read().into_owned(), 20);
}

#[test]
fn async_reporter_drops_a_report_from_a_superseded_launch() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let stale_reporter = RefCell::new(None);

    let _ = async_request::<i32>(&ctx, &child, alia_id::simple_id(1), |reporter| {
        *stale_reporter.borrow_mut() = Some(reporter);
    })
        .unwrap();

    next_frame(&ctx, true);
    let result = async_request::<i32>(&ctx, &child, alia_id::simple_id(2), |reporter| {
        reporter.report_ready(99);
    })
        .unwrap();
    assert_eq!(result.read().into_owned(), 99);

    // The first launch's reporter is for a version this node has since
    // moved past; its report must be silently dropped.
    stale_reporter.borrow().as_ref().unwrap().report_ready(1);
    assert_eq!(result.read().into_owned(), 99, "a stale reporter can't overwrite a newer result");
}

#[test]
fn async_request_reports_and_clears_a_failure() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();

    let result = async_request::<i32>(&ctx, &child, alia_id::simple_id(1), |reporter| {
        reporter.report_failed(alia_signals::SignalError::new("broke"));
    })
        .unwrap();
    assert!(!result.has_value());
    assert!(result.is_invalidated());
    assert_eq!(result.error().unwrap().message(), "broke");

    next_frame(&ctx, true);
    let result = async_request::<i32>(&ctx, &child, alia_id::simple_id(2), |reporter| {
        reporter.report_ready(7);
    })
        .unwrap();
    assert!(result.error().is_none(), "a new launch clears the old failure");
    assert_eq!(result.read().into_owned(), 7);
}

/// A minimal hand-rolled signal whose presence can be toggled frame to
/// frame, for exercising [`deflicker`] without needing a full duplex
/// source.
struct Flicker(Rc<RefCell<Option<f64>>>);

impl Signal<f64> for Flicker {
    fn has_value(&self) -> bool {
        self.0.borrow().is_some()
    }
    fn value_id(&self) -> Id {
        alia_id::unit_id()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl Readable<f64> for Flicker {
    fn read(&self) -> Cow<'_, f64> {
        Cow::Owned(self.0.borrow().expect("has_value() was true"))
    }
}

#[test]
fn deflicker_retains_the_value_through_a_brief_loss() {
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let source = Rc::new(RefCell::new(Some(7.0)));
    let external = TestExternal::default();

    let d = deflicker(&ctx, &child, Flicker(source.clone()), 50, Tick(0), &external).unwrap();
    assert_eq!(d.read().into_owned(), 7.0);

    *source.borrow_mut() = None;
    next_frame(&ctx, true);
    let d = deflicker(&ctx, &child, Flicker(source.clone()), 50, Tick(10), &external).unwrap();
    assert!(d.has_value(), "the value is retained right after it's lost");
    assert_eq!(d.read().into_owned(), 7.0);

    next_frame(&ctx, true);
    let d = deflicker(&ctx, &child, Flicker(source.clone()), 50, Tick(100), &external).unwrap();
    assert!(!d.has_value(), "the value is finally dropped once the grace period elapses");
}
