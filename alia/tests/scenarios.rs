// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! End-to-end scenarios exercising the facade the way application code
//! actually would: through `alia::prelude`, driving a `System` or a
//! hand-rolled traversal harness rather than calling any lower crate
//! directly.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use alia::prelude::*;

struct Click;

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

#[test]
fn state_and_action_dispatch_through_click_events() {
    let _logger = env_logger::try_init();
    let final_value = Rc::new(Cell::new(0i32));
    let final_value2 = final_value.clone();
    let change_count = Rc::new(Cell::new(0u32));
    let change_count2 = change_count.clone();
    let last_id = Rc::new(RefCell::new(None::<Id>));
    let last_id2 = last_id.clone();

    let sys = System::new(move |ctx: &Context| {
        let is_click = ctx
            .get::<EventTraversalTag>()
            .map(|t| t.borrow().event().downcast::<Click>().is_some())
            .unwrap_or(false);
        let state = get_state(ctx, || 0i32);

        if is_click {
            let mut action = apply_action(state, |x: &i32| x + 1);
            perform_action(&mut action).unwrap();
        } else {
            let id = state.value_id();
            final_value2.set(*state.read());
            if last_id2.borrow().as_ref() != Some(&id) {
                change_count2.set(change_count2.get() + 1);
                *last_id2.borrow_mut() = Some(id);
            }
        }
        Ok(())
    });

    sys.refresh_system().unwrap();
    assert_eq!(final_value.get(), 0);
    assert_eq!(change_count.get(), 1, "the state's first-ever id counts as a change");

    sys.dispatch_event(Event::new(Click)).unwrap();
    assert_eq!(final_value.get(), 1);

    sys.dispatch_event(Event::new(Click)).unwrap();
    assert_eq!(final_value.get(), 2);
    assert_eq!(change_count.get(), 3, "the id changed once on creation and once per click");
}

#[test]
fn duplex_signal_rejects_invalid_writes_and_recovers() {
    let _logger = env_logger::try_init();
    let backing = Rc::new(Cell::new(0i32));
    let version = Rc::new(Cell::new(0u64));

    let backing2 = backing.clone();
    let backing3 = backing.clone();
    let version2 = version.clone();
    let version3 = version.clone();

    let text_view = lambda_duplex_with_id(
        move || true,
        move || backing2.get().to_string(),
        || true,
        move |text: String| match text.parse::<i32>() {
            Ok(v) => {
                backing3.set(v);
                version3.set(version3.get() + 1);
                Ok(())
            }
            Err(_) => Err(SignalError::new("not an integer")),
        },
        move || simple_id(version2.get()),
    );
    let mut signal = validated(text_view);

    assert_eq!(backing.get(), 0);
    write_signal(&mut signal, "abc".to_string()).unwrap();
    assert!(signal.is_invalidated());
    assert!(!signal.has_value());
    assert_eq!(backing.get(), 0, "the rejected write never touched the backing value");

    write_signal(&mut signal, "42".to_string()).unwrap();
    assert!(!signal.is_invalidated(), "a later successful write clears the stored error");
    assert!(signal.has_value());
    assert_eq!(*signal.read(), "42");
    assert_eq!(backing.get(), 42);
}

#[test]
fn smoothed_value_interpolates_then_settles() {
    let _logger = env_logger::try_init();
    let (ctx, root) = root_context();
    let child = get_component(&ctx, &root).unwrap();
    let tick = Rc::new(Cell::new(Tick(0)));

    struct TestExternal {
        tick: Rc<Cell<Tick>>,
    }
    impl ExternalInterface for TestExternal {
        fn get_tick_count(&self) -> Tick {
            self.tick.get()
        }
        fn schedule_animation_refresh(&self) {}
        fn schedule_timer_event(&self, _time: Tick) {}
        fn schedule_asynchronous_update(&self, thunk: Box<dyn FnOnce()>) {
            thunk();
        }
    }
    let external = TestExternal { tick: tick.clone() };
    let transition = Transition { duration: 100, curve: LINEAR_CURVE };

    let value = Rc::new(RefCell::new(0.0f64));
    let read_smoothed = |ctx: &Context, value: &Rc<RefCell<f64>>, is_refresh: bool, now: Tick| -> f64 {
        let arg = direct(Rc::new(RefCell::new(*value.borrow())));
        let s = smooth(ctx, &child, arg, is_refresh, now, transition, &external).unwrap();
        *s.read()
    };

    // First pass: establish a resting value of 0.
    next_frame(&ctx, true);
    assert_eq!(read_smoothed(&ctx, &value, true, tick.get()), 0.0);

    // Change the target to 10 at t=0: the smoother should start a
    // transition rather than jumping immediately.
    *value.borrow_mut() = 10.0;
    next_frame(&ctx, true);
    let at_start = read_smoothed(&ctx, &value, true, tick.get());
    assert_eq!(at_start, 0.0, "the transition hasn't advanced yet at its own start tick");

    tick.set(Tick(50));
    next_frame(&ctx, false);
    let halfway = read_smoothed(&ctx, &value, false, tick.get());
    assert!((halfway - 5.0).abs() < 1e-6, "halfway through a linear 100ms transition, the value is ~5");

    tick.set(Tick(100));
    next_frame(&ctx, false);
    let settled = read_smoothed(&ctx, &value, false, tick.get());
    assert_eq!(settled, 10.0);
}

#[test]
fn control_flow_combinators_compose_inside_one_controller() {
    let _logger = env_logger::try_init();
    let cond = Rc::new(Cell::new(true));
    let cond2 = cond.clone();
    let items = Rc::new(RefCell::new(vec![1i32, 2, 3]));
    let items2 = items.clone();
    let visited = Rc::new(RefCell::new(Vec::<i32>::new()));
    let visited2 = visited.clone();

    let sys = System::new(move |ctx: &Context| {
        if_(ctx, cond2.get(), |ctx| {
            let current = items2.borrow().clone();
            let visited3 = visited2.clone();
            for_each(ctx, &current, |item| simple_id(*item), move |_ctx, item, _id| {
                visited3.borrow_mut().push(*item);
                Ok(())
            })
        })?
        .else_(|_ctx| Ok(()))?;
        Ok(())
    });

    sys.refresh_system().unwrap();
    assert_eq!(*visited.borrow(), vec![1, 2, 3]);

    visited.borrow_mut().clear();
    cond.set(false);
    sys.refresh_system().unwrap();
    assert!(visited.borrow().is_empty(), "the branch didn't run, so for_each never visited anything");

    visited.borrow_mut().clear();
    cond.set(true);
    sys.refresh_system().unwrap();
    assert_eq!(*visited.borrow(), vec![1, 2, 3], "the branch's for_each state survived the detour");
}

#[test]
fn for_each_keeps_each_items_container_identity_across_reordering() {
    use std::collections::HashMap;

    let _logger = env_logger::try_init();
    let parent = ComponentHandle::new_root();
    let parent2 = parent.clone();
    let items = Rc::new(RefCell::new(vec![1i32, 2, 3]));
    let items2 = items.clone();
    let containers: Rc<RefCell<HashMap<i32, ComponentHandle>>> = Rc::new(RefCell::new(HashMap::new()));
    let containers2 = containers.clone();

    let sys = System::new(move |ctx: &Context| {
        let current = items2.borrow().clone();
        let parent3 = parent2.clone();
        let containers3 = containers2.clone();
        for_each(ctx, &current, |item| simple_id(*item), move |ctx, item, _id| {
            let container = get_component(ctx, &parent3)?;
            if let Some(previous) = containers3.borrow().get(item) {
                assert!(
                    previous.same_container(&container),
                    "item {item} should keep the same container across frames"
                );
            }
            containers3.borrow_mut().insert(*item, container);
            Ok(())
        })
    });

    sys.refresh_system().unwrap();
    assert_eq!(containers.borrow().len(), 3);

    // Reorder and drop an item on the next frame: each surviving item's
    // container must follow its key, not its new position in the list.
    items.borrow_mut().clear();
    items.borrow_mut().extend([3, 1]);
    sys.refresh_system().unwrap();
    assert_eq!(containers.borrow().len(), 3, "the container for the dropped item 2 is still cached for comparison");
}
