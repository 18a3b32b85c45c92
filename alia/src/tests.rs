// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use alia_context::Context;
use alia_id::simple_id;
use alia_routing::{ComponentError, RoutingError};
use alia_signals::{get_state, write_signal, Readable, Signal};
use alia_system::System;

use super::*;

fn run_passes(sys: &System, count: u32) {
    for _ in 0..count {
        sys.refresh_system().unwrap();
    }
}

#[test]
fn if_chain_preserves_each_branchs_state_across_toggles() {
    let _logger = env_logger::try_init();
    let cond = Rc::new(Cell::new(true));
    let cond2 = cond.clone();
    let true_count = Rc::new(Cell::new(0i32));
    let true_count2 = true_count.clone();
    let false_count = Rc::new(Cell::new(0i32));
    let false_count2 = false_count.clone();

    let sys = System::new(move |ctx: &Context| {
        let result = if_(ctx, cond2.get(), |ctx| {
            let mut state = get_state(ctx, || 0i32);
            let next = *state.read() + 1;
            write_signal(&mut state, next).unwrap();
            true_count2.set(next);
            Ok::<(), RoutingError>(())
        })?
        .else_(|ctx| {
            let mut state = get_state(ctx, || 0i32);
            let next = *state.read() + 1;
            write_signal(&mut state, next).unwrap();
            false_count2.set(next);
            Ok::<(), RoutingError>(())
        });
        result?;
        Ok(())
    });

    run_passes(&sys, 1);
    assert_eq!(true_count.get(), 1);
    cond.set(false);
    run_passes(&sys, 1);
    assert_eq!(false_count.get(), 1);
    cond.set(true);
    run_passes(&sys, 1);
    assert_eq!(true_count.get(), 2, "the true branch's counter survived the detour through false");
}

#[test]
fn for_each_keeps_each_items_state_by_key_not_position() {
    let _logger = env_logger::try_init();
    let items = Rc::new(RefCell::new(vec![1i32, 2, 3]));
    let items2 = items.clone();
    let seen = Rc::new(RefCell::new(Vec::<(i32, i32)>::new()));
    let seen2 = seen.clone();

    let sys = System::new(move |ctx: &Context| {
        let current = items2.borrow().clone();
        seen2.borrow_mut().clear();
        for_each(ctx, &current, |item| simple_id(*item), |ctx, item, _id| {
            let mut state = get_state(ctx, || 0i32);
            let next = *state.read() + 1;
            write_signal(&mut state, next).unwrap();
            seen2.borrow_mut().push((*item, next));
            Ok(())
        })?;
        Ok(())
    });

    run_passes(&sys, 1);
    assert_eq!(*seen.borrow(), vec![(1, 1), (2, 1), (3, 1)]);

    // Reorder: item 2's visit count should keep climbing from 1, not reset,
    // because its block is addressed by key.
    items.borrow_mut().reverse();
    run_passes(&sys, 1);
    assert_eq!(*seen.borrow(), vec![(3, 2), (2, 2), (1, 2)]);
}

#[test]
fn for_each_with_removal_reports_keys_that_disappeared() {
    let _logger = env_logger::try_init();
    let items = Rc::new(RefCell::new(vec![1i32, 2, 3]));
    let items2 = items.clone();
    let removed = Rc::new(RefCell::new(Vec::<i32>::new()));
    let removed2 = removed.clone();

    let sys = System::new(move |ctx: &Context| {
        let current = items2.borrow().clone();
        for_each_with_removal(
            ctx,
            &current,
            |item| simple_id(*item),
            |_ctx, _item, _id| Ok(()),
            |_ctx, id| {
                for candidate in 0..10 {
                    if *id == simple_id(candidate) {
                        removed2.borrow_mut().push(candidate);
                    }
                }
            },
        )?;
        Ok(())
    });

    run_passes(&sys, 1);
    assert!(removed.borrow().is_empty());

    items.borrow_mut().retain(|&item| item != 2);
    run_passes(&sys, 1);
    assert_eq!(*removed.borrow(), vec![2]);
}

#[test]
fn transform_only_remaps_items_whose_value_changed() {
    let _logger = env_logger::try_init();
    let items = Rc::new(RefCell::new(vec![1i32, 2, 3]));
    let items2 = items.clone();
    let map_calls = Rc::new(Cell::new(0u32));
    let map_calls2 = map_calls.clone();
    let last_result = Rc::new(RefCell::new(Vec::<i32>::new()));
    let last_result2 = last_result.clone();

    let sys = System::new(move |ctx: &Context| {
        let current = items2.borrow().clone();
        let map_calls3 = map_calls2.clone();
        let squares = transform(
            ctx,
            &current,
            |item| simple_id(*item),
            move |_ctx, item| {
                map_calls3.set(map_calls3.get() + 1);
                Ok::<i32, ComponentError>(item * item)
            },
        )?;
        *last_result2.borrow_mut() = squares;
        Ok(())
    });

    run_passes(&sys, 1);
    assert_eq!(*last_result.borrow(), vec![1, 4, 9]);
    assert_eq!(map_calls.get(), 3);

    // Nothing changed: every item should be served from its memo.
    run_passes(&sys, 1);
    assert_eq!(map_calls.get(), 3, "an unchanged item's mapped value is memoized, not recomputed");

    // Change one item's value: only that item's memo should miss.
    items.borrow_mut()[1] = 20;
    run_passes(&sys, 1);
    assert_eq!(*last_result.borrow(), vec![1, 400, 9]);
    assert_eq!(map_calls.get(), 4, "only the changed item re-ran its map function");
}

#[test]
fn on_init_runs_exactly_once() {
    let _logger = env_logger::try_init();
    let inits = Rc::new(Cell::new(0u32));
    let inits2 = inits.clone();

    let sys = System::new(move |ctx: &Context| {
        on_init(ctx, |_ctx| {
            inits2.set(inits2.get() + 1);
        })?;
        Ok(())
    });

    run_passes(&sys, 3);
    assert_eq!(inits.get(), 1);
}

#[test]
fn on_activate_fires_only_on_the_false_to_true_transition() {
    let _logger = env_logger::try_init();
    let active = Rc::new(Cell::new(false));
    let active2 = active.clone();
    let activations = Rc::new(Cell::new(0u32));
    let activations2 = activations.clone();

    let sys = System::new(move |ctx: &Context| {
        on_activate(ctx, active2.get(), |_ctx| {
            activations2.set(activations2.get() + 1);
        })?;
        Ok(())
    });

    run_passes(&sys, 1);
    assert_eq!(activations.get(), 0);
    active.set(true);
    run_passes(&sys, 2);
    assert_eq!(activations.get(), 1, "staying active across passes doesn't refire it");
    active.set(false);
    run_passes(&sys, 1);
    active.set(true);
    run_passes(&sys, 1);
    assert_eq!(activations.get(), 2, "deactivating and reactivating fires it again");
}

/// A minimal hand-rolled signal whose presence and value are driven by
/// shared cells, so the test can flip it between holding a value and
/// holding none. None of the built-in sources do this (`value` always has
/// one, `empty` never does), and `on_value_*` needs `Readable`, which
/// `empty`'s `Empty<T>` deliberately doesn't implement.
struct Toggle {
    present: Rc<Cell<bool>>,
    value: Rc<Cell<i32>>,
}

impl Signal<i32> for Toggle {
    fn has_value(&self) -> bool {
        self.present.get()
    }
    fn value_id(&self) -> alia_id::Id {
        if self.present.get() {
            simple_id(self.value.get())
        } else {
            alia_id::Id::Null
        }
    }
    fn capability(&self) -> alia_signals::Capability {
        alia_signals::Capability::new(alia_signals::ReadTier::Readable, alia_signals::WriteTier::Unwritable)
    }
}

impl Readable<i32> for Toggle {
    fn read(&self) -> std::borrow::Cow<'_, i32> {
        std::borrow::Cow::Owned(self.value.get())
    }
}

#[test]
fn on_value_change_gain_and_loss_track_a_signals_presence() {
    let _logger = env_logger::try_init();
    let present = Rc::new(Cell::new(false));
    let present2 = present.clone();
    let value_holder = Rc::new(Cell::new(0i32));
    let value_holder2 = value_holder.clone();

    let changes = Rc::new(Cell::new(0u32));
    let changes2 = changes.clone();
    let gains = Rc::new(Cell::new(0u32));
    let gains2 = gains.clone();
    let losses = Rc::new(Cell::new(0u32));
    let losses2 = losses.clone();

    let sys = System::new(move |ctx: &Context| {
        let signal = Toggle {
            present: present2.clone(),
            value: value_holder2.clone(),
        };
        on_value_change(ctx, &signal, |_ctx, _v: &i32| {
            changes2.set(changes2.get() + 1);
        })?;
        on_value_gain(ctx, &signal, |_ctx, _v: &i32| {
            gains2.set(gains2.get() + 1);
        })?;
        on_value_loss(ctx, &signal, |_ctx| {
            losses2.set(losses2.get() + 1);
        })?;
        Ok(())
    });

    run_passes(&sys, 1);
    assert_eq!((changes.get(), gains.get(), losses.get()), (0, 0, 0));

    present.set(true);
    value_holder.set(1);
    run_passes(&sys, 1);
    assert_eq!((changes.get(), gains.get(), losses.get()), (1, 1, 0), "first appearance is both a change and a gain");

    value_holder.set(2);
    run_passes(&sys, 1);
    assert_eq!((changes.get(), gains.get(), losses.get()), (2, 1, 0), "a later change isn't a gain");

    present.set(false);
    run_passes(&sys, 1);
    assert_eq!((changes.get(), gains.get(), losses.get()), (2, 1, 1));
}

struct Overflow;

#[test]
fn try_catch_retries_the_body_until_it_stops_failing() {
    let _logger = env_logger::try_init();
    let attempts = Rc::new(Cell::new(0u32));
    let attempts2 = attempts.clone();
    let caught = Rc::new(Cell::new(0u32));
    let caught2 = caught.clone();
    let succeeded = Rc::new(Cell::new(false));
    let succeeded2 = succeeded.clone();

    let sys = System::new(move |ctx: &Context| {
        let attempts3 = attempts2.clone();
        let outcome = try_(ctx, move |_ctx| {
            let n = attempts3.get() + 1;
            attempts3.set(n);
            if n < 3 {
                Err(RoutingError::Component(ComponentError::new("overflow")))
            } else {
                Ok(42i32)
            }
        })?
        .catch_(
            |err| match err {
                RoutingError::Component(_) => Some(Overflow),
                _ => None,
            },
            |_ctx, Overflow| {
                caught2.set(caught2.get() + 1);
            },
        )
        .into_result()?;
        if let Some(value) = outcome {
            assert_eq!(value, 42);
            succeeded2.set(true);
        }
        Ok(())
    });

    // A failure marks its container dirty, so `refresh_system` keeps
    // looping internally until the body stops failing: all three
    // attempts happen inside this one call.
    run_passes(&sys, 1);
    assert_eq!(attempts.get(), 3);
    assert_eq!(caught.get(), 2, "the first two failures were each caught once");
    assert!(succeeded.get(), "the third attempt succeeds and nothing is left to catch");
}
