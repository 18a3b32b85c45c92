// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! `transform`: a memoized per-item map over a slice, collected eagerly
//! into a `Vec`. Built on [`crate::for_each`] for identity-preserving
//! iteration and [`alia_routing::invoke_pure_component`] for per-item
//! memoization, so an item whose value hasn't changed (and whose
//! container isn't dirty or animating) skips re-running `map` entirely.

use alia_context::Context;
use alia_id::Id;
use alia_routing::{invoke_pure_component, ComponentError, RoutingError};

use crate::for_each::for_each;
use crate::internal::{current_container, event_traversal};

pub fn transform<T, R>(
    ctx: &Context,
    items: &[T],
    key: impl Fn(&T) -> Id,
    map: impl Fn(&Context, &T) -> Result<R, ComponentError>,
) -> Result<Vec<R>, RoutingError>
where
    R: Clone + 'static,
{
    let parent = current_container(ctx)?;
    let traversal_cell = event_traversal(ctx)?;
    let mut results = Vec::with_capacity(items.len());
    for_each(ctx, items, key, |ctx, item, item_id| {
        let value = invoke_pure_component(ctx, &parent, traversal_cell, std::slice::from_ref(item_id), |ctx| {
            map(ctx, item)
        })?;
        results.push(value);
        Ok(())
    })?;
    Ok(results)
}
