// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! `for_each`/`for_each_with_removal`: naming-context-backed iteration, so
//! each item keeps its own persistent data across frames by identity
//! (its key) rather than by position in `items`.

use alia_graph::VisitOutcome;
use alia_id::Id;
use alia_routing::{get_component, RoutingError, ScopedContainer};

use crate::internal::{current_container, event_traversal};
use alia_context::Context;

/// Visits `items` under a naming context keyed by `key`, reusing each
/// item's block across frames as long as its key keeps appearing.
/// Equivalent to `for_each_with_removal` with a no-op removal hook.
pub fn for_each<T, K>(
    ctx: &Context,
    items: &[T],
    key: K,
    body: impl FnMut(&Context, &T, &Id) -> Result<(), RoutingError>,
) -> Result<(), RoutingError>
where
    K: Fn(&T) -> Id,
{
    for_each_with_removal(ctx, items, key, body, |_ctx, _id| {})
}

/// Like [`for_each`], but also calls `on_removed` for every key that was
/// present last pass and is absent this pass — after the pass has
/// finished visiting everything, so `on_removed` sees the complete set of
/// departures at once rather than one at a time mid-iteration.
///
/// The naming map itself only tracks "entries it has ever bound", not
/// "keys this crate saw last pass" (that bookkeeping belongs to garbage
/// collection, not to this hook), so this keeps its own sibling record of
/// the previous pass's keys to diff against.
pub fn for_each_with_removal<T, K>(
    ctx: &Context,
    items: &[T],
    key: K,
    mut body: impl FnMut(&Context, &T, &Id) -> Result<(), RoutingError>,
    mut on_removed: impl FnMut(&Context, &Id),
) -> Result<(), RoutingError>
where
    K: Fn(&T) -> Id,
{
    let graph = ctx.graph().clone();
    let (map_node, previous_keys_node) = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        let map_node = g.get_or_create_naming_map(&mut traversal)?;
        let (previous_keys_node, _) = g.get_or_create_node(&mut traversal, Vec::<Id>::new)?;
        (map_node, previous_keys_node)
    };
    graph.borrow_mut().begin_naming_traversal(map_node);

    let parent = current_container(ctx)?;
    let traversal_cell = event_traversal(ctx)?;
    let mut current_keys = Vec::with_capacity(items.len());

    for item in items {
        let id = key(item);
        let block = {
            let mut traversal = ctx.traversal().borrow_mut();
            let mut g = graph.borrow_mut();
            match g.visit_name(map_node, &id, &traversal)? {
                VisitOutcome::Found(block) => block,
                VisitOutcome::NotFound => {
                    let block = g.alloc_named_block();
                    g.bind_name(map_node, id.clone(), block);
                    block
                }
            }
        };
        current_keys.push(id.clone());

        ctx.traversal().borrow_mut().push_block(block);
        let outcome = get_component(ctx, &parent).map(|container| {
            let scope = ScopedContainer::begin(traversal_cell, &container);
            let outcome = body(ctx, item, &id);
            drop(scope);
            outcome
        });
        ctx.traversal().borrow_mut().pop_block();
        outcome??;
    }

    {
        let mut traversal = ctx.traversal().borrow_mut();
        graph.borrow_mut().end_naming_traversal(map_node, &mut traversal);
    }

    let previously_seen =
        std::mem::replace(graph.borrow_mut().get_mut::<Vec<Id>>(previous_keys_node), current_keys.clone());
    for old_id in &previously_seen {
        if !current_keys.contains(old_id) {
            on_removed(ctx, old_id);
        }
    }

    Ok(())
}
