// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Pure-component memoization: skip re-invoking a
//! component function when neither its container's dirty/animating bits
//! nor its folded content id have changed since the last refresh.

use std::cell::RefCell;
use std::rc::Rc;

use alia_context::{Context, Tag};
use alia_id::{combine_ids, Id};

use crate::component::{get_component, ComponentHandle};
use crate::error::{ComponentError, RoutingError};
use crate::event::{EventTraversal, ScopedContainer};

/// The rolling content id threaded through nested pure components: the
/// fold of the context's content id with each argument's value id.
/// Absent from the root context, which is equivalent to
/// [`alia_id::unit_id`].
pub struct ContentIdTag;

impl Tag for ContentIdTag {
    type Data = Id;
    const NAME: &'static str = "content_id";
}

pub fn current_content_id(ctx: &Context) -> Id {
    ctx.get::<ContentIdTag>().cloned().unwrap_or_else(alia_id::unit_id)
}

/// Registered via [`Context::extend`] to let object-tree adaptors splice
/// their previously-emitted subtree back into place when a pure
/// component's body is skipped. `alia`'s core has no built-in object-tree
/// adaptor — layout/widget backends are host-supplied — so this is purely
/// an extension point: an empty list is a correct no-op default.
pub struct ContentCachingHooksTag;

impl Tag for ContentCachingHooksTag {
    type Data = Vec<Rc<dyn Fn(&Context, bool)>>;
    const NAME: &'static str = "content_caching_hooks";
}

fn run_content_caching_hooks(ctx: &Context, required: bool) {
    if let Some(hooks) = ctx.get::<ContentCachingHooksTag>() {
        for hook in hooks {
            hook(ctx, required);
        }
    }
}

/// The cached outcome of a pure component's last invocation: the content
/// id it was computed from, and its result (re-raised verbatim on
/// subsequent skipped passes until the id or the dirty/animating bits
/// change).
struct PureMemo<R> {
    content_id: Id,
    result: Result<R, ComponentError>,
}

/// Invokes `f` inside its own persistent component container, skipping
/// re-invocation when the container is neither dirty nor animating and
/// `args`' folded id hasn't changed.
///
/// `args` are the value ids of `f`'s actual arguments; combined with the
/// enclosing context's rolling content id, they determine `f`'s content
/// id. `f` receives a context with that id installed via
/// [`ContentIdTag`], so nested pure components fold further.
pub fn invoke_pure_component<R, F>(
    ctx: &Context,
    parent: &ComponentHandle,
    event_traversal: &RefCell<EventTraversal>,
    args: &[Id],
    f: F,
) -> Result<R, RoutingError>
where
    R: Clone + 'static,
    F: FnOnce(&Context) -> Result<R, ComponentError>,
{
    let container = get_component(ctx, parent)?;
    let scope = ScopedContainer::begin(event_traversal, &container);

    let content_id = combine_ids([current_content_id(ctx), combine_ids(args.iter().cloned())]);

    let graph = ctx.graph().clone();
    let (memo_node, context_setup_block, content_block) = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        let (memo_node, _) = g.get_or_create_node(&mut traversal, || None::<PureMemo<R>>)?;
        let context_setup_block = g.get_or_create_block(&mut traversal)?;
        let content_block = g.get_or_create_block(&mut traversal)?;
        (memo_node, context_setup_block, content_block)
    };
    let _ = context_setup_block; // reserved for future object-tree adaptor state

    let previous_id = graph
        .borrow()
        .get::<Option<PureMemo<R>>>(memo_node)
        .as_ref()
        .map(|memo| memo.content_id.clone());
    let required = scope.is_dirty || scope.is_animating || previous_id.as_ref() != Some(&content_id);

    let result = if required {
        let inner_ctx = ctx.clone().extend::<ContentIdTag>(content_id.clone());
        ctx.traversal().borrow_mut().push_block(content_block);
        let outcome = f(&inner_ctx);
        ctx.traversal().borrow_mut().pop_block();
        *graph.borrow_mut().get_mut::<Option<PureMemo<R>>>(memo_node) = Some(PureMemo {
                content_id,
                result: outcome.clone(),
        });
        outcome
    } else {
        graph
        .borrow()
        .get::<Option<PureMemo<R>>>(memo_node)
        .as_ref()
        .expect("previous_id matched, so a memo already exists")
        .result
        .clone()
    };

    run_content_caching_hooks(ctx, required);
    scope.end();
    result.map_err(RoutingError::Component)
}
