// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! `try_`/`catch_`: refresh-time exception capture. A failing body's
//! error is stored at the `try_` call site and its containing component
//! marked dirty, so the next refresh retries the body; `catch_` clauses
//! get first chance at a stored error, in the order they're chained, and
//! an error no clause claims stays stored and is re-raised.

use alia_context::Context;
use alia_routing::{get_component, mark_dirty_component, RoutingError};

use crate::internal::current_container;

/// The outcome of a [`try_`] block: either the body's result, or a
/// pending error waiting for a [`TryResult::catch_`] clause to claim it.
pub struct TryResult<'ctx, R> {
    ctx: &'ctx Context,
    error_node: alia_graph::NodeId,
    result: Option<R>,
    handled: bool,
}

/// Runs `body` inside its own component container. On success, clears any
/// previously stored error at this call site. On failure (other than an
/// abort, which propagates immediately and is never something a `catch_`
/// clause should see), stores the error and marks the container dirty so
/// the next refresh tries `body` again.
pub fn try_<R>(
    ctx: &Context,
    body: impl FnOnce(&Context) -> Result<R, RoutingError>,
) -> Result<TryResult<'_, R>, RoutingError> {
    let parent = current_container(ctx)?;
    let container = get_component(ctx, &parent)?;

    let graph = ctx.graph().clone();
    let (error_node, block) = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        let (error_node, _) = g.get_or_create_node(&mut traversal, || None::<RoutingError>)?;
        let block = g.get_or_create_block(&mut traversal)?;
        (error_node, block)
    };

    ctx.traversal().borrow_mut().push_block(block);
    let outcome = body(ctx);
    ctx.traversal().borrow_mut().pop_block();

    let result = match outcome {
        Ok(value) => {
            *graph.borrow_mut().get_mut::<Option<RoutingError>>(error_node) = None;
            Some(value)
        }
        Err(RoutingError::Aborted) => return Err(RoutingError::Aborted),
        Err(err) => {
            *graph.borrow_mut().get_mut::<Option<RoutingError>>(error_node) = Some(err);
            mark_dirty_component(&container);
            None
        }
    };

    Ok(TryResult {
        ctx,
        error_node,
        result,
        handled: false,
    })
}

impl<'ctx, R> TryResult<'ctx, R> {
    /// If the body failed and no earlier `catch_` in this chain handled
    /// it, offers the stored error to `matches`. A `Some` return runs
    /// `handler` and clears the stored error (the component stays dirty
    /// from `try_`, so `handler`'s side effects, if any, take part in the
    /// next refresh like anything else); a `None` leaves the error stored
    /// for a later `catch_` or for re-raising via [`TryResult::into_result`].
    pub fn catch_<E>(
        mut self,
        matches: impl FnOnce(&RoutingError) -> Option<E>,
        handler: impl FnOnce(&Context, E),
    ) -> Self {
        if self.handled || self.result.is_some() {
            return self;
        }
        let graph = self.ctx.graph().clone();
        let stored = graph.borrow().get::<Option<RoutingError>>(self.error_node).clone();
        if let Some(err) = stored {
            if let Some(matched) = matches(&err) {
                handler(self.ctx, matched);
                *graph.borrow_mut().get_mut::<Option<RoutingError>>(self.error_node) = None;
                self.handled = true;
            }
        }
        self
    }

    /// The body's result if it succeeded, `Ok(None)` if it failed and a
    /// `catch_` clause handled it, or the stored error if it failed and
    /// nothing has handled it yet.
    pub fn into_result(self) -> Result<Option<R>, RoutingError> {
        if self.result.is_some() || self.handled {
            return Ok(self.result);
        }
        let graph = self.ctx.graph().clone();
        let stored = graph.borrow().get::<Option<RoutingError>>(self.error_node).clone();
        match stored {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}
