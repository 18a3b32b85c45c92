// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! `if_`/`else_if_`/`else_`: conditional scopes that keep each branch's
//! data alive across frames whether or not the branch currently runs.
//!
//! Rather than a macro that brackets arbitrary control flow, this is a
//! small builder: every branch — taken or not — reserves its own
//! positional block and component container at its own call site, every
//! frame. An ordinary block is never garbage collected regardless of
//! visitation, so a branch that stops running for a while and later comes
//! back finds its state untouched.

use alia_context::Context;
use alia_routing::{get_component, RoutingError, ScopedContainer};

use crate::internal::{current_container, event_traversal};

fn enter_branch<R>(
    ctx: &Context,
    run: bool,
    body: impl FnOnce(&Context) -> Result<R, RoutingError>,
) -> Result<Option<R>, RoutingError> {
    let graph = ctx.graph().clone();
    let block = {
        let mut traversal = ctx.traversal().borrow_mut();
        let mut g = graph.borrow_mut();
        g.get_or_create_block(&mut traversal)?
    };
    if !run {
        return Ok(None);
    }

    let parent = current_container(ctx)?;
    let container = get_component(ctx, &parent)?;
    let traversal_cell = event_traversal(ctx)?;
    let scope = ScopedContainer::begin(traversal_cell, &container);
    ctx.traversal().borrow_mut().push_block(block);
    let outcome = body(ctx);
    ctx.traversal().borrow_mut().pop_block();
    drop(scope);
    outcome.map(Some)
}

/// A chain of mutually exclusive branches, exactly one of which runs.
/// Built by [`if_`], extended with [`IfChain::else_if_`], and either closed
/// without a catch-all via [`IfChain::end`] or completed with
/// [`IfChain::else_`].
pub struct IfChain<'ctx, R> {
    ctx: &'ctx Context,
    taken: bool,
    result: Option<R>,
}

/// Opens the first branch of a conditional scope. `body` runs now iff
/// `cond` is true; either way, this branch's own data block is reserved
/// at this call site for future frames.
pub fn if_<'ctx, R>(
    ctx: &'ctx Context,
    cond: bool,
    body: impl FnOnce(&Context) -> Result<R, RoutingError>,
) -> Result<IfChain<'ctx, R>, RoutingError> {
    let result = enter_branch(ctx, cond, body)?;
    let taken = result.is_some();
    Ok(IfChain { ctx, taken, result })
}

impl<'ctx, R> IfChain<'ctx, R> {
    /// Adds another branch, run iff no earlier branch in this chain ran
    /// and `cond` is true.
    pub fn else_if_(
        mut self,
        cond: bool,
        body: impl FnOnce(&Context) -> Result<R, RoutingError>,
    ) -> Result<Self, RoutingError> {
        let run = !self.taken && cond;
        if let Some(value) = enter_branch(self.ctx, run, body)? {
            self.result = Some(value);
            self.taken = true;
        }
        Ok(self)
    }

    /// Closes the chain without a catch-all branch. `None` if no branch
    /// in the chain ran this frame.
    pub fn end(self) -> Option<R> {
        self.result
    }

    /// Closes the chain with a catch-all branch, run iff nothing earlier
    /// in the chain did. Since exactly one branch always runs once this
    /// returns, the result is unwrapped.
    pub fn else_(self, body: impl FnOnce(&Context) -> Result<R, RoutingError>) -> Result<R, RoutingError> {
        let run = !self.taken;
        let outcome = enter_branch(self.ctx, run, body)?;
        Ok(outcome
            .or(self.result)
            .expect("exactly one branch of an if_/else_if_/else_ chain always runs"))
    }
}
