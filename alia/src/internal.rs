// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Small helpers every control-flow combinator in this crate needs: the
//! currently-active container and event traversal, both reached through
//! the context extension chain the system loop installs.

use std::cell::RefCell;

use alia_context::Context;
use alia_routing::{ComponentHandle, EventTraversal, EventTraversalTag, RoutingError};

/// The container a nested [`alia_routing::get_component`] call should
/// parent itself to: whichever container is active on the traversal right
/// now. Every combinator in this crate that opens its own container reads
/// this before opening it, so the component tree's shape follows the call
/// tree rather than needing to be threaded through explicitly.
pub(crate) fn current_container(ctx: &Context) -> Result<ComponentHandle, RoutingError> {
    let container = event_traversal(ctx)?
        .borrow()
        .active_container()
        .cloned()
        .ok_or_else(|| {
            RoutingError::Component(alia_routing::ComponentError::new(
                "no active container; this must run inside a dispatched traversal",
            ))
        })?;
    Ok(container)
}

pub(crate) fn event_traversal(ctx: &Context) -> Result<&RefCell<EventTraversal>, RoutingError> {
    ctx.get::<EventTraversalTag>().ok_or_else(|| {
        RoutingError::Component(alia_routing::ComponentError::new(
            "no active event traversal; this must run inside a dispatched traversal",
        ))
    })
}
