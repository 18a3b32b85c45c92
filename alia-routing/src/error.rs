// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;
use std::rc::Rc;

use alia_graph::GraphError;

/// Failure modes surfaced by this crate's graph operations, plus the typed
/// control transfer used to implement `abort_traversal`. `Aborted` isn't a
/// user-visible error: [`crate::abort_traversal`] returns one so a
/// non-refresh event handler
/// can short-circuit the rest of the traversal by propagating it with
/// `?`; the dispatch layer (`alia-system`) recognizes this variant and
/// stops the traversal cleanly rather than treating it as a fault.
#[derive(Clone, Debug)]
pub enum RoutingError {
    Aborted,
    Graph(GraphErrorInfo),
    Component(ComponentError),
}

/// A cloned, displayable copy of a [`GraphError`] (which isn't `Clone`
/// itself, owning a `String`/`NodeId` it doesn't need to share).
#[derive(Clone, Debug)]
pub struct GraphErrorInfo {
    message: Rc<str>,
}

impl From<GraphError> for RoutingError {
    fn from(err: GraphError) -> RoutingError {
        RoutingError::Graph(GraphErrorInfo {
                message: Rc::from(err.to_string()),
        })
    }
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::Aborted => write!(f, "traversal aborted"),
            RoutingError::Graph(info) => write!(f, "{}", info.message),
            RoutingError::Component(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for RoutingError {}

/// A component-local exception captured by a `try_` block during refresh
/// or by [`crate::invoke_pure_component`] when its body
/// fails. Re-raised on subsequent skipped refresh passes until the
/// component's inputs change.
#[derive(Clone, Debug)]
pub struct ComponentError {
    message: Rc<str>,
}

impl ComponentError {
    pub fn new(message: impl Into<String>) -> ComponentError {
        ComponentError {
            message: Rc::from(message.into()),
        }
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ComponentError {}
