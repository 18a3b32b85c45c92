// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Identity-preserving persistent storage keyed by traversal position.
//!
//! This crate is alia's data graph: an arena of value,
//! block, and naming-map nodes addressed by stable [`NodeId`] indices, plus
//! a [`Traversal`] type for walking it in a way that hands each positional
//! or named call site back the same node it got last time, and garbage
//! collects named blocks that a refresh traversal no longer visits.
//!
//! It deliberately has no knowledge of signals, actions, or components —
//! those live in sibling crates and are built on top of the primitives
//! exported here.

use std::fmt;

mod arena;
mod block;
mod naming;
mod traversal;

#[cfg(test)]
mod tests;

pub use arena::{DataGraph, NodeId};
pub use naming::VisitOutcome;
pub use traversal::{GcStats, ScopeGuard, Traversal};

/// Failure modes for data graph operations.
///
/// Neither variant is recoverable mid-traversal: both indicate that the
/// caller's control flow disagreed with the graph's expectations (a
/// positional call site asked for a different node kind than last time, or a
/// naming context was walked in an order its last refresh traversal didn't
/// predict). alia's system loop catches these at the top of
/// a traversal and reports them through its error-isolation path rather
/// than letting them unwind arbitrarily far.
#[derive(Debug)]
pub enum GraphError {
    /// A call site requested a node of one kind (value, block, naming map)
    /// at a position that already held a node of a different kind.
    TypeMismatch { node: NodeId },
    /// A named block was visited in an order its naming map's last refresh
    /// traversal did not predict.
    OrderingViolation { name: String },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::TypeMismatch { node } => {
                write!(f, "data graph node {node:?} was reused as a different kind of node")
            }
            GraphError::OrderingViolation { name } => {
                write!(
                    f,
                    "named block {name} was visited out of the order its last refresh traversal predicted"
                )
            }
        }
    }
}

impl std::error::Error for GraphError {}
