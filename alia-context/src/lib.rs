// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The value-typed context threaded through a traversal.
//!
//! Every other subsystem above this one in the workspace (signals, actions,
//! routing, timers, the system loop) reaches the data graph and each other
//! through a [`Context`] rather than through free-standing globals. The two
//! tags every traversal needs — the data graph itself and its traversal
//! cursor — are dedicated fields for zero-cost retrieval, since this crate
//! already depends on `alia-graph`. Everything else (the system object, the
//! event-routing tree, the timing subsystem, user-defined object-tree
//! adaptors) is layered on through [`Context::extend`], since those types
//! live in crates that depend on this one and so cannot be named here.
//!
//! A context is cheap to clone: cloning shares the same data graph and
//! traversal handle and copies the (small, `Rc`-backed) chain of
//! extensions, exactly like copying a pointer.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use alia_graph::{DataGraph, Traversal};

mod tag;

pub use tag::Tag;

struct ExtensionNode {
    type_id: TypeId,
    value: Rc<dyn Any>,
    parent: Option<Rc<ExtensionNode>>,
}

/// The heterogeneous bag of subsystem references passed through a
/// traversal. See the module documentation for the split between the two
/// built-in tags and the dynamic extension chain.
#[derive(Clone)]
pub struct Context {
    graph: Rc<RefCell<DataGraph>>,
    traversal: Rc<RefCell<Traversal>>,
    extensions: Option<Rc<ExtensionNode>>,
}

/// Raised by [`Context::require`] when a tag a caller depends on was never
/// added to this context.
#[derive(Debug)]
pub struct MissingTag {
    pub tag: &'static str,
}

impl fmt::Display for MissingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context has no component registered for tag `{}`", self.tag)
    }
}

impl std::error::Error for MissingTag {}

impl Context {
    /// Builds a root context around a freshly-owned data graph and
    /// traversal. The system loop calls this once per dispatch; nested
    /// scopes extend and narrow the result, never construct a new root.
    pub fn new(graph: DataGraph, traversal: Traversal) -> Context {
        Context {
            graph: Rc::new(RefCell::new(graph)),
            traversal: Rc::new(RefCell::new(traversal)),
            extensions: None,
        }
    }

    pub fn graph(&self) -> &Rc<RefCell<DataGraph>> {
        &self.graph
    }

    pub fn traversal(&self) -> &Rc<RefCell<Traversal>> {
        &self.traversal
    }

    /// Returns a new context with `T::Data` visible under tag `T`, shadowing
    /// any previous value registered for the same tag. The receiver is
    /// unaffected: sibling branches that still hold the narrower context
    /// never observe the extension.
    pub fn extend<T: Tag>(&self, data: T::Data) -> Context {
        Context {
            graph: self.graph.clone(),
            traversal: self.traversal.clone(),
            extensions: Some(Rc::new(ExtensionNode {
                type_id: TypeId::of::<T>(),
                value: Rc::new(data),
                parent: self.extensions.clone(),
            })),
        }
    }

    fn find(&self, type_id: TypeId) -> Option<&Rc<dyn Any>> {
        let mut node = self.extensions.as_ref();
        while let Some(n) = node {
            if n.type_id == type_id {
                return Some(&n.value);
            }
            node = n.parent.as_ref();
        }
        None
    }

    /// True iff a value for tag `T` was added somewhere along this
    /// context's extension chain.
    pub fn has<T: Tag>(&self) -> bool {
        self.find(TypeId::of::<T>()).is_some()
    }

    /// The dynamically-checked retrieval: `Some` if `T` was added, `None`
    /// otherwise.
    pub fn get<T: Tag>(&self) -> Option<&T::Data> {
        self.find(TypeId::of::<T>())
            .map(|value| value.downcast_ref::<T::Data>().expect("tag/value type mismatch"))
    }

    /// Like [`Context::get`] but reports a [`MissingTag`] fault instead of
    /// `None`, for call sites that treat an absent tag as an error rather
    /// than an optional feature.
    pub fn require<T: Tag>(&self) -> Result<&T::Data, MissingTag> {
        self.get::<T>().ok_or(MissingTag { tag: T::NAME })
    }
}

#[cfg(test)]
mod tests;
