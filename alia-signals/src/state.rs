// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Component-local persistent state (`get_state`,
//! `get_transient_state`).

use std::borrow::Cow;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_id::Id;

use crate::capability::{Capability, ReadTier, WriteTier};
use crate::error::SignalError;
use crate::signal::{Readable, Signal, Writable};

struct Cell<T> {
    value: T,
    version: u64,
}

/// A duplex signal over a call-site-persistent value. `value_id` advances by
/// one on every write, so it's always distinguishable from the value a
/// previous frame captured (`get_state`).
pub struct State<T> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    _marker: PhantomData<T>,
}

pub fn get_state<T: 'static>(ctx: &Context, initial: impl FnOnce() -> T) -> State<T> {
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _created) = graph
        .get_or_create_node(&mut traversal, || Cell {
                value: initial(),
                version: 0u64,
        })
        .expect("get_state() data node reused as a different kind of node");
        node
    };
    State {
        graph: ctx.graph().clone(),
        node,
        _marker: PhantomData,
    }
}

impl<T: 'static> Signal<T> for State<T> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        alia_id::simple_id(self.graph.borrow().get::<Cell<T>>(self.node).version)
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<T: Clone + 'static> Readable<T> for State<T> {
    fn read(&self) -> Cow<'_, T> {
        Cow::Owned(self.graph.borrow().get::<Cell<T>>(self.node).value.clone())
    }
}

impl<T: 'static> Writable<T> for State<T> {
    fn ready_to_write(&self) -> bool {
        true
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        let mut graph = self.graph.borrow_mut();
        let cell = graph.get_mut::<Cell<T>>(self.node);
        cell.value = value;
        cell.version += 1;
        Ok(())
    }
}

/// The cached-node counterpart of [`get_state`]: identical read/write
/// semantics, but the underlying node is reclaimed when its subtree's cache
/// is cleared rather than being kept forever.
pub struct TransientState<T> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    _marker: PhantomData<T>,
}

pub fn get_transient_state<T: 'static>(ctx: &Context, initial: impl FnOnce() -> T) -> TransientState<T> {
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _recomputed) = graph
        .get_or_create_cached(&mut traversal, || Cell {
                value: initial(),
                version: 0u64,
        })
        .expect("get_transient_state() data node reused as a different kind of node");
        node
    };
    TransientState {
        graph: ctx.graph().clone(),
        node,
        _marker: PhantomData,
    }
}

impl<T: 'static> Signal<T> for TransientState<T> {
    fn has_value(&self) -> bool {
        true
    }
    fn value_id(&self) -> Id {
        alia_id::simple_id(self.graph.borrow().get::<Cell<T>>(self.node).version)
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<T: Clone + 'static> Readable<T> for TransientState<T> {
    fn read(&self) -> Cow<'_, T> {
        Cow::Owned(self.graph.borrow().get::<Cell<T>>(self.node).value.clone())
    }
}

impl<T: 'static> Writable<T> for TransientState<T> {
    fn ready_to_write(&self) -> bool {
        true
    }
    fn write(&mut self, value: T) -> Result<(), SignalError> {
        let mut graph = self.graph.borrow_mut();
        let cell = graph.get_mut::<Cell<T>>(self.node);
        cell.value = value;
        cell.version += 1;
        Ok(())
    }
}
