// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Asynchronous operations reported back into the data graph, with
//! argument-id-keyed cancellation and typed error propagation.

use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_id::{simple_id, Id};
use alia_routing::{get_component, mark_dirty_component, ComponentHandle, RoutingError};
use alia_signals::{Capability, ReadTier, Readable, Signal, SignalError, WriteTier};

enum Status<R> {
    Idle,
    Loading,
    Ready(R),
    Failed(SignalError),
}

struct RequestState<R> {
    status: Status<R>,
    version: u64,
    launch_id: Id,
}

/// A live handle to an asynchronous operation's persistent state, handed
/// to the launching closure so it can report a result or failure back
/// whenever the operation actually completes — possibly well after the
/// launching refresh pass has returned.
///
/// Not `Send`: the data graph it closes over is `Rc`-based and
/// single-threaded. A host whose async work runs on another
/// thread must hop back onto the UI thread, e.g. via
/// [`crate::ExternalInterface::schedule_asynchronous_update`], before
/// calling any of these methods.
pub struct AsyncReporter<R> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    container: ComponentHandle,
    launch_version: u64,
    _marker: std::marker::PhantomData<R>,
}

impl<R: 'static> AsyncReporter<R> {
    /// Reports a successful result, unless a newer launch has since
    /// superseded this one — an implicit cancellation via argument-id
    /// change.
    pub fn report_ready(&self, value: R) {
        let mut graph = self.graph.borrow_mut();
        let state = graph.get_mut::<RequestState<R>>(self.node);
        if state.version != self.launch_version {
            return;
        }
        state.status = Status::Ready(value);
        drop(graph);
        mark_dirty_component(&self.container);
    }

    /// Reports a failure. Stays visible through [`AsyncResult::error`]
    /// until the launch arguments change again.
    pub fn report_failed(&self, error: SignalError) {
        let mut graph = self.graph.borrow_mut();
        let state = graph.get_mut::<RequestState<R>>(self.node);
        if state.version != self.launch_version {
            return;
        }
        state.status = Status::Failed(error);
        drop(graph);
        mark_dirty_component(&self.container);
    }
}

/// Reads an asynchronous operation's current outcome.
pub struct AsyncResult<R> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    _marker: std::marker::PhantomData<R>,
}

/// (Re)launches an asynchronous operation whenever `args_id` changes from
/// the id it was last launched with, and exposes its current outcome as
/// a signal. `launch` receives an [`AsyncReporter`] to call
/// back whenever the operation actually finishes; it may do so
/// synchronously (as tests do) or hand the reporter off to another thread
/// through [`crate::ExternalInterface::schedule_asynchronous_update`].
pub fn async_request<R: Clone + 'static>(
    ctx: &Context,
    parent: &ComponentHandle,
    args_id: Id,
    launch: impl FnOnce(AsyncReporter<R>),
) -> Result<AsyncResult<R>, RoutingError> {
    let container = get_component(ctx, parent)?;
    let node = {
        let mut graph = ctx.graph().borrow_mut();
        let mut traversal = ctx.traversal().borrow_mut();
        let (node, _) = graph
        .get_or_create_node(&mut traversal, || RequestState::<R> {
                status: Status::Idle,
                version: 0,
                launch_id: Id::Null,
        })
        .expect("async_request() data node reused as a different kind of node");
        node
    };

    let graph_rc = ctx.graph().clone();
    let launch_version = {
        let mut graph = graph_rc.borrow_mut();
        let state = graph.get_mut::<RequestState<R>>(node);
        if state.launch_id == args_id {
            None
        } else {
            state.launch_id = args_id;
            state.version += 1;
            state.status = Status::Loading;
            Some(state.version)
        }
    };

    if let Some(launch_version) = launch_version {
        let reporter = AsyncReporter {
            graph: graph_rc.clone(),
            node,
            container,
            launch_version,
            _marker: std::marker::PhantomData,
        };
        launch(reporter);
    }

    Ok(AsyncResult {
            graph: graph_rc,
            node,
            _marker: std::marker::PhantomData,
    })
}

impl<R: Clone + 'static> Signal<R> for AsyncResult<R> {
    fn has_value(&self) -> bool {
        matches!(self.graph.borrow().get::<RequestState<R>>(self.node).status, Status::Ready(_))
    }
    fn value_id(&self) -> Id {
        simple_id(self.graph.borrow().get::<RequestState<R>>(self.node).version)
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
    fn is_invalidated(&self) -> bool {
        matches!(self.graph.borrow().get::<RequestState<R>>(self.node).status, Status::Failed(_))
    }
}

impl<R: Clone + 'static> Readable<R> for AsyncResult<R> {
    fn read(&self) -> Cow<'_, R> {
        let graph = self.graph.borrow();
        match &graph.get::<RequestState<R>>(self.node).status {
            Status::Ready(value) => Cow::Owned(value.clone()),
            _ => panic!("read() called on an async_request() signal with has_value() == false"),
        }
    }
}

impl<R: 'static> AsyncResult<R> {
    /// The error a failed launch reported, if the request is currently in
    /// a failed state. Cleared automatically the next time `args_id`
    /// changes, since that relaunches into `Loading`.
    pub fn error(&self) -> Option<SignalError> {
        match &self.graph.borrow().get::<RequestState<R>>(self.node).status {
            Status::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.graph.borrow().get::<RequestState<R>>(self.node).status, Status::Loading)
    }
}
