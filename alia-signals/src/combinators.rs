// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! `lazy_apply`, `apply`, `duplex_apply`, and `lazy_duplex_apply`, for one-
//! and two-argument functions. Higher arities follow the same shape and are
//! omitted rather than silently papered over with a macro that would
//! obscure the pattern; see DESIGN.md.

use std::borrow::Cow;
use std::marker::PhantomData;
use std::rc::Rc;
use std::cell::RefCell;

use alia_context::Context;
use alia_graph::{DataGraph, NodeId};
use alia_id::Id;

use crate::capability::{Capability, ReadTier, WriteTier};
use crate::error::SignalError;
use crate::signal::{Readable, Signal, Writable};

/// The memoized state behind [`apply1`]/[`apply2`]/[`duplex_apply1`]: the
/// argument id(s) the last computation used, and its outcome. Storing the
/// id alongside the value (rather than relying on the data graph's own
/// "was this cache slot just (re)computed" flag) is what lets memoization
/// be keyed on argument value ids across many frames, not just across a
/// single cache-clear cycle.
struct Memo<R> {
    id: Id,
    value: Result<R, SignalError>,
}

/// Evaluates `f` against `arg`'s current value on every read; no caching.
pub struct LazyApply1<X, R, A, F> {
    arg: A,
    f: F,
    _marker: PhantomData<fn(X) -> R>,
}

pub fn lazy_apply1<X, R, A, F>(arg: A, f: F) -> LazyApply1<X, R, A, F>
where
    A: Readable<X>,
    F: Fn(&X) -> R,
    X: Clone,
{
    LazyApply1 {
        arg,
        f,
        _marker: PhantomData,
    }
}

impl<X: Clone, R, A: Readable<X>, F: Fn(&X) -> R> Signal<R> for LazyApply1<X, R, A, F> {
    fn has_value(&self) -> bool {
        self.arg.has_value()
    }
    fn value_id(&self) -> Id {
        self.arg.value_id()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<X: Clone, R: Clone, A: Readable<X>, F: Fn(&X) -> R> Readable<R> for LazyApply1<X, R, A, F> {
    fn read(&self) -> Cow<'_, R> {
        Cow::Owned((self.f)(self.arg.read().as_ref()))
    }
}

/// Two-argument counterpart of [`lazy_apply1`].
pub struct LazyApply2<X, Y, R, A, B, F> {
    a: A,
    b: B,
    f: F,
    _marker: PhantomData<fn(X, Y) -> R>,
}

pub fn lazy_apply2<X, Y, R, A, B, F>(a: A, b: B, f: F) -> LazyApply2<X, Y, R, A, B, F>
where
    A: Readable<X>,
    B: Readable<Y>,
    F: Fn(&X, &Y) -> R,
    X: Clone,
    Y: Clone,
{
    LazyApply2 {
        a,
        b,
        f,
        _marker: PhantomData,
    }
}

impl<X: Clone, Y: Clone, R, A: Readable<X>, B: Readable<Y>, F: Fn(&X, &Y) -> R> Signal<R>
    for LazyApply2<X, Y, R, A, B, F>
{
    fn has_value(&self) -> bool {
        self.a.has_value() && self.b.has_value()
    }
    fn value_id(&self) -> Id {
        self.a.value_id().paired_with(self.b.value_id())
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
}

impl<X: Clone, Y: Clone, R: Clone, A: Readable<X>, B: Readable<Y>, F: Fn(&X, &Y) -> R> Readable<R>
    for LazyApply2<X, Y, R, A, B, F>
{
    fn read(&self) -> Cow<'_, R> {
        Cow::Owned((self.f)(self.a.read().as_ref(), self.b.read().as_ref()))
    }
}

fn compute_memo1<X, R>(has_value: bool, value_id: &Id, value: &X, f: &impl Fn(&X) -> R) -> Memo<R> {
    if has_value {
        Memo {
            id: value_id.clone(),
            value: Ok(f(value)),
        }
    } else {
        Memo {
            id: Id::Null,
            value: Err(SignalError::new("argument has no value")),
        }
    }
}

fn memoize<R: 'static>(
    graph_rc: &Rc<RefCell<DataGraph>>,
    traversal_rc: &Rc<RefCell<alia_graph::Traversal>>,
    current_id: &Id,
    recompute: impl Fn() -> Memo<R>,
) -> NodeId {
    let mut graph = graph_rc.borrow_mut();
    let mut traversal = traversal_rc.borrow_mut();
    let (node, just_created) = graph
        .get_or_create_cached(&mut traversal, &recompute)
        .expect("apply() data node reused as a different kind of node");
    if !just_created && &graph.get::<Memo<R>>(node).id != current_id {
        *graph.get_mut::<Memo<R>>(node) = recompute();
    }
    node
}

/// Eager, memoized application of `f` to `arg`'s value, cached in a data
/// node keyed by `arg`'s value id (`apply`).
pub struct Apply1<R> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    _marker: PhantomData<R>,
}

pub fn apply1<X, R, A, F>(ctx: &Context, arg: &A, f: F) -> Apply1<R>
where
    X: Clone,
    R: Clone + 'static,
    A: Readable<X>,
    F: Fn(&X) -> R,
{
    let current_id = if arg.has_value() { arg.value_id() } else { Id::Null };
    let recompute = || {
        if arg.has_value() {
            compute_memo1(true, &current_id, arg.read().as_ref(), &f)
        } else {
            Memo {
                id: Id::Null,
                value: Err(SignalError::new("argument has no value")),
            }
        }
    };
    let node = memoize(ctx.graph(), ctx.traversal(), &current_id, recompute);
    Apply1 {
        graph: ctx.graph().clone(),
        node,
        _marker: PhantomData,
    }
}

impl<R: 'static> Signal<R> for Apply1<R> {
    fn has_value(&self) -> bool {
        self.graph.borrow().get::<Memo<R>>(self.node).value.is_ok()
    }
    fn value_id(&self) -> Id {
        self.graph.borrow().get::<Memo<R>>(self.node).id.clone()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Unwritable)
    }
    fn is_invalidated(&self) -> bool {
        self.graph.borrow().get::<Memo<R>>(self.node).value.is_err()
    }
}

impl<R: Clone + 'static> Readable<R> for Apply1<R> {
    fn read(&self) -> Cow<'_, R> {
        let graph = self.graph.borrow();
        let memo = graph.get::<Memo<R>>(self.node);
        Cow::Owned(
            memo.value
            .clone()
            .expect("read() called on an apply() signal with has_value() == false"),
        )
    }
}

/// A duplex signal pairing a cached forward mapping with a reverse
/// mapping applied immediately on write (`duplex_apply`).
/// `arg`'s value is never mutated directly; instead `reverse(new_output)`
/// computes the argument value to write back through `arg`.
pub struct DuplexApply1<X, A, F, G> {
    graph: Rc<RefCell<DataGraph>>,
    node: NodeId,
    arg: RefCell<A>,
    forward: F,
    reverse: G,
    _marker: PhantomData<X>,
}

pub fn duplex_apply1<X, R, A, F, G>(
    ctx: &Context,
    arg: A,
    forward: F,
    reverse: G,
) -> DuplexApply1<X, A, F, G>
where
    X: Clone,
    R: Clone + 'static,
    A: Readable<X> + Writable<X>,
    F: Fn(&X) -> R,
    G: Fn(&R) -> X,
{
    let current_id = if arg.has_value() { arg.value_id() } else { Id::Null };
    let recompute = || compute_memo1(arg.has_value(), &current_id, arg.read().as_ref(), &forward);
    let node = memoize::<R>(ctx.graph(), ctx.traversal(), &current_id, recompute);
    DuplexApply1 {
        graph: ctx.graph().clone(),
        node,
        arg: RefCell::new(arg),
        forward,
        reverse,
        _marker: PhantomData,
    }
}

impl<X, R: 'static, A: Readable<X>, F, G> Signal<R> for DuplexApply1<X, A, F, G>
where
    F: Fn(&X) -> R,
{
    fn has_value(&self) -> bool {
        self.graph.borrow().get::<Memo<R>>(self.node).value.is_ok()
    }
    fn value_id(&self) -> Id {
        self.graph.borrow().get::<Memo<R>>(self.node).id.clone()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<X, R: Clone + 'static, A: Readable<X>, F: Fn(&X) -> R, G> Readable<R>
    for DuplexApply1<X, A, F, G>
{
    fn read(&self) -> Cow<'_, R> {
        let graph = self.graph.borrow();
        let memo = graph.get::<Memo<R>>(self.node);
        Cow::Owned(
            memo.value
            .clone()
            .expect("read() called on a duplex_apply() signal with has_value() == false"),
        )
    }
}

impl<X: Clone, R: 'static, A: Readable<X> + Writable<X>, F: Fn(&X) -> R, G: Fn(&R) -> X>
    Writable<R> for DuplexApply1<X, A, F, G>
{
    fn ready_to_write(&self) -> bool {
        self.arg.borrow().ready_to_write()
    }
    fn write(&mut self, value: R) -> Result<(), SignalError> {
        let arg_value = (self.reverse)(&value);
        self.arg.get_mut().write(arg_value)
    }
}

/// The uncached counterpart of [`duplex_apply1`]: both `forward` and
/// `reverse` are evaluated on every call rather than memoized in the data
/// graph (`lazy_duplex_apply`).
pub struct LazyDuplexApply1<X, R, A, F, G> {
    arg: A,
    forward: F,
    reverse: G,
    _marker: PhantomData<fn(X) -> R>,
}

pub fn lazy_duplex_apply1<X, R, A, F, G>(arg: A, forward: F, reverse: G) -> LazyDuplexApply1<X, R, A, F, G>
where
    A: Readable<X> + Writable<X>,
    F: Fn(&X) -> R,
    G: Fn(&R) -> X,
{
    LazyDuplexApply1 {
        arg,
        forward,
        reverse,
        _marker: PhantomData,
    }
}

impl<X: Clone, R, A: Readable<X>, F: Fn(&X) -> R, G> Signal<R> for LazyDuplexApply1<X, R, A, F, G> {
    fn has_value(&self) -> bool {
        self.arg.has_value()
    }
    fn value_id(&self) -> Id {
        self.arg.value_id()
    }
    fn capability(&self) -> Capability {
        Capability::new(ReadTier::Readable, WriteTier::Writable)
    }
}

impl<X: Clone, R: Clone, A: Readable<X>, F: Fn(&X) -> R, G> Readable<R>
    for LazyDuplexApply1<X, R, A, F, G>
{
    fn read(&self) -> Cow<'_, R> {
        Cow::Owned((self.forward)(self.arg.read().as_ref()))
    }
}

impl<X: Clone, R, A: Readable<X> + Writable<X>, F: Fn(&X) -> R, G: Fn(&R) -> X> Writable<R>
    for LazyDuplexApply1<X, R, A, F, G>
{
    fn ready_to_write(&self) -> bool {
        self.arg.ready_to_write()
    }
    fn write(&mut self, value: R) -> Result<(), SignalError> {
        let arg_value = (self.reverse)(&value);
        self.arg.write(arg_value)
    }
}
