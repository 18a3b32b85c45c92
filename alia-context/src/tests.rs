// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).
use std::cell::RefCell;

use alia_graph::{DataGraph, Traversal};

use super::*;

struct CounterTag;
impl Tag for CounterTag {
    type Data = RefCell<i32>;
    const NAME: &'static str = "counter";
}

struct NameTag;
impl Tag for NameTag {
    type Data = String;
    const NAME: &'static str = "name";
}

fn root_context() -> Context {
    let graph = DataGraph::new();
    let root = graph.root();
    Context::new(graph, Traversal::begin(root, true))
}

#[test]
fn missing_tag_is_absent_and_reports_an_error() {
    let ctx = root_context();
    assert!(!ctx.has::<CounterTag>());
    assert!(ctx.get::<CounterTag>().is_none());
    let err = ctx.require::<CounterTag>().unwrap_err();
    assert_eq!(err.tag, "counter");
}

#[test]
fn extend_is_visible_only_on_the_returned_context() {
    let ctx = root_context();
    let extended = ctx.extend::<CounterTag>(RefCell::new(0));
    assert!(extended.has::<CounterTag>());
    assert!(!ctx.has::<CounterTag>(), "original context must be unaffected");
}

#[test]
fn extend_mutates_through_shared_ref_cell() {
    let ctx = root_context().extend::<CounterTag>(RefCell::new(10));
    *ctx.get::<CounterTag>().unwrap().borrow_mut() += 5;
    assert_eq!(*ctx.get::<CounterTag>().unwrap().borrow(), 15);
}

#[test]
fn nested_extensions_of_different_tags_both_resolve() {
    let ctx = root_context()
        .extend::<CounterTag>(RefCell::new(1))
        .extend::<NameTag>(String::from("widget"));
    assert_eq!(*ctx.get::<CounterTag>().unwrap().borrow(), 1);
    assert_eq!(ctx.get::<NameTag>().unwrap(), "widget");
}

#[test]
fn re_extending_the_same_tag_shadows_the_outer_value() {
    let outer = root_context().extend::<NameTag>(String::from("outer"));
    let inner = outer.extend::<NameTag>(String::from("inner"));
    assert_eq!(inner.get::<NameTag>().unwrap(), "inner");
    assert_eq!(outer.get::<NameTag>().unwrap(), "outer");
}

#[test]
fn clone_shares_the_same_graph_and_traversal() {
    let ctx = root_context();
    let clone = ctx.clone();
    assert!(Rc::ptr_eq(ctx.graph(), clone.graph()));
    assert!(Rc::ptr_eq(ctx.traversal(), clone.traversal()));
}
