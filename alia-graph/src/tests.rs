// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).
use alia_id::simple_id;

use super::*;

fn named_pass<T>(
    graph: &mut DataGraph,
    map: NodeId,
    refreshing: bool,
    names: &[&str],
    mut on_new: impl FnMut(&mut DataGraph, &str) -> T,
) -> Result<Vec<NodeId>, GraphError> {
    let mut traversal = Traversal::begin(graph.root(), refreshing);
    graph.begin_naming_traversal(map);
    let mut visited = Vec::new();
    for name in names {
        let id = simple_id(name.to_string());
        match graph.visit_name(map, &id, &traversal)? {
            VisitOutcome::Found(block) => visited.push(block),
            VisitOutcome::NotFound => {
                let block = graph.alloc_named_block();
                on_new(graph, name);
                graph.bind_name(map, id, block);
                visited.push(block);
            }
        }
    }
    graph.end_naming_traversal(map, &mut traversal);
    Ok(visited)
}

#[test]
fn persistent_node_keeps_identity_across_passes() {
    let mut graph = DataGraph::new();
    let root = graph.root();

    let mut first = Traversal::begin(root, true);
    let (id_a, created_a) = graph.get_or_create_node(&mut first, || 42i32).unwrap();
    assert!(created_a);

    let mut second = Traversal::begin(root, false);
    let (id_b, created_b) = graph.get_or_create_node(&mut second, || 0i32).unwrap();
    assert!(!created_b);
    assert_eq!(id_a, id_b);
    assert_eq!(*graph.get::<i32>(id_b), 42);
}

#[test]
fn cached_node_recomputes_only_after_clear() {
    let mut graph = DataGraph::new();
    let root = graph.root();

    let mut t1 = Traversal::begin(root, true);
    let (id, computed1) = graph.get_or_create_cached(&mut t1, || 1i32).unwrap();
    assert!(computed1);

    let mut t2 = Traversal::begin(root, true);
    let (id2, computed2) = graph.get_or_create_cached(&mut t2, || 2i32).unwrap();
    assert_eq!(id, id2);
    assert!(!computed2);
    assert_eq!(*graph.get::<i32>(id2), 1);

    graph.clear_cache_recursive(root);
    let mut t3 = Traversal::begin(root, true);
    let (id3, computed3) = graph.get_or_create_cached(&mut t3, || 3i32).unwrap();
    assert_eq!(id, id3);
    assert!(computed3);
    assert_eq!(*graph.get::<i32>(id3), 3);
}

#[test]
fn type_mismatch_at_a_position_is_an_error() {
    let mut graph = DataGraph::new();
    let root = graph.root();

    let mut t1 = Traversal::begin(root, true);
    graph.get_or_create_node(&mut t1, || 1i32).unwrap();

    let mut t2 = Traversal::begin(root, false);
    let err = graph.get_or_create_block(&mut t2).unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));
}

#[test]
fn named_blocks_are_reused_by_name_not_position() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    let first = named_pass(&mut graph, map, true, &["a", "b", "c"], |_, _| ()).unwrap();
    // Reordered on a refresh pass: tolerated, same blocks reused by name.
    let second = named_pass(&mut graph, map, true, &["c", "a", "b"], |_, _| ()).unwrap();

    assert_eq!(first[0], second[1]); // "a"
    assert_eq!(first[1], second[2]); // "b"
    assert_eq!(first[2], second[0]); // "c"
}

#[test]
fn unvisited_named_blocks_are_collected_on_refresh() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    named_pass(&mut graph, map, true, &["a", "b"], |_, _| ()).unwrap();
    let before = graph.len();

    named_pass(&mut graph, map, true, &["a"], |_, _| ()).unwrap();
    let after = graph.len();

    // "b"'s block should have been destroyed.
    assert!(after < before);
}

#[test]
fn gc_disabled_keeps_unvisited_entries_alive() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    named_pass(&mut graph, map, true, &["a", "b"], |_, _| ()).unwrap();
    let before = graph.len();

    // A refresh pass that only visits "a", but with GC disabled.
    let mut traversal = Traversal::begin(root, true);
    traversal.with_gc_disabled(|traversal| {
        graph.begin_naming_traversal(map);
        let id = simple_id("a".to_string());
        match graph.visit_name(map, &id, traversal).unwrap() {
            VisitOutcome::Found(_) => {}
            VisitOutcome::NotFound => panic!("expected \"a\" to already exist"),
        }
        graph.end_naming_traversal(map, traversal);
    });

    assert_eq!(graph.len(), before, "GC disabled must not destroy \"b\"");
}

#[test]
fn gc_disabled_still_rejects_reordering_on_a_refresh_pass() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    named_pass(&mut graph, map, true, &["a", "b"], |_, _| ()).unwrap();

    // A refresh pass with GC disabled that visits "b" before "a" still
    // violates the predicted order: disabling GC only suppresses
    // collection, it doesn't relax the ordering contract.
    let mut traversal = Traversal::begin(root, true);
    let err = traversal.with_gc_disabled(|traversal| -> Result<(), GraphError> {
        graph.begin_naming_traversal(map);
        graph.visit_name(map, &simple_id("b".to_string()), traversal)?;
        graph.visit_name(map, &simple_id("a".to_string()), traversal)?;
        graph.end_naming_traversal(map, traversal);
        Ok(())
    });
    assert!(matches!(err, Err(GraphError::OrderingViolation { .. })));
}

#[test]
fn non_refresh_pass_out_of_predicted_order_is_a_violation() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    named_pass(&mut graph, map, true, &["a", "b"], |_, _| ()).unwrap();

    // A non-refresh pass visiting "b" before "a" violates the predicted
    // order even though both names are known.
    let err = named_pass(&mut graph, map, false, &["b", "a"], |_, _| ());
    assert!(matches!(err, Err(GraphError::OrderingViolation { .. })));
}

#[test]
fn non_refresh_pass_may_skip_predicted_entries() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    named_pass(&mut graph, map, true, &["a", "b", "c"], |_, _| ()).unwrap();

    // Skipping "b" (e.g. a conditionally-hidden item) is fine as long as
    // relative order among visited names is preserved.
    let result = named_pass(&mut graph, map, false, &["a", "c"], |_, _| ());
    assert!(result.is_ok());
}

#[test]
fn destruction_order_is_reverse_of_insertion() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let log = Rc::new(RefCell::new(Vec::new()));

    struct Logger(Rc<RefCell<Vec<i32>>>, i32);
    impl Drop for Logger {
        fn drop(&mut self) {
            self.0.borrow_mut().push(self.1);
        }
    }

    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut traversal = Traversal::begin(root, true);
    let block = graph.get_or_create_block(&mut traversal).unwrap();
    let mut scope = traversal.enter_block(block);
    graph
        .get_or_create_node(&mut scope, || Logger(log.clone(), 1))
        .unwrap();
    graph
        .get_or_create_node(&mut scope, || Logger(log.clone(), 2))
        .unwrap();
    graph
        .get_or_create_node(&mut scope, || Logger(log.clone(), 3))
        .unwrap();
    scope.end();

    graph.destroy(block);
    assert_eq!(*log.borrow(), vec![3, 2, 1]);
}

#[test]
fn manual_delete_bypasses_gc_bookkeeping() {
    let mut graph = DataGraph::new();
    let root = graph.root();
    let mut t0 = Traversal::begin(root, true);
    let map = graph.get_or_create_naming_map(&mut t0).unwrap();

    named_pass(&mut graph, map, true, &["a"], |_, _| ()).unwrap();
    let id = simple_id("a".to_string());
    graph.remove_name(map, &id);

    let mut traversal = Traversal::begin(root, true);
    graph.begin_naming_traversal(map);
    match graph.visit_name(map, &id, &traversal).unwrap() {
        VisitOutcome::NotFound => {}
        VisitOutcome::Found(_) => panic!("manually removed name should not be found"),
    }
    graph.end_naming_traversal(map, &mut traversal);
}
