// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).
use super::*;

#[test]
fn simple_ids_compare_by_value() {
    assert_eq!(simple_id(42), simple_id(42));
    assert_ne!(simple_id(42), simple_id(43));
    assert!(simple_id(1) < simple_id(2));
}

#[test]
fn simple_ids_of_different_types_never_match() {
    // `42i32` and `42i64` must never compare equal, even though their
    // `Debug` output looks identical.
    assert_ne!(simple_id(42i32), simple_id(42i64));
}

#[test]
fn clone_is_independent() {
    let original = simple_id(String::from("hello"));
    let cloned = original.clone();
    assert_eq!(original, cloned);
    drop(original);
    assert_eq!(cloned, simple_id(String::from("hello")));
}

#[test]
fn sentinels_are_stable_and_distinct() {
    assert_eq!(Id::Null, Id::Null);
    assert_eq!(Id::Unit, Id::Unit);
    assert_ne!(Id::Null, Id::Unit);
}

#[test]
fn by_address_tracks_storage_not_value() {
    let x = 1;
    let y = 1;
    // Same value, different storage: not equal.
    assert_ne!(Id::by_address(&x), Id::by_address(&y));
    assert_eq!(Id::by_address(&x), Id::by_address(&x));
}

#[test]
fn pair_ids_are_lexicographic() {
    let a = simple_id(1).paired_with(simple_id(2));
    let b = simple_id(1).paired_with(simple_id(3));
    let c = simple_id(2).paired_with(simple_id(0));
    assert!(a < b);
    assert!(b < c);
    assert_ne!(a, b);
}

#[test]
fn combine_ids_of_nothing_is_unit() {
    assert_eq!(combine_ids(std::iter::empty()), Id::Unit);
}

#[test]
fn combine_ids_of_one_is_that_id() {
    assert_eq!(combine_ids([simple_id(7)]), simple_id(7));
}

#[test]
fn ref_ids_are_transparent_to_equality() {
    let plain = simple_id(9);
    let shared = Id::Ref(Rc::new(simple_id(9)));
    assert_eq!(plain, shared);
    assert_eq!(shared.clone(), shared);
}

#[test]
fn ordering_is_a_strict_weak_order() {
    // Different concrete variants must still produce a *total* order so
    // that ids can be used as, e.g., BTreeMap keys inside the data graph.
    let mut ids = vec![
        Id::Unit,
        Id::Null,
        simple_id(3),
        simple_id(1),
        Id::by_address(&1),
        simple_id(1).paired_with(simple_id(0)),
    ];
    ids.sort();
    // Sorting must be idempotent and not panic; that's the property under
    // test (total, deterministic order), not a particular sequence.
    let resorted = {
        let mut copy: Vec<_> = ids.iter().map(|id| id.clone()).collect();
        copy.sort();
        copy
    };
    assert_eq!(ids.len(), resorted.len());
    for (a, b) in ids.iter().zip(resorted.iter()) {
        assert_eq!(a, b);
    }
}

#[test]
fn capture_matches_and_does_not_leak_borrows() {
    let mut captured = CapturedId::new();
    assert!(!captured.is_initialized());

    let id = simple_id(5);
    captured.capture(&id);
    assert!(captured.matches(&id));
    drop(id);
    // The id we compared against is gone; `captured` must own an
    // independent copy.
    assert!(captured.matches(&simple_id(5)));
}

#[test]
fn recapture_of_same_shape_reuses_allocation() {
    let mut captured = CapturedId::new();
    captured.capture(&simple_id(String::from("a")));
    let Some(Id::Simple(before)) = captured.get() else {
        panic!("expected a Simple id");
    };
    let before_ptr = std::ptr::addr_of!(**before);

    captured.capture(&simple_id(String::from("b")));
    assert!(captured.matches(&simple_id(String::from("b"))));
    let Some(Id::Simple(after)) = captured.get() else {
        panic!("expected a Simple id");
    };
    let after_ptr = std::ptr::addr_of!(**after);
    assert_eq!(before_ptr, after_ptr, "recapture should reuse the Box");
}

#[test]
fn capture_of_a_different_shape_replaces_the_value() {
    let mut captured = CapturedId::new();
    captured.capture(&simple_id(1i32));
    captured.capture(&Id::Unit);
    assert!(captured.matches(&Id::Unit));
}

#[test]
fn capturing_twice_with_the_same_id_leaves_it_equal() {
    let id = simple_id(("x", 1));
    let mut captured = CapturedId::new();
    captured.capture(&id);
    captured.capture(&id);
    assert!(captured.matches(&id));
}
