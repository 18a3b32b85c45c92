// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::collections::BTreeMap;

use alia_id::Id;

use crate::arena::NodeId;

/// One entry in a [`NamingMap`].
pub(crate) struct NamedEntry {
    pub(crate) block: NodeId,
    /// Set when the caller removes this entry explicitly (the `for_each`
    /// `on_removed` path) rather than by simply not visiting it on a
    /// refresh pass. Manually-deleted entries are destroyed immediately
    /// and never participate in GC bookkeeping.
    pub(crate) manual_delete: bool,
}

/// Outcome of a single `visit` call against a [`NamingMap`].
pub enum VisitOutcome {
    /// The name was already present; reuse its block.
    Found(NodeId),
    /// The name is new this traversal; the caller must allocate a block for
    /// it.
    NotFound,
}

/// The backing store for a data graph naming context ("naming map").
///
/// `entries` holds every name currently alive, independent of traversal
/// order. `predicted` records the order in which names were visited on the
/// *last refresh traversal* and is the yardstick non-refresh traversals are
/// checked against: a non-refresh traversal must visit exactly the sequence
/// of names the last refresh traversal established (a subsequence is fine —
/// entries can be conditionally skipped — but nothing may appear out of
/// order or unpredicted).
pub(crate) struct NamingMap {
    entries: BTreeMap<Id, NamedEntry>,
    predicted: Vec<Id>,
    /// Names visited so far in the traversal currently in progress. Reset at
    /// the start of every traversal via [`NamingMap::begin_traversal`].
    visited: Vec<Id>,
    /// Cursor into `predicted`, advanced as a non-refresh traversal consumes
    /// it in order.
    cursor: usize,
}

impl NamingMap {
    pub(crate) fn new() -> NamingMap {
        NamingMap {
            entries: BTreeMap::new(),
            predicted: Vec::new(),
            visited: Vec::new(),
            cursor: 0,
        }
    }

    pub(crate) fn begin_traversal(&mut self) {
        self.visited.clear();
        self.cursor = 0;
    }

    /// Looks up or reserves a name for this traversal, enforcing the
    /// ordering rules described on [`NamingMap`].
    ///
    /// - On a refresh traversal with GC enabled, any order is accepted; the
    /// visit is simply recorded so `predicted` can be rebuilt at
    /// `end_traversal`.
    /// - On a non-refresh traversal, or on a refresh traversal with GC
    /// disabled, `id` must equal `predicted[cursor]` (skipping ahead is
    /// fine — intervening predicted names are treated as conditionally
    /// absent this pass — but visiting a name *out of* its predicted
    /// relative order, or a name `predicted` never saw, is an
    /// [`crate::GraphError::OrderingViolation`]). Disabling GC only
    /// suppresses collection in `end_traversal`; it never relaxes this
    /// check.
    pub(crate) fn visit(
        &mut self,
        id: &Id,
        refreshing: bool,
        gc_enabled: bool,
    ) -> Result<VisitOutcome, crate::GraphError> {
        if !refreshing || !gc_enabled {
            match self.predicted[self.cursor..].iter().position(|p| p == id) {
                Some(offset) => self.cursor += offset + 1,
                None => {
                    return Err(crate::GraphError::OrderingViolation {
                            name: format!("{id:?}"),
                    })
                }
            }
        }
        self.visited.push(id.clone());
        match self.entries.get(id) {
            Some(entry) => Ok(VisitOutcome::Found(entry.block)),
            None => Ok(VisitOutcome::NotFound),
        }
    }

    pub(crate) fn insert(&mut self, id: Id, block: NodeId) {
        self.entries.insert(
            id,
            NamedEntry {
                block,
                manual_delete: false,
            },
        );
    }

    /// Explicitly deletes a name, bypassing GC. Returns the block to destroy,
    /// if the name existed.
    pub(crate) fn remove(&mut self, id: &Id) -> Option<NodeId> {
        self.entries.remove(id).map(|entry| entry.block)
    }

    /// Ends a traversal. On a refresh pass (`gc_enabled`), any entry that
    /// was not visited this pass is collected and returned for the caller to
    /// destroy, and `predicted` is rebuilt from this pass's actual order.
    /// With GC disabled, unvisited entries are left alone; disabling GC
    /// only suppresses collection, not the ordering check. `predicted` is
    /// still refreshed so that the *next* refresh traversal's divergence
    /// bookkeeping starts from a clean baseline.
    ///
    /// On a non-refresh pass this is a no-op beyond leaving `predicted`
    /// untouched: only a refresh traversal is allowed to redefine the
    /// expected order.
    pub(crate) fn end_traversal(&mut self, refreshing: bool, gc_enabled: bool) -> Vec<NodeId> {
        if !refreshing {
            return Vec::new();
        }
        let mut collected = Vec::new();
        if gc_enabled {
            let visited = &self.visited;
            let stale: Vec<Id> = self
            .entries
            .keys()
            .filter(|k| !visited.contains(k))
            .cloned()
            .collect();
            for id in stale {
                if let Some(entry) = self.entries.get(&id) {
                    if !entry.manual_delete {
                        if let Some(entry) = self.entries.remove(&id) {
                            collected.push(entry.block);
                        }
                    }
                }
            }
        }
        self.predicted = self.visited.clone();
        collected
    }

    pub(crate) fn into_entries(self) -> impl Iterator<Item = (Id, NamedEntry)> {
        self.entries.into_iter()
    }

    pub(crate) fn entry_blocks(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().map(|entry| entry.block)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
