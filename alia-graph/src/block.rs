// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::any::Any;

use alia_id::Id;

use crate::arena::{DataGraph, Slot, ValueCell};
use crate::naming::{NamingMap, VisitOutcome};
use crate::traversal::Traversal;
use crate::{GraphError, NodeId};

/// Data-block-scoped operations: getting or creating the next positional
/// value/block/naming-map node, and entering/leaving a named child block.
///
/// Positional addressing: within a block, the Nth call in traversal order
/// always addresses the Nth child node, regardless of what kind of node
/// previous traversals placed there — as long as the caller is consistent
/// about what kind of node it asks for at that position.
impl DataGraph {
    fn next_child(&mut self, traversal: &mut Traversal) -> Option<NodeId> {
        let block = traversal.active_block();
        let index = traversal.next_index();
        let existing = self.block(block).get(index).copied();
        traversal.advance();
        existing
    }

    fn push_child(&mut self, traversal: &Traversal, child: NodeId) {
        let block = traversal.active_block();
        self.block_mut(block).push(child);
    }

    /// Retrieves the persistent data node at the current traversal position,
    /// creating it via `init` on first visit. Returns the node id and
    /// whether this call created it.
    pub fn get_or_create_node<T: 'static>(
        &mut self,
        traversal: &mut Traversal,
        init: impl FnOnce() -> T,
    ) -> Result<(NodeId, bool), GraphError> {
        if let Some(id) = self.next_child(traversal) {
            match self.slot(id) {
                Slot::Value(ValueCell::Persistent(_)) => return Ok((id, false)),
                _ => return Err(GraphError::TypeMismatch { node: id }),
            }
        }
        let id = self.alloc(Slot::Value(ValueCell::Persistent(Box::new(init()))));
        self.push_child(traversal, id);
        Ok((id, true))
    }

    /// Retrieves the cached data node at the current traversal position. The
    /// returned bool is true iff the value was just (re)computed, whether
    /// because this is the first visit or because the cache had been
    /// cleared since the last visit.
    pub fn get_or_create_cached<T: 'static>(
        &mut self,
        traversal: &mut Traversal,
        compute: impl FnOnce() -> T,
    ) -> Result<(NodeId, bool), GraphError> {
        if let Some(id) = self.next_child(traversal) {
            match self.slot_mut(id) {
                Slot::Value(ValueCell::Cached(Some(_))) => return Ok((id, false)),
                Slot::Value(ValueCell::Cached(slot @ None)) => {
                    *slot = Some(Box::new(compute()));
                    return Ok((id, true));
                }
                _ => return Err(GraphError::TypeMismatch { node: id }),
            }
        }
        let id = self.alloc(Slot::Value(ValueCell::Cached(Some(Box::new(compute())))));
        self.push_child(traversal, id);
        Ok((id, true))
    }

    pub fn get<T: 'static>(&self, id: NodeId) -> &T {
        let cell = match self.slot(id) {
            Slot::Value(cell) => cell,
            _ => panic!("NodeId {id:?} is not a value node"),
        };
        let boxed = match cell {
            ValueCell::Persistent(v) => v,
            ValueCell::Cached(Some(v)) => v,
            ValueCell::Cached(None) => panic!("NodeId {id:?}'s cache is empty"),
        };
        boxed
            .downcast_ref::<T>()
            .unwrap_or_else(|| panic!("NodeId {id:?} type mismatch in get::<T>"))
    }

    pub fn get_mut<T: 'static>(&mut self, id: NodeId) -> &mut T {
        let cell = match self.slot_mut(id) {
            Slot::Value(cell) => cell,
            _ => panic!("NodeId {id:?} is not a value node"),
        };
        let boxed: &mut Box<dyn Any> = match cell {
            ValueCell::Persistent(v) => v,
            ValueCell::Cached(Some(v)) => v,
            ValueCell::Cached(None) => panic!("NodeId {id:?}'s cache is empty"),
        };
        boxed
            .downcast_mut::<T>()
            .unwrap_or_else(|| panic!("NodeId {id:?} type mismatch in get_mut::<T>"))
    }

    /// Gets or creates the ordinary (unnamed) child block at the current
    /// traversal position. Enter it with [`Traversal::enter_block`] to
    /// address its own children positionally.
    pub fn get_or_create_block(
        &mut self,
        traversal: &mut Traversal,
    ) -> Result<NodeId, GraphError> {
        if let Some(id) = self.next_child(traversal) {
            match self.slot(id) {
                Slot::Block(_) => return Ok(id),
                _ => return Err(GraphError::TypeMismatch { node: id }),
            }
        }
        let id = self.alloc(Slot::Block(Vec::new()));
        self.push_child(traversal, id);
        Ok(id)
    }

    /// Allocates a fresh, empty block that is not tracked positionally.
    /// Used to back a [`crate::naming::NamedEntry`]: a named block's
    /// lifetime is owned by its `NamingMap` entry, not by a position within
    /// some enclosing block, since names can be visited in any order (and
    /// in varying counts) across traversals.
    pub fn alloc_named_block(&mut self) -> NodeId {
        self.alloc(Slot::Block(Vec::new()))
    }

    /// Like [`DataGraph::get_or_create_block`] but for a naming context: a
    /// block whose children are addressed by [`Id`] rather than by position.
    pub fn get_or_create_naming_map(
        &mut self,
        traversal: &mut Traversal,
    ) -> Result<NodeId, GraphError> {
        if let Some(id) = self.next_child(traversal) {
            match self.slot(id) {
                Slot::NamingMap(_) => return Ok(id),
                _ => return Err(GraphError::TypeMismatch { node: id }),
            }
        }
        let id = self.alloc(Slot::NamingMap(NamingMap::new()));
        self.push_child(traversal, id);
        Ok(id)
    }

    /// Looks up (or reserves a slot for) `name` within the naming map `map`,
    /// honoring the current traversal's refresh/ordering rules.
    pub fn visit_name(
        &mut self,
        map: NodeId,
        name: &Id,
        traversal: &Traversal,
    ) -> Result<VisitOutcome, GraphError> {
        self.naming_map_mut(map)
            .visit(name, traversal.is_refreshing(), traversal.gc_enabled())
    }

    pub fn bind_name(&mut self, map: NodeId, name: Id, block: NodeId) {
        self.naming_map_mut(map).insert(name, block);
    }

    /// Explicitly removes `name` from `map`, destroying its block
    /// immediately rather than waiting for GC to notice it went unvisited.
    pub fn remove_name(&mut self, map: NodeId, name: &Id) {
        if let Some(block) = self.naming_map_mut(map).remove(name) {
            self.destroy(block);
        }
    }

    /// Marks the start of a pass over `map`'s contents. Must be paired with
    /// [`DataGraph::end_naming_traversal`].
    pub fn begin_naming_traversal(&mut self, map: NodeId) {
        self.naming_map_mut(map).begin_traversal();
    }

    /// Marks the end of a pass over `map`'s contents, destroying any entry
    /// GC collected (see [`NamingMap::end_traversal`]) and recording how many
    /// were destroyed on `traversal`'s [`GcStats`].
    pub fn end_naming_traversal(&mut self, map: NodeId, traversal: &mut Traversal) {
        let collected = self
            .naming_map_mut(map)
            .end_traversal(traversal.is_refreshing(), traversal.gc_enabled());
        let count = collected.len();
        for block in collected {
            self.destroy(block);
        }
        traversal.record_collected(count);
    }
}
