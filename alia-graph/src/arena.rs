// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::any::Any;
use std::fmt;

use crate::naming::NamingMap;

/// A stable index into a [`DataGraph`]'s arena. Indices are never reused
/// while a slot is live, but once a slot is destroyed its index is recycled
/// via the graph's free list (see `Slot::Free`), so handles stay plain
/// indices rather than shared/weak pointers.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(pub(crate) u32);

/// The two data-node flavors a traversal can allocate.
pub(crate) enum ValueCell {
    /// Never cleared except when the node itself is destroyed.
    Persistent(Box<dyn Any>),
    /// Cleared (set to `None`) whenever the node's subtree goes inactive
    /// and cache-clearing is enabled for that scope.
    Cached(Option<Box<dyn Any>>),
}

impl ValueCell {
    pub(crate) fn clear_cache(&mut self) {
        if let ValueCell::Cached(slot) = self {
            *slot = None;
        }
    }
}

impl fmt::Debug for ValueCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCell::Persistent(_) => write!(f, "Persistent(..)"),
            ValueCell::Cached(Some(_)) => write!(f, "Cached(Some(..))"),
            ValueCell::Cached(None) => write!(f, "Cached(None)"),
        }
    }
}

pub(crate) enum Slot {
    Value(ValueCell),
    /// An ordered, positionally-addressed data block: a scoped child block
    /// (`if_`, loop bodies, `invoke_pure_component`'s two fixed children) or
    /// the graph's root block.
    Block(Vec<NodeId>),
    /// The backing store for a naming context: an id-keyed collection of
    /// named blocks, reorderable across traversals ("Naming
    /// map").
    NamingMap(NamingMap),
    /// A destroyed slot; `Free(next)` links the graph's free list.
    Free(Option<NodeId>),
}

/// The identity-preserving persistent store backing a traversal.
///
/// An arena of cacheable entries addressed by stable index, with no
/// multi-threaded machinery: `alia`'s traversal is single-threaded and
/// cooperative, so there is no `Mutex`, no run tokens, and no
/// generation-based dependency tracking here — only position/name-addressed
/// storage and subtree-scoped cache clearing.
///
/// Naming contexts hold genuinely dynamic collections (`for_each` over a
/// changing list), so real deletion with index recycling is load-bearing
/// here, not optional.
pub struct DataGraph {
    pub(crate) slots: Vec<Slot>,
    free_head: Option<NodeId>,
    root: NodeId,
}

impl DataGraph {
    pub fn new() -> DataGraph {
        let mut graph = DataGraph {
            slots: Vec::new(),
            free_head: None,
            root: NodeId(0),
        };
        graph.root = graph.alloc(Slot::Block(Vec::new()));
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn alloc(&mut self, slot: Slot) -> NodeId {
        if let Some(NodeId(idx)) = self.free_head {
            let next = match &self.slots[idx as usize] {
                Slot::Free(next) => *next,
                _ => unreachable!("free list pointed at a live slot"),
            };
            self.free_head = next;
            self.slots[idx as usize] = slot;
            NodeId(idx)
        } else {
            let id = NodeId(self.slots.len() as u32);
            self.slots.push(slot);
            id
        }
    }

    pub(crate) fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.0 as usize]
    }

    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.slots[id.0 as usize]
    }

    pub(crate) fn block(&self, id: NodeId) -> &Vec<NodeId> {
        match self.slot(id) {
            Slot::Block(children) => children,
            _ => panic!("NodeId {id:?} does not refer to a data block"),
        }
    }

    pub(crate) fn block_mut(&mut self, id: NodeId) -> &mut Vec<NodeId> {
        match self.slot_mut(id) {
            Slot::Block(children) => children,
            _ => panic!("NodeId {id:?} does not refer to a data block"),
        }
    }

    pub(crate) fn naming_map_mut(&mut self, id: NodeId) -> &mut NamingMap {
        match self.slot_mut(id) {
            Slot::NamingMap(map) => map,
            _ => panic!("NodeId {id:?} does not refer to a naming map"),
        }
    }

    /// Destroys `id` and everything it owns, in reverse of insertion order
    /// for block children ("Destruction order within a block is
    /// reverse of insertion").
    pub(crate) fn destroy(&mut self, id: NodeId) {
        let slot = std::mem::replace(self.slot_mut(id), Slot::Free(None));
        match slot {
            Slot::Value(_) => {}
            Slot::Block(children) => {
                for child in children.into_iter().rev() {
                    self.destroy(child);
                }
            }
            Slot::NamingMap(map) => {
                for (_, entry) in map.into_entries() {
                    self.destroy(entry.block);
                }
            }
            Slot::Free(_) => unreachable!("destroying an already-free slot"),
        }
        *self.slot_mut(id) = Slot::Free(self.free_head);
        self.free_head = Some(id);
    }

    /// Clears cacheable values reachable from `id`, recursing into child
    /// blocks and naming maps but never destroying anything. Used when a
    /// `Cached` node's enclosing subtree is skipped by a refresh traversal.
    pub(crate) fn clear_cache_recursive(&mut self, id: NodeId) {
        match self.slot_mut(id) {
            Slot::Value(cell) => cell.clear_cache(),
            Slot::Block(children) => {
                let children = children.clone();
                for child in children {
                    self.clear_cache_recursive(child);
                }
            }
            Slot::NamingMap(map) => {
                let blocks: Vec<NodeId> = map.entry_blocks().collect();
                for block in blocks {
                    self.clear_cache_recursive(block);
                }
            }
            Slot::Free(_) => {}
        }
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| !matches!(s, Slot::Free(_)))
            .count()
    }
}

impl Default for DataGraph {
    fn default() -> Self {
        Self::new()
    }
}
