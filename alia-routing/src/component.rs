// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Component containers: the parent-linked tree of
//! dirty/animating bits that sits alongside the data graph's value/block
//! tree.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use alia_context::Context;

use crate::error::RoutingError;

/// One node's worth of routing state: a parent link plus the two bits
/// writes and animation requests set.
struct ComponentContainer {
    parent: Option<Weak<RefCell<ComponentContainer>>>,
    dirty: bool,
    animating: bool,
}

/// A cheaply-clonable handle to a [`ComponentContainer`]. Two handles
/// refer to the same container iff they share the same allocation — use
/// [`ComponentHandle::same_container`] rather than any derived equality.
#[derive(Clone)]
pub struct ComponentHandle(pub(crate) Rc<RefCell<ComponentContainer>>);

impl ComponentHandle {
    fn new(parent: Option<Weak<RefCell<ComponentContainer>>>) -> ComponentHandle {
        ComponentHandle(Rc::new(RefCell::new(ComponentContainer {
            parent,
            dirty: false,
            animating: false,
        })))
    }

    /// Builds the distinguished root container. The system loop creates
    /// exactly one of these per running `System` and seeds the initial
    /// [`crate::EventTraversal`] with it as the active container.
    pub fn new_root() -> ComponentHandle {
        ComponentHandle::new(None)
    }

    pub fn same_container(&self, other: &ComponentHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Peeks at the dirty bit without clearing it. The system loop uses
    /// this on the root container after a refresh pass to decide whether
    /// writes during that pass require another pass, without disturbing
    /// the capture/clear cycle [`ScopedContainer::begin`] drives during
    /// the pass itself.
    pub fn is_dirty(&self) -> bool {
        self.0.borrow().dirty
    }

    /// Peeks at the animating bit without clearing it. See [`ComponentHandle::is_dirty`].
    pub fn is_animating(&self) -> bool {
        self.0.borrow().animating
    }

    /// The container's parent, if it has one and the parent is still
    /// alive. Used to walk upward for dirty/animating propagation and to
    /// build a targeted event's routing path.
    pub(crate) fn parent(&self) -> Option<ComponentHandle> {
        self.0
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(ComponentHandle)
    }
}

/// Retrieves (or, on first visit, creates) the persistent container at the
/// current traversal position, parented to `parent`.
///
/// Every call site that wants its own component container — a widget, an
/// `if_`/`for_each` scope, [`crate::invoke_pure_component`] — calls this
/// once per visit; the returned handle is stable across frames as long as
/// the call site keeps being visited at the same position.
pub fn get_component(ctx: &Context, parent: &ComponentHandle) -> Result<ComponentHandle, RoutingError> {
    let graph = ctx.graph().clone();
    let mut traversal = ctx.traversal().borrow_mut();
    let mut g = graph.borrow_mut();
    let weak_parent = Rc::downgrade(&parent.0);
    let (node, _created) =
        g.get_or_create_node(&mut traversal, || ComponentHandle::new(Some(weak_parent)))?;
    Ok(g.get::<ComponentHandle>(node).clone())
}

/// Sets `container`'s dirty bit and every ancestor's, stopping as soon as
/// an already-dirty ancestor is reached. A state write calls this on the
/// writing signal's containing component.
pub fn mark_dirty_component(container: &ComponentHandle) {
    propagate(container, |c| &mut c.dirty);
}

/// Identical to [`mark_dirty_component`] but for the animating bit
/// (`mark_animating_component`). An animation-refresh request
/// calls this instead of marking dirty, so a purely cosmetic animation
/// doesn't trip `refresh_system`'s "no dirty roots left" convergence check
/// on its own.
pub fn mark_animating_component(container: &ComponentHandle) {
    propagate(container, |c| &mut c.animating);
}

fn propagate(container: &ComponentHandle, bit: impl Fn(&mut ComponentContainer) -> &mut bool) {
    let mut current = Some(container.clone());
    while let Some(handle) = current {
        let mut inner = handle.0.borrow_mut();
        let flag = bit(&mut inner);
        if *flag {
            break;
        }
        *flag = true;
        let next = handle.parent();
        drop(inner);
        current = next;
    }
}

/// Result of [`ScopedContainer::begin`]: the bits the container carried
/// into this scope, captured and cleared, plus whether this container is
/// on the current targeted event's route.
pub(crate) struct CapturedBits {
    pub(crate) is_dirty: bool,
    pub(crate) is_animating: bool,
}

impl ComponentHandle {
    /// Captures and clears the dirty/animating bits, as the "capture (and
    /// clear)" step of a scoped container's `begin`.
    pub(crate) fn capture_and_clear(&self) -> CapturedBits {
        let mut inner = self.0.borrow_mut();
        let is_dirty = std::mem::replace(&mut inner.dirty, false);
        let is_animating = std::mem::replace(&mut inner.animating, false);
        CapturedBits { is_dirty, is_animating }
    }
}
