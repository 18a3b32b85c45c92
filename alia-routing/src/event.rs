// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Event dispatch structures: the routing-path walk for
//! targeted events, the scoped-container RAII that drives it, and
//! focus-order search scratch space.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;

use alia_context::{Context, Tag};
use alia_id::Id;

use crate::component::ComponentHandle;
use crate::error::RoutingError;

/// A dynamically-typed event payload ("the event's type-id
/// and pointer"). Owned via `Rc` rather than borrowed, so an
/// [`EventTraversal`] carrying one can live inside [`Context`]'s `'static`
/// extension chain for the whole dispatch.
#[derive(Clone)]
pub struct Event {
    type_id: TypeId,
    payload: Rc<dyn Any>,
}

impl Event {
    pub fn new<T: Any>(payload: T) -> Event {
        Event {
            type_id: TypeId::of::<T>(),
            payload: Rc::new(payload),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn downcast<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

/// One link of a targeted event's routing path, root-first: walking parent
/// pointers from the target container up to the root produces the path.
struct RoutingNode {
    container: ComponentHandle,
    next: Option<Rc<RoutingNode>>,
}

fn build_routing_path(target: &ComponentHandle) -> Rc<RoutingNode> {
    let mut ancestors = vec![target.clone()];
    let mut current = target.clone();
    while let Some(parent) = current.parent() {
        ancestors.push(parent.clone());
        current = parent;
    }
    // `ancestors` is target-first, root-last. Build the linked list from
    // the tail (target, `next: None`) outward so the head ends up at the
    // root.
    let mut iter = ancestors.into_iter();
    let mut node = Rc::new(RoutingNode {
            container: iter.next().expect("a container is always its own first ancestor"),
            next: None,
    });
    for ancestor in iter {
        node = Rc::new(RoutingNode {
                container: ancestor,
                next: Some(node),
        });
    }
    node
}

/// The event-traversal structure threaded through [`Context`] for the
/// duration of one dispatch.
pub struct EventTraversal {
    active: Option<ComponentHandle>,
    targeted: bool,
    is_refresh: bool,
    routing_path: Option<Rc<RoutingNode>>,
    event: Event,
    aborted: bool,
}

/// The context tag under which a dispatch's [`EventTraversal`] is
/// registered. Event-traversal is one of the most frequently-used
/// subsystem tags, but since `alia-routing` can't be named from
/// `alia-context`, it still goes through the dynamic extension chain
/// like everything above the two built-in tags.
pub struct EventTraversalTag;

impl Tag for EventTraversalTag {
    type Data = RefCell<EventTraversal>;
    const NAME: &'static str = "event_traversal";
}

impl EventTraversal {
    /// A refresh pass: non-targeted, visits every container.
    pub fn new_refresh(root: &ComponentHandle) -> EventTraversal {
        EventTraversal {
            active: Some(root.clone()),
            targeted: false,
            is_refresh: true,
            routing_path: None,
            event: Event::new(RefreshMarker),
            aborted: false,
        }
    }

    /// A broadcast, non-refresh event: same coverage as refresh, carrying
    /// a real payload.
    pub fn new_broadcast(root: &ComponentHandle, event: Event) -> EventTraversal {
        EventTraversal {
            active: Some(root.clone()),
            targeted: false,
            is_refresh: false,
            routing_path: None,
            event,
            aborted: false,
        }
    }

    /// A targeted event: walks parent pointers from `target` to the root
    /// to build the route before the traversal starts.
    pub fn new_targeted(root: &ComponentHandle, target: &ComponentHandle, event: Event) -> EventTraversal {
        EventTraversal {
            active: Some(root.clone()),
            targeted: true,
            is_refresh: false,
            routing_path: Some(build_routing_path(target)),
            event,
            aborted: false,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn is_targeted(&self) -> bool {
        self.targeted
    }

    /// True only for a refresh pass, as opposed to a broadcast or targeted
    /// non-refresh event. `alia-timer`'s `value_smoother` uses this to tell
    /// a refresh-time value change (which should re-pin the transition)
    /// from the same change merely being observed during a later non-refresh
    /// dispatch.
    pub fn is_refresh(&self) -> bool {
        self.is_refresh
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    pub fn active_container(&self) -> Option<&ComponentHandle> {
        self.active.as_ref()
    }

    /// Advances the routing path if `container` is next on it, reporting
    /// whether `container` is on route. Always `true` for non-targeted
    /// passes.
    fn advance_route(&mut self, container: &ComponentHandle) -> bool {
        if !self.targeted {
            return true;
        }
        match &self.routing_path {
            Some(node) if node.container.same_container(container) => {
                self.routing_path = node.next.clone();
                true
            }
            _ => false,
        }
    }
}

/// A marker payload for refresh passes, which carry no user event data.
struct RefreshMarker;

/// Raised by a non-refresh event handler to short-circuit the rest of the
/// traversal ("Cancellation & timeouts"). The dispatch layer
/// catches [`RoutingError::Aborted`] specially and stops cleanly instead
/// of treating it as a fault.
pub fn abort_traversal(ctx: &Context) -> RoutingError {
    if let Some(traversal) = ctx.get::<EventTraversalTag>() {
        traversal.borrow_mut().aborted = true;
    }
    RoutingError::Aborted
}

/// The scoped-container RAII: `begin` links the container into the
/// currently-active one, pushes it as active, captures and clears its
/// dirty/animating bits, and computes whether it's on the current route;
/// `end` (or `Drop`) restores the previous active container.
pub struct ScopedContainer<'a> {
    traversal: &'a RefCell<EventTraversal>,
    previous_active: Option<ComponentHandle>,
    pub is_on_route: bool,
    pub is_dirty: bool,
    pub is_animating: bool,
}

impl<'a> ScopedContainer<'a> {
    pub fn begin(traversal: &'a RefCell<EventTraversal>, container: &ComponentHandle) -> ScopedContainer<'a> {
        let bits = container.capture_and_clear();
        let mut et = traversal.borrow_mut();
        let is_on_route = et.advance_route(container);
        let previous_active = et.active.replace(container.clone());
        drop(et);
        ScopedContainer {
            traversal,
            previous_active,
            is_on_route,
            is_dirty: bits.is_dirty,
            is_animating: bits.is_animating,
        }
    }

    pub fn end(self) {
        // `Drop` does the work; this just gives call sites a named way to
        // end a scope early rather than relying on value drop order.
    }
}

impl Drop for ScopedContainer<'_> {
    fn drop(&mut self) {
        self.traversal.borrow_mut().active = self.previous_active.take();
    }
}

/// Which direction a focus-order search is moving.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FocusDirection {
    Successor,
    Predecessor,
}

/// Scratch space for a focus successor/predecessor search, carried as a
/// targeted event's payload. Widgets call [`FocusSearch::consider`] with
/// their own focusable element id as they're visited; [`FocusSearch::result`]
/// gives the answer once the traversal completes.
pub struct FocusSearch {
    direction: FocusDirection,
    target: Option<Id>,
    seen_target: bool,
    candidate: Option<Id>,
}

impl FocusSearch {
    /// `target` is the currently-focused element, if any; `None` means
    /// "nothing is focused", so the first (for `Successor`) or last (for
    /// `Predecessor`) focusable element wins.
    pub fn new(direction: FocusDirection, target: Option<Id>) -> FocusSearch {
        // For `Successor`, no target means the first element visited should
        // win, so start as if the target had already been passed. For
        // `Predecessor`, `consider` tracks the last element seen *before*
        // the target, so it must start false regardless of `target`: with
        // no target, every element is "before" it and the last one wins.
        let seen_target = match direction {
            FocusDirection::Successor => target.is_none(),
            FocusDirection::Predecessor => false,
        };
        FocusSearch {
            direction,
            target,
            seen_target,
            candidate: None,
        }
    }

    pub fn consider(&mut self, element: &Id) {
        match self.direction {
            FocusDirection::Successor => {
                if self.candidate.is_some() {
                    return;
                }
                if self.seen_target {
                    self.candidate = Some(element.clone());
                } else if self.target.as_ref() == Some(element) {
                    self.seen_target = true;
                }
            }
            FocusDirection::Predecessor => {
                if self.target.as_ref() == Some(element) {
                    self.seen_target = true;
                    return;
                }
                if !self.seen_target {
                    self.candidate = Some(element.clone());
                }
            }
        }
    }

    pub fn result(&self) -> Option<&Id> {
        self.candidate.as_ref()
    }
}
