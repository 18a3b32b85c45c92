// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! A reactive, declarative UI runtime: a persistent data graph addressed
//! by traversal position or explicit name, lazy capability-typed signals
//! over it, two-phase actions, a component tree with dirty/animating
//! propagation and event routing, and the control-flow combinators
//! (`if_`, `for_each`, `transform`, effect hooks, `try_`/`catch_`) that
//! tie them together into ordinary-looking Rust control flow.
//!
//! This crate re-exports the lower layers (`alia-id`, `alia-graph`,
//! `alia-context`, `alia-signals`, `alia-actions`, `alia-routing`,
//! `alia-timer`, `alia-system`) alongside its own combinators through
//! [`prelude`], which is the intended single import for application code.

mod flow;
mod for_each;
mod hooks;
mod internal;
mod transform;
mod try_catch;

#[cfg(test)]
mod tests;

pub use flow::{if_, IfChain};
pub use for_each::{for_each, for_each_with_removal};
pub use hooks::{
    on_activate, on_activate_observed, on_init, on_value_change, on_value_change_observed, on_value_gain,
    on_value_gain_observed, on_value_loss, on_value_loss_observed,
};
pub use transform::transform;
pub use try_catch::{try_, TryResult};

pub mod prelude {
    //! Re-exports the whole public surface: the runtime (`System`), the
    //! data graph, signals and actions, component routing, and this
    //! crate's own combinators.

    pub use alia_actions::{
        apply_action, bind, callback, callback_with_readiness, copy, erase_index, erase_key, only_if_ready, pair,
        perform_action, perform_action1, push_back, toggle, Action, Action1, ActionError, ApplyAction, Bind,
        Callback, CallbackWithReadiness, EraseIndex, EraseKey, OnlyIfReady, Pair, PushBack, Toggle,
    };
    pub use alia_actions::{mask as mask_action, Mask as MaskAction};
    pub use alia_context::{Context, MissingTag, Tag};
    pub use alia_graph::{DataGraph, GcStats, GraphError, NodeId, ScopeGuard, Traversal, VisitOutcome};
    pub use alia_id::{by_address_id, combine_ids, simple_id, unit_id, ByAddressId, CapturedId, Id};
    pub use alia_routing::{
        abort_traversal, current_content_id, get_component, invoke_pure_component, mark_animating_component,
        mark_dirty_component, ComponentError, ComponentHandle, Event, EventTraversal, EventTraversalTag,
        FocusDirection, FocusSearch, RoutingError, ScopedContainer,
    };
    pub use alia_signals::{
        activate, add_default, apply1, default_initialized, direct, duplex_apply1, empty, get_state,
        get_transient_state, has_value, lambda_constant, lambda_duplex, lambda_duplex_with_id, lambda_reader,
        lambda_reader_with_id, lazy_apply1, lazy_apply2, lazy_duplex_apply1, mask_reads, mask_writes,
        minimize_id_changes, ready_to_write, refresh_signal_view, signal_cast, simplify_id, unwrap, validated, value,
        write_signal, Activated, AddDefault, Apply1, Capability, Clearable, Direct, DuplexApply1, Empty,
        HasValueSignal, LambdaConstant, LambdaDuplex, LambdaReader, LazyApply1, LazyApply2, LazyDuplexApply1,
        MaskReads, MaskWrites, MinimizeIdChanges, Movable, ReadTier, Readable, ReadyToWrite, Signal, SignalCast,
        SignalError, State, TransientState, Unwrap, Validated, ValueSignal, Writable, WriteTier,
    };
    pub use alia_signals::{mask as mask_signal, Mask as MaskSignal};
    pub use alia_system::{DispatchError, System, SystemHandle, SystemOptions, SystemTag, SyncExternalInterface};
    pub use alia_timer::{
        async_request, default_transition, deflicker, get_animation_timer, get_raw_animation_tick_count,
        get_raw_animation_ticks_left, get_timer, get_value_smoother, smooth, AnimationTimer, AsyncReporter,
        AsyncResult, Curve, Deflicker, ExternalInterface, Interpolate, Smooth, Tick, Timer, TimerQueue, Transition,
        ValueSmoother, DEFAULT_CURVE, EASE_IN_CURVE, EASE_IN_OUT_CURVE, EASE_OUT_CURVE, LINEAR_CURVE,
    };

    pub use crate::{
        for_each, for_each_with_removal, if_, on_activate, on_activate_observed, on_init, on_value_change,
        on_value_change_observed, on_value_gain, on_value_gain_observed, on_value_loss, on_value_loss_observed,
        transform, try_, IfChain, TryResult,
    };
}
