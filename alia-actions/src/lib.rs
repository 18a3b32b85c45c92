// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Deferred effects with readiness and latch-style two-phase execution
//!. An [`Action`] is a value, not a function call: building
//! one does nothing until [`perform_action`] (or a composite action's own
//! `perform`) actually runs it.

mod action;
mod domain;
mod error;


pub use action::{
    bind, callback, callback_with_readiness, copy, mask, only_if_ready, pair, perform_action,
    perform_action1, Action, Action1, Bind, Callback, CallbackWithReadiness, Copy, Mask,
    OnlyIfReady, Pair,
};
pub use domain::{
    apply_action, erase_index, erase_key, push_back, toggle, ApplyAction, EraseIndex, EraseKey,
    PushBack, Toggle,
};
pub use error::ActionError;
