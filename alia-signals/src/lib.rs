// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! Lazy, capability-typed, value-id-tracked reactive values.
//!
//! A [`Signal`] is a capability-gated view onto a value that may or may not
//! currently exist. The capability — what a caller may do with it — is
//! expressed two ways at once: statically, through the [`Readable`],
//! [`Movable`], [`Writable`], and [`Clearable`] marker traits a concrete
//! signal type chooses to implement; and dynamically, through
//! [`Signal::capability`], for code that holds a signal behind a trait
//! object and needs to check a capability at runtime. See
//! [`capability`]'s module docs for why this hybrid exists instead of a
//! single scheme.

mod capability;
mod combinators;
mod error;
mod lambda;
mod signal;
mod sources;
mod state;
mod transforms;


pub use capability::{Capability, ReadTier, WriteTier};
pub use combinators::{
    apply1, duplex_apply1, lazy_apply1, lazy_apply2, lazy_duplex_apply1, Apply1, DuplexApply1,
    LazyApply1, LazyApply2, LazyDuplexApply1,
};
pub use error::SignalError;
pub use lambda::{
    lambda_constant, lambda_duplex, lambda_duplex_with_id, lambda_reader, lambda_reader_with_id,
    LambdaConstant, LambdaDuplex, LambdaReader,
};
pub use signal::{refresh_signal_view, write_signal, Clearable, Movable, Readable, Signal, Writable};
pub use sources::{default_initialized, direct, empty, value, Direct, Empty, ValueSignal};
pub use state::{get_state, get_transient_state, State, TransientState};
pub use transforms::{
    activate, add_default, has_value, mask, mask_reads, mask_writes, minimize_id_changes,
    ready_to_write, signal_cast, simplify_id, unwrap, validated, Activated, AddDefault,
    HasValueSignal, Mask, MaskReads, MaskWrites, MinimizeIdChanges, ReadyToWrite, SignalCast,
    Unwrap, Validated,
};
