// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! The runtime object a host constructs once and drives for the life of a
//! running UI: the refresh/dispatch loop, error isolation, and the default
//! synchronous host integration.

mod error;
mod external;
mod options;
mod system;

#[cfg(test)]
mod tests;

pub use error::DispatchError;
pub use external::SyncExternalInterface;
pub use options::SystemOptions;
pub use system::{System, SystemHandle, SystemTag};
