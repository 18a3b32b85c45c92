// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;
use std::rc::Rc;

/// A validation error raised from a signal's writer.
/// Cheaply clonable since [`crate::signal::write_signal`] needs to offer a
/// copy to [`crate::signal::Signal::invalidate`] while still being able to
/// propagate the original on refusal.
#[derive(Clone, Debug)]
pub struct SignalError {
    message: Rc<str>,
}

impl SignalError {
    pub fn new(message: impl Into<String>) -> SignalError {
        SignalError {
            message: Rc::from(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SignalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SignalError {}
