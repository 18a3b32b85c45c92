// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;

use alia_signals::SignalError;

/// Failure raised while performing an action: either a validation error
/// bubbled up from a signal write, or a domain error an action raises
/// directly.
#[derive(Clone, Debug)]
pub enum ActionError {
    Signal(SignalError),
    Other(String),
}

impl ActionError {
    pub fn other(message: impl Into<String>) -> ActionError {
        ActionError::Other(message.into())
    }
}

impl From<SignalError> for ActionError {
    fn from(err: SignalError) -> ActionError {
        ActionError::Signal(err)
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Signal(err) => write!(f, "{err}"),
            ActionError::Other(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ActionError {}
