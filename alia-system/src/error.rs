// Copyright 2024 The alia authors.
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;

use alia_routing::RoutingError;

/// An error that escaped a traversal with no installed handler to catch
/// it. [`crate::System::isolate_errors`]
/// is the inner boundary user code calls directly; this is what reaches
/// [`crate::System::set_error_handler`] (or, lacking one, the log) when a
/// whole refresh or dispatch pass's controller call itself returns an
/// error rather than isolating it first.
#[derive(Clone, Debug)]
pub struct DispatchError {
    inner: RoutingError,
}

impl From<RoutingError> for DispatchError {
    fn from(inner: RoutingError) -> DispatchError {
        DispatchError { inner }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unhandled error during dispatch: {}", self.inner)
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.inner)
    }
}
