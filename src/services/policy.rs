// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-call error handling policy.

use crate::error::Result;

/// What a service call does when the request fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPolicy<T> {
    /// Return the error to the caller.
    Propagate,
    /// Log the error and return this value instead.
    Fallback(T),
}

impl<T> ErrorPolicy<T> {
    pub fn apply(self, result: Result<T>, operation: &str) -> Result<T> {
        match (result, self) {
            (Ok(value), _) => Ok(value),
            (Err(e), ErrorPolicy::Propagate) => Err(e),
            (Err(e), ErrorPolicy::Fallback(value)) => {
                tracing::warn!(operation, error = %e, "Request failed, using fallback value");
                Ok(value)
            }
        }
    }
}
