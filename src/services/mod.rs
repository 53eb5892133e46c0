// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - domain operations over the API client.

pub mod auth;
pub mod calendar;
pub mod policy;

pub use auth::{AuthService, LoginOutcome};
pub use calendar::{CalendarService, EventFilter};
pub use policy::ErrorPolicy;
