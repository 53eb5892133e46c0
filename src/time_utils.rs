// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use crate::models::EventTime;
use chrono::{DateTime, SecondsFormat, Utc};

/// Display format for timestamps (`yyyy-MM-dd HH:mm`).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Display format for dates (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format an event time for display, in the event's own offset.
pub fn format_event_time(time: &EventTime) -> String {
    match time {
        EventTime::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        EventTime::Date(d) => d.format(DATE_FORMAT).to_string(),
    }
}

/// Format just the date part of an event time.
pub fn format_event_date(time: &EventTime) -> String {
    time.date().format(DATE_FORMAT).to_string()
}
