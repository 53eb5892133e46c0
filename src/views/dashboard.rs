//! Dashboard widgets.

use crate::models::{CalendarEvent, CalendarUser};
use crate::time_utils::{format_event_date, format_event_time};
use std::fmt::Write;

pub const NO_UPCOMING_EVENTS: &str = "No upcoming events";

/// Compact one-line-per-event list.
pub fn render_event_list(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return format!("{}\n", NO_UPCOMING_EVENTS);
    }

    let mut out = String::new();
    for event in events {
        let when = if event.is_all_day {
            format_event_date(&event.start_time)
        } else {
            format_event_time(&event.start_time)
        };
        let _ = write!(out, "{:<16}  {:<8}  {}", when, event.type_label(), event.title);
        if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
            let _ = write!(out, " @ {}", location);
        }
        let _ = writeln!(out, "  (#{})", event.id);
    }
    out
}

/// Users available as participants.
pub fn render_users(users: &[CalendarUser]) -> String {
    let mut out = String::new();
    for user in users {
        let _ = writeln!(out, "{:>6}  {}  <{}>", user.id, user.full_name(), user.email);
    }
    out
}
