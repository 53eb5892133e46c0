// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event detail page.

use super::participants::render_participants;
use crate::models::CalendarEvent;
use crate::time_utils::{format_event_date, format_event_time};
use std::fmt::Write;

/// Render the full detail view of one event.
pub fn render_event_detail(event: &CalendarEvent) -> String {
    let mut out = String::new();

    let _ = write!(out, "{}\n[{}]", event.title, event.type_label());
    if event.is_all_day {
        out.push_str(" [All Day]");
    }
    out.push_str("\n\n");

    out.push_str("When & Where\n");
    if event.is_all_day {
        let _ = writeln!(out, "  {} (All Day Event)", format_event_date(&event.start_time));
    } else {
        let _ = writeln!(
            out,
            "  {} to {}",
            format_event_time(&event.start_time),
            format_event_time(&event.end_time)
        );
    }
    if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
        let _ = writeln!(out, "  Location: {}", location);
    }

    out.push_str("\nOrganizer & Related\n");
    let organizer = event.owner_name.as_deref().unwrap_or(event.owner.as_str());
    let _ = writeln!(out, "  Organized by: {}", organizer);
    if let (Some(name), Some(id)) = (&event.customer_name, &event.customer) {
        let _ = writeln!(out, "  Related to Customer: {} (#{})", name, id);
    }
    if let (Some(title), Some(id)) = (&event.sale_title, &event.sale) {
        let _ = writeln!(out, "  Related to Sale: {} (#{})", title, id);
    }

    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str("\nDescription\n");
        for line in description.lines() {
            let _ = writeln!(out, "  {}", line);
        }
    }

    out.push_str("\nParticipants\n");
    out.push_str(&render_participants(&event.participants_details));

    out
}
