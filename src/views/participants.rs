//! Participant list.

use crate::models::Participant;
use std::fmt::Write;

pub const NO_PARTICIPANTS: &str = "No participants";

/// One line per participant: name and email.
pub fn render_participants(participants: &[Participant]) -> String {
    if participants.is_empty() {
        return format!("{}\n", NO_PARTICIPANTS);
    }

    let mut out = String::new();
    for participant in participants {
        if participant.email.is_empty() || participant.email == participant.full_name {
            let _ = writeln!(out, "  * {}", participant.full_name);
        } else {
            let _ = writeln!(out, "  * {} <{}>", participant.full_name, participant.email);
        }
    }
    out
}
