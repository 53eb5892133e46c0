//! User records as seen by the calendar.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Event participant, as embedded in `participants_details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: RecordId,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Display name (falls back to email on the server side)
    #[serde(default)]
    pub full_name: String,
}

/// User selectable as an event participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarUser {
    pub id: RecordId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl CalendarUser {
    /// "First Last", or the email address when both names are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string();
        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }
}

impl From<CalendarUser> for Participant {
    fn from(user: CalendarUser) -> Self {
        Participant {
            full_name: user.full_name(),
            id: user.id,
            email: user.email,
        }
    }
}
