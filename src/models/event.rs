// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar event model and the create/update payload.

use super::{Participant, RecordId};
use crate::error::{AppError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Maximum length of `title` and `location` accepted by the backend.
pub const MAX_TEXT_FIELD_LEN: u64 = 255;

/// Kind of calendar entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[default]
    Meeting,
    Call,
    Deadline,
    Review,
    #[serde(other)]
    Other,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Meeting => "Meeting",
            EventType::Call => "Call",
            EventType::Deadline => "Deadline",
            EventType::Review => "Review",
            EventType::Other => "Other",
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            EventType::Meeting => "MEETING",
            EventType::Call => "CALL",
            EventType::Deadline => "DEADLINE",
            EventType::Review => "REVIEW",
            EventType::Other => "OTHER",
        }
    }
}

impl FromStr for EventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MEETING" => Ok(EventType::Meeting),
            "CALL" => Ok(EventType::Call),
            "DEADLINE" => Ok(EventType::Deadline),
            "REVIEW" => Ok(EventType::Review),
            "OTHER" => Ok(EventType::Other),
            other => Err(AppError::Validation(format!(
                "unknown event type {:?}",
                other
            ))),
        }
    }
}

/// Start or end of an event.
///
/// Regular events carry a full timestamp; task deadlines and sale close
/// dates merged into the list by the backend carry a bare date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventTime {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl EventTime {
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::DateTime(dt) => dt.date_naive(),
            EventTime::Date(d) => *d,
        }
    }

    /// Instant in UTC. Bare dates are taken as midnight UTC.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self {
            EventTime::DateTime(dt) => dt.with_timezone(&Utc),
            EventTime::Date(d) => Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)),
        }
    }
}

impl FromStr for EventTime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(EventTime::DateTime(dt));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(EventTime::Date)
            .map_err(|_| {
                AppError::Validation(format!(
                    "expected an RFC 3339 timestamp or YYYY-MM-DD date, got {:?}",
                    s
                ))
            })
    }
}

impl From<DateTime<Utc>> for EventTime {
    fn from(dt: DateTime<Utc>) -> Self {
        EventTime::DateTime(dt.fixed_offset())
    }
}

/// Where a calendar entry comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Calendar,
    Task,
    Sale,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventSource::Calendar => "calendar",
            EventSource::Task => "task",
            EventSource::Sale => "sale",
        })
    }
}

/// Calendar event as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub event_type_display: Option<String>,
    pub start_time: EventTime,
    pub end_time: EventTime,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: RecordId,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub customer: Option<RecordId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub sale: Option<RecordId>,
    #[serde(default)]
    pub sale_title: Option<String>,
    #[serde(default)]
    pub participants: Vec<RecordId>,
    #[serde(default)]
    pub participants_details: Vec<Participant>,
}

impl CalendarEvent {
    pub fn source(&self) -> EventSource {
        let id = self.id.as_str();
        if id.starts_with("task_") {
            EventSource::Task
        } else if id.starts_with("sale_") {
            EventSource::Sale
        } else {
            EventSource::Calendar
        }
    }

    /// Display label for the event type, preferring the server's wording.
    pub fn type_label(&self) -> &str {
        self.event_type_display
            .as_deref()
            .unwrap_or_else(|| self.event_type.label())
    }
}

/// Payload for creating or partially updating an event.
///
/// Only fields that are set are sent, so a PATCH touches nothing else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct EventDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_TEXT_FIELD_LEN))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<EventTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = MAX_TEXT_FIELD_LEN))]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<RecordId>>,
}

impl EventDraft {
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn has_owner(&self) -> bool {
        self.owner.as_ref().is_some_and(|o| !o.is_empty())
    }

    /// Fill `title`, `owner` and `event_type` from the stored event where
    /// the draft leaves them out.
    pub fn backfill_from(&mut self, current: &CalendarEvent) {
        if !self.has_title() && !current.title.is_empty() {
            self.title = Some(current.title.clone());
        }
        if !self.has_owner() && !current.owner.is_empty() {
            self.owner = Some(current.owner.clone());
        }
        if self.event_type.is_none() {
            self.event_type = Some(current.event_type);
        }
    }

    /// Check the draft before it is sent.
    pub fn ensure_sendable(&self) -> Result<()> {
        self.validate()?;
        if !self.has_title() || !self.has_owner() {
            return Err(AppError::Validation(
                "Missing required fields: title and owner are required".to_string(),
            ));
        }
        Ok(())
    }
}
