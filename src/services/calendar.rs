// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar event operations.

use crate::client::{ApiClient, ApiRequest};
use crate::error::{AppError, Result};
use crate::models::{CalendarEvent, CalendarUser, EventDraft, Page, RecordId};
use crate::services::ErrorPolicy;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};

pub const EVENTS_PATH: &str = "/api/calendar/events/";
pub const USERS_FOR_CALENDAR_PATH: &str = "/api/users/for_calendar/";

fn event_path(id: &RecordId) -> String {
    format!("{}{}/", EVENTS_PATH, urlencoding::encode(id.as_str()))
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    params: Vec<(String, String)>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn from_date(self, from: DateTime<Utc>) -> Self {
        self.param("from_date", format_utc_rfc3339(from))
    }

    pub fn to_date(self, to: DateTime<Utc>) -> Self {
        self.param("to_date", format_utc_rfc3339(to))
    }

    pub fn ordering(self, field: &str) -> Self {
        self.param("ordering", field)
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn page(self, page: u32) -> Self {
        self.param("page", page.to_string())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Typed operations on the calendar event resource.
#[derive(Debug, Clone)]
pub struct CalendarService {
    client: ApiClient,
}

impl CalendarService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// List events matching `filter`.
    pub async fn list_events(&self, filter: &EventFilter) -> Result<Page<CalendarEvent>> {
        let request = ApiRequest::get(EVENTS_PATH).query(filter.params().iter().cloned());
        let page: Page<CalendarEvent> = self.client.send_json(request).await?;
        tracing::debug!(count = page.len(), more = page.has_more(), "Fetched calendar events");
        Ok(page)
    }

    /// List events, handling failure according to `policy`.
    pub async fn list_events_with(
        &self,
        filter: &EventFilter,
        policy: ErrorPolicy<Page<CalendarEvent>>,
    ) -> Result<Page<CalendarEvent>> {
        policy.apply(self.list_events(filter).await, "list_events")
    }

    /// The next `limit` events from now, for the dashboard.
    ///
    /// Never fails: any error degrades to an empty list.
    pub async fn upcoming_events(&self, limit: usize) -> Vec<CalendarEvent> {
        let filter = EventFilter::new()
            .from_date(Utc::now())
            .limit(limit)
            .ordering("start_time");

        self.list_events_with(&filter, ErrorPolicy::Fallback(Page::empty()))
            .await
            .unwrap_or_default()
            .truncate(limit)
            .into_results()
    }

    pub async fn get_event(&self, id: &RecordId) -> Result<CalendarEvent> {
        self.client.get_json(&event_path(id)).await
    }

    /// Create an event. A missing owner defaults to the signed-in user.
    pub async fn create_event(&self, mut draft: EventDraft) -> Result<CalendarEvent> {
        if !draft.has_owner() {
            match self.client.session().user_id() {
                Some(user_id) => {
                    tracing::debug!(owner = %user_id, "Using current user as event owner");
                    draft.owner = Some(RecordId::new(user_id));
                }
                None => {
                    return Err(AppError::Validation(
                        "Owner field is required for calendar events".to_string(),
                    ));
                }
            }
        }
        draft.ensure_sendable()?;

        let request = ApiRequest::post(EVENTS_PATH).json(&draft)?;
        let event: CalendarEvent = self.client.send_json(request).await?;
        tracing::info!(event_id = %event.id, "Calendar event created");
        Ok(event)
    }

    /// Partially update an event.
    ///
    /// The backend insists on `title` and `owner` even for PATCH, so when
    /// the draft lacks either they are copied from the stored event first.
    pub async fn update_event(&self, id: &RecordId, mut draft: EventDraft) -> Result<CalendarEvent> {
        if !draft.has_title() || !draft.has_owner() {
            tracing::debug!(event_id = %id, "Fetching event to backfill required fields");
            match self.get_event(id).await {
                Ok(current) => draft.backfill_from(&current),
                Err(e) => {
                    tracing::warn!(event_id = %id, error = %e, "Failed to fetch current event data");
                }
            }
        }
        draft.ensure_sendable()?;

        let request = ApiRequest::patch(event_path(id)).json(&draft)?;
        let event: CalendarEvent = self.client.send_json(request).await?;
        tracing::info!(event_id = %id, "Calendar event updated");
        Ok(event)
    }

    pub async fn delete_event(&self, id: &RecordId) -> Result<bool> {
        self.client.send(ApiRequest::delete(event_path(id))).await?;
        tracing::info!(event_id = %id, "Calendar event deleted");
        Ok(true)
    }

    /// Users that can be invited to events.
    pub async fn available_users(&self) -> Result<Page<CalendarUser>> {
        self.client.get_json(USERS_FOR_CALENDAR_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_path_escapes_ids() {
        assert_eq!(event_path(&RecordId::new("5")), "/api/calendar/events/5/");
        assert_eq!(
            event_path(&RecordId::new("a/b")),
            "/api/calendar/events/a%2Fb/"
        );
    }

    #[test]
    fn test_filter_builds_params_in_order() {
        let from = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let filter = EventFilter::new()
            .from_date(from)
            .limit(3)
            .ordering("start_time");

        assert_eq!(
            filter.params(),
            &[
                ("from_date".to_string(), "2026-03-01T00:00:00Z".to_string()),
                ("limit".to_string(), "3".to_string()),
                ("ordering".to_string(), "start_time".to_string()),
            ]
        );
    }
}
