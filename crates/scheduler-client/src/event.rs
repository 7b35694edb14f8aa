//! Application view of events returned by the calendar service.

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;
use tz_normalizer::{html_to_plain_text, parse_when, NormalizeError};

use crate::api::ApiEvent;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledEvent {
    pub id: String,
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Plain text; HTML from the service is flattened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ScheduledEvent {
    /// Convert a service event, reading date-only times in `timezone`.
    pub fn from_api(event: &ApiEvent, timezone: Tz) -> Result<Self, NormalizeError> {
        let span = parse_when(&event.when, timezone)?;
        Ok(Self {
            id: event.id.clone(),
            title: event.title.clone().unwrap_or_default(),
            start: span.start,
            end: span.end,
            all_day: span.all_day,
            location: event.location.clone(),
            description: html_to_plain_text(event.description.as_deref()),
            attendees: event
                .participants
                .iter()
                .flatten()
                .map(|p| p.email.clone())
                .collect(),
            metadata: event.metadata.clone().unwrap_or_default(),
        })
    }
}
