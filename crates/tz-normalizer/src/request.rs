//! Event requests as callers build them, and their normalized form.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::input::{DateTimeInput, EventEnd};

/// Default event length when only a start is known.
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// A caller's intent to create an event. Times may be naive.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRequest {
    pub title: String,
    pub start: DateTimeInput,
    pub end: EventEnd,
    pub participants: Vec<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 5545 lines, e.g. `RRULE:FREQ=WEEKLY;BYDAY=MO`.
    pub recurrence: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub visibility: Option<Visibility>,
    pub busy: Option<bool>,
    pub capacity: Option<u32>,
    pub hide_participants: Option<bool>,
    pub all_day: bool,
    /// IANA identifier overriding the session timezone for this request.
    pub timezone: Option<String>,
}

impl EventRequest {
    pub fn new(title: impl Into<String>, start: DateTimeInput, end: impl Into<EventEnd>) -> Self {
        Self {
            title: title.into(),
            start,
            end: end.into(),
            participants: Vec::new(),
            description: None,
            location: None,
            recurrence: Vec::new(),
            metadata: BTreeMap::new(),
            visibility: None,
            busy: None,
            capacity: None,
            hide_participants: None,
            all_day: false,
            timezone: None,
        }
    }

    /// An event of the default length starting at `start`.
    pub fn starting_at(title: impl Into<String>, start: DateTimeInput) -> Self {
        Self::new(title, start, EventEnd::After(Duration::minutes(DEFAULT_DURATION_MINUTES)))
    }

    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_recurrence<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recurrence = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_busy(mut self, busy: bool) -> Self {
        self.busy = Some(busy);
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_hidden_participants(mut self, hide: bool) -> Self {
        self.hide_participants = Some(hide);
        self
    }

    pub fn all_day(mut self) -> Self {
        self.all_day = true;
        self
    }

    pub fn in_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// An event request whose start and end are absolute instants in the
/// effective timezone, with `start <= end`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEvent {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub timezone: Tz,
    pub all_day: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_participants: Option<bool>,
}

impl NormalizedEvent {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339()
    }

    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339()
    }

    /// Back to a request with offset-qualified times, for re-normalization.
    pub fn to_request(&self) -> EventRequest {
        EventRequest {
            title: self.title.clone(),
            start: DateTimeInput::Aware(self.start.fixed_offset()),
            end: EventEnd::At(DateTimeInput::Aware(self.end.fixed_offset())),
            participants: self.participants.clone(),
            description: self.description.clone(),
            location: self.location.clone(),
            recurrence: self.recurrence.clone(),
            metadata: self.metadata.clone(),
            visibility: self.visibility,
            busy: self.busy,
            capacity: self.capacity,
            hide_participants: self.hide_participants,
            all_day: self.all_day,
            timezone: Some(self.timezone.name().to_string()),
        }
    }
}
