//! The calendar service as a small capability set, plus its wire types.
//!
//! The scheduler only depends on [`CalendarApi`]. The HTTP implementation
//! lives in [`crate::http`]; tests substitute their own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tz_normalizer::{NormalizedEvent, Visibility, When};

use crate::error::RemoteServiceError;

pub type RemoteResult<T> = std::result::Result<T, RemoteServiceError>;

/// An event participant as the service represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Participant {
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            status: None,
        }
    }
}

/// An event as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEvent {
    pub id: String,
    #[serde(default)]
    pub calendar_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub when: When,
    #[serde(default)]
    pub location: Option<String>,
    /// May contain HTML.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub participants: Option<Vec<Participant>>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub busy: Option<bool>,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub hide_participants: Option<bool>,
    #[serde(default)]
    pub recurrence: Option<Vec<String>>,
}

/// Body of a create call. Carries no read-only fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateEventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub when: When,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub busy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_participants: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

impl From<&NormalizedEvent> for CreateEventPayload {
    fn from(event: &NormalizedEvent) -> Self {
        Self {
            title: Some(event.title.clone()),
            when: event.when(),
            location: event.location.clone(),
            description: event.description.clone(),
            participants: event
                .participants
                .iter()
                .map(|email| Participant::email(email.as_str()))
                .collect(),
            metadata: event.metadata.clone(),
            visibility: event.visibility,
            busy: event.busy,
            capacity: event.capacity.map(i64::from),
            hide_participants: event.hide_participants,
            recurrence: event.recurrence.clone(),
        }
    }
}

impl From<&ApiEvent> for CreateEventPayload {
    /// Recreate an existing event: everything except id and calendar.
    fn from(event: &ApiEvent) -> Self {
        Self {
            title: event.title.clone(),
            when: event.when.clone(),
            location: event.location.clone(),
            description: event.description.clone(),
            participants: event.participants.clone().unwrap_or_default(),
            metadata: event.metadata.clone().unwrap_or_default(),
            visibility: event.visibility,
            busy: event.busy,
            capacity: event.capacity,
            hide_participants: event.hide_participants,
            recurrence: event.recurrence.clone().unwrap_or_default(),
        }
    }
}

/// Parameters of a list call. Times are epoch seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub start: i64,
    pub end: Option<i64>,
    pub limit: u32,
    pub page_token: Option<String>,
    pub expand_recurring: bool,
}

/// One page of a list call.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub next_cursor: Option<String>,
}

/// What the scheduler needs from a calendar service.
pub trait CalendarApi {
    fn create_event(
        &self,
        grant_id: &str,
        calendar_id: &str,
        payload: &CreateEventPayload,
    ) -> RemoteResult<ApiEvent>;

    fn find_event(&self, grant_id: &str, calendar_id: &str, event_id: &str)
        -> RemoteResult<ApiEvent>;

    fn list_events(
        &self,
        grant_id: &str,
        calendar_id: &str,
        query: &ListQuery,
    ) -> RemoteResult<Page<ApiEvent>>;

    fn delete_event(&self, grant_id: &str, calendar_id: &str, event_id: &str) -> RemoteResult<()>;
}

impl<T: CalendarApi + ?Sized> CalendarApi for &T {
    fn create_event(
        &self,
        grant_id: &str,
        calendar_id: &str,
        payload: &CreateEventPayload,
    ) -> RemoteResult<ApiEvent> {
        (**self).create_event(grant_id, calendar_id, payload)
    }

    fn find_event(
        &self,
        grant_id: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> RemoteResult<ApiEvent> {
        (**self).find_event(grant_id, calendar_id, event_id)
    }

    fn list_events(
        &self,
        grant_id: &str,
        calendar_id: &str,
        query: &ListQuery,
    ) -> RemoteResult<Page<ApiEvent>> {
        (**self).list_events(grant_id, calendar_id, query)
    }

    fn delete_event(&self, grant_id: &str, calendar_id: &str, event_id: &str) -> RemoteResult<()> {
        (**self).delete_event(grant_id, calendar_id, event_id)
    }
}
