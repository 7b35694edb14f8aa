//! Blocking HTTP implementation of [`CalendarApi`] for the Nylas v3 REST API.
//!
//! Events live under `/v3/grants/{grant_id}/events`. Every response body is
//! an envelope `{ "request_id", "data", "next_cursor" }`; failures carry
//! `{ "request_id", "error": { "type", "message" } }` instead.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::ACCEPT;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use tz_normalizer::Credentials;

use crate::api::{ApiEvent, CalendarApi, CreateEventPayload, ListQuery, Page, RemoteResult};
use crate::error::{Operation, RemoteErrorKind, RemoteServiceError, Result, SchedulerError};

pub const DEFAULT_API_URI: &str = "https://api.us.nylas.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub api_uri: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_uri: DEFAULT_API_URI.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    request_id: Option<String>,
    data: T,
    #[serde(default)]
    next_cursor: Option<String>,
}

pub struct HttpCalendarApi {
    client: Client,
    base: Url,
    api_key: String,
}

impl HttpCalendarApi {
    /// # Errors
    /// Returns `SchedulerError::Configuration` if the API URI is not an
    /// absolute http(s) URL or the HTTP client cannot be built.
    pub fn new(credentials: &Credentials, config: &ApiConfig) -> Result<Self> {
        let base = Url::parse(&config.api_uri).map_err(|e| {
            SchedulerError::Configuration(format!("invalid API URI '{}': {}", config.api_uri, e))
        })?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(SchedulerError::Configuration(format!(
                "API URI '{}' must be an http(s) URL",
                config.api_uri
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("calendar-shim/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SchedulerError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base,
            api_key: credentials.api_key().to_string(),
        })
    }

    fn events_url(&self, op: Operation, grant_id: &str, event_id: Option<&str>) -> RemoteResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                RemoteServiceError::new(RemoteErrorKind::Transport, op, "API URI cannot be a base")
            })?;
            segments
                .pop_if_empty()
                .extend(["v3", "grants", grant_id, "events"]);
            if let Some(id) = event_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn execute(&self, op: Operation, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| transport_error(op, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_else(|e| {
            warn!(
                operation = %op,
                status = status.as_u16(),
                error = %e,
                "could not read error response body"
            );
            String::new()
        });
        Err(RemoteServiceError::from_status(op, status.as_u16(), &body))
    }

    fn decode<T: DeserializeOwned>(op: Operation, response: Response) -> RemoteResult<Envelope<T>> {
        let envelope: Envelope<T> = response.json().map_err(|e| {
            RemoteServiceError::new(RemoteErrorKind::InvalidResponse, op, e.to_string())
        })?;
        debug!(
            operation = %op,
            request_id = envelope.request_id.as_deref().unwrap_or("-"),
            "calendar API call succeeded"
        );
        Ok(envelope)
    }
}

fn transport_error(op: Operation, err: &reqwest::Error) -> RemoteServiceError {
    let kind = if err.is_timeout() {
        RemoteErrorKind::Timeout
    } else {
        RemoteErrorKind::Transport
    };
    RemoteServiceError::new(kind, op, err.to_string())
}

impl CalendarApi for HttpCalendarApi {
    fn create_event(
        &self,
        grant_id: &str,
        calendar_id: &str,
        payload: &CreateEventPayload,
    ) -> RemoteResult<ApiEvent> {
        let op = Operation::CreateEvent;
        let url = self.events_url(op, grant_id, None)?;
        let request = self
            .client
            .post(url)
            .query(&[("calendar_id", calendar_id), ("notify_participants", "false")])
            .json(payload);
        let response = self.execute(op, request)?;
        Ok(Self::decode::<ApiEvent>(op, response)?.data)
    }

    fn find_event(
        &self,
        grant_id: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> RemoteResult<ApiEvent> {
        let op = Operation::FindEvent;
        let url = self.events_url(op, grant_id, Some(event_id))?;
        let request = self.client.get(url).query(&[("calendar_id", calendar_id)]);
        let response = self.execute(op, request)?;
        Ok(Self::decode::<ApiEvent>(op, response)?.data)
    }

    fn list_events(
        &self,
        grant_id: &str,
        calendar_id: &str,
        query: &ListQuery,
    ) -> RemoteResult<Page<ApiEvent>> {
        let op = Operation::ListEvents;
        let url = self.events_url(op, grant_id, None)?;

        let mut params: Vec<(&str, String)> = vec![
            ("calendar_id", calendar_id.to_string()),
            ("start", query.start.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let Some(end) = query.end {
            params.push(("end", end.to_string()));
        }
        if let Some(token) = &query.page_token {
            params.push(("page_token", token.clone()));
        }
        if query.expand_recurring {
            params.push(("expand_recurring", "true".to_string()));
        }

        let response = self.execute(op, self.client.get(url).query(&params))?;
        let envelope = Self::decode::<Vec<ApiEvent>>(op, response)?;
        Ok(Page {
            data: envelope.data,
            next_cursor: envelope.next_cursor.filter(|c| !c.is_empty()),
        })
    }

    fn delete_event(&self, grant_id: &str, calendar_id: &str, event_id: &str) -> RemoteResult<()> {
        let op = Operation::DeleteEvent;
        let url = self.events_url(op, grant_id, Some(event_id))?;
        let request = self.client.delete(url).query(&[("calendar_id", calendar_id)]);
        self.execute(op, request)?;
        Ok(())
    }
}
