//! Error types for scheduler operations.
//!
//! Callers see three kinds: validation and configuration failures raised
//! locally before any remote call, and remote service failures classified
//! from whatever the calendar API reported.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;
use tz_normalizer::NormalizeError;

/// The remote call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateEvent,
    FindEvent,
    ListEvents,
    DeleteEvent,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CreateEvent => "create event",
            Operation::FindEvent => "find event",
            Operation::ListEvents => "list events",
            Operation::DeleteEvent => "delete event",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// 401 or 403: bad API key or revoked grant.
    Authentication,
    /// 429.
    RateLimited,
    /// 404 or 410.
    NotFound,
    /// Any other 4xx: the service refused the request.
    Rejected,
    /// 5xx.
    Server,
    /// The HTTP client gave up waiting.
    Timeout,
    /// Connection, TLS or other transport failure.
    Transport,
    /// A success response whose body could not be decoded.
    InvalidResponse,
}

impl RemoteErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => RemoteErrorKind::Authentication,
            404 | 410 => RemoteErrorKind::NotFound,
            429 => RemoteErrorKind::RateLimited,
            500..=599 => RemoteErrorKind::Server,
            _ => RemoteErrorKind::Rejected,
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteErrorKind::Authentication => "authentication",
            RemoteErrorKind::RateLimited => "rate limited",
            RemoteErrorKind::NotFound => "not found",
            RemoteErrorKind::Rejected => "rejected",
            RemoteErrorKind::Server => "server error",
            RemoteErrorKind::Timeout => "timeout",
            RemoteErrorKind::Transport => "transport",
            RemoteErrorKind::InvalidResponse => "invalid response",
        };
        f.write_str(name)
    }
}

/// A failure reported by, or while talking to, the calendar service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed ({kind}): {message}{}", context_suffix(.context))]
pub struct RemoteServiceError {
    pub kind: RemoteErrorKind,
    pub operation: Operation,
    pub status: Option<u16>,
    pub request_id: Option<String>,
    pub message: String,
    /// What the caller was doing, e.g. the event id or title.
    pub context: Option<String>,
}

fn context_suffix(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|c| format!(" [{}]", c))
        .unwrap_or_default()
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    request_id: Option<String>,
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

impl RemoteServiceError {
    pub fn new(kind: RemoteErrorKind, operation: Operation, message: impl Into<String>) -> Self {
        Self {
            kind,
            operation,
            status: None,
            request_id: None,
            message: message.into(),
            context: None,
        }
    }

    /// Classify a non-success HTTP response, reading the service's error
    /// envelope (`{"request_id", "error": {"type", "message"}}`) when present.
    pub fn from_status(operation: Operation, status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
        let request_id = envelope.as_ref().and_then(|e| e.request_id.clone());
        let (error_type, message) = envelope
            .and_then(|e| e.error)
            .map(|b| (b.kind, b.message))
            .unwrap_or((None, None));

        let message = match (error_type, message) {
            (Some(t), Some(m)) => format!("{}: {}", t, m),
            (None, Some(m)) => m,
            (Some(t), None) => t,
            (None, None) if !body.trim().is_empty() => body.trim().to_string(),
            (None, None) => format!("HTTP {}", status),
        };

        Self {
            kind: RemoteErrorKind::from_status(status),
            operation,
            status: Some(status),
            request_id,
            message,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Remote service error: {0}")]
    Remote(#[from] RemoteServiceError),
}

impl From<NormalizeError> for SchedulerError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Validation(msg) => SchedulerError::Validation(msg),
            NormalizeError::Configuration(msg) => SchedulerError::Configuration(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchedulerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        assert_eq!(RemoteErrorKind::from_status(401), RemoteErrorKind::Authentication);
        assert_eq!(RemoteErrorKind::from_status(403), RemoteErrorKind::Authentication);
        assert_eq!(RemoteErrorKind::from_status(404), RemoteErrorKind::NotFound);
        assert_eq!(RemoteErrorKind::from_status(429), RemoteErrorKind::RateLimited);
        assert_eq!(RemoteErrorKind::from_status(422), RemoteErrorKind::Rejected);
        assert_eq!(RemoteErrorKind::from_status(503), RemoteErrorKind::Server);
    }

    #[test]
    fn error_envelope_is_read() {
        let body = r#"{"request_id":"req-1","error":{"type":"invalid_request","message":"bad when"}}"#;
        let err = RemoteServiceError::from_status(Operation::CreateEvent, 400, body);
        assert_eq!(err.request_id.as_deref(), Some("req-1"));
        assert_eq!(err.message, "invalid_request: bad when");
        assert_eq!(err.kind, RemoteErrorKind::Rejected);
    }

    #[test]
    fn context_appears_in_display() {
        let err = RemoteServiceError::from_status(Operation::DeleteEvent, 404, "")
            .with_context("event evt-9");
        assert_eq!(
            err.to_string(),
            "delete event failed (not found): HTTP 404 [event evt-9]"
        );
    }
}
