//! # scheduler-client
//!
//! A scheduler over a remote calendar service. Requests are normalized by
//! [`tz_normalizer`] before any network traffic; the service itself sits
//! behind the [`CalendarApi`] trait.
//!
//! ## Modules
//!
//! - [`api`] — `CalendarApi` capability trait and wire types
//! - [`http`] — blocking `reqwest` implementation for the Nylas v3 API
//! - [`scheduler`] — create/find/delete/list/cleanup plus undo history
//! - [`event`] — `ScheduledEvent`, the application view of a remote event
//! - [`error`] — validation, configuration and remote service errors

pub mod api;
pub mod error;
pub mod event;
pub mod http;
pub mod scheduler;

pub use api::{ApiEvent, CalendarApi, CreateEventPayload, ListQuery, Page, Participant};
pub use error::{Operation, RemoteErrorKind, RemoteServiceError, SchedulerError};
pub use event::ScheduledEvent;
pub use http::{ApiConfig, HttpCalendarApi};
pub use scheduler::{CleanupReport, EventWindow, HistoryEntry, Scheduler, UndoOutcome};
