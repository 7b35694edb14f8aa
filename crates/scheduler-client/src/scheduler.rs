//! Scheduler facade: normalizes requests locally, delegates to a
//! [`CalendarApi`], and keeps an undo history of its own changes.
//!
//! Validation and configuration problems are reported before the API is
//! touched. Remote failures are logged, tagged with what the scheduler was
//! doing, and returned; nothing is retried.

use std::fmt;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};
use tz_normalizer::search::{self, DEFAULT_THRESHOLD};
use tz_normalizer::when::{end_of_day, start_of_day};
use tz_normalizer::{EventRequest, NormalizedEvent, Session};

use crate::api::{ApiEvent, CalendarApi, CreateEventPayload, ListQuery};
use crate::error::{Operation, RemoteErrorKind, RemoteServiceError, Result, SchedulerError};
use crate::event::ScheduledEvent;

/// Page size for single list calls.
pub const DEFAULT_LIST_LIMIT: u32 = 100;
/// Page size when walking every page.
pub const PAGE_SIZE: u32 = 200;
/// How far back cleanup looks.
pub const CLEANUP_LOOKBACK_YEARS: u32 = 10;

/// A change the scheduler made, kept so it can be reverted.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEntry {
    Created { event_id: String },
    /// The event as it was just before deletion.
    Deleted { event_id: String, snapshot: Box<ApiEvent> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UndoOutcome {
    NothingToUndo,
    CreationUndone { event_id: String },
    DeletionUndone { event_id: String, new_event_id: String },
}

impl fmt::Display for UndoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndoOutcome::NothingToUndo => write!(f, "No actions to undo."),
            UndoOutcome::CreationUndone { event_id } => {
                write!(f, "Creation of event {} has been undone.", event_id)
            }
            UndoOutcome::DeletionUndone {
                event_id,
                new_event_id,
            } => write!(
                f,
                "Deletion of event {} has been undone. New event ID is {}.",
                event_id, new_event_id
            ),
        }
    }
}

/// Time window for a single list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindow {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
}

impl EventWindow {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
            limit: None,
        }
    }

    /// From the start of `from` up to the start of the day `days` later,
    /// local to `tz`. A zero-day window covers `from` only, through 23:59:59.
    pub fn for_days(from: NaiveDate, days: u64, tz: Tz) -> Result<Self> {
        let start = start_of_day(from, tz)?;
        let end = if days == 0 {
            end_of_day(from, tz)?
        } else {
            let last = from.checked_add_days(Days::new(days)).ok_or_else(|| {
                SchedulerError::Validation(format!("{} + {} days is out of range", from, days))
            })?;
            start_of_day(last, tz)?
        };
        Ok(Self::between(
            start.with_timezone(&Utc),
            end.with_timezone(&Utc),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    pub failed: usize,
}

pub struct Scheduler<A> {
    session: Session,
    api: A,
    history: Vec<HistoryEntry>,
}

impl<A: CalendarApi> Scheduler<A> {
    pub fn new(session: Session, api: A) -> Self {
        Self {
            session,
            api,
            history: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Normalize without contacting the service.
    pub fn normalize(&self, request: &EventRequest) -> Result<NormalizedEvent> {
        Ok(self.session.timezone().normalize(request)?)
    }

    /// Normalize `request` and create it on the session's calendar.
    pub fn create_event(&mut self, request: &EventRequest) -> Result<ScheduledEvent> {
        let normalized = self.normalize(request)?;
        let payload = CreateEventPayload::from(&normalized);

        let created = self
            .api
            .create_event(self.session.grant_id(), self.session.calendar_id(), &payload)
            .map_err(|e| remote_failure(e, format!("title '{}'", normalized.title)))?;

        info!(event_id = %created.id, start = %normalized.start_rfc3339(), "created event");
        self.history.push(HistoryEntry::Created {
            event_id: created.id.clone(),
        });

        self.convert(Operation::CreateEvent, &created)
    }

    pub fn find_event(&self, event_id: &str) -> Result<ScheduledEvent> {
        let event = self.fetch(event_id)?;
        self.convert(Operation::FindEvent, &event)
    }

    /// Delete an event, keeping a snapshot so the deletion can be undone.
    pub fn delete_event(&mut self, event_id: &str) -> Result<()> {
        let snapshot = self.fetch(event_id)?;

        self.api
            .delete_event(self.session.grant_id(), self.session.calendar_id(), event_id)
            .map_err(|e| remote_failure(e, format!("event {}", event_id)))?;

        info!(event_id, "deleted event");
        self.history.push(HistoryEntry::Deleted {
            event_id: event_id.to_string(),
            snapshot: Box::new(snapshot),
        });
        Ok(())
    }

    /// Revert the most recent create or delete. The history entry is
    /// consumed even if the revert fails remotely.
    pub fn undo_last_action(&mut self) -> Result<UndoOutcome> {
        let Some(entry) = self.history.pop() else {
            return Ok(UndoOutcome::NothingToUndo);
        };
        info!(?entry, "undoing last action");

        match entry {
            HistoryEntry::Created { event_id } => {
                self.api
                    .delete_event(self.session.grant_id(), self.session.calendar_id(), &event_id)
                    .map_err(|e| remote_failure(e, format!("undo create of {}", event_id)))?;
                Ok(UndoOutcome::CreationUndone { event_id })
            }
            HistoryEntry::Deleted { event_id, snapshot } => {
                let payload = CreateEventPayload::from(snapshot.as_ref());
                let recreated = self
                    .api
                    .create_event(self.session.grant_id(), self.session.calendar_id(), &payload)
                    .map_err(|e| remote_failure(e, format!("undo delete of {}", event_id)))?;
                Ok(UndoOutcome::DeletionUndone {
                    event_id,
                    new_event_id: recreated.id,
                })
            }
        }
    }

    /// One page of events in `window`, recurring events expanded.
    pub fn list_events(&self, window: &EventWindow) -> Result<Vec<ScheduledEvent>> {
        let query = ListQuery {
            start: window.start.timestamp(),
            end: window.end.map(|e| e.timestamp()),
            limit: window.limit.unwrap_or(DEFAULT_LIST_LIMIT),
            page_token: None,
            expand_recurring: true,
        };

        let page = self
            .api
            .list_events(self.session.grant_id(), self.session.calendar_id(), &query)
            .map_err(|e| remote_failure(e, format!("window from {}", window.start.to_rfc3339())))?;

        page.data
            .iter()
            .map(|event| self.convert(Operation::ListEvents, event))
            .collect()
    }

    /// Events in [`EventWindow::for_days`] in the session timezone.
    pub fn events_for_days(&self, from: NaiveDate, days: u64) -> Result<Vec<ScheduledEvent>> {
        let window = EventWindow::for_days(from, days, self.session.timezone().tz())?;
        self.list_events(&window)
    }

    /// Events on `day`, midnight to 23:59:59 in the session timezone.
    pub fn events_on(&self, day: NaiveDate) -> Result<Vec<ScheduledEvent>> {
        self.events_for_days(day, 0)
    }

    pub fn events_today(&self) -> Result<Vec<ScheduledEvent>> {
        self.events_on(self.today())
    }

    pub fn events_next_three_days(&self) -> Result<Vec<ScheduledEvent>> {
        self.events_for_days(self.today(), 3)
    }

    pub fn events_next_week(&self) -> Result<Vec<ScheduledEvent>> {
        self.events_for_days(self.today(), 7)
    }

    /// Every event from `start` to `end` (default: one year after `start`),
    /// following pagination cursors.
    pub fn all_events(
        &self,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScheduledEvent>> {
        let end = match end {
            Some(end) => end,
            None => start.checked_add_months(Months::new(12)).ok_or_else(|| {
                SchedulerError::Validation(format!("{} + 1 year is out of range", start))
            })?,
        };

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let query = ListQuery {
                start: start.timestamp(),
                end: Some(end.timestamp()),
                limit: PAGE_SIZE,
                page_token: page_token.take(),
                expand_recurring: false,
            };
            let page = self
                .api
                .list_events(self.session.grant_id(), self.session.calendar_id(), &query)
                .map_err(|e| remote_failure(e, "paginated listing"))?;

            for event in &page.data {
                events.push(self.convert(Operation::ListEvents, event)?);
            }

            match page.next_cursor {
                Some(cursor) => page_token = Some(cursor),
                None => break,
            }
        }

        info!(count = events.len(), "retrieved all events");
        Ok(events)
    }

    /// Events in `window` whose titles fuzzily match `query`, best first.
    pub fn search_events(
        &self,
        window: &EventWindow,
        query: &str,
        threshold: Option<u8>,
    ) -> Result<Vec<ScheduledEvent>> {
        let events = self.list_events(window)?;
        Ok(search::fuzzy_search(
            &events,
            query,
            threshold.unwrap_or(DEFAULT_THRESHOLD),
            |e| e.title.as_str(),
        )
        .into_iter()
        .cloned()
        .collect())
    }

    /// Delete events older than `days_to_keep` days.
    pub fn cleanup_calendar(&mut self, days_to_keep: u64) -> Result<CleanupReport> {
        self.cleanup_calendar_at(Utc::now(), days_to_keep)
    }

    /// [`Self::cleanup_calendar`] relative to a given `now`. Covers UTC days
    /// from ten years before `now` through the day `days_to_keep` days ago.
    /// Individual delete failures are logged and counted.
    pub fn cleanup_calendar_at(
        &mut self,
        now: DateTime<Utc>,
        days_to_keep: u64,
    ) -> Result<CleanupReport> {
        let today = now.date_naive();
        let out_of_range =
            || SchedulerError::Validation("cleanup window is out of range".to_string());
        let first = today
            .checked_sub_months(Months::new(CLEANUP_LOOKBACK_YEARS * 12))
            .ok_or_else(out_of_range)?;
        let last = today
            .checked_sub_days(Days::new(days_to_keep))
            .ok_or_else(out_of_range)?;

        let start = start_of_day(first, chrono_tz::UTC)?.with_timezone(&Utc);
        let end = end_of_day(last, chrono_tz::UTC)?.with_timezone(&Utc);

        let stale = self.all_events(start, Some(end))?;
        let mut report = CleanupReport::default();

        for event in &stale {
            match self.delete_event(&event.id) {
                Ok(()) => {
                    info!(event_id = %event.id, title = %event.title, "cleanup deleted event");
                    report.deleted += 1;
                }
                Err(err) => {
                    warn!(event_id = %event.id, %err, "cleanup could not delete event");
                    report.failed += 1;
                }
            }
        }

        info!(deleted = report.deleted, failed = report.failed, "cleanup complete");
        Ok(report)
    }

    fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.session.timezone().tz())
            .date_naive()
    }

    fn fetch(&self, event_id: &str) -> Result<ApiEvent> {
        self.api
            .find_event(self.session.grant_id(), self.session.calendar_id(), event_id)
            .map_err(|e| remote_failure(e, format!("event {}", event_id)))
    }

    fn convert(&self, op: Operation, event: &ApiEvent) -> Result<ScheduledEvent> {
        ScheduledEvent::from_api(event, self.session.timezone().tz()).map_err(|e| {
            remote_failure(
                RemoteServiceError::new(RemoteErrorKind::InvalidResponse, op, e.to_string()),
                format!("event {}", event.id),
            )
        })
    }
}

fn remote_failure(err: RemoteServiceError, context: impl Into<String>) -> SchedulerError {
    let err = err.with_context(context);
    error!(
        operation = %err.operation,
        kind = %err.kind,
        status = ?err.status,
        request_id = ?err.request_id,
        "{}",
        err.message
    );
    SchedulerError::Remote(err)
}
