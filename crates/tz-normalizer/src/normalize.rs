//! Normalization: naive or offset-qualified request times become absolute
//! instants in the effective timezone.
//!
//! - A naive time is read as wall-clock time in the effective timezone,
//!   with DST gaps and overlaps resolved by the context's [`DstPolicy`].
//! - An aware time keeps its instant and is re-expressed in the effective
//!   timezone.
//!
//! Nothing here performs I/O. Validation and configuration failures surface
//! before any remote call is attempted.
//!
//! [`DstPolicy`]: crate::dst::DstPolicy

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::debug;

use crate::context::{resolve_timezone, TimezoneContext};
use crate::dst::resolve_local;
use crate::error::{NormalizeError, Result};
use crate::input::{DateTimeInput, EventEnd};
use crate::recurrence;
use crate::request::{EventRequest, NormalizedEvent};

impl TimezoneContext {
    /// Express a single input time as an instant in this context's timezone.
    pub fn normalize_time(&self, input: &DateTimeInput) -> Result<DateTime<Tz>> {
        to_zone(self, self.tz(), input)
    }

    /// Normalize a full event request. See [`normalize`].
    pub fn normalize(&self, request: &EventRequest) -> Result<NormalizedEvent> {
        normalize(self, request)
    }
}

/// Normalize `request` under `ctx`.
///
/// The request's own `timezone` takes precedence over the context default.
///
/// # Errors
/// - `NormalizeError::Configuration` if the override timezone is unknown.
/// - `NormalizeError::Validation` if the end precedes the start, a duration
///   is negative, a wall time is rejected by the DST policy, or a
///   recurrence line does not parse.
pub fn normalize(ctx: &TimezoneContext, request: &EventRequest) -> Result<NormalizedEvent> {
    let tz = match request.timezone.as_deref() {
        Some(id) => resolve_timezone(id)?,
        None => ctx.tz(),
    };

    let start = to_zone(ctx, tz, &request.start)?;
    let end = match &request.end {
        EventEnd::At(input) => to_zone(ctx, tz, input)?,
        EventEnd::After(duration) => {
            if *duration < chrono::Duration::zero() {
                return Err(NormalizeError::Validation(format!(
                    "event duration is negative ({} minutes)",
                    duration.num_minutes()
                )));
            }
            start.checked_add_signed(*duration).ok_or_else(|| {
                NormalizeError::Validation("event end is out of range".to_string())
            })?
        }
    };

    if end < start {
        return Err(NormalizeError::Validation(format!(
            "event end {} precedes start {}",
            end.to_rfc3339(),
            start.to_rfc3339()
        )));
    }

    recurrence::validate(&request.recurrence, &start)?;

    debug!(
        title = %request.title,
        start = %start.to_rfc3339(),
        end = %end.to_rfc3339(),
        timezone = %tz,
        "normalized event request"
    );

    Ok(NormalizedEvent {
        title: request.title.clone(),
        start,
        end,
        timezone: tz,
        all_day: request.all_day,
        participants: request.participants.clone(),
        description: request.description.clone(),
        location: request.location.clone(),
        recurrence: request.recurrence.clone(),
        metadata: request.metadata.clone(),
        visibility: request.visibility,
        busy: request.busy,
        capacity: request.capacity,
        hide_participants: request.hide_participants,
    })
}

fn to_zone(ctx: &TimezoneContext, tz: Tz, input: &DateTimeInput) -> Result<DateTime<Tz>> {
    match input {
        DateTimeInput::Naive(naive) => resolve_local(&tz, *naive, ctx.dst_policy()),
        DateTimeInput::Aware(dt) => Ok(dt.with_timezone(&tz)),
    }
}
