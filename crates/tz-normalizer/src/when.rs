//! Wire shapes for event times, and conversion in both directions.
//!
//! The calendar API describes when an event happens as one of four tagged
//! objects: a point in time, a span of epoch seconds, a single date, or a
//! span of dates. Outbound, a [`NormalizedEvent`] picks the right shape.
//! Inbound, [`parse_when`] turns any of them back into zone-aware instants.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{NormalizeError, Result};
use crate::request::NormalizedEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object", rename_all = "lowercase")]
pub enum When {
    Time {
        time: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timezone: Option<String>,
    },
    Timespan {
        start_time: i64,
        end_time: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start_timezone: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end_timezone: Option<String>,
    },
    Date {
        date: NaiveDate,
    },
    Datespan {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
}

/// Start, end and all-day flag recovered from a [`When`].
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub all_day: bool,
}

impl NormalizedEvent {
    /// The outbound wire shape: a timespan in epoch seconds, or a date/date
    /// span for all-day events.
    pub fn when(&self) -> When {
        if self.all_day {
            let start_date = self.start.date_naive();
            let end_date = self.end.date_naive();
            if start_date == end_date {
                When::Date { date: start_date }
            } else {
                When::Datespan {
                    start_date,
                    end_date,
                }
            }
        } else {
            let zone = Some(self.timezone.name().to_string());
            When::Timespan {
                start_time: self.start.timestamp(),
                end_time: self.end.timestamp(),
                start_timezone: zone.clone(),
                end_timezone: zone,
            }
        }
    }
}

/// Convert a remote [`When`] into zone-aware instants.
///
/// Timed shapes keep the zone the remote service reported; a blank or
/// unknown zone falls back to `fallback`. Date shapes cover whole days in
/// `fallback`, from midnight to 23:59:59.
pub fn parse_when(when: &When, fallback: Tz) -> Result<Span> {
    match when {
        When::Time { time, timezone } => {
            let tz = zone_or(timezone.as_deref(), fallback);
            let at = from_timestamp(*time, tz)?;
            Ok(Span {
                start: at,
                end: at,
                all_day: false,
            })
        }
        When::Timespan {
            start_time,
            end_time,
            start_timezone,
            end_timezone,
        } => Ok(Span {
            start: from_timestamp(*start_time, zone_or(start_timezone.as_deref(), fallback))?,
            end: from_timestamp(*end_time, zone_or(end_timezone.as_deref(), fallback))?,
            all_day: false,
        }),
        When::Date { date } => Ok(Span {
            start: start_of_day(*date, fallback)?,
            end: end_of_day(*date, fallback)?,
            all_day: true,
        }),
        When::Datespan {
            start_date,
            end_date,
        } => Ok(Span {
            start: start_of_day(*start_date, fallback)?,
            end: end_of_day(*end_date, fallback)?,
            all_day: true,
        }),
    }
}

/// First instant of `date` in `tz`. Midnight skipped by DST moves forward.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>> {
    resolve_local(&tz, date.and_time(NaiveTime::MIN), DstPolicy::PostTransition)
}

/// Last whole second of `date` in `tz`.
pub fn end_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<Tz>> {
    let last = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| NormalizeError::Validation("invalid end-of-day time".to_string()))?;
    resolve_local(&tz, date.and_time(last), DstPolicy::PostTransition)
}

fn from_timestamp(secs: i64, tz: Tz) -> Result<DateTime<Tz>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.with_timezone(&tz))
        .ok_or_else(|| NormalizeError::Validation(format!("timestamp {} is out of range", secs)))
}

fn zone_or(name: Option<&str>, fallback: Tz) -> Tz {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.parse().unwrap_or_else(|_| {
            warn!(timezone = n, fallback = %fallback, "unknown remote timezone");
            fallback
        }),
        None => fallback,
    }
}
