//! Caller-supplied date/time values, naive or offset-qualified.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime};

use crate::error::{NormalizeError, Result};

const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// A start or end time as the caller gave it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeInput {
    /// Wall-clock time with no zone; read in the session timezone.
    Naive(NaiveDateTime),
    /// An absolute instant with an explicit UTC offset.
    Aware(DateTime<FixedOffset>),
}

impl DateTimeInput {
    pub fn is_naive(&self) -> bool {
        matches!(self, DateTimeInput::Naive(_))
    }
}

impl From<NaiveDateTime> for DateTimeInput {
    fn from(naive: NaiveDateTime) -> Self {
        DateTimeInput::Naive(naive)
    }
}

impl From<DateTime<FixedOffset>> for DateTimeInput {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        DateTimeInput::Aware(dt)
    }
}

impl FromStr for DateTimeInput {
    type Err = NormalizeError;

    /// Accepts ISO 8601 with or without seconds, with or without an offset
    /// (`Z` or `+HH:MM`), and bare dates (read as midnight).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(DateTimeInput::Aware(dt));
        }

        // chrono's `%:z` wants a numeric offset.
        let with_offset = match s.strip_suffix(['Z', 'z']) {
            Some(rest) => format!("{}+00:00", rest),
            None => s.to_string(),
        };
        for fmt in AWARE_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(&with_offset, fmt) {
                return Ok(DateTimeInput::Aware(dt));
            }
        }

        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(DateTimeInput::Naive(naive));
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(DateTimeInput::Naive(date.and_time(chrono::NaiveTime::MIN)));
        }

        Err(NormalizeError::Validation(format!(
            "unparseable date/time '{}'",
            s
        )))
    }
}

impl fmt::Display for DateTimeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeInput::Naive(naive) => write!(f, "{}", naive.format("%Y-%m-%dT%H:%M:%S")),
            DateTimeInput::Aware(dt) => write!(f, "{}", dt.to_rfc3339()),
        }
    }
}

/// Where an event ends: at a given time, or after a fixed elapsed duration
/// from its normalized start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventEnd {
    At(DateTimeInput),
    After(Duration),
}

impl EventEnd {
    /// # Errors
    /// Returns `NormalizeError::Validation` when `minutes` is outside the
    /// range `chrono` can represent.
    pub fn minutes(minutes: i64) -> Result<Self> {
        Duration::try_minutes(minutes).map(EventEnd::After).ok_or_else(|| {
            NormalizeError::Validation(format!(
                "event duration of {} minutes is out of range",
                minutes
            ))
        })
    }
}

impl From<DateTimeInput> for EventEnd {
    fn from(input: DateTimeInput) -> Self {
        EventEnd::At(input)
    }
}
