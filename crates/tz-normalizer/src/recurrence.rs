//! Recurrence checks and previews.
//!
//! Lines are RFC 5545 properties as the calendar API stores them
//! (`RRULE:FREQ=WEEKLY;BYDAY=MO`, `EXDATE:...`). Rules are parsed with the
//! `rrule` crate against a `DTSTART;TZID=` built from the normalized start,
//! so a rule that cannot be expanded is caught before it reaches the remote
//! service.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::error::{NormalizeError, Result};
use crate::request::NormalizedEvent;

/// Upper bound on previewed occurrences.
pub const MAX_PREVIEW: u16 = 500;

const KNOWN_PREFIXES: &[&str] = &["RRULE:", "EXRULE:", "RDATE", "EXDATE"];

/// One concrete occurrence of a (possibly recurring) event.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Check every recurrence line against an event starting at `start`.
///
/// The lines are parsed together as one set, so malformed `EXDATE`, `RDATE`
/// and `EXRULE` values are caught as well as bad rules.
///
/// # Errors
/// Returns `NormalizeError::Validation` for blank lines, unknown properties,
/// or a set the `rrule` crate rejects.
pub fn validate(lines: &[String], start: &DateTime<Tz>) -> Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    parse_set(lines, start).map(|_| ())
}

/// Expand the first `limit` occurrences of `event` (capped at [`MAX_PREVIEW`]).
///
/// A non-recurring event yields its single occurrence. Each occurrence keeps
/// the event's duration and is expressed in the event's timezone.
pub fn preview_occurrences(event: &NormalizedEvent, limit: u16) -> Result<Vec<Occurrence>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let duration: Duration = event.duration();
    if event.recurrence.is_empty() {
        return Ok(vec![Occurrence {
            start: event.start,
            end: event.end,
        }]);
    }

    let rrule_set = parse_set(&event.recurrence, &event.start)?;
    let instances = rrule_set.all(limit.min(MAX_PREVIEW));
    Ok(instances
        .dates
        .into_iter()
        .map(|dt| {
            let start = dt.with_timezone(&event.timezone);
            Occurrence {
                start,
                end: start + duration,
            }
        })
        .collect())
}

fn parse_set(lines: &[String], start: &DateTime<Tz>) -> Result<RRuleSet> {
    let mut text = dtstart_line(start);
    for line in lines {
        let trimmed = line.trim();
        let upper = trimmed.to_uppercase();
        if !KNOWN_PREFIXES.iter().any(|p| upper.starts_with(p)) {
            return Err(NormalizeError::Validation(format!(
                "unsupported recurrence line '{}'",
                trimmed
            )));
        }
        text.push('\n');
        text.push_str(trimmed);
    }

    text.parse()
        .map_err(|e| NormalizeError::Validation(format!("invalid recurrence: {}", e)))
}

fn dtstart_line(start: &DateTime<Tz>) -> String {
    format!(
        "DTSTART;TZID={}:{}",
        start.timezone().name(),
        start.format("%Y%m%dT%H%M%S")
    )
}
