//! DST transition policies for wall-clock times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{NormalizeError, Result};

/// How far from a nonexistent wall time to look for the surrounding UTC offset.
/// Transition gaps in the tz database are at most a couple of hours.
const GAP_PROBE_HOURS: i64 = 3;

/// Policy for wall-clock times that fall in a DST transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DstPolicy {
    /// Ambiguous times take the later instant; times in a gap are read with
    /// the pre-gap offset and land after it (02:30 becomes 03:30).
    #[default]
    PostTransition,
    /// Ambiguous times take the earlier instant; times in a gap are read with
    /// the post-gap offset and land before it (02:30 becomes 01:30).
    PreTransition,
    /// Ambiguous and nonexistent wall times are validation errors.
    Reject,
}

impl std::str::FromStr for DstPolicy {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "post-transition" => Ok(DstPolicy::PostTransition),
            "pre-transition" => Ok(DstPolicy::PreTransition),
            "reject" => Ok(DstPolicy::Reject),
            other => Err(NormalizeError::Configuration(format!(
                "unknown DST policy '{}' (expected post-transition, pre-transition or reject)",
                other
            ))),
        }
    }
}

/// Resolve a wall-clock time in `tz` to an absolute instant.
///
/// # Errors
/// Returns `NormalizeError::Validation` when the policy is `Reject` and the
/// wall time is ambiguous or skipped.
pub fn resolve_local(tz: &Tz, naive: NaiveDateTime, policy: DstPolicy) -> Result<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, latest) => match policy {
            DstPolicy::PostTransition => Ok(latest),
            DstPolicy::PreTransition => Ok(earliest),
            DstPolicy::Reject => Err(NormalizeError::Validation(format!(
                "{} is ambiguous in {} (repeated by a DST transition)",
                naive, tz
            ))),
        },
        LocalResult::None => resolve_gap(tz, naive, policy),
    }
}

fn resolve_gap(tz: &Tz, naive: NaiveDateTime, policy: DstPolicy) -> Result<DateTime<Tz>> {
    let probe = match policy {
        DstPolicy::PostTransition => naive - Duration::hours(GAP_PROBE_HOURS),
        DstPolicy::PreTransition => naive + Duration::hours(GAP_PROBE_HOURS),
        DstPolicy::Reject => {
            return Err(NormalizeError::Validation(format!(
                "{} does not exist in {} (skipped by a DST transition)",
                naive, tz
            )))
        }
    };

    let offset = tz
        .from_local_datetime(&probe)
        .earliest()
        .map(|dt| dt.offset().fix())
        .ok_or_else(|| {
            NormalizeError::Validation(format!("cannot resolve {} in {}", naive, tz))
        })?;

    let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
    Ok(tz.from_utc_datetime(&utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn spring_forward_gap_shifts_forward_by_default() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = resolve_local(&tz, at(2024, 3, 10, 2, 30), DstPolicy::default()).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T03:30:00-04:00");
    }

    #[test]
    fn spring_forward_gap_pre_transition_lands_before() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let dt = resolve_local(&tz, at(2024, 3, 10, 2, 30), DstPolicy::PreTransition).unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-10T01:30:00-05:00");
    }

    #[test]
    fn fall_back_ambiguity_follows_policy() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let later = resolve_local(&tz, at(2024, 11, 3, 1, 30), DstPolicy::PostTransition).unwrap();
        let earlier = resolve_local(&tz, at(2024, 11, 3, 1, 30), DstPolicy::PreTransition).unwrap();
        assert_eq!(later.to_rfc3339(), "2024-11-03T01:30:00-05:00");
        assert_eq!(earlier.to_rfc3339(), "2024-11-03T01:30:00-04:00");
    }

    #[test]
    fn reject_policy_refuses_gap_and_ambiguity() {
        let tz: Tz = "America/New_York".parse().unwrap();
        assert!(matches!(
            resolve_local(&tz, at(2024, 3, 10, 2, 30), DstPolicy::Reject),
            Err(NormalizeError::Validation(_))
        ));
        assert!(matches!(
            resolve_local(&tz, at(2024, 11, 3, 1, 30), DstPolicy::Reject),
            Err(NormalizeError::Validation(_))
        ));
    }

    #[test]
    fn policy_parses_from_cli_names() {
        assert_eq!("reject".parse::<DstPolicy>().unwrap(), DstPolicy::Reject);
        assert!("sideways".parse::<DstPolicy>().is_err());
    }
}
