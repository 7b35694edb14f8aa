//! Tests for event normalization: naive and aware inputs, DST, validation
//! and configuration failures.

use chrono::{Duration, TimeZone, Utc};
use tz_normalizer::{
    normalize, DateTimeInput, DstPolicy, EventEnd, EventRequest, NormalizeError, TimezoneContext,
    Visibility,
};

fn input(s: &str) -> DateTimeInput {
    s.parse().expect("test input should parse")
}

fn new_york() -> TimezoneContext {
    TimezoneContext::new("America/New_York").expect("valid timezone")
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn team_sync_naive_times_read_in_context_zone() {
    // DST began at 02:00 on 2024-03-10, so 09:00 is EDT (UTC-4).
    let request = EventRequest::new(
        "Team Sync",
        input("2024-03-10T09:00"),
        input("2024-03-10T10:00"),
    );

    let event = new_york().normalize(&request).expect("should normalize");

    assert_eq!(event.title, "Team Sync");
    assert_eq!(event.start_rfc3339(), "2024-03-10T09:00:00-04:00");
    assert_eq!(event.end_rfc3339(), "2024-03-10T10:00:00-04:00");
    assert_eq!(event.timezone, chrono_tz::America::New_York);
}

#[test]
fn naive_time_before_dst_change_uses_standard_offset() {
    let request = EventRequest::new(
        "Early",
        input("2024-03-09T09:00"),
        input("2024-03-09T10:00"),
    );
    let event = new_york().normalize(&request).unwrap();
    assert_eq!(event.start_rfc3339(), "2024-03-09T09:00:00-05:00");
}

#[test]
fn aware_time_converted_preserving_instant() {
    let request = EventRequest::new(
        "Call",
        input("2024-06-01T14:00+01:00"),
        input("2024-06-01T15:00+01:00"),
    );

    let event = new_york().normalize(&request).unwrap();

    assert_eq!(event.start_rfc3339(), "2024-06-01T09:00:00-04:00");
    assert_eq!(
        event.start.with_timezone(&Utc),
        Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap()
    );
}

#[test]
fn mixed_naive_and_aware_inputs() {
    let request = EventRequest::new(
        "Mixed",
        input("2024-06-01T09:00"),
        input("2024-06-01T14:30Z"),
    );
    let event = new_york().normalize(&request).unwrap();
    assert_eq!(event.start_rfc3339(), "2024-06-01T09:00:00-04:00");
    assert_eq!(event.end_rfc3339(), "2024-06-01T10:30:00-04:00");
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

#[test]
fn default_duration_is_thirty_minutes() {
    let request = EventRequest::starting_at("Standup", input("2023-10-15T10:00:00"));
    let event = new_york().normalize(&request).unwrap();
    assert_eq!(event.duration(), Duration::minutes(30));
    assert_eq!(event.end_rfc3339(), "2023-10-15T10:30:00-04:00");
}

#[test]
fn duration_across_spring_forward_is_elapsed_time() {
    // 01:30 EST + 60 minutes of real time = 03:30 EDT.
    let request = EventRequest::new(
        "Overnight",
        input("2024-03-10T01:30"),
        EventEnd::minutes(60).unwrap(),
    );
    let event = new_york().normalize(&request).unwrap();
    assert_eq!(event.end_rfc3339(), "2024-03-10T03:30:00-04:00");
}

#[test]
fn negative_duration_is_validation_error() {
    let request = EventRequest::new(
        "Backwards",
        input("2024-03-10T09:00"),
        EventEnd::minutes(-5).unwrap(),
    );
    assert!(matches!(
        new_york().normalize(&request),
        Err(NormalizeError::Validation(_))
    ));
}

#[test]
fn zero_duration_is_valid() {
    let request = EventRequest::new(
        "Reminder",
        input("2024-03-10T09:00"),
        input("2024-03-10T09:00"),
    );
    let event = new_york().normalize(&request).unwrap();
    assert_eq!(event.start, event.end);
}

// ---------------------------------------------------------------------------
// Validation and configuration failures
// ---------------------------------------------------------------------------

#[test]
fn end_before_start_is_validation_error() {
    let request = EventRequest::new(
        "Inverted",
        input("2024-03-10T10:00"),
        input("2024-03-10T09:00"),
    );
    let err = new_york().normalize(&request).unwrap_err();
    assert!(matches!(err, NormalizeError::Validation(_)));
    assert!(err.to_string().contains("precedes"));
}

#[test]
fn end_before_start_detected_across_offsets() {
    // 10:00+02:00 is 08:00Z, before 09:00Z.
    let request = EventRequest::new(
        "Offsets",
        input("2024-06-01T09:00Z"),
        input("2024-06-01T10:00+02:00"),
    );
    assert!(matches!(
        new_york().normalize(&request),
        Err(NormalizeError::Validation(_))
    ));
}

#[test]
fn unknown_context_timezone_is_configuration_error() {
    assert!(matches!(
        TimezoneContext::new("Atlantis/Lost_City"),
        Err(NormalizeError::Configuration(_))
    ));
    assert!(matches!(
        TimezoneContext::new(""),
        Err(NormalizeError::Configuration(_))
    ));
}

#[test]
fn unknown_override_timezone_is_configuration_error() {
    let request = EventRequest::new(
        "Elsewhere",
        input("2024-03-10T09:00"),
        input("2024-03-10T10:00"),
    )
    .in_timezone("Nowhere/Special");
    assert!(matches!(
        new_york().normalize(&request),
        Err(NormalizeError::Configuration(_))
    ));
}

#[test]
fn override_timezone_takes_precedence() {
    let request = EventRequest::new(
        "Tokyo",
        input("2024-03-10T09:00"),
        input("2024-03-10T10:00"),
    )
    .in_timezone("Asia/Tokyo");
    let event = new_york().normalize(&request).unwrap();
    assert_eq!(event.start_rfc3339(), "2024-03-10T09:00:00+09:00");
    assert_eq!(event.timezone, chrono_tz::Asia::Tokyo);
}

#[test]
fn reject_policy_refuses_nonexistent_start() {
    let ctx = new_york().with_dst_policy(DstPolicy::Reject);
    let request = EventRequest::new(
        "Gap",
        input("2024-03-10T02:30"),
        EventEnd::minutes(30).unwrap(),
    );
    assert!(matches!(
        ctx.normalize(&request),
        Err(NormalizeError::Validation(_))
    ));
}

// ---------------------------------------------------------------------------
// Descriptive fields and idempotence
// ---------------------------------------------------------------------------

#[test]
fn descriptive_fields_carried_through() {
    let request = EventRequest::starting_at("Team Meeting", input("2023-10-15T10:00:00"))
        .with_location("Conference Room A")
        .with_description("Monthly team sync-up meeting.")
        .with_participants(["alice@example.com", "bob@example.com"])
        .with_metadata("team", "platform")
        .with_visibility(Visibility::Private)
        .with_busy(true)
        .with_capacity(10)
        .with_hidden_participants(false);

    let event = new_york().normalize(&request).unwrap();

    assert_eq!(event.location.as_deref(), Some("Conference Room A"));
    assert_eq!(event.participants.len(), 2);
    assert_eq!(event.metadata.get("team").map(String::as_str), Some("platform"));
    assert_eq!(event.visibility, Some(Visibility::Private));
    assert_eq!(event.capacity, Some(10));
}

#[test]
fn normalizing_twice_is_identical() {
    let request = EventRequest::new(
        "Team Sync",
        input("2024-03-10T09:00"),
        input("2024-03-10T10:00"),
    )
    .with_recurrence(["RRULE:FREQ=WEEKLY;COUNT=4"]);

    let ctx = new_york();
    let once = normalize(&ctx, &request).unwrap();
    let twice = normalize(&ctx, &once.to_request()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn normalized_event_serializes_with_offsets() {
    let request = EventRequest::new(
        "Team Sync",
        input("2024-03-10T09:00"),
        input("2024-03-10T10:00"),
    );
    let event = new_york().normalize(&request).unwrap();
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["start"], "2024-03-10T09:00:00-04:00");
    assert_eq!(json["timezone"], "America/New_York");
    assert!(json.get("participants").is_none());
}
