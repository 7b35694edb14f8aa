//! Tests for the HTTP calendar client against a mock server.

use std::time::Duration;

use mockito::Matcher;
use scheduler_client::{
    ApiConfig, CalendarApi, CreateEventPayload, HttpCalendarApi, ListQuery, Operation,
    RemoteErrorKind, Scheduler, SchedulerError,
};
use serde_json::json;
use tz_normalizer::{Credentials, DateTimeInput, EventRequest, Session, TimezoneContext, When};

fn credentials() -> Credentials {
    Credentials::new("test-key", "grant-123").unwrap()
}

fn client(url: &str) -> HttpCalendarApi {
    let config = ApiConfig {
        api_uri: url.to_string(),
        timeout: Duration::from_secs(5),
    };
    HttpCalendarApi::new(&credentials(), &config).expect("client builds")
}

fn event_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "calendar_id": "primary",
        "title": "Team Sync",
        "when": {
            "object": "timespan",
            "start_time": 1710075600,
            "end_time": 1710079200,
            "start_timezone": "America/New_York",
            "end_timezone": "America/New_York"
        },
        "participants": [{"email": "alice@example.com", "status": "noreply"}],
        "description": "<div>Weekly <em>sync</em></div>"
    })
}

#[test]
fn create_posts_payload_with_auth_and_query() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/v3/grants/grant-123/events")
        .match_header("authorization", "Bearer test-key")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("calendar_id".into(), "primary".into()),
            Matcher::UrlEncoded("notify_participants".into(), "false".into()),
        ]))
        .match_body(Matcher::PartialJson(json!({
            "title": "Team Sync",
            "when": {
                "object": "timespan",
                "start_time": 1710075600,
                "end_time": 1710079200,
                "start_timezone": "America/New_York"
            },
            "participants": [{"email": "alice@example.com"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"request_id": "req-1", "data": event_json("evt-1")}).to_string())
        .create();

    let session = Session::new(credentials(), TimezoneContext::new("America/New_York").unwrap());
    let mut scheduler = Scheduler::new(session, client(&server.url()));
    let request = EventRequest::new(
        "Team Sync",
        "2024-03-10T09:00".parse::<DateTimeInput>().unwrap(),
        "2024-03-10T10:00".parse::<DateTimeInput>().unwrap(),
    )
    .with_participants(["alice@example.com"]);

    let event = scheduler.create_event(&request).expect("create succeeds");

    mock.assert();
    assert_eq!(event.id, "evt-1");
    assert_eq!(event.description.as_deref().map(|d| d.contains("Weekly")), Some(true));
}

#[test]
fn list_passes_window_and_cursor() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/v3/grants/grant-123/events")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("calendar_id".into(), "work".into()),
            Matcher::UrlEncoded("start".into(), "1700000000".into()),
            Matcher::UrlEncoded("end".into(), "1700086400".into()),
            Matcher::UrlEncoded("limit".into(), "200".into()),
            Matcher::UrlEncoded("page_token".into(), "abc".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "request_id": "req-2",
                "data": [event_json("evt-1"), event_json("evt-2")],
                "next_cursor": "def"
            })
            .to_string(),
        )
        .create();

    let api = client(&server.url());
    let page = api
        .list_events(
            "grant-123",
            "work",
            &ListQuery {
                start: 1_700_000_000,
                end: Some(1_700_086_400),
                limit: 200,
                page_token: Some("abc".to_string()),
                expand_recurring: false,
            },
        )
        .expect("list succeeds");

    mock.assert();
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.next_cursor.as_deref(), Some("def"));
}

#[test]
fn delete_and_find_hit_event_path() {
    let mut server = mockito::Server::new();
    let find = server
        .mock("GET", "/v3/grants/grant-123/events/evt-9")
        .match_query(Matcher::UrlEncoded("calendar_id".into(), "primary".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"request_id": "r", "data": event_json("evt-9")}).to_string())
        .create();
    let delete = server
        .mock("DELETE", "/v3/grants/grant-123/events/evt-9")
        .match_query(Matcher::UrlEncoded("calendar_id".into(), "primary".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"request_id":"r2"}"#)
        .create();

    let session = Session::new(credentials(), TimezoneContext::default());
    let mut scheduler = Scheduler::new(session, client(&server.url()));
    scheduler.delete_event("evt-9").expect("delete succeeds");

    find.assert();
    delete.assert();
}

#[test]
fn error_statuses_are_classified() {
    let cases = [
        (401u16, RemoteErrorKind::Authentication),
        (404, RemoteErrorKind::NotFound),
        (429, RemoteErrorKind::RateLimited),
        (400, RemoteErrorKind::Rejected),
        (502, RemoteErrorKind::Server),
    ];

    for (status, kind) in cases {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/v3/grants/grant-123/events/evt-1")
            .match_query(Matcher::Any)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "request_id": "req-err",
                    "error": {"type": "api_error", "message": "nope"}
                })
                .to_string(),
            )
            .create();

        let err = client(&server.url())
            .find_event("grant-123", "primary", "evt-1")
            .unwrap_err();

        assert_eq!(err.kind, kind, "status {}", status);
        assert_eq!(err.status, Some(status));
        assert_eq!(err.operation, Operation::FindEvent);
        assert_eq!(err.request_id.as_deref(), Some("req-err"));
        assert_eq!(err.message, "api_error: nope");
    }
}

#[test]
fn error_without_body_falls_back_to_status() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("DELETE", "/v3/grants/grant-123/events/evt-1")
        .match_query(Matcher::Any)
        .with_status(503)
        .create();

    let err = client(&server.url())
        .delete_event("grant-123", "primary", "evt-1")
        .unwrap_err();

    assert_eq!(err.kind, RemoteErrorKind::Server);
    assert_eq!(err.message, "HTTP 503");
    assert_eq!(err.request_id, None);
}

#[test]
fn undecodable_body_is_invalid_response() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("POST", "/v3/grants/grant-123/events")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("not json")
        .create();

    let payload = CreateEventPayload {
        title: Some("x".to_string()),
        when: When::Time {
            time: 0,
            timezone: None,
        },
        location: None,
        description: None,
        participants: Vec::new(),
        metadata: Default::default(),
        visibility: None,
        busy: None,
        capacity: None,
        hide_participants: None,
        recurrence: Vec::new(),
    };
    let err = client(&server.url())
        .create_event("grant-123", "primary", &payload)
        .unwrap_err();
    assert_eq!(err.kind, RemoteErrorKind::InvalidResponse);
}

#[test]
fn bad_api_uri_is_configuration_error() {
    let config = ApiConfig {
        api_uri: "not a url".to_string(),
        ..ApiConfig::default()
    };
    assert!(matches!(
        HttpCalendarApi::new(&credentials(), &config),
        Err(SchedulerError::Configuration(_))
    ));
}
