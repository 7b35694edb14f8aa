//! `scheduler` CLI: normalize event requests offline, or create, list, delete
//! and clean up events against the calendar API.
//!
//! ## Usage
//!
//! ```sh
//! # Normalize a naive local time in New York (no network)
//! scheduler --timezone America/New_York normalize \
//!     --title "Team Sync" --start 2024-03-10T09:00 --end 2024-03-10T10:00
//!
//! # Preview the first five occurrences of a weekly rule
//! scheduler normalize --title Standup --start 2024-01-08T09:30 \
//!     --duration-minutes 15 --recurrence "RRULE:FREQ=WEEKLY;BYDAY=MO" --preview 5
//!
//! # Create an event (credentials from NYLAS_API_KEY / NYLAS_GRANT_ID)
//! scheduler --timezone Europe/London create --title Lunch --start 2024-06-01T12:00
//!
//! # Today's events, or the next seven days, optionally fuzzy-searched
//! scheduler list --today
//! scheduler list --days 7 --search "team meeting"
//!
//! # Delete one event, or everything older than 30 days
//! scheduler delete evt-123
//! scheduler cleanup --days-to-keep 30
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use scheduler_client::http::DEFAULT_API_URI;
use scheduler_client::{ApiConfig, EventWindow, HttpCalendarApi, Scheduler};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tz_normalizer::context::DEFAULT_CALENDAR_ID;
use tz_normalizer::{
    preview_occurrences, Credentials, DateTimeInput, DstPolicy, EventEnd, EventRequest, Session,
    TimezoneContext,
};

#[derive(Parser)]
#[command(
    name = "scheduler",
    version,
    about = "Timezone-normalizing calendar event scheduler"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// IANA timezone used for naive times
    #[arg(long, global = true, default_value = "UTC")]
    timezone: String,

    /// How to read local times skipped or repeated by a DST transition
    #[arg(long, global = true, default_value = "post-transition")]
    dst_policy: DstPolicy,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize an event request and print it as JSON (no network)
    Normalize {
        #[command(flatten)]
        event: EventArgs,
        /// Also print the first N occurrences
        #[arg(long)]
        preview: Option<u16>,
    },
    /// Create an event
    Create {
        #[command(flatten)]
        event: EventArgs,
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// List events in a window
    List {
        #[command(flatten)]
        remote: RemoteArgs,
        /// Only today's events
        #[arg(long, conflicts_with_all = ["days", "start"])]
        today: bool,
        /// Events from today through the next N days
        #[arg(long, conflicts_with = "start")]
        days: Option<u64>,
        /// Window start (local to --timezone unless it carries an offset)
        #[arg(long)]
        start: Option<DateTimeInput>,
        /// Window end
        #[arg(long, requires = "start")]
        end: Option<DateTimeInput>,
        /// Keep only events whose title fuzzily matches
        #[arg(long)]
        search: Option<String>,
        /// Minimum match score for --search (0-100)
        #[arg(long, requires = "search")]
        threshold: Option<u8>,
    },
    /// Delete an event by id
    Delete {
        id: String,
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Delete events older than the given number of days
    Cleanup {
        #[arg(long)]
        days_to_keep: u64,
        #[command(flatten)]
        remote: RemoteArgs,
    },
}

#[derive(Args)]
struct EventArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    start: DateTimeInput,
    #[arg(long, conflicts_with = "duration_minutes")]
    end: Option<DateTimeInput>,
    /// Length of the event when --end is omitted (default 30)
    #[arg(long)]
    duration_minutes: Option<i64>,
    #[arg(long)]
    all_day: bool,
    /// Participant email; repeat for several
    #[arg(long = "participant")]
    participants: Vec<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    location: Option<String>,
    /// RFC 5545 line such as RRULE:FREQ=WEEKLY; repeat for several
    #[arg(long)]
    recurrence: Vec<String>,
    /// Timezone for this event only, overriding --timezone
    #[arg(long)]
    event_timezone: Option<String>,
}

impl EventArgs {
    fn to_request(&self) -> Result<EventRequest> {
        let end = match (self.end, self.duration_minutes) {
            (Some(end), _) => Some(EventEnd::At(end)),
            (None, Some(minutes)) => {
                Some(EventEnd::minutes(minutes).context("Invalid --duration-minutes")?)
            }
            (None, None) => None,
        };
        let mut request = match end {
            Some(end) => EventRequest::new(self.title.as_str(), self.start, end),
            None => EventRequest::starting_at(self.title.as_str(), self.start),
        }
        .with_participants(self.participants.iter().cloned())
        .with_recurrence(self.recurrence.iter().cloned());

        if let Some(description) = &self.description {
            request = request.with_description(description.as_str());
        }
        if let Some(location) = &self.location {
            request = request.with_location(location.as_str());
        }
        if let Some(tz) = &self.event_timezone {
            request = request.in_timezone(tz.as_str());
        }
        if self.all_day {
            request = request.all_day();
        }
        Ok(request)
    }
}

#[derive(Args)]
struct RemoteArgs {
    #[arg(long, env = "NYLAS_API_KEY", hide_env_values = true)]
    api_key: String,
    #[arg(long, env = "NYLAS_GRANT_ID")]
    grant_id: String,
    #[arg(long, env = "NYLAS_API_URI", default_value = DEFAULT_API_URI)]
    api_uri: String,
    #[arg(long, default_value = DEFAULT_CALENDAR_ID)]
    calendar_id: String,
    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 90)]
    timeout_secs: u64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let context = TimezoneContext::new(&cli.timezone)
        .context("Invalid --timezone")?
        .with_dst_policy(cli.dst_policy);

    match cli.command {
        Commands::Normalize { event, preview } => {
            let normalized = context
                .normalize(&event.to_request()?)
                .context("Failed to normalize event")?;
            let mut output = serde_json::to_value(&normalized)?;
            if let Some(limit) = preview {
                let occurrences: Vec<serde_json::Value> = preview_occurrences(&normalized, limit)
                    .context("Failed to expand recurrence")?
                    .into_iter()
                    .map(|o| {
                        serde_json::json!({
                            "start": o.start.to_rfc3339(),
                            "end": o.end.to_rfc3339(),
                        })
                    })
                    .collect();
                output = serde_json::json!({ "event": output, "occurrences": occurrences });
            }
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Create { event, remote } => {
            let mut scheduler = connect(&remote, context)?;
            let created = scheduler
                .create_event(&event.to_request()?)
                .context("Failed to create event")?;
            info!(event_id = %created.id, "event created");
            println!("{}", serde_json::to_string_pretty(&created)?);
        }
        Commands::List {
            remote,
            today,
            days,
            start,
            end,
            search,
            threshold,
        } => {
            let scheduler = connect(&remote, context)?;
            let window = match (start, days) {
                (Some(start), _) => EventWindow {
                    start: context.normalize_time(&start)?.with_timezone(&Utc),
                    end: end
                        .map(|e| context.normalize_time(&e))
                        .transpose()?
                        .map(|e| e.with_timezone(&Utc)),
                    limit: None,
                },
                (None, days) => {
                    let days = if today { 0 } else { days.unwrap_or(0) };
                    let local_today = Utc::now().with_timezone(&context.tz()).date_naive();
                    EventWindow::for_days(local_today, days, context.tz())?
                }
            };
            let events = match search.as_deref() {
                Some(query) => scheduler.search_events(&window, query, threshold),
                None => scheduler.list_events(&window),
            }
            .context("Failed to list events")?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        Commands::Delete { id, remote } => {
            let mut scheduler = connect(&remote, context)?;
            scheduler
                .delete_event(&id)
                .with_context(|| format!("Failed to delete event {}", id))?;
            println!("Deleted event {}", id);
        }
        Commands::Cleanup {
            days_to_keep,
            remote,
        } => {
            let mut scheduler = connect(&remote, context)?;
            let report = scheduler
                .cleanup_calendar(days_to_keep)
                .context("Failed to clean up calendar")?;
            println!(
                "Deleted {} events ({} failed)",
                report.deleted, report.failed
            );
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scheduler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn connect(remote: &RemoteArgs, context: TimezoneContext) -> Result<Scheduler<HttpCalendarApi>> {
    let credentials = Credentials::new(remote.api_key.as_str(), remote.grant_id.as_str())
        .context("Invalid credentials")?;
    let session = Session::new(credentials, context)
        .with_calendar_id(remote.calendar_id.as_str())
        .context("Invalid --calendar-id")?;
    let config = ApiConfig {
        api_uri: remote.api_uri.clone(),
        timeout: Duration::from_secs(remote.timeout_secs),
    };
    let api = HttpCalendarApi::new(session.credentials(), &config)
        .context("Failed to configure the calendar API client")?;
    Ok(Scheduler::new(session, api))
}
