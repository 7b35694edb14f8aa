//! # tz-normalizer
//!
//! Timezone-aware normalization of calendar event requests.
//!
//! Callers hand over times the way people write them: sometimes with an
//! offset, often without. The normalizer reads naive times in the session's
//! default timezone, re-expresses aware times in it, and checks that the
//! result is a well-formed event before anything is sent to a remote
//! calendar service.
//!
//! ## Quick start
//!
//! ```rust
//! use tz_normalizer::{EventRequest, TimezoneContext};
//!
//! let ctx = TimezoneContext::new("America/New_York").unwrap();
//! let request = EventRequest::new(
//!     "Team Sync",
//!     "2024-03-10T09:00".parse().unwrap(),
//!     "2024-03-10T10:00".parse::<tz_normalizer::DateTimeInput>().unwrap(),
//! );
//! let event = ctx.normalize(&request).unwrap();
//! assert_eq!(event.start_rfc3339(), "2024-03-10T09:00:00-04:00");
//! ```
//!
//! ## Modules
//!
//! - [`context`] — session timezone, credentials and calendar id
//! - [`input`] — parsing naive and offset-qualified times
//! - [`dst`] — DST gap/overlap policies
//! - [`normalize`] — request → normalized event
//! - [`when`] — wire shapes for event times, both directions
//! - [`recurrence`] — RRULE validation and occurrence previews
//! - [`search`] — fuzzy title matching
//! - [`text`] — HTML descriptions to plain text
//! - [`error`] — error types

pub mod context;
pub mod dst;
pub mod error;
pub mod input;
pub mod normalize;
pub mod recurrence;
pub mod request;
pub mod search;
pub mod text;
pub mod when;

pub use context::{resolve_timezone, Credentials, Session, TimezoneContext};
pub use dst::DstPolicy;
pub use error::NormalizeError;
pub use input::{DateTimeInput, EventEnd};
pub use normalize::normalize;
pub use recurrence::{preview_occurrences, Occurrence};
pub use request::{EventRequest, NormalizedEvent, Visibility};
pub use search::fuzzy_search;
pub use text::html_to_plain_text;
pub use when::{parse_when, Span, When};
