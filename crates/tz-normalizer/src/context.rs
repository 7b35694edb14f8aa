//! Immutable session context: default timezone and API credentials.
//!
//! A [`Session`] is built once and then only read. Every normalization call
//! borrows it, so independent sessions can run side by side without sharing
//! anything.

use std::fmt;

use chrono_tz::Tz;

use crate::dst::DstPolicy;
use crate::error::{NormalizeError, Result};

/// The calendar used when the caller does not name one.
pub const DEFAULT_CALENDAR_ID: &str = "primary";

/// Parse an IANA timezone identifier.
///
/// # Errors
/// Returns `NormalizeError::Configuration` for blank or unknown identifiers.
pub fn resolve_timezone(id: &str) -> Result<Tz> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Configuration(
            "timezone identifier is empty".to_string(),
        ));
    }
    trimmed
        .parse()
        .map_err(|_| NormalizeError::Configuration(format!("unknown timezone '{}'", trimmed)))
}

/// Default timezone for a session, plus the DST policy used when reading
/// naive wall-clock times in it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimezoneContext {
    tz: Tz,
    dst_policy: DstPolicy,
}

impl TimezoneContext {
    pub fn new(id: &str) -> Result<Self> {
        Ok(Self {
            tz: resolve_timezone(id)?,
            dst_policy: DstPolicy::default(),
        })
    }

    pub fn from_tz(tz: Tz) -> Self {
        Self {
            tz,
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn with_dst_policy(mut self, policy: DstPolicy) -> Self {
        self.dst_policy = policy;
        self
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn dst_policy(&self) -> DstPolicy {
        self.dst_policy
    }
}

impl Default for TimezoneContext {
    fn default() -> Self {
        Self::from_tz(Tz::UTC)
    }
}

/// API key and grant identifier. Opaque; only checked for presence.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    grant_id: String,
}

impl Credentials {
    /// # Errors
    /// Returns `NormalizeError::Configuration` when either value is blank.
    pub fn new(api_key: impl Into<String>, grant_id: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let grant_id = grant_id.into();
        if api_key.trim().is_empty() {
            return Err(NormalizeError::Configuration("API key is missing".to_string()));
        }
        if grant_id.trim().is_empty() {
            return Err(NormalizeError::Configuration("grant ID is missing".to_string()));
        }
        Ok(Self { api_key, grant_id })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn grant_id(&self) -> &str {
        &self.grant_id
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("grant_id", &self.grant_id)
            .finish()
    }
}

/// Everything a scheduler call needs besides its own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    credentials: Credentials,
    timezone: TimezoneContext,
    calendar_id: String,
}

impl Session {
    pub fn new(credentials: Credentials, timezone: TimezoneContext) -> Self {
        Self {
            credentials,
            timezone,
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
        }
    }

    /// # Errors
    /// Returns `NormalizeError::Configuration` when the calendar id is blank.
    pub fn with_calendar_id(mut self, calendar_id: impl Into<String>) -> Result<Self> {
        let calendar_id = calendar_id.into();
        if calendar_id.trim().is_empty() {
            return Err(NormalizeError::Configuration(
                "calendar ID is empty".to_string(),
            ));
        }
        self.calendar_id = calendar_id;
        Ok(self)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn grant_id(&self) -> &str {
        self.credentials.grant_id()
    }

    pub fn timezone(&self) -> &TimezoneContext {
        &self.timezone
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }
}
