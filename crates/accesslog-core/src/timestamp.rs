//! Server-side access timestamps.
//!
//! Every record carries the server-local wall-clock time at which the
//! submission was processed, rendered as `HH:MM:SS - DD.MM.YYYY`.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

use crate::error::{AccessLogError, Result};

/// strftime pattern for stored timestamps.
pub const TIMESTAMP_FORMAT: &str = "%H:%M:%S - %d.%m.%Y";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn now() -> String {
    format(&Local::now())
}

pub fn format<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp back into a naive local date-time.
pub fn parse(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| AccessLogError::BadRequest(format!("invalid timestamp {s:?}: {e}")))
}
