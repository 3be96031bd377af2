//! Date and timezone reconciliation.
//!
//! Upstream records are inconsistent about timezones: newer ones carry an
//! explicit offset, older ones are naive local times. Everything that leaves
//! this module is offset-aware so that subtracting two instants is always
//! well-defined.

use std::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};
use chrono_tz::Tz;

use crate::errors::CoreError;

/// Offset-qualified timestamp, e.g. `2023-01-01T00:00:00.000000-0800`.
pub const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Naive timestamp, e.g. `2023-01-01T00:00:00`.
pub const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Calendar date used for dates of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Look up an IANA timezone by name.
///
/// # Errors
///
/// Returns [`CoreError::InvalidTimezone`] for names `chrono-tz` does not know.
pub fn parse_timezone(name: &str) -> Result<Tz, CoreError> {
    name.parse::<Tz>()
        .map_err(|_| CoreError::InvalidTimezone(name.to_string()))
}

/// Parse a session creation timestamp into an offset-aware instant.
///
/// Offset-qualified text (RFC 3339 or `±HHMM`) is taken as-is. Naive text is
/// interpreted as wall-clock time in `default_tz`.
///
/// # Errors
///
/// Returns [`CoreError::DateParse`] if the text matches neither form, or
/// [`CoreError::NonexistentLocalTime`] if a naive time falls in a DST gap.
pub fn parse_session_start(raw: &str, default_tz: Tz) -> Result<DateTime<FixedOffset>, CoreError> {
    let value = raw.trim();

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant);
    }
    if let Ok(instant) = DateTime::parse_from_str(value, OFFSET_FORMAT) {
        return Ok(instant);
    }

    let naive = NaiveDateTime::parse_from_str(value, NAIVE_FORMAT).map_err(|_| {
        CoreError::DateParse {
            value: raw.to_string(),
        }
    })?;
    localize(naive, default_tz)
}

/// Parse a `YYYY-MM-DD` date of birth as the start of that day in `default_tz`.
///
/// # Errors
///
/// Returns [`CoreError::DateParse`] if the text is not a calendar date.
pub fn parse_date_of_birth(raw: &str, default_tz: Tz) -> Result<DateTime<FixedOffset>, CoreError> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::DateParse {
            value: raw.to_string(),
        }
    })?;
    start_of_day(date, default_tz)
}

/// First instant of `date` in `tz`.
///
/// Usually local midnight. Where clocks spring forward at midnight, the day
/// starts at the end of the gap instead.
///
/// # Errors
///
/// Returns [`CoreError::NonexistentLocalTime`] if no offset can be found for
/// the hour before midnight either.
pub fn start_of_day(date: NaiveDate, tz: Tz) -> Result<DateTime<FixedOffset>, CoreError> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(instant) = tz.from_local_datetime(&midnight).earliest() {
        return Ok(instant.fixed_offset());
    }

    // Midnight read with the offset in force before the gap is the transition
    // instant itself.
    let before = tz
        .from_local_datetime(&(midnight - TimeDelta::hours(1)))
        .latest()
        .ok_or_else(|| CoreError::NonexistentLocalTime {
            value: midnight.to_string(),
            timezone: tz.name().to_string(),
        })?;
    let offset_secs = i64::from(before.fixed_offset().offset().local_minus_utc());
    let utc = midnight - TimeDelta::seconds(offset_secs);
    Ok(tz.from_utc_datetime(&utc).fixed_offset())
}

/// Attach `tz` to a wall-clock time.
///
/// Ambiguous times (the repeated hour when clocks fall back) resolve to the
/// earlier instant.
///
/// # Errors
///
/// Returns [`CoreError::NonexistentLocalTime`] when the time was skipped.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<FixedOffset>, CoreError> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|instant| instant.fixed_offset())
        .ok_or_else(|| CoreError::NonexistentLocalTime {
            value: naive.to_string(),
            timezone: tz.name().to_string(),
        })
}

/// Render an elapsed time as `"<d> days, H:MM:SS[.ffffff]"`.
///
/// The day count is floored, so negative spans read as
/// `"-1 day, 23:00:00"`. Sub-microsecond precision is dropped.
#[must_use]
pub fn format_elapsed(delta: TimeDelta) -> String {
    let micros = delta
        .num_microseconds()
        .unwrap_or_else(|| delta.num_milliseconds().saturating_mul(1_000));

    let days = micros.div_euclid(MICROS_PER_DAY);
    let remainder = micros.rem_euclid(MICROS_PER_DAY);
    let seconds = remainder / MICROS_PER_SECOND;
    let fraction = remainder % MICROS_PER_SECOND;

    let mut out = String::new();
    if days != 0 {
        let plural = if days.abs() == 1 { "" } else { "s" };
        let _ = write!(out, "{days} day{plural}, ");
    }
    let _ = write!(
        out,
        "{}:{:02}:{:02}",
        seconds / 3_600,
        seconds % 3_600 / 60,
        seconds % 60
    );
    if fraction != 0 {
        let _ = write!(out, ".{fraction:06}");
    }
    out
}

/// Age between two instants in the `P<elapsed>D` encoding downstream
/// consumers expect.
#[must_use]
pub fn age_text(date_of_birth: DateTime<FixedOffset>, session_start: DateTime<FixedOffset>) -> String {
    format!("P{}D", format_elapsed(session_start - date_of_birth))
}
