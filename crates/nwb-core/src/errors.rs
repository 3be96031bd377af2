//! Error types for metadata resolution.
//!
//! These cover the failures that can happen while turning raw metadata into
//! resolved records. Transport and storage errors live in `nwb-docdb` and
//! `nwb-container`; the binary converges everything with `anyhow`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A creation timestamp matched neither the offset-qualified nor the naive format.
    #[error("Could not parse date-time '{value}': expected YYYY-MM-DDTHH:MM:SS[.ffffff][±HHMM]")]
    DateParse { value: String },

    /// Backend flag outside the recognized set.
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    /// The asset name lacks a pattern the remote lookup needs.
    #[error("Invalid asset name '{asset_name}': {reason}")]
    LookupInput { asset_name: String, reason: String },

    /// A metadata record is present but a required key is absent or empty.
    #[error("Missing field '{field}' in {record} record")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    /// The configured default timezone is not a known IANA zone.
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    /// A naive local time that does not exist in the default timezone (DST gap).
    #[error("Local time '{value}' does not exist in timezone {timezone}")]
    NonexistentLocalTime { value: String, timezone: String },
}
