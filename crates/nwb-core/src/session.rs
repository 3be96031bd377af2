//! Session record resolution.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Serialize;

use crate::dates;
use crate::errors::CoreError;
use crate::metadata::MetadataBundle;

/// Session-level fields of the output container.
///
/// Either fully derived from a description record or fully synthesized; there
/// is no partially resolved state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSession {
    pub session_id: String,
    pub session_start: DateTime<FixedOffset>,
    pub institution: Option<String>,
    /// Output files are named `<asset_name>.nwb`.
    pub asset_name: String,
    /// True when no description record was available.
    pub synthesized: bool,
}

/// Resolve session fields from a metadata bundle.
///
/// With a description, the creation timestamp is reconciled against
/// `default_tz`. Without one, the session starts at `now` and both the session
/// id and asset name fall back to `bundle.fallback_name`.
///
/// # Errors
///
/// Propagates [`CoreError::MissingField`], [`CoreError::DateParse`], and
/// [`CoreError::NonexistentLocalTime`] from the description's timestamp.
pub fn resolve_session(
    bundle: &MetadataBundle,
    default_tz: Tz,
    now: DateTime<FixedOffset>,
) -> Result<ResolvedSession, CoreError> {
    let Some(description) = &bundle.description else {
        return Ok(ResolvedSession {
            session_id: bundle.fallback_name.clone(),
            session_start: now,
            institution: None,
            asset_name: bundle.fallback_name.clone(),
            synthesized: true,
        });
    };

    let stamp = description.creation_timestamp()?.to_text();
    let session_start = dates::parse_session_start(&stamp, default_tz)?;
    let asset_name = bundle
        .requested_asset
        .clone()
        .unwrap_or_else(|| description.name.clone());

    Ok(ResolvedSession {
        session_id: description.name.clone(),
        session_start,
        institution: description.institution_name().map(str::to_string),
        asset_name,
        synthesized: false,
    })
}
