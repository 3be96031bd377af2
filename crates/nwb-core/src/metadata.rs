//! Raw session metadata records as they arrive from either source.
//!
//! Both the local `data_description.json` / `subject.json` files and the remote
//! store's `data_description` / `subject` sub-documents deserialize into these
//! types. Unknown keys are ignored; the records carry many more fields than a
//! session container needs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// A value that upstream records store either as a bare string or as an object
/// with a `name` key (`"institution": "AIND"` vs `"institution": {"name": "AIND"}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedOrPlain {
    Plain(String),
    Named {
        #[serde(default)]
        name: Option<String>,
    },
}

impl NamedOrPlain {
    /// The plain string, or the object's `name` if it has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Plain(value) => Some(value),
            Self::Named { name } => name.as_deref(),
        }
    }
}

/// Subject identifiers show up as strings in current records and as numbers in
/// older ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(i64),
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Number(value) => write!(f, "{value}"),
        }
    }
}

/// Session-level description record (`data_description.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    pub name: String,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub creation_time: Option<String>,
    #[serde(default)]
    pub institution: Option<NamedOrPlain>,
}

/// How a description record encodes its creation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationTimestamp<'a> {
    /// A single date-time string, possibly offset-qualified.
    Combined(&'a str),
    /// Separate calendar date and time-of-day fields (older records).
    Split { date: &'a str, time: &'a str },
}

impl CreationTimestamp<'_> {
    /// Render the timestamp as one `YYYY-MM-DDTHH:MM:SS...` string.
    ///
    /// Split fields drop any fractional seconds from the time-of-day.
    #[must_use]
    pub fn to_text(self) -> String {
        match self {
            Self::Combined(value) => value.trim().to_string(),
            Self::Split { date, time } => {
                let whole_seconds = time.split_once('.').map_or(time, |(whole, _)| whole);
                format!("{}T{}", date.trim(), whole_seconds.trim())
            }
        }
    }
}

impl SessionDescription {
    /// Pick the creation timestamp encoding this record uses.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingField`] if `creation_time` is absent.
    pub fn creation_timestamp(&self) -> Result<CreationTimestamp<'_>, CoreError> {
        let time = self
            .creation_time
            .as_deref()
            .ok_or(CoreError::MissingField {
                record: "data_description",
                field: "creation_time",
            })?;

        Ok(match self.creation_date.as_deref() {
            Some(date) => CreationTimestamp::Split { date, time },
            None => CreationTimestamp::Combined(time),
        })
    }

    #[must_use]
    pub fn institution_name(&self) -> Option<&str> {
        self.institution.as_ref().and_then(NamedOrPlain::name)
    }
}

/// Subject biographical record (`subject.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectMetadata {
    pub subject_id: IdValue,
    #[serde(default)]
    pub species: Option<NamedOrPlain>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub genotype: Option<String>,
    #[serde(default)]
    pub background_strain: Option<String>,
    #[serde(default)]
    pub breeding_group: Option<String>,
}

/// Everything gathered from a metadata source before reconciliation.
///
/// Either half may be absent; the session and subject builders synthesize
/// placeholders for whichever is missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBundle {
    pub description: Option<SessionDescription>,
    pub subject: Option<SubjectMetadata>,
    /// Session id and asset name to use when `description` is absent: the input
    /// directory name locally, the requested asset name remotely.
    pub fallback_name: String,
    /// Asset name requested for a remote lookup. Takes precedence over the
    /// description's `name` when naming the output.
    pub requested_asset: Option<String>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn institution_accepts_plain_string() {
        let desc: SessionDescription = serde_json::from_str(
            r#"{"name": "s", "creation_time": "2023-01-01T00:00:00", "institution": "AIND"}"#,
        )
        .unwrap();
        assert_eq!(desc.institution_name(), Some("AIND"));
    }

    #[test]
    fn institution_accepts_named_object() {
        let desc: SessionDescription = serde_json::from_str(
            r#"{"name": "s", "creation_time": "t",
                "institution": {"name": "Allen Institute for Neural Dynamics", "abbreviation": "AIND"}}"#,
        )
        .unwrap();
        assert_eq!(
            desc.institution_name(),
            Some("Allen Institute for Neural Dynamics")
        );
    }

    #[test]
    fn institution_object_without_name_resolves_to_none() {
        let desc: SessionDescription = serde_json::from_str(
            r#"{"name": "s", "creation_time": "t", "institution": {"abbreviation": "AIND"}}"#,
        )
        .unwrap();
        assert_eq!(desc.institution_name(), None);
    }

    #[test]
    fn split_timestamp_truncates_fraction() {
        let desc: SessionDescription = serde_json::from_str(
            r#"{"name": "s", "creation_date": "2023-05-01", "creation_time": "10:30:00.123456"}"#,
        )
        .unwrap();
        let stamp = desc.creation_timestamp().unwrap();
        assert_eq!(
            stamp,
            CreationTimestamp::Split {
                date: "2023-05-01",
                time: "10:30:00.123456"
            }
        );
        assert_eq!(stamp.to_text(), "2023-05-01T10:30:00");
    }

    #[test]
    fn combined_timestamp_keeps_fraction() {
        let stamp = CreationTimestamp::Combined("2023-01-01T00:00:00.000000-0800");
        assert_eq!(stamp.to_text(), "2023-01-01T00:00:00.000000-0800");
    }

    #[test]
    fn missing_creation_time_is_reported() {
        let desc: SessionDescription = serde_json::from_str(r#"{"name": "s"}"#).unwrap();
        let err = desc.creation_timestamp().unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingField {
                field: "creation_time",
                ..
            }
        ));
    }

    #[test]
    fn numeric_subject_id_displays_as_digits() {
        let subject: SubjectMetadata =
            serde_json::from_str(r#"{"subject_id": 123456, "species": "Mus musculus"}"#).unwrap();
        assert_eq!(subject.subject_id.to_string(), "123456");
    }
}
