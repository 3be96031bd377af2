//! Subject record building.

use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use serde::Serialize;

use crate::dates;
use crate::errors::CoreError;
use crate::metadata::{NamedOrPlain, SubjectMetadata};

pub const PLACEHOLDER_SUBJECT_ID: &str = "mock_subject";
pub const PLACEHOLDER_SPECIES: &str = "Mus musculus";
pub const PLACEHOLDER_SEX: &str = "U";
pub const PLACEHOLDER_AGE: &str = "P50D";
pub const PLACEHOLDER_DESCRIPTION: &str = "mock subject: metadata unavailable";

/// Canonical subject fields written into the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSubject {
    pub subject_id: String,
    pub species: String,
    /// Single upper-case letter.
    pub sex: String,
    pub date_of_birth: Option<DateTime<FixedOffset>>,
    /// `P<elapsed>D`, see [`dates::age_text`].
    pub age: String,
    pub genotype: Option<String>,
    pub description: Option<String>,
    pub strain: Option<String>,
}

impl ResolvedSubject {
    /// Stand-in used when no subject record exists.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            subject_id: PLACEHOLDER_SUBJECT_ID.to_string(),
            species: PLACEHOLDER_SPECIES.to_string(),
            sex: PLACEHOLDER_SEX.to_string(),
            date_of_birth: None,
            age: PLACEHOLDER_AGE.to_string(),
            genotype: None,
            description: Some(PLACEHOLDER_DESCRIPTION.to_string()),
            strain: None,
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.subject_id == PLACEHOLDER_SUBJECT_ID
            && self.description.as_deref() == Some(PLACEHOLDER_DESCRIPTION)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build the subject record, or the placeholder when `metadata` is `None`.
///
/// Age is the elapsed time from local midnight on the date of birth (in
/// `default_tz`) to `session_start`.
///
/// # Errors
///
/// Returns [`CoreError::MissingField`] if species, sex, or date of birth is
/// absent, and [`CoreError::DateParse`] for a malformed date of birth.
pub fn build_subject(
    metadata: Option<&SubjectMetadata>,
    session_start: DateTime<FixedOffset>,
    default_tz: Tz,
) -> Result<ResolvedSubject, CoreError> {
    let Some(metadata) = metadata else {
        return Ok(ResolvedSubject::placeholder());
    };

    let missing = |field| CoreError::MissingField {
        record: "subject",
        field,
    };

    let dob_text =
        non_empty(metadata.date_of_birth.as_deref()).ok_or_else(|| missing("date_of_birth"))?;
    let date_of_birth = dates::parse_date_of_birth(dob_text, default_tz)?;

    let species = metadata
        .species
        .as_ref()
        .and_then(NamedOrPlain::name)
        .ok_or_else(|| missing("species"))?;

    let sex = non_empty(metadata.sex.as_deref())
        .and_then(|s| s.chars().next())
        .and_then(|first| first.to_uppercase().next())
        .map(String::from)
        .ok_or_else(|| missing("sex"))?;

    let strain = non_empty(metadata.background_strain.as_deref())
        .or_else(|| non_empty(metadata.breeding_group.as_deref()))
        .map(str::to_string);

    Ok(ResolvedSubject {
        subject_id: metadata.subject_id.to_string(),
        species: species.to_string(),
        sex,
        date_of_birth: Some(date_of_birth),
        age: dates::age_text(date_of_birth, session_start),
        genotype: metadata.genotype.clone(),
        description: None,
        strain,
    })
}
