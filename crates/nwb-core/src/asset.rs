//! Asset-name fingerprinting for remote lookups.
//!
//! Asset names embed the modality, subject id, and acquisition time, e.g.
//! `ecephys_123456_2023-05-01_10-30-00`. The remote store is queried by these
//! three parts rather than by exact name, because derived assets append
//! suffixes to the raw name.

use std::sync::LazyLock;

use regex::Regex;

use crate::errors::CoreError;

static SUBJECT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)_").expect("subject id pattern should compile"));

static ACQUISITION_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}_\d{2}-\d{2}-\d{2})")
        .expect("acquisition time pattern should compile")
});

/// First keyword from `modalities` that occurs in `asset_name`.
#[must_use]
pub fn infer_modality<'a>(asset_name: &str, modalities: &'a [String]) -> Option<&'a str> {
    modalities
        .iter()
        .map(String::as_str)
        .find(|keyword| !keyword.is_empty() && asset_name.contains(keyword))
}

/// Digits between the first pair of underscores that enclose only digits.
#[must_use]
pub fn extract_subject_id(asset_name: &str) -> Option<&str> {
    SUBJECT_ID
        .captures(asset_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The `YYYY-MM-DD_HH-MM-SS` acquisition stamp.
#[must_use]
pub fn extract_acquisition_time(asset_name: &str) -> Option<&str> {
    ACQUISITION_TIME
        .captures(asset_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The parts of an asset name the remote query filters on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFingerprint {
    pub modality: String,
    pub subject_id: String,
    pub acquired_at: String,
}

impl AssetFingerprint {
    /// Fingerprint `asset_name` against an ordered list of modality keywords.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LookupInput`] if no modality keyword matches or the
    /// subject id or acquisition time pattern is absent.
    pub fn parse(asset_name: &str, modalities: &[String]) -> Result<Self, CoreError> {
        let invalid = |reason: String| CoreError::LookupInput {
            asset_name: asset_name.to_string(),
            reason,
        };

        let acquired_at = extract_acquisition_time(asset_name).ok_or_else(|| {
            invalid("no acquisition time matching YYYY-MM-DD_HH-MM-SS".to_string())
        })?;
        let subject_id = extract_subject_id(asset_name)
            .ok_or_else(|| invalid("no subject id matching _<digits>_".to_string()))?;
        let modality = infer_modality(asset_name, modalities).ok_or_else(|| {
            invalid(format!(
                "no known modality keyword (expected one of: {})",
                modalities.join(", ")
            ))
        })?;

        Ok(Self {
            modality: modality.to_string(),
            subject_id: subject_id.to_string(),
            acquired_at: acquired_at.to_string(),
        })
    }

    /// Regex matched against record names: `<modality>.*<acquisition time>`.
    #[must_use]
    pub fn name_pattern(&self) -> String {
        format!("{}.*{}", self.modality, self.acquired_at)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn modalities() -> Vec<String> {
        ["ecephys", "multiplane-ophys", "single-plane-ophys", "behavior"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn fingerprints_raw_ecephys_asset() {
        let fp = AssetFingerprint::parse("ecephys_123456_2023-05-01_10-30-00", &modalities())
            .unwrap();
        assert_eq!(
            fp,
            AssetFingerprint {
                modality: "ecephys".to_string(),
                subject_id: "123456".to_string(),
                acquired_at: "2023-05-01_10-30-00".to_string(),
            }
        );
        assert_eq!(fp.name_pattern(), "ecephys.*2023-05-01_10-30-00");
    }

    #[test]
    fn derived_asset_suffix_is_ignored() {
        let fp = AssetFingerprint::parse(
            "ecephys_123456_2023-05-01_10-30-00_sorted_2023-06-01_08-00-00",
            &modalities(),
        )
        .unwrap();
        assert_eq!(fp.acquired_at, "2023-05-01_10-30-00");
    }

    #[test]
    fn missing_timestamp_is_lookup_input_error() {
        let err = AssetFingerprint::parse("ecephys_123456_", &modalities()).unwrap_err();
        assert!(matches!(err, CoreError::LookupInput { .. }));
    }

    #[test]
    fn missing_subject_id_is_lookup_input_error() {
        let err = AssetFingerprint::parse("ecephys-2023-05-01_10-30-00", &modalities()).unwrap_err();
        assert!(
            matches!(err, CoreError::LookupInput { ref reason, .. } if reason.contains("subject id"))
        );
    }

    #[test]
    fn unmatched_modality_is_lookup_input_error() {
        let err =
            AssetFingerprint::parse("smartspim_123456_2023-05-01_10-30-00", &modalities())
                .unwrap_err();
        assert!(
            matches!(err, CoreError::LookupInput { ref reason, .. } if reason.contains("modality"))
        );
    }

    #[rstest]
    #[case("multiplane-ophys_654321_2023-05-01_10-30-00", Some("multiplane-ophys"))]
    #[case("behavior_654321_2023-05-01_10-30-00", Some("behavior"))]
    #[case("ecephys_behavior_1_2023-05-01_10-30-00", Some("ecephys"))]
    #[case("fip_654321_2023-05-01_10-30-00", None)]
    fn modality_is_first_listed_match(#[case] asset: &str, #[case] expected: Option<&str>) {
        let list = modalities();
        assert_eq!(infer_modality(asset, &list), expected);
    }
}
