//! Session reconciliation settings.

use serde::{Deserialize, Serialize};

fn default_timezone() -> String {
    "America/Los_Angeles".to_string()
}

fn default_description() -> String {
    "NWB file generated by AIND pipeline".to_string()
}

fn default_modalities() -> Vec<String> {
    ["ecephys", "multiplane-ophys", "single-plane-ophys", "behavior"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// IANA zone applied to naive session timestamps and dates of birth.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// `session_description` written into every container.
    #[serde(default = "default_description")]
    pub description: String,

    /// Modality keywords tried in order against remote asset names.
    #[serde(default = "default_modalities")]
    pub modalities: Vec<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_timezone: default_timezone(),
            description: default_description(),
            modalities: default_modalities(),
        }
    }
}
