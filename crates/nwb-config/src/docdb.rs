//! Remote metadata store (document database REST API) configuration.

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "api.allenneuraldynamics.org".to_string()
}

fn default_database() -> String {
    "metadata".to_string()
}

fn default_collection() -> String {
    "data_assets".to_string()
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_scheme() -> String {
    "https".to_string()
}

const fn default_page_size() -> u32 {
    100
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_name_field() -> String {
    "_name".to_string()
}

fn default_subject_id_field() -> String {
    "subject.subject_id".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DocDbConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// API version path segment (e.g., `v1`).
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// `https` in production; `http` for a local test server.
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Records requested per `find` call.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Record field the name regex is matched against.
    #[serde(default = "default_name_field")]
    pub name_field: String,

    /// Dotted path of the subject id inside a record.
    #[serde(default = "default_subject_id_field")]
    pub subject_id_field: String,
}

impl Default for DocDbConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            database: default_database(),
            collection: default_collection(),
            api_version: default_api_version(),
            scheme: default_scheme(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            name_field: default_name_field(),
            subject_id_field: default_subject_id_field(),
        }
    }
}

impl DocDbConfig {
    /// Collection endpoint, e.g. `https://api.allenneuraldynamics.org/v1/metadata/data_assets`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}/{}/{}/{}",
            self.scheme,
            self.host.trim_end_matches('/'),
            self.api_version,
            self.database,
            self.collection
        )
    }
}
