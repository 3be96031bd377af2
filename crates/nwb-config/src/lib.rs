//! # nwb-config
//!
//! Layered configuration loading for nwb-subject using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`NWB_SUBJECT_*` prefix, `__` as separator)
//! 2. An explicit TOML file passed with `--config`
//! 3. Project-level `.nwb-subject/config.toml`
//! 4. User-level `~/.config/nwb-subject/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `NWB_SUBJECT_DOCDB__HOST` -> `docdb.host`,
//! `NWB_SUBJECT_PATHS__DATA_DIR` -> `paths.data_dir`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use nwb_config::NwbConfig;
//!
//! let config = NwbConfig::load_with_dotenv(None).expect("config");
//! let tz = config.default_timezone().expect("valid timezone");
//! println!("naive timestamps are read as {tz}");
//! ```

mod docdb;
mod error;
mod output;
mod paths;
mod session;

pub use docdb::DocDbConfig;
pub use error::ConfigError;
pub use output::OutputConfig;
pub use paths::PathsConfig;
pub use session::SessionConfig;

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use nwb_core::Tz;
use serde::{Deserialize, Serialize};

/// Environment variable prefix for all overrides.
pub const ENV_PREFIX: &str = "NWB_SUBJECT_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NwbConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub docdb: DocDbConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl NwbConfig {
    /// Load configuration from all sources and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] if a source fails to parse and
    /// [`ConfigError::InvalidValue`] if validation fails.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.env` from the current directory, then [`Self::load`].
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load(explicit)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or layer providers on top.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".nwb-subject/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit --config file. Missing files are an error here, not a skip.
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file_exact(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check values that deserialize fine but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.default_timezone()?;

        if self.docdb.page_size == 0 {
            return Err(invalid("docdb.page_size", "must be at least 1"));
        }
        if self.docdb.host.trim().is_empty() {
            return Err(invalid("docdb.host", "must not be empty"));
        }
        if self.session.modalities.iter().all(|m| m.trim().is_empty()) {
            return Err(invalid(
                "session.modalities",
                "must list at least one modality keyword",
            ));
        }
        Ok(())
    }

    /// The configured default timezone.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown IANA name.
    pub fn default_timezone(&self) -> Result<Tz, ConfigError> {
        nwb_core::dates::parse_timezone(&self.session.default_timezone)
            .map_err(|e| invalid("session.default_timezone", &e.to_string()))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nwb-subject").join("config.toml"))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use nwb_core::Backend;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = NwbConfig::default();
        config.validate().expect("defaults should validate");
        assert_eq!(config.output.default_backend, Backend::Zarr);
        assert_eq!(config.docdb.page_size, 100);
        assert_eq!(config.session.modalities[0], "ecephys");
    }

    #[test]
    fn figment_builds_without_files() {
        let config: NwbConfig = NwbConfig::figment(None)
            .extract()
            .expect("should extract defaults");
        assert_eq!(config.session.default_timezone, "America/Los_Angeles");
        assert_eq!(config.docdb.collection, "data_assets");
    }

    #[test]
    fn unknown_timezone_fails_validation() {
        let mut config = NwbConfig::default();
        config.session.default_timezone = "Pacific Standard Time".to_string();
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "session.default_timezone")
        );
    }

    #[test]
    fn zero_page_size_fails_validation() {
        let mut config = NwbConfig::default();
        config.docdb.page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_modality_list_fails_validation() {
        let mut config = NwbConfig::default();
        config.session.modalities = vec![String::new()];
        assert!(config.validate().is_err());
    }
}
