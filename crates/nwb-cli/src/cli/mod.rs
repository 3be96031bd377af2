use std::path::PathBuf;

use clap::Parser;
use nwb_config::NwbConfig;

use crate::source::normalize_asset_name;

/// Top-level CLI parser for the `nwb-subject` binary.
///
/// Backend and asset name each have a positional and a named slot; only one of
/// each pair may be given.
#[derive(Debug, Parser)]
#[command(
    name = "nwb-subject",
    version,
    about = "Write session and subject metadata into an NWB container"
)]
pub struct Cli {
    /// Storage backend: hdf5 or zarr ("null" selects the configured default)
    #[arg(value_name = "BACKEND", conflicts_with = "backend")]
    pub static_backend: Option<String>,

    /// Data asset name to look up remotely (empty means use the attached folder)
    #[arg(value_name = "ASSET_NAME", conflicts_with = "asset_name")]
    pub static_asset_name: Option<String>,

    /// Storage backend: hdf5 or zarr
    #[arg(long)]
    pub backend: Option<String>,

    /// Data asset name to look up remotely
    #[arg(long)]
    pub asset_name: Option<String>,

    /// Explicit TOML config file layered over the discovered ones
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override `paths.data_dir`
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override `paths.results_dir`
    #[arg(long, value_name = "DIR")]
    pub results_dir: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Raw backend text from whichever slot was used.
    #[must_use]
    pub fn backend(&self) -> Option<&str> {
        self.static_backend
            .as_deref()
            .or(self.backend.as_deref())
    }

    /// Asset name from whichever slot was used; empty text counts as absent.
    #[must_use]
    pub fn asset_name(&self) -> Option<String> {
        normalize_asset_name(
            self.static_asset_name
                .clone()
                .or_else(|| self.asset_name.clone()),
        )
    }

    /// Apply path flags on top of the loaded configuration.
    pub fn apply_overrides(&self, config: &mut NwbConfig) {
        if let Some(dir) = &self.data_dir {
            config.paths.data_dir.clone_from(dir);
        }
        if let Some(dir) = &self.results_dir {
            config.paths.results_dir.clone_from(dir);
        }
    }
}
