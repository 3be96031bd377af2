//! Input and output roots.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> PathBuf {
    PathBuf::from("../data")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("../results")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Root holding the single attached data asset directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory the `.nwb` container is written into.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
        }
    }
}
