//! Output container settings.

use nwb_core::Backend;
use serde::{Deserialize, Serialize};

const fn default_backend() -> Backend {
    Backend::Zarr
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Backend used when the flag is absent or the `"null"` placeholder.
    #[serde(default = "default_backend")]
    pub default_backend: Backend,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_backend: default_backend(),
        }
    }
}
