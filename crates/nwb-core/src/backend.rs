//! Storage backend selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Placeholder the pipeline passes for an unset backend parameter.
pub const UNSET_BACKEND: &str = "null";

/// Serialization strategy for the output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Single hierarchical HDF5 file.
    Hdf5,
    /// Zarr v2 directory store.
    Zarr,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hdf5 => "hdf5",
            Self::Zarr => "zarr",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hdf5" => Ok(Self::Hdf5),
            "zarr" => Ok(Self::Zarr),
            other => Err(CoreError::UnknownBackend(other.to_string())),
        }
    }
}

/// Resolve the backend flag, treating absent, empty, and `"null"` values as
/// "use the configured default".
///
/// # Errors
///
/// Returns [`CoreError::UnknownBackend`] for any other unrecognized value.
pub fn resolve_backend(requested: Option<&str>, default: Backend) -> Result<Backend, CoreError> {
    match requested.map(str::trim) {
        None | Some("" | UNSET_BACKEND) => Ok(default),
        Some(value) => value.parse(),
    }
}
