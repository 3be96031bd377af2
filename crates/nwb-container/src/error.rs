//! Container write errors.

use std::io;
use std::path::PathBuf;

use nwb_core::Backend;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    /// Filesystem failure while writing the store.
    #[error("IO error at {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// Failed to encode store metadata.
    #[error("JSON error at {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// This binary was built without the requested backend.
    #[error("backend '{0}' is not available in this build (enable the '{0}' feature)")]
    BackendUnavailable(Backend),

    /// Native HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}
