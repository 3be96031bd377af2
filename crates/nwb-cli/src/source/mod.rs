//! Metadata source selection: remote store lookup vs. attached local folder.

pub mod local;

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The data root does not hold exactly one asset directory.
    #[error("Expected exactly one data asset attached under {}, got {found}", root.display())]
    Configuration { root: PathBuf, found: usize },

    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Where this run's metadata comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSelection {
    /// Look the asset up in the remote store.
    Remote(String),
    /// Read metadata files from this asset directory.
    Local(PathBuf),
}

/// Treat an empty asset name the same as none.
#[must_use]
pub fn normalize_asset_name(asset_name: Option<String>) -> Option<String> {
    asset_name.filter(|name| !name.trim().is_empty())
}

/// Pick the metadata source.
///
/// A non-empty asset name selects the remote store. Otherwise `data_root` must
/// contain exactly one subdirectory.
///
/// # Errors
///
/// Returns [`SourceError::Configuration`] if local mode finds zero or several
/// candidate directories (a missing root counts as zero).
pub fn select_source(
    asset_name: Option<&str>,
    data_root: &Path,
) -> Result<SourceSelection, SourceError> {
    if let Some(name) = asset_name.filter(|name| !name.trim().is_empty()) {
        return Ok(SourceSelection::Remote(name.to_string()));
    }

    let mut candidates = asset_directories(data_root)?;
    if candidates.len() != 1 {
        return Err(SourceError::Configuration {
            root: data_root.to_path_buf(),
            found: candidates.len(),
        });
    }
    Ok(SourceSelection::Local(candidates.remove(0)))
}

fn asset_directories(data_root: &Path) -> Result<Vec<PathBuf>, SourceError> {
    let io_error = |source: io::Error| SourceError::Io {
        path: data_root.to_path_buf(),
        source,
    };

    let entries = match std::fs::read_dir(data_root) {
        Ok(entries) => entries,
        Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(io_error(source)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
