//! Local metadata loader for an attached asset directory.

use std::path::Path;

use nwb_core::MetadataBundle;
use serde::de::DeserializeOwned;

use super::SourceError;

pub const DATA_DESCRIPTION_FILE: &str = "data_description.json";
pub const SUBJECT_FILE: &str = "subject.json";

/// Read the optional description and subject files from `asset_dir`.
///
/// Missing files are logged and left as `None`; the builders synthesize
/// placeholders for them. The directory name is the fallback session id.
///
/// # Errors
///
/// Returns [`SourceError::Io`] or [`SourceError::Json`] if a file exists but
/// cannot be read or parsed.
pub fn load(asset_dir: &Path) -> Result<MetadataBundle, SourceError> {
    let description = read_optional(&asset_dir.join(DATA_DESCRIPTION_FILE))?;
    if description.is_none() {
        tracing::warn!(
            path = %asset_dir.join(DATA_DESCRIPTION_FILE).display(),
            "missing data description file, creating mock session info"
        );
    }

    let subject = read_optional(&asset_dir.join(SUBJECT_FILE))?;
    if subject.is_none() {
        tracing::warn!(
            path = %asset_dir.join(SUBJECT_FILE).display(),
            "missing subject metadata file, creating mock subject"
        );
    }

    let fallback_name = asset_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(MetadataBundle {
        description,
        subject,
        fallback_name,
        requested_asset: None,
    })
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SourceError> {
    if !path.is_file() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| SourceError::Json {
            path: path.to_path_buf(),
            source,
        })
}
