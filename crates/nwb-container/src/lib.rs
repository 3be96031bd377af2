//! # nwb-container
//!
//! Assembles the NWB session container and writes it with one of two
//! interchangeable backends:
//! - [`ZarrWriter`]: Zarr v2 directory store (always available)
//! - `Hdf5Writer`: single HDF5 file (cargo feature `hdf5`)
//!
//! Both serialize the same [`layout::Group`] tree built from an [`NwbFile`].

pub mod layout;
pub mod zarr;

#[cfg(feature = "hdf5")]
pub mod h5;

mod error;

pub use error::ContainerError;
pub use zarr::ZarrWriter;

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use nwb_core::{Backend, ResolvedSession, ResolvedSubject};
use uuid::Uuid;

/// NWB schema version the layout follows.
pub const NWB_VERSION: &str = "2.7.0";

/// Output file extension, shared by both backends.
pub const NWB_EXTENSION: &str = "nwb";

/// A session-level NWB container, ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NwbFile {
    /// Fresh per run.
    pub identifier: Uuid,
    pub session_description: String,
    pub session_start_time: DateTime<FixedOffset>,
    pub timestamps_reference_time: DateTime<FixedOffset>,
    pub file_create_date: DateTime<FixedOffset>,
    pub institution: Option<String>,
    pub session_id: String,
    pub subject: ResolvedSubject,
    pub subject_object_id: Uuid,
}

impl NwbFile {
    /// Compose a container from resolved records.
    ///
    /// The reference time for all timestamps is the session start.
    #[must_use]
    pub fn new(
        session: &ResolvedSession,
        subject: ResolvedSubject,
        session_description: &str,
        created_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            session_description: session_description.to_string(),
            session_start_time: session.session_start,
            timestamps_reference_time: session.session_start,
            file_create_date: created_at,
            institution: session.institution.clone(),
            session_id: session.session_id.clone(),
            subject,
            subject_object_id: Uuid::new_v4(),
        }
    }
}

/// A storage strategy for [`NwbFile`].
pub trait ContainerWriter {
    fn backend(&self) -> Backend;

    /// Write `file` to `path`, replacing anything already there.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError`] on any storage failure. A failed write may
    /// leave a partial store behind.
    fn write(&self, file: &NwbFile, path: &Path) -> Result<(), ContainerError>;
}

/// Writer for `backend`.
///
/// # Errors
///
/// Returns [`ContainerError::BackendUnavailable`] when `hdf5` is requested
/// but the crate was built without the `hdf5` feature.
pub fn writer_for(backend: Backend) -> Result<Box<dyn ContainerWriter>, ContainerError> {
    match backend {
        Backend::Zarr => Ok(Box::new(ZarrWriter)),
        Backend::Hdf5 => hdf5_writer(),
    }
}

#[cfg(feature = "hdf5")]
fn hdf5_writer() -> Result<Box<dyn ContainerWriter>, ContainerError> {
    Ok(Box::new(h5::Hdf5Writer))
}

#[cfg(not(feature = "hdf5"))]
fn hdf5_writer() -> Result<Box<dyn ContainerWriter>, ContainerError> {
    Err(ContainerError::BackendUnavailable(Backend::Hdf5))
}

/// `<results_dir>/<asset_name>.nwb`
#[must_use]
pub fn output_path(results_dir: &Path, asset_name: &str) -> PathBuf {
    results_dir.join(format!("{asset_name}.{NWB_EXTENSION}"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn session() -> ResolvedSession {
        ResolvedSession {
            session_id: "sess1".to_string(),
            session_start: DateTime::parse_from_rfc3339("2023-01-01T00:00:00-08:00").unwrap(),
            institution: Some("X".to_string()),
            asset_name: "sess1".to_string(),
            synthesized: false,
        }
    }

    #[test]
    fn identifiers_are_fresh_per_container() {
        let created = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        let a = NwbFile::new(&session(), ResolvedSubject::placeholder(), "d", created);
        let b = NwbFile::new(&session(), ResolvedSubject::placeholder(), "d", created);
        assert_ne!(a.identifier, b.identifier);
        assert_ne!(a.identifier, a.subject_object_id);
    }

    #[test]
    fn reference_time_is_session_start() {
        let created = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        let file = NwbFile::new(&session(), ResolvedSubject::placeholder(), "d", created);
        assert_eq!(file.timestamps_reference_time, file.session_start_time);
        assert_eq!(file.institution.as_deref(), Some("X"));
    }

    #[test]
    fn output_is_named_after_asset() {
        assert_eq!(
            output_path(Path::new("/results"), "ecephys_1_2023-01-01_00-00-00"),
            PathBuf::from("/results/ecephys_1_2023-01-01_00-00-00.nwb")
        );
    }

    #[test]
    fn zarr_writer_always_available() {
        assert_eq!(writer_for(Backend::Zarr).unwrap().backend(), Backend::Zarr);
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn hdf5_requires_feature() {
        assert!(matches!(
            writer_for(Backend::Hdf5),
            Err(ContainerError::BackendUnavailable(Backend::Hdf5))
        ));
    }
}
