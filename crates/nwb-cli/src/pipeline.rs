//! Export pipeline: select source → load metadata → reconcile → write container.
//!
//! 1. Resolve the backend (the `"null"` placeholder maps to the configured default)
//! 2. Pick the metadata source: remote store for a named asset, else the single
//!    attached directory under `paths.data_dir`
//! 3. Resolve the session and subject records against the default timezone
//! 4. Write `<results_dir>/<asset_name>.nwb` with the chosen backend

use std::path::PathBuf;

use anyhow::Context;
use nwb_config::NwbConfig;
use nwb_container::{NwbFile, output_path, writer_for};
use nwb_core::backend::resolve_backend;
use nwb_core::{MetadataBundle, session::resolve_session, subject::build_subject};
use nwb_docdb::{RecordStore, RemoteLookup};

use crate::source::{self, SourceSelection};

/// What one run was asked to do, after CLI slot merging.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Raw backend text; `None`, empty, and `"null"` select the default.
    pub backend: Option<String>,
    /// Non-empty asset name for a remote lookup.
    pub asset_name: Option<String>,
}

/// Run one export and return the path that was written.
///
/// # Errors
///
/// Every failure is fatal: unknown or unavailable backend, ambiguous local
/// input, lookup and store errors, unparseable dates, and write failures.
pub async fn run<S: RecordStore>(
    request: &RunRequest,
    config: &NwbConfig,
    store: &S,
) -> anyhow::Result<PathBuf> {
    let backend = resolve_backend(request.backend.as_deref(), config.output.default_backend)?;
    // Fail on an unavailable backend before touching inputs or outputs.
    let writer = writer_for(backend)?;

    let bundle = load_bundle(request, config, store).await?;

    let tz = config.default_timezone()?;
    let now = chrono::Local::now().fixed_offset();

    let session = resolve_session(&bundle, tz, now)?;
    if session.synthesized {
        tracing::warn!(session_id = %session.session_id, "no session description, using current time");
    }
    let subject = build_subject(bundle.subject.as_ref(), session.session_start, tz)?;
    if subject.is_placeholder() {
        tracing::warn!("no subject metadata, writing placeholder subject");
    }

    tracing::info!(
        backend = %backend,
        asset_name = %session.asset_name,
        session_start = %session.session_start,
        "writing nwb container"
    );

    let file = NwbFile::new(&session, subject, &config.session.description, now);

    let results_dir = &config.paths.results_dir;
    std::fs::create_dir_all(results_dir).with_context(|| {
        format!(
            "failed to create results directory {}",
            results_dir.display()
        )
    })?;
    let path = output_path(results_dir, &session.asset_name);
    writer.write(&file, &path)?;

    tracing::info!(path = %path.display(), "saved nwb container");
    Ok(path)
}

async fn load_bundle<S: RecordStore>(
    request: &RunRequest,
    config: &NwbConfig,
    store: &S,
) -> anyhow::Result<MetadataBundle> {
    match source::select_source(request.asset_name.as_deref(), &config.paths.data_dir)? {
        SourceSelection::Remote(asset_name) => {
            tracing::info!(%asset_name, "looking up asset in metadata store");
            let lookup = RemoteLookup::new(store, &config.docdb, &config.session.modalities);
            Ok(lookup.lookup(&asset_name).await?)
        }
        SourceSelection::Local(dir) => {
            tracing::info!(path = %dir.display(), "reading attached metadata");
            Ok(source::local::load(&dir)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Mutex;

    use nwb_container::ContainerError;
    use nwb_container::zarr::decode_vlen_utf8;
    use nwb_core::{Backend, CoreError};
    use nwb_docdb::{DataAssetRecord, DocDbError};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;
    use crate::source::SourceError;
    use crate::source::local::{DATA_DESCRIPTION_FILE, SUBJECT_FILE};

    /// Canned store; records every filter it was asked for.
    #[derive(Default)]
    struct FakeStore {
        records: Vec<Value>,
        filters: Mutex<Vec<Value>>,
    }

    impl RecordStore for FakeStore {
        async fn retrieve_records(
            &self,
            filter: &Value,
            _page_size: u32,
        ) -> Result<Vec<DataAssetRecord>, DocDbError> {
            self.filters.lock().unwrap().push(filter.clone());
            Ok(self
                .records
                .iter()
                .map(|r| serde_json::from_value(r.clone()).unwrap())
                .collect())
        }
    }

    struct Workspace {
        _tmp: TempDir,
        config: NwbConfig,
    }

    impl Workspace {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let mut config = NwbConfig::default();
            config.paths.data_dir = tmp.path().join("data");
            config.paths.results_dir = tmp.path().join("results");
            fs::create_dir_all(&config.paths.data_dir).unwrap();
            Self { _tmp: tmp, config }
        }

        fn asset_dir(&self, name: &str) -> PathBuf {
            let dir = self.config.paths.data_dir.join(name);
            fs::create_dir_all(&dir).unwrap();
            dir
        }
    }

    fn zarr_text(store: &Path, dataset: &str) -> String {
        let bytes = fs::read(store.join(dataset).join("0")).unwrap();
        decode_vlen_utf8(&bytes).unwrap().remove(0)
    }

    fn request(backend: Option<&str>, asset_name: Option<&str>) -> RunRequest {
        RunRequest {
            backend: backend.map(str::to_string),
            asset_name: asset_name.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn local_run_writes_age_and_institution() {
        let ws = Workspace::new();
        let dir = ws.asset_dir("ecephys_1_2023-01-01_00-00-00");
        fs::write(
            dir.join(DATA_DESCRIPTION_FILE),
            r#"{"name":"sess1","creation_time":"2023-01-01T00:00:00.000000-0800","institution":{"name":"X"}}"#,
        )
        .unwrap();
        fs::write(
            dir.join(SUBJECT_FILE),
            r#"{"subject_id":"1","species":{"name":"Mouse"},"sex":"Male","date_of_birth":"2022-01-01","genotype":"wt","background_strain":"C57"}"#,
        )
        .unwrap();

        let path = run(&request(Some("zarr"), None), &ws.config, &FakeStore::default())
            .await
            .unwrap();

        assert_eq!(path, ws.config.paths.results_dir.join("sess1.nwb"));
        assert_eq!(zarr_text(&path, "general/subject/age"), "P365 days, 0:00:00D");
        assert_eq!(zarr_text(&path, "general/institution"), "X");
        assert_eq!(zarr_text(&path, "general/session_id"), "sess1");
        assert_eq!(zarr_text(&path, "general/subject/sex"), "M");
        assert_eq!(zarr_text(&path, "general/subject/strain"), "C57");
        assert_eq!(
            zarr_text(&path, "session_start_time"),
            "2023-01-01T00:00:00-08:00"
        );
    }

    #[tokio::test]
    async fn missing_files_fall_back_to_placeholders() {
        let ws = Workspace::new();
        ws.asset_dir("behavior_9_2024-03-03_03-03-03");

        let path = run(&request(None, None), &ws.config, &FakeStore::default())
            .await
            .unwrap();

        assert_eq!(
            path,
            ws.config
                .paths
                .results_dir
                .join("behavior_9_2024-03-03_03-03-03.nwb")
        );
        assert_eq!(
            zarr_text(&path, "general/session_id"),
            "behavior_9_2024-03-03_03-03-03"
        );
        assert_eq!(zarr_text(&path, "general/subject/subject_id"), "mock_subject");
        assert!(!path.join("general/institution").exists());
    }

    #[tokio::test]
    async fn several_attached_directories_are_rejected() {
        let ws = Workspace::new();
        ws.asset_dir("a");
        ws.asset_dir("b");

        let err = run(&request(None, None), &ws.config, &FakeStore::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SourceError>(),
            Some(SourceError::Configuration { found: 2, .. })
        ));
        assert!(!ws.config.paths.results_dir.exists());
    }

    #[tokio::test]
    async fn remote_run_uses_first_record() {
        let ws = Workspace::new();
        let asset = "ecephys_123456_2023-05-01_10-30-00";
        let store = FakeStore {
            records: vec![
                json!({
                    "name": asset,
                    "data_description": {
                        "name": "remote-session",
                        "creation_time": "2023-05-01T10:30:00",
                        "institution": "AIND"
                    },
                    "subject": {
                        "subject_id": 123_456,
                        "species": "Mus musculus",
                        "sex": "female",
                        "date_of_birth": "2023-04-30",
                        "breeding_group": "BG-1"
                    }
                }),
                json!({ "name": "second", "data_description": null, "subject": null }),
            ],
            ..FakeStore::default()
        };

        let path = run(&request(Some("null"), Some(asset)), &ws.config, &store)
            .await
            .unwrap();

        assert_eq!(path, ws.config.paths.results_dir.join(format!("{asset}.nwb")));
        assert_eq!(zarr_text(&path, "general/session_id"), "remote-session");
        assert_eq!(zarr_text(&path, "general/subject/subject_id"), "123456");
        assert_eq!(zarr_text(&path, "general/subject/sex"), "F");
        assert_eq!(zarr_text(&path, "general/subject/strain"), "BG-1");
        // Naive start localized to Pacific daylight time; birth at PDT midnight.
        assert_eq!(
            zarr_text(&path, "session_start_time"),
            "2023-05-01T10:30:00-07:00"
        );
        assert_eq!(
            zarr_text(&path, "general/subject/age"),
            "P1 day, 10:30:00D"
        );

        let filters = store.filters.lock().unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0]["$and"][1]["subject.subject_id"], "123456");
    }

    #[tokio::test]
    async fn remote_run_without_matches_fails() {
        let ws = Workspace::new();
        let err = run(
            &request(None, Some("ecephys_1_2023-05-01_10-30-00")),
            &ws.config,
            &FakeStore::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<DocDbError>(),
            Some(DocDbError::NoRecordsFound { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_backend_fails_before_reading_inputs() {
        let ws = Workspace::new();
        let err = run(&request(Some("parquet"), None), &ws.config, &FakeStore::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::UnknownBackend(value)) if value == "parquet"
        ));
    }

    #[tokio::test]
    async fn null_backend_uses_configured_default() {
        let ws = Workspace::new();
        ws.asset_dir("only");

        let path = run(&request(Some("null"), None), &ws.config, &FakeStore::default())
            .await
            .unwrap();

        assert_eq!(ws.config.output.default_backend, Backend::Zarr);
        assert!(path.join(".zgroup").is_file());
    }

    #[cfg(not(feature = "hdf5"))]
    #[tokio::test]
    async fn hdf5_without_feature_is_unavailable() {
        let ws = Workspace::new();
        ws.asset_dir("only");

        let err = run(&request(Some("hdf5"), None), &ws.config, &FakeStore::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ContainerError>(),
            Some(ContainerError::BackendUnavailable(Backend::Hdf5))
        ));
        assert!(!ws.config.paths.results_dir.exists());
    }
}
