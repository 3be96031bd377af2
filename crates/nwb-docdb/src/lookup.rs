//! Remote session lookup: asset name → metadata bundle.

use nwb_config::DocDbConfig;
use nwb_core::MetadataBundle;
use nwb_core::asset::AssetFingerprint;

use crate::{DocDbError, RecordStore, query};

/// Resolves an asset name to the first matching record in a [`RecordStore`].
pub struct RemoteLookup<'a, S> {
    store: &'a S,
    config: &'a DocDbConfig,
    modalities: &'a [String],
}

impl<'a, S: RecordStore> RemoteLookup<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S, config: &'a DocDbConfig, modalities: &'a [String]) -> Self {
        Self {
            store,
            config,
            modalities,
        }
    }

    /// Fetch the description and subject records for `asset_name`.
    ///
    /// The first record in store order wins; there is no further tie-break.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError::Lookup`] if the asset name cannot be
    /// fingerprinted, [`DocDbError::NoRecordsFound`] if nothing matches, and
    /// transport errors from the store.
    pub async fn lookup(&self, asset_name: &str) -> Result<MetadataBundle, DocDbError> {
        let fingerprint = AssetFingerprint::parse(asset_name, self.modalities)?;
        let filter = query::asset_filter(
            &fingerprint,
            &self.config.name_field,
            &self.config.subject_id_field,
        );
        tracing::debug!(
            modality = %fingerprint.modality,
            subject_id = %fingerprint.subject_id,
            acquired_at = %fingerprint.acquired_at,
            %filter,
            "querying metadata store"
        );

        let records = self
            .store
            .retrieve_records(&filter, self.config.page_size)
            .await?;
        let match_count = records.len();

        let Some(record) = records.into_iter().next() else {
            return Err(DocDbError::NoRecordsFound {
                filter: filter.to_string(),
            });
        };
        tracing::info!(
            record = record.name.as_deref().unwrap_or("<unnamed>"),
            match_count,
            "selected metadata record"
        );

        Ok(MetadataBundle {
            description: record.data_description,
            subject: record.subject,
            fallback_name: asset_name.to_string(),
            requested_asset: Some(asset_name.to_string()),
        })
    }
}
