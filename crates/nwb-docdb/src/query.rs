//! Filter documents and paging for store queries.

use nwb_core::asset::AssetFingerprint;
use serde_json::{Map, Value, json};

/// Filter matching records of one acquisition for one subject:
///
/// ```text
/// {"$and": [{<name_field>: {"$regex": "<modality>.*<time>"}},
///           {<subject_id_field>: "<subject id>"}]}
/// ```
#[must_use]
pub fn asset_filter(
    fingerprint: &AssetFingerprint,
    name_field: &str,
    subject_id_field: &str,
) -> Value {
    let mut name_clause = Map::new();
    name_clause.insert(
        name_field.to_string(),
        json!({ "$regex": fingerprint.name_pattern() }),
    );

    let mut subject_clause = Map::new();
    subject_clause.insert(
        subject_id_field.to_string(),
        Value::String(fingerprint.subject_id.clone()),
    );

    json!({ "$and": [Value::Object(name_clause), Value::Object(subject_clause)] })
}

/// `skip` offsets needed to page through `total` records.
pub fn page_offsets(total: u64, page_size: u32) -> impl Iterator<Item = u64> {
    let step = usize::try_from(page_size.max(1)).unwrap_or(usize::MAX);
    (0..total).step_by(step)
}
