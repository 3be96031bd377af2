//! # nwb-docdb
//!
//! Client for the metadata document database and the remote session lookup
//! built on it.
//!
//! The store exposes a small REST surface per collection:
//! - `GET {base}/count_documents?filter=<json>` → record counts
//! - `GET {base}/find?filter=<json>&limit=<n>&skip=<k>` → a page of records
//!
//! [`DocDbClient`] pages through `find` using the count. Callers go through the
//! [`RecordStore`] trait so the lookup can run against an in-memory store.

pub mod lookup;
pub mod query;

mod error;
mod http;

pub use error::DocDbError;
pub use lookup::RemoteLookup;

use std::future::Future;
use std::time::Duration;

use nwb_config::DocDbConfig;
use nwb_core::metadata::{SessionDescription, SubjectMetadata};
use serde::Deserialize;
use serde_json::Value;

use crate::http::check_response;

// ── Types ──────────────────────────────────────────────────────────

/// One data asset record. Only the parts a session container needs are decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DataAssetRecord {
    #[serde(default, rename = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub data_description: Option<SessionDescription>,
    #[serde(default)]
    pub subject: Option<SubjectMetadata>,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    #[serde(default)]
    total_record_count: u64,
    filtered_record_count: u64,
}

/// Anything that can answer a filtered, paginated record query.
pub trait RecordStore {
    /// All records matching `filter`, in the order the store returns them.
    fn retrieve_records(
        &self,
        filter: &Value,
        page_size: u32,
    ) -> impl Future<Output = Result<Vec<DataAssetRecord>, DocDbError>> + Send;
}

// ── Client ─────────────────────────────────────────────────────────

/// HTTP client for one collection of the metadata store.
pub struct DocDbClient {
    http: reqwest::Client,
    base_url: String,
}

impl DocDbClient {
    /// Create a client for the collection described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError::Http`] if the underlying `reqwest::Client` fails
    /// to build.
    pub fn new(config: &DocDbConfig) -> Result<Self, DocDbError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nwb-subject/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of records matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError`] if the request fails, the store returns a
    /// non-success status, or the body is not a count document.
    pub async fn count_documents(&self, filter: &Value) -> Result<u64, DocDbError> {
        let url = format!(
            "{}/count_documents?filter={}",
            self.base_url,
            encode_filter(filter)
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let counts: CountResponse = resp.json().await?;
        tracing::debug!(
            total = counts.total_record_count,
            filtered = counts.filtered_record_count,
            "counted records"
        );
        Ok(counts.filtered_record_count)
    }

    /// One page of records matching `filter`, starting at result `skip`.
    ///
    /// See [`decode_page`] for how undecodable records are handled.
    ///
    /// # Errors
    ///
    /// Returns [`DocDbError`] if the request fails, the store returns a
    /// non-success status, or the first record of the result set cannot be
    /// decoded.
    pub async fn find(
        &self,
        filter: &Value,
        limit: u32,
        skip: u64,
    ) -> Result<Vec<DataAssetRecord>, DocDbError> {
        let url = format!(
            "{}/find?filter={}&limit={limit}&skip={skip}",
            self.base_url,
            encode_filter(filter)
        );
        let resp = check_response(self.http.get(&url).send().await?).await?;
        let raw: Vec<Value> = resp.json().await?;
        decode_page(raw, skip)
    }
}

impl RecordStore for DocDbClient {
    async fn retrieve_records(
        &self,
        filter: &Value,
        page_size: u32,
    ) -> Result<Vec<DataAssetRecord>, DocDbError> {
        let total = self.count_documents(filter).await?;
        collect_pages(total, page_size, move |skip| {
            self.find(filter, page_size, skip)
        })
        .await
    }
}

/// Fetch `skip = 0, page, 2·page, …` until `total` is covered, concatenating
/// pages in returned order. Stops early on an empty page.
async fn collect_pages<F, Fut>(
    total: u64,
    page_size: u32,
    mut fetch_page: F,
) -> Result<Vec<DataAssetRecord>, DocDbError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Vec<DataAssetRecord>, DocDbError>>,
{
    let mut records = Vec::new();
    for skip in query::page_offsets(total, page_size) {
        let page = fetch_page(skip).await?;
        tracing::debug!(skip, returned = page.len(), "fetched page");
        if page.is_empty() {
            break;
        }
        records.extend(page);
    }
    Ok(records)
}

fn encode_filter(filter: &Value) -> String {
    urlencoding::encode(&filter.to_string()).into_owned()
}

/// Decode one page of raw records whose first entry sits at result `skip`.
///
/// Only the first record of the whole result set is ever selected, so it must
/// decode. Any later record that does not is logged and dropped.
fn decode_page(raw: Vec<Value>, skip: u64) -> Result<Vec<DataAssetRecord>, DocDbError> {
    let mut records = Vec::with_capacity(raw.len());
    for (position, value) in (skip..).zip(raw) {
        match serde_json::from_value(value) {
            Ok(record) => records.push(record),
            Err(e) if position == 0 => {
                return Err(DocDbError::Parse(format!("record {position}: {e}")));
            }
            Err(e) => tracing::warn!(position, error = %e, "skipping undecodable record"),
        }
    }
    Ok(records)
}
