//! Document database error types.

use nwb_core::CoreError;
use thiserror::Error;

/// Errors that can occur while querying the metadata store.
#[derive(Debug, Error)]
pub enum DocDbError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the store.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The store returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Failed to parse a store response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The lookup query matched nothing.
    #[error("No data records found for filter {filter}")]
    NoRecordsFound {
        /// The filter document sent to the store, as JSON text.
        filter: String,
    },

    /// The asset name could not be turned into a query.
    #[error(transparent)]
    Lookup(#[from] CoreError),
}
