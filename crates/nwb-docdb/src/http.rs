//! Status handling for metadata store responses.
//!
//! A run makes a handful of requests and never retries: a throttled or failed
//! request ends the run, and the error carries enough to decide when to rerun.

use reqwest::StatusCode;

use crate::error::DocDbError;

/// Used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Error bodies longer than this are cut before they reach the error message.
const MAX_ERROR_BODY: usize = 512;

/// Pass successful store responses through; turn anything else into a
/// [`DocDbError`].
///
/// # Errors
///
/// [`DocDbError::RateLimited`] for 429 and [`DocDbError::Api`] (status plus a
/// truncated body) for any other non-success status.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, DocDbError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = parse_retry_after(&resp);
        tracing::warn!(url = %resp.url(), retry_after_secs, "metadata store is throttling requests");
        return Err(DocDbError::RateLimited { retry_after_secs });
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DocDbError::Api {
            status: status.as_u16(),
            message: truncate_body(&body),
        });
    }
    Ok(resp)
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}
