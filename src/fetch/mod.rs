mod basic;
mod client;
pub mod auth;
#[cfg(test)]
pub(crate) mod stub;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::Url;
use tracing::{debug, warn};

use crate::error::{NeoError, Result};
use crate::feed::RawFeedResponse;
use crate::range::DateRange;

/// Issues one GET against the feed endpoint and decodes the body.
///
/// # Errors
///
/// A transport error or non-success status yields a network failure; an
/// undecodable body yields [`NeoError::MalformedRecord`].
#[tracing::instrument(skip_all, fields(range = %range))]
pub async fn fetch_feed<C: HttpClient + ?Sized>(
    client: &C,
    endpoint: &Url,
    range: DateRange,
) -> Result<RawFeedResponse> {
    let mut url = endpoint.clone();
    url.query_pairs_mut().extend_pairs(range.query_pairs());
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        warn!(%status, "Feed endpoint rejected the request");
        return Err(NeoError::Status(status));
    }

    let bytes = resp.bytes().await?;
    debug!(bytes = bytes.len(), "Feed body received, parsing");
    RawFeedResponse::from_slice(&bytes)
}
