//! Paginated collection traversal
//!
//! GitHub splits collections into pages and advertises the neighbouring
//! pages in an RFC 5988 `Link` header:
//!
//! ```text
//! <https://api.github.com/...?page=2>; rel="next", <https://api.github.com/...?page=5>; rel="last"
//! ```
//!
//! [`PageFetcher::fetch_all`] follows `next` until it disappears.

use crate::error::{Error, Result};
use crate::platform::retry::RetryPolicy;
use crate::types::{FetchFailure, LinkRelations, Paged};
use reqwest::Client;
use reqwest::header::LINK;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Query parameter that carries the page cursor
const PAGE_PARAM: &str = "page";

/// Decode a `Link` header into a relation → URL map.
///
/// Expects well-formed input from the API: every segment must carry a
/// `<url>` and a `rel="..."` parameter. Segments are separated by commas
/// outside the angle brackets, so a target may itself contain commas.
pub fn parse_link_header(header: &str) -> Result<LinkRelations> {
    let mut relations = LinkRelations::new();
    let mut rest = header.trim();

    while !rest.is_empty() {
        let (segment, remainder) = next_segment(rest);
        let (target, params) = segment
            .strip_prefix('<')
            .and_then(|body| body.split_once('>'))
            .ok_or_else(|| Error::MalformedPaginationHeader(segment.to_string()))?;

        let rel = params
            .split(';')
            .filter_map(|param| param.split_once('='))
            .find(|(key, _)| key.trim() == "rel")
            .map(|(_, value)| value.trim().trim_matches('"'))
            .filter(|rel| !rel.is_empty())
            .ok_or_else(|| Error::MalformedPaginationHeader(segment.to_string()))?;

        if target.is_empty() {
            return Err(Error::MalformedPaginationHeader(segment.to_string()));
        }

        relations.insert(rel.to_string(), target.to_string());
        rest = remainder;
    }

    Ok(relations)
}

/// Split off the first segment: through the closing `>`, then up to the
/// next comma that starts another `<...>` target.
fn next_segment(input: &str) -> (&str, &str) {
    let params_start = if input.starts_with('<') {
        input.find('>').map_or(input.len(), |end| end + 1)
    } else {
        0
    };

    let mut search = params_start;
    while let Some(offset) = input[search..].find(',') {
        let comma = search + offset;
        let after = input[comma + 1..].trim_start();
        if after.starts_with('<') {
            return (input[..comma].trim(), after);
        }
        search = comma + 1;
    }
    (input.trim(), "")
}

/// Reads every page of a JSON-array collection
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    retry: RetryPolicy,
}

impl PageFetcher {
    /// Create a fetcher over an already-authenticated client
    pub const fn new(client: Client, retry: RetryPolicy) -> Self {
        Self { client, retry }
    }

    /// Retry policy applied to each page request
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Fetch `url` and every page after it.
    ///
    /// `params` are appended to the first request only; later pages use the
    /// `next` URL verbatim. A `page` parameter is rejected since the cursor
    /// belongs to the traversal.
    ///
    /// A failed page (transport failure after retries, status >= 300, or a
    /// body that is not a JSON array of `T`) ends the traversal and is
    /// reported in [`Paged::failure`] alongside the entries read so far.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<Paged<T>> {
        if params.iter().any(|(key, _)| *key == PAGE_PARAM) {
            return Err(Error::InvalidArgument(format!(
                "'{PAGE_PARAM}' is managed by the paginator and cannot be passed for {url}"
            )));
        }

        let mut first = Url::parse(url)?;
        if !params.is_empty() {
            first.query_pairs_mut().extend_pairs(params);
        }

        let mut entries: Vec<T> = Vec::new();
        let mut next = Some(first);
        let mut pages = 0_u32;

        while let Some(page_url) = next.take() {
            let response = match self
                .retry
                .send(|| self.client.get(page_url.clone()))
                .await
            {
                Ok(response) => response,
                Err(e) => return Ok(abort(entries, &page_url, e.to_string())),
            };

            let status = response.status();
            if status.as_u16() >= 300 {
                return Ok(abort(entries, &page_url, format!("HTTP {status}")));
            }

            let relations = match response.headers().get(LINK) {
                Some(value) => {
                    let value = value
                        .to_str()
                        .map_err(|e| Error::MalformedPaginationHeader(e.to_string()))?;
                    parse_link_header(value)?
                }
                None => LinkRelations::new(),
            };

            let page: Vec<T> = match response.json().await {
                Ok(page) => page,
                Err(e) => {
                    return Ok(abort(entries, &page_url, format!("unreadable page: {e}")));
                }
            };

            pages += 1;
            debug!(url = %page_url, page = pages, count = page.len(), "fetched page");
            entries.extend(page);

            next = relations
                .get("next")
                .map(|href| {
                    Url::parse(href).map_err(|e| {
                        Error::MalformedPaginationHeader(format!("bad next URL {href:?}: {e}"))
                    })
                })
                .transpose()?;
        }

        debug!(url, pages, total = entries.len(), "pagination complete");
        Ok(Paged::complete(entries))
    }
}

fn abort<T>(entries: Vec<T>, url: &Url, reason: String) -> Paged<T> {
    warn!(url = %url, %reason, kept = entries.len(), "pagination aborted");
    Paged::aborted(
        entries,
        FetchFailure {
            url: url.to_string(),
            reason,
        },
    )
}
