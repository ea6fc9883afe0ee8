//! Google News results through SerpAPI.
//!
//! One GET to `https://serpapi.com/search.json?engine=google_news` with fixed
//! region (`gl`) and language (`hl`). Fields the API leaves out stay `None`;
//! this source never substitutes placeholder text.

use super::EvidenceSource;
use crate::config::SearchSettings;
use crate::models::{EvidenceItem, EvidenceSet};
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};

const ENDPOINT: &str = "https://serpapi.com/search.json";

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    news_results: Vec<SerpNewsResult>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SerpNewsResult {
    title: Option<String>,
    link: Option<String>,
    source: Option<SerpSource>,
    date: Option<String>,
    snippet: Option<String>,
}

/// `source` is a bare string in older responses and an object in newer ones.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SerpSource {
    Name(String),
    Detailed { name: Option<String> },
}

impl SerpSource {
    fn into_name(self) -> Option<String> {
        match self {
            SerpSource::Name(name) => Some(name),
            SerpSource::Detailed { name } => name,
        }
    }
}

pub struct SerpApiFetcher {
    client: reqwest::Client,
    api_key: String,
    search: SearchSettings,
}

// Hand-written so the key stays out of `?fetcher` log fields.
impl std::fmt::Debug for SerpApiFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiFetcher")
            .field("search", &self.search)
            .finish()
    }
}

impl SerpApiFetcher {
    pub fn new(client: reqwest::Client, api_key: &str, search: SearchSettings) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            search,
        }
    }
}

impl EvidenceSource for SerpApiFetcher {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, query: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>> {
        let response = self
            .client
            .get(ENDPOINT)
            .query(&[
                ("engine", "google_news"),
                ("q", query),
                ("api_key", self.api_key.as_str()),
                ("hl", self.search.language.as_str()),
                ("gl", self.search.region.as_str()),
            ])
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url())?;
        if !status.is_success() {
            let detail = serde_json::from_str::<SerpApiResponse>(&body)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_default();
            return Err(format!("SerpAPI returned HTTP {status} {detail}")
                .trim_end()
                .into());
        }
        let evidence = parse_response(&body, max_results)?;

        info!(count = evidence.len(), "SerpAPI search complete");
        Ok(evidence)
    }
}

/// Map a SerpAPI Google News response body to evidence.
///
/// An `error` field in the body is reported as an error even when the list is
/// present. An empty result list is not an error.
///
/// # Arguments
///
/// * `body` - Raw JSON body of a `google_news` search
/// * `max_results` - Maximum number of items kept, in API order
///
/// # Returns
///
/// The mapped [`EvidenceSet`]. Missing `title` becomes an empty string; every
/// other missing field stays `None`.
///
/// # Errors
///
/// A body that is not JSON, or an `error` field other than SerpAPI's
/// "hasn't returned any results" message.
pub fn parse_response(body: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>> {
    let parsed: SerpApiResponse = serde_json::from_str(body)?;
    if let Some(message) = parsed.error {
        // "hasn't returned any results" is how SerpAPI reports an empty search.
        if !message.contains("hasn't returned any results") {
            return Err(format!("SerpAPI error: {message}").into());
        }
    }

    let items = parsed
        .news_results
        .into_iter()
        .take(max_results)
        .map(|r| EvidenceItem {
            title: r.title.unwrap_or_default(),
            link: r.link,
            source: r.source.and_then(SerpSource::into_name),
            date: r.date,
            snippet: r.snippet,
        })
        .collect();
    Ok(EvidenceSet::from_items(items, max_results))
}
