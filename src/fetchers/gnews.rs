//! Google News RSS search, a source that needs no API key.
//!
//! Google News titles carry the publisher as a `" - Publisher"` suffix; it
//! is moved into `source`. Descriptions are small HTML fragments and are
//! reduced to plain text.

use super::EvidenceSource;
use crate::config::{GnewsSettings, SearchSettings};
use crate::models::{EvidenceItem, EvidenceSet};
use scraper::Html;
use serde::Deserialize;
use std::error::Error;
use tracing::{info, instrument};
use url::Url;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
    source: Option<RssSource>,
}

#[derive(Debug, Deserialize)]
struct RssSource {
    #[serde(rename = "$text")]
    name: Option<String>,
}

#[derive(Debug)]
pub struct GoogleNewsFetcher {
    client: reqwest::Client,
    settings: GnewsSettings,
    search: SearchSettings,
}

impl GoogleNewsFetcher {
    pub fn new(client: reqwest::Client, settings: GnewsSettings, search: SearchSettings) -> Self {
        Self {
            client,
            settings,
            search,
        }
    }

    fn search_url(&self, query: &str) -> Result<Url, Box<dyn Error>> {
        let region = self.search.region.to_uppercase();
        let language = &self.search.language;
        let mut url = Url::parse(&self.settings.base_url)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("hl", &format!("{language}-{region}"))
            .append_pair("gl", &region)
            .append_pair("ceid", &format!("{region}:{language}"));
        Ok(url)
    }
}

impl EvidenceSource for GoogleNewsFetcher {
    fn name(&self) -> &'static str {
        "gnews"
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, query: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>> {
        let url = self.search_url(query)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(format!("Google News returned HTTP {}", response.status()).into());
        }
        let xml = response.text().await?;
        let evidence = parse_feed(&xml, max_results)?;
        info!(count = evidence.len(), "Google News search complete");
        Ok(evidence)
    }
}

/// Parse a Google News RSS document into evidence.
pub fn parse_feed(xml: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    let items = rss
        .channel
        .items
        .into_iter()
        .take(max_results)
        .map(|item| {
            let source = item
                .source
                .and_then(|s| s.name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            let title = item.title.unwrap_or_default();
            let title = match &source {
                Some(name) => title
                    .strip_suffix(name.as_str())
                    .and_then(|t| t.trim_end().strip_suffix('-'))
                    .map(|t| t.trim_end().to_string())
                    .unwrap_or(title.clone()),
                None => title,
            };
            EvidenceItem {
                title,
                link: item.link,
                source,
                date: item.pub_date,
                snippet: item
                    .description
                    .map(|d| html_to_text(&d))
                    .filter(|d| !d.is_empty()),
            }
        })
        .collect();
    Ok(EvidenceSet::from_items(items, max_results))
}

fn html_to_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    parsed
        .root_element()
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
