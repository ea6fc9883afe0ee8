//! Outlet search page scraper.
//!
//! Requests the outlet's own search results page (Indian Express by default)
//! and reads the top results out of the HTML. Result pages are requested one
//! after another until `max_results` items are found or `extra_pages` runs out.
//!
//! # Extraction
//!
//! - Title and link come from the element matched by `result_selector`.
//! - The description is the `<p>` child of the nearest ancestor `<div>` whose
//!   class contains `description_container_class`. Outlets change this markup
//!   often, so a miss yields [`NO_DESCRIPTION`] instead of an error.
//! - A result with no title or no usable link is logged and skipped.

use super::EvidenceSource;
use crate::config::SiteSettings;
use crate::models::{EvidenceItem, EvidenceSet, NO_DESCRIPTION};
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug)]
pub struct SiteFetcher {
    client: reqwest::Client,
    settings: SiteSettings,
}

impl SiteFetcher {
    pub fn new(client: reqwest::Client, settings: SiteSettings) -> Self {
        Self { client, settings }
    }

    /// URL of result page `page` (1-based) for `query`.
    fn page_url(&self, query: &str, page: usize) -> Result<Url, Box<dyn Error>> {
        let raw = self
            .settings
            .search_url
            .replace("{query}", &urlencoding::encode(query));
        let mut url = Url::parse(&raw)?;
        if page > 1 {
            url.query_pairs_mut().append_pair("paged", &page.to_string());
        }
        Ok(url)
    }
}

impl EvidenceSource for SiteFetcher {
    fn name(&self) -> &'static str {
        "site"
    }

    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, query: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>> {
        let mut items = Vec::new();
        let last_page = 1 + self.settings.extra_pages;

        for page in 1..=last_page {
            let url = self.page_url(query, page)?;
            let response = match self.client.get(url.clone()).send().await {
                Ok(r) => r,
                Err(e) if page > 1 => {
                    warn!(page, error = %e, "Further result page failed; keeping what we have");
                    break;
                }
                Err(e) => return Err(e.into()),
            };
            if !response.status().is_success() {
                let status = response.status();
                if page == 1 {
                    return Err(format!("search page returned HTTP {status}").into());
                }
                warn!(page, %status, "Further result page unavailable");
                break;
            }
            let html = response.text().await?;

            if self.settings.settle_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.settings.settle_delay_ms)).await;
            }

            let found = parse_results(&html, &url, &self.settings)?;
            debug!(page, count = found.len(), "Parsed result page");
            if found.is_empty() {
                break;
            }
            items.extend(found);
            if items.len() >= max_results {
                break;
            }
        }

        info!(count = items.len().min(max_results), "Scraped search results");
        Ok(EvidenceSet::from_items(items, max_results))
    }
}

/// Extract every result on one search page, in page order.
///
/// Only an unusable selector is an error. Individual results that cannot be
/// read are skipped.
///
/// # Arguments
///
/// * `html` - The search page body
/// * `page_url` - URL the page was fetched from; relative links are joined
///   onto it and its host becomes the item source
/// * `settings` - Result selector and description container class
///
/// # Returns
///
/// One [`EvidenceItem`] per readable result, with [`NO_DESCRIPTION`] as the
/// snippet when no description container is found.
pub fn parse_results(
    html: &str,
    page_url: &Url,
    settings: &SiteSettings,
) -> Result<Vec<EvidenceItem>, Box<dyn Error>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&settings.result_selector)
        .map_err(|e| format!("invalid result selector {:?}: {e:?}", settings.result_selector))?;
    let source = page_url.host_str().map(|h| h.trim_start_matches("www.").to_string());

    let mut items = Vec::new();
    for (index, anchor) in document.select(&selector).enumerate() {
        match extract_item(anchor, page_url, &settings.description_container_class) {
            Ok(mut item) => {
                item.source = source.clone();
                items.push(item);
            }
            Err(reason) => warn!(index, %reason, "Skipping one article"),
        }
    }
    Ok(items)
}

fn extract_item(
    anchor: ElementRef<'_>,
    page_url: &Url,
    container_class: &str,
) -> Result<EvidenceItem, String> {
    let title = collapse_whitespace(&anchor.text().collect::<String>());
    if title.is_empty() {
        return Err("result has no title".to_string());
    }

    let href = anchor
        .value()
        .attr("href")
        .ok_or_else(|| format!("result {title:?} has no link"))?;
    let link = page_url
        .join(href)
        .map_err(|e| format!("result {title:?} has a bad link {href:?}: {e}"))?;

    let snippet = description_for(anchor, container_class)
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    Ok(EvidenceItem {
        title,
        link: Some(link.to_string()),
        source: None,
        date: None,
        snippet: Some(snippet),
    })
}

fn description_for(anchor: ElementRef<'_>, container_class: &str) -> Option<String> {
    anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "div")
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| c.contains(container_class))
        })
        .find_map(|container| {
            container
                .children()
                .filter_map(ElementRef::wrap)
                .find(|child| child.value().name() == "p")
                .map(|p| collapse_whitespace(&p.text().collect::<String>()))
                .filter(|text| !text.is_empty())
        })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <div class="search-result">
            <div class="img-context">
              <h3><a href="/article/world/mh370-search-resumes-123/">MH370 search
                  resumes</a></h3>
              <p>Malaysia approves a new seabed search.</p>
            </div>
          </div>
          <div class="search-result">
            <div class="details">
              <h3><a href="https://indianexpress.com/article/india/no-desc-456/">No description here</a></h3>
            </div>
          </div>
          <div class="search-result">
            <h3><a href="/article/empty/">   </a></h3>
          </div>
          <div class="search-result">
            <h3><a>Headline without link</a></h3>
          </div>
          <div class="search-result">
            <div class="img-context">
              <h3><a href="/article/third/">Third story</a></h3>
              <p>   </p>
            </div>
          </div>
        </body></html>
    "#;

    fn page_url() -> Url {
        Url::parse("https://indianexpress.com/?s=mh370").unwrap()
    }

    #[test]
    fn test_parse_results_extracts_title_link_and_description() {
        let items = parse_results(PAGE, &page_url(), &SiteSettings::default()).unwrap();
        assert_eq!(items[0].title, "MH370 search resumes");
        assert_eq!(
            items[0].link.as_deref(),
            Some("https://indianexpress.com/article/world/mh370-search-resumes-123/")
        );
        assert_eq!(
            items[0].snippet.as_deref(),
            Some("Malaysia approves a new seabed search.")
        );
        assert_eq!(items[0].source.as_deref(), Some("indianexpress.com"));
    }

    #[test]
    fn test_missing_description_uses_placeholder() {
        let items = parse_results(PAGE, &page_url(), &SiteSettings::default()).unwrap();
        assert_eq!(items[1].title, "No description here");
        assert_eq!(items[1].snippet.as_deref(), Some(NO_DESCRIPTION));
        assert_eq!(items[2].title, "Third story");
        assert_eq!(items[2].snippet.as_deref(), Some(NO_DESCRIPTION));
    }

    #[test]
    fn test_broken_results_are_skipped_not_fatal() {
        let items = parse_results(PAGE, &page_url(), &SiteSettings::default()).unwrap();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| !i.title.is_empty() && i.link.is_some()));
    }

    #[test]
    fn test_page_without_results() {
        let items = parse_results("<html><body><p>Nothing</p></body></html>", &page_url(), &SiteSettings::default()).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let settings = SiteSettings {
            result_selector: "div[[".to_string(),
            ..SiteSettings::default()
        };
        assert!(parse_results(PAGE, &page_url(), &settings).is_err());
    }

    #[test]
    fn test_page_url_encodes_query_and_pages() {
        let fetcher = SiteFetcher::new(reqwest::Client::new(), SiteSettings::default());
        let first = fetcher.page_url("MH370 found & confirmed", 1).unwrap();
        assert_eq!(
            first.as_str(),
            "https://indianexpress.com/?s=MH370%20found%20%26%20confirmed"
        );
        let third = fetcher.page_url("budget", 3).unwrap();
        assert_eq!(third.as_str(), "https://indianexpress.com/?s=budget&paged=3");
    }
}
