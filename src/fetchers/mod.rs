//! Evidence fetchers: find news coverage for a claim.
//!
//! Every fetcher implements [`EvidenceSource`] and returns at most
//! `max_results` items in the order the source ranked them.
//!
//! # Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | SerpAPI Google News | [`serpapi`] | JSON API | Requires `SERPAPI_KEY` |
//! | Outlet search page | [`site`] | HTML scraping | Indian Express by default, placeholder descriptions |
//! | Google News RSS | [`gnews`] | RSS feed | No key needed |
//!
//! A failed fetch is an `Err`; the caller decides to carry on without evidence.
//! A single malformed result is skipped inside the fetcher and never fails the batch.

pub mod gnews;
pub mod serpapi;
pub mod site;

use crate::models::EvidenceSet;
use std::collections::HashMap;
use std::error::Error;

/// Something that can look up news coverage for a query.
pub trait EvidenceSource {
    /// Short name used in logs and warnings.
    fn name(&self) -> &'static str;

    async fn fetch(&self, query: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>>;
}

/// The fetcher selected on the command line.
#[derive(Debug)]
pub enum Fetcher {
    SerpApi(serpapi::SerpApiFetcher),
    Site(site::SiteFetcher),
    GoogleNews(gnews::GoogleNewsFetcher),
}

impl EvidenceSource for Fetcher {
    fn name(&self) -> &'static str {
        match self {
            Fetcher::SerpApi(f) => f.name(),
            Fetcher::Site(f) => f.name(),
            Fetcher::GoogleNews(f) => f.name(),
        }
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<EvidenceSet, Box<dyn Error>> {
        match self {
            Fetcher::SerpApi(f) => f.fetch(query, max_results).await,
            Fetcher::Site(f) => f.fetch(query, max_results).await,
            Fetcher::GoogleNews(f) => f.fetch(query, max_results).await,
        }
    }
}

/// Per-session cache of successful fetches, keyed by the literal query.
///
/// Entries never expire, so a repeated query in the same session sees the
/// first result even if coverage changed in the meantime.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<(String, usize), EvidenceSet>,
}

impl QueryCache {
    pub fn get(&self, query: &str, max_results: usize) -> Option<&EvidenceSet> {
        self.entries.get(&(query.to_string(), max_results))
    }

    pub fn insert(&mut self, query: &str, max_results: usize, evidence: EvidenceSet) {
        self.entries.insert((query.to_string(), max_results), evidence);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvidenceItem;

    #[test]
    fn test_query_cache_is_keyed_by_literal_query() {
        let mut cache = QueryCache::default();
        let set = EvidenceSet::from_items(
            vec![EvidenceItem {
                title: "Cached".to_string(),
                ..Default::default()
            }],
            8,
        );
        cache.insert("MH370 found", 8, set.clone());
        assert_eq!(cache.get("MH370 found", 8), Some(&set));
        assert_eq!(cache.get("mh370 found", 8), None);
        assert_eq!(cache.get("MH370 found", 5), None);
        assert_eq!(cache.len(), 1);
    }
}
