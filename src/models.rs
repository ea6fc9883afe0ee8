//! Data models shared by the fetchers, the parser and the presenter.
//!
//! - [`EvidenceItem`]: one news article discovered for a claim
//! - [`EvidenceSet`]: the ordered, capped list of evidence handed to the prompt builder
//! - [`EvidenceStatus`]: whether the evidence fetch succeeded or failed
//! - [`Verdict`]: the normalized reading of the model's free-text reply

use serde::{Deserialize, Serialize};

/// Placeholder used by the site scraper when a result has no readable description.
pub const NO_DESCRIPTION: &str = "No description available";

/// A single news article found for the claim.
///
/// Every field is best-effort. The site scraper fills `snippet` with
/// [`NO_DESCRIPTION`] when it cannot find one, while the API-backed sources
/// leave missing fields as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvidenceItem {
    /// The headline. May be empty.
    pub title: String,
    /// Absolute URL of the article.
    pub link: Option<String>,
    /// Publisher name, e.g. "The Hindu".
    pub source: Option<String>,
    /// Publication date exactly as the source reported it.
    pub date: Option<String>,
    /// Description or search snippet.
    pub snippet: Option<String>,
}

/// Ordered evidence for one claim, never longer than the `max_results` it was built with.
///
/// Order is the ranking of the source and is preserved all the way to the
/// prompt. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct EvidenceSet {
    items: Vec<EvidenceItem>,
}

impl EvidenceSet {
    /// Build a set from ranked items, keeping only the first `max_results`.
    pub fn from_items(mut items: Vec<EvidenceItem>, max_results: usize) -> Self {
        items.truncate(max_results);
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[EvidenceItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Outcome of the evidence fetch, kept so the presenter can tell
/// "nothing matched" apart from "the search call failed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceStatus {
    Fetched,
    Failed,
}

/// The normalized result of parsing one model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Title-cased verdict label, "Unverified" when the reply had none.
    pub label: String,
    /// The model's explanation, or the whole reply when no reasoning section was found.
    pub reasoning: String,
    /// Stated confidence clamped to 0..=100. `None` means the reply had no
    /// confidence line, which is not the same as zero.
    pub confidence: Option<u8>,
}
