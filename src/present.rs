//! Verdict presentation.
//!
//! Maps a parsed [`Verdict`] to a user-facing [`Category`] and assembles the
//! [`DisplayModel`] that the renderers in [`crate::outputs`] turn into text,
//! Markdown or JSON. Nothing here does I/O.

use crate::models::{EvidenceItem, EvidenceSet, EvidenceStatus, Verdict};
use serde::Serialize;

pub const NO_EVIDENCE_NOTICE: &str = "No related articles were found for this claim. \
     The verdict is based on the model's reasoning only.";
pub const FETCH_FAILED_NOTICE: &str = "The search call failed; no article evidence available.";
pub const CONFIDENCE_NOT_DETECTED: &str = "Confidence score not detected.";

/// User-facing verdict category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Category {
    NotANews,
    False,
    True,
    Unverified,
    /// A label no rule recognized, passed through unchanged.
    Other(String),
}

impl Category {
    pub fn indicator(&self) -> &'static str {
        match self {
            Category::NotANews => "⚪",
            Category::False => "🔴",
            Category::True => "🟢",
            Category::Unverified => "🟡",
            Category::Other(_) => "🔵",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::NotANews => "Not a news",
            Category::False => "False / Likely Fake",
            Category::True => "True / Verified",
            Category::Unverified => "Unverified",
            Category::Other(label) => label,
        }
    }
}

/// How a [`CategoryRule`] tests the lowercased label.
#[derive(Debug, Clone, Copy)]
enum Match {
    Contains(&'static str),
    Equals(&'static str),
}

impl Match {
    fn test(self, label: &str) -> bool {
        match self {
            Match::Contains(needle) => label.contains(needle),
            Match::Equals(exact) => label == exact,
        }
    }
}

#[derive(Debug)]
struct CategoryRule {
    any_of: &'static [Match],
    category: Category,
}

/// Evaluated top to bottom, first match wins.
///
/// "unverified" has to be tested before "verified" because the latter is a
/// substring of it, and "false"/"fake" before both.
static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        any_of: &[Match::Contains("not a news"), Match::Contains("not news")],
        category: Category::NotANews,
    },
    CategoryRule {
        any_of: &[Match::Contains("false"), Match::Contains("fake")],
        category: Category::False,
    },
    CategoryRule {
        any_of: &[Match::Contains("unverified")],
        category: Category::Unverified,
    },
    CategoryRule {
        any_of: &[Match::Contains("verified"), Match::Equals("true")],
        category: Category::True,
    },
];

/// Map a verdict label to its presentation category.
pub fn categorize(label: &str) -> Category {
    let normalized = label.trim().to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.any_of.iter().any(|m| m.test(&normalized)))
        .map(|rule| rule.category.clone())
        .unwrap_or_else(|| Category::Other(label.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConfidenceDisplay {
    Score { percent: u8 },
    NotDetected { notice: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvidenceEntry {
    pub title: String,
    /// "source — date", with whichever parts are known.
    pub byline: Option<String>,
    pub snippet: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EvidenceDisplay {
    Articles { entries: Vec<EvidenceEntry> },
    Notice { notice: String },
}

/// Everything a renderer needs for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub claim: String,
    /// Indicator plus category label, e.g. "🔴 False / Likely Fake".
    pub headline: String,
    pub category: Category,
    pub verdict: Verdict,
    pub confidence: ConfidenceDisplay,
    pub evidence: EvidenceDisplay,
    pub raw_text: String,
}

/// Build the display model for a parsed verdict and the evidence it was based on.
///
/// # Arguments
///
/// * `claim` - The claim as the user entered it
/// * `verdict` - Parsed label, reasoning and confidence
/// * `evidence` - Articles the prompt was built from
/// * `status` - Whether the evidence lookup succeeded, which picks the notice
///   shown when there are no articles
/// * `raw_text` - The model reply, kept for the raw-output section
///
/// # Returns
///
/// A [`DisplayModel`] with the category from [`categorize`], a confidence
/// score or the "not detected" notice, and one entry per article.
///
/// # Examples
///
/// ```ignore
/// let display = render(claim, &verdict, &evidence, EvidenceStatus::Fetched, raw);
/// assert_eq!(display.headline, "🔴 False / Likely Fake");
/// ```
pub fn render(
    claim: &str,
    verdict: &Verdict,
    evidence: &EvidenceSet,
    status: EvidenceStatus,
    raw_text: &str,
) -> DisplayModel {
    let category = categorize(&verdict.label);
    DisplayModel {
        claim: claim.to_string(),
        headline: format!("{} {}", category.indicator(), category.label()),
        category,
        verdict: verdict.clone(),
        confidence: confidence_display(verdict.confidence),
        evidence: evidence_display(evidence, status),
        raw_text: raw_text.to_string(),
    }
}

fn confidence_display(confidence: Option<u8>) -> ConfidenceDisplay {
    match confidence {
        Some(percent) => ConfidenceDisplay::Score {
            percent: percent.min(100),
        },
        None => ConfidenceDisplay::NotDetected {
            notice: CONFIDENCE_NOT_DETECTED.to_string(),
        },
    }
}

/// Render the evidence section on its own, used when there is no verdict to show.
pub fn evidence_display(evidence: &EvidenceSet, status: EvidenceStatus) -> EvidenceDisplay {
    match status {
        EvidenceStatus::Failed => EvidenceDisplay::Notice {
            notice: FETCH_FAILED_NOTICE.to_string(),
        },
        EvidenceStatus::Fetched if evidence.is_empty() => EvidenceDisplay::Notice {
            notice: NO_EVIDENCE_NOTICE.to_string(),
        },
        EvidenceStatus::Fetched => EvidenceDisplay::Articles {
            entries: evidence.items().iter().map(evidence_entry).collect(),
        },
    }
}

fn evidence_entry(item: &EvidenceItem) -> EvidenceEntry {
    let byline = match (item.source.as_deref(), item.date.as_deref()) {
        (Some(source), Some(date)) => Some(format!("{source} — {date}")),
        (Some(source), None) => Some(source.to_string()),
        (None, Some(date)) => Some(date.to_string()),
        (None, None) => None,
    };
    EvidenceEntry {
        title: if item.title.trim().is_empty() {
            "(untitled)".to_string()
        } else {
            item.title.clone()
        },
        byline,
        snippet: item.snippet.clone().filter(|s| !s.trim().is_empty()),
        link: item.link.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn verdict(label: &str, confidence: Option<u8>) -> Verdict {
        Verdict {
            label: label.to_string(),
            reasoning: "Because.".to_string(),
            confidence,
        }
    }

    #[test]
    fn test_category_rule_not_a_news() {
        assert_eq!(categorize("Not a news"), Category::NotANews);
        assert_eq!(categorize("Not A News"), Category::NotANews);
        assert_eq!(categorize("Not News"), Category::NotANews);
    }

    #[test]
    fn test_category_rule_false() {
        assert_eq!(categorize("False"), Category::False);
        assert_eq!(categorize("Likely Fake"), Category::False);
    }

    #[test]
    fn test_category_rule_verified_and_true() {
        assert_eq!(categorize("Verified"), Category::True);
        assert_eq!(categorize("True"), Category::True);
        assert_eq!(categorize(" true "), Category::True);
    }

    #[test]
    fn test_category_rule_unverified() {
        assert_eq!(categorize("Unverified"), Category::Unverified);
    }

    #[test]
    fn test_unverified_and_verified_do_not_collide() {
        // Both labels share the "verified" substring.
        assert_eq!(categorize("Unverified").label(), "Unverified");
        assert_eq!(categorize("Verified").label(), "True / Verified");
        assert_ne!(categorize("Unverified"), categorize("Verified"));
    }

    #[test]
    fn test_false_outranks_verified() {
        assert_eq!(categorize("False Verified"), Category::False);
    }

    #[test]
    fn test_unrecognized_label_passes_through() {
        let category = categorize("Partly True");
        assert_eq!(category, Category::Other("Partly True".to_string()));
        assert_eq!(category.label(), "Partly True");
        assert_eq!(category.indicator(), "🔵");
    }

    #[test]
    fn test_end_to_end_false_claim() {
        let raw = "Final Verdict: False\nReasoning: No credible source confirms this.\nConfidence: 92%";
        let parsed = parser::parse(raw);
        let model = render(
            "Flight MH370 found in 2024",
            &parsed,
            &EvidenceSet::empty(),
            EvidenceStatus::Fetched,
            raw,
        );
        assert_eq!(model.verdict.label, "False");
        assert_eq!(model.verdict.reasoning, "No credible source confirms this.");
        assert_eq!(model.category.label(), "False / Likely Fake");
        assert_eq!(model.headline, "🔴 False / Likely Fake");
        assert_eq!(model.confidence, ConfidenceDisplay::Score { percent: 92 });
    }

    #[test]
    fn test_missing_confidence_shows_notice() {
        let model = render(
            "claim",
            &verdict("True", None),
            &EvidenceSet::empty(),
            EvidenceStatus::Fetched,
            "",
        );
        assert_eq!(
            model.confidence,
            ConfidenceDisplay::NotDetected {
                notice: "Confidence score not detected.".to_string()
            }
        );
    }

    #[test]
    fn test_empty_evidence_shows_notice() {
        let display = evidence_display(&EvidenceSet::empty(), EvidenceStatus::Fetched);
        assert_eq!(
            display,
            EvidenceDisplay::Notice {
                notice: NO_EVIDENCE_NOTICE.to_string()
            }
        );
    }

    #[test]
    fn test_failed_fetch_shows_failure_notice() {
        let display = evidence_display(&EvidenceSet::empty(), EvidenceStatus::Failed);
        assert_eq!(
            display,
            EvidenceDisplay::Notice {
                notice: FETCH_FAILED_NOTICE.to_string()
            }
        );
    }

    #[test]
    fn test_evidence_entries_keep_order_and_fields() {
        let evidence = EvidenceSet::from_items(
            vec![
                EvidenceItem {
                    title: "Search resumes".to_string(),
                    link: Some("https://example.com/a".to_string()),
                    source: Some("Reuters".to_string()),
                    date: Some("03/04/2024".to_string()),
                    snippet: Some("Officials said...".to_string()),
                },
                EvidenceItem {
                    title: String::new(),
                    link: None,
                    source: None,
                    date: Some("yesterday".to_string()),
                    snippet: Some("  ".to_string()),
                },
            ],
            8,
        );
        let EvidenceDisplay::Articles { entries } =
            evidence_display(&evidence, EvidenceStatus::Fetched)
        else {
            panic!("expected articles");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "Search resumes");
        assert_eq!(entries[0].byline.as_deref(), Some("Reuters — 03/04/2024"));
        assert_eq!(entries[0].snippet.as_deref(), Some("Officials said..."));
        assert_eq!(entries[1].title, "(untitled)");
        assert_eq!(entries[1].byline.as_deref(), Some("yesterday"));
        assert_eq!(entries[1].snippet, None);
        assert_eq!(entries[1].link, None);
    }

    #[test]
    fn test_display_model_serializes() {
        let model = render(
            "claim",
            &verdict("Partly True", Some(50)),
            &EvidenceSet::empty(),
            EvidenceStatus::Fetched,
            "raw",
        );
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["category"]["kind"], "other");
        assert_eq!(json["category"]["label"], "Partly True");
        assert_eq!(json["confidence"]["state"], "score");
        assert_eq!(json["confidence"]["percent"], 50);
        assert_eq!(json["evidence"]["state"], "notice");
    }
}
