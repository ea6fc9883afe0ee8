//! Verdict extraction from the model's free-text reply.
//!
//! The model is asked (see [`crate::prompt`]) to answer in three labeled lines:
//!
//! ```text
//! Final Verdict: <label>
//! Reasoning: <1-3 sentences>
//! Confidence: <0-100>%
//! ```
//!
//! Model wording drifts, so every field has a fallback and [`parse`] never
//! fails: a missing label becomes "Unverified", missing reasoning becomes the
//! whole reply, and a missing confidence stays `None`.

use crate::models::Verdict;
use crate::utils::title_case;
use once_cell::sync::Lazy;
use regex::Regex;

/// Label used when the reply has no "Final Verdict:" line.
pub const DEFAULT_LABEL: &str = "Unverified";

static VERDICT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Final\s*Verdict\s*:\s*([A-Za-z ]+)").unwrap());

static CONFIDENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Confidence\s*:\s*(\d{1,3})\s*%?").unwrap());

static REASONING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)Reasoning\s*:\s*(.+)").unwrap());

// A later template label ends the reasoning section.
static SECTION_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^[ \t]*(?:Confidence|Final\s*Verdict)\s*:").unwrap());

/// Parse a raw model reply into a [`Verdict`].
///
/// Never fails: every part has a fallback.
///
/// # Returns
///
/// - `label`: text after "Final Verdict:", title-cased, or `"Unverified"`
/// - `reasoning`: text after "Reasoning:" up to the next label line, or the
///   whole reply when there is none
/// - `confidence`: the number after "Confidence:", clamped to 100, or `None`
///
/// # Examples
///
/// ```ignore
/// let v = parse("Final Verdict: false\nReasoning: No source.\nConfidence: 92%");
/// assert_eq!(v.label, "False");
/// assert_eq!(v.confidence, Some(92));
/// ```
pub fn parse(raw_text: &str) -> Verdict {
    Verdict {
        label: parse_label(raw_text),
        reasoning: parse_reasoning(raw_text),
        confidence: parse_confidence(raw_text),
    }
}

fn parse_label(text: &str) -> String {
    VERDICT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(title_case)
        .unwrap_or_else(|| DEFAULT_LABEL.to_string())
}

fn parse_confidence(text: &str) -> Option<u8> {
    let digits = CONFIDENCE_RE.captures(text)?.get(1)?.as_str();
    // At most three digits, so this cannot overflow u16.
    let value: u16 = digits.parse().ok()?;
    Some(value.min(100) as u8)
}

fn parse_reasoning(text: &str) -> String {
    let Some(rest) = REASONING_RE.captures(text).and_then(|c| c.get(1)) else {
        return text.to_string();
    };
    let rest = rest.as_str();
    let section = match SECTION_END_RE.find(rest) {
        Some(end) => &rest[..end.start()],
        None => rest,
    };
    let section = section.trim();
    if section.is_empty() {
        text.to_string()
    } else {
        section.to_string()
    }
}
