//! Prompt construction.
//!
//! [`build_prompt`] produces the fact-checking prompt whose output template
//! ("Final Verdict:", "Reasoning:", "Confidence:") is what [`crate::parser`]
//! matches against. Change both together.

use crate::models::{EvidenceItem, EvidenceSet};
use itertools::Itertools;

pub const NO_EVIDENCE_PLACEHOLDER: &str = "No relevant articles were found for this claim.";

/// The closed set of labels the model may answer with.
pub const VERDICT_LABELS: [&str; 5] = ["True", "False", "Unverified", "Verified", "Not a news"];

/// Build the verdict prompt for `claim`.
///
/// Items without a title are left out of the listing; if none remain the
/// [`NO_EVIDENCE_PLACEHOLDER`] sentence is used instead.
pub fn build_prompt(claim: &str, evidence: &EvidenceSet) -> String {
    let listed: Vec<&EvidenceItem> = evidence
        .items()
        .iter()
        .filter(|item| !item.title.trim().is_empty())
        .collect();

    let articles_text = if listed.is_empty() {
        NO_EVIDENCE_PLACEHOLDER.to_string()
    } else {
        listed
            .iter()
            .enumerate()
            .map(|(i, item)| render_item(i + 1, item))
            .join("\n")
    };

    let choices = VERDICT_LABELS
        .iter()
        .map(|label| format!("   - \"{label}\""))
        .join("\n");
    let template_labels = VERDICT_LABELS.join(" / ");

    format!(
        "You are an AI fact-checker.\n\
         \n\
         User claim:\n\
         \"\"\"{claim}\"\"\"\n\
         \n\
         Here is relevant news coverage (if any):\n\
         {articles_text}\n\
         \n\
         Your job:\n\
         1. Decide whether the user claim is exactly one of:\n\
         {choices}\n\
         2. Explain your reasoning briefly (1-3 sentences).\n\
         3. Give a confidence score between 0 and 100.\n\
         \n\
         Respond in exactly this plain-text format:\n\
         \n\
         Final Verdict: <{template_labels}>\n\
         Reasoning: <your explanation in 1-3 sentences>\n\
         Confidence: <number between 0 and 100>%\n"
    )
}

fn render_item(n: usize, item: &EvidenceItem) -> String {
    let mut lines = vec![format!("{n}. Title: {}", item.title.trim())];
    if let Some(source) = &item.source {
        lines.push(format!("   Source: {source}"));
    }
    if let Some(date) = &item.date {
        lines.push(format!("   Date: {date}"));
    }
    if let Some(snippet) = &item.snippet {
        lines.push(format!("   Snippet: {snippet}"));
    }
    if let Some(link) = &item.link {
        lines.push(format!("   Link: {link}"));
    }
    lines.join("\n")
}

/// Build the free-form credibility summary prompt.
///
/// Used with `--summary`; the reply is shown as-is and never parsed.
pub fn build_summary_prompt(query: &str, evidence: &EvidenceSet) -> String {
    let found = if evidence.is_empty() {
        NO_EVIDENCE_PLACEHOLDER.to_string()
    } else {
        evidence
            .items()
            .iter()
            .map(|item| {
                format!(
                    "Title: {}\nDescription: {}\nLink: {}\n",
                    item.title,
                    item.snippet.as_deref().unwrap_or(""),
                    item.link.as_deref().unwrap_or("")
                )
            })
            .join("\n")
    };

    format!(
        "Check the credibility of the news as of today: '{query}'\n\n\
         Provide key insights, tone, and an overall summary in brief.\n\n\
         Here is what was found for this news:\n\n{found}"
    )
}
