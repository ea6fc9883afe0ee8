//! Terminal rendering.

use super::confidence_bar;
use crate::pipeline::{Analysis, Outcome};
use crate::present::{ConfidenceDisplay, DisplayModel, EvidenceDisplay};
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

fn heading(out: &mut String, title: &str) {
    writeln!(out, "\n==================== {title} ====================\n").unwrap();
}

/// Render an analysis for stdout. `show_raw` appends the model's raw reply.
pub fn render(analysis: &Analysis, show_raw: bool) -> String {
    let mut out = String::new();

    for warning in &analysis.warnings {
        writeln!(out, "Warning: {warning}").unwrap();
    }

    match &analysis.outcome {
        Outcome::Verdict { display } => {
            render_verdict(&mut out, display);
            render_evidence(&mut out, &display.evidence);
            if show_raw {
                heading(&mut out, "RAW MODEL OUTPUT");
                writeln!(out, "{}", display.raw_text).unwrap();
            }
        }
        Outcome::Summary { text, evidence } => {
            render_evidence(&mut out, evidence);
            heading(&mut out, "AI SUMMARY");
            writeln!(out, "{text}").unwrap();
        }
        Outcome::Unavailable { error, evidence } => {
            heading(&mut out, "VERDICT");
            writeln!(out, "No analysis available: {error}").unwrap();
            render_evidence(&mut out, evidence);
        }
    }
    out
}

fn render_verdict(out: &mut String, display: &DisplayModel) {
    heading(out, "VERDICT");
    writeln!(out, "{}\n", display.headline).unwrap();
    writeln!(out, "{}\n", display.verdict.reasoning).unwrap();
    match &display.confidence {
        ConfidenceDisplay::Score { percent } => {
            writeln!(
                out,
                "Confidence: {} {percent}%",
                confidence_bar(*percent, BAR_WIDTH)
            )
            .unwrap();
        }
        ConfidenceDisplay::NotDetected { notice } => {
            writeln!(out, "{notice}").unwrap();
        }
    }
}

fn render_evidence(out: &mut String, evidence: &EvidenceDisplay) {
    heading(out, "RESOURCES");
    match evidence {
        EvidenceDisplay::Notice { notice } => {
            writeln!(out, "{notice}").unwrap();
        }
        EvidenceDisplay::Articles { entries } => {
            for (i, entry) in entries.iter().enumerate() {
                writeln!(out, "{}. {}", i + 1, entry.title).unwrap();
                if let Some(byline) = &entry.byline {
                    writeln!(out, "   {byline}").unwrap();
                }
                if let Some(snippet) = &entry.snippet {
                    writeln!(out, "   {snippet}").unwrap();
                }
                if let Some(link) = &entry.link {
                    writeln!(out, "   Read more: {link}").unwrap();
                }
                writeln!(out, "{}", "-".repeat(80)).unwrap();
            }
        }
    }
}
