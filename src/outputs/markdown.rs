//! Markdown report output.

use super::{ReportLocation, confidence_bar};
use crate::pipeline::{Analysis, Outcome};
use crate::present::{ConfidenceDisplay, EvidenceDisplay};
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// Render an analysis as a Markdown document.
pub fn analysis_to_markdown(analysis: &Analysis) -> String {
    let mut md = String::new();

    writeln!(md, "# Claim check\n").unwrap();
    writeln!(md, "> {}\n", analysis.claim.replace('\n', "\n> ")).unwrap();
    writeln!(
        md,
        "*Evidence source: {} · generated {}*\n",
        analysis.source, analysis.generated_at
    )
    .unwrap();

    for warning in &analysis.warnings {
        writeln!(md, "> **Warning:** {warning}\n").unwrap();
    }

    let evidence = match &analysis.outcome {
        Outcome::Verdict { display } => {
            writeln!(md, "## Verdict\n").unwrap();
            writeln!(md, "**{}**\n", display.headline).unwrap();
            writeln!(md, "{}\n", display.verdict.reasoning).unwrap();
            match &display.confidence {
                ConfidenceDisplay::Score { percent } => writeln!(
                    md,
                    "**Confidence:** {percent}% `{}`\n",
                    confidence_bar(*percent, 20)
                )
                .unwrap(),
                ConfidenceDisplay::NotDetected { notice } => writeln!(md, "*{notice}*\n").unwrap(),
            }
            &display.evidence
        }
        Outcome::Summary { text, evidence } => {
            writeln!(md, "## Summary\n").unwrap();
            writeln!(md, "{text}\n").unwrap();
            evidence
        }
        Outcome::Unavailable { error, evidence } => {
            writeln!(md, "## Verdict\n").unwrap();
            writeln!(md, "No analysis available: {error}\n").unwrap();
            evidence
        }
    };

    writeln!(md, "## Resources\n").unwrap();
    match evidence {
        EvidenceDisplay::Notice { notice } => writeln!(md, "{notice}\n").unwrap(),
        EvidenceDisplay::Articles { entries } => {
            for entry in entries {
                match &entry.link {
                    Some(link) => writeln!(md, "### [{}]({})\n", entry.title, link).unwrap(),
                    None => writeln!(md, "### {}\n", entry.title).unwrap(),
                }
                if let Some(byline) = &entry.byline {
                    writeln!(md, "*{byline}*\n").unwrap();
                }
                if let Some(snippet) = &entry.snippet {
                    writeln!(md, "{snippet}\n").unwrap();
                }
            }
        }
    }

    if let Outcome::Verdict { display } = &analysis.outcome {
        writeln!(md, "<details><summary>Raw model output</summary>\n").unwrap();
        let fence = code_fence(&display.raw_text);
        writeln!(md, "{fence}text\n{}\n{fence}\n", display.raw_text).unwrap();
        writeln!(md, "</details>").unwrap();
    }

    md
}

/// A backtick fence one longer than the longest backtick run in `text`, and
/// never shorter than three.
fn code_fence(text: &str) -> String {
    let longest = text
        .split(|c: char| c != '`')
        .map(str::len)
        .max()
        .unwrap_or(0);
    "`".repeat((longest + 1).max(3))
}

/// Write the Markdown report at `location` and return the file path.
#[instrument(level = "info", skip_all, fields(dir = %location.dir))]
pub async fn write_report(
    analysis: &Analysis,
    location: &ReportLocation,
) -> Result<String, Box<dyn Error>> {
    let md = analysis_to_markdown(analysis);
    ensure_writable_dir(&location.dir).await?;

    let path = location.path("md");
    fs::write(&path, md).await?;
    info!(%path, "Wrote Markdown report");
    Ok(path)
}
