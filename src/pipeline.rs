//! Claim analysis: fetch evidence, ask the model, parse, present.
//!
//! Each step runs after the previous one finishes. A failed fetch leaves the
//! analysis with no evidence and a warning; a failed model call leaves it
//! with no verdict and a warning. Neither stops the run.

use crate::api::{AskAsync, ask_timed};
use crate::fetchers::{EvidenceSource, QueryCache};
use crate::models::{EvidenceSet, EvidenceStatus};
use crate::outputs::{ReportLocation, json, markdown, text};
use crate::parser;
use crate::present::{self, DisplayModel, EvidenceDisplay};
use crate::prompt::{build_prompt, build_summary_prompt};
use chrono::Local;
use serde::Serialize;
use std::error::Error;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, instrument, warn};

pub const EMPTY_QUERY_WARNING: &str =
    "Please enter a headline or article content before analyzing.";

/// What the model is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Fixed-format verdict, parsed and categorized.
    Verdict,
    /// Free-form credibility summary, shown as-is.
    Summary,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub max_results: usize,
    pub mode: Mode,
    pub show_raw: bool,
    pub report_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Verdict { display: DisplayModel },
    Summary { text: String, evidence: EvidenceDisplay },
    Unavailable { error: String, evidence: EvidenceDisplay },
}

/// One finished analysis, ready for any renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub claim: String,
    pub source: String,
    pub mode: Mode,
    pub generated_at: String,
    pub evidence_status: EvidenceStatus,
    pub evidence: EvidenceSet,
    /// User-visible problems met on the way, in order.
    pub warnings: Vec<String>,
    pub outcome: Outcome,
}

/// Run one claim through fetch, prompt, model and parse.
///
/// With a `cache`, a query seen earlier in the session reuses its evidence.
///
/// # Arguments
///
/// * `claim` - Headline or article text, already trimmed and non-empty
/// * `fetcher` - Evidence source
/// * `model` - Model client; asked exactly once
/// * `max_results` - Upper bound on evidence items
/// * `mode` - Verdict or free-form summary
/// * `cache` - Session cache; `None` for single-shot runs
///
/// # Returns
///
/// An [`Analysis`] in every case. A failed fetch gives empty evidence with
/// [`EvidenceStatus::Failed`] and a warning; a failed model call gives
/// [`Outcome::Unavailable`] and a warning.
#[instrument(level = "info", skip(fetcher, model, cache), fields(source = fetcher.name()))]
pub async fn analyze<F, A>(
    claim: &str,
    fetcher: &F,
    model: &A,
    max_results: usize,
    mode: Mode,
    cache: Option<&mut QueryCache>,
) -> Analysis
where
    F: EvidenceSource,
    A: AskAsync<Response = String>,
{
    let mut warnings = Vec::new();

    let cached = cache
        .as_deref()
        .and_then(|c| c.get(claim, max_results))
        .cloned();
    let (evidence, evidence_status) = match cached {
        Some(evidence) => {
            debug!(count = evidence.len(), "Using cached evidence");
            (evidence, EvidenceStatus::Fetched)
        }
        None => match fetcher.fetch(claim, max_results).await {
            Ok(evidence) => {
                info!(count = evidence.len(), "Fetched evidence");
                if let Some(cache) = cache {
                    cache.insert(claim, max_results, evidence.clone());
                }
                (evidence, EvidenceStatus::Fetched)
            }
            Err(e) => {
                warn!(error = %e, "Evidence fetch failed; continuing without evidence");
                warnings.push(format!("Error while calling {}: {e}", fetcher.name()));
                (EvidenceSet::empty(), EvidenceStatus::Failed)
            }
        },
    };

    let prompt = match mode {
        Mode::Verdict => build_prompt(claim, &evidence),
        Mode::Summary => build_summary_prompt(claim, &evidence),
    };

    let outcome = match ask_timed(model, &prompt).await {
        Ok(raw) => match mode {
            Mode::Verdict => {
                let verdict = parser::parse(&raw);
                info!(label = %verdict.label, confidence = ?verdict.confidence, "Parsed verdict");
                Outcome::Verdict {
                    display: present::render(claim, &verdict, &evidence, evidence_status, &raw),
                }
            }
            Mode::Summary => Outcome::Summary {
                text: raw,
                evidence: present::evidence_display(&evidence, evidence_status),
            },
        },
        Err(e) => {
            error!(error = %e, "Model call failed; no analysis");
            warnings.push(format!("Error while generating the AI analysis: {e}"));
            Outcome::Unavailable {
                error: e.to_string(),
                evidence: present::evidence_display(&evidence, evidence_status),
            }
        }
    };

    Analysis {
        claim: claim.to_string(),
        source: fetcher.name().to_string(),
        mode,
        generated_at: Local::now().to_rfc3339(),
        evidence_status,
        evidence,
        warnings,
        outcome,
    }
}

/// Print an analysis and write its reports when a report directory is set.
///
/// Report failures are logged and reported inline; they do not fail the run.
pub async fn emit<W: Write>(
    analysis: &Analysis,
    config: &RunConfig,
    out: &mut W,
) -> Result<(), Box<dyn Error>> {
    out.write_all(text::render(analysis, config.show_raw).as_bytes())?;

    if let Some(dir) = &config.report_dir {
        let location = ReportLocation::new(dir, &analysis.claim, Local::now());
        match json::write_report(analysis, &location).await {
            Ok(path) => writeln!(out, "JSON report: {path}")?,
            Err(e) => {
                error!(error = %e, "Failed to write JSON report");
                writeln!(out, "Warning: could not write JSON report: {e}")?;
            }
        }
        match markdown::write_report(analysis, &location).await {
            Ok(path) => writeln!(out, "Markdown report: {path}")?,
            Err(e) => {
                error!(error = %e, "Failed to write Markdown report");
                writeln!(out, "Warning: could not write Markdown report: {e}")?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

/// Interactive session: one claim per line until `quit`, `exit` or end of input.
///
/// Fetched evidence is cached by query for the whole session.
pub async fn run_session<R, W, F, A>(
    input: R,
    out: &mut W,
    fetcher: &F,
    model: &A,
    config: &RunConfig,
) -> Result<usize, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    F: EvidenceSource,
    A: AskAsync<Response = String>,
{
    let mut cache = QueryCache::default();
    let mut lines = input.lines();
    let mut analyzed = 0usize;

    loop {
        write!(out, "\nHeadline or article (blank line to retry, 'quit' to exit): ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let claim = line.trim();
        if matches!(claim.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }
        if claim.is_empty() {
            writeln!(out, "Warning: {EMPTY_QUERY_WARNING}")?;
            continue;
        }

        let analysis = analyze(
            claim,
            fetcher,
            model,
            config.max_results,
            config.mode,
            Some(&mut cache),
        )
        .await;
        emit(&analysis, config, out).await?;
        analyzed += 1;
    }

    info!(analyzed, cached_queries = cache.len(), "Session finished");
    Ok(analyzed)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EvidenceItem;
    use crate::present::{ConfidenceDisplay, FETCH_FAILED_NOTICE, NO_EVIDENCE_NOTICE};
    use std::cell::{Cell, RefCell};

    struct FakeSource {
        result: Result<Vec<EvidenceItem>, String>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn ok(items: Vec<EvidenceItem>) -> Self {
            Self {
                result: Ok(items),
                calls: Cell::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                result: Err(message.to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl EvidenceSource for FakeSource {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn fetch(
            &self,
            _query: &str,
            max_results: usize,
        ) -> Result<EvidenceSet, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            match &self.result {
                Ok(items) => Ok(EvidenceSet::from_items(items.clone(), max_results)),
                Err(e) => Err(e.clone().into()),
            }
        }
    }

    struct FakeModel {
        reply: Result<String, String>,
        prompts: RefCell<Vec<String>>,
    }

    impl FakeModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: RefCell::new(Vec::new()),
            }
        }
    }

    impl AskAsync for FakeModel {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.prompts.borrow_mut().push(text.to_string());
            self.reply.clone().map_err(|e| e.into())
        }
    }

    fn config(mode: Mode) -> RunConfig {
        RunConfig {
            max_results: 8,
            mode,
            show_raw: false,
            report_dir: None,
        }
    }

    #[tokio::test]
    async fn test_false_claim_end_to_end() {
        let source = FakeSource::ok(fixtures::evidence().items().to_vec());
        let model = FakeModel::replying(
            "Final Verdict: False\nReasoning: No credible source confirms this.\nConfidence: 92%",
        );
        let analysis = analyze("Flight MH370 found in 2024", &source, &model, 8, Mode::Verdict, None).await;

        let Outcome::Verdict { display } = &analysis.outcome else {
            panic!("expected a verdict");
        };
        assert_eq!(display.verdict.label, "False");
        assert_eq!(display.verdict.reasoning, "No credible source confirms this.");
        assert_eq!(display.verdict.confidence, Some(92));
        assert_eq!(display.category.label(), "False / Likely Fake");
        assert_eq!(display.confidence, ConfidenceDisplay::Score { percent: 92 });
        assert!(analysis.warnings.is_empty());

        let prompts = model.prompts.borrow();
        assert!(prompts[0].contains("Flight MH370 found in 2024"));
        assert!(prompts[0].contains("Search for MH370 to resume"));
    }

    #[tokio::test]
    async fn test_no_evidence_and_no_confidence() {
        let source = FakeSource::ok(vec![]);
        let model = FakeModel::replying("Final Verdict: Unverified\nReasoning: Nothing found.");
        let analysis = analyze("claim", &source, &model, 8, Mode::Verdict, None).await;

        let Outcome::Verdict { display } = &analysis.outcome else {
            panic!("expected a verdict");
        };
        assert_eq!(display.verdict.confidence, None);
        assert!(matches!(
            &display.confidence,
            ConfidenceDisplay::NotDetected { notice } if notice == "Confidence score not detected."
        ));
        assert!(matches!(
            &display.evidence,
            EvidenceDisplay::Notice { notice } if notice == NO_EVIDENCE_NOTICE
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_continues_without_evidence() {
        let source = FakeSource::failing("connection refused");
        let model = FakeModel::replying("Final Verdict: Unverified\nReasoning: No coverage.\nConfidence: 20%");
        let analysis = analyze("claim", &source, &model, 8, Mode::Verdict, None).await;

        assert_eq!(analysis.evidence_status, EvidenceStatus::Failed);
        assert!(analysis.evidence.is_empty());
        assert_eq!(analysis.warnings.len(), 1);
        assert!(analysis.warnings[0].contains("connection refused"));

        let Outcome::Verdict { display } = &analysis.outcome else {
            panic!("expected a verdict");
        };
        assert_eq!(display.category.label(), "Unverified");
        assert!(matches!(
            &display.evidence,
            EvidenceDisplay::Notice { notice } if notice == FETCH_FAILED_NOTICE
        ));
        assert!(model.prompts.borrow()[0].contains("No relevant articles were found"));
    }

    #[tokio::test]
    async fn test_model_failure_keeps_evidence() {
        let source = FakeSource::ok(fixtures::evidence().items().to_vec());
        let model = FakeModel {
            reply: Err("HTTP 429".to_string()),
            prompts: RefCell::new(Vec::new()),
        };
        let analysis = analyze("claim", &source, &model, 8, Mode::Verdict, None).await;

        let Outcome::Unavailable { error, evidence } = &analysis.outcome else {
            panic!("expected no analysis");
        };
        assert!(error.contains("HTTP 429"));
        assert!(matches!(evidence, EvidenceDisplay::Articles { entries } if entries.len() == 1));
        assert_eq!(analysis.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_summary_mode_returns_raw_text() {
        let source = FakeSource::ok(fixtures::evidence().items().to_vec());
        let model = FakeModel::replying("The tone is speculative.");
        let analysis = analyze("MH370", &source, &model, 8, Mode::Summary, None).await;

        assert_eq!(
            analysis.outcome,
            Outcome::Summary {
                text: "The tone is speculative.".to_string(),
                evidence: present::evidence_display(&fixtures::evidence(), EvidenceStatus::Fetched),
            }
        );
        assert!(model.prompts.borrow()[0].contains("key insights, tone"));
    }

    #[tokio::test]
    async fn test_cache_reuses_evidence_for_same_query() {
        let source = FakeSource::ok(fixtures::evidence().items().to_vec());
        let model = FakeModel::replying("Final Verdict: True");
        let mut cache = QueryCache::default();

        analyze("same", &source, &model, 8, Mode::Verdict, Some(&mut cache)).await;
        analyze("same", &source, &model, 8, Mode::Verdict, Some(&mut cache)).await;
        analyze("other", &source, &model, 8, Mode::Verdict, Some(&mut cache)).await;

        assert_eq!(source.calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let source = FakeSource::failing("timeout");
        let model = FakeModel::replying("Final Verdict: True");
        let mut cache = QueryCache::default();

        analyze("q", &source, &model, 8, Mode::Verdict, Some(&mut cache)).await;
        analyze("q", &source, &model, 8, Mode::Verdict, Some(&mut cache)).await;

        assert_eq!(source.calls.get(), 2);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test]
    async fn test_session_skips_blank_lines_and_stops_on_quit() {
        let source = FakeSource::ok(vec![]);
        let model = FakeModel::replying("Final Verdict: False\nConfidence: 80%");
        let input: &[u8] = b"first claim\n   \nfirst claim\nquit\nnever analyzed\n";
        let mut out = Vec::new();

        let analyzed = run_session(input, &mut out, &source, &model, &config(Mode::Verdict))
            .await
            .unwrap();

        assert_eq!(analyzed, 2);
        assert_eq!(source.calls.get(), 1);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains(EMPTY_QUERY_WARNING));
        assert!(printed.contains("False / Likely Fake"));
        assert!(!printed.contains("never analyzed"));
    }

    #[tokio::test]
    async fn test_session_ends_at_end_of_input() {
        let source = FakeSource::ok(vec![]);
        let model = FakeModel::replying("Final Verdict: True");
        let input: &[u8] = b"only claim";
        let mut out = Vec::new();

        let analyzed = run_session(input, &mut out, &source, &model, &config(Mode::Verdict))
            .await
            .unwrap();
        assert_eq!(analyzed, 1);
    }

    #[tokio::test]
    async fn test_emit_writes_reports() {
        let dir = std::env::temp_dir().join(format!("newscred-emit-{}", std::process::id()));
        let mut cfg = config(Mode::Verdict);
        cfg.report_dir = Some(dir.to_string_lossy().to_string());
        let mut out = Vec::new();

        emit(&fixtures::verdict_analysis(Some(92)), &cfg, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        let json_path = printed
            .lines()
            .find_map(|l| l.strip_prefix("JSON report: "))
            .unwrap();
        let md_path = printed
            .lines()
            .find_map(|l| l.strip_prefix("Markdown report: "))
            .unwrap();
        assert_eq!(
            json_path.strip_suffix(".json"),
            md_path.strip_suffix(".md"),
            "both reports of one analysis share a stem"
        );
        assert!(std::path::Path::new(json_path).is_file());
        assert!(std::path::Path::new(md_path).is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
