//! # newscred
//!
//! Checks a news claim against current coverage and asks a generative model
//! for a credibility verdict.
//!
//! ## Usage
//!
//! ```sh
//! SERPAPI_KEY=... GEMINI_API_KEY=... newscred -q "Flight MH370 found in 2024"
//! ```
//!
//! ## Architecture
//!
//! Every claim goes through the same sequential pipeline:
//! 1. **Fetching**: look up matching articles (SerpAPI, outlet scrape or Google News RSS)
//! 2. **Prompting**: render the claim and the evidence into a fixed-format prompt
//! 3. **Asking**: one request to the model (Gemini or an awful_aj endpoint)
//! 4. **Parsing**: read verdict, reasoning and confidence out of the reply
//! 5. **Output**: print to the terminal, optionally write JSON and Markdown reports

use clap::Parser;
use std::error::Error;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod fetchers;
mod models;
mod outputs;
mod parser;
mod pipeline;
mod present;
mod prompt;
mod utils;

use api::{Backend, GeminiClient, JadeClient};
use cli::{BackendKind, Cli, SourceKind};
use config::{Credentials, Settings};
use error::SetupError;
use fetchers::{Fetcher, gnews::GoogleNewsFetcher, serpapi::SerpApiFetcher, site::SiteFetcher};
use pipeline::{EMPTY_QUERY_WARNING, Mode, RunConfig};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", fatal_message(&*e));
            ExitCode::FAILURE
        }
    }
}

/// The line printed to stderr when the run stops on an error.
///
/// Uses the error's `Display` form so setup errors read as sentences even
/// with logging turned off.
fn fatal_message(e: &dyn Error) -> String {
    format!("Error: {e}")
}

#[instrument]
async fn run() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    // stdout carries the report, so logs go to stderr and default to warnings only.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newscred starting up");

    let args = Cli::parse();
    debug!(source = ?args.source, backend = ?args.backend, interactive = args.interactive, "Parsed CLI arguments");

    // ---- Setup: everything here is fatal ----
    let settings = Settings::load(args.config.as_deref()).await.inspect_err(|e| {
        error!(error = %e, "Could not load settings");
    })?;
    let credentials = Credentials::new(args.serpapi_key.clone(), args.gemini_api_key.clone());
    let client = settings.http.client()?;

    let fetcher = build_fetcher(&args, &settings, &credentials, client.clone())
        .inspect_err(|e| error!(error = %e, "Evidence source setup failed"))?;
    let backend = build_backend(&args, &settings, &credentials, client)
        .await
        .inspect_err(|e| error!(error = %e, "Model backend setup failed"))?;

    if let Some(dir) = &args.report_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(path = %dir, error = %e, "Report directory is not writable");
            return Err(e);
        }
    }

    let run_config = RunConfig {
        max_results: args.max_results.unwrap_or(settings.max_results),
        mode: if args.summary { Mode::Summary } else { Mode::Verdict },
        show_raw: args.show_raw,
        report_dir: args.report_dir.clone(),
    };
    info!(max_results = run_config.max_results, mode = ?run_config.mode, "Configuration ready");

    let mut stdout = std::io::stdout();

    if args.interactive {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let analyzed =
            pipeline::run_session(stdin, &mut stdout, &fetcher, &backend, &run_config).await?;
        info!(analyzed, "Interactive session closed");
    } else {
        let query = match args.query.clone() {
            Some(q) => q,
            None => read_query(&mut stdout)?,
        };
        let query = query.trim();
        if query.is_empty() {
            warn!("Empty query");
            writeln!(stdout, "Warning: {EMPTY_QUERY_WARNING}")?;
            return Ok(());
        }

        let analysis = pipeline::analyze(
            query,
            &fetcher,
            &backend,
            run_config.max_results,
            run_config.mode,
            None,
        )
        .await;
        pipeline::emit(&analysis, &run_config, &mut stdout).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    Ok(())
}

fn read_query(out: &mut impl Write) -> Result<String, Box<dyn Error>> {
    write!(out, "Enter your news topic or query: ")?;
    out.flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line)
}

fn build_fetcher(
    args: &Cli,
    settings: &Settings,
    credentials: &Credentials,
    client: reqwest::Client,
) -> Result<Fetcher, SetupError> {
    let fetcher = match args.source {
        SourceKind::Serpapi => Fetcher::SerpApi(SerpApiFetcher::new(
            client,
            credentials.require_serpapi_key()?,
            settings.search.clone(),
        )),
        SourceKind::Site => Fetcher::Site(SiteFetcher::new(client, settings.site.clone())),
        SourceKind::Gnews => Fetcher::GoogleNews(GoogleNewsFetcher::new(
            client,
            settings.gnews.clone(),
            settings.search.clone(),
        )),
    };
    Ok(fetcher)
}

async fn build_backend(
    args: &Cli,
    settings: &Settings,
    credentials: &Credentials,
    client: reqwest::Client,
) -> Result<Backend, SetupError> {
    let backend = match args.backend {
        BackendKind::Gemini => Backend::Gemini(GeminiClient::new(
            client,
            credentials.require_gemini_api_key()?,
            settings.gemini.clone(),
        )),
        BackendKind::Jade => Backend::Jade(
            JadeClient::load(args.jade_config.as_deref(), &args.jade_template).await?,
        ),
    };
    Ok(backend)
}
