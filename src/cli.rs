//! Command-line interface definitions for newscred.
//!
//! Options can be given as flags; the two API keys can also come from the
//! environment.

use clap::{Parser, ValueEnum};

/// Where evidence for a claim is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Google News through SerpAPI (needs SERPAPI_KEY)
    Serpapi,
    /// The outlet's own search page, scraped
    Site,
    /// Google News RSS search (no key)
    Gnews,
}

/// Which model client answers the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Google Gemini (needs GEMINI_API_KEY)
    Gemini,
    /// OpenAI-compatible endpoint configured through awful_aj
    Jade,
}

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # One claim, Google News via SerpAPI, verdict from Gemini
/// newscred -q "Flight MH370 found in 2024"
///
/// # Scrape the outlet search page and ask for a free-form summary
/// newscred -s site --summary -q "budget 2025 income tax"
///
/// # Keep asking for claims, writing reports for each one
/// newscred -i --report-dir ./reports
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Headline or article text to check (read from stdin when omitted)
    #[arg(short, long)]
    pub query: Option<String>,

    /// Evidence source
    #[arg(short, long, value_enum, default_value_t = SourceKind::Serpapi)]
    pub source: SourceKind,

    /// Model backend
    #[arg(short, long, value_enum, default_value_t = BackendKind::Gemini)]
    pub backend: BackendKind,

    /// Number of articles to use as evidence (overrides the settings file)
    #[arg(short = 'n', long)]
    pub max_results: Option<usize>,

    /// Ask for a free-form credibility summary instead of a verdict
    #[arg(long)]
    pub summary: bool,

    /// Keep reading claims from stdin until "quit"
    #[arg(short, long)]
    pub interactive: bool,

    /// Also print the model's raw reply
    #[arg(long)]
    pub show_raw: bool,

    /// Directory for JSON and Markdown reports
    #[arg(long)]
    pub report_dir: Option<String>,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// SerpAPI key
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    pub serpapi_key: Option<String>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Path to the awful_aj config.yaml (jade backend)
    #[arg(long)]
    pub jade_config: Option<String>,

    /// awful_aj template name (jade backend)
    #[arg(long, default_value = "news_verifier")]
    pub jade_template: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["newscred", "--query", "Flight MH370 found in 2024"]);

        assert_eq!(cli.query.as_deref(), Some("Flight MH370 found in 2024"));
        assert_eq!(cli.source, SourceKind::Serpapi);
        assert_eq!(cli.backend, BackendKind::Gemini);
        assert_eq!(cli.max_results, None);
        assert_eq!(cli.jade_template, "news_verifier");
        assert!(!cli.summary);
        assert!(!cli.interactive);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "newscred", "-q", "claim", "-s", "site", "-b", "jade", "-n", "5", "-i", "-c",
            "/tmp/newscred.yaml",
        ]);

        assert_eq!(cli.source, SourceKind::Site);
        assert_eq!(cli.backend, BackendKind::Jade);
        assert_eq!(cli.max_results, Some(5));
        assert!(cli.interactive);
        assert_eq!(cli.config.as_deref(), Some("/tmp/newscred.yaml"));
    }

    #[test]
    fn test_cli_rejects_unknown_source() {
        assert!(Cli::try_parse_from(["newscred", "-s", "twitter"]).is_err());
    }

    #[test]
    fn test_cli_keys_from_flags() {
        let cli = Cli::parse_from([
            "newscred",
            "--serpapi-key",
            "s-key",
            "--gemini-api-key",
            "g-key",
            "--summary",
            "--show-raw",
            "--report-dir",
            "./reports",
        ]);
        assert_eq!(cli.serpapi_key.as_deref(), Some("s-key"));
        assert_eq!(cli.gemini_api_key.as_deref(), Some("g-key"));
        assert!(cli.summary);
        assert!(cli.show_raw);
        assert_eq!(cli.report_dir.as_deref(), Some("./reports"));
    }
}
