//! Runtime settings and API credentials.
//!
//! [`Settings`] is read from an optional YAML file and every field has a
//! default, so the binary runs without any file at all. [`Credentials`] only
//! ever come from the command line or the environment.

use crate::error::SetupError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Default number of evidence items requested from a source.
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Settings for all fetchers and the Gemini client.
///
/// ```yaml
/// max_results: 5
/// search:
///   region: us
/// gemini:
///   model: gemini-2.0-flash
/// http:
///   timeout_secs: 20
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_results: usize,
    pub search: SearchSettings,
    pub site: SiteSettings,
    pub gnews: GnewsSettings,
    pub gemini: GeminiSettings,
    pub http: HttpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            search: SearchSettings::default(),
            site: SiteSettings::default(),
            gnews: GnewsSettings::default(),
            gemini: GeminiSettings::default(),
            http: HttpSettings::default(),
        }
    }
}

/// Region and language sent to the search APIs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Country code, SerpAPI `gl`.
    pub region: String,
    /// Interface language, SerpAPI `hl`.
    pub language: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            region: "in".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Where and how the outlet search page is scraped.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// Search URL with a `{query}` placeholder.
    pub search_url: String,
    /// CSS selector matching the headline link of each result.
    pub result_selector: String,
    /// Class of the result container whose `<p>` child holds the description.
    pub description_container_class: String,
    /// Wait before parsing each result page.
    pub settle_delay_ms: u64,
    /// Further result pages to request while fewer than `max_results` were found.
    pub extra_pages: usize,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            search_url: "https://indianexpress.com/?s={query}".to_string(),
            result_selector: "div.search-result h3 a".to_string(),
            description_container_class: "img-context".to_string(),
            settle_delay_ms: 0,
            extra_pages: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GnewsSettings {
    pub base_url: String,
}

impl Default for GnewsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://news.google.com/rss/search".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("newscred/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpSettings {
    /// Build the one HTTP client shared by the fetcher and the Gemini client.
    pub fn client(&self) -> Result<reqwest::Client, SetupError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|e| SetupError::HttpClient(e.to_string()))
    }
}

impl Settings {
    /// Parse settings from YAML text.
    pub fn from_yaml(text: &str, path: &str) -> Result<Self, SetupError> {
        serde_yaml::from_str(text).map_err(|e| SetupError::InvalidSettings {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Load settings from `path`, or fall back to defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, SetupError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SetupError::InvalidSettings {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let settings = Self::from_yaml(&text, path)?;
        info!(path, max_results = settings.max_results, "Loaded settings");
        Ok(settings)
    }
}

/// The two secrets: search provider and AI provider.
#[derive(Clone, Default)]
pub struct Credentials {
    serpapi_key: Option<String>,
    gemini_api_key: Option<String>,
}

// Keys never reach the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("serpapi_key", &self.serpapi_key.as_ref().map(|_| "***"))
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

impl Credentials {
    pub fn new(serpapi_key: Option<String>, gemini_api_key: Option<String>) -> Self {
        Self {
            serpapi_key: non_blank(serpapi_key),
            gemini_api_key: non_blank(gemini_api_key),
        }
    }

    pub fn require_serpapi_key(&self) -> Result<&str, SetupError> {
        self.serpapi_key
            .as_deref()
            .ok_or(SetupError::MissingCredential {
                var: "SERPAPI_KEY",
                flag: "serpapi-key",
            })
    }

    pub fn require_gemini_api_key(&self) -> Result<&str, SetupError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(SetupError::MissingCredential {
                var: "GEMINI_API_KEY",
                flag: "gemini-api-key",
            })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
