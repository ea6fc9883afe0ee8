//! Generative model clients.
//!
//! # Architecture
//!
//! - [`AskAsync`]: core trait, send a prompt and get the reply text back
//! - [`GeminiClient`]: Google Gemini `generateContent` over HTTPS
//! - [`JadeClient`]: any OpenAI-compatible endpoint through `awful_aj`
//! - [`Backend`]: the client chosen on the command line
//!
//! Each analysis makes exactly one request. Failures are returned to the
//! caller, which reports them; nothing here retries.

use crate::config::GeminiSettings;
use crate::error::SetupError;
use crate::utils::truncate_for_log;
use awful_aj::api::ask;
use awful_aj::{config, config::AwfulJadeConfig, config_dir, template, template::ChatTemplate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument};

/// Trait for async LLM interaction.
///
/// Implementors send text to a model and return its reply. Tests implement it
/// with canned replies.
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    settings: GeminiSettings,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.settings.model)
            .field("base_url", &self.settings.base_url)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(client: reqwest::Client, api_key: &str, settings: GeminiSettings) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model
        )
    }
}

impl AskAsync for GeminiClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.settings.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| truncate_for_log(&body, 200));
            return Err(format!("Gemini returned HTTP {status}: {message}").into());
        }

        extract_text(&body)
    }
}

/// Pull the reply text out of a `generateContent` response body.
///
/// The text parts of the first candidate are concatenated. No candidates (a
/// blocked prompt, for example) is an error.
fn extract_text(body: &str) -> Result<String, Box<dyn Error>> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)?;
    let Some(candidate) = parsed.candidates.into_iter().next() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(format!("Gemini returned no answer: {reason}").into());
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err("Gemini returned an empty answer".into());
    }
    Ok(text.trim().to_string())
}

/// Client for OpenAI-compatible endpoints, configured through an `awful_aj`
/// `config.yaml` and chat template.
pub struct JadeClient {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

impl fmt::Debug for JadeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JadeClient").finish_non_exhaustive()
    }
}

impl JadeClient {
    /// Load the `awful_aj` configuration and the named template.
    ///
    /// Without `config_path` the `awful_aj` default config directory is used.
    #[instrument(level = "info")]
    pub async fn load(config_path: Option<&str>, template_name: &str) -> Result<Self, SetupError> {
        let config_path = match config_path {
            Some(path) => path.to_string(),
            None => config_dir()
                .map_err(|e| SetupError::LlmConfig(e.to_string()))?
                .join("config.yaml")
                .to_string_lossy()
                .to_string(),
        };
        let config = config::load_config(&config_path)
            .map_err(|e| SetupError::LlmConfig(format!("{config_path}: {e:?}")))?;
        info!(%config_path, "Loaded LLM configuration");

        let template = template::load_template(template_name)
            .await
            .map_err(|e| SetupError::LlmConfig(format!("template {template_name}: {e}")))?;
        info!(template_name, "Loaded template");

        Ok(Self { config, template })
    }
}

impl AskAsync for JadeClient {
    type Response = String;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        ask(&self.config, text.to_string(), &self.template, None, None).await
    }
}

/// The model client selected on the command line.
#[derive(Debug)]
pub enum Backend {
    Gemini(GeminiClient),
    Jade(JadeClient),
}

impl AskAsync for Backend {
    type Response = String;

    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        match self {
            Backend::Gemini(client) => client.ask(text).await,
            Backend::Jade(client) => client.ask(text).await,
        }
    }
}

/// Send one prompt and log how long it took and what came back.
#[instrument(level = "info", skip_all)]
pub async fn ask_timed<A>(client: &A, prompt: &str) -> Result<String, Box<dyn Error>>
where
    A: AskAsync<Response = String>,
{
    let t0 = Instant::now();
    let res = client.ask(prompt).await;
    let dt = t0.elapsed();

    match &res {
        Ok(reply) => {
            info!(elapsed_ms = dt.as_millis() as u64, bytes = reply.len(), "Model replied");
            debug!(reply = %truncate_for_log(reply, 300), "Model reply");
        }
        Err(e) => {
            error!(elapsed_ms = dt.as_millis() as u64, error = %e, "Model call failed")
        }
    }
    res
}
