//! Fatal setup errors.
//!
//! Anything that fails here stops the run before any remote call is made.
//! Failures of the remote calls themselves are not represented here: they are
//! caught where they happen and turned into warnings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Missing credential: set the {var} environment variable (or pass --{flag})")]
    MissingCredential {
        var: &'static str,
        flag: &'static str,
    },
    #[error("Invalid settings file {path}: {reason}")]
    InvalidSettings { path: String, reason: String },
    #[error("Could not load LLM configuration: {0}")]
    LlmConfig(String),
    #[error("Could not build HTTP client: {0}")]
    HttpClient(String),
}
