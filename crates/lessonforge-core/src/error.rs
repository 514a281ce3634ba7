//! Toolkit error types.
//!
//! `ProviderError` represents failures when talking to the text API;
//! `ToolkitError` covers everything the generation pipeline can surface to
//! the user. Defined in `lessonforge-core` so downstream crates can match on
//! variants without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when calling the generative text API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited by the API, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Authentication failed (invalid or revoked API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The API answered 200 but carried no usable text.
    #[error("empty response from model {model}")]
    EmptyResponse { model: String },
}

/// Errors surfaced by the generation pipeline.
#[derive(Debug, Error)]
pub enum ToolkitError {
    /// No API key configured. Checked before any network call is made.
    #[error("no API key configured; run `lessonforge init` and set `api_key`, or export GEMINI_API_KEY")]
    MissingCredential,

    /// The external call failed. Never retried; surfaces immediately.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// No JSON object locatable in the response, or the located substring
    /// failed to parse into the expected shape. Carries the raw model
    /// output so the caller can show it for debugging.
    #[error("model returned an unusable response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// The document template file is absent on disk.
    #[error("template not found: {path} (create it and add the {{{{SUBJECT_TITLE}}}}-style placeholders)")]
    MissingTemplateAsset { path: PathBuf },

    /// A persisted data file (ledger, gems) could not be written.
    #[error("failed to write {path}: {source}")]
    PersistFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template archive exists but is not a readable document package.
    #[error("could not read document package {path}: {reason}")]
    BadTemplateAsset { path: PathBuf, reason: String },
}

impl ToolkitError {
    /// Shorthand used at every parse boundary.
    pub fn malformed(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        ToolkitError::MalformedResponse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }
}
