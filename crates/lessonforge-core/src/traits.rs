//! Provider trait for generative text backends.
//!
//! Implemented by the `lessonforge-providers` crate. The toolkit treats a
//! provider strictly as opaque text-in/text-out: what the text *means* is
//! decided downstream per artifact kind.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for text backends that answer a prompt.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send one prompt and return the model's text.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;
}

/// Request for one text generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// System instruction — the gem prompt steering the response format.
    pub system_instruction: String,
    /// The user prompt carrying the teacher-entered parameters.
    pub prompt: String,
    /// Sampling temperature (0.0 factual, 2.0 creative).
    pub temperature: f64,
}

/// Response from a text generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The raw response text, untouched.
    pub content: String,
    /// Model that actually answered.
    pub model: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}
