//! Mock provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use lessonforge_core::traits::{GenerateRequest, GenerateResponse, TextProvider};

/// A mock text provider for exercising the pipeline without real API calls.
///
/// Returns configurable responses based on prompt content matching.
pub struct MockProvider {
    /// Map of prompt substring → response text.
    responses: HashMap<String, String>,
    /// Default response if no prompt matches.
    default_response: String,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl MockProvider {
    /// Create a new mock provider with the given prompt→response mappings.
    pub fn new(responses: HashMap<String, String>) -> Self {
        Self {
            responses,
            default_response: r#"{"mcqs": [], "saqs": []}"#.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            responses: HashMap::new(),
            default_response: response.to_string(),
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let content = self
            .responses
            .iter()
            .find(|(key, _)| request.prompt.contains(key.as_str()))
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| self.default_response.clone());

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            latency_ms: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model: "mock-model".into(),
            system_instruction: String::new(),
            prompt: prompt.into(),
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn fixed_response() {
        let provider = MockProvider::with_fixed_response("canned text");

        let response = provider.generate(&request("anything")).await.unwrap();
        assert_eq!(response.content, "canned text");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn prompt_matching() {
        let mut responses = HashMap::new();
        responses.insert(
            "Cells".to_string(),
            r#"{"slides": [{"title": "Cells", "body": []}]}"#.to_string(),
        );
        responses.insert(
            "Forces".to_string(),
            r#"{"slides": [{"title": "Forces", "body": []}]}"#.to_string(),
        );

        let provider = MockProvider::new(responses);

        let resp = provider
            .generate(&request("Topic: Cells"))
            .await
            .unwrap();
        assert!(resp.content.contains("Cells"));

        let resp = provider
            .generate(&request("Topic: Forces"))
            .await
            .unwrap();
        assert!(resp.content.contains("Forces"));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn records_last_request() {
        let provider = MockProvider::with_fixed_response("ok");
        provider.generate(&request("remember me")).await.unwrap();

        let last = provider.last_request().unwrap();
        assert_eq!(last.prompt, "remember me");
    }
}
