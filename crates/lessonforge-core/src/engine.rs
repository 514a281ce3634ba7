//! The generation engine.
//!
//! One `Generator` ties a text provider to the prompt library, the usage
//! ledger and the pacer, and exposes one method per resource kind. Requests
//! are plain structs passed down an ordinary call chain; there is no
//! process-wide session state.
//!
//! Failure policy: nothing is retried and nothing is rolled back. A ledger
//! increment that happened before a parse failure stays counted — the API
//! call was made, whatever came back.

use std::sync::Arc;

use crate::error::{ProviderError, ToolkitError};
use crate::extract;
use crate::gems::{self, GemStore};
use crate::ledger::{RatePacer, UsageLedger};
use crate::model::{QuestionSet, QuizCsv, SlideDeck};
use crate::traits::{GenerateRequest, TextProvider};

/// Model and sampling settings for one generator instance.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.0,
        }
    }
}

/// A non-fatal observation about a generation result.
///
/// The artifact is still produced; the caller decides how loudly to relay
/// these to the user.
#[derive(Debug, Clone)]
pub struct GenerationWarning {
    pub message: String,
}

impl GenerationWarning {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parameters for a `.docx` test paper.
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub subject_title: String,
    pub unit_title: String,
    pub year: String,
    pub topic: String,
    pub rubric: String,
    pub num_mcq: u32,
    pub marks_mcq: u32,
    pub num_saq: u32,
    pub marks_saq: u32,
}

impl TestRequest {
    pub fn total_questions(&self) -> u32 {
        self.num_mcq + self.num_saq
    }

    pub fn total_marks(&self) -> u32 {
        self.marks_mcq + self.marks_saq
    }
}

/// Parameters for a `.pptx` lesson deck.
#[derive(Debug, Clone)]
pub struct SlidesRequest {
    /// Source text the deck summarises (e.g. extracted textbook pages).
    pub source_text: String,
}

/// Parameters for a quiz CSV.
#[derive(Debug, Clone)]
pub struct QuizRequest {
    pub topic: String,
    pub count: u32,
}

/// Parameters for a rubric feedback comment.
#[derive(Debug, Clone)]
pub struct CommentRequest {
    pub questions: String,
    pub rubric: String,
    pub performance: String,
}

/// Drives one generation per call: pace, ask the model, count the call,
/// parse the answer.
pub struct Generator {
    provider: Arc<dyn TextProvider>,
    gems: GemStore,
    ledger: UsageLedger,
    pacer: RatePacer,
    options: GenerateOptions,
}

impl Generator {
    pub fn new(
        provider: Arc<dyn TextProvider>,
        gems: GemStore,
        ledger: UsageLedger,
        options: GenerateOptions,
    ) -> Self {
        Self {
            provider,
            gems,
            ledger,
            pacer: RatePacer::new(),
            options,
        }
    }

    /// Generate the question set for a test paper.
    pub async fn generate_test(
        &mut self,
        req: &TestRequest,
    ) -> Result<(QuestionSet, Vec<GenerationWarning>), ToolkitError> {
        let prompt = format!(
            "Topic: {}\nRubric: {}\nNumber of MCQs: {}\nNumber of SAQs: {}\nTotal Marks for SAQs: {}\n",
            req.topic, req.rubric, req.num_mcq, req.num_saq, req.marks_saq
        );

        let raw = self.call_model(gems::GEM_TEST, prompt).await?;
        let set = extract::parse_question_set(&raw)?;

        let mut warnings = Vec::new();
        if set.mcqs.len() != req.num_mcq as usize {
            warnings.push(GenerationWarning::new(format!(
                "asked for {} MCQs, model returned {}",
                req.num_mcq,
                set.mcqs.len()
            )));
        }
        if set.saqs.len() != req.num_saq as usize {
            warnings.push(GenerationWarning::new(format!(
                "asked for {} SAQs, model returned {}",
                req.num_saq,
                set.saqs.len()
            )));
        }
        if set.saq_mark_total() != req.marks_saq {
            warnings.push(GenerationWarning::new(format!(
                "asked for {} SAQ marks in total, model allocated {}",
                req.marks_saq,
                set.saq_mark_total()
            )));
        }

        Ok((set, warnings))
    }

    /// Generate a slide deck from source text.
    pub async fn generate_slides(&mut self, req: &SlidesRequest) -> Result<SlideDeck, ToolkitError> {
        let raw = self
            .call_model(gems::GEM_SLIDES, req.source_text.clone())
            .await?;
        extract::parse_slide_deck(&raw)
    }

    /// Generate quiz CSV text. Passes through fence-stripped, unvalidated.
    pub async fn generate_quiz(&mut self, req: &QuizRequest) -> Result<QuizCsv, ToolkitError> {
        let prompt = format!("Topic: {}\nNumber of Questions: {}\n", req.topic, req.count);
        let raw = self.call_model(gems::GEM_QUIZ, prompt).await?;
        Ok(QuizCsv(extract::strip_csv_fence(&raw)))
    }

    /// Generate a rubric feedback comment. The model's text is the result.
    pub async fn generate_comment(&mut self, req: &CommentRequest) -> Result<String, ToolkitError> {
        let prompt = format!(
            "TEST QUESTIONS:\n{}\n\nRUBRIC:\n{}\n\nSTUDENT PERFORMANCE:\n{}\n",
            req.questions, req.rubric, req.performance
        );
        let raw = self.call_model(gems::GEM_COMMENT, prompt).await?;
        Ok(raw.trim().to_string())
    }

    /// Today's usage ledger, for display.
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    async fn call_model(&mut self, gem_name: &str, prompt: String) -> Result<String, ToolkitError> {
        let request = GenerateRequest {
            model: self.options.model.clone(),
            system_instruction: self.gems.generator_prompt(gem_name),
            prompt,
            temperature: self.options.temperature,
        };

        self.pacer.wait_turn(&request.model).await;

        tracing::info!(model = %request.model, gem = gem_name, "calling text API");
        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(|e| match e.downcast::<ProviderError>() {
                Ok(provider_err) => ToolkitError::Provider(provider_err),
                Err(other) => {
                    ToolkitError::Provider(ProviderError::NetworkError(other.to_string()))
                }
            })?;

        // Count the call the moment it succeeds. A later parse failure does
        // not undo this: the quota was spent either way.
        let count = self.ledger.record_call(&request.model)?;
        tracing::debug!(model = %request.model, count, latency_ms = response.latency_ms, "call recorded");

        Ok(response.content)
    }
}
