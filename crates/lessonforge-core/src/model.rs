//! Core data model types for lessonforge.
//!
//! These are the typed shapes that model output is parsed into. Parsing is
//! strict at the boundary: a response that deserializes but fails shape
//! validation is rejected rather than passed through.

use serde::{Deserialize, Serialize};

/// A single multiple-choice question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqItem {
    /// The question text.
    pub question: String,
    /// Answer options, in the order they should appear on the paper.
    pub options: Vec<String>,
}

/// A single short-answer question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaqItem {
    /// The question text.
    pub question: String,
    /// Mark value; controls how much answer space the paper allocates.
    pub marks: u32,
}

/// One generated set of test questions.
///
/// Built once per generation request, immutable afterwards, and discarded
/// once the document is assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    /// Multiple-choice items, in paper order.
    #[serde(default)]
    pub mcqs: Vec<McqItem>,
    /// Short-answer items, in paper order.
    #[serde(default)]
    pub saqs: Vec<SaqItem>,
}

impl QuestionSet {
    /// Reject shapes a document cannot be built from.
    pub fn validate(&self) -> Result<(), String> {
        for (i, mcq) in self.mcqs.iter().enumerate() {
            if mcq.question.trim().is_empty() {
                return Err(format!("mcqs[{i}] has an empty question"));
            }
            if mcq.options.is_empty() {
                return Err(format!("mcqs[{i}] has no options"));
            }
        }
        for (i, saq) in self.saqs.iter().enumerate() {
            if saq.question.trim().is_empty() {
                return Err(format!("saqs[{i}] has an empty question"));
            }
            if saq.marks == 0 {
                return Err(format!("saqs[{i}] has a zero mark value"));
            }
        }
        Ok(())
    }

    /// Sum of short-answer mark values.
    pub fn saq_mark_total(&self) -> u32 {
        self.saqs.iter().map(|s| s.marks).sum()
    }
}

/// One slide of a generated lesson deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Slide title.
    pub title: String,
    /// Bullet lines for the body placeholder.
    #[serde(default)]
    pub body: Vec<String>,
}

/// A generated lesson deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideDeck {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn validate(&self) -> Result<(), String> {
        if self.slides.is_empty() {
            return Err("deck has no slides".into());
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.title.trim().is_empty() {
                return Err(format!("slides[{i}] has an empty title"));
            }
        }
        Ok(())
    }
}

/// Fence-stripped CSV text for a quiz import.
///
/// Deliberately opaque: column counts and quoting are not validated, the
/// text passes through to the download as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizCsv(pub String);

impl QuizCsv {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
