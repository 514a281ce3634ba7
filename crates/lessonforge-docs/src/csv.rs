//! Quiz CSV renderer.
//!
//! The quiz flow is a passthrough: the model is asked for CSV, the fence is
//! stripped upstream, and whatever remains becomes the download. Column
//! counts and quoting are deliberately not validated.

use lessonforge_core::model::QuizCsv;

/// UTF-8 bytes for the `.csv` download.
pub fn render_quiz(quiz: &QuizCsv) -> Vec<u8> {
    let mut text = quiz.as_str().to_string();
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.into_bytes()
}

/// Best-effort line count for the CLI preview (header row included).
pub fn row_count(quiz: &QuizCsv) -> usize {
    quiz.as_str().lines().filter(|l| !l.trim().is_empty()).count()
}
