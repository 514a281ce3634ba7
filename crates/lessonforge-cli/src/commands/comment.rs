//! The `lessonforge comment` command.

use std::path::PathBuf;

use anyhow::Result;

use lessonforge_core::engine::CommentRequest;

use super::{build_session, text_arg};

type TextInput = (Option<String>, Option<PathBuf>);

pub async fn execute(
    questions: TextInput,
    rubric: TextInput,
    performance: TextInput,
    model: Option<String>,
    temperature: Option<f64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let req = CommentRequest {
        questions: text_arg(questions.0, questions.1, "questions")?,
        rubric: text_arg(rubric.0, rubric.1, "rubric")?,
        performance: text_arg(performance.0, performance.1, "performance")?,
    };

    let (_config, mut generator) = build_session(config.as_deref(), model, temperature)?;

    println!("Generating comment...");
    let comment = generator.generate_comment(&req).await?;

    println!("\n{comment}");
    Ok(())
}
