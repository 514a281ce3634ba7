//! The `lessonforge quiz` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lessonforge_core::engine::QuizRequest;
use lessonforge_docs::csv::{render_quiz, row_count};

use super::{build_session, slug};

pub async fn execute(
    topic: String,
    count: u32,
    output: Option<PathBuf>,
    preview: bool,
    model: Option<String>,
    temperature: Option<f64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let (_config, mut generator) = build_session(config.as_deref(), model, temperature)?;

    println!("Generating {count} questions on '{topic}'...");
    let quiz = generator.generate_quiz(&QuizRequest { topic: topic.clone(), count }).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}_quiz.csv", slug(&topic))));
    std::fs::write(&output, render_quiz(&quiz))
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "CSV generated: {} ({} rows)",
        output.display(),
        row_count(&quiz)
    );
    if preview {
        println!("{}", quiz.as_str());
    }
    Ok(())
}
