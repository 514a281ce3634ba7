//! The `lessonforge slides` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use lessonforge_core::engine::SlidesRequest;
use lessonforge_docs::render_deck;

use super::build_session;

pub async fn execute(
    source: PathBuf,
    output: Option<PathBuf>,
    model: Option<String>,
    temperature: Option<f64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let source_text = std::fs::read_to_string(&source)
        .with_context(|| format!("failed to read source file {}", source.display()))?;

    let (_config, mut generator) = build_session(config.as_deref(), model, temperature)?;

    println!("Generating slide content (this may take a moment)...");
    let deck = generator
        .generate_slides(&SlidesRequest { source_text })
        .await?;

    let output = output.unwrap_or_else(|| {
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "lesson".to_string());
        PathBuf::from(format!("{stem}_presentation.pptx"))
    });

    let bytes = render_deck(&deck)?;
    std::fs::write(&output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    println!(
        "PowerPoint generated: {} ({} slides)",
        output.display(),
        deck.slides.len()
    );
    Ok(())
}
