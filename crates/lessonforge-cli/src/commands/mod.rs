//! Subcommand implementations.

pub mod comment;
pub mod gems;
pub mod init;
pub mod quiz;
pub mod slides;
pub mod usage;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use lessonforge_core::engine::{GenerateOptions, Generator};
use lessonforge_core::error::ToolkitError;
use lessonforge_core::gems::GemStore;
use lessonforge_core::ledger::UsageLedger;
use lessonforge_providers::{create_provider, load_config_from, ToolkitConfig};

/// Load config and wire up a generator for the commands that call out.
///
/// The credential is checked here, before anything touches the network.
pub(crate) fn build_session(
    config_path: Option<&Path>,
    model: Option<String>,
    temperature: Option<f64>,
) -> Result<(ToolkitConfig, Generator)> {
    let config = load_config_from(config_path)?;
    if config.api_key.trim().is_empty() {
        return Err(ToolkitError::MissingCredential.into());
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;

    let gems = GemStore::load(config.gems_path())?;
    let ledger = UsageLedger::load(config.usage_path())?;
    let provider = create_provider(&config);
    let options = GenerateOptions {
        model: model.unwrap_or_else(|| config.model.clone()),
        temperature: temperature.unwrap_or(config.temperature),
    };

    Ok((config, Generator::new(provider, gems, ledger, options)))
}

/// Resolve a text argument that may be inline or a file path.
pub(crate) fn text_arg(
    inline: Option<String>,
    file: Option<PathBuf>,
    name: &str,
) -> Result<String> {
    match (inline, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read --{name}-file {}", path.display())),
        (None, None) => anyhow::bail!("provide --{name} or --{name}-file"),
    }
}

/// Turn a title into a filesystem-friendly filename fragment.
pub(crate) fn slug(text: &str) -> String {
    text.replace(' ', "_")
}
