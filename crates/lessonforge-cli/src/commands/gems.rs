//! The `lessonforge gems` command — prompt library management.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::Table;

use lessonforge_core::gems::GemStore;
use lessonforge_providers::load_config_from;

#[derive(Subcommand)]
pub enum GemsAction {
    /// List all gems
    List,

    /// Print a gem's full prompt
    Show {
        /// Gem name
        name: String,
    },

    /// Create a gem or overwrite its prompt
    Set {
        /// Gem name
        name: String,

        /// Prompt text, inline
        #[arg(long, conflicts_with = "prompt_file")]
        prompt: Option<String>,

        /// Prompt text, from a file
        #[arg(long)]
        prompt_file: Option<PathBuf>,
    },

    /// Rename a gem
    Rename {
        /// Current name
        from: String,

        /// New name
        to: String,
    },

    /// Delete a gem (built-in gems are protected)
    Delete {
        /// Gem name
        name: String,
    },
}

pub fn execute(action: GemsAction, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;
    let mut store = GemStore::load(config.gems_path())?;

    match action {
        GemsAction::List => {
            let mut table = Table::new();
            table.set_header(vec!["Gem", "Prompt"]);
            for name in store.names() {
                let prompt = store.get(name).unwrap_or_default();
                table.add_row(vec![name.to_string(), preview(prompt)]);
            }
            println!("{table}");
        }
        GemsAction::Show { name } => match store.get(&name) {
            Some(prompt) => println!("{prompt}"),
            None => anyhow::bail!("no gem named '{name}'"),
        },
        GemsAction::Set {
            name,
            prompt,
            prompt_file,
        } => {
            let prompt = super::text_arg(prompt, prompt_file, "prompt")?;
            store.set(&name, &prompt)?;
            println!("Saved gem '{name}'.");
        }
        GemsAction::Rename { from, to } => {
            store
                .rename(&from, &to)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Renamed '{from}' to '{to}'.");
        }
        GemsAction::Delete { name } => {
            store.delete(&name).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Deleted '{name}'.");
        }
    }

    Ok(())
}

/// First line of a prompt, clipped for the table.
fn preview(prompt: &str) -> String {
    let first = prompt.lines().next().unwrap_or_default();
    if first.chars().count() > 60 {
        let clipped: String = first.chars().take(57).collect();
        format!("{clipped}...")
    } else {
        first.to_string()
    }
}
