//! The `lessonforge usage` command — daily call counters.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::Table;

use lessonforge_core::ledger::{daily_limit, UsageLedger};
use lessonforge_providers::load_config_from;

pub fn execute(reset: bool, config: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config.as_deref())?;
    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;
    let mut ledger = UsageLedger::load(config.usage_path())?;

    if reset {
        ledger.reset()?;
        println!("All counters reset.");
        return Ok(());
    }

    println!("Daily usage for {}:", ledger.date());
    if ledger.counts().count() == 0 {
        println!("No calls made today.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Model", "Calls", "Daily limit"]);
    for (model, count) in ledger.counts() {
        let limit = daily_limit(model)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![model.to_string(), count.to_string(), limit]);
    }
    println!("{table}");

    Ok(())
}
