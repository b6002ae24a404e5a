//! Init command - write an example storyline.toml

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::config::{CONFIG_FILE_NAME, EXAMPLE_CONFIG};

/// Run the init command
pub fn run(path: &Path, quiet: bool) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !repo_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", repo_path.display());
    }

    let config_path = repo_path.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        if !quiet {
            println!(
                "{} Config already exists at {}",
                style("✓").green(),
                style(config_path.display()).cyan()
            );
        }
        return Ok(());
    }

    std::fs::write(&config_path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to create {}", config_path.display()))?;
    if !quiet {
        println!(
            "{} Created {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
        println!(
            "\nNext: run {} to build the race report",
            style("storyline race -o race.json").cyan()
        );
    }
    Ok(())
}
