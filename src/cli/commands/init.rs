//! Init and Config commands.

use std::path::Path;

use anyhow::Context;

use crate::config::Settings;

/// Write the default settings file and create the watched folder.
pub fn run_init(config_path: &Path, force: bool) -> anyhow::Result<()> {
    Settings::init_config_file(config_path, force)?;
    println!("Created configuration file at: {}", config_path.display());

    let settings = Settings::load_from(config_path)?;
    let root = &settings.watch.root;
    if root.is_dir() {
        println!("Watching existing folder: {}", root.display());
    } else {
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create {}", root.display()))?;
        println!("Created folder: {}", root.display());
    }
    println!("Add .txt or .csv files there, one `label|payload` record per line.");
    Ok(())
}

/// Display the effective settings.
pub fn run_config(config: &Settings) -> anyhow::Result<()> {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
