use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::{eraser, path_guard, Config};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .ok_or_else(|| anyhow!("A path is required"))?;

    let config = Config::load()?;
    let staging = config.staging_root();

    let authorized = path_guard::authorize(Path::new(path), &staging)?;
    eraser::erase(&authorized)?;

    println!(
        "{} {}",
        "✓ Removed:".green().bold(),
        authorized.display().to_string().cyan()
    );

    Ok(())
}
