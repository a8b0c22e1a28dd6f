use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::Path;

use crate::core::{path_guard, relocator, Config, RelocateOutcome};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .ok_or_else(|| anyhow!("A source path is required"))?;

    let config = Config::load()?;
    let staging = config.staging_root();
    let library = config.library_root();

    let source = path_guard::authorize(Path::new(path), &staging)?;
    let target = relocator::library_target(&source, &staging, &library)?;

    let outcome = relocator::relocate(&source, &target)?;

    let relative = target.strip_prefix(&library).unwrap_or(&target);
    match outcome {
        RelocateOutcome::Moved => {
            println!(
                "{} {}",
                "✓ Moved to library:".green().bold(),
                relative.display().to_string().cyan()
            );
        }
        RelocateOutcome::SkippedExisting => {
            println!(
                "{} {}",
                "Already in library, skipped:".yellow(),
                relative.display().to_string().cyan()
            );
        }
        RelocateOutcome::SourceVanished => {
            println!(
                "{} {}",
                "Nothing to move (source no longer exists):".yellow(),
                source.display().to_string().cyan()
            );
        }
    }

    Ok(())
}
