use anyhow::{anyhow, Result};
use colored::Colorize;

use crate::core::Config;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("get", sub_matches)) => {
            let config = Config::load()?;
            match sub_matches.get_one::<String>("key") {
                Some(key) => match config.get(key) {
                    Some(value) => println!("{}", value.cyan().bold()),
                    None => println!("{}", format!("{} is not set", key).yellow()),
                },
                None => {
                    // No key: show everything
                    println!("{}", serde_json::to_string_pretty(&config)?);
                }
            }
        }
        Some(("set", sub_matches)) => {
            let key = sub_matches
                .get_one::<String>("key")
                .ok_or_else(|| anyhow!("A key is required"))?;
            let value = sub_matches
                .get_one::<String>("value")
                .ok_or_else(|| anyhow!("A value is required"))?;

            let mut config = Config::load()?;
            if !config.set(key, value)? {
                return Err(anyhow!("Unknown config key: {}", key));
            }
            config.save()?;

            println!("{} {} = {}", "✓".green(), key.white(), value.cyan().bold());
        }
        _ => {
            println!("Use 'spindle config --help' for more information.");
        }
    }

    Ok(())
}
