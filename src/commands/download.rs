use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::core::{queue, spotdl, Config, DownloadRequest, QueryKind};

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let queries: Vec<String> = matches
        .get_many::<String>("query")
        .ok_or_else(|| anyhow!("At least one query is required"))?
        .cloned()
        .collect();

    let kind = match matches.get_one::<String>("type") {
        Some(s) => {
            Some(QueryKind::parse(s).ok_or_else(|| anyhow!("Unknown download type: {}", s))?)
        }
        None => None,
    };
    let format = matches.get_one::<String>("format").cloned();
    let bitrate = matches.get_one::<String>("bitrate").cloned();
    let cookie_file = matches.get_one::<String>("cookie-file").map(PathBuf::from);
    let premium = matches.get_flag("premium");

    if cookie_file.is_some() && queries.len() > 1 {
        // Cookie files are single-use and scoped to one job
        return Err(anyhow!(
            "--cookie-file can only be used with a single query"
        ));
    }

    let config = Config::load()?;
    let program = spotdl::resolve(&config)?;

    let requests: Vec<DownloadRequest> = queries
        .iter()
        .map(|query| DownloadRequest {
            query: query.clone(),
            kind,
            format: format.clone(),
            bitrate: bitrate.clone(),
            cookie_file: cookie_file.clone(),
            premium,
        })
        .collect();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let reports = runtime.block_on(async {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        // Print process output as it arrives, in delivery order
        let printer = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                print!("{}", chunk);
            }
        });

        let reports = queue::run_queue(requests, &program, &config, &tx).await;

        drop(tx);
        let _ = printer.await;
        reports
    });

    println!();
    let mut failures = 0;
    for (query, report) in queries.iter().zip(&reports) {
        match report {
            Ok(report) => {
                match report.exit_code {
                    Some(0) => println!("{} {}", "✓ Completed:".green().bold(), query.cyan()),
                    code => {
                        failures += 1;
                        println!(
                            "{} {} {}",
                            "✗ Finished with errors:".yellow().bold(),
                            query.cyan(),
                            format!("(exit code {:?})", code).dimmed()
                        );
                    }
                }
                if let Some(manifest) = &report.manifest {
                    println!(
                        "  {} {}",
                        "Playlist manifest:".white(),
                        manifest.display().to_string().cyan()
                    );
                }
            }
            Err(e) => {
                failures += 1;
                println!("{} {}: {}", "✗ Failed:".red().bold(), query.cyan(), e);
            }
        }
    }

    if failures > 0 {
        return Err(anyhow!("{} of {} downloads failed", failures, queries.len()));
    }

    Ok(())
}
