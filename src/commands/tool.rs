use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::core::{spotdl, Config, ToolJob};

pub fn save(matches: &clap::ArgMatches) -> Result<()> {
    let query = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("A query is required"))?;
    let save_file = matches
        .get_one::<String>("save-file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("--save-file is required"))?;
    run(ToolJob::save(query, &save_file)?)
}

pub fn sync(matches: &clap::ArgMatches) -> Result<()> {
    let save_file = matches
        .get_one::<String>("save-file")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("--save-file is required"))?;
    run(ToolJob::sync(&save_file))
}

pub fn meta(matches: &clap::ArgMatches) -> Result<()> {
    let query = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("A query is required"))?;
    run(ToolJob::meta(query)?)
}

pub fn url(matches: &clap::ArgMatches) -> Result<()> {
    let query = matches
        .get_one::<String>("query")
        .ok_or_else(|| anyhow!("A query is required"))?;
    run(ToolJob::url(query)?)
}

/// Spawn the tool, stream its output to the terminal, surface the exit code.
fn run(job: ToolJob) -> Result<()> {
    let config = Config::load()?;
    let program = spotdl::resolve(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let exit_code = runtime.block_on(async {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let printer = tokio::spawn(async move {
            while let Some(chunk) = rx.recv().await {
                print!("{}", chunk);
            }
        });

        let exit_code = job.run(&program, tx).await;
        let _ = printer.await;
        exit_code
    })?;

    match exit_code {
        Some(0) => Ok(()),
        Some(code) => Err(anyhow!("spotdl exited with code {}", code)),
        None => Err(anyhow!("spotdl was terminated by a signal")),
    }
}
