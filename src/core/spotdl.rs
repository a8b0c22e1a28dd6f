//! Locating the spotdl executable.

use std::path::PathBuf;

use crate::core::config::Config;
use crate::error::{Result, SpindleError};

/// Resolve the spotdl binary to invoke.
///
/// A configured `spotdl_path` wins; otherwise the system PATH is searched.
/// Resolution failure surfaces as a process-start error since the job can
/// never reach its running state.
pub fn resolve(config: &Config) -> Result<PathBuf> {
    if let Some(path) = &config.spotdl_path {
        return Ok(PathBuf::from(path));
    }

    which::which("spotdl")
        .map_err(|_| SpindleError::process_start("spotdl not found in PATH (set spotdl_path in config)"))
}
