use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the spindle engine
#[derive(Error, Debug)]
pub enum SpindleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("IO error at {path:?}: {source}")]
    IoAt {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("No query provided")]
    EmptyQuery,

    #[error("Failed to start download process: {0}")]
    ProcessStart(String),

    #[error("File size mismatch after copy: {source_path:?} -> {target_path:?}")]
    SizeMismatch {
        source_path: PathBuf,
        target_path: PathBuf,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the spindle engine
pub type Result<T> = std::result::Result<T, SpindleError>;

impl SpindleError {
    /// Create an IO error carrying the offending path
    pub fn io_at<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        SpindleError::IoAt {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid path error
    pub fn invalid_path<S: Into<String>>(msg: S) -> Self {
        SpindleError::InvalidPath(msg.into())
    }

    /// Create a process start error
    pub fn process_start<S: Into<String>>(msg: S) -> Self {
        SpindleError::ProcessStart(msg.into())
    }

    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SpindleError::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SpindleError::Other(msg.into())
    }
}
