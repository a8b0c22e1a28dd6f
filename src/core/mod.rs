// Core engine: job orchestration and file relocation

pub mod config;
pub mod eraser;
pub mod job;
pub mod manifest;
pub mod path_guard;
pub mod queue;
pub mod relocator;
pub mod spotdl;
pub mod tree;

// Re-export commonly used items
pub use config::Config;
pub use job::{DownloadJob, DownloadRequest, JobReport, QueryKind, ToolJob};
pub use relocator::RelocateOutcome;
pub use tree::FileTreeNode;
