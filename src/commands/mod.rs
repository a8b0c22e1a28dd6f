// Command handlers module
pub mod config;
pub mod download;
pub mod list;
pub mod promote;
pub mod remove;
pub mod tool;

// Re-exports for cleaner imports
pub use download::execute as download;
pub use list::execute as list;
pub use promote::execute as promote;
pub use remove::execute as remove;
