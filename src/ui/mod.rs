// UI formatting helpers
pub mod formatters;

pub use formatters::{format_size, format_time};
