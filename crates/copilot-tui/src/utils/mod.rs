//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{mask, truncate_string, wrap_text};
