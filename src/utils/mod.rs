//! Utility functions.
//!
//! This module provides line-oriented file helpers shared by the engine
//! adapters and the output writers.

mod files;

pub use files::{read_lines, read_lines_if_exists, write_lines};
