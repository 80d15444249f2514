//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (defaults, intervals, file names)
//! - The library-level [`Config`] and its validation
//! - CLI option types and parsing

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{BruteforceArgs, Cli, Command, ResolveArgs, SharedArgs};
pub use constants::*;
pub use types::{Config, EngineKind, LogFormat, LogLevel, OutputPaths};
