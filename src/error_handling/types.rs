//! Error type definitions.

use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error creating the per-run scratch directory.
    #[error("Scratch directory creation error: {0}")]
    ScratchDirError(#[source] std::io::Error),
}

/// Configuration problems, reported before any resolution starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required input file does not exist.
    #[error("{what} not found: {}", .path.display())]
    MissingFile { what: &'static str, path: PathBuf },

    /// A required argument was empty.
    #[error("missing required argument: {0}")]
    MissingArgument(&'static str),

    /// A file exists but could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resolver list contained no usable address.
    #[error("no resolvers found in {}", .0.display())]
    EmptyResolvers(PathBuf),
}

/// Failures of an external engine invocation.
///
/// Any of these aborts the run: the record and wildcard sets are of unknown
/// completeness once an engine fails.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine executable could not be started.
    #[error("failed to start {engine}: {source}")]
    Spawn {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but exited unsuccessfully.
    #[error("{engine} exited with status {}", .code.map_or_else(|| "signal".to_string(), |c| c.to_string()))]
    Exited { engine: String, code: Option<i32> },

    /// Streaming input to or reading output from the engine failed.
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The native engine could not be configured.
    #[error("invalid resolver address: {0}")]
    InvalidResolver(String),

    /// The operator aborted the run.
    #[error("cancelled")]
    Cancelled,
}
