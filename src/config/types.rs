//! Configuration types.
//!
//! This module defines the library-level [`Config`] and the enums shared with
//! the command-line parser.

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::config::constants::{
    DEFAULT_MASSDNS_BIN, DEFAULT_MASSDNS_CONCURRENCY, DEFAULT_NATIVE_CONCURRENCY,
    DEFAULT_RESOLVERS_FILE, DEFAULT_TRUSTED_RESOLVERS_FILE, DEFAULT_WILDCARD_BIN,
    TRUSTED_RATE_PER_RESOLVER,
};
use crate::domain::{is_stdin, InputMode};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Which resolution engine backs the resolver passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Stream queries through an external massdns process
    Massdns,
    /// Resolve in-process with hickory-resolver
    Native,
}

/// Optional output artifacts requested by the operator.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    /// Final domain list, one per line
    pub domains: Option<PathBuf>,
    /// Raw record cache in engine text format
    pub records: Option<PathBuf>,
    /// Wildcard roots, written with a `*.` prefix
    pub wildcard_roots: Option<PathBuf>,
    /// Answers produced by wildcard roots
    pub wildcard_answers: Option<PathBuf>,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without going through the command line.
///
/// # Examples
///
/// ```no_run
/// use domain_sift::Config;
/// use domain_sift::domain::InputMode;
/// use std::path::PathBuf;
///
/// let config = Config {
///     input: InputMode::ResolveFile(PathBuf::from("domains.txt")),
///     rate_limit: 500,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Where the candidate domains come from
    pub input: InputMode,

    /// Public resolver list (one address per line)
    pub resolvers_file: PathBuf,

    /// Trusted resolver list (one address per line)
    pub trusted_resolvers_file: PathBuf,

    /// Public queries per second (0 = unlimited)
    pub rate_limit: u32,

    /// Trusted queries per second; derived from the trusted resolver count when unset
    pub rate_limit_trusted: Option<u32>,

    /// Resolution backend
    pub engine: EngineKind,

    /// massdns executable
    pub massdns_bin: PathBuf,

    /// massdns `-s` value
    pub massdns_concurrency: usize,

    /// Wildcard detection executable
    pub wildcard_bin: PathBuf,

    /// In-flight lookups for the native engine
    pub concurrency: usize,

    /// Lowercase input and drop lines outside `[a-z0-9.-]`
    pub sanitize: bool,

    /// Skip wildcard detection and filtering
    pub skip_wildcard_filter: bool,

    /// Skip the trusted resolver validation pass
    pub skip_validation: bool,

    /// Optional output files
    pub outputs: OutputPaths,

    /// Keep the scratch directory after the run
    pub debug: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputMode::ResolveFile(PathBuf::from("domains.txt")),
            resolvers_file: PathBuf::from(DEFAULT_RESOLVERS_FILE),
            trusted_resolvers_file: PathBuf::from(DEFAULT_TRUSTED_RESOLVERS_FILE),
            rate_limit: 0,
            rate_limit_trusted: None,
            engine: EngineKind::Massdns,
            massdns_bin: PathBuf::from(DEFAULT_MASSDNS_BIN),
            massdns_concurrency: DEFAULT_MASSDNS_CONCURRENCY,
            wildcard_bin: PathBuf::from(DEFAULT_WILDCARD_BIN),
            concurrency: DEFAULT_NATIVE_CONCURRENCY,
            sanitize: true,
            skip_wildcard_filter: false,
            skip_validation: false,
            outputs: OutputPaths::default(),
            debug: false,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Whether any stage will query the trusted resolvers.
    pub fn needs_trusted_resolvers(&self) -> bool {
        !self.skip_wildcard_filter || !self.skip_validation
    }

    /// Effective trusted rate limit for `trusted_count` trusted resolvers.
    pub fn trusted_rate_limit(&self, trusted_count: usize) -> u32 {
        self.rate_limit_trusted.unwrap_or_else(|| {
            u32::try_from(trusted_count)
                .unwrap_or(u32::MAX)
                .saturating_mul(TRUSTED_RATE_PER_RESOLVER)
        })
    }

    /// Checks that every file the run depends on is present.
    ///
    /// Runs before any work starts so configuration mistakes are reported
    /// without touching the resolvers.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first missing file or argument.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.input {
            InputMode::ResolveFile(path) => {
                if !is_stdin(path) {
                    require_file("domain list", path)?;
                }
            }
            InputMode::Bruteforce {
                wordlist,
                base_domain,
            } => {
                require_file("wordlist", wordlist)?;
                if base_domain.trim().is_empty() {
                    return Err(ConfigError::MissingArgument("base domain"));
                }
            }
        }

        require_file("resolver list", &self.resolvers_file)?;
        if self.needs_trusted_resolvers() {
            require_file("trusted resolver list", &self.trusted_resolvers_file)?;
        }
        Ok(())
    }
}

fn require_file(what: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingFile {
            what,
            path: path.to_path_buf(),
        })
    }
}
