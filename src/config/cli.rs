//! Command-line interface.
//!
//! Two subcommands share one option block: `resolve` takes a domain list and
//! `bruteforce` combines a wordlist with a base domain.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{
    DEFAULT_MASSDNS_BIN, DEFAULT_MASSDNS_CONCURRENCY, DEFAULT_NATIVE_CONCURRENCY,
    DEFAULT_RESOLVERS_FILE, DEFAULT_TRUSTED_RESOLVERS_FILE, DEFAULT_WILDCARD_BIN,
};
use crate::config::types::{Config, EngineKind, LogFormat, LogLevel, OutputPaths};
use crate::domain::InputMode;

/// Fast subdomain resolution with wildcard filtering.
#[derive(Debug, Parser)]
#[command(name = "domain_sift", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve a list of domains (`-` reads stdin)
    Resolve(ResolveArgs),
    /// Bruteforce subdomains of a domain with a wordlist
    Bruteforce(BruteforceArgs),
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// File containing the domains to resolve, or `-` for stdin
    pub file: PathBuf,

    #[command(flatten)]
    pub shared: SharedArgs,
}

#[derive(Debug, Args)]
pub struct BruteforceArgs {
    /// Wordlist, one subdomain label per line
    pub wordlist: PathBuf,

    /// Base domain the words are prefixed to
    pub domain: String,

    #[command(flatten)]
    pub shared: SharedArgs,
}

/// Options accepted by both subcommands.
#[derive(Debug, Args)]
pub struct SharedArgs {
    /// Public resolvers file
    #[arg(short = 'r', long, default_value = DEFAULT_RESOLVERS_FILE)]
    pub resolvers: PathBuf,

    /// Trusted resolvers file
    #[arg(long, default_value = DEFAULT_TRUSTED_RESOLVERS_FILE)]
    pub resolvers_trusted: PathBuf,

    /// Queries per second against public resolvers (0 = unlimited)
    #[arg(short = 'l', long, default_value_t = 0)]
    pub rate_limit: u32,

    /// Queries per second against trusted resolvers (default: 10 per trusted resolver)
    #[arg(long)]
    pub rate_limit_trusted: Option<u32>,

    /// Resolution engine
    #[arg(long, value_enum, default_value_t = EngineKind::Massdns)]
    pub engine: EngineKind,

    /// Path to the massdns executable
    #[arg(short = 'b', long = "bin", default_value = DEFAULT_MASSDNS_BIN)]
    pub massdns_bin: PathBuf,

    /// Number of concurrent lookups massdns keeps in flight
    #[arg(long, default_value_t = DEFAULT_MASSDNS_CONCURRENCY)]
    pub massdns_concurrency: usize,

    /// Path to the wildcard detection executable
    #[arg(long, default_value = DEFAULT_WILDCARD_BIN)]
    pub wildcard_bin: PathBuf,

    /// Concurrent lookups for the native engine
    #[arg(long, default_value_t = DEFAULT_NATIVE_CONCURRENCY)]
    pub concurrency: usize,

    /// Do not lowercase input or drop invalid lines
    #[arg(long)]
    pub skip_sanitize: bool,

    /// Do not detect or filter wildcard subdomains
    #[arg(long)]
    pub skip_wildcard_filter: bool,

    /// Do not validate results against trusted resolvers
    #[arg(long)]
    pub skip_validation: bool,

    /// Write the final domains to a file
    #[arg(short = 'w', long = "write")]
    pub write_domains: Option<PathBuf>,

    /// Write the raw massdns records to a file
    #[arg(long)]
    pub write_massdns: Option<PathBuf>,

    /// Write the wildcard roots to a file
    #[arg(long)]
    pub write_wildcards: Option<PathBuf>,

    /// Write the answers produced by wildcard roots to a file
    #[arg(long)]
    pub write_wildcard_answers: Option<PathBuf>,

    /// Do not print the final domains to stdout
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Keep the scratch directory after the run
    #[arg(long)]
    pub debug: bool,

    /// Log level
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Converts parsed arguments into the library configuration.
    ///
    /// Returns the config and the `--quiet` flag, which only concerns the binary.
    pub fn into_config(self) -> (Config, bool) {
        let (input, shared) = match self.command {
            Command::Resolve(args) => (InputMode::ResolveFile(args.file), args.shared),
            Command::Bruteforce(args) => (
                InputMode::Bruteforce {
                    wordlist: args.wordlist,
                    base_domain: args.domain,
                },
                args.shared,
            ),
        };

        let config = Config {
            input,
            resolvers_file: shared.resolvers,
            trusted_resolvers_file: shared.resolvers_trusted,
            rate_limit: shared.rate_limit,
            rate_limit_trusted: shared.rate_limit_trusted,
            engine: shared.engine,
            massdns_bin: shared.massdns_bin,
            massdns_concurrency: shared.massdns_concurrency,
            wildcard_bin: shared.wildcard_bin,
            concurrency: shared.concurrency,
            sanitize: !shared.skip_sanitize,
            skip_wildcard_filter: shared.skip_wildcard_filter,
            skip_validation: shared.skip_validation,
            outputs: OutputPaths {
                domains: shared.write_domains,
                records: shared.write_massdns,
                wildcard_roots: shared.write_wildcards,
                wildcard_answers: shared.write_wildcard_answers,
            },
            debug: shared.debug,
            log_level: shared.log_level,
            log_format: shared.log_format,
        };
        (config, shared.quiet)
    }
}
