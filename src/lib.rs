//! domain_sift library: subdomain resolution with wildcard filtering
//!
//! This library resolves large candidate lists of hostnames against public
//! resolvers, detects DNS wildcard zones that would answer for any name,
//! removes the records they pollute the results with, and re-validates what
//! survives against a small set of trusted resolvers.
//!
//! # Example
//!
//! ```no_run
//! use domain_sift::{run, Config, InputMode};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     input: InputMode::Bruteforce {
//!         wordlist: std::path::PathBuf::from("words.txt"),
//!         base_domain: "example.com".to_string(),
//!     },
//!     rate_limit: 500,
//!     ..Default::default()
//! };
//!
//! let report = run(config, CancellationToken::new()).await?;
//! for domain in &report.domains {
//!     println!("{}", domain);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. The default engine shells out to
//! `massdns`; wildcard detection shells out to an external detector.

mod app;
pub mod config;
pub mod domain;
pub mod error_handling;
pub mod initialization;
pub mod pipeline;
pub mod records;
pub mod resolve;
mod utils;
pub mod wildcard;

// Re-export public API
pub use app::{Stage, StageStats, StageSummary};
pub use config::{Cli, Config, EngineKind, LogFormat, LogLevel, OutputPaths};
pub use domain::InputMode;
pub use error_handling::{ConfigError, EngineError};
pub use pipeline::{run, Pipeline, PipelineOptions, PipelineOutcome, RunReport};
pub use records::{Record, RecordSet};
pub use resolve::{Resolver, ResolverSet};
pub use wildcard::{filter_wildcards, WildcardDetector, WildcardRoot, WildcardSet};
