//! Run orchestration: configuration to finished output.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use tokio_util::sync::CancellationToken;

use super::{emit_outputs, Pipeline, PipelineOptions, PipelineOutcome, PUBLIC_LABEL, TRUSTED_LABEL};
use crate::app::print_stage_statistics;
use crate::config::{Config, EngineKind};
use crate::error_handling::EngineError;
use crate::initialization::ScratchDir;
use crate::resolve::{MassdnsResolver, NativeResolver, Resolver, ResolverSet};
use crate::wildcard::{CommandDetector, WildcardDetector};

/// Results of a run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final domains, sorted
    pub domains: Vec<String>,
    /// Number of wildcard roots detected
    pub wildcard_roots: usize,
    /// Number of records behind the final domains
    pub records: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Runs the whole pipeline for `config`.
///
/// This is the main entry point for the library. It validates the
/// configuration before any query is sent, resolves and filters the
/// candidates, writes the requested output files and logs a per-stage
/// summary.
///
/// The scratch directory is removed on every return path unless
/// `config.debug` is set.
///
/// # Arguments
///
/// * `config` - What to resolve, with which engines and resolvers
/// * `cancel` - Cancelling it kills running engines and ends the run with
///   `EngineError::Cancelled`
///
/// # Errors
///
/// This function will return an error if:
/// - A required file or argument is missing
/// - A resolver list is unreadable or empty
/// - An engine cannot be started, exits unsuccessfully or is cancelled
/// - An output file cannot be written
///
/// # Example
///
/// ```no_run
/// use domain_sift::{run, Config, InputMode};
/// use std::path::PathBuf;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config {
///     input: InputMode::ResolveFile(PathBuf::from("domains.txt")),
///     ..Default::default()
/// };
/// let report = run(config, CancellationToken::new()).await?;
/// println!("{} domains resolved", report.domains.len());
/// # Ok(())
/// # }
/// ```
pub async fn run(config: Config, cancel: CancellationToken) -> Result<RunReport> {
    let start_time = Instant::now();
    config.validate()?;

    let public = ResolverSet::load(PUBLIC_LABEL, &config.resolvers_file, config.rate_limit).await?;
    let trusted = if config.needs_trusted_resolvers() {
        let set = ResolverSet::load(TRUSTED_LABEL, &config.trusted_resolvers_file, 0).await?;
        let rate = config.trusted_rate_limit(set.len());
        Some(set.with_rate_limit(rate))
    } else {
        None
    };
    info!(
        "Loaded {} public resolvers{}",
        public.len(),
        trusted
            .as_ref()
            .map(|t| format!(" and {} trusted resolvers ({} q/s)", t.len(), t.rate_limit))
            .unwrap_or_default()
    );

    let scratch = Arc::new(
        ScratchDir::create(config.debug).context("Failed to create scratch directory")?,
    );
    let options = PipelineOptions {
        sanitize: config.sanitize,
        skip_wildcard_filter: config.skip_wildcard_filter,
        skip_validation: config.skip_validation,
        public,
        trusted,
    };
    let detector = CommandDetector::new(
        config.wildcard_bin.clone(),
        config.trusted_resolvers_file.clone(),
        Arc::clone(&scratch),
        cancel.clone(),
    );

    let outcome = match config.engine {
        EngineKind::Massdns => {
            let resolver = MassdnsResolver::new(
                config.massdns_bin.clone(),
                config.massdns_concurrency,
                Arc::clone(&scratch),
                cancel.clone(),
            );
            execute(Pipeline::new(resolver, detector, options), &config, &cancel).await?
        }
        EngineKind::Native => {
            let resolver = NativeResolver::new(config.concurrency, cancel.clone());
            execute(Pipeline::new(resolver, detector, options), &config, &cancel).await?
        }
    };

    emit_outputs(&outcome, &config.outputs).await?;
    print_stage_statistics(&outcome.stats);

    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    info!(
        "Finished in {:.1}s: {} domains, {} wildcard roots",
        elapsed_seconds,
        outcome.domains.len(),
        outcome.wildcards.roots.len()
    );
    Ok(RunReport {
        wildcard_roots: outcome.wildcards.roots.len(),
        records: outcome.records.len(),
        domains: outcome.domains.into_iter().collect(),
        elapsed_seconds,
    })
}

/// Executes the pipeline until it finishes or `cancel` fires.
///
/// Stages that are not running an engine (reading stdin, filtering) are
/// abandoned at the next await point.
async fn execute<R, D>(
    pipeline: Pipeline<R, D>,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<PipelineOutcome>
where
    R: Resolver,
    D: WildcardDetector,
{
    tokio::select! {
        outcome = pipeline.execute(&config.input) => outcome,
        _ = cancel.cancelled() => Err(EngineError::Cancelled.into()),
    }
}
