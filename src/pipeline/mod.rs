//! Pipeline controller.
//!
//! Runs the stages strictly in sequence, each one consuming the previous
//! stage's domain set and record cache as values and returning new ones:
//!
//! 1. Prepare the candidate list
//! 2. Resolve it against the public resolvers
//! 3. Detect wildcards, re-resolve their roots with the trusted resolvers and filter
//! 4. Validate the survivors against the trusted resolvers
//! 5. Filter again, since validation can bring wildcard answers back
//!
//! Steps 3 and 4 can be skipped. An engine failure aborts the run.

mod emit;
mod run;

use std::collections::BTreeSet;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::app::{Stage, StageStats};
use crate::domain::{prepare_domains, InputMode};
use crate::error_handling::ConfigError;
use crate::records::RecordSet;
use crate::resolve::{Resolver, ResolverSet};
use crate::wildcard::{filter_wildcards, WildcardDetector, WildcardSet};

pub use emit::emit_outputs;
pub use run::{run, RunReport};

/// Label of the public resolver pass.
pub const PUBLIC_LABEL: &str = "public";
/// Label of the trusted resolver passes.
pub const TRUSTED_LABEL: &str = "trusted";

/// What the pipeline does besides the public pass.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Lowercase input and drop lines outside `[a-z0-9.-]`
    pub sanitize: bool,
    pub skip_wildcard_filter: bool,
    pub skip_validation: bool,
    pub public: ResolverSet,
    /// Required unless both wildcard filtering and validation are skipped
    pub trusted: Option<ResolverSet>,
}

/// Final state of a run.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub domains: BTreeSet<String>,
    pub records: RecordSet,
    pub wildcards: WildcardSet,
    pub stats: StageStats,
}

/// Stage sequencer over a resolution engine and a wildcard detector.
pub struct Pipeline<R, D> {
    resolver: R,
    detector: D,
    options: PipelineOptions,
}

/// Domain set and record cache handed from one stage to the next.
struct Working {
    domains: BTreeSet<String>,
    records: RecordSet,
}

impl Working {
    fn from_records(records: RecordSet) -> Self {
        Self {
            domains: records.domains(),
            records,
        }
    }
}

impl<R: Resolver, D: WildcardDetector> Pipeline<R, D> {
    pub fn new(resolver: R, detector: D, options: PipelineOptions) -> Self {
        Self {
            resolver,
            detector,
            options,
        }
    }

    fn trusted(&self) -> Result<&ResolverSet, ConfigError> {
        self.options
            .trusted
            .as_ref()
            .ok_or(ConfigError::MissingArgument("trusted resolver list"))
    }

    /// Runs every stage and returns the final domains and records.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, if an engine invocation
    /// fails, or if a trusted stage runs without a trusted resolver set.
    pub async fn execute(&self, input: &InputMode) -> Result<PipelineOutcome> {
        let mut stats = StageStats::new();

        let started = Instant::now();
        let candidates = prepare_domains(input, self.options.sanitize).await?;
        let unique: BTreeSet<String> = candidates.iter().cloned().collect();
        info!(
            "Prepared {} candidate domains ({} unique)",
            candidates.len(),
            unique.len()
        );
        stats.record(Stage::Prepare, unique.len(), 0, started.elapsed());

        let started = Instant::now();
        let queries: Vec<String> = unique.into_iter().collect();
        let public = self
            .resolver
            .resolve(&queries, &self.options.public)
            .await
            .context("Public resolution failed")?;
        let mut working = Working::from_records(public);
        info!(
            "Public resolvers found {} domains ({} records)",
            working.domains.len(),
            working.records.len()
        );
        stats.record(
            Stage::ResolvePublic,
            working.domains.len(),
            working.records.len(),
            started.elapsed(),
        );

        let mut wildcards = WildcardSet::default();
        let mut verified_roots = RecordSet::new();
        if self.options.skip_wildcard_filter {
            info!("Skipping wildcard filtering");
        } else {
            let started = Instant::now();
            wildcards = self
                .detector
                .detect(&working.domains, &working.records)
                .await
                .context("Wildcard detection failed")?;
            info!(
                "Found {} wildcard roots with {} distinct answers",
                wildcards.roots.len(),
                wildcards.answers.len()
            );
            stats.record(
                Stage::DetectWildcards,
                wildcards.roots.len(),
                wildcards.answers.len(),
                started.elapsed(),
            );

            if !wildcards.is_empty() {
                let started = Instant::now();
                verified_roots = self
                    .resolver
                    .resolve(&wildcards.root_names(), self.trusted()?)
                    .await
                    .context("Trusted resolution of wildcard roots failed")?;
                info!(
                    "Trusted resolvers confirmed {} of {} wildcard roots",
                    verified_roots.domains().len(),
                    wildcards.roots.len()
                );
                stats.record(
                    Stage::ResolveWildcardRoots,
                    verified_roots.domains().len(),
                    verified_roots.len(),
                    started.elapsed(),
                );

                working = self.filter(
                    Stage::FilterWildcards,
                    &working,
                    &wildcards,
                    &verified_roots,
                    &mut stats,
                );
            }
        }

        if self.options.skip_validation {
            info!("Skipping validation with trusted resolvers");
        } else {
            let started = Instant::now();
            let survivors: Vec<String> = working.domains.iter().cloned().collect();
            let trusted = self
                .resolver
                .resolve(&survivors, self.trusted()?)
                .await
                .context("Trusted validation failed")?;
            working = Working::from_records(trusted);
            info!(
                "Trusted resolvers validated {} of {} domains",
                working.domains.len(),
                survivors.len()
            );
            stats.record(
                Stage::ValidateTrusted,
                working.domains.len(),
                working.records.len(),
                started.elapsed(),
            );

            if !wildcards.is_empty() {
                working = self.filter(
                    Stage::FilterValidated,
                    &working,
                    &wildcards,
                    &verified_roots,
                    &mut stats,
                );
            }
        }

        info!("{} domains remain", working.domains.len());
        Ok(PipelineOutcome {
            domains: working.domains,
            records: working.records,
            wildcards,
            stats,
        })
    }

    fn filter(
        &self,
        stage: Stage,
        working: &Working,
        wildcards: &WildcardSet,
        verified_roots: &RecordSet,
        stats: &mut StageStats,
    ) -> Working {
        let started = Instant::now();
        let outcome = filter_wildcards(&working.records, wildcards, verified_roots);
        info!(
            "Wildcard filter removed {} records, {} of {} domains remain",
            outcome.removed,
            outcome.domains.len(),
            working.domains.len()
        );
        stats.record(
            stage,
            outcome.domains.len(),
            outcome.records.len(),
            started.elapsed(),
        );
        Working {
            domains: outcome.domains,
            records: outcome.records,
        }
    }
}
