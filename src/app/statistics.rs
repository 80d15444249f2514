//! Stage statistics.
//!
//! The pipeline records how many domains and records survive each stage so
//! the operator can judge the health of a run at a glance.

use std::time::Duration;

use log::info;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum Stage {
    #[strum(to_string = "prepare input")]
    Prepare,
    #[strum(to_string = "resolve with public resolvers")]
    ResolvePublic,
    #[strum(to_string = "detect wildcards")]
    DetectWildcards,
    #[strum(to_string = "resolve wildcard roots with trusted resolvers")]
    ResolveWildcardRoots,
    #[strum(to_string = "filter wildcards")]
    FilterWildcards,
    #[strum(to_string = "validate with trusted resolvers")]
    ValidateTrusted,
    #[strum(to_string = "filter wildcards after validation")]
    FilterValidated,
}

/// Counts observed after one stage.
///
/// For [`Stage::DetectWildcards`], `domains` counts wildcard roots and
/// `records` counts wildcard answers.
#[derive(Debug, Clone, PartialEq)]
pub struct StageSummary {
    pub stage: Stage,
    pub domains: usize,
    pub records: usize,
    pub elapsed: Duration,
}

/// Summaries of the stages that ran, in execution order.
#[derive(Debug, Clone, Default)]
pub struct StageStats {
    summaries: Vec<StageSummary>,
}

impl StageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stage: Stage, domains: usize, records: usize, elapsed: Duration) {
        self.summaries.push(StageSummary {
            stage,
            domains,
            records,
            elapsed,
        });
    }

    /// Summary of `stage`, if it ran.
    pub fn get(&self, stage: Stage) -> Option<&StageSummary> {
        self.summaries.iter().find(|s| s.stage == stage)
    }

    pub fn ran(&self, stage: Stage) -> bool {
        self.get(stage).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageSummary> {
        self.summaries.iter()
    }
}

/// Logs one line per stage, including the stages that were skipped.
pub fn print_stage_statistics(stats: &StageStats) {
    info!("Stage summary:");
    for stage in Stage::iter() {
        match stats.get(stage) {
            Some(summary) if stage == Stage::DetectWildcards => info!(
                "   {}: {} wildcard roots, {} answers ({:.1}s)",
                stage,
                summary.domains,
                summary.records,
                summary.elapsed.as_secs_f64()
            ),
            Some(summary) => info!(
                "   {}: {} domains, {} records ({:.1}s)",
                stage,
                summary.domains,
                summary.records,
                summary.elapsed.as_secs_f64()
            ),
            None => info!("   {}: skipped", stage),
        }
    }
}
