//! Operator-facing run support.
//!
//! Progress logging for engine invocations and stage statistics for the
//! pipeline.

pub mod logging;
pub mod statistics;

// Re-export public API
pub use logging::{log_progress, spawn_progress_logger, ProgressCounter};
pub use statistics::{print_stage_statistics, Stage, StageStats, StageSummary};
