//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - Query rate limiter used when streaming domains into an engine
//! - Per-run scratch directory

mod logger;
mod rate_limiter;
mod scratch;

// Re-export public API
pub use logger::init_logger_with;
pub use rate_limiter::{init_rate_limiter, QueryRateLimiter};
pub use scratch::ScratchDir;
