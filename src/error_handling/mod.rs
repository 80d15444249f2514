//! Error handling.
//!
//! Typed errors for the three failure families the run distinguishes:
//! - **Initialization**: logger or scratch directory setup failed
//! - **Configuration**: missing files or arguments, detected before any work
//! - **Engine**: an external engine could not run, failed, or was cancelled
//!
//! Empty results (no domains, no records, no wildcards) are not errors.

mod types;

// Re-export public API
pub use types::{ConfigError, EngineError, InitializationError};
