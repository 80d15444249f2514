//! Configuration constants.
//!
//! Defaults for the CLI and the pipeline, plus the names of files written
//! into the per-run scratch directory.

/// Progress logging interval in seconds while an engine invocation runs.
pub const LOGGING_INTERVAL: u64 = 5;

/// Default public resolver list.
pub const DEFAULT_RESOLVERS_FILE: &str = "resolvers.txt";
/// Default trusted resolver list.
pub const DEFAULT_TRUSTED_RESOLVERS_FILE: &str = "resolvers-trusted.txt";

/// Default massdns executable, looked up on `PATH`.
pub const DEFAULT_MASSDNS_BIN: &str = "massdns";
/// Default wildcard detection executable, looked up on `PATH`.
pub const DEFAULT_WILDCARD_BIN: &str = "wildcard-detect";

/// massdns `-s` value (number of concurrent lookups it keeps in flight).
pub const DEFAULT_MASSDNS_CONCURRENCY: usize = 10_000;
/// In-flight lookups for the native engine.
pub const DEFAULT_NATIVE_CONCURRENCY: usize = 100;

/// Trusted queries per second allowed per trusted resolver when no explicit
/// trusted rate limit is configured.
pub const TRUSTED_RATE_PER_RESOLVER: u32 = 10;

/// Standard DNS port, used when a resolver address carries no port.
pub const DNS_PORT: u16 = 53;
/// Per-query timeout for the native engine.
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// Attempts per query for the native engine.
pub const DNS_ATTEMPTS: usize = 2;

/// Rate limiter replenishment tick in milliseconds.
pub const RATE_LIMITER_TICK_MS: u64 = 100;

// Scratch directory file names
pub const SCRATCH_DIR_PREFIX: &str = "domain_sift.";
pub const DETECTOR_DOMAINS_FILE: &str = "wildcard_domains.txt";
pub const DETECTOR_CACHE_FILE: &str = "wildcard_cache.txt";
pub const DETECTOR_ROOTS_FILE: &str = "wildcard_roots.txt";
pub const DETECTOR_ANSWERS_FILE: &str = "wildcard_answers.txt";
