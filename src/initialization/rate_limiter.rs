//! Query rate limiter.
//!
//! Token bucket that paces how fast domains are handed to a resolution
//! engine. massdns has no rate ceiling of its own, so the limiter sits
//! between the domain list and the engine's stdin.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::time::{interval, Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::RATE_LIMITER_TICK_MS;

/// Token-bucket rate limiter for outgoing queries.
///
/// # Behavior
///
/// - Tokens are replenished by a background task every 100ms
/// - The bucket holds at most one second worth of queries
/// - Acquired permits are consumed, never returned
/// - The background task stops when the shutdown token is cancelled
pub struct QueryRateLimiter {
    permits: Arc<Semaphore>,
    rps: u32,
}

impl QueryRateLimiter {
    /// Waits for one query token.
    pub async fn acquire(&self) {
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    /// Configured queries per second.
    pub fn rps(&self) -> u32 {
        self.rps
    }
}

/// Initializes a token-bucket rate limiter.
///
/// If `rps` is 0, rate limiting is disabled and `None` is returned.
///
/// # Returns
///
/// A tuple of `(QueryRateLimiter, CancellationToken)` if rate limiting is
/// enabled. Cancelling the token stops token replenishment.
pub fn init_rate_limiter(rps: u32) -> Option<(Arc<QueryRateLimiter>, CancellationToken)> {
    if rps == 0 {
        return None;
    }
    let capacity = usize::try_from(rps).unwrap_or(usize::MAX).max(1);
    let shutdown = CancellationToken::new();
    let limiter = Arc::new(QueryRateLimiter {
        permits: Arc::new(Semaphore::new(capacity)),
        rps,
    });

    let permits = Arc::clone(&limiter.permits);
    let shutdown_for_ticker = shutdown.clone();
    let mut ticker = interval(Duration::from_millis(RATE_LIMITER_TICK_MS));
    tokio::spawn(async move {
        let mut last_time = Instant::now();
        // Carry fractional tokens so low rates still replenish
        let mut fractional = 0.0f64;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let owed = f64::from(rps) * now.duration_since(last_time).as_secs_f64() + fractional;
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let whole = owed as usize;
                    fractional = owed - whole as f64;
                    // Never let the bucket grow beyond one second of queries
                    let room = capacity.saturating_sub(permits.available_permits());
                    let add = whole.min(room);
                    if add > 0 {
                        permits.add_permits(add);
                    }
                    last_time = now;
                }
                _ = shutdown_for_ticker.cancelled() => {
                    log::debug!("Rate limiter background task shutting down");
                    break;
                }
            }
        }
    });

    Some((limiter, shutdown))
}
