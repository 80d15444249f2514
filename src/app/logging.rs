//! Progress logging for engine invocations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::info;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::LOGGING_INTERVAL;

/// Shared count of queries handed to an engine.
pub type ProgressCounter = Arc<AtomicUsize>;

/// Logs throughput and an ETA for one engine invocation.
///
/// # Arguments
///
/// * `label` - Which pass is running (e.g. "public", "trusted")
/// * `start_time` - When the invocation started
/// * `sent` - Queries handed to the engine so far
/// * `total` - Queries the invocation will send
pub fn log_progress(label: &str, start_time: Instant, sent: &AtomicUsize, total: usize) {
    let sent = sent.load(Ordering::SeqCst);
    let elapsed = start_time.elapsed();
    let elapsed_secs = elapsed.as_secs_f64();
    #[allow(clippy::cast_precision_loss)]
    let rate = if elapsed_secs > 0.0 {
        sent as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "[{}] {}/{} queries, {:.0} q/s, elapsed {}, ETA {}",
        label,
        sent,
        total,
        rate,
        format_duration(elapsed),
        eta(sent, total, rate)
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string())
    );
}

/// Spawns a task that calls [`log_progress`] every few seconds until
/// `cancel` fires.
pub fn spawn_progress_logger(
    label: String,
    start_time: Instant,
    sent: ProgressCounter,
    total: usize,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL));
        // The first tick completes immediately; skip it so short runs stay quiet
        interval.tick().await;
        loop {
            tokio::select! {
                _ = interval.tick() => log_progress(&label, start_time, &sent, total),
                _ = cancel.cancelled() => break,
            }
        }
    })
}

fn eta(sent: usize, total: usize, rate: f64) -> Option<Duration> {
    if rate <= 0.0 || sent >= total {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let remaining = (total - sent) as f64 / rate;
    Some(Duration::from_secs_f64(remaining))
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
