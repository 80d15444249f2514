//! Rate limiting and progress reporting around one engine invocation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::app::{log_progress, spawn_progress_logger, ProgressCounter};
use crate::initialization::{init_rate_limiter, QueryRateLimiter};

/// Paces queries for one invocation and reports its progress.
///
/// Background tasks are tied to drop guards, so an invocation abandoned by
/// cancellation still stops its progress logger and token ticker.
pub(crate) struct Pacing {
    label: String,
    total: usize,
    start_time: Instant,
    sent: ProgressCounter,
    limiter: Option<Arc<QueryRateLimiter>>,
    limiter_shutdown: Option<CancellationToken>,
    progress_cancel: CancellationToken,
    progress_task: Option<JoinHandle<()>>,
    _guards: Vec<DropGuard>,
}

impl Pacing {
    pub(crate) fn start(label: &str, total: usize, rate_limit: u32) -> Self {
        let start_time = Instant::now();
        let sent: ProgressCounter = Arc::new(AtomicUsize::new(0));
        let progress_cancel = CancellationToken::new();
        let progress_task = spawn_progress_logger(
            label.to_string(),
            start_time,
            Arc::clone(&sent),
            total,
            progress_cancel.clone(),
        );

        let mut guards = vec![progress_cancel.clone().drop_guard()];
        let (limiter, limiter_shutdown) = match init_rate_limiter(rate_limit) {
            Some((limiter, shutdown)) => {
                guards.push(shutdown.clone().drop_guard());
                (Some(limiter), Some(shutdown))
            }
            None => (None, None),
        };

        Self {
            label: label.to_string(),
            total,
            start_time,
            sent,
            limiter,
            limiter_shutdown,
            progress_cancel,
            progress_task: Some(progress_task),
            _guards: guards,
        }
    }

    /// Waits until the next query may be sent.
    pub(crate) async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.acquire().await;
        }
    }

    pub(crate) fn is_limited(&self) -> bool {
        self.limiter.is_some()
    }

    pub(crate) fn mark_sent(&self) {
        self.sent.fetch_add(1, Ordering::SeqCst);
    }

    /// Stops the token ticker and the progress logger, then logs the final
    /// progress line. A progress task that panicked does not fail the
    /// invocation.
    pub(crate) async fn finish(mut self) {
        if let Some(shutdown) = self.limiter_shutdown.take() {
            shutdown.cancel();
        }
        self.progress_cancel.cancel();
        if let Some(task) = self.progress_task.take() {
            if let Err(e) = task.await {
                log::debug!("{} progress task ended abnormally: {}", self.label, e);
            }
        }
        log_progress(&self.label, self.start_time, &self.sent, self.total);
    }
}
