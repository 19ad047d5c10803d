//! Polling scheduler: one cancellable check loop for the tracked job.
//!
//! A session fires its tick once after [`PollingConfig::initial_delay`]
//! and then every [`PollingConfig::interval`], both measured from the
//! moment the session starts (with the defaults: 2s, 5s, 10s, 15s, ...).
//! An initial delay at least as long as the interval pushes the first
//! recurring tick one interval past the first tick.
//! Ticks keep firing until [`PollingScheduler::stop`] is called.

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::PollingConfig;

/// Owns at most one live polling session.
#[derive(Debug)]
pub struct PollingScheduler {
    config: PollingConfig,
    session: Option<PollingSession>,
}

/// Internal bookkeeping for the live session.
#[derive(Debug)]
struct PollingSession {
    job_id: String,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl PollingScheduler {
    pub fn new(config: PollingConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Start polling for `job_id`, calling `on_tick` on every tick.
    ///
    /// Any live session is stopped first, so at most one schedule is
    /// ever active. Must be called from within a tokio runtime.
    pub fn start<F>(&mut self, job_id: impl Into<String>, on_tick: F)
    where
        F: Fn() + Send + 'static,
    {
        self.stop();

        let job_id = job_id.into();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let initial_delay = self.config.initial_delay;
        let interval = self.config.interval;
        let started = Instant::now();

        tracing::info!(
            job_id = %job_id,
            initial_delay_ms = initial_delay.as_millis() as u64,
            interval_ms = interval.as_millis() as u64,
            "Polling session started",
        );

        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(started + initial_delay) => on_tick(),
            }

            let first_recurring = if initial_delay < interval {
                started + interval
            } else {
                started + initial_delay + interval
            };
            let mut ticker = tokio::time::interval_at(first_recurring, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => on_tick(),
                }
            }
        });

        self.session = Some(PollingSession {
            job_id,
            cancel,
            task,
        });
    }

    /// Cancel the live session, if any. Safe to call repeatedly.
    ///
    /// Returns `true` when a session was actually stopped.
    pub fn stop(&mut self) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        session.cancel.cancel();
        session.task.abort();
        tracing::info!(job_id = %session.job_id, "Polling session stopped");
        true
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Job the live session polls for.
    pub fn job_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.job_id.as_str())
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
