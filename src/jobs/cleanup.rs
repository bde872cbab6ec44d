//! Scheduled expiry sweep
//!
//! Two states, Idle and Running, guarded by a single-flight gate: a trigger
//! arriving while a sweep is in progress is a logged no-op, never a second
//! concurrent sweep. The gate is released on drop, so the job returns to
//! Idle even when a sweep panics.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::single_flight::SingleFlight;
use crate::error::{RecallError, Result};
use crate::service::CallerMemoryService;

/// Recurring cleanup job invoking the service's expiry sweep
pub struct MemoryCleanupJob {
    service: Arc<CallerMemoryService>,
    gate: SingleFlight,
}

impl MemoryCleanupJob {
    pub fn new(service: Arc<CallerMemoryService>) -> Self {
        Self {
            service,
            gate: SingleFlight::new(),
        }
    }

    /// Start the recurring trigger. Each tick attempts one sweep; errors are
    /// logged and the next tick retries.
    pub fn spawn(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let job = Arc::clone(self);

        tokio::spawn(async move {
            tracing::info!(
                "Memory cleanup job started (interval: {}s)",
                every.as_secs()
            );

            let mut ticker = tokio::time::interval(every);
            // The first tick fires immediately; skip it so the job waits a
            // full interval before its first sweep.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                job.run_scheduled();
            }
        })
    }

    /// One scheduled trigger: swallow errors, skip when already running.
    fn run_scheduled(&self) {
        let _guard = match self.gate.begin() {
            Some(guard) => guard,
            None => {
                tracing::warn!("Cleanup trigger fired while a sweep is running; skipping");
                return;
            }
        };

        let deleted = self.service.clean_expired();
        tracing::debug!("Scheduled sweep finished ({} deleted)", deleted);
    }

    /// Manual trigger for operational use. Same single-flight guard, but
    /// surfaces the outcome: returns the deleted count, a busy error when a
    /// sweep is already running, or the underlying store error.
    pub fn run_now(&self) -> Result<i64> {
        let _guard = self.gate.begin().ok_or(RecallError::SweepInProgress)?;
        self.service.try_clean_expired()
    }

    /// Whether a sweep is currently in progress
    pub fn is_running(&self) -> bool {
        self.gate.is_running()
    }
}
