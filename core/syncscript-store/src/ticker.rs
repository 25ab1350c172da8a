//! Periodic background task with explicit cancellation.

use crate::error::{StoreError, StoreResult};
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// A restartable interval task.
///
/// The tick closure should hold its owner through a `Weak` and return
/// `ControlFlow::Break` once the owner is gone, so an orphaned ticker stops
/// on its own. Dropping the ticker aborts the task.
pub struct Ticker {
    name: &'static str,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Ticker {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Spawns `tick` every `period`, replacing any running task.
    ///
    /// The first tick fires one full period after the call. Requires a
    /// running Tokio runtime.
    pub fn start<F, Fut>(&self, period: Duration, mut tick: F) -> StoreResult<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        if period.is_zero() {
            return Err(StoreError::InvalidConfig(format!(
                "{}: tick period must be non-zero",
                self.name
            )));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| StoreError::NoRuntime)?;

        let name = self.name;
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tick().await.is_break() {
                    debug!(ticker = name, "tick loop finished");
                    break;
                }
            }
        });

        let previous = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
        info!(ticker = name, period_ms = period.as_millis() as u64, "ticker started");
        Ok(())
    }

    /// Cancels the task. Returns whether one was running.
    pub fn stop(&self) -> bool {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner).take();
        match handle {
            Some(handle) => {
                let was_running = !handle.is_finished();
                handle.abort();
                if was_running {
                    info!(ticker = self.name, "ticker stopped");
                }
                was_running
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        let handle = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticker")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .finish()
    }
}
