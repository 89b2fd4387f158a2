//! Cancellable scheduled tasks.
//!
//! Every recurring or one-shot side effect in the engine runs under a
//! [`Scheduled`] handle so session teardown can always cancel it. Dropping a
//! handle aborts the task; a timer can never outlive its owner.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to a background task owned by a session.
#[derive(Debug)]
pub struct Scheduled {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl Scheduled {
    /// Run `fut` until completion or cancellation.
    pub fn spawn<F>(name: &'static str, fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            name,
            handle: tokio::spawn(fut),
        }
    }

    /// Run `tick` every `period`, starting one period from now.
    pub fn every<F>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        Self::spawn(name, async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                tick();
            }
        })
    }

    /// Run the future produced by `tick` immediately and then every `period`.
    /// Missed ticks are skipped so a slow cycle cannot queue a burst of runs.
    pub fn every_async<F, Fut>(name: &'static str, period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn(name, async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                tick().await;
            }
        })
    }

    /// Run `action` once after `delay`.
    pub fn once<F>(name: &'static str, delay: Duration, action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::spawn(name, async move {
            time::sleep(delay).await;
            action();
        })
    }

    /// True once the task has completed or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the task. Idempotent; cancelling a finished task is a no-op.
    pub fn cancel(&self) {
        self.handle.abort();
        debug!(task = self.name, "cancelled scheduled task");
    }
}

impl Drop for Scheduled {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
