//! Fixed-step scheduler.
//!
//! Every iteration records the time before the step, runs it, then sleeps for
//! whatever is left of the step interval. The delta handed to the next step is
//! the wall time that really passed since the previous step began, sleep
//! overrun included, so simulated time follows wall time.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Pacing arithmetic of the executor, kept free of any clock.
#[derive(Clone, Debug)]
pub struct TickPacer {
    interval: Duration,
    last_start: Option<Instant>,
}

impl TickPacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_start: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delta for the step starting at `before`: the nominal interval for the
    /// first step, the time since the previous start afterwards.
    pub fn next_delta(&mut self, before: Instant) -> Duration {
        match self.last_start.replace(before) {
            Some(previous) => before.saturating_duration_since(previous),
            None => self.interval,
        }
    }

    /// How long to sleep after a step that ran from `before` to `after`.
    pub fn sleep_for(&self, before: Instant, after: Instant) -> Duration {
        self.interval
            .saturating_sub(after.saturating_duration_since(before))
    }
}

/// Handle to a running executor task.
pub struct ExecutorHandle {
    shutdown: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl ExecutorHandle {
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop after the current iteration and wait for it.
    pub async fn shutdown(self) {
        self.request_shutdown();
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "executor task failed");
        }
    }
}

pub struct GameExecutor {
    pacer: TickPacer,
}

impl GameExecutor {
    pub fn new(step_interval: Duration) -> Self {
        Self {
            pacer: TickPacer::new(step_interval),
        }
    }

    /// Spawn the loop as a tokio task, calling `step` with the elapsed time once
    /// per iteration.
    ///
    /// Each step runs in its own task: a step that panics is logged and the loop
    /// carries on with the next iteration.
    pub fn spawn<F, Fut>(self, step: F) -> ExecutorHandle
    where
        F: FnMut(Duration) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let task = tokio::spawn(run(self.pacer, step, Arc::clone(&shutdown)));
        ExecutorHandle { shutdown, task }
    }
}

async fn run<F, Fut>(mut pacer: TickPacer, mut step: F, shutdown: Arc<AtomicBool>)
where
    F: FnMut(Duration) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tracing::info!(interval_ms = pacer.interval().as_millis() as u64, "executor started");

    while !shutdown.load(Ordering::Relaxed) {
        let before = Instant::now();
        let delta = pacer.next_delta(before);

        if let Err(err) = tokio::spawn(step(delta)).await {
            if err.is_panic() {
                tracing::error!(delta_ms = delta.as_millis() as u64, "step panicked");
            } else {
                tracing::error!(error = %err, "step task failed");
            }
        }

        let after = Instant::now();
        tokio::time::sleep(pacer.sleep_for(before, after)).await;
    }

    tracing::info!("executor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_delta_is_nominal() {
        let mut pacer = TickPacer::new(ms(100));
        assert_eq!(pacer.next_delta(Instant::now()), ms(100));
    }

    #[test]
    fn test_slow_step_gets_no_sleep_and_a_longer_delta() {
        let start = Instant::now();
        let mut pacer = TickPacer::new(ms(100));
        pacer.next_delta(start);

        // Step took 250ms: no negative sleep.
        assert_eq!(pacer.sleep_for(start, start + ms(250)), Duration::ZERO);
        assert_eq!(pacer.next_delta(start + ms(250)), ms(250));

        // Fast step afterwards: sleep fills the interval, no backlog carried over.
        let before = start + ms(250);
        assert_eq!(pacer.sleep_for(before, before + ms(30)), ms(70));
        assert_eq!(pacer.next_delta(before + ms(100)), ms(100));
    }
}
