//! Background polling task

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Handle to a task that runs a job on a fixed interval.
///
/// The task is aborted when the handle is stopped or dropped. A tick is
/// delayed, not bursted, when a job runs longer than the interval.
pub struct PollHandle {
    handle: JoinHandle<()>,
}

impl PollHandle {
    /// Spawn a task running `job` immediately and then every `every`.
    pub fn spawn<F, Fut>(every: Duration, job: F) -> Self
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                job().await;
            }
        });
        Self { handle }
    }

    /// Stop polling.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        debug!("Stopping poll task");
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_poll_runs_until_stopped() {
        let runs = Arc::new(AtomicUsize::new(0));
        let runs_clone = runs.clone();

        let handle = PollHandle::spawn(Duration::from_secs(5), move || {
            let runs = runs_clone.clone();
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_secs(12)).await;
        let seen = runs.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(runs.load(Ordering::SeqCst), seen);
    }
}
