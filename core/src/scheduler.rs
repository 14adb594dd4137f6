// Periodic tasks
//
// Runs a callback every `period` until stopped. A failing iteration is logged
// and the loop keeps going.

use crate::subscription::Callback;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct Scheduler {
    name: String,
    period: Duration,
    task: Arc<dyn Callback>,
    handle: Option<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new<C>(name: impl Into<String>, period: Duration, task: C) -> Self
    where
        C: Callback + 'static,
    {
        Self {
            name: name.into(),
            period,
            task: Arc::new(task),
            handle: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the loop; a second call while running is a no-op
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        let name = self.name.clone();
        let period = self.period;
        let task = Arc::clone(&self.task);

        debug!(target: "scheduler", task = %name, period_ms = period.as_millis() as u64, "Starting schedule");
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = task.call(Vec::new()).await {
                    warn!(target: "scheduler", task = %name, error = %e, "Scheduled task failed");
                }
            }
        }));
    }

    /// Cancel the loop; dispatches already in flight are not affected
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(target: "scheduler", task = %self.name, "Stopping schedule");
            handle.abort();
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KickboardError;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn keeps_running_after_a_failed_iteration() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let mut scheduler = Scheduler::new("flaky", Duration::from_secs(1), move |_args: Vec<Value>| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(KickboardError::callback("flaky", "first run fails"))
                } else {
                    Ok(())
                }
            }
        });

        scheduler.start();
        assert!(scheduler.is_running());
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert!(runs.load(Ordering::SeqCst) >= 3);

        scheduler.stop();
        assert!(!scheduler.is_running());
        let after_stop = runs.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runs.load(Ordering::SeqCst), after_stop);
    }
}
