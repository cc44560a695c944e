//! An explicit scheduler for the periodic jobs.
//!
//! The core exposes only callable operations; this is the one place that
//! knows when they run. Jobs are plain async closures on fixed intervals.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Runs registered jobs on fixed intervals until the process exits.
#[derive(Default)]
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job to run every `period`, starting one period from now.
    pub fn every<F, Fut>(&mut self, name: &'static str, period: Duration, job: F)
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick completes immediately; skip it so jobs start
            // one period in.
            interval.tick().await;
            loop {
                interval.tick().await;
                debug!(job = name, "running scheduled job");
                job().await;
            }
        });
        self.handles.push(handle);
    }

    /// Waits on every registered job. Never returns in normal operation.
    pub async fn run(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}
