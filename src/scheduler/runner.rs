//! Fixed-rate task runner.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};
use crate::observability::metrics;
use crate::scheduler::task::Task;

/// Process-wide scheduler.
///
/// Tasks are registered with [`TaskScheduler::add_task`] and spawned by
/// [`TaskScheduler::start`], one loop per task.
#[derive(Default)]
pub struct TaskScheduler {
    pending: Vec<Arc<dyn Task>>,
    running: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. It starts on the next call to [`TaskScheduler::start`].
    pub fn add_task(&mut self, task: Arc<dyn Task>) {
        tracing::debug!(task = task.name(), period = ?task.period(), "Task registered");
        self.pending.push(task);
    }

    /// Number of registered tasks, started or not.
    pub fn len(&self) -> usize {
        self.pending.len() + self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn every pending task. Each loop exits when `shutdown` triggers.
    pub fn start(&mut self, shutdown: &Shutdown) {
        for task in self.pending.drain(..) {
            let name = task.name();
            let handle = tokio::spawn(run_periodic(task, shutdown.subscribe()));
            self.running.push((name, handle));
        }
        tracing::info!(tasks = self.running.len(), "Task scheduler started");
    }

    /// Wait for every started task loop to exit.
    pub async fn join(self) {
        for (name, handle) in self.running {
            if let Err(e) = handle.await {
                tracing::error!(task = name, error = %e, "Task loop terminated abnormally");
            }
        }
        tracing::info!("Task scheduler stopped");
    }
}

async fn run_periodic(task: Arc<dyn Task>, mut shutdown: ShutdownSignal) {
    let period = task.period();
    let mut ticker = time::interval_at(time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => {
                tracing::debug!(task = task.name(), "Task received shutdown signal");
                break;
            }
            _ = ticker.tick() => execute(task.as_ref()).await,
        }
    }
}

async fn execute(task: &dyn Task) {
    let start = Instant::now();
    let success = match AssertUnwindSafe(task.run()).catch_unwind().await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!(task = task.name(), error = %e, "Scheduled task failed");
            false
        }
        Err(_) => {
            tracing::error!(task = task.name(), "Scheduled task panicked");
            false
        }
    };
    metrics::record_task_run(task.name(), success, start);
}
