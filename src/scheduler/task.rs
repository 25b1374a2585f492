use std::time::Duration;

pub use async_trait::async_trait;

/// A unit of periodic background work.
///
/// The scheduler calls [`Task::run`] once per [`Task::period`]. Errors are
/// logged and counted; they never unschedule the task.
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Stable name used in logs and metric labels.
    fn name(&self) -> &'static str;

    fn period(&self) -> Duration;

    async fn run(&self) -> anyhow::Result<()>;
}
