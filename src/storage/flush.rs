use std::sync::Arc;
use std::time::Duration;

use crate::scheduler::{async_trait, Task};
use crate::storage::VehicleRecordRepository;

/// Periodically writes the record store to its snapshot file.
pub struct FlushRecordsTask {
    repository: Arc<dyn VehicleRecordRepository>,
    period: Duration,
}

impl FlushRecordsTask {
    pub fn new(repository: Arc<dyn VehicleRecordRepository>, period: Duration) -> Self {
        Self { repository, period }
    }
}

#[async_trait]
impl Task for FlushRecordsTask {
    fn name(&self) -> &'static str {
        "flush_records"
    }

    fn period(&self) -> Duration {
        self.period
    }

    async fn run(&self) -> anyhow::Result<()> {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || repository.flush()).await??;
        Ok(())
    }
}
