//! Process-wide periodic task scheduler.
//!
//! # Data Flow
//! ```text
//! lifecycle::startup
//!     → add_task(SimulationTask, BroadcastStatusTask, FlushRecordsTask)
//!     → start(&Shutdown): one tokio loop per task
//!         interval tick → Task::run → log + metrics
//!     → shutdown trigger: each loop finishes its in-flight run and exits
//!     → join()
//! ```
//!
//! # Design Decisions
//! - Fixed rate; missed ticks are skipped, not bursted
//! - Runs of one task never overlap
//! - A failing or panicking run never unschedules the task

pub mod runner;
pub mod task;

pub use runner::TaskScheduler;
pub use task::{async_trait, Task};
