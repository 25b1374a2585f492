//! Telemetry record storage.
//!
//! # Data Flow
//! ```text
//! simulator tick → save(NewVehicleRecord) → MemoryRepository (per-vehicle ring)
//! HTTP queries   → find_recent / find_between / statistics
//! FlushRecordsTask + shutdown → flush() → JSON snapshot file (optional)
//! startup → with_snapshot() reloads the file
//! ```
//!
//! # Design Decisions
//! - Repository is a trait so the simulator and HTTP layer never see the backend
//! - Retention is bounded per vehicle; the oldest rows go first
//! - Snapshot writes go to a temp file and are renamed into place

pub mod flush;
pub mod memory;
pub mod repository;

pub use flush::FlushRecordsTask;
pub use memory::MemoryRepository;
pub use repository::{NewVehicleRecord, VehicleRecord, VehicleRecordRepository};

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot encoding failed: {0}")]
    Serde(#[from] serde_json::Error),
}
