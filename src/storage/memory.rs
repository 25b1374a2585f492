//! In-memory record store with optional JSON snapshot persistence.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::observability::metrics;
use crate::storage::repository::{NewVehicleRecord, VehicleRecord, VehicleRecordRepository};
use crate::storage::StorageError;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    next_id: u64,
    records: Vec<VehicleRecord>,
}

/// Bounded per-vehicle ring of telemetry records.
pub struct MemoryRepository {
    rows: DashMap<String, VecDeque<VehicleRecord>>,
    next_id: AtomicU64,
    total: AtomicUsize,
    max_records: usize,
    snapshot_path: Option<PathBuf>,
}

impl MemoryRepository {
    /// Create an empty, non-persistent store keeping at most `max_records` per vehicle.
    pub fn new(max_records: usize) -> Self {
        Self {
            rows: DashMap::new(),
            next_id: AtomicU64::new(1),
            total: AtomicUsize::new(0),
            max_records: max_records.max(1),
            snapshot_path: None,
        }
    }

    /// Create a store backed by a snapshot file, loading it if it exists.
    pub fn with_snapshot(max_records: usize, path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let mut repo = Self::new(max_records);

        if path.exists() {
            let file = File::open(&path)?;
            let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;
            let mut next_id = snapshot.next_id;
            for record in snapshot.records {
                next_id = next_id.max(record.id + 1);
                repo.insert(record);
            }
            *repo.next_id.get_mut() = next_id.max(1);
            tracing::info!(
                path = %path.display(),
                records = repo.len(),
                "Loaded telemetry snapshot"
            );
        }

        repo.snapshot_path = Some(path);
        Ok(repo)
    }

    fn insert(&self, record: VehicleRecord) {
        let mut ring = self.rows.entry(record.sample.vehicle_id.clone()).or_default();
        ring.push_back(record);
        self.total.fetch_add(1, Ordering::Relaxed);
        while ring.len() > self.max_records {
            ring.pop_front();
            self.total.fetch_sub(1, Ordering::Relaxed);
        }
    }

    fn select<F>(&self, vehicle_id: &str, keep: F) -> Vec<VehicleRecord>
    where
        F: Fn(&VehicleRecord) -> bool,
    {
        let mut out: Vec<VehicleRecord> = match self.rows.get(vehicle_id) {
            Some(ring) => ring.iter().filter(|r| keep(r)).cloned().collect(),
            None => Vec::new(),
        };
        out.sort_by(|a, b| {
            b.sample
                .timestamp
                .cmp(&a.sample.timestamp)
                .then_with(|| b.id.cmp(&a.id))
        });
        out
    }
}

impl VehicleRecordRepository for MemoryRepository {
    fn save(&self, record: NewVehicleRecord) -> Result<VehicleRecord, StorageError> {
        let stored = VehicleRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            sample: record,
            created_at: Utc::now(),
        };
        self.insert(stored.clone());
        metrics::record_stored_records(self.len());
        Ok(stored)
    }

    fn find_recent(&self, vehicle_id: &str, limit: usize) -> Result<Vec<VehicleRecord>, StorageError> {
        let mut out = self.select(vehicle_id, |_| true);
        out.truncate(limit);
        Ok(out)
    }

    fn find_between(
        &self,
        vehicle_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VehicleRecord>, StorageError> {
        Ok(self.select(vehicle_id, |r| r.sample.timestamp >= start && r.sample.timestamp <= end))
    }

    fn average_speed_since(&self, vehicle_id: &str, start: DateTime<Utc>) -> Result<Option<f64>, StorageError> {
        let rows = self.select(vehicle_id, |r| r.sample.timestamp >= start);
        if rows.is_empty() {
            return Ok(None);
        }
        let sum: f64 = rows.iter().map(|r| r.sample.speed).sum();
        Ok(Some(sum / rows.len() as f64))
    }

    fn distance_since(&self, vehicle_id: &str, start: DateTime<Utc>) -> Result<Option<f64>, StorageError> {
        let rows = self.select(vehicle_id, |r| r.sample.timestamp >= start);
        let span = rows.iter().map(|r| r.sample.odometer).fold(None, |acc: Option<(f64, f64)>, odo| {
            Some(match acc {
                Some((lo, hi)) => (lo.min(odo), hi.max(odo)),
                None => (odo, odo),
            })
        });
        Ok(span.map(|(lo, hi)| hi - lo))
    }

    fn len(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let mut records: Vec<VehicleRecord> = self
            .rows
            .iter()
            .flat_map(|ring| ring.value().iter().cloned().collect::<Vec<_>>())
            .collect();
        records.sort_by_key(|r| r.id);

        let snapshot = Snapshot {
            next_id: self.next_id.load(Ordering::Relaxed),
            records,
        };

        let tmp = path.with_extension("tmp");
        {
            let writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(writer, &snapshot)?;
        }
        fs::rename(&tmp, path)?;

        tracing::debug!(path = %path.display(), records = snapshot.records.len(), "Telemetry snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::model::VehicleData;
    use chrono::{Duration, TimeZone};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn sample(vehicle: &str, at: DateTime<Utc>, speed: f64, odometer: f64) -> NewVehicleRecord {
        let mut data = VehicleData::parked(vehicle, at);
        data.speed = speed;
        data.odometer = odometer;
        NewVehicleRecord::from(&data)
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let repo = MemoryRepository::new(100);
        for i in 0..5 {
            repo.save(sample("v1", t(i), i as f64, 0.0)).unwrap();
        }
        repo.save(sample("v2", t(10), 99.0, 0.0)).unwrap();

        let recent = repo.find_recent("v1", 3).unwrap();
        let speeds: Vec<_> = recent.iter().map(|r| r.sample.speed).collect();
        assert_eq!(speeds, vec![4.0, 3.0, 2.0]);
        assert!(repo.find_recent("nobody", 10).unwrap().is_empty());
        assert_eq!(repo.len(), 6);
    }

    #[test]
    fn test_ids_increase() {
        let repo = MemoryRepository::new(10);
        let a = repo.save(sample("v1", t(0), 0.0, 0.0)).unwrap();
        let b = repo.save(sample("v1", t(0), 0.0, 0.0)).unwrap();
        assert!(b.id > a.id);

        // Same timestamp: higher id first.
        let recent = repo.find_recent("v1", 10).unwrap();
        assert_eq!(recent[0].id, b.id);
    }

    #[test]
    fn test_period_is_inclusive() {
        let repo = MemoryRepository::new(100);
        for i in 0..10 {
            repo.save(sample("v1", t(i), 0.0, 0.0)).unwrap();
        }
        let rows = repo.find_between("v1", t(2), t(5)).unwrap();
        let times: Vec<_> = rows.iter().map(|r| r.sample.timestamp).collect();
        assert_eq!(times, vec![t(5), t(4), t(3), t(2)]);
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let repo = MemoryRepository::new(3);
        for i in 0..5 {
            repo.save(sample("v1", t(i), i as f64, 0.0)).unwrap();
        }
        assert_eq!(repo.len(), 3);
        let oldest = repo.find_recent("v1", 10).unwrap().pop().unwrap();
        assert_eq!(oldest.sample.timestamp, t(2));
    }

    #[test]
    fn test_statistics() {
        let repo = MemoryRepository::new(100);
        assert_eq!(repo.average_speed_since("v1", t(0)).unwrap(), None);
        assert_eq!(repo.distance_since("v1", t(0)).unwrap(), None);

        repo.save(sample("v1", t(0), 10.0, 1.0)).unwrap();
        repo.save(sample("v1", t(60), 20.0, 1.5)).unwrap();
        repo.save(sample("v1", t(120), 30.0, 2.5)).unwrap();

        assert_eq!(repo.average_speed_since("v1", t(0)).unwrap(), Some(20.0));
        assert_eq!(repo.average_speed_since("v1", t(60)).unwrap(), Some(25.0));
        assert_eq!(repo.distance_since("v1", t(0)).unwrap(), Some(1.5));
        assert_eq!(repo.distance_since("v1", t(120)).unwrap(), Some(0.0));
        assert_eq!(repo.distance_since("v1", t(120) + Duration::seconds(1)).unwrap(), None);
    }

    #[test]
    fn test_snapshot_persistence() {
        let path = std::env::temp_dir().join(format!("driver-care-{}.json", uuid::Uuid::new_v4()));

        let repo = MemoryRepository::with_snapshot(100, &path).unwrap();
        assert!(repo.is_empty());
        let saved = repo.save(sample("v1", t(0), 42.0, 7.0)).unwrap();
        repo.flush().unwrap();

        let loaded = MemoryRepository::with_snapshot(100, &path).unwrap();
        let rows = loaded.find_recent("v1", 10).unwrap();
        assert_eq!(rows, vec![saved.clone()]);

        let next = loaded.save(sample("v1", t(1), 0.0, 7.0)).unwrap();
        assert!(next.id > saved.id);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_corrupt_snapshot_is_an_error() {
        let path = std::env::temp_dir().join(format!("driver-care-{}.json", uuid::Uuid::new_v4()));
        fs::write(&path, "{ not json").unwrap();

        let err = MemoryRepository::with_snapshot(100, &path).err().unwrap();
        assert!(matches!(err, StorageError::Serde(_)));

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_flush_without_snapshot_is_noop() {
        let repo = MemoryRepository::new(10);
        repo.save(sample("v1", t(0), 0.0, 0.0)).unwrap();
        assert!(repo.flush().is_ok());
    }
}
