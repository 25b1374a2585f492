//! Telemetry record types and the repository seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageError;
use crate::vehicle::model::{Gear, VehicleData};

/// One telemetry sample, before the store assigns it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicleRecord {
    pub vehicle_id: String,
    pub speed: f64,
    pub rpm: u32,
    pub fuel_level: f64,
    pub engine_temperature: f64,
    pub battery_voltage: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub heading: f64,
    pub accuracy: f64,
    pub is_engine_running: bool,
    pub gear_position: Gear,
    pub odometer: f64,
    pub trip_distance: f64,
    pub average_speed: f64,
    pub fuel_consumption: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<&VehicleData> for NewVehicleRecord {
    fn from(data: &VehicleData) -> Self {
        Self {
            vehicle_id: data.id.clone(),
            speed: data.speed,
            rpm: data.rpm,
            fuel_level: data.fuel_level,
            engine_temperature: data.engine_temperature,
            battery_voltage: data.battery_voltage,
            latitude: data.location.latitude,
            longitude: data.location.longitude,
            altitude: data.location.altitude,
            heading: data.location.heading,
            accuracy: data.location.accuracy,
            is_engine_running: data.is_engine_running,
            gear_position: data.gear_position,
            odometer: data.odometer,
            trip_distance: data.trip_distance,
            average_speed: data.average_speed,
            fuel_consumption: data.fuel_consumption,
            timestamp: data.timestamp,
        }
    }
}

/// A stored telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    pub id: u64,
    #[serde(flatten)]
    pub sample: NewVehicleRecord,
    pub created_at: DateTime<Utc>,
}

/// Storage for telemetry samples.
///
/// Query results are ordered newest first (by sample timestamp, then id).
pub trait VehicleRecordRepository: Send + Sync {
    fn save(&self, record: NewVehicleRecord) -> Result<VehicleRecord, StorageError>;

    fn find_recent(&self, vehicle_id: &str, limit: usize) -> Result<Vec<VehicleRecord>, StorageError>;

    /// Samples with `start <= timestamp <= end`.
    fn find_between(
        &self,
        vehicle_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VehicleRecord>, StorageError>;

    /// Mean speed of samples at or after `start`; `None` when there are none.
    fn average_speed_since(&self, vehicle_id: &str, start: DateTime<Utc>) -> Result<Option<f64>, StorageError>;

    /// Odometer span of samples at or after `start`; `None` when there are none.
    fn distance_since(&self, vehicle_id: &str, start: DateTime<Utc>) -> Result<Option<f64>, StorageError>;

    /// Total samples held, across vehicles.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Persist to durable storage, if the implementation has any.
    fn flush(&self) -> Result<(), StorageError>;
}
