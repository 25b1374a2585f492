//! Vehicle simulator.
//!
//! # Responsibilities
//! - Hold the current [`VehicleStatus`] for lock-free readers
//! - Advance the vehicle one step per tick along the built-in route
//! - Apply driver controls (media, climate)
//! - Persist one telemetry record per tick
//!
//! # Design Decisions
//! - Readers go through `ArcSwap`; every writer (tick or control) takes the
//!   same mutex, so a control issued mid-tick is never overwritten
//! - `tick` takes the wall-clock instant as a parameter; position along a
//!   segment is derived from it, which keeps the model deterministic in tests
//! - A storage failure is logged and the tick still publishes its status

use std::f64::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::{DateTime, Timelike, Utc};

use crate::scheduler::{async_trait, Task};
use crate::storage::{NewVehicleRecord, StorageError, VehicleRecord, VehicleRecordRepository};
use crate::vehicle::model::{
    Gear, Location, MediaInfo, MediaSource, NavigationInfo, VehicleData, VehicleStatus,
};
use crate::vehicle::route::{self, distance_m, interpolate, DESTINATION, DESTINATION_NAME};

/// Time to cross one route segment.
const SEGMENT_CYCLE_MS: i64 = 10_000;
const ASSUMED_NAV_SPEED_KMH: f64 = 30.0;

const TRACK: &str = "Shape of You";
const ARTIST: &str = "Ed Sheeran";
const ALBUM: &str = "÷ (Divide)";
const TRACK_SECS: u32 = 233;

pub const WARN_LOW_FUEL: &str = "Low fuel";
pub const WARN_OVERHEAT: &str = "Engine overheating";
pub const WARN_LOW_BATTERY: &str = "Low battery voltage";

#[derive(Debug, Default)]
struct Trip {
    route_index: usize,
    started_at: Option<DateTime<Utc>>,
    distance_km: f64,
}

pub struct VehicleSimulator {
    tick: Duration,
    route: Vec<Location>,
    status: ArcSwap<VehicleStatus>,
    trip: Mutex<Trip>,
    running: AtomicBool,
    repository: Arc<dyn VehicleRecordRepository>,
}

impl VehicleSimulator {
    pub fn new(
        vehicle_id: impl Into<String>,
        tick: Duration,
        repository: Arc<dyn VehicleRecordRepository>,
    ) -> Self {
        Self {
            tick: tick.max(Duration::from_millis(1)),
            route: route::city_hall_to_gangnam(),
            status: ArcSwap::from_pointee(VehicleStatus::initial(vehicle_id, Utc::now())),
            trip: Mutex::new(Trip::default()),
            running: AtomicBool::new(false),
            repository,
        }
    }

    /// Period between simulation steps.
    pub fn tick_period(&self) -> Duration {
        self.tick
    }

    pub fn vehicle_id(&self) -> String {
        self.status.load().vehicle_data.id.clone()
    }

    /// Start driving and begin a new trip at `now`. Returns `false` if already running.
    pub fn start(&self, now: DateTime<Utc>) -> bool {
        let mut trip = self.lock();
        if self.running.swap(true, Ordering::SeqCst) {
            return false;
        }
        trip.started_at = Some(now);
        trip.distance_km = 0.0;
        tracing::info!(vehicle_id = %self.vehicle_id(), "Simulation started");
        true
    }

    /// Stop driving. Returns `false` if already stopped.
    pub fn stop(&self) -> bool {
        let _trip = self.lock();
        let was_running = self.running.swap(false, Ordering::SeqCst);
        if was_running {
            tracing::info!(vehicle_id = %self.vehicle_id(), "Simulation stopped");
        }
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn current_status(&self) -> Arc<VehicleStatus> {
        self.status.load_full()
    }

    fn lock(&self) -> MutexGuard<'_, Trip> {
        self.trip.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Advance the simulation by one step at `now`.
    pub fn tick(&self, now: DateTime<Utc>) -> Arc<VehicleStatus> {
        let mut trip = self.lock();
        let prev = self.status.load_full();
        let prev_data = &prev.vehicle_data;
        let tick_secs = self.tick.as_secs_f64();

        let location = self.advance(&mut trip, now);

        let speed = distance_m(&prev_data.location, &location) / tick_secs * 3.6;
        let moving = speed > 0.0;
        let is_engine_running = moving || prev_data.is_engine_running;

        let fuel_consumption = if moving { 8.5 + speed * 0.1 } else { 0.5 };
        let fuel_level = (prev_data.fuel_level - fuel_consumption * tick_secs / 3600.0).max(0.0);

        let distance_increment = if moving { speed * tick_secs / 3600.0 } else { 0.0 };
        trip.distance_km += distance_increment;

        let trip_hours = trip
            .started_at
            .map(|start| (now - start).num_milliseconds() as f64 / 3_600_000.0)
            .unwrap_or(0.0);
        let average_speed = if trip_hours > 0.0 {
            trip.distance_km / trip_hours
        } else {
            0.0
        };

        let engine_temperature = if is_engine_running {
            (90.0 + speed * 0.2).min(110.0)
        } else {
            (prev_data.engine_temperature - 0.5).max(20.0)
        };

        let second = f64::from(now.second());
        let battery_voltage = if is_engine_running {
            14.2 + (second * PI / 30.0).sin() * 0.1
        } else {
            12.6 - second * 0.001
        };

        let vehicle_data = VehicleData {
            id: prev_data.id.clone(),
            speed,
            rpm: rpm_for_speed(speed),
            fuel_level,
            engine_temperature,
            battery_voltage,
            location,
            timestamp: now,
            is_engine_running,
            gear_position: if moving { Gear::Drive } else { Gear::Park },
            odometer: prev_data.odometer + distance_increment,
            trip_distance: trip.distance_km,
            average_speed,
            fuel_consumption,
        };

        let status = Arc::new(VehicleStatus {
            warnings: warnings_for(&vehicle_data),
            media_info: next_media(&prev.media_info),
            climate_control: prev.climate_control.clone(),
            navigation_info: self.navigation(&location),
            vehicle_data,
            timestamp: now,
        });

        if let Err(e) = self
            .repository
            .save(NewVehicleRecord::from(&status.vehicle_data))
        {
            tracing::warn!(error = %e, "Failed to save vehicle data");
        }

        self.status.store(status.clone());
        status
    }

    fn advance(&self, trip: &mut Trip, now: DateTime<Utc>) -> Location {
        if trip.route_index >= self.route.len() - 1 {
            trip.route_index = 0;
        }
        let from = &self.route[trip.route_index];
        let to = &self.route[trip.route_index + 1];

        let progress = now.timestamp_millis().rem_euclid(SEGMENT_CYCLE_MS) as f64 / SEGMENT_CYCLE_MS as f64;
        let location = interpolate(from, to, progress);

        if progress >= 0.99 {
            trip.route_index += 1;
        }
        location
    }

    fn navigation(&self, location: &Location) -> NavigationInfo {
        let remaining_km = distance_m(location, &DESTINATION) / 1000.0;
        NavigationInfo {
            is_active: true,
            destination: DESTINATION_NAME.to_string(),
            estimated_time: (remaining_km / ASSUMED_NAV_SPEED_KMH * 60.0) as u32,
            remaining_distance: remaining_km,
            current_route: self.route.clone(),
            next_turn: "Turn right".to_string(),
            next_turn_distance: 0.5,
        }
    }

    fn update(&self, apply: impl FnOnce(&mut VehicleStatus)) -> Arc<VehicleStatus> {
        let _trip = self.lock();
        let mut next = VehicleStatus::clone(&self.status.load());
        apply(&mut next);
        let next = Arc::new(next);
        self.status.store(next.clone());
        next
    }

    pub fn toggle_play_pause(&self) -> Arc<VehicleStatus> {
        self.update(|s| s.media_info.is_playing = !s.media_info.is_playing)
    }

    /// Set media volume, clamped to 0..=100.
    pub fn set_volume(&self, volume: i32) -> Arc<VehicleStatus> {
        let volume = volume.clamp(0, 100) as u8;
        self.update(|s| s.media_info.volume = volume)
    }

    /// Set cabin temperature, clamped to 16..=30 °C.
    pub fn set_climate_temperature(&self, temperature: f64) -> Arc<VehicleStatus> {
        let temperature = temperature.clamp(16.0, 30.0);
        self.update(|s| s.climate_control.temperature = temperature)
    }

    /// Set fan speed, clamped to 1..=5.
    pub fn set_climate_fan_speed(&self, fan_speed: i32) -> Arc<VehicleStatus> {
        let fan_speed = fan_speed.clamp(1, 5) as u8;
        self.update(|s| s.climate_control.fan_speed = fan_speed)
    }

    pub fn toggle_climate_mode(&self) -> Arc<VehicleStatus> {
        self.update(|s| s.climate_control.mode = s.climate_control.mode.next())
    }

    pub fn recent_records(&self, vehicle_id: &str, limit: usize) -> Result<Vec<VehicleRecord>, StorageError> {
        self.repository.find_recent(vehicle_id, limit)
    }

    pub fn records_between(
        &self,
        vehicle_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<VehicleRecord>, StorageError> {
        self.repository.find_between(vehicle_id, start, end)
    }

    pub fn average_speed_since(&self, vehicle_id: &str, start: DateTime<Utc>) -> Result<Option<f64>, StorageError> {
        self.repository.average_speed_since(vehicle_id, start)
    }

    pub fn distance_since(&self, vehicle_id: &str, start: DateTime<Utc>) -> Result<Option<f64>, StorageError> {
        self.repository.distance_since(vehicle_id, start)
    }
}

pub(crate) fn rpm_for_speed(speed: f64) -> u32 {
    match speed {
        s if s <= 0.0 => 800,
        s if s < 20.0 => 1500,
        s if s < 40.0 => 2000,
        s if s < 60.0 => 2500,
        s if s < 80.0 => 3000,
        _ => 3500,
    }
}

fn warnings_for(data: &VehicleData) -> Vec<String> {
    let mut warnings = Vec::new();
    if data.fuel_level < 10.0 {
        warnings.push(WARN_LOW_FUEL.to_string());
    }
    if data.engine_temperature > 105.0 {
        warnings.push(WARN_OVERHEAT.to_string());
    }
    if data.battery_voltage < 12.0 {
        warnings.push(WARN_LOW_BATTERY.to_string());
    }
    warnings
}

fn next_media(current: &MediaInfo) -> MediaInfo {
    let current_time = if current.is_playing && current.duration > 0 {
        (current.current_time + 1) % current.duration
    } else {
        current.current_time
    };

    MediaInfo {
        is_playing: current.is_playing,
        current_track: TRACK.to_string(),
        artist: ARTIST.to_string(),
        album: ALBUM.to_string(),
        duration: TRACK_SECS,
        current_time,
        volume: current.volume,
        source: MediaSource::Bluetooth,
    }
}

/// Steps the simulator while it is running.
pub struct SimulationTask {
    simulator: Arc<VehicleSimulator>,
}

impl SimulationTask {
    pub fn new(simulator: Arc<VehicleSimulator>) -> Self {
        Self { simulator }
    }
}

#[async_trait]
impl Task for SimulationTask {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn period(&self) -> Duration {
        self.simulator.tick_period()
    }

    async fn run(&self) -> anyhow::Result<()> {
        if self.simulator.is_running() {
            let status = self.simulator.tick(Utc::now());
            tracing::trace!(
                speed = status.vehicle_data.speed,
                fuel = status.vehicle_data.fuel_level,
                "Simulation step"
            );
        }
        Ok(())
    }
}
