//! Vehicle status data model.
//!
//! Everything here serializes with camelCase field names; these structs are
//! the JSON returned by `/api/vehicle/status` and pushed over the WebSocket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geographic position with heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level.
    pub altitude: f64,
    /// Degrees.
    pub heading: f64,
    /// Metres.
    pub accuracy: f64,
}

impl Location {
    /// A point with default altitude, heading and accuracy.
    pub const fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            heading: 0.0,
            accuracy: 5.0,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        // Seoul City Hall
        Self::at(37.5665, 126.9780)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gear {
    #[serde(rename = "P")]
    Park,
    #[serde(rename = "D")]
    Drive,
}

/// Core driving telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleData {
    pub id: String,
    /// km/h
    pub speed: f64,
    pub rpm: u32,
    /// Percent.
    pub fuel_level: f64,
    /// °C
    pub engine_temperature: f64,
    /// Volts.
    pub battery_voltage: f64,
    pub location: Location,
    pub timestamp: DateTime<Utc>,
    pub is_engine_running: bool,
    pub gear_position: Gear,
    /// km
    pub odometer: f64,
    /// km
    pub trip_distance: f64,
    /// km/h
    pub average_speed: f64,
    /// L/100km
    pub fuel_consumption: f64,
}

impl VehicleData {
    pub fn parked(id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            speed: 0.0,
            rpm: 0,
            fuel_level: 100.0,
            engine_temperature: 90.0,
            battery_voltage: 12.6,
            location: Location::default(),
            timestamp,
            is_engine_running: false,
            gear_position: Gear::Park,
            odometer: 0.0,
            trip_distance: 0.0,
            average_speed: 0.0,
            fuel_consumption: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaSource {
    Bluetooth,
    Usb,
    Radio,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub is_playing: bool,
    pub current_track: String,
    pub artist: String,
    pub album: String,
    /// Seconds.
    pub duration: u32,
    /// Seconds.
    pub current_time: u32,
    /// 0..=100
    pub volume: u8,
    pub source: MediaSource,
}

impl Default for MediaInfo {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_track: String::new(),
            artist: String::new(),
            album: String::new(),
            duration: 0,
            current_time: 0,
            volume: 50,
            source: MediaSource::Bluetooth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClimateMode {
    #[default]
    Auto,
    Manual,
    Defrost,
}

impl ClimateMode {
    /// Auto → Manual → Defrost → Auto.
    pub fn next(self) -> Self {
        match self {
            ClimateMode::Auto => ClimateMode::Manual,
            ClimateMode::Manual => ClimateMode::Defrost,
            ClimateMode::Defrost => ClimateMode::Auto,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateControl {
    pub is_enabled: bool,
    /// °C, 16..=30
    pub temperature: f64,
    /// 1..=5
    pub fan_speed: u8,
    pub mode: ClimateMode,
    pub is_ac_on: bool,
    pub is_heat_on: bool,
    pub is_defrost_on: bool,
}

impl Default for ClimateControl {
    fn default() -> Self {
        Self {
            is_enabled: false,
            temperature: 22.0,
            fan_speed: 2,
            mode: ClimateMode::Auto,
            is_ac_on: false,
            is_heat_on: false,
            is_defrost_on: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationInfo {
    pub is_active: bool,
    pub destination: String,
    /// Minutes.
    pub estimated_time: u32,
    /// km
    pub remaining_distance: f64,
    pub current_route: Vec<Location>,
    pub next_turn: String,
    /// km
    pub next_turn_distance: f64,
}

/// Full snapshot of the vehicle at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatus {
    pub vehicle_data: VehicleData,
    pub media_info: MediaInfo,
    pub climate_control: ClimateControl,
    pub navigation_info: NavigationInfo,
    pub warnings: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl VehicleStatus {
    /// Initial status of a parked vehicle.
    pub fn initial(vehicle_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            vehicle_data: VehicleData::parked(vehicle_id, now),
            media_info: MediaInfo::default(),
            climate_control: ClimateControl::default(),
            navigation_info: NavigationInfo::default(),
            warnings: Vec::new(),
            timestamp: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_json_uses_camel_case() {
        let status = VehicleStatus::initial("vehicle_001", Utc::now());
        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["vehicleData"]["id"], "vehicle_001");
        assert_eq!(json["vehicleData"]["gearPosition"], "P");
        assert_eq!(json["vehicleData"]["isEngineRunning"], false);
        assert_eq!(json["vehicleData"]["location"]["latitude"], 37.5665);
        assert_eq!(json["mediaInfo"]["source"], "Bluetooth");
        assert_eq!(json["mediaInfo"]["volume"], 50);
        assert_eq!(json["climateControl"]["mode"], "Auto");
        assert_eq!(json["climateControl"]["fanSpeed"], 2);
        assert!(json["navigationInfo"]["currentRoute"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_climate_mode_cycles() {
        let mode = ClimateMode::Auto;
        assert_eq!(mode.next(), ClimateMode::Manual);
        assert_eq!(mode.next().next(), ClimateMode::Defrost);
        assert_eq!(mode.next().next().next(), ClimateMode::Auto);
    }
}
