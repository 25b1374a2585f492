//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the DriverCare service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Cross-origin resource sharing policy.
    pub cors: CorsConfig,

    /// Vehicle simulation settings.
    pub simulation: SimulationConfig,

    /// WebSocket status broadcast settings.
    pub broadcast: BroadcastConfig,

    /// Telemetry record storage.
    pub storage: StorageConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `"*"` mirrors any request origin.
    pub allowed_origins: Vec<String>,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    /// True when any origin is accepted.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Vehicle simulation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Identifier reported for the simulated vehicle.
    pub vehicle_id: String,

    /// Simulation step period in milliseconds.
    pub tick_ms: u64,

    /// Start driving as soon as the service is up.
    pub autostart: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vehicle_id: "vehicle_001".to_string(),
            tick_ms: 1000,
            autostart: false,
        }
    }
}

/// WebSocket broadcast configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Status push period in milliseconds.
    pub interval_ms: u64,

    /// Frames buffered per subscriber before it starts skipping.
    pub channel_capacity: usize,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            channel_capacity: 64,
        }
    }
}

/// Record storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Maximum records retained per vehicle (oldest evicted first).
    pub max_records: usize,

    /// JSON snapshot file. Empty disables persistence.
    pub snapshot_path: String,

    /// Snapshot flush period in seconds.
    pub flush_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_records: 10_000,
            snapshot_path: String::new(),
            flush_interval_secs: 30,
        }
    }
}

impl StorageConfig {
    /// Snapshot path, if persistence is enabled.
    pub fn snapshot(&self) -> Option<&str> {
        let path = self.snapshot_path.trim();
        (!path.is_empty()).then_some(path)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
