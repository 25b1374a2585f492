//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → handed to lifecycle::startup, which wires each section into its subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, BroadcastConfig, CorsConfig, ObservabilityConfig, ServerConfig, SimulationConfig,
    StorageConfig,
};
pub use validation::{validate_config, ValidationError};
