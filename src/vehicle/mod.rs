//! Simulated vehicle.
//!
//! # Data Flow
//! ```text
//! SimulationTask (scheduler) → simulator.tick(now)
//!     → route.rs (position along the route, distance, heading)
//!     → derive speed, fuel, engine, battery, media, navigation, warnings
//!     → storage (one record per tick)
//!     → ArcSwap<VehicleStatus> (read by HTTP handlers and the broadcast task)
//!
//! HTTP controls → simulator.set_* / toggle_* → ArcSwap<VehicleStatus>
//! ```

pub mod model;
pub mod route;
pub mod simulator;

pub use model::{ClimateControl, ClimateMode, Gear, Location, MediaInfo, NavigationInfo, VehicleData, VehicleStatus};
pub use simulator::{SimulationTask, VehicleSimulator};
