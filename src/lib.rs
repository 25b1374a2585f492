//! DriverCare connected-vehicle service.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI args ─▶ config ─▶ lifecycle::Application::build
//!                              │
//!          ┌───────────────────┼──────────────────────┐
//!          ▼                   ▼                      ▼
//!     scheduler ──tick──▶ vehicle::VehicleSimulator ──save──▶ storage
//!          │                   │                      ▲
//!          └──broadcast──▶ http::StatusHub            │
//!                              │                      │
//!      WebSocket clients ◀─────┘     REST /api/vehicle ┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod scheduler;
pub mod storage;
pub mod vehicle;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::{Application, Shutdown, StartupError};
