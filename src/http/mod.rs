//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → middleware.rs (request metrics, CORS)
//!     → api.rs (/api/vehicle/* REST handlers) | websocket.rs (/ws/vehicle-status)
//!     → VehicleSimulator / storage
//!     → error.rs (map failures to status codes)
//! ```

pub mod api;
pub mod error;
pub mod middleware;
pub mod server;
pub mod websocket;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
pub use websocket::{BroadcastStatusTask, StatusHub};
