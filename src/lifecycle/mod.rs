//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Metrics → Storage → Simulator → Scheduler → Bind
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Stop tasks → Stop simulator → Flush
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then listener
//! - One `Shutdown` handle fans out to the server, task loops and WebSocket sessions

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::{run, Application, Cli, StartupError};
