//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters, gauges, histograms via `metrics`)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape), when enabled
//! ```

pub mod logging;
pub mod metrics;
