//! # Hatchery Telemetry
//!
//! Logging setup and Prometheus metrics for the simulation loop.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
