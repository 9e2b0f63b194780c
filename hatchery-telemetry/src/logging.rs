//! ## hatchery-telemetry::logging
//! **Structured logging through `tracing`**
//!
//! `RUST_LOG` wins over the configured default level.

use tracing::info_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Returns `false` if one was already set.
    pub fn init(default_level: &str) -> bool {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .try_init()
            .is_ok()
    }

    /// Emits a lifecycle event with its key/value context rendered inline.
    pub fn log_event(event_type: &str, metadata: &[(&str, String)]) {
        let span = info_span!("simulation_event", event_type = event_type);
        let _entered = span.enter();
        let rendered: Vec<String> = metadata.iter().map(|(k, v)| format!("{k}={v}")).collect();
        tracing::info!(metadata = %rendered.join(" "), "Simulation event occurred");
    }
}
