//! Observability configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct TelemetryConfig {
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    #[validate(custom(function = validation::validate_log_level))]
    pub log_level: String,

    /// Snapshots buffered between the loop and a channel publisher.
    #[serde(default = "default_publish_buffer")]
    #[validate(range(min = 1, max = 65_536))]
    pub publish_buffer: usize,
}

fn default_log_level() -> String {
    "info".into()
}

fn default_publish_buffer() -> usize {
    64
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            publish_buffer: default_publish_buffer(),
        }
    }
}
