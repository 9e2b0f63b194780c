//! Simulation loop configuration.
//!
//! Controls bank size, simulated step length, wall-clock pacing and how
//! often readings are emitted.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Number of incubators in the bank.
    #[serde(default = "default_unit_count")]
    #[validate(range(min = 1, max = 10_000))]
    pub unit_count: usize,

    /// Simulated milliseconds per tick.
    #[serde(default = "default_step_ms")]
    #[validate(range(min = 1, max = 3_600_000))]
    pub step_ms: u64,

    /// Real milliseconds between ticks in paced mode.
    #[serde(default = "default_tick_period_ms")]
    #[validate(range(min = 1, max = 60_000))]
    pub tick_period_ms: u64,

    /// Simulated milliseconds between reading snapshots, at most one day.
    #[serde(default = "default_reading_interval_ms")]
    #[validate(range(min = 1, max = 86_400_000))]
    pub reading_interval_ms: u64,

    /// Temperature half-life in simulated seconds.
    #[serde(default = "default_halflife_secs")]
    #[validate(custom(function = validation::validate_positive))]
    pub halflife_secs: f64,

    /// Simulated start time (Unix ms). Paced runs fall back to the wall clock.
    #[serde(default)]
    #[validate(range(min = 0i64, max = 253_402_300_799_999i64))]
    pub start_time_ms: Option<i64>,
}

fn default_unit_count() -> usize {
    10
}

fn default_step_ms() -> u64 {
    100
}

fn default_tick_period_ms() -> u64 {
    10
}

fn default_reading_interval_ms() -> u64 {
    10_000
}

fn default_halflife_secs() -> f64 {
    90.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            unit_count: default_unit_count(),
            step_ms: default_step_ms(),
            tick_period_ms: default_tick_period_ms(),
            reading_interval_ms: default_reading_interval_ms(),
            halflife_secs: default_halflife_secs(),
            start_time_ms: None,
        }
    }
}

impl SimulationConfig {
    /// Half-life expressed in ticks.
    pub fn halflife_steps(&self) -> f64 {
        self.halflife_secs * 1000.0 / self.step_ms as f64
    }

    /// Ratio of simulated to real time in paced mode.
    pub fn acceleration(&self) -> f64 {
        self.step_ms as f64 / self.tick_period_ms as f64
    }
}
