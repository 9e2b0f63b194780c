//! Scenario scripts.
//!
//! A scenario is a list of commands, each delayed relative to the simulation
//! start. Scenarios are pre-loaded into the command queue before the loop
//! starts; the loop then dispatches each one on the first tick past its
//! scheduled time.
//!
//! ```yaml
//! name: door-drill
//! events:
//!   - delay_ms: 300000
//!     command: door_open
//!   - delay_ms: 360000
//!     command: bust_heatlamp
//!     unit: 5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hatchery_core::command::{CommandKind, ControlRecord};
use hatchery_core::queue::CommandQueue;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Scenario format error: {0}")]
    Format(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioEvent {
    pub delay_ms: u64,
    pub command: CommandKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<i32>,
}

impl ScenarioEvent {
    pub fn room(delay_secs: u64, command: CommandKind) -> Self {
        Self {
            delay_ms: delay_secs * 1000,
            command,
            unit: None,
        }
    }

    pub fn unit(delay_secs: u64, command: CommandKind, unit: i32) -> Self {
        Self {
            delay_ms: delay_secs * 1000,
            command,
            unit: Some(unit),
        }
    }

    pub fn to_record(&self, start_ms: i64) -> ControlRecord {
        ControlRecord::new(
            start_ms.saturating_add_unsigned(self.delay_ms),
            self.command,
            self.unit,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub events: Vec<ScenarioEvent>,
}

impl Scenario {
    /// The stock fifteen-minute demo: three door openings, with unit 5's lamp
    /// breaking after the first and being fixed after the second.
    pub fn demo() -> Self {
        use CommandKind::*;
        Self {
            name: Some("demo".into()),
            events: vec![
                ScenarioEvent::room(300, DoorOpen),
                ScenarioEvent::room(330, DoorClosed),
                ScenarioEvent::unit(360, BustHeatlamp, 5),
                ScenarioEvent::room(600, DoorOpen),
                ScenarioEvent::room(630, DoorClosed),
                ScenarioEvent::unit(660, FixHeatlamp, 5),
                ScenarioEvent::room(900, DoorOpen),
                ScenarioEvent::room(930, DoorClosed),
            ],
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        Ok(())
    }

    /// Queues every event relative to `start_ms`; returns how many were queued.
    pub fn preload(&self, queue: &CommandQueue, start_ms: i64) -> usize {
        for event in &self.events {
            queue.enqueue(event.to_record(start_ms));
        }
        self.events.len()
    }

    /// Delay of the last event.
    pub fn horizon_ms(&self) -> u64 {
        self.events.iter().map(|e| e.delay_ms).max().unwrap_or(0)
    }
}
