use serde::{Deserialize, Serialize};

use crate::incubator::IncubatorUnit;

/// One unit's state at a point in simulated time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub simulated_time_ms: i64,
    pub unit_id: u32,
    pub temperature: f64,
    pub lamp_state: u8,
}

/// A complete reading set for every unit, ordered by unit id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub simulated_time_ms: i64,
    pub readings: Vec<Reading>,
}

impl Snapshot {
    pub fn capture(simulated_time_ms: i64, units: &[IncubatorUnit]) -> Self {
        let readings = units
            .iter()
            .zip(0u32..)
            .map(|(unit, unit_id)| Reading {
                simulated_time_ms,
                unit_id,
                temperature: unit.current_temperature(),
                lamp_state: unit.lamp_state(),
            })
            .collect();

        Self {
            simulated_time_ms,
            readings,
        }
    }
}
