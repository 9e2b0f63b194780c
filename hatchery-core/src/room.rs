//! Door-driven ambient temperature across the bank.
//!
//! The door sits at one end of the row: with it open, ambient falls linearly
//! from `outside_far` down to `outside_near` as units get closer to it.

use crate::incubator::IncubatorUnit;

pub const ROOM_TEMPERATURE: f64 = 25.0;
pub const OUTSIDE_TEMPERATURE_NEAR: f64 = 0.0;
pub const OUTSIDE_TEMPERATURE_FAR: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomEnvironment {
    pub room_temperature: f64,
    pub outside_near: f64,
    pub outside_far: f64,
}

impl Default for RoomEnvironment {
    fn default() -> Self {
        Self {
            room_temperature: ROOM_TEMPERATURE,
            outside_near: OUTSIDE_TEMPERATURE_NEAR,
            outside_far: OUTSIDE_TEMPERATURE_FAR,
        }
    }
}

impl RoomEnvironment {
    pub fn new(room_temperature: f64, outside_near: f64, outside_far: f64) -> Self {
        Self {
            room_temperature,
            outside_near,
            outside_far,
        }
    }

    /// Ambient for unit `index` of `count` while the door is open.
    pub fn door_open_ambient(&self, index: usize, count: usize) -> f64 {
        self.outside_near + (self.outside_far - self.outside_near) * index as f64 / count as f64
    }

    pub fn apply_door_open(&self, units: &mut [IncubatorUnit]) {
        let count = units.len();
        for (index, unit) in units.iter_mut().enumerate() {
            unit.set_ambient_temperature(self.door_open_ambient(index, count));
        }
    }

    pub fn apply_door_closed(&self, units: &mut [IncubatorUnit]) {
        for unit in units.iter_mut() {
            unit.set_ambient_temperature(self.room_temperature);
        }
    }
}
