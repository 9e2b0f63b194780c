//! Room and heatlamp temperatures (°C).

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct ThermalConfig {
    /// Nominal room temperature, also every unit's starting temperature.
    #[serde(default = "default_room_temperature")]
    #[validate(custom(function = validation::validate_finite))]
    pub room_temperature: f64,

    /// Ambient next to the door while it is open.
    #[serde(default = "default_outside_near")]
    #[validate(custom(function = validation::validate_finite))]
    pub outside_near: f64,

    /// Ambient approached at the far end of the row while the door is open.
    #[serde(default = "default_outside_far")]
    #[validate(custom(function = validation::validate_finite))]
    pub outside_far: f64,

    #[serde(default = "default_heatlamp_temperature")]
    #[validate(custom(function = validation::validate_finite))]
    pub heatlamp_temperature: f64,
}

fn default_room_temperature() -> f64 {
    25.0
}

fn default_outside_near() -> f64 {
    0.0
}

fn default_outside_far() -> f64 {
    15.0
}

fn default_heatlamp_temperature() -> f64 {
    40.0
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            room_temperature: default_room_temperature(),
            outside_near: default_outside_near(),
            outside_far: default_outside_far(),
            heatlamp_temperature: default_heatlamp_temperature(),
        }
    }
}
