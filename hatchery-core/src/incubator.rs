//! ## hatchery-core::incubator
//! **Heatlamp state machine over a thermal model**
//!
//! The lamp can be on, off or broken, and the unit sits at some ambient
//! temperature. The model setpoint is the lamp temperature while the lamp is
//! on and working, and the ambient temperature otherwise. Every transition
//! re-derives the setpoint immediately, except `fix_heatlamp`, which only
//! clears the broken flag.

use crate::error::SimulationError;
use crate::thermal::ThermalResponseModel;

/// Lamp temperature in °C unless overridden.
pub const HEATLAMP_TEMPERATURE: f64 = 40.0;

#[derive(Debug, Clone, PartialEq)]
pub struct IncubatorUnit {
    model: ThermalResponseModel,
    heatlamp_on: bool,
    heatlamp_broken: bool,
    ambient_temperature: f64,
    heatlamp_temperature: f64,
}

impl IncubatorUnit {
    /// Creates a unit with its lamp off and working.
    ///
    /// The setpoint starts at `initial_temperature`; the first transition
    /// that touches the setpoint brings it in line with the lamp/ambient rule.
    pub fn new(
        initial_temperature: f64,
        halflife_steps: f64,
        ambient_temperature: f64,
    ) -> Result<Self, SimulationError> {
        Ok(Self {
            model: ThermalResponseModel::new(initial_temperature, halflife_steps)?,
            heatlamp_on: false,
            heatlamp_broken: false,
            ambient_temperature,
            heatlamp_temperature: HEATLAMP_TEMPERATURE,
        })
    }

    pub fn with_heatlamp_temperature(mut self, heatlamp_temperature: f64) -> Self {
        self.heatlamp_temperature = heatlamp_temperature;
        self
    }

    pub fn turn_on_heatlamp(&mut self) {
        self.heatlamp_on = true;
        if self.heatlamp_broken {
            self.model.set_setpoint(self.ambient_temperature);
        } else {
            self.model.set_setpoint(self.heatlamp_temperature);
        }
    }

    pub fn turn_off_heatlamp(&mut self) {
        self.heatlamp_on = false;
        self.model.set_setpoint(self.ambient_temperature);
    }

    pub fn break_heatlamp(&mut self) {
        self.heatlamp_broken = true;
        self.model.set_setpoint(self.ambient_temperature);
    }

    /// Clears the broken flag only. A lamp still marked on keeps tracking
    /// ambient until it is switched on again.
    pub fn fix_heatlamp(&mut self) {
        self.heatlamp_broken = false;
    }

    pub fn set_ambient_temperature(&mut self, temperature: f64) {
        self.ambient_temperature = temperature;
        if !self.heatlamp_on || self.heatlamp_broken {
            self.model.set_setpoint(temperature);
        }
    }

    #[inline]
    pub fn step(&mut self) {
        self.model.step();
    }

    pub fn current_temperature(&self) -> f64 {
        self.model.temperature()
    }

    pub fn setpoint(&self) -> f64 {
        self.model.setpoint()
    }

    pub fn ambient_temperature(&self) -> f64 {
        self.ambient_temperature
    }

    /// Logical lamp switch position, regardless of whether it is broken.
    pub fn lamp_is_on(&self) -> bool {
        self.heatlamp_on
    }

    pub fn lamp_is_broken(&self) -> bool {
        self.heatlamp_broken
    }

    /// Lamp switch position as carried in readings (1 = on).
    pub fn lamp_state(&self) -> u8 {
        u8::from(self.heatlamp_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> IncubatorUnit {
        IncubatorUnit::new(25.0, 900.0, 25.0).unwrap()
    }

    #[test]
    fn rejects_invalid_halflife() {
        assert!(IncubatorUnit::new(25.0, 0.0, 25.0).is_err());
    }

    #[test]
    fn lamp_on_targets_lamp_temperature() {
        let mut unit = unit();
        unit.turn_on_heatlamp();
        assert_eq!(unit.setpoint(), HEATLAMP_TEMPERATURE);
        assert_eq!(unit.lamp_state(), 1);

        unit.turn_off_heatlamp();
        assert_eq!(unit.setpoint(), 25.0);
        assert_eq!(unit.lamp_state(), 0);
    }

    #[test]
    fn custom_lamp_temperature() {
        let mut unit = unit().with_heatlamp_temperature(37.5);
        unit.turn_on_heatlamp();
        assert_eq!(unit.setpoint(), 37.5);
    }

    #[test]
    fn break_always_falls_back_to_ambient() {
        for lamp_on in [false, true] {
            let mut unit = unit();
            unit.set_ambient_temperature(12.0);
            if lamp_on {
                unit.turn_on_heatlamp();
            }
            unit.break_heatlamp();
            assert_eq!(unit.setpoint(), unit.ambient_temperature());
            assert_eq!(unit.lamp_is_on(), lamp_on);
        }
    }

    #[test]
    fn turning_on_a_broken_lamp_keeps_ambient() {
        let mut unit = unit();
        unit.break_heatlamp();
        unit.turn_on_heatlamp();
        assert_eq!(unit.setpoint(), 25.0);
        assert!(unit.lamp_is_on());
    }

    #[test]
    fn fix_alone_leaves_setpoint() {
        let mut unit = unit();
        unit.turn_on_heatlamp();
        unit.break_heatlamp();
        let before = unit.setpoint();
        unit.fix_heatlamp();
        assert_eq!(unit.setpoint(), before);
        assert!(!unit.lamp_is_broken());

        unit.turn_on_heatlamp();
        assert_eq!(unit.setpoint(), HEATLAMP_TEMPERATURE);
    }

    #[test]
    fn ambient_change_ignored_while_heating() {
        let mut unit = unit();
        unit.turn_on_heatlamp();
        unit.set_ambient_temperature(5.0);
        assert_eq!(unit.setpoint(), HEATLAMP_TEMPERATURE);
        assert_eq!(unit.ambient_temperature(), 5.0);

        unit.turn_off_heatlamp();
        assert_eq!(unit.setpoint(), 5.0);
    }

    #[test]
    fn ambient_change_applies_when_off_or_broken() {
        let mut unit = unit();
        unit.set_ambient_temperature(10.0);
        assert_eq!(unit.setpoint(), 10.0);

        unit.turn_on_heatlamp();
        unit.break_heatlamp();
        unit.set_ambient_temperature(3.0);
        assert_eq!(unit.setpoint(), 3.0);
    }

    #[test]
    fn step_moves_towards_setpoint() {
        let mut unit = unit();
        unit.turn_on_heatlamp();
        unit.step();
        assert!(unit.current_temperature() > 25.0);
        assert!(unit.current_temperature() < HEATLAMP_TEMPERATURE);
    }
}
