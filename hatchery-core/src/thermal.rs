//! ## hatchery-core::thermal
//! **Exponential approach-to-setpoint for one scalar temperature**
//!
//! Every `step()` closes a fixed fraction of the remaining gap, chosen so the
//! gap halves after `halflife_steps` steps:
//! `fraction = 1 - exp(-ln 2 / halflife_steps)`.

use crate::error::SimulationError;

#[derive(Debug, Clone, PartialEq)]
pub struct ThermalResponseModel {
    temperature: f64,
    setpoint: f64,
    response_fraction: f64,
}

impl ThermalResponseModel {
    /// Creates a model resting at `initial_temperature`.
    ///
    /// Fails with `InvalidParameter` unless `halflife_steps` is finite and > 0.
    pub fn new(initial_temperature: f64, halflife_steps: f64) -> Result<Self, SimulationError> {
        if !(halflife_steps.is_finite() && halflife_steps > 0.0) {
            return Err(SimulationError::InvalidParameter(format!(
                "half-life must be > 0 steps, got {halflife_steps}"
            )));
        }

        Ok(Self {
            temperature: initial_temperature,
            setpoint: initial_temperature,
            response_fraction: 1.0 - (-std::f64::consts::LN_2 / halflife_steps).exp(),
        })
    }

    #[inline]
    pub fn step(&mut self) {
        self.temperature += self.response_fraction * (self.setpoint - self.temperature);
    }

    #[inline]
    pub fn set_setpoint(&mut self, setpoint: f64) {
        self.setpoint = setpoint;
    }

    #[inline]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[inline]
    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn response_fraction(&self) -> f64 {
        self.response_fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_non_positive_halflife() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                ThermalResponseModel::new(25.0, bad),
                Err(SimulationError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn starts_at_rest() {
        let mut model = ThermalResponseModel::new(25.0, 10.0).unwrap();
        assert_eq!(model.setpoint(), 25.0);
        model.step();
        assert_eq!(model.temperature(), 25.0);
    }

    #[test]
    fn response_fraction_is_open_unit_interval() {
        let model = ThermalResponseModel::new(0.0, 900.0).unwrap();
        assert!(model.response_fraction() > 0.0 && model.response_fraction() < 1.0);
    }

    #[test]
    fn approaches_without_overshoot() {
        let mut model = ThermalResponseModel::new(25.0, 5.0).unwrap();
        model.set_setpoint(40.0);
        let mut previous = model.temperature();
        for _ in 0..200 {
            model.step();
            assert!(model.temperature() >= previous);
            assert!(model.temperature() <= 40.0);
            previous = model.temperature();
        }
    }

    proptest! {
        #[test]
        fn gap_halves_after_halflife_steps(
            halflife in 1u32..2000,
            initial in -50.0f64..50.0,
            target in -50.0f64..50.0,
        ) {
            let mut model = ThermalResponseModel::new(initial, halflife as f64).unwrap();
            model.set_setpoint(target);
            let initial_gap = (target - initial).abs();
            for _ in 0..halflife {
                model.step();
            }
            let gap = (target - model.temperature()).abs();
            prop_assert!((gap - initial_gap / 2.0).abs() <= 1e-9 * initial_gap.max(1.0));
        }
    }
}
