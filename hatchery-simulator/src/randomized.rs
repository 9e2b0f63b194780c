use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hatchery_core::command::CommandKind;

use crate::scenario::{Scenario, ScenarioEvent};

/// Share of generated unit commands aimed at a unit that does not exist.
const STRAY_UNIT_PROBABILITY: f64 = 0.1;

/// Reproducible random command scripts for fuzzing the dispatch path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomizedScenario {
    pub seed: u64,
    pub command_count: usize,
    pub unit_count: usize,
    pub horizon_ms: u64,
}

impl RandomizedScenario {
    pub fn new(seed: u64, command_count: usize, unit_count: usize, horizon_ms: u64) -> Self {
        Self {
            seed,
            command_count,
            unit_count,
            horizon_ms,
        }
    }

    pub fn generate(&self) -> Scenario {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let unit_count = i32::try_from(self.unit_count).unwrap_or(i32::MAX);

        let events = (0..self.command_count)
            .map(|_| {
                let command = CommandKind::ALL[rng.random_range(0..CommandKind::ALL.len())];
                let unit = if command.is_room_wide() {
                    None
                } else if unit_count == 0 || rng.random_bool(STRAY_UNIT_PROBABILITY) {
                    Some(if rng.random_bool(0.5) {
                        -1
                    } else {
                        unit_count.saturating_add(rng.random_range(0..10))
                    })
                } else {
                    Some(rng.random_range(0..unit_count))
                };
                ScenarioEvent {
                    delay_ms: rng.random_range(0..=self.horizon_ms),
                    command,
                    unit,
                }
            })
            .collect();

        Scenario {
            name: Some(format!("fuzz-{}", self.seed)),
            events,
        }
    }
}
