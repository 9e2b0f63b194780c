use thiserror::Error;
use tokio::task::JoinError;

use hatchery_config::ConfigError;
use hatchery_core::SimulationError;
use hatchery_simulator::ScenarioError;

use crate::runtime::RuntimeState;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("Cannot {action} a simulation that is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: RuntimeState,
    },

    #[error("Simulation loop panicked")]
    LoopPanicked,

    #[error("State hash mismatch: expected {expected}, got {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<JoinError> for RuntimeError {
    fn from(err: JoinError) -> Self {
        RuntimeError::Processing(err.to_string())
    }
}
