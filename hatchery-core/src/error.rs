use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown unit {unit_id:?} (bank has {unit_count} units)")]
    UnknownUnit {
        unit_id: Option<i32>,
        unit_count: usize,
    },

    #[error("Unknown command code: {0}")]
    UnknownCommand(i32),
}
