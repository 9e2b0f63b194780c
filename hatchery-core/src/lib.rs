//! # hatchery-core
//!
//! Physical and control model for a bank of incubators in a single room.
//!
//! ### Key Submodules:
//! - `thermal`: closed-form exponential approach to a setpoint
//! - `incubator`: heatlamp state machine layered over a thermal model
//! - `room`: door-driven ambient gradient across the bank
//! - `command`: time-stamped control records and their wire codes
//! - `queue`: the one structure shared between ingestion and the loop
//! - `time`: `VirtualClock` backed by an atomic counter
//! - `reading`: per-unit readings and snapshots handed to publishers

pub mod command;
pub mod error;
pub mod incubator;
pub mod queue;
pub mod reading;
pub mod room;
pub mod thermal;
pub mod time;

pub mod prelude {
    pub use crate::command::*;
    pub use crate::error::*;
    pub use crate::incubator::*;
    pub use crate::queue::*;
    pub use crate::reading::*;
    pub use crate::room::*;
    pub use crate::thermal::*;
    pub use crate::time::*;
}

pub use error::SimulationError;
