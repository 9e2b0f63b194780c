/*!
# Hatchery Engine

Runtime layer shared by every frontend: the paced simulation thread with its
Idle/Running/Stopped lifecycle, and the realtime, headless and fuzz run modes
built on top of it.
*/

pub mod error;
pub mod modes;
pub mod runtime;

pub use error::RuntimeError;
pub use modes::{
    generate_bug_report, run_fuzz_mode, run_headless_mode, run_realtime_mode, save_scenario,
    FuzzReport,
};
pub use runtime::{RunSummary, RuntimeState, SimulationRuntime};
