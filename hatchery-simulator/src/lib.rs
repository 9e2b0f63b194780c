// hatchery-simulator/src/lib.rs

/*!
# Hatchery Simulator

Discrete-event simulation of an incubator bank. Time advances in fixed
simulated steps; each tick drains due control records, applies them to the
bank, steps every unit's thermal model and, once per reading interval, hands a
snapshot of the whole bank to a publisher.

## Key Components:
- **Engine:** one synchronous, deterministic tick at a time.
- **Ingestor:** turns inbound `(code, unit)` pairs into queued records.
- **Publishers:** non-blocking hand-off of snapshots to a transport or log.
- **Scenarios:** pre-scheduled command scripts, loaded from YAML or generated at random.
- **Digest:** BLAKE3 hash over every published snapshot for replay checks.
*/

pub mod digest;
pub mod engine;
pub mod ingest;
pub mod publisher;
pub mod randomized;
pub mod scenario;

pub use digest::ReadingDigest;
pub use engine::{EngineSettings, RunTotals, SimulationEngine, TickOutcome};
pub use ingest::{CommandIngestor, InboundCommand};
pub use publisher::{ChannelPublisher, LogPublisher, NullPublisher, PublishOutcome, ReadingPublisher};
pub use randomized::RandomizedScenario;
pub use scenario::{Scenario, ScenarioError, ScenarioEvent};
