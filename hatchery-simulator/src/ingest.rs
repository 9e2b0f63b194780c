//! Inbound command ingestion.
//!
//! A transport thread decodes `(arrival, code, unit)` triples and hands them
//! here. The arrival time is ignored: records are stamped with the current
//! simulated time so the loop applies them on its next tick.

use std::sync::Arc;

use tracing::{trace, warn};

use hatchery_core::command::{CommandKind, ControlRecord};
use hatchery_core::queue::CommandQueue;
use hatchery_core::time::VirtualClock;
use hatchery_core::SimulationError;
use hatchery_telemetry::MetricsRecorder;

/// A decoded inbound control message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundCommand {
    pub arrival_ms: i64,
    pub code: i32,
    pub unit_id: i32,
}

impl InboundCommand {
    pub fn new(arrival_ms: i64, code: i32, unit_id: i32) -> Self {
        Self {
            arrival_ms,
            code,
            unit_id,
        }
    }
}

/// Cheap to clone; hand one to each transport thread.
#[derive(Clone)]
pub struct CommandIngestor {
    queue: Arc<CommandQueue>,
    clock: VirtualClock,
    metrics: Arc<MetricsRecorder>,
}

impl CommandIngestor {
    pub fn new(queue: Arc<CommandQueue>, clock: VirtualClock, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            queue,
            clock,
            metrics,
        }
    }

    /// Queues the command for the next tick, or rejects an unknown code.
    pub fn ingest(&self, command: InboundCommand) -> Result<ControlRecord, SimulationError> {
        let kind = match CommandKind::try_from(command.code) {
            Ok(kind) => kind,
            Err(e) => {
                self.metrics.commands_rejected.inc();
                warn!(unit = command.unit_id, "Rejecting inbound command: {e}");
                return Err(e);
            }
        };

        let record = ControlRecord::new(self.clock.now_ms(), kind, Some(command.unit_id));
        self.queue.enqueue(record);
        self.metrics.commands_ingested.inc();
        trace!(?record, "Queued inbound command");
        Ok(record)
    }
}
