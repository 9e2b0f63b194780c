//! ## hatchery-core::queue
//! **Pending control records shared between ingestion and the simulation loop**
//!
//! Producers call `enqueue` from any thread; the loop calls `drain_due` once
//! per tick. A single `parking_lot::Mutex` serializes both, so contention
//! only ever shows up as a short wait. Records come back in no particular
//! order.

use parking_lot::Mutex;

use crate::command::ControlRecord;

#[derive(Debug, Default)]
pub struct CommandQueue {
    records: Mutex<Vec<ControlRecord>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, record: ControlRecord) {
        self.records.lock().push(record);
    }

    /// Removes and returns every record scheduled strictly before `now_ms`.
    pub fn drain_due(&self, now_ms: i64) -> Vec<ControlRecord> {
        let mut records = self.records.lock();
        if !records.iter().any(|r| r.scheduled_ms < now_ms) {
            return Vec::new();
        }

        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut *records)
            .into_iter()
            .partition(|r| r.scheduled_ms < now_ms);
        *records = pending;
        due
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}
