//! # Simulation Engine
//!
//! Owns the incubator bank and advances it one tick at a time. The engine has
//! no notion of wall-clock pacing; `hatchery-engine` moves it onto a
//! dedicated thread and calls `tick` on a fixed cadence, while headless runs
//! and tests call `tick` directly.
//!
//! One tick:
//! 1. advance the virtual clock by `step_ms`
//! 2. drain every record scheduled before the new time
//! 3. dispatch each record; failures are logged, counted and dropped
//! 4. step every unit exactly once
//! 5. publish a snapshot if none has been published yet or the reading
//!    interval has been exceeded

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{trace, warn};

use hatchery_config::HatcheryConfig;
use hatchery_core::command::{CommandKind, ControlRecord};
use hatchery_core::incubator::IncubatorUnit;
use hatchery_core::queue::CommandQueue;
use hatchery_core::reading::Snapshot;
use hatchery_core::room::RoomEnvironment;
use hatchery_core::time::VirtualClock;
use hatchery_core::SimulationError;
use hatchery_telemetry::MetricsRecorder;

use crate::digest::ReadingDigest;
use crate::publisher::{PublishOutcome, ReadingPublisher};

/// Everything needed to build a bank, derived from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub unit_count: usize,
    pub step_ms: i64,
    pub reading_interval_ms: i64,
    pub halflife_steps: f64,
    pub heatlamp_temperature: f64,
    pub room: RoomEnvironment,
}

impl EngineSettings {
    pub fn from_config(config: &HatcheryConfig) -> Self {
        let sim = &config.simulation;
        let thermal = &config.thermal;
        Self {
            unit_count: sim.unit_count,
            step_ms: i64::try_from(sim.step_ms).unwrap_or(i64::MAX),
            reading_interval_ms: i64::try_from(sim.reading_interval_ms).unwrap_or(i64::MAX),
            halflife_steps: sim.halflife_steps(),
            heatlamp_temperature: thermal.heatlamp_temperature,
            room: RoomEnvironment::new(
                thermal.room_temperature,
                thermal.outside_near,
                thermal.outside_far,
            ),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&HatcheryConfig::default())
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub now_ms: i64,
    pub dispatched: usize,
    pub rejected: usize,
    pub published: bool,
}

/// Running totals over the engine's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub ticks: u64,
    pub dispatched: u64,
    pub rejected: u64,
    pub snapshots_published: u64,
    pub snapshots_dropped: u64,
}

pub struct SimulationEngine {
    units: Vec<IncubatorUnit>,
    room: RoomEnvironment,
    queue: Arc<CommandQueue>,
    clock: VirtualClock,
    step_ms: i64,
    reading_interval_ms: i64,
    last_reading_ms: Option<i64>,
    publisher: Box<dyn ReadingPublisher>,
    latest: Arc<Mutex<Option<Snapshot>>>,
    digest: ReadingDigest,
    totals: RunTotals,
    metrics: Arc<MetricsRecorder>,
}

impl SimulationEngine {
    /// Builds a bank of `unit_count` units resting at room temperature.
    ///
    /// Fails with `InvalidParameter` for a non-positive half-life or step.
    pub fn new(
        settings: &EngineSettings,
        queue: Arc<CommandQueue>,
        clock: VirtualClock,
        publisher: Box<dyn ReadingPublisher>,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, SimulationError> {
        if settings.step_ms <= 0 {
            return Err(SimulationError::InvalidParameter(format!(
                "step must be > 0 ms, got {}",
                settings.step_ms
            )));
        }

        let room_temperature = settings.room.room_temperature;
        let units = (0..settings.unit_count)
            .map(|_| {
                IncubatorUnit::new(room_temperature, settings.halflife_steps, room_temperature)
                    .map(|unit| unit.with_heatlamp_temperature(settings.heatlamp_temperature))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            units,
            room: settings.room,
            queue,
            clock,
            step_ms: settings.step_ms,
            reading_interval_ms: settings.reading_interval_ms,
            last_reading_ms: None,
            publisher,
            latest: Arc::new(Mutex::new(None)),
            digest: ReadingDigest::new(),
            totals: RunTotals::default(),
            metrics,
        })
    }

    pub fn tick(&mut self) -> TickOutcome {
        let started = Instant::now();
        let now_ms = self.clock.advance(self.step_ms);

        let mut dispatched = 0usize;
        let mut rejected = 0usize;
        for record in self.queue.drain_due(now_ms) {
            match self.dispatch(&record) {
                Ok(()) => {
                    dispatched += 1;
                    self.metrics.commands_dispatched.inc();
                }
                Err(e) => {
                    rejected += 1;
                    self.metrics.commands_rejected.inc();
                    warn!(
                        scheduled_ms = record.scheduled_ms,
                        command = ?record.kind,
                        "Dropping command: {e}"
                    );
                }
            }
        }

        for unit in &mut self.units {
            unit.step();
        }

        let published = self.reading_due(now_ms);
        if published {
            self.emit_snapshot(now_ms);
        }

        self.totals.ticks += 1;
        self.totals.dispatched += dispatched as u64;
        self.totals.rejected += rejected as u64;
        self.metrics.ticks.inc();
        self.metrics
            .tick_duration
            .observe(started.elapsed().as_secs_f64());
        trace!(now_ms, dispatched, rejected, published, "tick");

        TickOutcome {
            now_ms,
            dispatched,
            rejected,
            published,
        }
    }

    /// Applies one record to the bank.
    pub fn dispatch(&mut self, record: &ControlRecord) -> Result<(), SimulationError> {
        match record.kind {
            CommandKind::DoorOpen => self.room.apply_door_open(&mut self.units),
            CommandKind::DoorClosed => self.room.apply_door_closed(&mut self.units),
            CommandKind::HeatlampOn => self.unit_mut(record.unit_id)?.turn_on_heatlamp(),
            CommandKind::HeatlampOff => self.unit_mut(record.unit_id)?.turn_off_heatlamp(),
            CommandKind::BustHeatlamp => self.unit_mut(record.unit_id)?.break_heatlamp(),
            CommandKind::FixHeatlamp => self.unit_mut(record.unit_id)?.fix_heatlamp(),
        }
        Ok(())
    }

    fn unit_mut(&mut self, unit_id: Option<i32>) -> Result<&mut IncubatorUnit, SimulationError> {
        let unit_count = self.units.len();
        unit_id
            .and_then(|id| usize::try_from(id).ok())
            .and_then(|index| self.units.get_mut(index))
            .ok_or(SimulationError::UnknownUnit {
                unit_id,
                unit_count,
            })
    }

    fn reading_due(&self, now_ms: i64) -> bool {
        match self.last_reading_ms {
            None => true,
            Some(last) => last.saturating_add(self.reading_interval_ms) < now_ms,
        }
    }

    fn emit_snapshot(&mut self, now_ms: i64) {
        let snapshot = Snapshot::capture(now_ms, &self.units);
        self.digest.record(&snapshot);
        match self.publisher.publish(&snapshot) {
            PublishOutcome::Delivered => {
                self.totals.snapshots_published += 1;
                self.metrics.readings_published.inc();
            }
            PublishOutcome::Dropped => {
                self.totals.snapshots_dropped += 1;
                self.metrics.snapshots_dropped.inc();
            }
        }
        *self.latest.lock() = Some(snapshot);
        self.last_reading_ms = Some(now_ms);
    }

    /// Runs `ticks` ticks back to back.
    pub fn run_ticks(&mut self, ticks: u64) -> RunTotals {
        for _ in 0..ticks {
            self.tick();
        }
        self.totals
    }

    pub fn units(&self) -> &[IncubatorUnit] {
        &self.units
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn clock(&self) -> &VirtualClock {
        &self.clock
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }

    pub fn totals(&self) -> RunTotals {
        self.totals
    }

    pub fn digest(&self) -> &ReadingDigest {
        &self.digest
    }

    /// Shared view of the most recently published snapshot, readable from
    /// any thread.
    pub fn latest_snapshot_handle(&self) -> Arc<Mutex<Option<Snapshot>>> {
        self.latest.clone()
    }

    pub fn metrics(&self) -> &Arc<MetricsRecorder> {
        &self.metrics
    }
}
