//! # Simulation Runtime
//!
//! Moves a [`SimulationEngine`] onto its own thread and ticks it on a fixed
//! wall-clock cadence. Each tick runs to completion, then the thread waits on
//! the stop channel for whatever remains of the tick period, so a stop request
//! is observed within one period and never mid-tick.
//!
//! ```text
//!   Idle --start--> Running --stop--> Stopped
//! ```

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use hatchery_config::HatcheryConfig;
use hatchery_core::queue::CommandQueue;
use hatchery_core::reading::Snapshot;
use hatchery_core::time::VirtualClock;
use hatchery_simulator::{
    CommandIngestor, EngineSettings, ReadingPublisher, Scenario, SimulationEngine,
};
use hatchery_telemetry::MetricsRecorder;

use crate::error::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Idle,
    Running,
    Stopped,
}

/// Final accounting for a run, taken once the loop has stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub simulated_time_ms: i64,
    pub dispatched: u64,
    pub rejected: u64,
    pub snapshots_published: u64,
    pub snapshots_dropped: u64,
    pub pending_commands: usize,
    pub digest: String,
    pub final_snapshot: Snapshot,
}

impl RunSummary {
    pub fn from_engine(engine: &SimulationEngine) -> Self {
        let totals = engine.totals();
        Self {
            ticks: totals.ticks,
            simulated_time_ms: engine.now_ms(),
            dispatched: totals.dispatched,
            rejected: totals.rejected,
            snapshots_published: totals.snapshots_published,
            snapshots_dropped: totals.snapshots_dropped,
            pending_commands: engine.queue().len(),
            digest: engine.digest().hex(),
            final_snapshot: Snapshot::capture(engine.now_ms(), engine.units()),
        }
    }
}

pub struct SimulationRuntime {
    state: RuntimeState,
    engine: Option<SimulationEngine>,
    tick_period: Duration,
    queue: Arc<CommandQueue>,
    clock: VirtualClock,
    metrics: Arc<MetricsRecorder>,
    latest: Arc<Mutex<Option<Snapshot>>>,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<SimulationEngine>>,
}

impl SimulationRuntime {
    /// Builds an idle runtime whose clock starts at `start_ms`.
    pub fn new(
        config: &HatcheryConfig,
        start_ms: i64,
        publisher: Box<dyn ReadingPublisher>,
        metrics: Arc<MetricsRecorder>,
    ) -> Result<Self, RuntimeError> {
        let engine = SimulationEngine::new(
            &EngineSettings::from_config(config),
            Arc::new(CommandQueue::new()),
            VirtualClock::new(start_ms),
            publisher,
            metrics,
        )?;
        Ok(Self::from_engine(
            engine,
            Duration::from_millis(config.simulation.tick_period_ms),
        ))
    }

    pub fn from_engine(engine: SimulationEngine, tick_period: Duration) -> Self {
        Self {
            state: RuntimeState::Idle,
            tick_period,
            queue: engine.queue().clone(),
            clock: engine.clock().clone(),
            metrics: engine.metrics().clone(),
            latest: engine.latest_snapshot_handle(),
            engine: Some(engine),
            stop_tx: None,
            handle: None,
        }
    }

    pub fn state(&self) -> RuntimeState {
        self.state
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    /// Current simulated time. Readable from any thread while running.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// A handle for transport threads to feed inbound commands.
    pub fn ingestor(&self) -> CommandIngestor {
        CommandIngestor::new(self.queue.clone(), self.clock.clone(), self.metrics.clone())
    }

    /// Queues a scenario relative to the current simulated time.
    pub fn preload(&self, scenario: &Scenario) -> usize {
        let queued = scenario.preload(&self.queue, self.clock.now_ms());
        debug!(queued, name = ?scenario.name, "Scenario preloaded");
        queued
    }

    pub fn latest_snapshot(&self) -> Option<Snapshot> {
        self.latest.lock().clone()
    }

    pub fn start(&mut self) -> Result<(), RuntimeError> {
        if self.state != RuntimeState::Idle {
            return Err(RuntimeError::InvalidTransition {
                action: "start",
                state: self.state,
            });
        }
        let engine = self.engine.take().ok_or(RuntimeError::InvalidTransition {
            action: "start",
            state: self.state,
        })?;

        let (stop_tx, stop_rx) = channel::bounded(1);
        let tick_period = self.tick_period;
        let spawned = thread::Builder::new()
            .name("hatchery-sim".into())
            .spawn(move || run_loop(engine, stop_rx, tick_period));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                self.stop_tx = Some(stop_tx);
                self.state = RuntimeState::Running;
                info!(tick_period_ms = tick_period.as_millis() as u64, "Simulation started");
                Ok(())
            }
            Err(e) => {
                self.state = RuntimeState::Stopped;
                Err(e.into())
            }
        }
    }

    /// Stops the loop after its current tick and returns the run's summary.
    pub fn stop(&mut self) -> Result<RunSummary, RuntimeError> {
        if self.state != RuntimeState::Running {
            return Err(RuntimeError::InvalidTransition {
                action: "stop",
                state: self.state,
            });
        }
        self.state = RuntimeState::Stopped;

        if let Some(stop_tx) = self.stop_tx.take() {
            // The loop may already be gone; a full or closed channel is fine.
            let _ = stop_tx.try_send(());
        }
        let handle = self.handle.take().ok_or(RuntimeError::LoopPanicked)?;
        let engine = handle.join().map_err(|_| RuntimeError::LoopPanicked)?;
        let summary = RunSummary::from_engine(&engine);
        self.engine = Some(engine);

        info!(
            ticks = summary.ticks,
            simulated_time_ms = summary.simulated_time_ms,
            "Simulation stopped"
        );
        Ok(summary)
    }

    /// Summary of a stopped run; `None` while the loop owns the engine.
    pub fn summary(&self) -> Option<RunSummary> {
        self.engine.as_ref().map(RunSummary::from_engine)
    }
}

impl Drop for SimulationRuntime {
    fn drop(&mut self) {
        if self.state == RuntimeState::Running {
            if let Err(e) = self.stop() {
                warn!("Simulation did not shut down cleanly: {e}");
            }
        }
    }
}

fn run_loop(
    mut engine: SimulationEngine,
    stop_rx: Receiver<()>,
    tick_period: Duration,
) -> SimulationEngine {
    debug!(start_ms = engine.now_ms(), "Simulation loop running");
    loop {
        let started = Instant::now();
        engine.tick();

        let remaining = tick_period.saturating_sub(started.elapsed());
        match stop_rx.recv_timeout(remaining) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!(now_ms = engine.now_ms(), "Simulation loop exited");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use hatchery_core::command::CommandKind;
    use hatchery_simulator::{InboundCommand, NullPublisher, ScenarioEvent};

    fn config(tick_period_ms: u64) -> HatcheryConfig {
        let mut config = HatcheryConfig::default();
        config.simulation.tick_period_ms = tick_period_ms;
        config
    }

    fn runtime(tick_period_ms: u64) -> SimulationRuntime {
        SimulationRuntime::new(
            &config(tick_period_ms),
            0,
            Box::new(NullPublisher),
            Arc::new(MetricsRecorder::new().unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn transitions() {
        let mut rt = runtime(1);
        assert_eq!(rt.state(), RuntimeState::Idle);
        assert!(matches!(
            rt.stop(),
            Err(RuntimeError::InvalidTransition { action: "stop", state: RuntimeState::Idle })
        ));

        rt.start().unwrap();
        assert_eq!(rt.state(), RuntimeState::Running);
        assert!(matches!(
            rt.start(),
            Err(RuntimeError::InvalidTransition { action: "start", state: RuntimeState::Running })
        ));
        assert!(rt.summary().is_none());

        let summary = rt.stop().unwrap();
        assert_eq!(rt.state(), RuntimeState::Stopped);
        assert!(summary.ticks >= 1);
        assert_eq!(summary.simulated_time_ms, summary.ticks as i64 * 100);
        assert!(matches!(rt.start(), Err(RuntimeError::InvalidTransition { .. })));
        assert!(matches!(rt.stop(), Err(RuntimeError::InvalidTransition { .. })));
        assert_eq!(rt.summary(), Some(summary));
    }

    #[test]
    fn first_tick_publishes_latest_snapshot() {
        let mut rt = runtime(1);
        assert!(rt.latest_snapshot().is_none());
        rt.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while rt.latest_snapshot().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        let snapshot = rt.latest_snapshot().unwrap();
        assert_eq!(snapshot.simulated_time_ms, 100);
        assert_eq!(snapshot.readings.len(), 10);
        rt.stop().unwrap();
    }

    #[test]
    fn preload_is_relative_to_clock() {
        let rt = SimulationRuntime::new(
            &config(1),
            5_000,
            Box::new(NullPublisher),
            Arc::new(MetricsRecorder::new().unwrap()),
        )
        .unwrap();
        let scenario = Scenario {
            name: None,
            events: vec![ScenarioEvent::room(1, CommandKind::DoorOpen)],
        };
        assert_eq!(rt.preload(&scenario), 1);
        assert_eq!(rt.queue.drain_due(6_001)[0].scheduled_ms, 6_000);
    }

    #[test]
    fn ingested_command_lands_on_a_running_bank() {
        let mut rt = runtime(1);
        let ingestor = rt.ingestor();
        rt.start().unwrap();
        ingestor.ingest(InboundCommand::new(0, 1, 4)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while rt.metrics.commands_dispatched.get() < 1.0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        let summary = rt.stop().unwrap();
        assert_eq!(summary.dispatched, 1);
        assert_eq!(summary.final_snapshot.readings[4].lamp_state, 1);
    }

    #[test]
    fn drop_stops_the_loop() {
        let metrics = Arc::new(MetricsRecorder::new().unwrap());
        let mut rt = SimulationRuntime::new(
            &config(1),
            0,
            Box::new(NullPublisher),
            metrics.clone(),
        )
        .unwrap();
        rt.start().unwrap();
        drop(rt);
        let ticks = metrics.ticks.get();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(metrics.ticks.get(), ticks);
    }
}
