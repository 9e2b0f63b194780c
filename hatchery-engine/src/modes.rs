//! Run modes shared by every frontend.
//!
//! - realtime: the paced loop on its own thread, until a deadline or Ctrl-C
//! - headless: back-to-back ticks from simulated time zero, with an optional
//!   digest check for replay validation
//! - fuzz: many randomized headless runs, each checked for lost commands

use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::Receiver;
use tracing::{error, info, instrument};

use hatchery_config::HatcheryConfig;
use hatchery_core::queue::CommandQueue;
use hatchery_core::reading::Snapshot;
use hatchery_core::time::VirtualClock;
use hatchery_simulator::{
    ChannelPublisher, EngineSettings, LogPublisher, NullPublisher, RandomizedScenario,
    ReadingPublisher, Scenario, SimulationEngine,
};
use hatchery_telemetry::{EventLogger, MetricsRecorder};

use crate::error::RuntimeError;
use crate::runtime::{RunSummary, SimulationRuntime};

/// Simulated time covered by one fuzz iteration.
const FUZZ_HORIZON_MS: u64 = 600_000;

/// Runs the paced loop until `duration` elapses or Ctrl-C arrives.
///
/// The clock starts at `simulation.start_time_ms`, or the current wall-clock
/// time when that is unset.
#[instrument(level = "info", name = "run_realtime_mode", skip(config, scenario, metrics))]
pub async fn run_realtime_mode(
    config: &HatcheryConfig,
    scenario: &Scenario,
    duration: Option<Duration>,
    metrics: Arc<MetricsRecorder>,
) -> Result<RunSummary, RuntimeError> {
    let start_ms = config
        .simulation
        .start_time_ms
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis());

    let (publisher, readings) = ChannelPublisher::bounded(config.telemetry.publish_buffer);
    let mut runtime = SimulationRuntime::new(config, start_ms, Box::new(publisher), metrics)?;
    runtime.preload(scenario);
    info!(
        start = %chrono::DateTime::from_timestamp_millis(start_ms).unwrap_or_default(),
        acceleration = config.simulation.acceleration(),
        "Starting realtime simulation"
    );
    runtime.start()?;

    // Readings are handed to a transport thread; here it renders them to the log.
    // If the spawn fails, dropping `runtime` stops and joins the loop.
    let transport = spawn_reading_transport(readings)?;

    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::select! {
        _ = deadline => info!("Run duration elapsed"),
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => info!("Interrupt received"),
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        },
    }

    let summary = tokio::task::spawn_blocking(move || runtime.stop()).await??;
    // The runtime, and with it the channel sender, is gone; the transport drains and exits.
    tokio::task::spawn_blocking(move || transport.join())
        .await?
        .map_err(|_| RuntimeError::Processing("reading transport panicked".into()))?;
    log_summary("realtime_complete", &summary);
    Ok(summary)
}

fn spawn_reading_transport(
    readings: Receiver<Snapshot>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("hatchery-readings".into())
        .spawn(move || {
            let mut sink = LogPublisher;
            for snapshot in readings {
                sink.publish(&snapshot);
            }
        })
}

/// Ticks a fresh bank `ticks` times with no pacing.
#[instrument(level = "info", name = "run_headless_mode", skip(config, scenario, publisher, metrics))]
pub fn run_headless_mode(
    config: &HatcheryConfig,
    scenario: &Scenario,
    ticks: u64,
    validate_hash: Option<&str>,
    publisher: Box<dyn ReadingPublisher>,
    metrics: Arc<MetricsRecorder>,
) -> Result<RunSummary, RuntimeError> {
    let start_ms = config.simulation.start_time_ms.unwrap_or(0);
    let queue = Arc::new(CommandQueue::new());
    scenario.preload(&queue, start_ms);

    let mut engine = SimulationEngine::new(
        &EngineSettings::from_config(config),
        queue,
        VirtualClock::new(start_ms),
        publisher,
        metrics,
    )?;
    engine.run_ticks(ticks);
    let summary = RunSummary::from_engine(&engine);
    info!(digest = %summary.digest, ticks, "Headless run complete");

    if let Some(expected) = validate_hash {
        if summary.digest != expected {
            generate_bug_report(&format!(
                "Simulation error: state hash mismatch!\nScenario: {:?}\nTicks: {}\nExpected: {}\nGot: {}",
                scenario.name, ticks, expected, summary.digest
            ));
            return Err(RuntimeError::HashMismatch {
                expected: expected.to_string(),
                actual: summary.digest,
            });
        }
    }

    log_summary("simulation_complete", &summary);
    Ok(summary)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FuzzReport {
    pub iterations: u64,
    pub dispatched: u64,
    pub rejected: u64,
}

/// Runs `iterations` randomized scenarios, seeds `seed..seed + iterations`.
///
/// Every generated command must come out of the queue exactly once, either
/// applied or rejected; anything else fails the run.
#[instrument(level = "info", name = "run_fuzz_mode", skip(config, metrics))]
pub fn run_fuzz_mode(
    config: &HatcheryConfig,
    seed: u64,
    iterations: u64,
    commands: usize,
    metrics: Arc<MetricsRecorder>,
) -> Result<FuzzReport, RuntimeError> {
    let step_ms = config.simulation.step_ms.max(1);
    let ticks = FUZZ_HORIZON_MS / step_ms + 2;
    let mut report = FuzzReport::default();

    for iteration in 0..iterations {
        let iteration_seed = seed.wrapping_add(iteration);
        let scenario = RandomizedScenario::new(
            iteration_seed,
            commands,
            config.simulation.unit_count,
            FUZZ_HORIZON_MS,
        )
        .generate();

        let summary = run_headless_mode(
            config,
            &scenario,
            ticks,
            None,
            Box::new(NullPublisher),
            metrics.clone(),
        )?;

        let accounted = summary.dispatched + summary.rejected;
        if accounted != commands as u64 || summary.pending_commands != 0 {
            let message = format!(
                "seed {iteration_seed}: {commands} commands generated, {accounted} accounted for, {} still queued",
                summary.pending_commands
            );
            generate_bug_report(&message);
            return Err(RuntimeError::Validation(message));
        }

        report.iterations += 1;
        report.dispatched += summary.dispatched;
        report.rejected += summary.rejected;
    }

    EventLogger::log_event(
        "fuzz_complete",
        &[
            ("seed", seed.to_string()),
            ("iterations", report.iterations.to_string()),
            ("dispatched", report.dispatched.to_string()),
            ("rejected", report.rejected.to_string()),
        ],
    );
    Ok(report)
}

fn log_summary(event_type: &str, summary: &RunSummary) {
    EventLogger::log_event(
        event_type,
        &[
            ("ticks", summary.ticks.to_string()),
            ("simulated_time_ms", summary.simulated_time_ms.to_string()),
            ("dispatched", summary.dispatched.to_string()),
            ("rejected", summary.rejected.to_string()),
            ("snapshots", summary.snapshots_published.to_string()),
            ("final_hash", summary.digest.clone()),
        ],
    );
}

/// Writes a timestamped bug report to the working directory.
pub fn generate_bug_report(report: &str) {
    let filename = format!("bug_report_{}.txt", chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f"));
    match File::create(&filename).and_then(|mut file| file.write_all(report.as_bytes())) {
        Ok(()) => info!("Bug report written to {filename}"),
        Err(e) => error!("Failed to write bug report {filename}: {e}"),
    }
}

/// Saves a scenario so a run can be replayed later.
pub fn save_scenario(scenario: &Scenario, path: &str) -> Result<(), RuntimeError> {
    scenario.save_to_file(path)?;
    info!("Scenario saved to {path}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> Arc<MetricsRecorder> {
        Arc::new(MetricsRecorder::new().unwrap())
    }

    #[test]
    fn demo_scenario_end_to_end() {
        let config = HatcheryConfig::default();
        let (publisher, rx) = ChannelPublisher::bounded(1024);
        // Fifteen and a half simulated minutes at 100 ms per step.
        let summary = run_headless_mode(
            &config,
            &Scenario::demo(),
            9_400,
            None,
            Box::new(publisher),
            metrics(),
        )
        .unwrap();

        assert_eq!(summary.dispatched, 8);
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.pending_commands, 0);
        assert_eq!(summary.simulated_time_ms, 940_000);
        assert_eq!(rx.len() as u64, summary.snapshots_published);

        // Unit 5's lamp broke and was fixed but never switched on.
        let unit5 = &summary.final_snapshot.readings[5];
        assert_eq!(unit5.lamp_state, 0);
        assert!(summary
            .final_snapshot
            .readings
            .iter()
            .all(|r| r.temperature < 25.0));
    }

    #[test]
    fn hash_validation() {
        let config = HatcheryConfig::default();
        let scenario = Scenario::demo();
        let first = run_headless_mode(&config, &scenario, 4_000, None, Box::new(NullPublisher), metrics())
            .unwrap();

        let replay = run_headless_mode(
            &config,
            &scenario,
            4_000,
            Some(&first.digest),
            Box::new(NullPublisher),
            metrics(),
        )
        .unwrap();
        assert_eq!(replay.digest, first.digest);

        let err = run_headless_mode(
            &config,
            &scenario,
            2_000,
            Some(&first.digest),
            Box::new(NullPublisher),
            metrics(),
        )
        .unwrap_err();
        assert!(matches!(err, RuntimeError::HashMismatch { expected, .. } if expected == first.digest));
    }

    #[test]
    fn fuzz_accounts_for_every_command() {
        let config = HatcheryConfig::default();
        let report = run_fuzz_mode(&config, 11, 3, 200, metrics()).unwrap();
        assert_eq!(report.iterations, 3);
        assert_eq!(report.dispatched + report.rejected, 600);
        assert!(report.rejected > 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn realtime_rejects_bad_settings_before_starting() {
        let mut config = HatcheryConfig::default();
        config.simulation.halflife_secs = 0.0;
        let err = run_realtime_mode(
            &config,
            &Scenario::default(),
            Some(Duration::from_secs(60)),
            metrics(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Simulation(hatchery_core::SimulationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn reading_transport_exits_when_sender_is_gone() {
        let (mut publisher, readings) = ChannelPublisher::bounded(4);
        let transport = spawn_reading_transport(readings).unwrap();
        publisher.publish(&Snapshot {
            simulated_time_ms: 100,
            readings: Vec::new(),
        });
        drop(publisher);
        transport.join().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn realtime_runs_for_duration() {
        let mut config = HatcheryConfig::default();
        config.simulation.tick_period_ms = 1;
        config.simulation.start_time_ms = Some(1_000);
        let summary = run_realtime_mode(
            &config,
            &Scenario::default(),
            Some(Duration::from_millis(100)),
            metrics(),
        )
        .await
        .unwrap();
        assert!(summary.ticks > 0);
        assert_eq!(summary.simulated_time_ms, 1_000 + summary.ticks as i64 * 100);
        assert!(summary.snapshots_published >= 1);
    }
}
