use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

use hatchery_config::HatcheryConfig;
use hatchery_engine::{run_fuzz_mode, run_headless_mode, run_realtime_mode, save_scenario};
use hatchery_simulator::{LogPublisher, Scenario};
use hatchery_telemetry::{EventLogger, MetricsRecorder};

#[derive(Parser, Debug)]
#[command(name = "hatchery", version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/hatchery.yaml plus the HATCHERY_ENV overlay
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the paced simulation until the duration elapses or Ctrl-C
    Run(RunArgs),
    /// Run a deterministic headless simulation
    Simulate(SimulateArgs),
    /// Run randomized scenarios and check every command is accounted for
    Fuzz(FuzzArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scenario file to preload; the stock demo script when omitted
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,
    /// Wall-clock seconds to run; runs until Ctrl-C when omitted
    #[arg(long)]
    pub duration_secs: Option<u64>,
    /// Print Prometheus metrics on exit
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Scenario file to replay; the stock demo script when omitted
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,
    /// Number of ticks to run
    #[arg(long, default_value_t = 10_000)]
    pub ticks: u64,
    /// Expected digest; the run fails if the final digest differs
    #[arg(long)]
    pub validate_hash: Option<String>,
    /// Write the scenario that was run to this path
    #[arg(long)]
    pub save_scenario: Option<PathBuf>,
    /// Print Prometheus metrics on exit
    #[arg(long)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FuzzArgs {
    /// Initial seed; each iteration uses the next one
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    #[arg(long, default_value_t = 10)]
    pub iterations: u64,
    /// Commands generated per scenario
    #[arg(long, default_value_t = 1000)]
    pub commands: usize,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => HatcheryConfig::load_from_path(path),
        None => HatcheryConfig::load(),
    }
    .context("Failed to load configuration")?;

    init_logging(&config.telemetry.log_level);
    let metrics = Arc::new(MetricsRecorder::new().context("Failed to register metrics")?);

    match cli.command {
        Commands::Run(args) => {
            let scenario = load_scenario(args.scenario.as_ref())?;
            let summary = run_realtime_mode(
                &config,
                &scenario,
                args.duration_secs.map(Duration::from_secs),
                metrics.clone(),
            )
            .await?;
            println!(
                "Stopped after {} ticks at simulated time {} ms",
                summary.ticks, summary.simulated_time_ms
            );
            if args.metrics {
                print_metrics(&metrics)?;
            }
        }
        Commands::Simulate(args) => {
            let scenario = load_scenario(args.scenario.as_ref())?;
            if let Some(path) = &args.save_scenario {
                save_scenario(&scenario, &path.to_string_lossy())?;
            }
            let summary = run_headless_mode(
                &config,
                &scenario,
                args.ticks,
                args.validate_hash.as_deref(),
                Box::new(LogPublisher),
                metrics.clone(),
            )?;
            println!("{}", summary.digest);
            if args.metrics {
                print_metrics(&metrics)?;
            }
        }
        Commands::Fuzz(args) => {
            let report = run_fuzz_mode(&config, args.seed, args.iterations, args.commands, metrics)?;
            println!(
                "{} iterations: {} commands applied, {} rejected",
                report.iterations, report.dispatched, report.rejected
            );
        }
    }
    Ok(())
}

/// Returns whether this call installed the subscriber.
fn init_logging(level: &str) -> bool {
    let installed = EventLogger::init(level);
    if !installed {
        debug!(level, "Tracing subscriber already installed, keeping it");
    }
    installed
}

fn load_scenario(path: Option<&PathBuf>) -> anyhow::Result<Scenario> {
    match path {
        Some(path) => {
            info!("Loading scenario from {}", path.display());
            Scenario::load_from_file(path)
                .with_context(|| format!("Failed to load scenario {}", path.display()))
        }
        None => Ok(Scenario::demo()),
    }
}

fn print_metrics(metrics: &MetricsRecorder) -> anyhow::Result<()> {
    print!("{}", metrics.gather_metrics()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate() {
        let cli = Cli::try_parse_from([
            "hatchery",
            "simulate",
            "--ticks",
            "500",
            "--validate-hash",
            "abc",
            "--config",
            "custom.yaml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
        match cli.command {
            Commands::Simulate(args) => {
                assert_eq!(args.ticks, 500);
                assert_eq!(args.validate_hash.as_deref(), Some("abc"));
                assert!(!args.metrics);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn logging_installs_once() {
        init_logging("info");
        assert!(!init_logging("debug"));
    }

    #[test]
    fn fuzz_defaults() {
        let cli = Cli::try_parse_from(["hatchery", "fuzz"]).unwrap();
        match cli.command {
            Commands::Fuzz(args) => {
                assert_eq!(args.seed, 1);
                assert_eq!(args.iterations, 10);
                assert_eq!(args.commands, 1000);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
