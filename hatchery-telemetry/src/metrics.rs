//! ## hatchery-telemetry::metrics
//! **Prometheus counters for the simulation loop**
//!
//! Each recorder owns its own registry, so tests and parallel runs never
//! share counters.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub ticks: Counter,
    pub commands_ingested: Counter,
    pub commands_dispatched: Counter,
    pub commands_rejected: Counter,
    pub readings_published: Counter,
    pub snapshots_dropped: Counter,
    pub tick_duration: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let ticks = Counter::new("hatchery_ticks_total", "Simulation ticks executed")?;
        let commands_ingested = Counter::new(
            "hatchery_commands_ingested_total",
            "Inbound commands accepted into the queue",
        )?;
        let commands_dispatched = Counter::new(
            "hatchery_commands_dispatched_total",
            "Control records applied to the bank",
        )?;
        let commands_rejected = Counter::new(
            "hatchery_commands_rejected_total",
            "Commands dropped for an unknown code or unit",
        )?;
        let readings_published = Counter::new(
            "hatchery_readings_published_total",
            "Reading snapshots handed to the publisher",
        )?;
        let snapshots_dropped = Counter::new(
            "hatchery_snapshots_dropped_total",
            "Snapshots discarded because the publisher was saturated",
        )?;
        let tick_duration = Histogram::with_opts(
            HistogramOpts::new(
                "hatchery_tick_duration_seconds",
                "Wall-clock time spent inside one tick",
            )
            .buckets(vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2]),
        )?;

        registry.register(Box::new(ticks.clone()))?;
        registry.register(Box::new(commands_ingested.clone()))?;
        registry.register(Box::new(commands_dispatched.clone()))?;
        registry.register(Box::new(commands_rejected.clone()))?;
        registry.register(Box::new(readings_published.clone()))?;
        registry.register(Box::new(snapshots_dropped.clone()))?;
        registry.register(Box::new(tick_duration.clone()))?;

        Ok(Self {
            registry,
            ticks,
            commands_ingested,
            commands_dispatched,
            commands_rejected,
            readings_published,
            snapshots_dropped,
            tick_duration,
        })
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorders_are_independent() {
        let a = MetricsRecorder::new().unwrap();
        let b = MetricsRecorder::new().unwrap();
        a.ticks.inc();
        assert_eq!(a.ticks.get(), 1.0);
        assert_eq!(b.ticks.get(), 0.0);
    }

    #[test]
    fn exposition_lists_counters() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.commands_rejected.inc();
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("hatchery_commands_rejected_total 1"));
        assert!(text.contains("hatchery_tick_duration_seconds"));
    }
}
