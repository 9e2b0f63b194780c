#[macro_use]
extern crate criterion;

use std::sync::Arc;

use criterion::{black_box, Criterion};
use hatchery_core::queue::CommandQueue;
use hatchery_core::time::VirtualClock;
use hatchery_simulator::{EngineSettings, NullPublisher, RandomizedScenario, SimulationEngine};
use hatchery_telemetry::MetricsRecorder;

/// Benchmark tick throughput over ten simulated minutes with a busy command script.
fn benchmark_tick_throughput(c: &mut Criterion) {
    let ticks = 6_000;
    let settings = EngineSettings::default();
    let scenario = RandomizedScenario::new(42, 1_000, settings.unit_count, 600_000).generate();

    c.bench_function("tick_throughput", |b| {
        b.iter(|| {
            let queue = Arc::new(CommandQueue::new());
            scenario.preload(&queue, 0);
            let mut engine = SimulationEngine::new(
                &settings,
                queue,
                VirtualClock::new(0),
                Box::new(NullPublisher),
                Arc::new(MetricsRecorder::new().expect("metrics registry")),
            )
            .expect("engine settings are valid");
            black_box(engine.run_ticks(ticks));
        })
    });
}

criterion_group!(benches, benchmark_tick_throughput);
criterion_main!(benches);
