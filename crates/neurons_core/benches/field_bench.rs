//! Neuron Field Benchmarks
//!
//! Soma assignment is quadratic in the neuron count; the tick is linear.
//! Both must stay well inside a 16 ms frame at the upper control bound.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use neurons_core::graph::GraphBuilder;
use neurons_core::{Bounds, NeuronConfig, RecordingSurface, Simulation, SurfaceSize};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SURFACE: SurfaceSize = SurfaceSize::new(1920.0, 1080.0);

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    let bounds = Bounds::inset(SURFACE, 0.1);

    for count in [20u32, 200, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut rng = ChaCha8Rng::seed_from_u64(7);
            let mut builder = GraphBuilder::new(bounds);
            b.iter(|| black_box(builder.build(count, &mut rng)));
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [20u32, 200, 500] {
        let config = NeuronConfig {
            neuron_count: count,
            seed: Some(7),
            ..Default::default()
        };
        let mut sim = Simulation::new(config, SURFACE).expect("valid config");
        let mut surface = RecordingSurface::default();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| black_box(sim.tick(&mut surface)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_graph_build, bench_tick);
criterion_main!(benches);
