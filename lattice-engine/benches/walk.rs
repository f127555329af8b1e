use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lattice_engine::presets::{Preset, DELAY_MAX_MS, DELAY_MIN_MS};
use lattice_engine::{Graph, Phase, Scheduler};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_step(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let graph = Preset::builtin("CUBOID")
        .expect("built-in preset")
        .seed_graph(&mut rng, DELAY_MIN_MS, DELAY_MAX_MS)
        .expect("seeded lattice");
    let mut scheduler = Scheduler::new(graph);
    let mut clock = 0.0;

    c.bench_function("step/cuboid", |b| {
        b.iter(|| {
            let step = scheduler.step(black_box(clock), &mut rng).expect("non-empty lattice");
            clock += step.wait_secs;
            black_box(step)
        })
    });
}

fn bench_register(c: &mut Criterion) {
    c.bench_function("register/64-pitches", |b| {
        b.iter(|| {
            let mut g = Graph::new();
            for pitch in 36..100u8 {
                g.register_node(Phase::Off, black_box(pitch), 500);
            }
            black_box(g.edge_count())
        })
    });
}

criterion_group!(benches, bench_step, bench_register);
criterion_main!(benches);
