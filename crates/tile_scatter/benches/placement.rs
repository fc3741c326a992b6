mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tile_scatter::prelude::{
    blocks, run_rule_set, AcceptanceIndex, BlockMask, PlacementEngine, ProximityField, RuleSet,
    RunConfig,
};

fn bench_default_rules(c: &mut Criterion, size: u32) {
    let grid = common::island(size);
    let rules = RuleSet::with_defaults(42);
    let config = RunConfig::default();

    let mut group = c.benchmark_group(format!("placement/defaults/{size}"));
    // Preview a pass to report throughput as placements per iteration.
    let preview = run_rule_set(&rules, &grid, &config, 42).map_or(0, |r| r.placements.len());
    group.throughput(common::elements_throughput(preview));

    group.bench_function("run_rule_set", |b| {
        b.iter(|| {
            let result = run_rule_set(&rules, &grid, &config, black_box(42));
            black_box(result.map(|r| r.placements.len()).ok());
        });
    });

    group.bench_function("engine_cached_fields", |b| {
        let mut engine = PlacementEngine::new(config.clone(), &grid);
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            let result = engine.run(&rules, seed);
            black_box(result.candidates_scanned);
        });
    });

    #[cfg(feature = "parallel")]
    group.bench_function("run_rule_set_parallel", |b| {
        let parallel = config.clone().with_parallel(true);
        b.iter(|| {
            let result = run_rule_set(&rules, &grid, &parallel, black_box(42));
            black_box(result.map(|r| r.placements.len()).ok());
        });
    });

    group.finish();
}

fn bench_proximity_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement/proximity_field");
    let water = BlockMask::new(&blocks::WATER);

    for size in [256u32, 1024] {
        let grid = common::island(size);
        group.throughput(common::elements_throughput((size * size) as usize));
        group.bench_function(format!("build/{size}"), |b| {
            b.iter(|| {
                let field = ProximityField::build(&grid, &water);
                black_box(field.target_count());
            });
        });
    }

    group.finish();
}

fn bench_acceptance_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("placement/acceptance_index");
    let queries = 10_000usize;
    group.throughput(common::elements_throughput(queries));

    group.bench_function("record_and_query", |b| {
        b.iter_batched(
            || StdRng::seed_from_u64(0xD3ADB33F),
            |mut rng| {
                let mut index = AcceptanceIndex::for_min_distance(4.0);
                for _ in 0..queries {
                    let p = Vec2::new(
                        (rng.next_u32() % 1024) as f32,
                        (rng.next_u32() % 1024) as f32,
                    );
                    if index.is_clear(p, 4.0) {
                        index.record(p);
                    }
                }
                black_box(index.len());
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn placement_benches(c: &mut Criterion) {
    bench_default_rules(c, 256);
    bench_default_rules(c, 1024);
    bench_proximity_field(c);
    bench_acceptance_index(c);
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = placement_benches
}
criterion_main!(benches);
