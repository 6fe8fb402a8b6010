mod common;

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use yarn_spin::prelude::{
    generate_flyaways, FlyawayContext, GenerateConfig, LevelBuilder, Preset, YarnGenerator,
};

fn level_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation/levels");

    for preset in [Preset::Light, Preset::Orange, Preset::GreyThick4Level] {
        let record = preset.record();
        group.throughput(common::elements_throughput(record.fiber.vertex_count()));

        let builder = LevelBuilder::new();
        let mut rng = StdRng::seed_from_u64(0x5EED);
        group.bench_with_input(
            BenchmarkId::from_parameter(preset.name()),
            &record,
            |b, record| {
                b.iter(|| black_box(builder.build(&record.fiber, &mut rng).vertex_count()));
            },
        );
    }

    group.finish();
}

fn flyaway_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation/flyaways");

    let record = Preset::Light.record();
    let yarn = LevelBuilder::new().build(&record.fiber, &mut StdRng::seed_from_u64(1));
    let ctx = FlyawayContext::from_level(&record.fiber);
    group.throughput(common::elements_throughput(
        record.flyaways.target_count(ctx.fiber_length),
    ));

    let mut seed = 0u64;
    group.bench_function("light", |b| {
        b.iter_batched(
            || {
                seed += 1;
                StdRng::seed_from_u64(seed)
            },
            |mut rng| black_box(generate_flyaways(&yarn, &record.flyaways, &ctx, &mut rng).len()),
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

fn end_to_end_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("generation/end_to_end");
    let record = Preset::LightRose.record();
    let generator = YarnGenerator::new(GenerateConfig::new(42));

    group.bench_function("light_rose", |b| {
        b.iter(|| {
            let out = generator.generate(&record);
            black_box(out.map(|y| y.yarn.vertex_count()).unwrap_or(0))
        });
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = common::default_criterion();
    targets = level_benches, flyaway_benches, end_to_end_benches
}
criterion_main!(benches);
