use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use smolgame::generation::utils;
use smolgame::{GenerationConfig, Generator, LevelGenerator, WalkGenerator};

fn bench_walk(c: &mut Criterion) {
    let mut group = c.benchmark_group("walk");
    for rooms in [5usize, 40, 135] {
        let mut config = GenerationConfig::new(7);
        config.room_pool = GenerationConfig::numbered_rooms(rooms);
        let walker = WalkGenerator::from_config(&config);

        group.bench_with_input(BenchmarkId::from_parameter(rooms), &rooms, |b, &rooms| {
            b.iter(|| {
                let mut rng = utils::create_rng(&config);
                walker.walk(black_box(0..rooms), &mut rng)
            })
        });
    }
    group.finish();
}

fn bench_level(c: &mut Criterion) {
    let generator = LevelGenerator::builtin().expect("built-in templates parse");
    let config = GenerationConfig::new(2024);

    c.bench_function("level_default_pool", |b| {
        b.iter(|| {
            let mut rng = utils::create_rng(&config);
            generator.generate(black_box(&config), &mut rng)
        })
    });
}

criterion_group!(benches, bench_walk, bench_level);
criterion_main!(benches);
