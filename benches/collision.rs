//! Collision detection and tick throughput benchmarks
//!
//! Compares the bucketed detector with the naive scan and measures full
//! ticks at several bot counts.
//!
//! Run with: cargo bench --bench collision

use agar_engine::game::collision::{solve_naive, Collider, CollisionDetector};
use agar_engine::game::constants::timing::DT;
use agar_engine::{Engine, GameConfig, HungryBot};
use agar_engine::util::vec2::Vec2;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Random cells and pellets spread over the default arena
fn random_colliders(cells: usize, pellets: usize) -> (Vec<Collider>, Vec<Collider>) {
    let mut rng = Pcg64::seed_from_u64(7);
    let position = |rng: &mut Pcg64| Vec2::new(rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0));

    let queries = (0..cells)
        .map(|i| Collider {
            owner: Some(i as u32),
            position: position(&mut rng),
            mass: rng.gen_range(10..2000),
        })
        .collect();
    let gallery = (0..pellets)
        .map(|_| Collider {
            owner: None,
            position: position(&mut rng),
            mass: 1,
        })
        .collect();
    (queries, gallery)
}

fn bench_detector(c: &mut Criterion) {
    let mut group = c.benchmark_group("collision");
    let detector = CollisionDetector::new(500.0, 10);

    for count in [64, 256, 1024] {
        let (queries, gallery) = random_colliders(count, count * 4);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("grid", count), &count, |b, _| {
            b.iter(|| black_box(detector.solve(&queries, &gallery)));
        });

        group.bench_with_input(BenchmarkId::new("naive", count), &count, |b, _| {
            b.iter(|| black_box(solve_naive(&queries, &gallery)));
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for bots in [8, 32, 128] {
        let mut engine = Engine::new(GameConfig::default()).expect("default config is valid");
        for i in 0..bots {
            engine.add_bot(format!("bot{}", i), Box::new(HungryBot));
        }
        // Let the arena settle before measuring
        engine.step(60, DT);

        group.throughput(Throughput::Elements(bots as u64));
        group.bench_with_input(BenchmarkId::from_parameter(bots), &bots, |b, _| {
            b.iter(|| engine.tick(black_box(DT)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detector, bench_tick);
criterion_main!(benches);
