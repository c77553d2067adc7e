// World generation and flood benchmarks.
//
// - `contents_disk_r10`: ContentsFactory over every node within 10 hops.
// - `prewarm_disk_r10`:  the same disk through `WorldGen::prewarm` (rayon).
// - `allocate_walk`:     a fresh game plus a 20-node eastward walk, which
//                        exercises the fog/reachability floods per step.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use skilltree_sim::config::{DEFAULT_SEED, GameConfig};
use skilltree_sim::contents::ContentsFactory;
use skilltree_sim::hex::HexTopology;
use skilltree_sim::pathfinding::{no_obstacles, within_distance};
use skilltree_sim::session::GameSession;
use skilltree_sim::types::HexCoord;
use skilltree_sim::world_gen::WorldGen;

fn disk(radius: u32) -> Vec<HexCoord> {
    within_distance(
        &HexTopology::default(),
        &[HexCoord::ORIGIN],
        Some(radius),
        0,
        no_obstacles,
    )
}

fn bench_contents(c: &mut Criterion) {
    let config = GameConfig::default();
    let factory = ContentsFactory::new(config.contents.clone());
    let nodes = disk(10);
    c.bench_function("contents_disk_r10", |b| {
        b.iter(|| {
            for &n in &nodes {
                black_box(factory.create(DEFAULT_SEED, n));
            }
        })
    });
}

fn bench_prewarm(c: &mut Criterion) {
    let config = GameConfig::default();
    let nodes = disk(10);
    c.bench_function("prewarm_disk_r10", |b| {
        b.iter(|| {
            let world = WorldGen::new(DEFAULT_SEED, &config);
            world.prewarm(&nodes);
            black_box(world.generated_len())
        })
    });
}

fn bench_allocate_walk(c: &mut Criterion) {
    let mut config = GameConfig::default();
    config.locks.frequency = 0.0;
    config.locks.starter_area_frequency = 0.0;
    c.bench_function("allocate_walk", |b| {
        b.iter(|| {
            let mut session = GameSession::new(DEFAULT_SEED, config.clone());
            for x in 1..=20 {
                session.allocate(HexCoord::new(x, 0, 0));
                session.tick();
            }
            black_box(session.state().save.taken_count())
        })
    });
}

criterion_group!(benches, bench_contents, bench_prewarm, bench_allocate_walk);
criterion_main!(benches);
