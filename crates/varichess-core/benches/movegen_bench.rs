use criterion::{black_box, criterion_group, criterion_main, Criterion};
use varichess_core::{generate, variant, GenType, Position};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn movegen_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");
    group.sample_size(100);

    let kiwipete = Position::from_fen(variant("chess").expect("chess"), KIWIPETE).expect("parse");
    group.bench_function("kiwipete_legal", |b| {
        b.iter(|| generate(black_box(&kiwipete), GenType::Legal))
    });

    let crazyhouse = Position::from_fen(
        variant("crazyhouse").expect("crazyhouse"),
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R[Bn] w KQkq - 0 4",
    )
    .expect("parse");
    group.bench_function("crazyhouse_drops", |b| {
        b.iter(|| generate(black_box(&crazyhouse), GenType::Legal))
    });

    for name in ["shogi", "xiangqi", "janggi", "duck"] {
        let pos = Position::new(variant(name).expect("known variant")).expect("start position");
        group.bench_function(format!("{name}_start"), |b| {
            b.iter(|| generate(black_box(&pos), GenType::Legal))
        });
    }

    group.finish();
}

criterion_group!(benches, movegen_benchmarks);
criterion_main!(benches);
