use criterion::{black_box, criterion_group, criterion_main, Criterion};
use varichess_core::{perft, variant, Position};

fn start(name: &str) -> Position {
    Position::new(variant(name).expect("known variant")).expect("valid start position")
}

fn perft_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.sample_size(10);

    for (name, depth) in [
        ("chess", 3),
        ("chess", 4),
        ("crazyhouse", 3),
        ("shogi", 3),
        ("xiangqi", 3),
        ("seirawan", 3),
    ] {
        let mut pos = start(name);
        group.bench_function(format!("{name}_depth_{depth}"), |b| {
            b.iter(|| perft(&mut pos, black_box(depth)))
        });
    }

    group.finish();
}

criterion_group!(benches, perft_benchmarks);
criterion_main!(benches);
