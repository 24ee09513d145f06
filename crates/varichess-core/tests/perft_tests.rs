use serde::Deserialize;
use varichess_core::{divide, perft, variant, Position};

#[derive(Debug, Deserialize)]
struct PerftBaseline {
    variant: String,
    fen: Option<String>,
    depth: u32,
    nodes: u64,
}

const QUICK_NODE_LIMIT: u64 = 100_000;

fn load_baselines() -> Vec<PerftBaseline> {
    let fixture_path = format!(
        "{}/tests/fixtures/perft_baselines.json",
        env!("CARGO_MANIFEST_DIR")
    );
    let fixture = std::fs::read_to_string(fixture_path).expect("read fixture");
    serde_json::from_str(&fixture).expect("parse fixture")
}

fn position_for(baseline: &PerftBaseline) -> Position {
    let var = variant(&baseline.variant).expect("known variant");
    match &baseline.fen {
        Some(fen) => Position::from_fen(var, fen).expect("valid fen"),
        None => Position::new(var).expect("valid start position"),
    }
}

fn check(baselines: impl Iterator<Item = PerftBaseline>) {
    for baseline in baselines {
        let mut pos = position_for(&baseline);
        let actual = perft(&mut pos, baseline.depth);
        assert_eq!(
            actual, baseline.nodes,
            "perft mismatch: variant={}, fen={:?}, depth={}",
            baseline.variant, baseline.fen, baseline.depth
        );
    }
}

#[test]
fn perft_matches_quick_baselines() {
    check(
        load_baselines()
            .into_iter()
            .filter(|b| b.nodes <= QUICK_NODE_LIMIT),
    );
}

#[test]
#[ignore = "deep perft, run with --ignored in release mode"]
fn perft_matches_deep_baselines() {
    check(
        load_baselines()
            .into_iter()
            .filter(|b| b.nodes > QUICK_NODE_LIMIT),
    );
}

#[test]
fn perft_leaves_position_unchanged() {
    let mut pos = Position::new(variant("crazyhouse").unwrap()).unwrap();
    let fen = pos.fen();
    let key = pos.key();
    perft(&mut pos, 3);
    assert_eq!(pos.fen(), fen);
    assert_eq!(pos.key(), key);
    assert!(pos.history().is_empty());
}

#[test]
fn divide_sums_to_perft() {
    let mut pos = Position::new(variant("chess").unwrap()).unwrap();
    let split = divide(&mut pos, 3);
    assert_eq!(split.len(), 20);
    assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), 8902);
    let e2e4 = split.iter().find(|(m, _)| m == "e2e4").unwrap();
    assert_eq!(e2e4.1, 600);
}

#[test]
fn perft_depth_zero_counts_the_root() {
    let mut pos = Position::new(variant("shogi").unwrap()).unwrap();
    assert_eq!(perft(&mut pos, 0), 1);
}
