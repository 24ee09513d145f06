use crate::movegen::{generate, GenType};
use crate::notation::move_to_uci;
use crate::position::Position;

/// Leaf count of the legal move tree below `pos`.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(pos, GenType::Legal);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for m in moves {
        pos.do_move(m);
        nodes += perft(pos, depth - 1);
        pos.take_back();
    }
    nodes
}

/// Per-move leaf counts at `depth`, in generation order.
pub fn divide(pos: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate(pos, GenType::Legal);
    let mut counts = Vec::with_capacity(moves.len());
    for m in moves {
        let name = move_to_uci(pos, m);
        pos.do_move(m);
        let nodes = perft(pos, depth.saturating_sub(1));
        pos.take_back();
        counts.push((name, nodes));
    }
    counts
}
