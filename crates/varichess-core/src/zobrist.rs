use std::sync::LazyLock;

use crate::constants::{CASTLING_RIGHT_NB, COLOR_NB, FILE_NB, MAX_CHECKS, MAX_HAND, PIECE_NB, SQUARE_NB};
use crate::types::{Color, Piece, Square};

const PSQ_KEYS: usize = PIECE_NB * SQUARE_NB;
const HAND_KEYS: usize = PIECE_NB * (MAX_HAND + 1);
const MATERIAL_KEYS: usize = PIECE_NB * SQUARE_NB;

static ZOBRIST_KEYS: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[derive(Debug, Clone)]
pub struct ZobristKeys {
    psq: Vec<u64>,
    hand: Vec<u64>,
    material: Vec<u64>,
    castling: [u64; CASTLING_RIGHT_NB],
    en_passant: [u64; FILE_NB],
    checks: [[u64; MAX_CHECKS]; COLOR_NB],
    side_to_move: u64,
    no_pawns: u64,
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    &ZOBRIST_KEYS
}

impl ZobristKeys {
    fn new() -> Self {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let psq = (0..PSQ_KEYS).map(|_| next_u64(&mut state)).collect();
        let hand = (0..HAND_KEYS).map(|_| next_u64(&mut state)).collect();
        let material = (0..MATERIAL_KEYS).map(|_| next_u64(&mut state)).collect();

        let mut castling = [0u64; CASTLING_RIGHT_NB];
        // Composite rights hash as the xor of their single-right keys.
        let singles: [u64; 4] = std::array::from_fn(|_| next_u64(&mut state));
        for (rights, key) in castling.iter_mut().enumerate() {
            for (bit, single) in singles.iter().enumerate() {
                if rights & (1 << bit) != 0 {
                    *key ^= single;
                }
            }
        }

        let en_passant = std::array::from_fn(|_| next_u64(&mut state));
        let checks = std::array::from_fn(|_| std::array::from_fn(|_| next_u64(&mut state)));

        Self {
            psq,
            hand,
            material,
            castling,
            en_passant,
            checks,
            side_to_move: next_u64(&mut state),
            no_pawns: next_u64(&mut state),
        }
    }

    pub fn psq(&self, piece: Piece, square: Square) -> u64 {
        self.psq[piece.index() * SQUARE_NB + square.index()]
    }

    /// Key toggled when the hand count of `piece` moves between `count` and `count + 1`.
    pub fn hand(&self, piece: Piece, count: usize) -> u64 {
        self.hand[piece.index() * (MAX_HAND + 1) + count.min(MAX_HAND)]
    }

    /// Key toggled when the on-board count of `piece` moves between `count` and `count + 1`.
    pub fn material(&self, piece: Piece, count: usize) -> u64 {
        self.material[piece.index() * SQUARE_NB + count.min(SQUARE_NB - 1)]
    }

    pub fn castling(&self, rights: u8) -> u64 {
        self.castling[usize::from(rights) & (CASTLING_RIGHT_NB - 1)]
    }

    pub fn en_passant(&self, file: u8) -> u64 {
        self.en_passant[usize::from(file)]
    }

    pub fn checks(&self, color: Color, remaining: usize) -> u64 {
        self.checks[color.index()][remaining.min(MAX_CHECKS - 1)]
    }

    pub const fn side_to_move(&self) -> u64 {
        self.side_to_move
    }

    pub const fn no_pawns(&self) -> u64 {
        self.no_pawns
    }
}

fn next_u64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    #[test]
    fn material_keys_do_not_alias_square_keys() {
        let keys = zobrist_keys();
        let rook = Piece::new(Color::White, PieceType::ROOK);
        for sq in [Square::new(0, 0), Square::new(1, 0), Square::new(7, 7)] {
            assert_ne!(keys.material(rook, sq.index()), keys.psq(rook, sq));
        }
        assert_ne!(keys.material(rook, 0), keys.material(rook, 1));
    }
}
