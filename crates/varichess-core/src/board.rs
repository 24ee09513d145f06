use crate::bitboard::Bitboard;
use crate::constants::{COLOR_NB, PIECE_NB, PIECE_TYPE_NB, SQUARE_NB};
use crate::types::{Color, Piece, PieceType, Square};
use crate::zobrist::zobrist_keys;

/// Piece placement, walls and hands, with incrementally kept hash keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    squares: [Piece; SQUARE_NB],
    unpromoted: [Piece; SQUARE_NB],
    by_type: [Bitboard; PIECE_TYPE_NB],
    by_color: [Bitboard; COLOR_NB],
    walls: Bitboard,
    promoted: Bitboard,
    piece_count: [u8; PIECE_NB],
    hand: [[u8; PIECE_TYPE_NB]; COLOR_NB],
    psq_key: u64,
    pawn_key: u64,
    material_key: u64,
    hand_key: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            squares: [Piece::NONE; SQUARE_NB],
            unpromoted: [Piece::NONE; SQUARE_NB],
            by_type: [Bitboard::EMPTY; PIECE_TYPE_NB],
            by_color: [Bitboard::EMPTY; COLOR_NB],
            walls: Bitboard::EMPTY,
            promoted: Bitboard::EMPTY,
            piece_count: [0; PIECE_NB],
            hand: [[0; PIECE_TYPE_NB]; COLOR_NB],
            psq_key: 0,
            pawn_key: zobrist_keys().no_pawns(),
            material_key: 0,
            hand_key: 0,
        }
    }

    pub fn piece_on(&self, sq: Square) -> Piece {
        self.squares[sq.index()]
    }

    pub fn is_empty(&self, sq: Square) -> bool {
        self.squares[sq.index()].is_none()
    }

    /// Every occupied square, walls included.
    pub fn occupied(&self) -> Bitboard {
        self.by_type[PieceType::ALL_PIECES.index()]
    }

    pub fn pieces_c(&self, c: Color) -> Bitboard {
        self.by_color[c.index()]
    }

    pub fn pieces_pt(&self, pt: PieceType) -> Bitboard {
        self.by_type[pt.index()]
    }

    pub fn pieces_cpt(&self, c: Color, pt: PieceType) -> Bitboard {
        self.by_color[c.index()] & self.by_type[pt.index()]
    }

    pub fn walls(&self) -> Bitboard {
        self.walls
    }

    pub fn promoted(&self) -> Bitboard {
        self.promoted
    }

    pub fn is_promoted(&self, sq: Square) -> bool {
        self.promoted.contains(sq)
    }

    /// The piece a promoted piece on `sq` reverts to, `Piece::NONE` if unknown.
    pub fn unpromoted_on(&self, sq: Square) -> Piece {
        self.unpromoted[sq.index()]
    }

    pub fn count(&self, c: Color, pt: PieceType) -> usize {
        usize::from(self.piece_count[Piece::new(c, pt).index()])
    }

    /// Pieces of `c` on the board.
    pub fn count_all(&self, c: Color) -> usize {
        usize::from(self.piece_count[Piece::new(c, PieceType::ALL_PIECES).index()])
    }

    pub fn king_square(&self, c: Color) -> Option<Square> {
        self.pieces_cpt(c, PieceType::KING).lsb()
    }

    pub fn in_hand(&self, c: Color, pt: PieceType) -> usize {
        usize::from(self.hand[c.index()][pt.index()])
    }

    pub fn hand_total(&self, c: Color) -> usize {
        self.hand[c.index()].iter().map(|&n| usize::from(n)).sum()
    }

    pub fn hand_types(&self, c: Color) -> impl Iterator<Item = PieceType> + '_ {
        (1..PIECE_TYPE_NB)
            .filter(move |&i| self.hand[c.index()][i] > 0)
            .map(|i| PieceType(i as u8))
    }

    pub fn psq_key(&self) -> u64 {
        self.psq_key
    }

    pub fn pawn_key(&self) -> u64 {
        self.pawn_key
    }

    pub fn material_key(&self) -> u64 {
        self.material_key
    }

    pub fn hand_key(&self) -> u64 {
        self.hand_key
    }

    pub fn put_piece(&mut self, piece: Piece, sq: Square) {
        debug_assert!(piece.is_piece());
        debug_assert!(self.is_empty(sq));
        let keys = zobrist_keys();
        let c = piece.color();
        self.squares[sq.index()] = piece;
        self.by_type[PieceType::ALL_PIECES.index()].set(sq);
        self.by_type[piece.piece_type().index()].set(sq);
        self.by_color[c.index()].set(sq);

        let count = usize::from(self.piece_count[piece.index()]);
        self.material_key ^= keys.material(piece, count);
        self.piece_count[piece.index()] += 1;
        self.piece_count[Piece::new(c, PieceType::ALL_PIECES).index()] += 1;

        self.psq_key ^= keys.psq(piece, sq);
        if piece.piece_type() == PieceType::PAWN {
            self.pawn_key ^= keys.psq(piece, sq);
        }
    }

    pub fn remove_piece(&mut self, sq: Square) -> Piece {
        let piece = self.squares[sq.index()];
        debug_assert!(piece.is_piece());
        let keys = zobrist_keys();
        let c = piece.color();
        self.squares[sq.index()] = Piece::NONE;
        self.unpromoted[sq.index()] = Piece::NONE;
        self.promoted.clear(sq);
        self.by_type[PieceType::ALL_PIECES.index()].clear(sq);
        self.by_type[piece.piece_type().index()].clear(sq);
        self.by_color[c.index()].clear(sq);

        self.piece_count[piece.index()] -= 1;
        self.piece_count[Piece::new(c, PieceType::ALL_PIECES).index()] -= 1;
        self.material_key ^= keys.material(piece, usize::from(self.piece_count[piece.index()]));

        self.psq_key ^= keys.psq(piece, sq);
        if piece.piece_type() == PieceType::PAWN {
            self.pawn_key ^= keys.psq(piece, sq);
        }
        piece
    }

    /// Moves the piece with its promotion record.
    pub fn move_piece(&mut self, from: Square, to: Square) {
        let promoted = self.is_promoted(from);
        let unpromoted = self.unpromoted_on(from);
        let piece = self.remove_piece(from);
        self.put_piece(piece, to);
        if promoted {
            self.set_promoted(to, unpromoted);
        }
    }

    /// Marks the piece on `sq` as promoted from `unpromoted` (`Piece::NONE` if unknown).
    pub fn set_promoted(&mut self, sq: Square, unpromoted: Piece) {
        self.promoted.set(sq);
        self.unpromoted[sq.index()] = unpromoted;
    }

    pub fn clear_promoted(&mut self, sq: Square) {
        self.promoted.clear(sq);
        self.unpromoted[sq.index()] = Piece::NONE;
    }

    pub fn put_wall(&mut self, sq: Square) {
        debug_assert!(self.is_empty(sq));
        self.squares[sq.index()] = Piece::WALL;
        self.walls.set(sq);
        self.by_type[PieceType::ALL_PIECES.index()].set(sq);
        self.psq_key ^= zobrist_keys().psq(Piece::WALL, sq);
    }

    pub fn remove_wall(&mut self, sq: Square) {
        debug_assert!(self.walls.contains(sq));
        self.squares[sq.index()] = Piece::NONE;
        self.walls.clear(sq);
        self.by_type[PieceType::ALL_PIECES.index()].clear(sq);
        self.psq_key ^= zobrist_keys().psq(Piece::WALL, sq);
    }

    pub fn add_to_hand(&mut self, c: Color, pt: PieceType) {
        let count = &mut self.hand[c.index()][pt.index()];
        self.hand_key ^= zobrist_keys().hand(Piece::new(c, pt), usize::from(*count));
        *count = count.saturating_add(1);
    }

    pub fn remove_from_hand(&mut self, c: Color, pt: PieceType) {
        let count = &mut self.hand[c.index()][pt.index()];
        debug_assert!(*count > 0);
        *count = count.saturating_sub(1);
        self.hand_key ^= zobrist_keys().hand(Piece::new(c, pt), usize::from(*count));
    }

    /// All four keys rebuilt from scratch; matches the incremental ones.
    pub fn compute_keys(&self) -> (u64, u64, u64, u64) {
        let keys = zobrist_keys();
        let mut psq = 0u64;
        let mut pawn = keys.no_pawns();
        let mut material = 0u64;
        let mut hand = 0u64;
        for sq in self.occupied() {
            let piece = self.piece_on(sq);
            psq ^= keys.psq(piece, sq);
            if piece.is_piece() && piece.piece_type() == PieceType::PAWN {
                pawn ^= keys.psq(piece, sq);
            }
        }
        for c in Color::ALL {
            for i in 1..PIECE_TYPE_NB {
                let piece = Piece::new(c, PieceType(i as u8));
                for n in 0..usize::from(self.piece_count[piece.index()]) {
                    material ^= keys.material(piece, n);
                }
                for n in 0..usize::from(self.hand[c.index()][i]) {
                    hand ^= keys.hand(piece, n);
                }
            }
        }
        (psq, pawn, material, hand)
    }
}
