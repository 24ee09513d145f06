use std::sync::Arc;

use thiserror::Error;

use crate::attacks::{attacks_bb, attackers_to, slider_snipers};
use crate::bitboard::{adjacent_squares, aligned, between_bb, Bitboard, KING_DIRECTIONS};
use crate::board::Board;
use crate::constants::{CASTLING_RIGHT_NB, COLOR_NB, PIECE_TYPE_NB, SQUARE_NB};
use crate::fen::{format_fen, parse_fen, FenError};
use crate::movegen::{generate, GenType};
use crate::types::{
    castling_right, ChasingRule, Color, CountingRule, EnclosingRule, Move, MoveList, MoveType, Piece,
    PieceType, Square, WallingRule,
};
use crate::variant::Variant;
use crate::zobrist::zobrist_keys;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error("no move to unmake")]
    EmptyHistory,
    #[error("illegal move")]
    IllegalMove,
    #[error("null move while in check")]
    NullMoveInCheck,
    #[error("move does not match the last move made")]
    MoveMismatch,
}

/// Per-ply state that cannot be recovered from the board alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateInfo {
    pub castling_rights: u8,
    pub rule50: u32,
    pub plies_from_null: u32,
    pub counting_ply: u32,
    pub counting_limit: u32,
    pub ep_square: Option<Square>,
    pub checks_remaining: [usize; COLOR_NB],
    pub gates: [Bitboard; COLOR_NB],
    pub key: u64,
    pub checkers: Bitboard,
    pub blockers_for_king: [Bitboard; COLOR_NB],
    pub pinners: [Bitboard; COLOR_NB],
    pub check_squares: [Bitboard; PIECE_TYPE_NB],
    pub pseudo_royals: Bitboard,
    pub bikjang: bool,
    /// Enemy pieces newly chased by the last move.
    pub chased: Bitboard,
    pub captured: Piece,
    /// Distance to the previous occurrence of this position, negative once it occurred twice.
    pub repetition: i32,
    pub passed: bool,
}

impl Default for StateInfo {
    fn default() -> Self {
        Self {
            castling_rights: 0,
            rule50: 0,
            plies_from_null: 0,
            counting_ply: 0,
            counting_limit: 0,
            ep_square: None,
            checks_remaining: [0; COLOR_NB],
            gates: [Bitboard::EMPTY; COLOR_NB],
            key: 0,
            checkers: Bitboard::EMPTY,
            blockers_for_king: [Bitboard::EMPTY; COLOR_NB],
            pinners: [Bitboard::EMPTY; COLOR_NB],
            check_squares: [Bitboard::EMPTY; PIECE_TYPE_NB],
            pseudo_royals: Bitboard::EMPTY,
            bikjang: false,
            chased: Bitboard::EMPTY,
            captured: Piece::NONE,
            repetition: 0,
            passed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    pub state: StateInfo,
    pub board: Board,
}

/// What executing a move did besides moving the mover.
#[derive(Debug, Clone, Copy, Default)]
struct MoveEffects {
    captured: Piece,
    vacated: Bitboard,
}

#[derive(Debug, Clone)]
pub struct Position {
    var: Arc<Variant>,
    board: Board,
    side_to_move: Color,
    game_ply: u32,
    st: StateInfo,
    history: Vec<HistoryEntry>,
    castling_rook_square: [Option<Square>; CASTLING_RIGHT_NB],
    castling_king_square: [Option<Square>; COLOR_NB],
    castling_rights_mask: [u8; SQUARE_NB],
    castling_path: [Bitboard; CASTLING_RIGHT_NB],
    castling_king_path: [Bitboard; CASTLING_RIGHT_NB],
}

impl Position {
    /// The variant's starting position.
    pub fn new(var: Arc<Variant>) -> Result<Self, PositionError> {
        let fen = var.start_fen.clone();
        Self::from_fen(var, &fen)
    }

    pub fn from_fen(var: Arc<Variant>, fen: &str) -> Result<Self, PositionError> {
        let setup = parse_fen(&var, fen)?;
        let mut pos = Self {
            board: setup.board,
            side_to_move: setup.side_to_move,
            game_ply: setup.game_ply,
            st: StateInfo {
                rule50: setup.rule50,
                checks_remaining: setup.checks_remaining,
                gates: setup.gates,
                ..StateInfo::default()
            },
            history: Vec::new(),
            castling_rook_square: [None; CASTLING_RIGHT_NB],
            castling_king_square: [None; COLOR_NB],
            castling_rights_mask: [0; SQUARE_NB],
            castling_path: [Bitboard::EMPTY; CASTLING_RIGHT_NB],
            castling_king_path: [Bitboard::EMPTY; CASTLING_RIGHT_NB],
            var,
        };
        for (c, rook) in setup.castling_rooks {
            pos.set_castling_right(c, rook);
        }
        if let Some(ep) = setup.ep_square {
            let us = pos.side_to_move;
            let occupied = pos.board.occupied();
            let capturers = attacks_bb(&pos.var, &pos.board, !us, PieceType::PAWN, ep, occupied)
                & pos.board.pieces_cpt(us, PieceType::PAWN);
            if capturers.any() && pos.var.en_passant_region.contains(ep) {
                pos.st.ep_square = Some(ep);
            }
        }
        // With a counting limit the halfmove field carries the counting ply.
        if setup.counting_limit > 0 {
            pos.st.counting_limit = setup.counting_limit;
            pos.st.counting_ply = pos.st.rule50;
            pos.st.rule50 = 0;
        }
        pos.st.key = pos.compute_key();
        pos.set_check_info();
        Ok(pos)
    }

    fn set_castling_right(&mut self, c: Color, rook: Square) {
        let Some(king) = (self.board.pieces_cpt(c, self.var.castling_king_piece) & Bitboard::rank(rook.rank())).lsb()
        else {
            return;
        };
        let kingside = rook.file() > king.file();
        let cr = castling_right(c, kingside);
        self.st.castling_rights |= cr;
        self.castling_rights_mask[king.index()] |= cr;
        self.castling_rights_mask[rook.index()] |= cr;
        self.castling_rook_square[usize::from(cr)] = Some(rook);
        self.castling_king_square[c.index()] = Some(king);

        let (king_to, rook_to) = self.castling_targets(king, kingside);
        let king_path = between_bb(king, king_to) | king_to;
        self.castling_king_path[usize::from(cr)] = king_path;
        self.castling_path[usize::from(cr)] =
            (between_bb(rook, rook_to) | rook_to | king_path) & !(Bitboard::square(king) | rook);
    }

    fn castling_targets(&self, king: Square, kingside: bool) -> (Square, Square) {
        let (king_file, rook_file) = if kingside {
            (self.var.castling_kingside_file, self.var.castling_kingside_file - 1)
        } else {
            (self.var.castling_queenside_file, self.var.castling_queenside_file + 1)
        };
        (Square::new(king_file, king.rank()), Square::new(rook_file, king.rank()))
    }

    pub fn variant(&self) -> &Variant {
        &self.var
    }

    pub fn variant_arc(&self) -> &Arc<Variant> {
        &self.var
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn game_ply(&self) -> u32 {
        self.game_ply
    }

    pub fn fullmove_number(&self) -> u32 {
        1 + self.game_ply.saturating_sub(u32::from(self.side_to_move == Color::Black)) / 2
    }

    pub fn state(&self) -> &StateInfo {
        &self.st
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|e| e.mv)
    }

    pub fn rule50(&self) -> u32 {
        self.st.rule50
    }

    pub fn ep_square(&self) -> Option<Square> {
        self.st.ep_square
    }

    pub fn castling_rights(&self) -> u8 {
        self.st.castling_rights
    }

    pub fn castling_rook_square(&self, cr: u8) -> Option<Square> {
        self.castling_rook_square[usize::from(cr) & (CASTLING_RIGHT_NB - 1)]
    }

    pub fn castling_king_square(&self, c: Color) -> Option<Square> {
        self.castling_king_square[c.index()]
    }

    pub fn castling_rights_mask(&self, sq: Square) -> u8 {
        self.castling_rights_mask[sq.index()]
    }

    /// Squares that must be empty to castle with `cr`.
    pub fn castling_path(&self, cr: u8) -> Bitboard {
        self.castling_path[usize::from(cr) & (CASTLING_RIGHT_NB - 1)]
    }

    /// Squares the king crosses, destination included.
    pub fn castling_king_path(&self, cr: u8) -> Bitboard {
        self.castling_king_path[usize::from(cr) & (CASTLING_RIGHT_NB - 1)]
    }

    pub fn gates(&self, c: Color) -> Bitboard {
        self.st.gates[c.index()]
    }

    pub fn checks_remaining(&self) -> [usize; COLOR_NB] {
        self.st.checks_remaining
    }

    pub fn key(&self) -> u64 {
        self.st.key
    }

    pub fn checkers(&self) -> Bitboard {
        self.st.checkers
    }

    pub fn in_check(&self) -> bool {
        self.st.checkers.any()
    }

    pub fn blockers_for_king(&self, c: Color) -> Bitboard {
        self.st.blockers_for_king[c.index()]
    }

    pub fn pinners(&self, c: Color) -> Bitboard {
        self.st.pinners[c.index()]
    }

    /// Squares from which a piece of `pt` would check the side not to move.
    pub fn check_squares(&self, pt: PieceType) -> Bitboard {
        self.st.check_squares[pt.index()]
    }

    pub fn pseudo_royals(&self) -> Bitboard {
        self.st.pseudo_royals
    }

    pub fn counting_ply(&self) -> u32 {
        self.st.counting_ply
    }

    pub fn counting_limit_plies(&self) -> u32 {
        self.st.counting_limit
    }

    pub fn fen(&self) -> String {
        format_fen(self)
    }

    pub fn piece_on(&self, sq: Square) -> Piece {
        self.board.piece_on(sq)
    }

    pub fn is_capture(&self, m: Move) -> bool {
        match m.move_type() {
            MoveType::EnPassant => true,
            MoveType::Drop | MoveType::Castling => false,
            _ if m.is_pass() => false,
            _ => {
                let p = self.board.piece_on(m.to());
                p.is_piece() && p.color() != self.side_to_move
            }
        }
    }

    /// Legal moves in the current position.
    pub fn legal_moves(&self) -> MoveList {
        generate(self, GenType::Legal)
    }

    /// Zobrist key rebuilt from scratch.
    pub fn compute_key(&self) -> u64 {
        self.key_for(&self.board, &self.st, self.side_to_move)
    }

    fn key_for(&self, board: &Board, st: &StateInfo, stm: Color) -> u64 {
        let keys = zobrist_keys();
        let mut key = board.psq_key() ^ board.hand_key() ^ keys.castling(st.castling_rights);
        if let Some(ep) = st.ep_square {
            key ^= keys.en_passant(ep.file());
        }
        if stm == Color::Black {
            key ^= keys.side_to_move();
        }
        if self.var.check_counting {
            for c in Color::ALL {
                key ^= keys.checks(c, st.checks_remaining[c.index()]);
            }
        }
        key
    }

    /// Pseudo-royal pieces of `c` on `board`: the members of extinction types close to extinction.
    pub fn pseudo_royals_of(&self, board: &Board, c: Color) -> Bitboard {
        let var = &self.var;
        if !var.extinction_pseudo_royal {
            return Bitboard::EMPTY;
        }
        let mut royals = Bitboard::EMPTY;
        for pt in var.extinction_piece_types.iter() {
            if pt == PieceType::ALL_PIECES {
                if board.count_all(c) <= var.extinction_piece_count + 1 {
                    royals |= board.pieces_c(c);
                }
            } else if board.count(c, pt) <= var.extinction_piece_count + 1 {
                royals |= board.pieces_cpt(c, pt);
            }
        }
        royals
    }

    fn extinct_on_board(&self, board: &Board, c: Color) -> bool {
        let var = &self.var;
        var.extinction_piece_types.iter().any(|pt| {
            let count = if pt == PieceType::ALL_PIECES {
                board.count_all(c)
            } else {
                board.count(c, pt)
            };
            count <= var.extinction_piece_count
        })
    }

    /// Whether the royalty of `c` is attacked on `board`.
    fn royal_attacked(&self, board: &Board, c: Color) -> bool {
        !self.royal_checkers(board, c).is_empty()
    }

    fn royal_checkers(&self, board: &Board, c: Color) -> Bitboard {
        let var = &self.var;
        let occupied = board.occupied();
        if var.has_royal_king() {
            return match board.king_square(c) {
                Some(k) => attackers_to(var, board, k, occupied, !c),
                None => Bitboard::EMPTY,
            };
        }
        let royals = self.pseudo_royals_of(board, c);
        let theirs = self.pseudo_royals_of(board, !c);
        let mut checkers = Bitboard::EMPTY;
        for sq in royals {
            if var.blast_on_capture && (adjacent_squares(sq) & theirs).any() {
                continue;
            }
            checkers |= attackers_to(var, board, sq, occupied, !c);
        }
        checkers
    }

    /// Both royal kings on one file with nothing between them.
    pub fn kings_facing(&self, board: &Board) -> bool {
        match (board.king_square(Color::White), board.king_square(Color::Black)) {
            (Some(w), Some(b)) => w.file() == b.file() && (between_bb(w, b) & board.occupied()).is_empty(),
            _ => false,
        }
    }

    fn slider_blockers(&self, sliders_of: Color, s: Square) -> (Bitboard, Bitboard) {
        let mut blockers = Bitboard::EMPTY;
        let mut pinners = Bitboard::EMPTY;
        let occupied = self.board.occupied();
        let defender = self.board.piece_on(s).color();
        for sniper in slider_snipers(&self.var, &self.board, s, sliders_of) {
            let b = between_bb(s, sniper) & occupied;
            if b.any() && !b.more_than_one() {
                blockers |= b;
                if (b & self.board.pieces_c(defender)).any() {
                    pinners.set(sniper);
                }
            }
        }
        (blockers, pinners)
    }

    fn set_check_info(&mut self) {
        let us = self.side_to_move;
        let them = !us;
        self.st.checkers = self.royal_checkers(&self.board, us);
        for c in Color::ALL {
            let (blockers, pinners) = match self.board.king_square(c) {
                Some(k) if self.var.has_royal_king() => self.slider_blockers(!c, k),
                _ => (Bitboard::EMPTY, Bitboard::EMPTY),
            };
            self.st.blockers_for_king[c.index()] = blockers;
            self.st.pinners[(!c).index()] = pinners;
        }
        self.st.check_squares = [Bitboard::EMPTY; PIECE_TYPE_NB];
        if let Some(k) = self.board.king_square(them) {
            let occupied = self.board.occupied();
            for pt in self.var.tables().types.iter() {
                self.st.check_squares[pt.index()] = attacks_bb(&self.var, &self.board, them, pt, k, occupied);
            }
        }
        self.st.pseudo_royals =
            self.pseudo_royals_of(&self.board, Color::White) | self.pseudo_royals_of(&self.board, Color::Black);
        self.st.bikjang = self.var.bikjang_rule && self.kings_facing(&self.board);
    }

    fn capture_piece(&self, board: &mut Board, sq: Square, us: Color) -> Piece {
        let promoted = board.is_promoted(sq);
        let original = board.unpromoted_on(sq);
        let captured = board.remove_piece(sq);
        if self.var.captures_to_hand {
            let pt = if self.var.drop_loop || !promoted {
                captured.piece_type()
            } else if original.is_piece() {
                original.piece_type()
            } else {
                PieceType::PAWN
            };
            board.add_to_hand(us, pt);
        }
        captured
    }

    /// Executes `m` for `us` on `board`.
    fn apply_move(&self, board: &mut Board, gates: &mut [Bitboard; COLOR_NB], m: Move, us: Color) -> MoveEffects {
        let var = &*self.var;
        let them = !us;
        let from = m.from();
        let to = m.to();
        let mut fx = MoveEffects::default();

        match m.move_type() {
            MoveType::Drop => {
                board.remove_from_hand(us, m.in_hand_type());
                board.put_piece(Piece::new(us, m.dropped_type()), to);
                if m.dropped_type() != m.in_hand_type() {
                    board.set_promoted(to, Piece::new(us, m.in_hand_type()));
                }
            }
            MoveType::Special if m.is_pass() => {}
            MoveType::Castling => {
                let kingside = to.file() > from.file();
                let (king_to, rook_to) = self.castling_targets(from, kingside);
                let king = board.remove_piece(from);
                let rook = board.remove_piece(to);
                board.put_piece(king, king_to);
                board.put_piece(rook, rook_to);
                gates[us.index()].clear(to);
            }
            move_type => {
                let capture_sq = if move_type == MoveType::EnPassant {
                    Square::new(to.file(), from.rank())
                } else {
                    to
                };
                let target = board.piece_on(capture_sq);
                if capture_sq != from && target.is_piece() {
                    fx.captured = self.capture_piece(board, capture_sq, us);
                    fx.vacated.set(capture_sq);
                    gates[them.index()].clear(capture_sq);
                }
                board.move_piece(from, to);

                match move_type {
                    MoveType::Promotion => {
                        let pawn = board.remove_piece(to);
                        board.put_piece(Piece::new(us, m.promotion_type()), to);
                        board.set_promoted(to, pawn);
                    }
                    MoveType::PiecePromotion => {
                        let piece = board.remove_piece(to);
                        if let Some(pt) = var.promoted_type(piece.piece_type()) {
                            board.put_piece(Piece::new(us, pt), to);
                            board.set_promoted(to, piece);
                        } else {
                            board.put_piece(piece, to);
                        }
                    }
                    MoveType::PieceDemotion => {
                        let original = board.unpromoted_on(to);
                        let piece = board.remove_piece(to);
                        let pt = if original.is_piece() {
                            original.piece_type()
                        } else {
                            var.unpromoted_type(piece.piece_type()).unwrap_or(piece.piece_type())
                        };
                        board.put_piece(Piece::new(us, pt), to);
                    }
                    _ => {}
                }

                if fx.captured.is_piece() && var.blast_on_capture {
                    for sq in adjacent_squares(to) & board.occupied() & !board.walls() {
                        if !var.blast_immune_types.contains(board.piece_on(sq).piece_type()) {
                            board.remove_piece(sq);
                            fx.vacated.set(sq);
                        }
                    }
                    board.remove_piece(to);
                    fx.vacated.set(to);
                } else if fx.captured.is_piece()
                    && var.petrify_on_capture_types.contains(board.piece_on(to).piece_type())
                {
                    board.remove_piece(to);
                    board.put_wall(to);
                    fx.vacated.set(to);
                }
            }
        }

        if let (true, Some(gate)) = (m.is_gating(), m.gating_square()) {
            board.remove_from_hand(us, m.gating_type());
            board.put_piece(Piece::new(us, m.gating_type()), gate);
        }
        if !m.is_drop() {
            gates[us.index()].clear(from);
        }

        if var.flip_enclosed_pieces != EnclosingRule::None && board.piece_on(to).is_piece() {
            let mut flips = Bitboard::EMPTY;
            match var.flip_enclosed_pieces {
                EnclosingRule::Reversi => {
                    for dir in KING_DIRECTIONS {
                        let mut line = Bitboard::EMPTY;
                        let mut sq = to;
                        while let Some(next) = sq.offset(i32::from(dir.df), i32::from(dir.dr)) {
                            let p = board.piece_on(next);
                            if !var.board_bb.contains(next) || !p.is_piece() {
                                break;
                            }
                            if p.color() == us {
                                flips |= line;
                                break;
                            }
                            line.set(next);
                            sq = next;
                        }
                    }
                }
                EnclosingRule::Ataxx => flips = adjacent_squares(to) & board.pieces_c(them),
                EnclosingRule::None => {}
            }
            for sq in flips {
                let p = board.remove_piece(sq);
                board.put_piece(p.flip(), sq);
            }
        }

        if let Some(wall) = m.wall_square() {
            if var.walling_rule == WallingRule::Duck {
                for sq in board.walls() {
                    board.remove_wall(sq);
                }
            }
            board.put_wall(wall);
        }
        fx
    }

    /// Tests a pseudo-legal move for legality.
    pub fn legal(&self, m: Move) -> bool {
        let var = &*self.var;
        let us = self.side_to_move;
        let fast = var.simple_legality
            && var.tables().non_sliding_riders.is_empty()
            && !m.is_gating()
            && m.wall_square().is_none()
            && !(var.sittuyin_promotion && m.move_type() == MoveType::Promotion)
            && matches!(
                m.move_type(),
                MoveType::Normal | MoveType::Promotion | MoveType::PiecePromotion
            );
        if !fast {
            return self.legal_by_execution(m);
        }
        let Some(ksq) = self.board.king_square(us) else {
            return true;
        };
        let from = m.from();
        let to = m.to();
        if from == ksq {
            let occupied = self.board.occupied() ^ from;
            return (attackers_to(var, &self.board, to, occupied, !us) & !Bitboard::square(to)).is_empty();
        }
        if self.in_check() {
            if self.st.checkers.more_than_one() {
                return false;
            }
            let Some(checker) = self.st.checkers.lsb() else {
                return false;
            };
            if !(between_bb(ksq, checker) | checker).contains(to) {
                return false;
            }
        }
        !self.st.blockers_for_king[us.index()].contains(from) || aligned(from, to, ksq)
    }

    fn legal_by_execution(&self, m: Move) -> bool {
        let var = &*self.var;
        let us = self.side_to_move;
        let them = !us;
        let mut board = self.board.clone();
        let mut gates = self.st.gates;
        let facing_before = var.makpong_rule && self.kings_facing(&self.board);
        self.apply_move(&mut board, &mut gates, m, us);

        if var.has_royal_king() && self.board.king_square(us).is_some() {
            let Some(k) = board.king_square(us) else {
                return false;
            };
            if attackers_to(var, &board, k, board.occupied(), them).any() {
                return false;
            }
        }
        if (var.flying_general || facing_before) && self.kings_facing(&board) {
            return false;
        }
        if var.extinction_pseudo_royal {
            if !self.extinct_on_board(&self.board, us) && self.extinct_on_board(&board, us) {
                return false;
            }
            if self.extinct_on_board(&board, them) {
                return true;
            }
            if self.royal_attacked(&board, us) {
                return false;
            }
        }
        if !var.checking && self.royal_attacked(&board, them) {
            return false;
        }
        if var.sittuyin_promotion && m.move_type() == MoveType::Promotion && self.royal_attacked(&board, them) {
            return false;
        }
        if var.tsume_mode && us == Color::White && !self.royal_attacked(&board, them) {
            return false;
        }
        if var.shogi_pawn_drop_mate_illegal
            && m.is_drop()
            && matches!(m.dropped_type(), PieceType::SHOGI_PAWN | PieceType::PAWN)
            && self.royal_attacked(&board, them)
        {
            let mut next = self.clone();
            next.do_move(m);
            if next.legal_moves().is_empty() {
                return false;
            }
        }
        true
    }

    /// Whether `m` would attack the opponent's royalty.
    pub fn gives_check(&self, m: Move) -> bool {
        let mut board = self.board.clone();
        let mut gates = self.st.gates;
        self.apply_move(&mut board, &mut gates, m, self.side_to_move);
        self.royal_attacked(&board, !self.side_to_move)
    }

    /// Plays `m`, which must be legal.
    pub fn do_move(&mut self, m: Move) {
        let var = Arc::clone(&self.var);
        let us = self.side_to_move;
        let them = !us;
        debug_assert!(m.is_ok());

        let previous = self.st.clone();
        self.history.push(HistoryEntry {
            mv: m,
            state: previous.clone(),
            board: self.board.clone(),
        });

        let moved = if m.is_drop() || m.is_pass() {
            Piece::NONE
        } else {
            self.board.piece_on(m.from())
        };
        let chase_before = if var.chasing_rule != ChasingRule::None && moved.is_piece() {
            attacks_bb(&var, &self.board, us, moved.piece_type(), m.from(), self.board.occupied())
        } else {
            Bitboard::EMPTY
        };

        let mut board = std::mem::take(&mut self.board);
        let mut gates = self.st.gates;
        let fx = self.apply_move(&mut board, &mut gates, m, us);
        self.board = board;

        let st = &mut self.st;
        st.gates = gates;
        st.captured = fx.captured;
        st.passed = m.is_pass();
        st.rule50 += 1;
        st.plies_from_null += 1;
        if fx.captured.is_piece() || moved.piece_type() == PieceType::PAWN {
            st.rule50 = 0;
        }

        let mut touched = fx.vacated;
        if !m.is_drop() && !m.is_pass() {
            touched.set(m.from());
            touched.set(m.to());
        }
        for sq in touched {
            st.castling_rights &= !self.castling_rights_mask[sq.index()];
        }

        st.ep_square = None;
        if moved.piece_type() == PieceType::PAWN
            && m.move_type() == MoveType::Normal
            && m.from().file() == m.to().file()
            && m.from().rank().abs_diff(m.to().rank()) == 2
        {
            let ep = Square::new(m.from().file(), (m.from().rank() + m.to().rank()) / 2);
            let capturers = attacks_bb(&var, &self.board, us, PieceType::PAWN, ep, self.board.occupied())
                & self.board.pieces_cpt(them, PieceType::PAWN);
            if capturers.any() && var.en_passant_region.contains(ep) {
                self.st.ep_square = Some(ep);
            }
        }

        if var.check_counting && self.royal_attacked(&self.board, them) {
            let remaining = &mut self.st.checks_remaining[us.index()];
            *remaining = remaining.saturating_sub(1);
        }

        self.st.chased = Bitboard::EMPTY;
        if var.chasing_rule != ChasingRule::None && moved.is_piece() && !fx.vacated.contains(m.to()) {
            let now = self.board.piece_on(m.to());
            let attacks = attacks_bb(&var, &self.board, us, now.piece_type(), m.to(), self.board.occupied());
            let occupied = self.board.occupied();
            for sq in attacks & !chase_before & self.board.pieces_c(them) {
                let victim = self.board.piece_on(sq).piece_type();
                if victim == PieceType::KING {
                    continue;
                }
                let undefended = attackers_to(&var, &self.board, sq, occupied, them).is_empty();
                let chariot = victim == PieceType::ROOK
                    && matches!(
                        now.piece_type(),
                        PieceType::HORSE | PieceType::CANNON | PieceType::JANGGI_CANNON
                    );
                if undefended || chariot {
                    self.st.chased.set(sq);
                }
            }
        }

        self.side_to_move = them;
        self.game_ply += 1;

        if var.counting_rule != CountingRule::None {
            if self.st.counting_limit > 0 {
                self.st.counting_ply += 1;
            }
            let bare = self.board.count_all(them) == 1;
            let unset = self.st.counting_limit == 0;
            let pawnless = self.board.pieces_pt(PieceType::PAWN).is_empty();
            if ((unset || fx.captured.is_piece()) && bare) || (unset && pawnless) {
                self.st.counting_limit = self.counting_limit();
                self.st.counting_ply = self.initial_counting_ply();
            }
        }

        self.st.key = self.compute_key();
        self.set_check_info();
        self.st.repetition = self.find_repetition();
    }

    fn find_repetition(&self) -> i32 {
        let end = if self.var.captures_to_hand {
            self.st.plies_from_null
        } else {
            self.st.rule50.min(self.st.plies_from_null)
        } as usize;
        let n = self.history.len();
        let mut i = 4;
        while i <= end && i <= n {
            let earlier = &self.history[n - i].state;
            if earlier.key == self.st.key {
                return if earlier.repetition != 0 { -(i as i32) } else { i as i32 };
            }
            i += 2;
        }
        0
    }

    /// Takes back `m`, which must be the last move made.
    pub fn undo_move(&mut self, m: Move) -> Result<(), PositionError> {
        let last = self.history.last().ok_or(PositionError::EmptyHistory)?;
        if last.mv != m {
            return Err(PositionError::MoveMismatch);
        }
        self.take_back();
        Ok(())
    }

    /// Restores the state before the last move, if any.
    pub(crate) fn take_back(&mut self) {
        if let Some(entry) = self.history.pop() {
            self.board = entry.board;
            self.st = entry.state;
            self.side_to_move = !self.side_to_move;
            self.game_ply -= 1;
        }
    }

    /// Validates `m` against the legal moves before playing it.
    pub fn make_move(&mut self, m: Move) -> Result<(), PositionError> {
        if !self.legal_moves().contains(&m) {
            return Err(PositionError::IllegalMove);
        }
        self.do_move(m);
        Ok(())
    }

    pub fn do_null_move(&mut self) -> Result<(), PositionError> {
        if self.in_check() {
            return Err(PositionError::NullMoveInCheck);
        }
        self.history.push(HistoryEntry {
            mv: Move::NULL,
            state: self.st.clone(),
            board: self.board.clone(),
        });
        self.st.ep_square = None;
        self.st.rule50 += 1;
        self.st.plies_from_null = 0;
        self.st.captured = Piece::NONE;
        self.st.chased = Bitboard::EMPTY;
        self.st.passed = false;
        self.side_to_move = !self.side_to_move;
        self.game_ply += 1;
        self.st.key = self.compute_key();
        self.set_check_info();
        self.st.repetition = 0;
        Ok(())
    }

    pub fn undo_null_move(&mut self) -> Result<(), PositionError> {
        self.undo_move(Move::NULL)
    }

    /// Counting limit in plies for the side to move, zero when counting does not apply.
    pub fn counting_limit(&self) -> u32 {
        let board = &self.board;
        let us = self.side_to_move;
        let them = !us;
        let bare = board.count_all(us) == 1;
        if board.pieces_pt(PieceType::PAWN).any() && !bare {
            return 0;
        }
        let moves = match self.var.counting_rule {
            CountingRule::None => 0,
            CountingRule::Makruk | CountingRule::Cambodian => {
                if !bare {
                    64
                } else if board.count(them, PieceType::ROOK) > 1 {
                    8
                } else if board.count(them, PieceType::ROOK) == 1 {
                    16
                } else if board.count(them, PieceType::KHON) > 1 {
                    22
                } else if board.count(them, PieceType::KNIGHT) > 1 {
                    32
                } else if board.count(them, PieceType::KHON) == 1 {
                    44
                } else {
                    64
                }
            }
            CountingRule::Asean => {
                let met = board.count(them, PieceType::MET) > 0;
                if !bare {
                    0
                } else if board.count(them, PieceType::ROOK) > 0 {
                    16
                } else if board.count(them, PieceType::KHON) > 0 && met {
                    44
                } else if board.count(them, PieceType::KNIGHT) > 0 && met {
                    64
                } else {
                    0
                }
            }
        };
        2 * moves
    }

    /// Counting ply a fresh count starts from; only a bare side to move counts by honour.
    fn initial_counting_ply(&self) -> u32 {
        if self.st.counting_limit == 0 || self.board.count_all(self.side_to_move) != 1 {
            return 0;
        }
        let pieces = (self.board.count_all(Color::White) + self.board.count_all(Color::Black)) as u32;
        match self.var.counting_rule {
            CountingRule::Cambodian => 2 * pieces + 2,
            _ => 2 * pieces,
        }
    }
}
