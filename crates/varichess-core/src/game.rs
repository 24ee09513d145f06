use std::sync::Arc;

use crate::bitboard::{adjacent_squares, Bitboard};
use crate::board::Board;
use crate::movegen::{generate, GenType};
use crate::notation::{parse_uci, NotationError};
use crate::position::{HistoryEntry, Position, PositionError, StateInfo};
use crate::types::{ChasingRule, Color, MaterialCounting, Move, MoveList, MoveType, PieceType, Value};
use crate::variant::Variant;

// Janggi piece values, doubled so the half-point komi stays integral.
const JANGGI_WEIGHTS: [(PieceType, i32); 6] = [
    (PieceType::ROOK, 26),
    (PieceType::JANGGI_CANNON, 14),
    (PieceType::HORSE, 10),
    (PieceType::JANGGI_ELEPHANT, 6),
    (PieceType::WAZIR, 6),
    (PieceType::SOLDIER, 4),
];
const JANGGI_KOMI: i32 = 3;

fn count_with_hand(board: &Board, c: Color, pt: PieceType) -> usize {
    if pt == PieceType::ALL_PIECES {
        board.count_all(c) + board.hand_total(c)
    } else {
        board.count(c, pt) + board.in_hand(c, pt)
    }
}

fn connected(pieces: Bitboard, n: usize, df: i32, dr: i32) -> bool {
    let mut line = pieces;
    for _ in 1..n {
        line = pieces & line.shift(-df, -dr);
    }
    line.any()
}

impl Position {
    /// States from the current one backwards, `j` plies ago at index `j`.
    fn state_back(&self, j: usize) -> Option<&StateInfo> {
        if j == 0 {
            return Some(self.state());
        }
        let history = self.history();
        history.len().checked_sub(j).map(|i| &history[i].state)
    }

    fn flag_reached(&self, c: Color) -> bool {
        let var = self.variant();
        let Some(flag) = var.flag_piece else {
            return false;
        };
        let on_flag = self.board().pieces_cpt(c, flag) & var.flag_region[c.index()];
        on_flag.count() as usize >= var.flag_piece_count
    }

    fn bare(&self, c: Color) -> bool {
        let board = self.board();
        board.count_all(c) == board.count(c, PieceType::KING) && board.hand_total(c) == 0
    }

    fn connects(&self, c: Color) -> bool {
        let var = self.variant();
        let pieces = self.board().pieces_c(c);
        if var.connect_n > 0 {
            let mut directions = Vec::new();
            if var.connect_horizontal {
                directions.push((1, 0));
            }
            if var.connect_vertical {
                directions.push((0, 1));
            }
            if var.connect_diagonal {
                directions.push((1, 1));
                directions.push((1, -1));
            }
            if directions.into_iter().any(|(df, dr)| connected(pieces, var.connect_n, df, dr)) {
                return true;
            }
        }
        let start = var.connect_region1[c.index()];
        let goal = var.connect_region2[c.index()];
        if start.is_empty() || goal.is_empty() {
            return false;
        }
        let mut reached = pieces & start;
        loop {
            if (reached & goal).any() {
                return true;
            }
            let grown = reached.into_iter().fold(reached, |acc, sq| acc | (adjacent_squares(sq) & pieces));
            if grown == reached {
                return false;
            }
            reached = grown;
        }
    }

    /// Score of a finished game decided on material, for the side to move.
    pub fn material_counting_result(&self) -> Value {
        let us = self.side_to_move();
        let board = self.board();
        let score = |c: Color| -> i32 {
            match self.variant().material_counting {
                MaterialCounting::Janggi => {
                    let material: i32 = JANGGI_WEIGHTS
                        .iter()
                        .map(|&(pt, w)| w * board.count(c, pt) as i32)
                        .sum();
                    material + if c == Color::Black { JANGGI_KOMI } else { 0 }
                }
                MaterialCounting::Unweighted => board.count_all(c) as i32,
                _ => 0,
            }
        };
        let result = match self.variant().material_counting {
            MaterialCounting::None => return Value::DRAW,
            MaterialCounting::WhiteDrawOdds => Value::MATE,
            MaterialCounting::BlackDrawOdds => -Value::MATE,
            MaterialCounting::Janggi | MaterialCounting::Unweighted => {
                return match score(us).cmp(&score(!us)) {
                    std::cmp::Ordering::Greater => Value::MATE,
                    std::cmp::Ordering::Less => -Value::MATE,
                    std::cmp::Ordering::Equal => Value::DRAW,
                };
            }
        };
        if us == Color::White {
            result
        } else {
            -result
        }
    }

    /// Game end that does not depend on the legal moves, for the side to move,
    /// with mate scores counted from `ply`.
    pub fn is_immediate_game_end(&self, ply: i32) -> Option<Value> {
        self.immediate_game_end().map(|v| v.convert_mate(ply))
    }

    fn immediate_game_end(&self) -> Option<Value> {
        let var = self.variant();
        let board = self.board();
        let us = self.side_to_move();
        let them = !us;

        if var.flag_piece.is_some() {
            let ours = self.flag_reached(us);
            let theirs = self.flag_reached(them);
            if ours && theirs {
                return Some(Value::DRAW);
            }
            if theirs && !(var.flag_move && them == Color::White) {
                return Some(-Value::MATE);
            }
            if ours && var.flag_move && us == Color::White {
                return Some(Value::MATE);
            }
        }

        if let Some(value) = var.extinction_value {
            for c in [them, us] {
                for pt in var.extinction_piece_types.iter() {
                    let claim = usize::from(var.extinction_claim && c == us);
                    if count_with_hand(board, c, pt) <= var.extinction_piece_count
                        && count_with_hand(board, !c, pt) >= var.extinction_opponent_piece_count + claim
                    {
                        return Some(if c == us { value } else { -value });
                    }
                }
            }
        }

        if let Some(value) = var.bare_king_value {
            match (self.bare(us), self.bare(them)) {
                (true, true) => return Some(Value::DRAW),
                (true, false) if !var.bare_king_move => return Some(value),
                (false, true) => return Some(-value),
                _ => {}
            }
        }

        if var.check_counting && self.checks_remaining()[them.index()] == 0 {
            return Some(-Value::MATE);
        }

        if self.connects(them) {
            return Some(-Value::MATE);
        }

        // A full board is adjudicated on material.
        if var.material_counting != MaterialCounting::None
            && var.piece_drops
            && (var.board_bb & !board.occupied()).is_empty()
        {
            return Some(self.material_counting_result());
        }

        let previous = self.history().last().map(|e| &e.state);
        if let Some(previous) = previous {
            let st = self.state();
            if (st.passed && previous.passed) || (st.bikjang && previous.bikjang) {
                return Some(self.material_counting_result());
            }
        }
        None
    }

    fn cycle_breaker(&self, distance: usize, marker: impl Fn(&StateInfo) -> bool) -> Option<Value> {
        // Even offsets follow the opponent's moves, odd ones ours.
        let all_marked = |parity: usize| {
            (0..distance)
                .filter(|j| j % 2 == parity)
                .all(|j| self.state_back(j).is_some_and(&marker))
        };
        match (all_marked(0), all_marked(1)) {
            (true, false) => Some(Value::MATE),
            (false, true) => Some(-Value::MATE),
            _ => None,
        }
    }

    /// Claimable game end, for the side to move, with mate scores counted from `ply`.
    pub fn is_optional_game_end(&self, ply: i32) -> Option<Value> {
        self.optional_game_end().map(|v| v.convert_mate(ply))
    }

    fn optional_game_end(&self) -> Option<Value> {
        let var = self.variant();
        let st = self.state();
        let us = self.side_to_move();

        if var.n_move_rule > 0
            && st.rule50 >= 2 * var.n_move_rule
            && (!self.in_check() || !self.legal_moves().is_empty())
        {
            return Some(if var.material_counting == MaterialCounting::None {
                Value::DRAW
            } else {
                self.material_counting_result()
            });
        }

        if var.n_fold_rule > 0 {
            let end = if var.captures_to_hand {
                st.plies_from_null
            } else {
                st.rule50.min(st.plies_from_null)
            } as usize;
            let mut count = 0;
            let mut first = None;
            let mut j = 4;
            while j <= end {
                match self.state_back(j) {
                    Some(earlier) if earlier.key == st.key => {
                        count += 1;
                        first.get_or_insert(j);
                    }
                    Some(_) => {}
                    None => break,
                }
                j += 2;
            }
            if let Some(distance) = first.filter(|_| count + 1 >= var.n_fold_rule as usize) {
                if var.perpetual_check_illegal {
                    if let Some(v) = self.cycle_breaker(distance, |s| s.checkers.any()) {
                        return Some(v);
                    }
                }
                if var.chasing_rule == ChasingRule::Axf {
                    if let Some(v) = self.cycle_breaker(distance, |s| s.chased.any()) {
                        return Some(v);
                    }
                }
                let value = var.n_fold_value;
                return Some(if var.n_fold_value_absolute && us == Color::Black {
                    -value
                } else {
                    value
                });
            }
        }

        if st.counting_limit > 0
            && st.counting_ply >= st.counting_limit
            && (!self.in_check() || !self.legal_moves().is_empty())
        {
            return Some(Value::DRAW);
        }

        if var.sittuyin_promotion
            && !self.in_check()
            && self.board().count_all(us) == 2
            && self.board().count(us, PieceType::PAWN) == 1
        {
            let moves = self.legal_moves();
            if !moves.is_empty() && moves.iter().all(|m| m.move_type() == MoveType::Promotion) {
                return Some(Value::DRAW);
            }
        }
        None
    }

    pub fn is_checkmate(&self) -> bool {
        self.in_check() && self.legal_moves().is_empty()
    }

    pub fn is_stalemate(&self) -> bool {
        !self.in_check() && self.legal_moves().is_empty()
    }

    /// Result of the game for the side to move, if it is over.
    pub fn game_result(&self) -> Option<Value> {
        if let Some(v) = self.immediate_game_end() {
            return Some(v);
        }
        if self.legal_moves().is_empty() {
            let var = self.variant();
            let value = if self.in_check() {
                var.checkmate_value
            } else {
                var.stalemate_value
            };
            return Some(if value == Value::DRAW && var.material_counting != MaterialCounting::None {
                self.material_counting_result()
            } else {
                value
            });
        }
        self.optional_game_end()
    }
}

/// A game in progress, played by move strings or moves.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
}

impl Game {
    pub fn new(var: Arc<Variant>) -> Result<Self, PositionError> {
        Ok(Self {
            position: Position::new(var)?,
        })
    }

    pub fn from_fen(var: Arc<Variant>, fen: &str) -> Result<Self, PositionError> {
        Ok(Self {
            position: Position::from_fen(var, fen)?,
        })
    }

    pub fn load(&mut self, fen: &str) -> Result<(), PositionError> {
        self.position = Position::from_fen(Arc::clone(self.position.variant_arc()), fen)?;
        Ok(())
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn variant(&self) -> &Variant {
        self.position.variant()
    }

    pub fn board(&self) -> &Board {
        self.position.board()
    }

    pub fn turn(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn moves(&self) -> MoveList {
        if self.position.is_immediate_game_end(0).is_some() {
            return MoveList::new();
        }
        generate(&self.position, GenType::Legal)
    }

    pub fn make_move(&mut self, m: Move) -> Result<(), PositionError> {
        self.position.make_move(m)
    }

    /// Plays a move given in UCI-like notation.
    pub fn push_uci(&mut self, text: &str) -> Result<Move, NotationError> {
        let m = parse_uci(&self.position, text)?;
        self.position.do_move(m);
        Ok(m)
    }

    pub fn undo(&mut self) -> Result<(), PositionError> {
        let m = self.position.last_move().ok_or(PositionError::EmptyHistory)?;
        if m == Move::NULL {
            self.position.undo_null_move()
        } else {
            self.position.undo_move(m)
        }
    }

    pub fn in_check(&self) -> bool {
        self.position.in_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_draw(&self) -> bool {
        self.result() == Some(Value::DRAW)
    }

    pub fn result(&self) -> Option<Value> {
        self.position.game_result()
    }

    pub fn is_game_over(&self) -> bool {
        self.result().is_some()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        self.position.history()
    }

    pub fn move_number(&self) -> u32 {
        self.position.fullmove_number()
    }
}
