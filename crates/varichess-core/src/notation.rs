use thiserror::Error;

use crate::constants::{DROP_MARKER, PASS_NOTATION};
use crate::position::Position;
use crate::types::{Move, MoveType, PieceType, Square};
use crate::variant::Variant;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("malformed move string: {0}")]
    Malformed(String),
    #[error("illegal move: {0}")]
    Illegal(String),
}

fn letter(var: &Variant, pt: PieceType) -> char {
    var.type_char(pt).unwrap_or('?')
}

fn castling_destination(var: &Variant, m: Move) -> Square {
    if var.chess960 {
        return m.to();
    }
    let file = if m.to().file() > m.from().file() {
        var.castling_kingside_file
    } else {
        var.castling_queenside_file
    };
    Square::new(file, m.from().rank())
}

/// Writes `m` in the UCI-like notation used at the core boundary.
pub fn move_to_uci(pos: &Position, m: Move) -> String {
    let var = pos.variant();
    if m == Move::NULL {
        return "0000".to_string();
    }
    let mut out = String::new();
    match m.move_type() {
        MoveType::Special if m.is_pass() => out.push_str(PASS_NOTATION),
        MoveType::Drop => {
            if m.in_hand_type() != m.dropped_type() {
                out.push('+');
                out.push(letter(var, m.in_hand_type()));
            } else {
                out.push(letter(var, m.dropped_type()));
            }
            out.push(DROP_MARKER);
            out.push_str(&m.to().to_string());
        }
        MoveType::Castling => {
            out.push_str(&m.from().to_string());
            out.push_str(&castling_destination(var, m).to_string());
        }
        move_type => {
            out.push_str(&m.from().to_string());
            out.push_str(&m.to().to_string());
            match move_type {
                MoveType::Promotion => out.push(letter(var, m.promotion_type()).to_ascii_lowercase()),
                MoveType::PiecePromotion => out.push('+'),
                MoveType::PieceDemotion => out.push('-'),
                _ => {}
            }
        }
    }
    if let Some(gate) = m.gating_square() {
        out.push(letter(var, m.gating_type()).to_ascii_lowercase());
        if gate != m.from() {
            out.push_str(&gate.to_string());
        }
    }
    if let Some(wall) = m.wall_square() {
        out.push(',');
        out.push_str(&m.to().to_string());
        out.push_str(&wall.to_string());
    }
    out
}

/// Accepted spellings of `m` besides the canonical one.
fn alternates(pos: &Position, m: Move, canonical: &str) -> Vec<String> {
    let mut names = Vec::new();
    if m.is_drop() {
        names.push(canonical.replacen(DROP_MARKER, "*", 1));
    }
    if m.is_pass() {
        let sq = m.from().to_string();
        names.push(format!("{sq}{sq}"));
    }
    if m.move_type() == MoveType::Castling && !pos.variant().chess960 {
        names.push(format!("{}{}", m.from(), m.to()));
    }
    if let Some(gate) = m.gating_square() {
        let base = canonical.split(',').next().unwrap_or(canonical);
        let upper = letter(pos.variant(), m.gating_type());
        let square = if gate != m.from() { gate.to_string() } else { String::new() };
        let suffix = format!("{}{square}", upper.to_ascii_lowercase());
        if let Some(stem) = base.strip_suffix(&suffix) {
            names.push(format!("{stem}{upper}{square}"));
        }
    }
    names
}

/// Finds the legal move written as `text`.
pub fn parse_uci(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if text.len() < 4 || !text.is_ascii() || text.contains(char::is_whitespace) {
        return Err(NotationError::Malformed(text.to_string()));
    }
    for m in pos.legal_moves() {
        let canonical = move_to_uci(pos, m);
        if canonical == text || alternates(pos, m, &canonical).iter().any(|alt| alt == text) {
            return Ok(m);
        }
    }
    Err(NotationError::Illegal(text.to_string()))
}
