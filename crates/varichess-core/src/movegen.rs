use crate::attacks::{attackers_to, attacks_bb, moves_bb};
use crate::bitboard::{adjacent_squares, between_bb, Bitboard, DARK_SQUARES, KING_DIRECTIONS};
use crate::board::Board;
use crate::magic::{bishop_attacks, rook_attacks};
use crate::piece::{CAPTURE, QUIET};
use crate::position::Position;
use crate::types::{castling_right, Color, EnclosingRule, Move, MoveList, MoveType, PieceType, Square, WallingRule};
use crate::variant::Variant;

/// Move list selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenType {
    Captures,
    Quiets,
    Evasions,
    NonEvasions,
    Legal,
}

pub fn generate(pos: &Position, gen: GenType) -> MoveList {
    match gen {
        GenType::Captures => {
            let mut list = pseudo_legal(pos);
            list.retain(|m| pos.is_capture(*m));
            list
        }
        GenType::Quiets => {
            let mut list = pseudo_legal(pos);
            list.retain(|m| !pos.is_capture(*m));
            list
        }
        GenType::Evasions => evasions(pos),
        GenType::NonEvasions => pseudo_legal(pos),
        GenType::Legal => legal(pos),
    }
}

fn legal(pos: &Position) -> MoveList {
    let var = pos.variant();
    let mut list = if pos.in_check() { evasions(pos) } else { pseudo_legal(pos) };
    list.retain(|m| pos.legal(*m));

    if var.must_capture && list.iter().any(|m| pos.is_capture(*m)) {
        list.retain(|m| pos.is_capture(*m));
    }
    if var.pass_on_stalemate && list.is_empty() {
        let pass = pass_move(pos);
        if pos.legal(pass) {
            list.push(pass);
        }
    }
    list
}

fn evasions(pos: &Position) -> MoveList {
    let mut list = pseudo_legal(pos);
    let us = pos.side_to_move();
    let checkers = pos.checkers();
    let Some(ksq) = pos.board().king_square(us) else {
        return list;
    };
    if !pos.variant().has_royal_king() || checkers.is_empty() || !pos.variant().simple_legality {
        return list;
    }
    if checkers.more_than_one() {
        list.retain(|m| !m.is_drop() && m.from() == ksq);
        return list;
    }
    let Some(checker) = checkers.lsb() else {
        return list;
    };
    let target = between_bb(ksq, checker) | checker;
    list.retain(|m| {
        (!m.is_drop() && m.from() == ksq)
            || target.contains(m.to())
            || (m.move_type() == MoveType::EnPassant && Square::new(m.to().file(), m.from().rank()) == checker)
    });
    list
}

fn pass_move(pos: &Position) -> Move {
    let us = pos.side_to_move();
    let sq = pos
        .board()
        .king_square(us)
        .or_else(|| pos.board().pieces_c(us).lsb())
        .unwrap_or(Square::new(0, 0));
    Move::pass(sq)
}

fn hand_forces_drop(var: &Variant, board: &Board, us: Color) -> bool {
    if !var.must_drop {
        return false;
    }
    if var.must_drop_type == PieceType::ALL_PIECES {
        board.hand_total(us) > 0
    } else {
        board.in_hand(us, var.must_drop_type) > 0
    }
}

/// Every pseudo-legal move of the side to move.
fn pseudo_legal(pos: &Position) -> MoveList {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    let mut base = MoveList::new();

    if !hand_forces_drop(var, board, us) {
        for from in board.pieces_c(us) {
            let pt = board.piece_on(from).piece_type();
            if pt == PieceType::PAWN {
                pawn_moves(pos, from, &mut base);
            } else {
                piece_moves(pos, from, pt, &mut base);
            }
        }
        if var.castling {
            castling_moves(pos, &mut base);
        }
        if var.cambodian_moves {
            cambodian_moves(pos, &mut base);
        }
        if var.pass && !var.pass_on_stalemate {
            push(&mut base, pass_move(pos));
        }
    }
    if var.piece_drops {
        drop_moves(pos, &mut base);
    }

    if var.gating || var.seirawan_gating {
        add_gating(pos, &mut base);
    }
    match var.walling_rule {
        WallingRule::None | WallingRule::Static => base,
        _ => add_walls(pos, &base),
    }
}

fn push(list: &mut MoveList, m: Move) {
    debug_assert!(!list.is_full(), "move list overflow");
    list.push(m);
}

/// The piece on `to` could never move again.
fn immobile(var: &Variant, c: Color, pt: PieceType, to: Square) -> bool {
    let tables = var.tables();
    let region = var.mobility_region[c.index()][pt.index()];
    ((tables.pseudo(c, pt, QUIET, to) | tables.pseudo(c, pt, CAPTURE, to)) & region).is_empty()
}

fn piece_moves(pos: &Position, from: Square, pt: PieceType, list: &mut MoveList) {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    let occupied = board.occupied();
    let region = var.mobility_region[us.index()][pt.index()] & var.board_bb;
    let quiets = moves_bb(var, board, us, pt, from, occupied) & !occupied & region;
    let captures = attacks_bb(var, board, us, pt, from, occupied) & board.pieces_c(!us) & region;

    for to in quiets | captures {
        let capture = captures.contains(to);
        if let Some(promoted) = var.promoted_type(pt) {
            let zone = var.promotion_zone[us.index()];
            let in_zone = zone.contains(from) || zone.contains(to);
            if in_zone && (!var.piece_promotion_on_capture || capture) {
                if var.tables().types.contains(promoted) {
                    push(list, Move::new(MoveType::PiecePromotion, from, to));
                }
                if !var.mandatory_piece_promotion && !immobile(var, us, pt, to) {
                    push(list, Move::normal(from, to));
                }
                continue;
            }
        }
        if var.piece_demotion && board.is_promoted(from) && var.unpromoted_type(pt).is_some() {
            push(list, Move::new(MoveType::PieceDemotion, from, to));
        }
        push(list, Move::normal(from, to));
    }
}

fn pawn_moves(pos: &Position, from: Square, list: &mut MoveList) {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    let occupied = board.occupied();
    let region = var.mobility_region[us.index()][PieceType::PAWN.index()] & var.board_bb;
    let mut quiets = moves_bb(var, board, us, PieceType::PAWN, from, occupied) & !occupied & region;
    let captures = attacks_bb(var, board, us, PieceType::PAWN, from, occupied) & board.pieces_c(!us) & region;

    let forward = match us {
        Color::White => 1,
        Color::Black => -1,
    };
    let steps = if var.triple_step_region[us.index()].contains(from) {
        3
    } else if var.double_step_zone[us.index()].contains(from) {
        2
    } else {
        1
    };
    let mut sq = from;
    for _ in 0..steps {
        match sq.offset(0, forward) {
            Some(next) if region.contains(next) && !occupied.contains(next) => {
                quiets.set(next);
                sq = next;
            }
            _ => break,
        }
    }

    for to in quiets | captures {
        pawn_move_to(pos, from, to, list);
    }

    if let Some(ep) = pos.ep_square() {
        if attacks_bb(var, board, us, PieceType::PAWN, from, occupied).contains(ep) {
            push(list, Move::new(MoveType::EnPassant, from, ep));
        }
    }

    if var.sittuyin_promotion && board.count(us, PieceType::MET) == 0 {
        let zone = var.promotion_zone[us.index()];
        if zone.contains(from) || board.count(us, PieceType::PAWN) == 1 {
            push(list, Move::promotion(from, from, PieceType::MET));
            let diagonals = attacks_bb(var, board, us, PieceType::PAWN, from, occupied) & !occupied & var.board_bb;
            for to in diagonals {
                push(list, Move::promotion(from, to, PieceType::MET));
            }
        }
    }
}

fn pawn_move_to(pos: &Position, from: Square, to: Square, list: &mut MoveList) {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    if var.sittuyin_promotion || !var.promotion_zone[us.index()].contains(to) {
        push(list, Move::normal(from, to));
        return;
    }
    let mut promoted = false;
    for pt in var.promotion_piece_types.iter() {
        let limit = usize::from(var.promotion_limit[pt.index()]);
        if limit > 0 && board.count(us, pt) >= limit {
            continue;
        }
        push(list, Move::promotion(from, to, pt));
        promoted = true;
    }
    if (!var.mandatory_pawn_promotion || !promoted) && !immobile(var, us, PieceType::PAWN, to) {
        push(list, Move::normal(from, to));
    }
}

fn castling_moves(pos: &Position, list: &mut MoveList) {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    if pos.in_check() {
        return;
    }
    let Some(king) = pos.castling_king_square(us) else {
        return;
    };
    let occupied = board.occupied();
    for kingside in [true, false] {
        let cr = castling_right(us, kingside);
        if pos.castling_rights() & cr == 0 {
            continue;
        }
        let Some(rook) = pos.castling_rook_square(cr) else {
            continue;
        };
        if (pos.castling_path(cr) & occupied).any() {
            continue;
        }
        let attacked = pos
            .castling_king_path(cr)
            .into_iter()
            .any(|sq| attackers_to(var, board, sq, occupied, !us).any());
        if !attacked {
            push(list, Move::new(MoveType::Castling, king, rook));
        }
    }
}

fn cambodian_moves(pos: &Position, list: &mut MoveList) {
    let board = pos.board();
    let us = pos.side_to_move();
    let gates = pos.gates(us);
    if gates.is_empty() || pos.in_check() {
        return;
    }
    let forward = match us {
        Color::White => 1,
        Color::Black => -1,
    };
    let var = pos.variant();
    for from in gates & board.pieces_c(us) {
        let jumps: &[(i32, i32)] = match board.piece_on(from).piece_type() {
            PieceType::KING => &[(-2, 1), (2, 1)],
            PieceType::MET => &[(0, 2)],
            _ => &[],
        };
        for &(df, dr) in jumps {
            if let Some(to) = from.offset(df, dr * forward) {
                if var.board_bb.contains(to) && board.is_empty(to) {
                    push(list, Move::normal(from, to));
                }
            }
        }
    }
}

fn encloses(board: &Board, var: &Variant, sq: Square, us: Color) -> bool {
    KING_DIRECTIONS.iter().any(|dir| {
        let mut seen = false;
        let mut cur = sq;
        while let Some(next) = cur.offset(i32::from(dir.df), i32::from(dir.dr)) {
            let p = board.piece_on(next);
            if !var.board_bb.contains(next) || !p.is_piece() {
                return false;
            }
            if p.color() == us {
                return seen;
            }
            seen = true;
            cur = next;
        }
        false
    })
}

fn drop_moves(pos: &Position, list: &mut MoveList) {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    if board.hand_total(us) == 0 {
        return;
    }
    let occupied = board.occupied();
    let empty = var.board_bb & !occupied;

    for pt in board.hand_types(us) {
        if !var.piece_types.contains(pt) && !var.tables().types.contains(pt) {
            continue;
        }
        let mut b = empty & var.drop_region[us.index()];
        if var.drop_on_top {
            b &= occupied.shift(0, 1) | Bitboard::rank(0);
        }
        if pt == PieceType::PAWN {
            if !var.first_rank_pawn_drops {
                b &= !var.relative_rank_bb(us, 0);
            }
            if !var.promotion_zone_pawn_drops {
                b &= !var.promotion_zone[us.index()];
            }
        }
        if !var.shogi_doubled_pawn && matches!(pt, PieceType::PAWN | PieceType::SHOGI_PAWN) {
            for sq in board.pieces_cpt(us, pt) {
                b &= !Bitboard::file(sq.file());
            }
        }
        if var.sittuyin_rook_drop && pt == PieceType::ROOK {
            b &= var.relative_rank_bb(us, 0);
        }
        if var.drop_opposite_colored_bishop && pt == PieceType::BISHOP {
            let bishops = board.pieces_cpt(us, PieceType::BISHOP);
            if (bishops & DARK_SQUARES).any() {
                b &= !DARK_SQUARES;
            } else if bishops.any() {
                b &= DARK_SQUARES;
            }
        }
        match var.enclosing_drop {
            EnclosingRule::Reversi => b = b.into_iter().filter(|&sq| encloses(board, var, sq, us)).collect(),
            EnclosingRule::Ataxx => {
                let near = board.pieces_c(us).into_iter().fold(Bitboard::EMPTY, |acc, sq| acc | adjacent_squares(sq));
                b &= near;
            }
            EnclosingRule::None => {}
        }

        for to in b {
            if !var.immobility_illegal || !immobile(var, us, pt, to) {
                push(list, Move::drop(pt, pt, to));
            }
            if var.drop_promoted {
                if let Some(promoted) = var.promoted_type(pt) {
                    push(list, Move::drop(pt, promoted, to));
                }
            }
        }
    }
}

fn add_gating(pos: &Position, list: &mut MoveList) {
    let board = pos.board();
    let us = pos.side_to_move();
    let gates = pos.gates(us);
    if gates.is_empty() || board.hand_total(us) == 0 {
        return;
    }
    let hand: Vec<PieceType> = board.hand_types(us).collect();
    let base: Vec<Move> = list.iter().copied().collect();
    for m in base {
        if m.is_drop() || m.is_pass() {
            continue;
        }
        let mut squares = Bitboard::EMPTY;
        if gates.contains(m.from()) {
            squares.set(m.from());
        }
        if m.move_type() == MoveType::Castling && gates.contains(m.to()) {
            squares.set(m.to());
        }
        for gate in squares {
            if m.move_type() == MoveType::Castling && occupied_after_castling(pos, m).contains(gate) {
                continue;
            }
            for &pt in &hand {
                push(list, m.with_gating(pt, gate));
            }
        }
    }
}

fn occupied_after_castling(pos: &Position, m: Move) -> Bitboard {
    let var = pos.variant();
    let rank = m.from().rank();
    if m.to().file() > m.from().file() {
        Bitboard::square(Square::new(var.castling_kingside_file, rank))
            | Square::new(var.castling_kingside_file - 1, rank)
    } else {
        Bitboard::square(Square::new(var.castling_queenside_file, rank))
            | Square::new(var.castling_queenside_file + 1, rank)
    }
}

fn add_walls(pos: &Position, base: &MoveList) -> MoveList {
    let var = pos.variant();
    let board = pos.board();
    let us = pos.side_to_move();
    let region = var.walling_region[us.index()] & var.board_bb;
    let mut list = MoveList::new();
    for &m in base {
        let mut after = board.occupied();
        if !m.is_drop() && !m.is_pass() {
            after.clear(m.from());
        }
        after.set(m.to());
        let empty = var.board_bb & !after;
        let walls = match var.walling_rule {
            WallingRule::Arrow => (rook_attacks(m.to(), after) | bishop_attacks(m.to(), after)) & empty,
            WallingRule::Duck => empty,
            WallingRule::Past if !m.is_drop() && !m.is_pass() => Bitboard::square(m.from()),
            WallingRule::Edge => {
                let edges = Bitboard::file(0)
                    | Bitboard::file(var.max_file)
                    | Bitboard::rank(0)
                    | Bitboard::rank(var.max_rank);
                let near_walls = board
                    .walls()
                    .into_iter()
                    .fold(Bitboard::EMPTY, |acc, sq| acc | adjacent_squares(sq));
                (edges | near_walls) & empty
            }
            _ => Bitboard::EMPTY,
        } & region;
        for wall in walls {
            push(&mut list, m.with_wall(wall));
        }
    }
    list
}

/// Number of legal moves of the side to move.
pub fn count_legal(pos: &Position) -> usize {
    generate(pos, GenType::Legal).len()
}

