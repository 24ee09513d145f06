use std::fmt::Write as _;

use thiserror::Error;

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::constants::{FILE_CHARS, PROMOTED_MARKER, WALL_CHAR};
use crate::position::Position;
use crate::types::{castling_right, Color, CountingRule, Piece, PieceType, Square};
use crate::variant::Variant;

/// Signed result codes of FEN validation.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FenValidation {
    Ok = 1,
    Empty = 0,
    InvalidChar = -1,
    WrongGeometry = -2,
    InvalidPocket = -3,
    InvalidCastling = -4,
    InvalidEnPassant = -5,
    InvalidKingCount = -6,
    TouchingKings = -7,
    InvalidHalfmove = -8,
    InvalidFullmove = -9,
    InvalidCheckCount = -10,
    InvalidCounting = -11,
    MissingSideToMove = -12,
}

impl FenValidation {
    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid fen ({kind:?}): {message}")]
pub struct FenError {
    pub kind: FenValidation,
    pub message: String,
}

impl FenError {
    fn new(kind: FenValidation, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Everything a FEN string states about a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenSetup {
    pub board: Board,
    pub side_to_move: Color,
    pub castling_rooks: Vec<(Color, Square)>,
    pub gates: [Bitboard; 2],
    pub ep_square: Option<Square>,
    pub checks_remaining: [usize; 2],
    pub rule50: u32,
    pub fullmove: u32,
    /// Plies played before this position; SFEN states it directly.
    pub game_ply: u32,
    /// Counting-rule limit in plies, zero when the field is absent.
    pub counting_limit: u32,
}

/// Largest counting limit any counting rule produces, in plies.
const MAX_COUNTING_LIMIT: u32 = 128;

pub fn parse_fen(var: &Variant, fen: &str) -> Result<FenSetup, FenError> {
    let mut tokens = fen.split_whitespace().peekable();
    let placement = tokens
        .next()
        .ok_or_else(|| FenError::new(FenValidation::Empty, "empty fen"))?;
    let board = parse_placement(var, placement)?;

    let side_to_move = match tokens.next() {
        Some(token) => {
            let mut chars = token.chars();
            match (chars.next().and_then(Color::from_code), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(FenError::new(
                        FenValidation::MissingSideToMove,
                        format!("side to move '{token}'"),
                    ))
                }
            }
        }
        None => return Err(FenError::new(FenValidation::MissingSideToMove, "no side to move")),
    };

    let mut setup = FenSetup {
        board,
        side_to_move,
        castling_rooks: Vec::new(),
        gates: [Bitboard::EMPTY; 2],
        ep_square: None,
        checks_remaining: [var.max_check_count; 2],
        rule50: 0,
        fullmove: 1,
        game_ply: 0,
        counting_limit: 0,
    };

    let is_number = |t: &str| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit());
    let rest: Vec<&str> = tokens.clone().collect();
    if let [hands, ply] = rest[..] {
        if var.captures_to_hand && var.short_fen() && !is_number(hands) && is_number(ply) {
            parse_sfen_hands(var, &mut setup.board, hands)?;
            let ply: u32 = ply
                .parse()
                .map_err(|_| FenError::new(FenValidation::InvalidFullmove, format!("move count '{ply}'")))?;
            setup.side_to_move = !setup.side_to_move;
            setup.game_ply = ply.saturating_sub(1);
            setup.fullmove = 1 + setup.game_ply / 2;
            return Ok(setup);
        }
    }

    if let Some(&token) = tokens.peek() {
        if !is_number(token) && !token.contains('+') {
            parse_castling(var, &mut setup, token)?;
            tokens.next();
        }
    }
    if let Some(&token) = tokens.peek() {
        if token == "-" {
            tokens.next();
        } else if var.counting_rule != CountingRule::None && is_number(token) && tokens.clone().count() >= 3 {
            setup.counting_limit = token
                .parse()
                .map_err(|_| FenError::new(FenValidation::InvalidCounting, format!("counting limit '{token}'")))?;
            tokens.next();
        } else if !is_number(token) && !token.contains('+') {
            let sq = Square::parse(token)
                .filter(|sq| var.board_bb.contains(*sq))
                .ok_or_else(|| FenError::new(FenValidation::InvalidEnPassant, format!("square '{token}'")))?;
            setup.ep_square = Some(sq);
            tokens.next();
        }
    }
    if let Some(&token) = tokens.peek() {
        if token.contains('+') && !token.starts_with('+') {
            setup.checks_remaining = parse_check_count(var, token, false)?;
            tokens.next();
        }
    }
    if let Some(token) = tokens.next() {
        if token.starts_with('+') {
            setup.checks_remaining = parse_check_count(var, token, true)?;
        } else {
            setup.rule50 = token
                .parse()
                .map_err(|_| FenError::new(FenValidation::InvalidHalfmove, format!("halfmove '{token}'")))?;
            if let Some(token) = tokens.next() {
                let fullmove: u32 = token
                    .parse()
                    .map_err(|_| FenError::new(FenValidation::InvalidFullmove, format!("fullmove '{token}'")))?;
                setup.fullmove = fullmove.max(1);
            }
        }
    }
    if let Some(token) = tokens.next() {
        if token.starts_with('+') {
            setup.checks_remaining = parse_check_count(var, token, true)?;
        } else {
            return Err(FenError::new(
                FenValidation::InvalidCheckCount,
                format!("unexpected trailing field '{token}'"),
            ));
        }
    }
    setup.game_ply = 2 * (setup.fullmove - 1) + u32::from(setup.side_to_move == Color::Black);
    Ok(setup)
}

/// Reads an SFEN hand field such as `S2Pb3p`; uppercase belongs to sente, who moves first.
fn parse_sfen_hands(var: &Variant, board: &mut Board, field: &str) -> Result<(), FenError> {
    if field == "-" {
        return Ok(());
    }
    let mut count = 0usize;
    for c in field.chars() {
        if let Some(d) = c.to_digit(10) {
            count = count * 10 + d as usize;
            continue;
        }
        let piece = var
            .piece_from_char(c)
            .ok_or_else(|| FenError::new(FenValidation::InvalidPocket, format!("hand piece '{c}'")))?;
        for _ in 0..count.max(1) {
            board.add_to_hand(piece.color(), piece.piece_type());
        }
        count = 0;
    }
    if count > 0 {
        return Err(FenError::new(FenValidation::InvalidPocket, format!("hand '{field}'")));
    }
    Ok(())
}

fn parse_placement(var: &Variant, field: &str) -> Result<Board, FenError> {
    let (placement, mut pocket) = match field.find('[') {
        Some(i) => {
            let pocket = field[i + 1..]
                .strip_suffix(']')
                .ok_or_else(|| FenError::new(FenValidation::InvalidPocket, "unterminated pocket"))?;
            (&field[..i], Some(pocket))
        }
        None => (field, None),
    };
    let mut ranks: Vec<&str> = placement.split('/').collect();
    let rank_count = usize::from(var.max_rank) + 1;
    if pocket.is_none() && ranks.len() == rank_count + 1 {
        pocket = ranks.pop();
    }
    if ranks.len() != rank_count {
        return Err(FenError::new(
            FenValidation::WrongGeometry,
            format!("expected {rank_count} ranks, found {}", ranks.len()),
        ));
    }

    let mut board = Board::new();
    for (i, text) in ranks.iter().enumerate() {
        let rank = var.max_rank - i as u8;
        let mut file = 0u8;
        let mut empties = 0u32;
        let mut promoted = false;
        let mut last: Option<Square> = None;
        let geometry = || FenError::new(FenValidation::WrongGeometry, format!("rank '{text}'"));
        for c in text.chars() {
            if let Some(d) = c.to_digit(10) {
                empties = empties * 10 + d;
                continue;
            }
            file = u8::try_from(u32::from(file) + empties).map_err(|_| geometry())?;
            empties = 0;
            if file > var.max_file && c != '~' {
                return Err(geometry());
            }
            match c {
                WALL_CHAR => {
                    board.put_wall(Square::new(file, rank));
                    file += 1;
                }
                PROMOTED_MARKER => promoted = true,
                '~' => {
                    let sq = last.ok_or_else(|| FenError::new(FenValidation::InvalidChar, "dangling '~'"))?;
                    let original = board.unpromoted_on(sq);
                    board.set_promoted(sq, original);
                }
                _ => {
                    let piece = var
                        .piece_from_char(c)
                        .ok_or_else(|| FenError::new(FenValidation::InvalidChar, format!("piece '{c}'")))?;
                    let sq = Square::new(file, rank);
                    if promoted {
                        let target = var.promoted_type(piece.piece_type()).ok_or_else(|| {
                            FenError::new(FenValidation::InvalidChar, format!("'+{c}' cannot promote"))
                        })?;
                        board.put_piece(Piece::new(piece.color(), target), sq);
                        board.set_promoted(sq, piece);
                        promoted = false;
                    } else {
                        board.put_piece(piece, sq);
                    }
                    last = Some(sq);
                    file += 1;
                }
            }
        }
        let width = u32::from(file) + empties;
        if promoted || width != u32::from(var.max_file) + 1 {
            return Err(geometry());
        }
    }

    if let Some(pocket) = pocket {
        for c in pocket.chars() {
            if c == '-' {
                continue;
            }
            let piece = var
                .piece_from_char(c)
                .ok_or_else(|| FenError::new(FenValidation::InvalidPocket, format!("pocket piece '{c}'")))?;
            board.add_to_hand(piece.color(), piece.piece_type());
        }
    }
    Ok(board)
}

fn castling_rank(var: &Variant, c: Color) -> u8 {
    match c {
        Color::White => var.castling_rank,
        Color::Black => var.max_rank - var.castling_rank,
    }
}

fn parse_castling(var: &Variant, setup: &mut FenSetup, token: &str) -> Result<(), FenError> {
    if token == "-" {
        return Ok(());
    }
    let invalid = |c: char| FenError::new(FenValidation::InvalidCastling, format!("castling flag '{c}'"));
    for flag in token.chars() {
        let c = if flag.is_ascii_uppercase() { Color::White } else { Color::Black };
        let rank = castling_rank(var, c);
        let rank_bb = Bitboard::rank(rank);
        let king = (setup.board.pieces_cpt(c, var.castling_king_piece) & rank_bb).lsb();
        let rooks = setup.board.pieces_cpt(c, var.castling_rook_piece) & rank_bb;
        let lower = flag.to_ascii_lowercase();

        let rook = if lower == 'k' || lower == 'q' {
            let king = king.ok_or_else(|| invalid(flag))?;
            let candidates = rooks.iter().filter(|sq| (sq.file() > king.file()) == (lower == 'k'));
            let rook = if lower == 'k' {
                candidates.last()
            } else {
                candidates.into_iter().next()
            };
            Some(rook.ok_or_else(|| invalid(flag))?)
        } else if let Some(file) = FILE_CHARS.iter().position(|&f| f == lower) {
            let sq = Square::new(file as u8, rank);
            if var.castling && king.is_some() && rooks.contains(sq) {
                Some(sq)
            } else if var.gating || var.seirawan_gating || var.cambodian_moves {
                setup.gates[c.index()].set(sq);
                None
            } else {
                return Err(invalid(flag));
            }
        } else {
            return Err(invalid(flag));
        };

        if let Some(rook) = rook {
            if !var.castling {
                return Err(invalid(flag));
            }
            setup.castling_rooks.push((c, rook));
            if var.gating || var.seirawan_gating {
                setup.gates[c.index()].set(rook);
                if let Some(king) = king {
                    setup.gates[c.index()].set(king);
                }
            }
        }
    }
    Ok(())
}

fn parse_check_count(var: &Variant, token: &str, given: bool) -> Result<[usize; 2], FenError> {
    let invalid = || FenError::new(FenValidation::InvalidCheckCount, format!("check count '{token}'"));
    let counts: Vec<usize> = token
        .split('+')
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    let [white, black] = counts[..] else {
        return Err(invalid());
    };
    if given {
        let max = if var.max_check_count > 0 { var.max_check_count } else { 3 };
        if white > max || black > max {
            return Err(invalid());
        }
        Ok([max - white, max - black])
    } else {
        Ok([white, black])
    }
}

/// Checks `fen` against `var` and returns the first problem found.
pub fn validate_fen(var: &Variant, fen: &str) -> FenValidation {
    if fen.trim().is_empty() {
        return FenValidation::Empty;
    }
    let setup = match parse_fen(var, fen) {
        Ok(setup) => setup,
        Err(err) => return err.kind,
    };
    if var.has_royal_king() {
        let start = parse_fen(var, &var.start_fen).ok();
        for c in Color::ALL {
            let count = setup.board.count(c, PieceType::KING);
            let expected = start
                .as_ref()
                .map(|s| s.board.count(c, PieceType::KING) + s.board.in_hand(c, PieceType::KING))
                .unwrap_or(1);
            if count + setup.board.in_hand(c, PieceType::KING) != expected {
                return FenValidation::InvalidKingCount;
            }
        }
        if let (Some(w), Some(b)) = (
            setup.board.king_square(Color::White),
            setup.board.king_square(Color::Black),
        ) {
            if crate::bitboard::distance(w, b) <= 1 {
                return FenValidation::TouchingKings;
            }
        }
    }
    if setup.counting_limit % 2 == 1 || setup.counting_limit > MAX_COUNTING_LIMIT {
        return FenValidation::InvalidCounting;
    }
    if let Some(ep) = setup.ep_square {
        let behind = match setup.side_to_move {
            Color::White => ep.offset(0, -1),
            Color::Black => ep.offset(0, 1),
        };
        let pawn = Piece::new(!setup.side_to_move, PieceType::PAWN);
        if !setup.board.is_empty(ep) || behind.map(|sq| setup.board.piece_on(sq)) != Some(pawn) {
            return FenValidation::InvalidEnPassant;
        }
    }
    FenValidation::Ok
}

fn piece_text(var: &Variant, board: &Board, sq: Square) -> String {
    let piece = board.piece_on(sq);
    let original = board.unpromoted_on(sq);
    if board.is_promoted(sq)
        && original.is_piece()
        && var.promoted_type(original.piece_type()) == Some(piece.piece_type())
    {
        if let Some(c) = var.piece_char(original) {
            return format!("{PROMOTED_MARKER}{c}");
        }
    }
    let mut text = var.piece_char(piece).map(String::from).unwrap_or_default();
    if board.is_promoted(sq) && var.captures_to_hand {
        text.push('~');
    }
    text
}

/// Serializes the board field, pocket included.
pub fn placement_fen(var: &Variant, board: &Board) -> String {
    let mut out = String::new();
    for rank in (0..=var.max_rank).rev() {
        let mut empties = 0;
        for file in 0..=var.max_file {
            let sq = Square::new(file, rank);
            let piece = board.piece_on(sq);
            if piece.is_none() {
                empties += 1;
                continue;
            }
            if empties > 0 {
                let _ = write!(out, "{empties}");
                empties = 0;
            }
            if piece.is_wall() {
                out.push(WALL_CHAR);
            } else {
                out.push_str(&piece_text(var, board, sq));
            }
        }
        if empties > 0 {
            let _ = write!(out, "{empties}");
        }
        if rank > 0 {
            out.push('/');
        }
    }
    if var.has_pocket() {
        out.push('[');
        for c in Color::ALL {
            for pt in PieceType::all().rev() {
                if let Some(ch) = var.piece_char(Piece::new(c, pt)) {
                    for _ in 0..board.in_hand(c, pt) {
                        out.push(ch);
                    }
                }
            }
        }
        out.push(']');
    }
    out
}

fn castling_field(pos: &Position) -> String {
    let var = pos.variant();
    let mut out = String::new();
    for c in Color::ALL {
        let mut flags: Vec<(u8, char)> = Vec::new();
        let mut implied = Bitboard::EMPTY;
        for kingside in [true, false] {
            let cr = castling_right(c, kingside);
            if pos.castling_rights() & cr == 0 {
                continue;
            }
            let Some(rook) = pos.castling_rook_square(cr) else {
                continue;
            };
            implied.set(rook);
            if let Some(king) = pos.castling_king_square(c) {
                implied.set(king);
            }
            let flag = if var.chess960 {
                FILE_CHARS[usize::from(rook.file())]
            } else if kingside {
                'k'
            } else {
                'q'
            };
            flags.push((if kingside { 0 } else { 1 }, flag));
        }
        for gate in pos.gates(c) & !implied {
            flags.push((2 + gate.file(), FILE_CHARS[usize::from(gate.file())]));
        }
        flags.sort_by_key(|(order, _)| *order);
        for (_, flag) in flags {
            out.push(match c {
                Color::White => flag.to_ascii_uppercase(),
                Color::Black => flag,
            });
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

pub fn format_fen(pos: &Position) -> String {
    let var = pos.variant();
    let mut fen = placement_fen(var, pos.board());
    fen.push(' ');
    fen.push(pos.side_to_move().to_code());
    if !var.short_fen() {
        let _ = write!(fen, " {}", castling_field(pos));
        match (pos.counting_limit_plies(), pos.ep_square()) {
            (limit, _) if limit > 0 => {
                let _ = write!(fen, " {limit}");
            }
            (_, Some(sq)) => {
                let _ = write!(fen, " {sq}");
            }
            _ => fen.push_str(" -"),
        }
    }
    if var.check_counting {
        let [w, b] = pos.checks_remaining();
        let _ = write!(fen, " {w}+{b}");
    }
    let halfmove = if pos.counting_limit_plies() > 0 { pos.counting_ply() } else { pos.rule50() };
    let _ = write!(fen, " {halfmove} {}", pos.fullmove_number());
    fen
}
