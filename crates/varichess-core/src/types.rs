use std::fmt;
use std::ops::{Add, Neg, Not, Sub};

use arrayvec::ArrayVec;

use crate::constants::{FILE_CHARS, FILE_NB, MAX_MOVES, MAX_PLY, PIECE_TYPE_NB, RANK_NB, SQUARE_NB};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const ALL: [Self; 2] = [Self::White, Self::Black];

    pub const fn to_code(self) -> char {
        match self {
            Self::White => 'w',
            Self::Black => 'b',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'w' => Some(Self::White),
            'b' => Some(Self::Black),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn flip(self) -> Self {
        match self {
            Self::White => Self::Black,
            Self::Black => Self::White,
        }
    }
}

impl Not for Color {
    type Output = Self;

    fn not(self) -> Self {
        self.flip()
    }
}

/// A board coordinate on the 12x10 grid, `rank * 12 + file`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub const fn new(file: u8, rank: u8) -> Self {
        Self(rank * FILE_NB as u8 + file)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < SQUARE_NB {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn from_coords(file: i32, rank: i32) -> Option<Self> {
        if file >= 0 && file < FILE_NB as i32 && rank >= 0 && rank < RANK_NB as i32 {
            Some(Self::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn file(self) -> u8 {
        self.0 % FILE_NB as u8
    }

    pub const fn rank(self) -> u8 {
        self.0 / FILE_NB as u8
    }

    pub const fn offset(self, df: i32, dr: i32) -> Option<Self> {
        Self::from_coords(self.file() as i32 + df, self.rank() as i32 + dr)
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..SQUARE_NB as u8).map(Square)
    }

    /// Parses `e4`, `a10` or shogi-style `4e`.
    pub fn parse(input: &str) -> Option<Self> {
        let bytes = input.as_bytes();
        let first = *bytes.first()?;
        let (file_char, rank_digits) = if first.is_ascii_lowercase() {
            (first, &input[1..])
        } else {
            let last = *bytes.last()?;
            if !last.is_ascii_lowercase() {
                return None;
            }
            (last, &input[..input.len() - 1])
        };
        if rank_digits.is_empty() || !rank_digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let file = i32::from(file_char) - i32::from(b'a');
        let rank = rank_digits.parse::<i32>().ok()? - 1;
        Self::from_coords(file, rank)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", FILE_CHARS[usize::from(self.file())], self.rank() + 1)
    }
}

pub const fn relative_rank(color: Color, rank: u8, max_rank: u8) -> u8 {
    match color {
        Color::White => rank,
        Color::Black => max_rank - rank,
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PieceType(pub u8);

impl PieceType {
    pub const NONE: Self = Self(0);
    pub const ALL_PIECES: Self = Self(0);
    pub const PAWN: Self = Self(1);
    pub const KNIGHT: Self = Self(2);
    pub const BISHOP: Self = Self(3);
    pub const ROOK: Self = Self(4);
    pub const QUEEN: Self = Self(5);
    pub const FERS: Self = Self(6);
    pub const MET: Self = Self::FERS;
    pub const ALFIL: Self = Self(7);
    pub const FERS_ALFIL: Self = Self(8);
    pub const SILVER: Self = Self(9);
    pub const KHON: Self = Self::SILVER;
    pub const AIWOK: Self = Self(10);
    pub const BERS: Self = Self(11);
    pub const DRAGON: Self = Self::BERS;
    pub const ARCHBISHOP: Self = Self(12);
    pub const CHANCELLOR: Self = Self(13);
    pub const AMAZON: Self = Self(14);
    pub const KNIBIS: Self = Self(15);
    pub const BISKNI: Self = Self(16);
    pub const KNIROO: Self = Self(17);
    pub const ROOKNI: Self = Self(18);
    pub const SHOGI_PAWN: Self = Self(19);
    pub const LANCE: Self = Self(20);
    pub const SHOGI_KNIGHT: Self = Self(21);
    pub const EUROSHOGI_KNIGHT: Self = Self(22);
    pub const GOLD: Self = Self(23);
    pub const DRAGON_HORSE: Self = Self(24);
    pub const CLOBBER: Self = Self(25);
    pub const BREAKTHROUGH: Self = Self(26);
    pub const IMMOBILE: Self = Self(27);
    pub const CANNON: Self = Self(28);
    pub const JANGGI_CANNON: Self = Self(29);
    pub const SOLDIER: Self = Self(30);
    pub const HORSE: Self = Self(31);
    pub const ELEPHANT: Self = Self(32);
    pub const JANGGI_ELEPHANT: Self = Self(33);
    pub const BANNER: Self = Self(34);
    pub const WAZIR: Self = Self(35);
    pub const COMMONER: Self = Self(36);
    pub const CENTAUR: Self = Self(37);
    pub const CUSTOM_PIECE_1: Self = Self(38);
    pub const CUSTOM_PIECE_LAST: Self = Self(57);
    pub const KING: Self = Self(58);
    pub const WALL: Self = Self(63);

    pub const CANONICAL_NAMES: [(Self, &'static str); 38] = [
        (Self::PAWN, "pawn"),
        (Self::KNIGHT, "knight"),
        (Self::BISHOP, "bishop"),
        (Self::ROOK, "rook"),
        (Self::QUEEN, "queen"),
        (Self::FERS, "fers"),
        (Self::ALFIL, "alfil"),
        (Self::FERS_ALFIL, "fersAlfil"),
        (Self::SILVER, "silver"),
        (Self::AIWOK, "aiwok"),
        (Self::BERS, "bers"),
        (Self::ARCHBISHOP, "archbishop"),
        (Self::CHANCELLOR, "chancellor"),
        (Self::AMAZON, "amazon"),
        (Self::KNIBIS, "knibis"),
        (Self::BISKNI, "biskni"),
        (Self::KNIROO, "kniroo"),
        (Self::ROOKNI, "rookni"),
        (Self::SHOGI_PAWN, "shogiPawn"),
        (Self::LANCE, "lance"),
        (Self::SHOGI_KNIGHT, "shogiKnight"),
        (Self::EUROSHOGI_KNIGHT, "euroshogiKnight"),
        (Self::GOLD, "gold"),
        (Self::DRAGON_HORSE, "dragonHorse"),
        (Self::CLOBBER, "clobber"),
        (Self::BREAKTHROUGH, "breakthrough"),
        (Self::IMMOBILE, "immobile"),
        (Self::CANNON, "cannon"),
        (Self::JANGGI_CANNON, "janggiCannon"),
        (Self::SOLDIER, "soldier"),
        (Self::HORSE, "horse"),
        (Self::ELEPHANT, "elephant"),
        (Self::JANGGI_ELEPHANT, "janggiElephant"),
        (Self::BANNER, "banner"),
        (Self::WAZIR, "wazir"),
        (Self::COMMONER, "commoner"),
        (Self::CENTAUR, "centaur"),
        (Self::KING, "king"),
    ];

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_custom(self) -> bool {
        self.0 >= Self::CUSTOM_PIECE_1.0 && self.0 <= Self::CUSTOM_PIECE_LAST.0
    }

    pub const fn custom(slot: u8) -> Option<Self> {
        if slot >= 1 && slot as usize <= crate::constants::CUSTOM_PIECES_NB {
            Some(Self(Self::CUSTOM_PIECE_1.0 + slot - 1))
        } else {
            None
        }
    }

    /// Every real piece type, ascending.
    pub fn all() -> impl DoubleEndedIterator<Item = PieceType> {
        (Self::PAWN.0..=Self::KING.0).map(PieceType)
    }

    pub fn name(self) -> String {
        if self.is_custom() {
            return format!("customPiece{}", self.0 - Self::CUSTOM_PIECE_1.0 + 1);
        }
        Self::CANONICAL_NAMES
            .iter()
            .find(|(pt, _)| *pt == self)
            .map(|(_, name)| (*name).to_string())
            .unwrap_or_default()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(slot) = name.strip_prefix("customPiece") {
            return slot.parse::<u8>().ok().and_then(Self::custom);
        }
        match name {
            "met" => return Some(Self::MET),
            "khon" => return Some(Self::KHON),
            "dragon" => return Some(Self::DRAGON),
            _ => {}
        }
        Self::CANONICAL_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(pt, _)| *pt)
    }
}

/// `color << 6 | piece type`; `Piece::NONE` is an empty square.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Piece(pub u8);

impl Piece {
    pub const NONE: Self = Self(0);
    pub const WALL: Self = Self(PieceType::WALL.0);

    pub const fn new(color: Color, piece_type: PieceType) -> Self {
        Self(((color as u8) << 6) | piece_type.0)
    }

    pub const fn color(self) -> Color {
        if self.0 >> 6 == 0 {
            Color::White
        } else {
            Color::Black
        }
    }

    pub const fn piece_type(self) -> PieceType {
        PieceType(self.0 & 63)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_wall(self) -> bool {
        self.0 == Self::WALL.0
    }

    pub const fn is_piece(self) -> bool {
        !self.is_none() && !self.is_wall()
    }

    pub const fn flip(self) -> Self {
        Self::new(self.color().flip(), self.piece_type())
    }
}

/// Bit set over piece types.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PieceSet(pub u64);

impl PieceSet {
    pub const EMPTY: Self = Self(0);

    pub const fn contains(self, pt: PieceType) -> bool {
        self.0 & (1u64 << pt.0) != 0
    }

    pub fn insert(&mut self, pt: PieceType) {
        self.0 |= 1u64 << pt.0;
    }

    pub fn remove(&mut self, pt: PieceType) {
        self.0 &= !(1u64 << pt.0);
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = PieceType> {
        (0..PIECE_TYPE_NB as u8)
            .filter(move |i| self.0 & (1u64 << i) != 0)
            .map(PieceType)
    }
}

impl FromIterator<PieceType> for PieceSet {
    fn from_iter<I: IntoIterator<Item = PieceType>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for pt in iter {
            set.insert(pt);
        }
        set
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveType {
    Normal = 0,
    EnPassant = 1,
    Castling = 2,
    Promotion = 3,
    Drop = 4,
    PiecePromotion = 5,
    PieceDemotion = 6,
    Special = 7,
}

impl MoveType {
    pub const fn from_code(code: u8) -> Self {
        match code & 7 {
            0 => Self::Normal,
            1 => Self::EnPassant,
            2 => Self::Castling,
            3 => Self::Promotion,
            4 => Self::Drop,
            5 => Self::PiecePromotion,
            6 => Self::PieceDemotion,
            _ => Self::Special,
        }
    }
}

const TO_SHIFT: u32 = 0;
const FROM_SHIFT: u32 = 7;
const TYPE_SHIFT: u32 = 14;
const PT_SHIFT: u32 = 17;
const PT2_SHIFT: u32 = 23;
const AUX_SQ_SHIFT: u32 = 29;
const GATE_FLAG: u64 = 1 << 36;
const WALL_FLAG: u64 = 1 << 37;

/// Packed move word.
///
/// Bits 0-6 hold the destination, 7-13 the origin (equal to the destination
/// for drops), 14-16 the [`MoveType`], 17-22 the promoted or dropped piece
/// type, 23-28 the in-hand type of a drop or the gated type, 29-35 the gate or
/// wall square and bits 36/37 flag which of the two is present.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Move(pub u64);

impl Move {
    pub const NONE: Self = Self(0);
    pub const NULL: Self = Self((1 << FROM_SHIFT) | 1);

    pub const fn new(move_type: MoveType, from: Square, to: Square) -> Self {
        Self(
            ((to.0 as u64) << TO_SHIFT)
                | ((from.0 as u64) << FROM_SHIFT)
                | ((move_type as u64) << TYPE_SHIFT),
        )
    }

    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(MoveType::Normal, from, to)
    }

    pub const fn promotion(from: Square, to: Square, pt: PieceType) -> Self {
        Self(Self::new(MoveType::Promotion, from, to).0 | ((pt.0 as u64) << PT_SHIFT))
    }

    pub const fn drop(in_hand: PieceType, dropped: PieceType, to: Square) -> Self {
        Self(
            Self::new(MoveType::Drop, to, to).0
                | ((dropped.0 as u64) << PT_SHIFT)
                | ((in_hand.0 as u64) << PT2_SHIFT),
        )
    }

    pub const fn pass(square: Square) -> Self {
        Self::new(MoveType::Special, square, square)
    }

    pub const fn with_gating(self, pt: PieceType, gate: Square) -> Self {
        Self(self.0 | ((pt.0 as u64) << PT2_SHIFT) | ((gate.0 as u64) << AUX_SQ_SHIFT) | GATE_FLAG)
    }

    pub const fn with_wall(self, wall: Square) -> Self {
        Self(self.0 | ((wall.0 as u64) << AUX_SQ_SHIFT) | WALL_FLAG)
    }

    pub const fn to(self) -> Square {
        Square(((self.0 >> TO_SHIFT) & 0x7F) as u8)
    }

    pub const fn from(self) -> Square {
        Square(((self.0 >> FROM_SHIFT) & 0x7F) as u8)
    }

    pub const fn move_type(self) -> MoveType {
        MoveType::from_code(((self.0 >> TYPE_SHIFT) & 7) as u8)
    }

    pub const fn promotion_type(self) -> PieceType {
        PieceType(((self.0 >> PT_SHIFT) & 0x3F) as u8)
    }

    pub const fn dropped_type(self) -> PieceType {
        self.promotion_type()
    }

    pub const fn in_hand_type(self) -> PieceType {
        PieceType(((self.0 >> PT2_SHIFT) & 0x3F) as u8)
    }

    pub const fn is_gating(self) -> bool {
        self.0 & GATE_FLAG != 0
    }

    pub const fn gating_type(self) -> PieceType {
        if self.is_gating() {
            self.in_hand_type()
        } else {
            PieceType::NONE
        }
    }

    const fn aux_square(self) -> Square {
        Square(((self.0 >> AUX_SQ_SHIFT) & 0x7F) as u8)
    }

    pub const fn gating_square(self) -> Option<Square> {
        if self.is_gating() {
            Some(self.aux_square())
        } else {
            None
        }
    }

    pub const fn wall_square(self) -> Option<Square> {
        if self.0 & WALL_FLAG != 0 {
            Some(self.aux_square())
        } else {
            None
        }
    }

    /// The move without its wall placement.
    pub const fn base(self) -> Self {
        if self.0 & WALL_FLAG != 0 {
            Self(self.0 & !(WALL_FLAG | (0x7F << AUX_SQ_SHIFT)))
        } else {
            self
        }
    }

    pub const fn is_drop(self) -> bool {
        matches!(self.move_type(), MoveType::Drop)
    }

    pub const fn is_pass(self) -> bool {
        matches!(self.move_type(), MoveType::Special) && self.from().0 == self.to().0
    }

    pub const fn is_ok(self) -> bool {
        self.0 != Self::NONE.0 && self.0 != Self::NULL.0
    }
}

pub type MoveList = ArrayVec<Move, MAX_MOVES>;

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Value(pub i32);

impl Value {
    pub const ZERO: Self = Self(0);
    pub const DRAW: Self = Self(0);
    pub const MATE: Self = Self(32000);
    pub const INFINITE: Self = Self(32001);
    pub const MATE_IN_MAX_PLY: Self = Self(32000 - MAX_PLY);

    pub const fn mate_in(ply: i32) -> Self {
        Self(Self::MATE.0 - ply)
    }

    pub const fn mated_in(ply: i32) -> Self {
        Self(-Self::MATE.0 + ply)
    }

    /// Replaces a bare `MATE`/`-MATE` with the distance-adjusted value.
    pub const fn convert_mate(self, ply: i32) -> Self {
        if self.0 == Self::MATE.0 {
            Self::mate_in(ply)
        } else if self.0 == -Self::MATE.0 {
            Self::mated_in(ply)
        } else {
            self
        }
    }

    pub const fn is_mate(self) -> bool {
        self.0.abs() >= Self::MATE_IN_MAX_PLY.0
    }

    /// Parses `win`, `loss` and `draw` from the side-to-move perspective.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "win" => Some(Self::MATE),
            "loss" => Some(-Self::MATE),
            "draw" => Some(Self::DRAW),
            _ => None,
        }
    }
}

impl Neg for Value {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Add<i32> for Value {
    type Output = Self;

    fn add(self, rhs: i32) -> Self {
        Self(self.0 + rhs)
    }
}

impl Sub<i32> for Value {
    type Output = Self;

    fn sub(self, rhs: i32) -> Self {
        Self(self.0 - rhs)
    }
}

pub const WHITE_OO: u8 = 1;
pub const WHITE_OOO: u8 = 2;
pub const BLACK_OO: u8 = 4;
pub const BLACK_OOO: u8 = 8;
pub const ANY_CASTLING: u8 = 15;

pub const fn castling_right(color: Color, kingside: bool) -> u8 {
    match (color, kingside) {
        (Color::White, true) => WHITE_OO,
        (Color::White, false) => WHITE_OOO,
        (Color::Black, true) => BLACK_OO,
        (Color::Black, false) => BLACK_OOO,
    }
}

pub const fn castling_rights_of(color: Color) -> u8 {
    match color {
        Color::White => WHITE_OO | WHITE_OOO,
        Color::Black => BLACK_OO | BLACK_OOO,
    }
}

macro_rules! named_rule {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            $($variant),+
        }

        impl $name {
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }
    };
}

named_rule!(CountingRule {
    None => "none",
    Makruk => "makruk",
    Cambodian => "cambodian",
    Asean => "asean",
});

named_rule!(MaterialCounting {
    None => "none",
    Janggi => "janggi",
    Unweighted => "unweighted",
    WhiteDrawOdds => "whitedrawodds",
    BlackDrawOdds => "blackdrawodds",
});

named_rule!(ChasingRule {
    None => "none",
    Axf => "axf",
});

named_rule!(EnclosingRule {
    None => "none",
    Reversi => "reversi",
    Ataxx => "ataxx",
});

named_rule!(WallingRule {
    None => "none",
    Arrow => "arrow",
    Duck => "duck",
    Edge => "edge",
    Past => "past",
    Static => "static",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_coordinates_round_trip() {
        let sq = Square::new(4, 3);
        assert_eq!(sq.file(), 4);
        assert_eq!(sq.rank(), 3);
        assert_eq!(sq.to_string(), "e4");
        assert_eq!(Square::parse("e4"), Some(sq));
        assert_eq!(Square::parse("4e"), Some(Square::new(4, 3)));
        assert_eq!(Square::parse("l10"), Some(Square::new(11, 9)));
        assert_eq!(Square::parse("m1"), None);
        assert_eq!(Square::parse("a11"), None);
        assert_eq!(Square::parse("bad"), None);
    }

    #[test]
    fn piece_packs_color_and_type() {
        let piece = Piece::new(Color::Black, PieceType::LANCE);
        assert_eq!(piece.color(), Color::Black);
        assert_eq!(piece.piece_type(), PieceType::LANCE);
        assert_eq!(piece.flip(), Piece::new(Color::White, PieceType::LANCE));
        assert!(Piece::WALL.is_wall());
        assert!(!Piece::WALL.is_piece());
        assert!(Piece::NONE.is_none());
    }

    #[test]
    fn piece_names_resolve() {
        for (pt, name) in PieceType::CANONICAL_NAMES {
            assert_eq!(PieceType::from_name(name), Some(pt));
            assert_eq!(pt.name(), name);
        }
        assert_eq!(PieceType::from_name("customPiece3"), PieceType::custom(3));
        assert_eq!(PieceType::from_name("customPiece21"), None);
        assert_eq!(PieceType::from_name("khon"), Some(PieceType::SILVER));
    }

    #[test]
    fn move_fields_survive_packing() {
        let from = Square::new(4, 1);
        let to = Square::new(4, 3);
        let gate = Square::new(4, 0);
        let mv = Move::normal(from, to).with_gating(PieceType::ARCHBISHOP, gate);
        assert_eq!(mv.from(), from);
        assert_eq!(mv.to(), to);
        assert_eq!(mv.move_type(), MoveType::Normal);
        assert_eq!(mv.gating_type(), PieceType::ARCHBISHOP);
        assert_eq!(mv.gating_square(), Some(gate));
        assert_eq!(mv.wall_square(), None);

        let drop = Move::drop(PieceType::ROOK, PieceType::DRAGON, to);
        assert!(drop.is_drop());
        assert_eq!(drop.in_hand_type(), PieceType::ROOK);
        assert_eq!(drop.dropped_type(), PieceType::DRAGON);
        assert!(!drop.is_gating());

        let walled = Move::normal(from, to).with_wall(gate);
        assert_eq!(walled.wall_square(), Some(gate));
        assert_eq!(walled.base(), Move::normal(from, to));
        assert!(Move::pass(from).is_pass());
    }

    #[test]
    fn mate_values_carry_distance() {
        assert_eq!(Value::MATE.convert_mate(3), Value::mate_in(3));
        assert_eq!((-Value::MATE).convert_mate(3), Value::mated_in(3));
        assert_eq!(Value::DRAW.convert_mate(3), Value::DRAW);
        assert!(Value::mated_in(10).is_mate());
    }

    #[test]
    fn piece_types_iterate_both_ways() {
        assert_eq!(PieceType::all().next(), Some(PieceType::PAWN));
        assert_eq!(PieceType::all().next_back(), Some(PieceType::KING));
        assert_eq!(PieceType::all().rev().count(), PieceType::all().count());
    }

    #[test]
    fn rule_names_parse() {
        assert_eq!(WallingRule::from_name("duck"), Some(WallingRule::Duck));
        assert_eq!(CountingRule::from_name("asean"), Some(CountingRule::Asean));
        assert_eq!(MaterialCounting::Janggi.name(), "janggi");
        assert_eq!(EnclosingRule::from_name("othello"), None);
    }
}
