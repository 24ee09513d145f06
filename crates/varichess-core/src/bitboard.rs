use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::sync::LazyLock;

use crate::constants::{FILE_NB, RANK_NB, SQUARE_NB};
use crate::types::{Color, Square};

/// Set of squares on the 12x10 grid. Bits at and above 120 are always clear.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bitboard(pub u128);

const ALL_BITS: u128 = (1u128 << SQUARE_NB) - 1;

impl Bitboard {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(ALL_BITS);

    pub const fn square(sq: Square) -> Self {
        Self(1u128 << sq.index())
    }

    pub const fn file(file: u8) -> Self {
        let mut bits = 0u128;
        let mut rank = 0;
        while rank < RANK_NB {
            bits |= 1u128 << (rank * FILE_NB + file as usize);
            rank += 1;
        }
        Self(bits)
    }

    pub const fn rank(rank: u8) -> Self {
        Self(((1u128 << FILE_NB) - 1) << (rank as usize * FILE_NB))
    }

    /// Squares with file <= `max_file` and rank <= `max_rank`.
    pub const fn board(max_file: u8, max_rank: u8) -> Self {
        let mut bits = 0u128;
        let mut f = 0;
        while f <= max_file {
            bits |= Self::file(f).0;
            f += 1;
        }
        let mut ranks = 0u128;
        let mut r = 0;
        while r <= max_rank {
            ranks |= Self::rank(r).0;
            r += 1;
        }
        Self(bits & ranks)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn any(self) -> bool {
        self.0 != 0
    }

    pub const fn contains(self, sq: Square) -> bool {
        self.0 & (1u128 << sq.index()) != 0
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn more_than_one(self) -> bool {
        self.0 & self.0.wrapping_sub(1) != 0
    }

    pub fn set(&mut self, sq: Square) {
        self.0 |= 1u128 << sq.index();
    }

    pub fn clear(&mut self, sq: Square) {
        self.0 &= !(1u128 << sq.index());
    }

    pub fn lsb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Square::from_index(self.0.trailing_zeros() as usize)
        }
    }

    pub fn msb(self) -> Option<Square> {
        if self.0 == 0 {
            None
        } else {
            Square::from_index(127 - self.0.leading_zeros() as usize)
        }
    }

    pub fn pop_lsb(&mut self) -> Option<Square> {
        let sq = self.lsb()?;
        self.0 &= self.0 - 1;
        Some(sq)
    }

    /// Translates every square by `(df, dr)`, dropping squares that leave the grid.
    pub fn shift(self, df: i32, dr: i32) -> Self {
        let mut bits = self.0;
        if df > 0 {
            bits &= !FILES_FROM_RIGHT[df.min(FILE_NB as i32) as usize].0;
        } else if df < 0 {
            bits &= !FILES_FROM_LEFT[(-df).min(FILE_NB as i32) as usize].0;
        }
        let amount = dr * FILE_NB as i32 + df;
        let shifted = if amount >= 128 || amount <= -128 {
            0
        } else if amount >= 0 {
            bits << amount
        } else {
            bits >> -amount
        };
        Self(shifted & ALL_BITS)
    }

    /// One step toward the opponent of `color`.
    pub fn push(self, color: Color) -> Self {
        match color {
            Color::White => self.shift(0, 1),
            Color::Black => self.shift(0, -1),
        }
    }

    pub fn iter(self) -> BitboardIter {
        BitboardIter(self)
    }
}

// Files that would wrap around when shifting right (left) by n.
static FILES_FROM_RIGHT: LazyLock<[Bitboard; FILE_NB + 1]> = LazyLock::new(|| {
    let mut masks = [Bitboard::EMPTY; FILE_NB + 1];
    for n in 1..=FILE_NB {
        masks[n] = masks[n - 1] | Bitboard::file((FILE_NB - n) as u8);
    }
    masks
});

static FILES_FROM_LEFT: LazyLock<[Bitboard; FILE_NB + 1]> = LazyLock::new(|| {
    let mut masks = [Bitboard::EMPTY; FILE_NB + 1];
    for n in 1..=FILE_NB {
        masks[n] = masks[n - 1] | Bitboard::file((n - 1) as u8);
    }
    masks
});

pub struct BitboardIter(Bitboard);

impl Iterator for BitboardIter {
    type Item = Square;

    fn next(&mut self) -> Option<Square> {
        self.0.pop_lsb()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count() as usize;
        (n, Some(n))
    }
}

impl IntoIterator for Bitboard {
    type Item = Square;
    type IntoIter = BitboardIter;

    fn into_iter(self) -> BitboardIter {
        self.iter()
    }
}

impl FromIterator<Square> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Square>>(iter: I) -> Self {
        let mut bb = Self::EMPTY;
        for sq in iter {
            bb.set(sq);
        }
        bb
    }
}

impl From<Square> for Bitboard {
    fn from(sq: Square) -> Self {
        Self::square(sq)
    }
}

impl BitAnd for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitXor for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }
}

impl BitAnd<Square> for Bitboard {
    type Output = Self;
    fn bitand(self, rhs: Square) -> Self {
        self & Self::square(rhs)
    }
}

impl BitOr<Square> for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Square) -> Self {
        self | Self::square(rhs)
    }
}

impl BitXor<Square> for Bitboard {
    type Output = Self;
    fn bitxor(self, rhs: Square) -> Self {
        self ^ Self::square(rhs)
    }
}

impl Not for Bitboard {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0 & ALL_BITS)
    }
}

impl BitAndAssign for Bitboard {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for Bitboard {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitXorAssign for Bitboard {
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0;
    }
}

impl BitOrAssign<Square> for Bitboard {
    fn bitor_assign(&mut self, rhs: Square) {
        self.set(rhs);
    }
}

impl BitXorAssign<Square> for Bitboard {
    fn bitxor_assign(&mut self, rhs: Square) {
        self.0 ^= 1u128 << rhs.index();
    }
}

impl fmt::Display for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..RANK_NB as u8).rev() {
            for file in 0..FILE_NB as u8 {
                let c = if self.contains(Square::new(file, rank)) { 'X' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    pub df: i8,
    pub dr: i8,
}

impl Direction {
    pub const fn new(df: i8, dr: i8) -> Self {
        Self { df, dr }
    }

    pub const fn negate(self) -> Self {
        Self::new(-self.df, -self.dr)
    }
}

pub const KING_DIRECTIONS: [Direction; 8] = [
    Direction::new(0, 1),
    Direction::new(1, 1),
    Direction::new(1, 0),
    Direction::new(1, -1),
    Direction::new(0, -1),
    Direction::new(-1, -1),
    Direction::new(-1, 0),
    Direction::new(-1, 1),
];

pub const KNIGHT_DIRECTIONS: [Direction; 8] = [
    Direction::new(1, 2),
    Direction::new(2, 1),
    Direction::new(2, -1),
    Direction::new(1, -2),
    Direction::new(-1, -2),
    Direction::new(-2, -1),
    Direction::new(-2, 1),
    Direction::new(-1, 2),
];

pub const DARK_SQUARES: Bitboard = {
    let mut bits = 0u128;
    let mut i = 0;
    while i < SQUARE_NB {
        if (i % FILE_NB + i / FILE_NB) % 2 == 0 {
            bits |= 1u128 << i;
        }
        i += 1;
    }
    Bitboard(bits)
};

pub fn distance(a: Square, b: Square) -> u8 {
    a.file().abs_diff(b.file()).max(a.rank().abs_diff(b.rank()))
}

/// Squares from `from` (exclusive) to the grid edge along `dir`.
pub fn walk(from: Square, dir: Direction) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    let mut cur = from;
    while let Some(next) = cur.offset(i32::from(dir.df), i32::from(dir.dr)) {
        bb.set(next);
        cur = next;
    }
    bb
}

struct LineTables {
    between: Vec<Bitboard>,
    line: Vec<Bitboard>,
    rays: Vec<Bitboard>,
    adjacent: [Bitboard; SQUARE_NB],
}

static LINE_TABLES: LazyLock<LineTables> = LazyLock::new(|| {
    let mut between = vec![Bitboard::EMPTY; SQUARE_NB * SQUARE_NB];
    let mut line = vec![Bitboard::EMPTY; SQUARE_NB * SQUARE_NB];
    let mut rays = vec![Bitboard::EMPTY; SQUARE_NB * 16];
    let mut adjacent = [Bitboard::EMPTY; SQUARE_NB];

    for s1 in Square::all() {
        for (d, dir) in KING_DIRECTIONS.iter().chain(KNIGHT_DIRECTIONS.iter()).enumerate() {
            rays[s1.index() * 16 + d] = walk(s1, *dir);
            let full = walk(s1, *dir) | walk(s1, dir.negate()) | s1;
            let mut path = Bitboard::EMPTY;
            for s2 in walk(s1, *dir) {
                between[s1.index() * SQUARE_NB + s2.index()] = path;
                line[s1.index() * SQUARE_NB + s2.index()] = full;
                path.set(s2);
            }
        }
        for dir in KING_DIRECTIONS {
            if let Some(s2) = s1.offset(i32::from(dir.df), i32::from(dir.dr)) {
                adjacent[s1.index()].set(s2);
            }
        }
    }
    LineTables { between, line, rays, adjacent }
});

/// Squares strictly between two squares sharing a king or knight line.
pub fn between_bb(a: Square, b: Square) -> Bitboard {
    LINE_TABLES.between[a.index() * SQUARE_NB + b.index()]
}

/// The full line through two aligned squares, empty otherwise.
pub fn line_bb(a: Square, b: Square) -> Bitboard {
    LINE_TABLES.line[a.index() * SQUARE_NB + b.index()]
}

pub fn aligned(a: Square, b: Square, c: Square) -> bool {
    line_bb(a, b).contains(c)
}

/// Ray from `sq` in direction `index`: 0-7 follow [`KING_DIRECTIONS`], 8-15 [`KNIGHT_DIRECTIONS`].
pub fn ray(sq: Square, index: usize) -> Bitboard {
    LINE_TABLES.rays[sq.index() * 16 + index]
}

pub fn direction_index(dir: Direction) -> Option<usize> {
    KING_DIRECTIONS
        .iter()
        .chain(KNIGHT_DIRECTIONS.iter())
        .position(|d| *d == dir)
}

pub fn adjacent_squares(sq: Square) -> Bitboard {
    LINE_TABLES.adjacent[sq.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_drops_wrapped_files() {
        let h = Bitboard::file(11);
        assert!(h.shift(1, 0).is_empty());
        assert_eq!(Bitboard::file(0).shift(-1, 0), Bitboard::EMPTY);
        assert_eq!(Bitboard::rank(9).shift(0, 1), Bitboard::EMPTY);
        assert_eq!(Bitboard::file(3).shift(2, 0), Bitboard::file(5));
    }

    #[test]
    fn between_covers_knight_lines() {
        let a = Square::new(0, 0);
        let b = Square::new(2, 4);
        assert_eq!(between_bb(a, b), Bitboard::square(Square::new(1, 2)));
        assert_eq!(between_bb(a, Square::new(1, 2)), Bitboard::EMPTY);
        assert_eq!(between_bb(Square::new(0, 0), Square::new(3, 3)).count(), 2);
    }

    #[test]
    fn dark_squares_match_a1() {
        assert!(DARK_SQUARES.contains(Square::new(0, 0)));
        assert!(!DARK_SQUARES.contains(Square::new(1, 0)));
    }
}
