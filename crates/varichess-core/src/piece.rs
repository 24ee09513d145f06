use std::sync::LazyLock;

use thiserror::Error;

use crate::bitboard::Direction;
use crate::constants::PIECE_TYPE_NB;
use crate::magic::RideKind;
use crate::types::PieceType;

pub const QUIET: usize = 0;
pub const CAPTURE: usize = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PieceError {
    #[error("unknown character '{0}' in movement '{1}'")]
    UnknownCharacter(char, String),
    #[error("modifiers without an atom at the end of '{0}'")]
    DanglingModifier(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ride {
    pub dir: Direction,
    pub kind: RideKind,
    pub limit: Option<u8>,
}

/// Compiled movement of one piece type, seen from White. Index 0 of each
/// bucket is the quiet modality, index 1 the capturing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceInfo {
    pub name: String,
    pub betza: String,
    pub steps: [Vec<Direction>; 2],
    pub lame_steps: [Vec<Direction>; 2],
    pub rides: [Vec<Ride>; 2],
    /// At least one atom was marked initial-only; those atoms are not compiled.
    pub initial: bool,
    pub en_passant: bool,
}

impl PieceInfo {
    pub fn from_betza(name: &str, betza: &str) -> Result<Self, PieceError> {
        let mut info = Self {
            name: name.to_string(),
            betza: betza.to_string(),
            ..Self::default()
        };
        let chars: Vec<char> = betza.chars().collect();
        let mut mods = Modifiers::default();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            i += 1;
            match c {
                'm' => mods.quiet = true,
                'c' => mods.capture = true,
                'p' => mods.hop = Some(RideKind::Cannon),
                'g' => mods.hop = Some(RideKind::Grasshopper),
                'n' => mods.lame = true,
                'i' => mods.initial = true,
                'e' => {
                    info.en_passant = true;
                    mods.touched = true;
                }
                'f' | 'b' | 'l' | 'r' | 'v' | 's' | 'h' => mods.dirs.push(c),
                'A'..='Z' => {
                    let atoms = atoms_of(c).ok_or_else(|| PieceError::UnknownCharacter(c, betza.to_string()))?;
                    let mut range = None;
                    if i < chars.len() && chars[i] == c {
                        range = Some(None);
                        i += 1;
                    } else {
                        let start = i;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        if i > start {
                            let digits: String = chars[start..i].iter().collect();
                            let n = digits.parse::<u8>().unwrap_or(0);
                            range = Some(if n == 0 { None } else { Some(n) });
                        }
                    }
                    for (a, b, rider) in atoms {
                        let range = if rider && range.is_none() { Some(None) } else { range };
                        info.add_atom(a, b, range, &mods);
                    }
                    mods = Modifiers::default();
                }
                _ => return Err(PieceError::UnknownCharacter(c, betza.to_string())),
            }
        }
        if mods.is_set() {
            return Err(PieceError::DanglingModifier(betza.to_string()));
        }
        Ok(info)
    }

    fn add_atom(&mut self, a: i8, b: i8, range: Option<Option<u8>>, mods: &Modifiers) {
        if mods.initial {
            self.initial = true;
            return;
        }
        let modalities: &[usize] = match (mods.quiet, mods.capture) {
            (true, false) => &[QUIET],
            (false, true) => &[CAPTURE],
            _ => &[QUIET, CAPTURE],
        };
        for dir in atom_directions(a, b, &mods.dirs) {
            for &modality in modalities {
                if let Some(kind) = mods.hop {
                    let limit = match kind {
                        RideKind::Grasshopper => Some(1),
                        _ => range.flatten(),
                    };
                    push_unique(&mut self.rides[modality], Ride { dir, kind, limit });
                } else if let Some(limit) = range {
                    push_unique(&mut self.rides[modality], Ride { dir, kind: RideKind::Slide, limit });
                } else if mods.lame && a.max(b) >= 2 {
                    push_unique(&mut self.lame_steps[modality], dir);
                } else {
                    push_unique(&mut self.steps[modality], dir);
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.iter().all(Vec::is_empty)
            && self.lame_steps.iter().all(Vec::is_empty)
            && self.rides.iter().all(Vec::is_empty)
    }

    pub fn has_hoppers(&self) -> bool {
        self.rides
            .iter()
            .flatten()
            .any(|r| r.kind != RideKind::Slide)
    }

    pub fn has_lame(&self) -> bool {
        self.lame_steps.iter().any(|s| !s.is_empty())
    }

    /// Riders leaping over squares (nightriders and other oblique rides).
    pub fn has_oblique_rides(&self) -> bool {
        self.rides
            .iter()
            .flatten()
            .any(|r| r.dir.df != 0 && r.dir.dr != 0 && r.dir.df.abs() != r.dir.dr.abs())
    }

    pub fn merge(&mut self, other: &PieceInfo) {
        for m in [QUIET, CAPTURE] {
            for d in &other.steps[m] {
                push_unique(&mut self.steps[m], *d);
            }
            for d in &other.lame_steps[m] {
                push_unique(&mut self.lame_steps[m], *d);
            }
            for r in &other.rides[m] {
                push_unique(&mut self.rides[m], *r);
            }
        }
    }
}

fn push_unique<T: PartialEq>(v: &mut Vec<T>, item: T) {
    if !v.contains(&item) {
        v.push(item);
    }
}

#[derive(Debug, Default)]
struct Modifiers {
    quiet: bool,
    capture: bool,
    hop: Option<RideKind>,
    lame: bool,
    initial: bool,
    touched: bool,
    dirs: Vec<char>,
}

impl Modifiers {
    fn is_set(&self) -> bool {
        self.quiet
            || self.capture
            || self.hop.is_some()
            || self.lame
            || self.initial
            || self.touched
            || !self.dirs.is_empty()
    }
}

/// `(major, minor, rides by default)` for an atom letter.
fn atoms_of(c: char) -> Option<Vec<(i8, i8, bool)>> {
    let atoms = match c {
        'W' => vec![(1, 0, false)],
        'F' => vec![(1, 1, false)],
        'D' => vec![(2, 0, false)],
        'N' => vec![(2, 1, false)],
        'A' => vec![(2, 2, false)],
        'H' => vec![(3, 0, false)],
        'C' | 'L' => vec![(3, 1, false)],
        'Z' | 'J' => vec![(3, 2, false)],
        'G' => vec![(3, 3, false)],
        'K' => vec![(1, 0, false), (1, 1, false)],
        'R' => vec![(1, 0, true)],
        'B' => vec![(1, 1, true)],
        'Q' => vec![(1, 0, true), (1, 1, true)],
        _ => return None,
    };
    Some(atoms)
}

fn single(c: char, x: i8, y: i8, class: AtomClass) -> bool {
    match c {
        'f' => y > 0,
        'b' => y < 0,
        'r' => x > 0,
        'l' => x < 0,
        'v' => match class {
            AtomClass::Orthogonal => x == 0,
            AtomClass::Diagonal => true,
            AtomClass::Oblique => y.abs() > x.abs(),
        },
        's' => match class {
            AtomClass::Orthogonal => y == 0,
            AtomClass::Diagonal => true,
            AtomClass::Oblique => x.abs() > y.abs(),
        },
        _ => true,
    }
}

fn major(c: char, x: i8, y: i8) -> bool {
    match c {
        'f' | 'b' | 'v' => y.abs() > x.abs(),
        _ => x.abs() > y.abs(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtomClass {
    Orthogonal,
    Diagonal,
    Oblique,
}

fn is_pair(class: AtomClass, c: char, n: char) -> bool {
    let fb = |ch: char| ch == 'f' || ch == 'b';
    let lr = |ch: char| ch == 'l' || ch == 'r';
    match class {
        AtomClass::Orthogonal => false,
        AtomClass::Diagonal => (fb(c) && lr(n)) || (lr(c) && fb(n)),
        AtomClass::Oblique => {
            (c == n && (fb(c) || lr(c)))
                || ((fb(c) || lr(c)) && (n == 'v' || n == 's'))
                || (fb(c) && lr(n))
                || (lr(c) && fb(n))
                || (c == 'h' && lr(n))
        }
    }
}

fn pair_matches(class: AtomClass, c: char, n: char, x: i8, y: i8) -> bool {
    match class {
        AtomClass::Diagonal => single(c, x, y, class) && single(n, x, y, class),
        _ if c == 'h' => {
            let right = (x > 0) == (y > 0);
            let vertical = y.abs() > x.abs();
            (right == vertical) == (n == 'r')
        }
        _ if n == 'v' || n == 's' => single(c, x, y, class) && major(n, x, y),
        _ if c == n => single(c, x, y, class) && major(c, x, y),
        _ => single(c, x, y, class) && single(n, x, y, class) && major(c, x, y),
    }
}

/// Direction vectors of the atom `(a, b)` selected by the direction modifiers.
pub fn atom_directions(a: i8, b: i8, spec: &[char]) -> Vec<Direction> {
    let class = if b == 0 {
        AtomClass::Orthogonal
    } else if a == b {
        AtomClass::Diagonal
    } else {
        AtomClass::Oblique
    };
    let mut all = Vec::new();
    for (x, y) in [(a, b), (b, a)] {
        for (sx, sy) in [(1, 1), (1, -1), (-1, 1), (-1, -1)] {
            push_unique(&mut all, Direction::new(x * sx, y * sy));
        }
    }
    if spec.is_empty() {
        return all;
    }

    let mut tokens = Vec::new();
    let mut j = 0;
    while j < spec.len() {
        match spec.get(j + 1) {
            Some(&n) if is_pair(class, spec[j], n) => {
                tokens.push((spec[j], Some(n)));
                j += 2;
            }
            _ => {
                tokens.push((spec[j], None));
                j += 1;
            }
        }
    }
    all.into_iter()
        .filter(|d| {
            tokens.iter().any(|(c, n)| match n {
                Some(n) => pair_matches(class, *c, *n, d.df, d.dr),
                None => single(*c, d.df, d.dr, class),
            })
        })
        .collect()
}

/// Intermediate offsets a lame leap passes through. Orthogonal steps come
/// first until the remainder is diagonal.
pub fn lame_path(leap: Direction) -> Vec<Direction> {
    let (tx, ty) = (leap.df, leap.dr);
    let (mut x, mut y) = (0i8, 0i8);
    let mut path = Vec::new();
    loop {
        let (rx, ry) = (tx - x, ty - y);
        if rx == 0 && ry == 0 {
            break;
        }
        if rx.abs() == ry.abs() {
            x += rx.signum();
            y += ry.signum();
        } else if rx.abs() > ry.abs() {
            x += rx.signum();
        } else {
            y += ry.signum();
        }
        if (x, y) != (tx, ty) {
            path.push(Direction::new(x, y));
        }
    }
    path
}

pub fn canonical_betza(pt: PieceType) -> Option<&'static str> {
    let betza = match pt {
        PieceType::PAWN => "fmWfcF",
        PieceType::KNIGHT => "N",
        PieceType::BISHOP => "B",
        PieceType::ROOK => "R",
        PieceType::QUEEN => "Q",
        PieceType::FERS => "F",
        PieceType::ALFIL => "A",
        PieceType::FERS_ALFIL => "FA",
        PieceType::SILVER => "FfW",
        PieceType::AIWOK => "RNF",
        PieceType::BERS => "RF",
        PieceType::ARCHBISHOP => "BN",
        PieceType::CHANCELLOR => "RN",
        PieceType::AMAZON => "QN",
        PieceType::KNIBIS => "mNcB",
        PieceType::BISKNI => "mBcN",
        PieceType::KNIROO => "mNcR",
        PieceType::ROOKNI => "mRcN",
        PieceType::SHOGI_PAWN => "fW",
        PieceType::LANCE => "fR",
        PieceType::SHOGI_KNIGHT => "ffN",
        PieceType::EUROSHOGI_KNIGHT => "ffNsW",
        PieceType::GOLD => "WfF",
        PieceType::DRAGON_HORSE => "BW",
        PieceType::CLOBBER => "cW",
        PieceType::BREAKTHROUGH => "fmWfF",
        PieceType::IMMOBILE => "",
        PieceType::CANNON => "mRcpR",
        PieceType::JANGGI_CANNON => "pR",
        PieceType::SOLDIER => "fsW",
        PieceType::HORSE => "nN",
        PieceType::ELEPHANT => "nA",
        PieceType::JANGGI_ELEPHANT => "nZ",
        PieceType::BANNER => "RcpRnN",
        PieceType::WAZIR => "W",
        PieceType::COMMONER => "K",
        PieceType::CENTAUR => "KN",
        PieceType::KING => "K",
        _ => return None,
    };
    Some(betza)
}

static CATALOG: LazyLock<Vec<Option<PieceInfo>>> = LazyLock::new(|| {
    let mut catalog = vec![None; PIECE_TYPE_NB];
    for (pt, name) in PieceType::CANONICAL_NAMES {
        if let Some(betza) = canonical_betza(pt) {
            catalog[pt.index()] = PieceInfo::from_betza(name, betza).ok();
        }
    }
    log::debug!("piece catalog compiled");
    catalog
});

/// Movement of a canonical piece type; custom slots have none until a variant defines them.
pub fn piece_info(pt: PieceType) -> Option<&'static PieceInfo> {
    CATALOG.get(pt.index()).and_then(Option::as_ref)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(v: &[(i8, i8)]) -> Vec<Direction> {
        v.iter().map(|&(x, y)| Direction::new(x, y)).collect()
    }

    fn sorted(mut v: Vec<Direction>) -> Vec<(i8, i8)> {
        let mut out: Vec<(i8, i8)> = v.drain(..).map(|d| (d.df, d.dr)).collect();
        out.sort_unstable();
        out
    }

    #[test]
    fn pawn_splits_modalities() {
        let pawn = PieceInfo::from_betza("pawn", "fmWfcF").unwrap();
        assert_eq!(pawn.steps[QUIET], dirs(&[(0, 1)]));
        assert_eq!(sorted(pawn.steps[CAPTURE].clone()), vec![(-1, 1), (1, 1)]);
        assert!(pawn.rides[QUIET].is_empty());
    }

    #[test]
    fn shogi_knight_only_jumps_forward_narrow() {
        let knight = PieceInfo::from_betza("shogiKnight", "ffN").unwrap();
        assert_eq!(sorted(knight.steps[QUIET].clone()), vec![(-1, 2), (1, 2)]);
    }

    #[test]
    fn doubled_atom_and_digit_make_riders() {
        let nightrider = PieceInfo::from_betza("nightrider", "NN").unwrap();
        assert_eq!(nightrider.rides[QUIET].len(), 8);
        assert!(nightrider.rides[QUIET].iter().all(|r| r.limit.is_none()));

        let short = PieceInfo::from_betza("shortRook", "R2").unwrap();
        assert!(short.rides[CAPTURE].iter().all(|r| r.limit == Some(2)));
    }

    #[test]
    fn hoppers_and_lame_leapers() {
        let cannon = PieceInfo::from_betza("cannon", "mRcpR").unwrap();
        assert!(cannon.rides[CAPTURE].iter().all(|r| r.kind == RideKind::Cannon));
        assert!(cannon.rides[QUIET].iter().all(|r| r.kind == RideKind::Slide));

        let grasshopper = PieceInfo::from_betza("grasshopper", "gQ").unwrap();
        assert!(grasshopper.rides[QUIET].iter().all(|r| r.limit == Some(1)));

        let horse = PieceInfo::from_betza("horse", "nN").unwrap();
        assert_eq!(horse.lame_steps[QUIET].len(), 8);
        assert!(horse.steps[QUIET].is_empty());
    }

    #[test]
    fn lame_paths_step_orthogonally_first() {
        assert_eq!(lame_path(Direction::new(1, 2)), dirs(&[(0, 1)]));
        assert_eq!(lame_path(Direction::new(2, 2)), dirs(&[(1, 1)]));
        assert_eq!(lame_path(Direction::new(-2, 3)), dirs(&[(0, 1), (-1, 2)]));
    }

    #[test]
    fn oblique_direction_pairs() {
        assert_eq!(sorted(atom_directions(2, 1, &['f', 's'])), vec![(-2, 1), (2, 1)]);
        assert_eq!(sorted(atom_directions(2, 1, &['f', 'r'])), vec![(1, 2)]);
        assert_eq!(sorted(atom_directions(2, 1, &['r', 'f'])), vec![(2, 1)]);
        assert_eq!(atom_directions(2, 1, &['h', 'r']).len(), 4);
        assert_eq!(atom_directions(2, 1, &['f']).len(), 4);
    }

    #[test]
    fn rejects_bad_strings() {
        assert!(matches!(
            PieceInfo::from_betza("x", "fX"),
            Err(PieceError::UnknownCharacter('X', _))
        ));
        assert!(matches!(
            PieceInfo::from_betza("x", "Wfm"),
            Err(PieceError::DanglingModifier(_))
        ));
    }

    #[test]
    fn catalog_covers_canonical_types() {
        for (pt, _) in PieceType::CANONICAL_NAMES {
            assert!(piece_info(pt).is_some(), "{}", pt.name());
        }
        assert!(piece_info(PieceType::IMMOBILE).is_some_and(PieceInfo::is_empty));
    }
}
