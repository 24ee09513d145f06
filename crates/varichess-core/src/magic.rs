use std::sync::LazyLock;

#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::bitboard::{Bitboard, Direction};
use crate::constants::SQUARE_NB;
use crate::types::Square;

/// How a ray treats the pieces standing on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RideKind {
    /// Stops on (and includes) the first occupied square.
    Slide,
    /// Jumps the first piece, then slides up to and including the next one.
    Cannon,
    /// Lands directly behind the first piece.
    Grasshopper,
}

/// A family of directions sharing one magic table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    Horizontal,
    Vertical,
    Diagonal,
    AntiDiagonal,
    NightA,
    NightB,
}

impl Line {
    pub const fn directions(self) -> &'static [Direction] {
        const H: [Direction; 2] = [Direction::new(1, 0), Direction::new(-1, 0)];
        const V: [Direction; 2] = [Direction::new(0, 1), Direction::new(0, -1)];
        const D: [Direction; 2] = [Direction::new(1, 1), Direction::new(-1, -1)];
        const A: [Direction; 2] = [Direction::new(1, -1), Direction::new(-1, 1)];
        const NA: [Direction; 4] = [
            Direction::new(1, 2),
            Direction::new(-1, -2),
            Direction::new(2, 1),
            Direction::new(-2, -1),
        ];
        const NB: [Direction; 4] = [
            Direction::new(2, -1),
            Direction::new(-2, 1),
            Direction::new(1, -2),
            Direction::new(-1, 2),
        ];
        match self {
            Self::Horizontal => &H,
            Self::Vertical => &V,
            Self::Diagonal => &D,
            Self::AntiDiagonal => &A,
            Self::NightA => &NA,
            Self::NightB => &NB,
        }
    }

    /// The table holding `dir`, if any.
    pub fn of(dir: Direction) -> Option<Self> {
        [
            Self::Horizontal,
            Self::Vertical,
            Self::Diagonal,
            Self::AntiDiagonal,
            Self::NightA,
            Self::NightB,
        ]
        .into_iter()
        .find(|line| line.directions().contains(&dir))
    }
}

/// Reference ray walk; `limit` caps the number of squares visited per direction.
pub fn ride_attacks(
    kind: RideKind,
    sq: Square,
    occupied: Bitboard,
    dirs: &[Direction],
    limit: Option<u8>,
) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for dir in dirs {
        let mut cur = sq;
        let mut steps = 0u8;
        let mut hurdle = false;
        while let Some(next) = cur.offset(i32::from(dir.df), i32::from(dir.dr)) {
            if limit.is_some_and(|l| steps >= l) {
                break;
            }
            cur = next;
            let blocked = occupied.contains(next);
            match kind {
                RideKind::Slide => {
                    steps += 1;
                    attacks.set(next);
                    if blocked {
                        break;
                    }
                }
                RideKind::Cannon => {
                    if hurdle {
                        steps += 1;
                        attacks.set(next);
                        if blocked {
                            break;
                        }
                    } else if blocked {
                        hurdle = true;
                    }
                }
                RideKind::Grasshopper => {
                    if hurdle {
                        attacks.set(next);
                        break;
                    }
                    hurdle = blocked;
                }
            }
        }
    }
    attacks
}

fn relevance_mask(sq: Square, dirs: &[Direction]) -> Bitboard {
    let mut mask = Bitboard::EMPTY;
    for dir in dirs {
        let mut cur = sq;
        while let Some(next) = cur.offset(i32::from(dir.df), i32::from(dir.dr)) {
            if next.offset(i32::from(dir.df), i32::from(dir.dr)).is_some() {
                mask.set(next);
            }
            cur = next;
        }
    }
    mask
}

#[derive(Debug, Clone, Copy, Default)]
struct Magic {
    mask: Bitboard,
    #[cfg_attr(all(target_arch = "x86_64", target_feature = "bmi2"), allow(dead_code))]
    magic: u128,
    #[cfg_attr(all(target_arch = "x86_64", target_feature = "bmi2"), allow(dead_code))]
    bits: u32,
    offset: usize,
}

impl Magic {
    #[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
    fn index(&self, occupied: Bitboard) -> usize {
        use std::arch::x86_64::_pext_u64;
        let occ = occupied.0;
        let mask = self.mask.0;
        // SAFETY: the bmi2 target feature is enabled for this build.
        let (lo, hi) = unsafe {
            (
                _pext_u64(occ as u64, mask as u64),
                _pext_u64((occ >> 64) as u64, (mask >> 64) as u64),
            )
        };
        (lo | (hi << (mask as u64).count_ones())) as usize
    }

    #[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
    fn index(&self, occupied: Bitboard) -> usize {
        if self.bits == 0 {
            return 0;
        }
        ((occupied.0 & self.mask.0).wrapping_mul(self.magic) >> (128 - self.bits)) as usize
    }
}

pub struct MagicTable {
    magics: Vec<Magic>,
    attacks: Vec<Bitboard>,
}

impl MagicTable {
    fn build(kind: RideKind, line: Line, seed: u64) -> Self {
        let dirs = line.directions();
        let mut magics = vec![Magic::default(); SQUARE_NB];
        let mut attacks = Vec::new();

        for sq in Square::all() {
            let mask = relevance_mask(sq, dirs);
            let bits = mask.count();
            let size = 1usize << bits;
            let offset = attacks.len();
            attacks.resize(offset + size, Bitboard::EMPTY);

            // Carry-Rippler walk over every subset of the mask.
            let mut occupancy = Vec::with_capacity(size);
            let mut reference = Vec::with_capacity(size);
            let mut subset = 0u128;
            loop {
                occupancy.push(Bitboard(subset));
                reference.push(ride_attacks(kind, sq, Bitboard(subset), dirs, None));
                subset = subset.wrapping_sub(mask.0) & mask.0;
                if subset == 0 {
                    break;
                }
            }

            let mut m = Magic { mask, magic: 0, bits, offset };
            fill_table(
                &mut m,
                &occupancy,
                &reference,
                &mut attacks[offset..],
                seed ^ (sq.index() as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15),
            );
            magics[sq.index()] = m;
        }

        Self { magics, attacks }
    }

    pub fn attacks(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let m = &self.magics[sq.index()];
        self.attacks[m.offset + m.index(occupied & m.mask)]
    }
}

#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
fn fill_table(
    m: &mut Magic,
    occupancy: &[Bitboard],
    reference: &[Bitboard],
    table: &mut [Bitboard],
    _seed: u64,
) {
    for (occ, att) in occupancy.iter().zip(reference) {
        table[m.index(*occ)] = *att;
    }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
fn fill_table(
    m: &mut Magic,
    occupancy: &[Bitboard],
    reference: &[Bitboard],
    table: &mut [Bitboard],
    seed: u64,
) {
    let size = occupancy.len();
    if m.bits == 0 {
        table[0] = reference[0];
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut epoch = vec![0u32; size];
    let mut attempt = 0u32;
    loop {
        m.magic = rng.gen::<u128>() & rng.gen::<u128>() & rng.gen::<u128>();
        if ((m.mask.0.wrapping_mul(m.magic)) >> (128 - m.bits)).count_ones() < m.bits / 2 {
            continue;
        }
        attempt += 1;
        let mut ok = true;
        for (occ, att) in occupancy.iter().zip(reference) {
            let idx = m.index(*occ);
            if epoch[idx] < attempt {
                epoch[idx] = attempt;
                table[idx] = *att;
            } else if table[idx] != *att {
                ok = false;
                break;
            }
        }
        if ok {
            return;
        }
    }
}

struct Tables {
    slide: [MagicTable; 6],
    cannon: [MagicTable; 4],
    grasshopper: [MagicTable; 4],
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| {
    log::debug!("building magic attack tables");
    let build = |kind: RideKind, line: Line, id: u64| MagicTable::build(kind, line, 0x5EED_0000 + id);
    Tables {
        slide: [
            build(RideKind::Slide, Line::Horizontal, 1),
            build(RideKind::Slide, Line::Vertical, 2),
            build(RideKind::Slide, Line::Diagonal, 3),
            build(RideKind::Slide, Line::AntiDiagonal, 4),
            build(RideKind::Slide, Line::NightA, 5),
            build(RideKind::Slide, Line::NightB, 6),
        ],
        cannon: [
            build(RideKind::Cannon, Line::Horizontal, 7),
            build(RideKind::Cannon, Line::Vertical, 8),
            build(RideKind::Cannon, Line::Diagonal, 9),
            build(RideKind::Cannon, Line::AntiDiagonal, 10),
        ],
        grasshopper: [
            build(RideKind::Grasshopper, Line::Horizontal, 11),
            build(RideKind::Grasshopper, Line::Vertical, 12),
            build(RideKind::Grasshopper, Line::Diagonal, 13),
            build(RideKind::Grasshopper, Line::AntiDiagonal, 14),
        ],
    }
});

/// Forces table construction.
pub fn init() {
    LazyLock::force(&TABLES);
}

/// Magic lookup for an unlimited ride along `line`. Nightrider lines only exist for sliding.
pub fn line_attacks(kind: RideKind, line: Line, sq: Square, occupied: Bitboard) -> Option<Bitboard> {
    let tables = &*TABLES;
    let i = line as usize;
    match kind {
        RideKind::Slide => Some(tables.slide[i].attacks(sq, occupied)),
        RideKind::Cannon if i < 4 => Some(tables.cannon[i].attacks(sq, occupied)),
        RideKind::Grasshopper if i < 4 => Some(tables.grasshopper[i].attacks(sq, occupied)),
        _ => None,
    }
}

pub fn rook_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = &*TABLES;
    tables.slide[Line::Horizontal as usize].attacks(sq, occupied)
        | tables.slide[Line::Vertical as usize].attacks(sq, occupied)
}

pub fn bishop_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    let tables = &*TABLES;
    tables.slide[Line::Diagonal as usize].attacks(sq, occupied)
        | tables.slide[Line::AntiDiagonal as usize].attacks(sq, occupied)
}

pub fn vertical_attacks(sq: Square, occupied: Bitboard) -> Bitboard {
    TABLES.slide[Line::Vertical as usize].attacks(sq, occupied)
}
