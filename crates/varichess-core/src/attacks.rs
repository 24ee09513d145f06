use crate::bitboard::{direction_index, ray, Bitboard, Direction};
use crate::board::Board;
use crate::constants::{COLOR_NB, PIECE_TYPE_NB, SQUARE_NB};
use crate::magic::{line_attacks, ride_attacks, Line, RideKind};
use crate::piece::{lame_path, PieceInfo, Ride, CAPTURE, QUIET};
use crate::types::{relative_rank, Color, PieceSet, PieceType, Square};
use crate::variant::Variant;

const LINES: [Line; 6] = [
    Line::Horizontal,
    Line::Vertical,
    Line::Diagonal,
    Line::AntiDiagonal,
    Line::NightA,
    Line::NightB,
];

/// One modality of one colored piece type, compiled against the full grid.
#[derive(Debug, Clone)]
struct Movement {
    leaps: Vec<Bitboard>,
    lame: Vec<Vec<(Square, Bitboard)>>,
    magic: Vec<(RideKind, Line, Option<usize>)>,
    generic: Vec<Ride>,
    pseudo: Vec<Bitboard>,
}

impl Movement {
    fn build(steps: &[Direction], lame: &[Direction], rides: &[Ride], color: Color) -> Self {
        let orient = |d: Direction| match color {
            Color::White => d,
            Color::Black => d.negate(),
        };
        let mut leaps = vec![Bitboard::EMPTY; SQUARE_NB];
        let mut lame_targets = vec![Vec::new(); SQUARE_NB];
        for sq in Square::all() {
            for d in steps.iter().copied().map(orient) {
                if d.df.abs().max(d.dr.abs()) > 3 {
                    continue;
                }
                if let Some(to) = sq.offset(i32::from(d.df), i32::from(d.dr)) {
                    leaps[sq.index()].set(to);
                }
            }
            for d in lame.iter().copied().map(orient) {
                let Some(to) = sq.offset(i32::from(d.df), i32::from(d.dr)) else {
                    continue;
                };
                let path: Option<Bitboard> = lame_path(d)
                    .into_iter()
                    .map(|p| sq.offset(i32::from(p.df), i32::from(p.dr)))
                    .collect::<Option<Vec<_>>>()
                    .map(|squares| squares.into_iter().collect());
                if let Some(path) = path {
                    lame_targets[sq.index()].push((to, path));
                }
            }
        }

        let oriented: Vec<Ride> = rides
            .iter()
            .map(|r| Ride { dir: orient(r.dir), ..*r })
            .collect();
        let mut magic = Vec::new();
        let mut generic = Vec::new();
        let mut handled = vec![false; oriented.len()];
        for kind in [RideKind::Slide, RideKind::Cannon, RideKind::Grasshopper] {
            let table_limit = match kind {
                RideKind::Grasshopper => Some(1),
                _ => None,
            };
            for line in LINES {
                if line_attacks(kind, line, Square::new(0, 0), Bitboard::EMPTY).is_none() {
                    continue;
                }
                let present: Vec<usize> = oriented
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| {
                        r.kind == kind && r.limit == table_limit && line.directions().contains(&r.dir)
                    })
                    .map(|(i, _)| i)
                    .collect();
                if present.is_empty() {
                    continue;
                }
                if present.len() == line.directions().len() {
                    magic.push((kind, line, None));
                } else {
                    for &i in &present {
                        magic.push((kind, line, direction_index(oriented[i].dir)));
                    }
                }
                for i in present {
                    handled[i] = true;
                }
            }
        }
        for (i, ride) in oriented.iter().enumerate() {
            if !handled[i] {
                generic.push(*ride);
            }
        }

        let mut pseudo = vec![Bitboard::EMPTY; SQUARE_NB];
        for sq in Square::all() {
            let mut b = leaps[sq.index()];
            for (to, _) in &lame_targets[sq.index()] {
                b.set(*to);
            }
            for ride in &oriented {
                let limit = if ride.kind == RideKind::Slide { ride.limit } else { None };
                b |= ride_attacks(RideKind::Slide, sq, Bitboard::EMPTY, &[ride.dir], limit);
            }
            pseudo[sq.index()] = b;
        }

        Self {
            leaps,
            lame: lame_targets,
            magic,
            generic,
            pseudo,
        }
    }

    fn eval(&self, sq: Square, occupied: Bitboard) -> Bitboard {
        let mut b = self.leaps[sq.index()];
        for (to, path) in &self.lame[sq.index()] {
            if (*path & occupied).is_empty() {
                b.set(*to);
            }
        }
        for &(kind, line, dir) in &self.magic {
            if let Some(mut r) = line_attacks(kind, line, sq, occupied) {
                if let Some(d) = dir {
                    r &= ray(sq, d);
                }
                b |= r;
            }
        }
        for ride in &self.generic {
            b |= ride_attacks(ride.kind, sq, occupied, &[ride.dir], ride.limit);
        }
        b
    }

    fn is_empty(&self) -> bool {
        self.pseudo.iter().all(|b| b.is_empty())
    }
}

#[derive(Debug, Clone)]
struct PieceMovement {
    base: Movement,
    palace: Option<Movement>,
    restricted: Option<Movement>,
}

/// Movement tables of every piece type a variant uses.
#[derive(Debug, Clone)]
pub struct PieceTables {
    entries: Vec<Option<PieceMovement>>,
    board_bb: Bitboard,
    diagonal_lines: Bitboard,
    soldier_rank: u8,
    max_rank: u8,
    /// Types whose attacks cannot be found by reversing the attacked square's view.
    pub asymmetric: PieceSet,
    /// Types with hoppers, lame leaps, oblique or limited rides.
    pub non_sliding_riders: PieceSet,
    /// Types with unlimited sliding rides on king lines.
    pub sliders: PieceSet,
    pub types: PieceSet,
}

const fn entry_index(c: Color, pt: PieceType, modality: usize) -> usize {
    ((c as usize * PIECE_TYPE_NB) + pt.index()) * 2 + modality
}

fn orthogonal_units(dirs: impl Iterator<Item = Direction>) -> Vec<Direction> {
    dirs.filter(|d| (d.df == 0) != (d.dr == 0) && d.df.abs() <= 1 && d.dr.abs() <= 1)
        .collect()
}

fn diagonal_completion(orth: &[Direction]) -> Vec<Direction> {
    let mut diag = Vec::new();
    for dx in [-1i8, 1] {
        for dy in [-1i8, 1] {
            if orth.contains(&Direction::new(dx, 0)) && orth.contains(&Direction::new(0, dy)) {
                diag.push(Direction::new(dx, dy));
            }
        }
    }
    diag
}

impl PieceTables {
    /// Tables of a variant that has not been concluded yet.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            board_bb: Bitboard::EMPTY,
            diagonal_lines: Bitboard::EMPTY,
            soldier_rank: 0,
            max_rank: 0,
            asymmetric: PieceSet::EMPTY,
            non_sliding_riders: PieceSet::EMPTY,
            sliders: PieceSet::EMPTY,
            types: PieceSet::EMPTY,
        }
    }

    pub fn build(var: &Variant, infos: &[(PieceType, PieceInfo)]) -> Self {
        let mut entries = vec![None; COLOR_NB * PIECE_TYPE_NB * 2];
        let mut asymmetric = PieceSet::EMPTY;
        let mut non_sliding_riders = PieceSet::EMPTY;
        let mut sliders = PieceSet::EMPTY;
        let mut types = PieceSet::EMPTY;

        for (pt, info) in infos {
            let pt = *pt;
            types.insert(pt);
            if info.has_lame()
                || info.has_hoppers()
                || info.has_oblique_rides()
                || info.rides.iter().flatten().any(|r| r.limit.is_some())
            {
                non_sliding_riders.insert(pt);
            }
            if info.has_lame()
                || info.rides.iter().flatten().any(|r| r.kind == RideKind::Grasshopper)
                || (pt == PieceType::SOLDIER && var.soldier_promotion_rank > 0)
                || pt == PieceType::JANGGI_CANNON
                || var.diagonal_lines.any()
            {
                asymmetric.insert(pt);
            }
            if info
                .rides
                .iter()
                .flatten()
                .any(|r| r.kind == RideKind::Slide && r.limit.is_none() && r.dir.df.abs() <= 1 && r.dir.dr.abs() <= 1)
            {
                sliders.insert(pt);
            }

            for c in Color::ALL {
                for modality in [QUIET, CAPTURE] {
                    let base = Movement::build(
                        &info.steps[modality],
                        &info.lame_steps[modality],
                        &info.rides[modality],
                        c,
                    );

                    let palace = if var.diagonal_lines.any() {
                        let steps = diagonal_completion(&orthogonal_units(info.steps[modality].iter().copied()));
                        let mut rides = Vec::new();
                        for kind in [RideKind::Slide, RideKind::Cannon] {
                            let orth = orthogonal_units(
                                info.rides[modality]
                                    .iter()
                                    .filter(|r| r.kind == kind && r.limit.is_none())
                                    .map(|r| r.dir),
                            );
                            rides.extend(
                                diagonal_completion(&orth)
                                    .into_iter()
                                    .map(|dir| Ride { dir, kind, limit: None }),
                            );
                        }
                        let m = Movement::build(&steps, &[], &rides, c);
                        (!m.is_empty()).then_some(m)
                    } else {
                        None
                    };

                    let restricted = if pt == PieceType::SOLDIER && var.soldier_promotion_rank > 0 {
                        let forward: Vec<Direction> = info.steps[modality]
                            .iter()
                            .copied()
                            .filter(|d| d.df == 0 && d.dr > 0)
                            .collect();
                        Some(Movement::build(&forward, &[], &[], c))
                    } else {
                        None
                    };

                    entries[entry_index(c, pt, modality)] = Some(PieceMovement {
                        base,
                        palace,
                        restricted,
                    });
                }
            }
        }

        Self {
            entries,
            board_bb: var.board_bb,
            diagonal_lines: var.diagonal_lines,
            soldier_rank: var.soldier_promotion_rank,
            max_rank: var.max_rank,
            asymmetric,
            non_sliding_riders,
            sliders,
            types,
        }
    }

    fn movement(&self, c: Color, pt: PieceType, modality: usize) -> Option<&PieceMovement> {
        self.entries.get(entry_index(c, pt, modality)).and_then(Option::as_ref)
    }

    /// Targets of `pt` standing on `sq` for one modality, ignoring who occupies them.
    pub fn targets(&self, c: Color, pt: PieceType, modality: usize, sq: Square, occupied: Bitboard) -> Bitboard {
        let Some(pm) = self.movement(c, pt, modality) else {
            return Bitboard::EMPTY;
        };
        let mv = match &pm.restricted {
            Some(r) if relative_rank(c, sq.rank(), self.max_rank) < self.soldier_rank => r,
            _ => &pm.base,
        };
        let mut b = mv.eval(sq, occupied);
        if let Some(palace) = &pm.palace {
            if self.diagonal_lines.contains(sq) {
                b |= palace.eval(sq, occupied) & self.diagonal_lines;
            }
        }
        b & self.board_bb
    }

    /// Empty-board superset of every target the piece could ever reach from `sq`.
    pub fn pseudo(&self, c: Color, pt: PieceType, modality: usize, sq: Square) -> Bitboard {
        let Some(pm) = self.movement(c, pt, modality) else {
            return Bitboard::EMPTY;
        };
        let mut b = pm.base.pseudo[sq.index()];
        if let Some(palace) = &pm.palace {
            if self.diagonal_lines.contains(sq) {
                b |= palace.pseudo[sq.index()] & self.diagonal_lines;
            }
        }
        b & self.board_bb
    }
}

fn janggi_cannon_filter(
    var: &Variant,
    board: &Board,
    c: Color,
    modality: usize,
    sq: Square,
    occupied: Bitboard,
    b: Bitboard,
) -> Bitboard {
    let cannons = board.pieces_pt(PieceType::JANGGI_CANNON);
    b & !cannons & var.tables().targets(c, PieceType::JANGGI_CANNON, modality, sq, occupied & !cannons)
}

fn targets_bb(
    var: &Variant,
    board: &Board,
    c: Color,
    pt: PieceType,
    modality: usize,
    sq: Square,
    occupied: Bitboard,
) -> Bitboard {
    let b = var.tables().targets(c, pt, modality, sq, occupied);
    if pt == PieceType::JANGGI_CANNON {
        janggi_cannon_filter(var, board, c, modality, sq, occupied, b)
    } else {
        b
    }
}

/// Squares a `c` piece of type `pt` on `sq` attacks (its capturing movement).
pub fn attacks_bb(var: &Variant, board: &Board, c: Color, pt: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    targets_bb(var, board, c, pt, CAPTURE, sq, occupied)
}

/// Squares a `c` piece of type `pt` on `sq` may move to without capturing.
pub fn moves_bb(var: &Variant, board: &Board, c: Color, pt: PieceType, sq: Square, occupied: Bitboard) -> Bitboard {
    targets_bb(var, board, c, pt, QUIET, sq, occupied)
}

/// Pieces of color `c` attacking `s` given `occupied`.
pub fn attackers_to(var: &Variant, board: &Board, s: Square, occupied: Bitboard, c: Color) -> Bitboard {
    let tables = var.tables();
    let mut attackers = Bitboard::EMPTY;
    for pt in tables.types.iter() {
        let ours = board.pieces_cpt(c, pt) & occupied;
        if ours.is_empty() {
            continue;
        }
        if tables.asymmetric.contains(pt) {
            for from in ours & tables_reach(var, c, pt, s) {
                if attacks_bb(var, board, c, pt, from, occupied).contains(s) {
                    attackers.set(from);
                }
            }
        } else {
            attackers |= attacks_bb(var, board, !c, pt, s, occupied) & ours;
        }
    }
    attackers
}

// Squares from which a `c` piece of type `pt` could possibly attack `s`.
fn tables_reach(var: &Variant, c: Color, pt: PieceType, s: Square) -> Bitboard {
    let tables = var.tables();
    let reach = tables.pseudo(!c, pt, CAPTURE, s);
    if tables.diagonal_lines.any() {
        reach | tables.diagonal_lines
    } else {
        reach
    }
}

/// Pieces of color `c` whose sliding rides reach `s` on an empty board.
pub fn slider_snipers(var: &Variant, board: &Board, s: Square, c: Color) -> Bitboard {
    let tables = var.tables();
    let mut snipers = Bitboard::EMPTY;
    for pt in tables.sliders.iter() {
        snipers |= tables.pseudo(!c, pt, CAPTURE, s) & board.pieces_cpt(c, pt);
    }
    snipers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_completion_follows_orthogonal_sense() {
        let soldier = [Direction::new(0, 1), Direction::new(1, 0), Direction::new(-1, 0)];
        let diag = diagonal_completion(&soldier);
        assert_eq!(diag, vec![Direction::new(-1, 1), Direction::new(1, 1)]);
    }
}
