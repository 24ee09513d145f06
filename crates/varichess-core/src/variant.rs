use std::sync::Arc;

use thiserror::Error;

use crate::attacks::PieceTables;
use crate::bitboard::Bitboard;
use crate::constants::{COLOR_NB, PIECE_NB, PIECE_TYPE_NB, STARTING_FEN};
use crate::piece::{canonical_betza, piece_info, PieceError, PieceInfo};
use crate::types::{
    ChasingRule, Color, CountingRule, EnclosingRule, MaterialCounting, Piece, PieceSet, PieceType,
    Value, WallingRule,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown variant template '{0}'")]
    UnknownTemplate(String),
    #[error("invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
    #[error("invalid piece movement: {0}")]
    Piece(#[from] PieceError),
    #[error("unsupported rule combination: {0}")]
    UnsupportedCombination(String),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

/// Rule set of a chess variant. Defaults describe orthodox chess; call
/// [`Variant::conclude`] after changing fields.
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub max_rank: u8,
    pub max_file: u8,
    pub chess960: bool,
    pub pocket_size: usize,
    pub piece_types: PieceSet,
    pub piece_to_char: Vec<char>,
    pub piece_to_char_synonyms: Vec<char>,
    /// Movement overrides, including custom slots and the king.
    pub custom_betza: Vec<(PieceType, String)>,
    pub king_type: PieceType,
    pub start_fen: String,
    pub mobility_region: [[Bitboard; PIECE_TYPE_NB]; COLOR_NB],

    pub promotion_rank: u8,
    pub promotion_region: [Option<Bitboard>; COLOR_NB],
    pub promotion_piece_types: PieceSet,
    pub sittuyin_promotion: bool,
    pub promotion_limit: [u8; PIECE_TYPE_NB],
    pub promoted_piece_type: [PieceType; PIECE_TYPE_NB],
    pub piece_promotion_on_capture: bool,
    pub mandatory_pawn_promotion: bool,
    pub mandatory_piece_promotion: bool,
    pub piece_demotion: bool,
    pub double_step: bool,
    pub double_step_rank: u8,
    pub first_rank_double_steps: bool,
    pub double_step_region: [Option<Bitboard>; COLOR_NB],
    pub triple_step_region: [Bitboard; COLOR_NB],
    pub en_passant_region: Bitboard,

    pub castling: bool,
    pub castling_dropped_piece: bool,
    pub castling_kingside_file: u8,
    pub castling_queenside_file: u8,
    pub castling_rank: u8,
    pub castling_king_piece: PieceType,
    pub castling_rook_piece: PieceType,

    pub checking: bool,
    pub must_capture: bool,
    pub must_drop: bool,
    pub must_drop_type: PieceType,
    pub piece_drops: bool,
    pub drop_loop: bool,
    pub captures_to_hand: bool,
    pub first_rank_pawn_drops: bool,
    pub promotion_zone_pawn_drops: bool,
    pub drop_on_top: bool,
    pub enclosing_drop: EnclosingRule,
    pub drop_region: [Bitboard; COLOR_NB],
    pub sittuyin_rook_drop: bool,
    pub drop_opposite_colored_bishop: bool,
    pub drop_promoted: bool,
    pub shogi_doubled_pawn: bool,
    pub immobility_illegal: bool,
    pub gating: bool,
    pub seirawan_gating: bool,
    pub cambodian_moves: bool,
    pub diagonal_lines: Bitboard,
    pub pass: bool,
    pub pass_on_stalemate: bool,
    pub makpong_rule: bool,
    pub flying_general: bool,
    pub soldier_promotion_rank: u8,
    pub flip_enclosed_pieces: EnclosingRule,
    pub blast_on_capture: bool,
    pub blast_immune_types: PieceSet,
    pub petrify_on_capture_types: PieceSet,
    pub walling_rule: WallingRule,
    pub walling_region: [Bitboard; COLOR_NB],

    pub n_move_rule: u32,
    pub n_fold_rule: u32,
    pub n_fold_value: Value,
    pub n_fold_value_absolute: bool,
    pub perpetual_check_illegal: bool,
    pub chasing_rule: ChasingRule,
    pub stalemate_value: Value,
    pub checkmate_value: Value,
    pub shogi_pawn_drop_mate_illegal: bool,
    pub bare_king_value: Option<Value>,
    pub bare_king_move: bool,
    pub extinction_value: Option<Value>,
    pub extinction_claim: bool,
    pub extinction_pseudo_royal: bool,
    pub extinction_piece_types: PieceSet,
    pub extinction_piece_count: usize,
    pub extinction_opponent_piece_count: usize,
    pub flag_piece: Option<PieceType>,
    pub flag_region: [Bitboard; COLOR_NB],
    pub flag_piece_count: usize,
    pub flag_move: bool,
    pub check_counting: bool,
    pub connect_n: usize,
    pub connect_horizontal: bool,
    pub connect_vertical: bool,
    pub connect_diagonal: bool,
    pub connect_region1: [Bitboard; COLOR_NB],
    pub connect_region2: [Bitboard; COLOR_NB],
    pub material_counting: MaterialCounting,
    pub counting_rule: CountingRule,
    pub tsume_mode: bool,
    pub bikjang_rule: bool,

    pub board_bb: Bitboard,
    pub promotion_zone: [Bitboard; COLOR_NB],
    pub double_step_zone: [Bitboard; COLOR_NB],
    pub max_check_count: usize,
    pub simple_legality: bool,
    tables: Arc<PieceTables>,
}

impl Default for Variant {
    fn default() -> Self {
        let mut var = Self::bare();
        for (pt, c) in [
            (PieceType::PAWN, 'p'),
            (PieceType::KNIGHT, 'n'),
            (PieceType::BISHOP, 'b'),
            (PieceType::ROOK, 'r'),
            (PieceType::QUEEN, 'q'),
            (PieceType::KING, 'k'),
        ] {
            var.add_piece(pt, c, None);
        }
        var
    }
}

impl Variant {
    fn bare() -> Self {
        let mut promotion_piece_types = PieceSet::EMPTY;
        for pt in [PieceType::QUEEN, PieceType::ROOK, PieceType::BISHOP, PieceType::KNIGHT] {
            promotion_piece_types.insert(pt);
        }
        Self {
            name: "chess".to_string(),
            max_rank: 7,
            max_file: 7,
            chess960: false,
            pocket_size: 0,
            piece_types: PieceSet::EMPTY,
            piece_to_char: vec![' '; PIECE_NB],
            piece_to_char_synonyms: vec![' '; PIECE_NB],
            custom_betza: Vec::new(),
            king_type: PieceType::KING,
            start_fen: STARTING_FEN.to_string(),
            mobility_region: [[Bitboard::ALL; PIECE_TYPE_NB]; COLOR_NB],
            promotion_rank: 7,
            promotion_region: [None; COLOR_NB],
            promotion_piece_types,
            sittuyin_promotion: false,
            promotion_limit: [0; PIECE_TYPE_NB],
            promoted_piece_type: [PieceType::NONE; PIECE_TYPE_NB],
            piece_promotion_on_capture: false,
            mandatory_pawn_promotion: true,
            mandatory_piece_promotion: false,
            piece_demotion: false,
            double_step: true,
            double_step_rank: 1,
            first_rank_double_steps: false,
            double_step_region: [None; COLOR_NB],
            triple_step_region: [Bitboard::EMPTY; COLOR_NB],
            en_passant_region: Bitboard::ALL,
            castling: true,
            castling_dropped_piece: false,
            castling_kingside_file: 6,
            castling_queenside_file: 2,
            castling_rank: 0,
            castling_king_piece: PieceType::KING,
            castling_rook_piece: PieceType::ROOK,
            checking: true,
            must_capture: false,
            must_drop: false,
            must_drop_type: PieceType::ALL_PIECES,
            piece_drops: false,
            drop_loop: false,
            captures_to_hand: false,
            first_rank_pawn_drops: false,
            promotion_zone_pawn_drops: false,
            drop_on_top: false,
            enclosing_drop: EnclosingRule::None,
            drop_region: [Bitboard::ALL; COLOR_NB],
            sittuyin_rook_drop: false,
            drop_opposite_colored_bishop: false,
            drop_promoted: false,
            shogi_doubled_pawn: true,
            immobility_illegal: false,
            gating: false,
            seirawan_gating: false,
            cambodian_moves: false,
            diagonal_lines: Bitboard::EMPTY,
            pass: false,
            pass_on_stalemate: false,
            makpong_rule: false,
            flying_general: false,
            soldier_promotion_rank: 0,
            flip_enclosed_pieces: EnclosingRule::None,
            blast_on_capture: false,
            blast_immune_types: PieceSet::EMPTY,
            petrify_on_capture_types: PieceSet::EMPTY,
            walling_rule: WallingRule::None,
            walling_region: [Bitboard::ALL; COLOR_NB],
            n_move_rule: 50,
            n_fold_rule: 3,
            n_fold_value: Value::DRAW,
            n_fold_value_absolute: false,
            perpetual_check_illegal: false,
            chasing_rule: ChasingRule::None,
            stalemate_value: Value::DRAW,
            checkmate_value: -Value::MATE,
            shogi_pawn_drop_mate_illegal: false,
            bare_king_value: None,
            bare_king_move: false,
            extinction_value: None,
            extinction_claim: false,
            extinction_pseudo_royal: false,
            extinction_piece_types: PieceSet::EMPTY,
            extinction_piece_count: 0,
            extinction_opponent_piece_count: 0,
            flag_piece: None,
            flag_region: [Bitboard::EMPTY; COLOR_NB],
            flag_piece_count: 1,
            flag_move: false,
            check_counting: false,
            connect_n: 0,
            connect_horizontal: true,
            connect_vertical: true,
            connect_diagonal: true,
            connect_region1: [Bitboard::EMPTY; COLOR_NB],
            connect_region2: [Bitboard::EMPTY; COLOR_NB],
            material_counting: MaterialCounting::None,
            counting_rule: CountingRule::None,
            tsume_mode: false,
            bikjang_rule: false,
            board_bb: Bitboard::board(7, 7),
            promotion_zone: [Bitboard::EMPTY; COLOR_NB],
            double_step_zone: [Bitboard::EMPTY; COLOR_NB],
            max_check_count: 0,
            simple_legality: false,
            tables: Arc::new(PieceTables::empty()),
        }
    }

    pub fn tables(&self) -> &PieceTables {
        &self.tables
    }

    pub fn add_piece(&mut self, pt: PieceType, c: char, synonym: Option<char>) {
        self.piece_to_char[Piece::new(Color::White, pt).index()] = c.to_ascii_uppercase();
        self.piece_to_char[Piece::new(Color::Black, pt).index()] = c.to_ascii_lowercase();
        let syn = synonym.unwrap_or(' ');
        self.piece_to_char_synonyms[Piece::new(Color::White, pt).index()] = syn.to_ascii_uppercase();
        self.piece_to_char_synonyms[Piece::new(Color::Black, pt).index()] = syn.to_ascii_lowercase();
        self.piece_types.insert(pt);
    }

    pub fn remove_piece(&mut self, pt: PieceType) {
        for c in Color::ALL {
            self.piece_to_char[Piece::new(c, pt).index()] = ' ';
            self.piece_to_char_synonyms[Piece::new(c, pt).index()] = ' ';
        }
        self.piece_types.remove(pt);
    }

    pub fn reset_pieces(&mut self) {
        self.piece_to_char = vec![' '; PIECE_NB];
        self.piece_to_char_synonyms = vec![' '; PIECE_NB];
        self.piece_types = PieceSet::EMPTY;
    }

    pub fn piece_char(&self, piece: Piece) -> Option<char> {
        match self.piece_to_char.get(piece.index()) {
            Some(' ') | None => None,
            Some(&c) => Some(c),
        }
    }

    pub fn piece_from_char(&self, c: char) -> Option<Piece> {
        if c == ' ' {
            return None;
        }
        self.piece_to_char
            .iter()
            .position(|&x| x == c)
            .or_else(|| self.piece_to_char_synonyms.iter().position(|&x| x == c))
            .map(|i| Piece(i as u8))
    }

    /// Letter of a type regardless of color, uppercase.
    pub fn type_char(&self, pt: PieceType) -> Option<char> {
        self.piece_char(Piece::new(Color::White, pt))
    }

    pub fn set_betza(&mut self, pt: PieceType, betza: &str) {
        self.custom_betza.retain(|(p, _)| *p != pt);
        self.custom_betza.push((pt, betza.to_string()));
    }

    /// Compiled movement of `pt` in this variant.
    pub fn movement_of(&self, pt: PieceType) -> Result<PieceInfo, ConfigError> {
        if let Some((_, betza)) = self.custom_betza.iter().find(|(p, _)| *p == pt) {
            return Ok(PieceInfo::from_betza(&pt.name(), betza)?);
        }
        let source = if pt == PieceType::KING { self.king_type } else { pt };
        if let Some(info) = piece_info(source) {
            return Ok(info.clone());
        }
        Err(ConfigError::InvalidValue {
            key: pt.name(),
            value: canonical_betza(source).unwrap_or("").to_string(),
        })
    }

    pub fn promoted_type(&self, pt: PieceType) -> Option<PieceType> {
        let p = self.promoted_piece_type[pt.index()];
        (p != PieceType::NONE).then_some(p)
    }

    /// The type `pt` demotes to, if some type promotes into it.
    pub fn unpromoted_type(&self, pt: PieceType) -> Option<PieceType> {
        (1..PIECE_TYPE_NB)
            .map(|i| PieceType(i as u8))
            .find(|p| self.promoted_piece_type[p.index()] == pt)
    }

    pub fn has_royal_king(&self) -> bool {
        self.piece_types.contains(PieceType::KING) && !self.extinction_pseudo_royal
    }

    pub fn petrify_on_capture(&self) -> bool {
        !self.petrify_on_capture_types.is_empty()
    }

    pub fn relative_rank_bb(&self, c: Color, rank: u8) -> Bitboard {
        match c {
            Color::White => Bitboard::rank(rank),
            Color::Black => Bitboard::rank(self.max_rank.saturating_sub(rank)),
        }
    }

    /// Whether positions of this variant carry a pocket field.
    pub fn has_pocket(&self) -> bool {
        self.start_fen.contains('[') || self.piece_drops || self.gating || self.seirawan_gating
    }

    /// Start FENs without castling and en passant fields, as in shogi.
    pub fn short_fen(&self) -> bool {
        self.start_fen.split_whitespace().count() < 5
    }

    pub fn castling_rights_possible(&self) -> bool {
        self.castling && self.piece_types.contains(self.castling_king_piece)
    }

    /// Validates the rule set and derives zones and movement tables.
    pub fn conclude(&mut self) -> Result<(), ConfigError> {
        if usize::from(self.max_file) >= crate::constants::FILE_NB
            || usize::from(self.max_rank) >= crate::constants::RANK_NB
        {
            return Err(ConfigError::InvalidValue {
                key: "maxFile/maxRank".to_string(),
                value: format!("{}x{}", self.max_file + 1, self.max_rank + 1),
            });
        }
        if self.blast_on_capture && self.petrify_on_capture() {
            return Err(ConfigError::UnsupportedCombination(
                "blastOnCapture with petrifyOnCapture".to_string(),
            ));
        }
        if self.petrify_on_capture() && self.extinction_pseudo_royal {
            return Err(ConfigError::UnsupportedCombination(
                "petrifyOnCapture with extinctionPseudoRoyal".to_string(),
            ));
        }

        self.board_bb = Bitboard::board(self.max_file, self.max_rank);

        for c in Color::ALL {
            self.promotion_zone[c.index()] = match self.promotion_region[c.index()] {
                Some(region) => region,
                None => {
                    let mut zone = Bitboard::EMPTY;
                    for r in self.promotion_rank..=self.max_rank {
                        zone |= self.relative_rank_bb(c, r);
                    }
                    zone
                }
            } & self.board_bb;

            self.double_step_zone[c.index()] = if !self.double_step {
                Bitboard::EMPTY
            } else {
                match self.double_step_region[c.index()] {
                    Some(region) => region,
                    None => {
                        let mut zone = self.relative_rank_bb(c, self.double_step_rank);
                        if self.first_rank_double_steps {
                            zone |= self.relative_rank_bb(c, 0);
                        }
                        zone
                    }
                }
            } & self.board_bb;
        }

        self.max_check_count = check_count_in_fen(&self.start_fen).unwrap_or(0);
        if self.max_check_count > 0 {
            self.check_counting = true;
        } else if self.check_counting {
            self.max_check_count = 3;
        }

        let mut types = self.piece_types;
        for pt in self.piece_types.iter() {
            if let Some(p) = self.promoted_type(pt) {
                types.insert(p);
            }
        }
        for pt in self.promotion_piece_types.iter() {
            types.insert(pt);
        }
        types.remove(PieceType::ALL_PIECES);
        let mut infos = Vec::new();
        for pt in types.iter() {
            infos.push((pt, self.movement_of(pt)?));
        }
        self.tables = Arc::new(PieceTables::build(self, &infos));

        self.simple_legality = !self.blast_on_capture
            && !self.petrify_on_capture()
            && self.flip_enclosed_pieces == EnclosingRule::None
            && !self.flying_general
            && !self.makpong_rule
            && self.diagonal_lines.is_empty()
            && !self.extinction_pseudo_royal
            && self.walling_rule == WallingRule::None
            && self.soldier_promotion_rank == 0
            && self.piece_types.contains(PieceType::KING)
            && self.checking
            && !self.sittuyin_promotion;

        log::debug!(
            "variant {} concluded ({}x{}, {} piece types)",
            self.name,
            self.max_file + 1,
            self.max_rank + 1,
            infos.len()
        );
        Ok(())
    }
}

// The "n+m" or "+x+y" token of a FEN, read as the larger remaining count.
fn check_count_in_fen(fen: &str) -> Option<usize> {
    let token = fen.split_whitespace().skip(2).find(|t| t.contains('+'))?;
    token
        .split('+')
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<usize>().ok())
        .max()
}
