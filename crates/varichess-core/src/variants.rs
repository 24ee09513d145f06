use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use crate::bitboard::Bitboard;
use crate::parser::{parse_config, ParsedConfig};
use crate::types::{
    ChasingRule, Color, CountingRule, EnclosingRule, MaterialCounting, PieceSet, PieceType, Square,
    Value, WallingRule,
};
use crate::variant::{ConfigError, Variant};

/// Named, concluded variants.
#[derive(Debug, Clone, Default)]
pub struct VariantMap {
    variants: BTreeMap<String, Arc<Variant>>,
}

static BUILTIN: LazyLock<VariantMap> = LazyLock::new(VariantMap::builtin);

/// The process-wide registry of built-in variants.
pub fn builtin_variants() -> &'static VariantMap {
    &BUILTIN
}

pub fn variant(name: &str) -> Option<Arc<Variant>> {
    builtin_variants().get(name)
}

impl VariantMap {
    pub fn builtin() -> Self {
        let mut map = Self::default();
        for mut var in builtin_definitions() {
            match var.conclude() {
                Ok(()) => {
                    map.variants.insert(var.name.clone(), Arc::new(var));
                }
                Err(err) => log::error!("built-in variant {} rejected: {err}", var.name),
            }
        }
        log::debug!("{} built-in variants registered", map.variants.len());
        map
    }

    pub fn get(&self, name: &str) -> Option<Arc<Variant>> {
        self.variants.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Concludes and registers `var`, replacing a variant of the same name.
    pub fn insert(&mut self, mut var: Variant) -> Result<Arc<Variant>, ConfigError> {
        var.conclude()?;
        let var = Arc::new(var);
        self.variants.insert(var.name.clone(), Arc::clone(&var));
        Ok(var)
    }

    /// Parses config text and registers its variants; returns the warnings.
    pub fn load(&mut self, text: &str) -> Result<Vec<String>, ConfigError> {
        let ParsedConfig { variants, warnings } =
            parse_config(text, |name| self.get(name).map(|v| (*v).clone()))?;
        for var in variants {
            self.variants.insert(var.name.clone(), Arc::new(var));
        }
        Ok(warnings)
    }
}

fn set_of(types: &[PieceType]) -> PieceSet {
    types.iter().copied().collect()
}

fn squares(names: &[&str]) -> Bitboard {
    names.iter().filter_map(|n| Square::parse(n)).collect()
}

fn ranks(range: std::ops::RangeInclusive<u8>) -> Bitboard {
    range.fold(Bitboard::EMPTY, |b, r| b | Bitboard::rank(r))
}

fn files(range: std::ops::RangeInclusive<u8>) -> Bitboard {
    range.fold(Bitboard::EMPTY, |b, f| b | Bitboard::file(f))
}

fn named(name: &str, mut var: Variant) -> Variant {
    var.name = name.to_string();
    var
}

fn without_pawn_rules(var: &mut Variant) {
    var.castling = false;
    var.double_step = false;
    var.promotion_piece_types = PieceSet::EMPTY;
}

fn chess() -> Variant {
    named("chess", Variant::default())
}

fn chess960() -> Variant {
    let mut v = named("chess960", chess());
    v.chess960 = true;
    v
}

fn crazyhouse() -> Variant {
    let mut v = named("crazyhouse", chess());
    v.start_fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[] w KQkq - 0 1".to_string();
    v.piece_drops = true;
    v.captures_to_hand = true;
    v
}

fn loop_chess() -> Variant {
    let mut v = named("loop", crazyhouse());
    v.drop_loop = true;
    v
}

fn chessgi() -> Variant {
    let mut v = named("chessgi", loop_chess());
    v.first_rank_pawn_drops = true;
    v
}

fn with_commoner_king(v: &mut Variant) {
    v.remove_piece(PieceType::KING);
    v.add_piece(PieceType::COMMONER, 'k', None);
    v.castling_king_piece = PieceType::COMMONER;
}

fn atomic() -> Variant {
    let mut v = named("atomic", chess());
    with_commoner_king(&mut v);
    v.extinction_value = Some(-Value::MATE);
    v.extinction_piece_types = set_of(&[PieceType::COMMONER]);
    v.extinction_pseudo_royal = true;
    v.blast_on_capture = true;
    v.blast_immune_types = set_of(&[PieceType::PAWN]);
    v
}

fn horde() -> Variant {
    let mut v = named("horde", chess());
    v.start_fen = "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1".to_string();
    v.first_rank_double_steps = true;
    v.extinction_value = Some(-Value::MATE);
    v.extinction_piece_types = set_of(&[PieceType::ALL_PIECES]);
    v
}

fn giveaway() -> Variant {
    let mut v = named("giveaway", chess());
    with_commoner_king(&mut v);
    v.promotion_piece_types.insert(PieceType::COMMONER);
    v.must_capture = true;
    v.stalemate_value = Value::MATE;
    v.extinction_value = Some(Value::MATE);
    v.extinction_piece_types = set_of(&[PieceType::ALL_PIECES]);
    v
}

fn antichess() -> Variant {
    let mut v = named("antichess", giveaway());
    v.start_fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1".to_string();
    v.castling = false;
    v
}

fn losers() -> Variant {
    let mut v = named("losers", chess());
    v.must_capture = true;
    v.checkmate_value = Value::MATE;
    v.stalemate_value = Value::MATE;
    v.bare_king_value = Some(Value::MATE);
    v
}

fn extinction() -> Variant {
    let mut v = named("extinction", chess());
    with_commoner_king(&mut v);
    v.promotion_piece_types.insert(PieceType::COMMONER);
    v.extinction_value = Some(-Value::MATE);
    v.extinction_piece_types = set_of(&[
        PieceType::COMMONER,
        PieceType::QUEEN,
        PieceType::ROOK,
        PieceType::BISHOP,
        PieceType::KNIGHT,
        PieceType::PAWN,
    ]);
    v
}

fn kinglet() -> Variant {
    let mut v = named("kinglet", chess());
    with_commoner_king(&mut v);
    v.castling = false;
    v.promotion_piece_types = set_of(&[PieceType::COMMONER]);
    v.extinction_value = Some(-Value::MATE);
    v.extinction_piece_types = set_of(&[PieceType::PAWN]);
    v
}

fn check_chess(name: &str, checks: u8) -> Variant {
    let mut v = named(name, chess());
    v.start_fen = format!("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - {checks}+{checks} 0 1");
    v.check_counting = true;
    v
}

fn kingofthehill() -> Variant {
    let mut v = named("kingofthehill", chess());
    let hill = squares(&["d4", "e4", "d5", "e5"]);
    v.flag_piece = Some(PieceType::KING);
    v.flag_region = [hill, hill];
    v
}

fn racingkings() -> Variant {
    let mut v = named("racingkings", chess());
    v.start_fen = "8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1".to_string();
    v.flag_piece = Some(PieceType::KING);
    v.flag_region = [Bitboard::rank(7), Bitboard::rank(7)];
    v.flag_move = true;
    v.castling = false;
    v.checking = false;
    v
}

fn makruk() -> Variant {
    let mut v = named("makruk", chess());
    v.reset_pieces();
    v.add_piece(PieceType::PAWN, 'p', None);
    v.add_piece(PieceType::KNIGHT, 'n', None);
    v.add_piece(PieceType::KHON, 's', None);
    v.add_piece(PieceType::ROOK, 'r', None);
    v.add_piece(PieceType::MET, 'm', None);
    v.add_piece(PieceType::KING, 'k', None);
    v.start_fen = "rnsmksnr/8/pppppppp/8/8/PPPPPPPP/8/RNSKMSNR w - - 0 1".to_string();
    v.promotion_rank = 5;
    v.promotion_piece_types = set_of(&[PieceType::MET]);
    v.double_step = false;
    v.castling = false;
    v.n_move_rule = 0;
    v.counting_rule = CountingRule::Makruk;
    v
}

fn asean() -> Variant {
    let mut v = named("asean", makruk());
    v.reset_pieces();
    v.add_piece(PieceType::PAWN, 'p', None);
    v.add_piece(PieceType::KNIGHT, 'n', None);
    v.add_piece(PieceType::KHON, 'b', None);
    v.add_piece(PieceType::ROOK, 'r', None);
    v.add_piece(PieceType::MET, 'q', None);
    v.add_piece(PieceType::KING, 'k', None);
    v.start_fen = "rnbqkbnr/8/pppppppp/8/8/PPPPPPPP/8/RNBQKBNR w - - 0 1".to_string();
    v.promotion_rank = 7;
    v.promotion_piece_types = set_of(&[PieceType::ROOK, PieceType::KNIGHT, PieceType::KHON, PieceType::MET]);
    v.promotion_limit[PieceType::ROOK.index()] = 2;
    v.promotion_limit[PieceType::KNIGHT.index()] = 2;
    v.promotion_limit[PieceType::KHON.index()] = 2;
    v.promotion_limit[PieceType::MET.index()] = 1;
    v.counting_rule = CountingRule::Asean;
    v
}

fn cambodian() -> Variant {
    let mut v = named("cambodian", makruk());
    v.start_fen = "rnsmksnr/8/pppppppp/8/8/PPPPPPPP/8/RNSKMSNR w DEde - 0 1".to_string();
    v.cambodian_moves = true;
    v.counting_rule = CountingRule::Cambodian;
    v
}

fn shatranj() -> Variant {
    let mut v = named("shatranj", chess());
    v.reset_pieces();
    v.add_piece(PieceType::PAWN, 'p', None);
    v.add_piece(PieceType::KNIGHT, 'n', None);
    v.add_piece(PieceType::ALFIL, 'b', None);
    v.add_piece(PieceType::ROOK, 'r', None);
    v.add_piece(PieceType::FERS, 'q', None);
    v.add_piece(PieceType::KING, 'k', None);
    v.start_fen = "rnbkqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKQBNR w - - 0 1".to_string();
    v.promotion_piece_types = set_of(&[PieceType::FERS]);
    v.double_step = false;
    v.castling = false;
    v.bare_king_value = Some(-Value::MATE);
    v.bare_king_move = true;
    v.stalemate_value = -Value::MATE;
    v.n_move_rule = 70;
    v
}

fn sittuyin() -> Variant {
    let mut v = named("sittuyin", makruk());
    v.remove_piece(PieceType::MET);
    v.add_piece(PieceType::MET, 'f', None);
    v.start_fen = "8/8/4pppp/pppp4/4PPPP/PPPP4/8/8[KFRRSSNNkfrrssnn] w - - 0 1".to_string();
    v.piece_drops = true;
    v.must_drop = true;
    v.drop_region = [ranks(0..=2), ranks(5..=7)];
    v.sittuyin_rook_drop = true;
    v.sittuyin_promotion = true;
    v.promotion_region = [
        Some(squares(&["a8", "b7", "c6", "d5", "e5", "f6", "g7", "h8"])),
        Some(squares(&["a1", "b2", "c3", "d4", "e4", "f3", "g2", "h1"])),
    ];
    v.promotion_limit[PieceType::MET.index()] = 1;
    v.mandatory_pawn_promotion = false;
    v.counting_rule = CountingRule::Asean;
    v.n_move_rule = 50;
    v
}

fn capablanca() -> Variant {
    let mut v = named("capablanca", chess());
    v.max_file = 9;
    v.add_piece(PieceType::ARCHBISHOP, 'a', None);
    v.add_piece(PieceType::CHANCELLOR, 'c', None);
    v.start_fen = "rnabqkbcnr/pppppppppp/10/10/10/10/PPPPPPPPPP/RNABQKBCNR w KQkq - 0 1".to_string();
    v.castling_kingside_file = 8;
    v.castling_queenside_file = 2;
    v.promotion_piece_types.insert(PieceType::ARCHBISHOP);
    v.promotion_piece_types.insert(PieceType::CHANCELLOR);
    v
}

fn amazon() -> Variant {
    let mut v = named("amazon", chess());
    v.add_piece(PieceType::AMAZON, 'a', None);
    v.start_fen = "rnbakbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBAKBNR w KQkq - 0 1".to_string();
    v.promotion_piece_types.insert(PieceType::AMAZON);
    v
}

fn seirawan() -> Variant {
    let mut v = named("seirawan", chess());
    v.add_piece(PieceType::ARCHBISHOP, 'h', None);
    v.add_piece(PieceType::CHANCELLOR, 'e', None);
    v.start_fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[HEhe] w KQBCDFGkqbcdfg - 0 1".to_string();
    v.gating = true;
    v.seirawan_gating = true;
    v.promotion_piece_types.insert(PieceType::ARCHBISHOP);
    v.promotion_piece_types.insert(PieceType::CHANCELLOR);
    v
}

fn shogi_family(v: &mut Variant) {
    v.reset_pieces();
    v.add_piece(PieceType::SHOGI_PAWN, 'p', None);
    v.add_piece(PieceType::SILVER, 's', None);
    v.add_piece(PieceType::GOLD, 'g', None);
    v.add_piece(PieceType::BISHOP, 'b', None);
    v.add_piece(PieceType::ROOK, 'r', None);
    v.add_piece(PieceType::DRAGON_HORSE, 'h', None);
    v.add_piece(PieceType::DRAGON, 'd', None);
    v.add_piece(PieceType::KING, 'k', None);
    for pt in [PieceType::SHOGI_PAWN, PieceType::SILVER] {
        v.promoted_piece_type[pt.index()] = PieceType::GOLD;
    }
    v.promoted_piece_type[PieceType::BISHOP.index()] = PieceType::DRAGON_HORSE;
    v.promoted_piece_type[PieceType::ROOK.index()] = PieceType::DRAGON;
    without_pawn_rules(v);
    v.piece_drops = true;
    v.captures_to_hand = true;
    v.shogi_doubled_pawn = false;
    v.immobility_illegal = true;
    v.shogi_pawn_drop_mate_illegal = true;
    v.stalemate_value = -Value::MATE;
    v.n_move_rule = 0;
    v.n_fold_rule = 4;
    v.perpetual_check_illegal = true;
}

fn shogi() -> Variant {
    let mut v = named("shogi", chess());
    shogi_family(&mut v);
    v.max_rank = 8;
    v.max_file = 8;
    v.add_piece(PieceType::LANCE, 'l', None);
    v.add_piece(PieceType::SHOGI_KNIGHT, 'n', None);
    v.promoted_piece_type[PieceType::LANCE.index()] = PieceType::GOLD;
    v.promoted_piece_type[PieceType::SHOGI_KNIGHT.index()] = PieceType::GOLD;
    v.start_fen = "lnsgkgsnl/1r5b1/ppppppppp/9/9/9/PPPPPPPPP/1B5R1/LNSGKGSNL[-] w 0 1".to_string();
    v.promotion_rank = 6;
    v
}

fn minishogi() -> Variant {
    let mut v = named("minishogi", chess());
    shogi_family(&mut v);
    v.max_rank = 4;
    v.max_file = 4;
    v.start_fen = "rbsgk/4p/5/P4/KGSBR[-] w 0 1".to_string();
    v.promotion_rank = 4;
    v
}

fn palace(v: &Variant) -> [Bitboard; 2] {
    let columns = files(3..=5);
    [columns & ranks(0..=2), columns & ranks(v.max_rank - 2..=v.max_rank)]
}

fn xiangqi_family(v: &mut Variant) {
    v.max_rank = 9;
    v.max_file = 8;
    v.reset_pieces();
    v.add_piece(PieceType::ROOK, 'r', None);
    v.add_piece(PieceType::HORSE, 'n', None);
    v.add_piece(PieceType::KING, 'k', None);
    v.add_piece(PieceType::SOLDIER, 'p', None);
    v.king_type = PieceType::WAZIR;
    without_pawn_rules(v);
    v.stalemate_value = -Value::MATE;
    v.perpetual_check_illegal = true;
    v.n_move_rule = 0;
}

fn xiangqi() -> Variant {
    let mut v = named("xiangqi", chess());
    xiangqi_family(&mut v);
    v.add_piece(PieceType::ELEPHANT, 'b', None);
    v.add_piece(PieceType::FERS, 'a', None);
    v.add_piece(PieceType::CANNON, 'c', None);
    v.start_fen = "rnbakabnr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RNBAKABNR w - - 0 1".to_string();
    let palace = palace(&v);
    for c in Color::ALL {
        v.mobility_region[c.index()][PieceType::KING.index()] = palace[c.index()];
        v.mobility_region[c.index()][PieceType::FERS.index()] = palace[c.index()];
    }
    v.mobility_region[Color::White.index()][PieceType::ELEPHANT.index()] = ranks(0..=4);
    v.mobility_region[Color::Black.index()][PieceType::ELEPHANT.index()] = ranks(5..=9);
    v.flying_general = true;
    v.soldier_promotion_rank = 5;
    v.chasing_rule = ChasingRule::Axf;
    v
}

fn janggi() -> Variant {
    let mut v = named("janggi", chess());
    xiangqi_family(&mut v);
    v.add_piece(PieceType::JANGGI_ELEPHANT, 'b', None);
    v.add_piece(PieceType::WAZIR, 'a', None);
    v.add_piece(PieceType::JANGGI_CANNON, 'c', None);
    v.start_fen = "rnba1abnr/4k4/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/4K4/RNBA1ABNR w - - 0 1".to_string();
    let palace = palace(&v);
    for c in Color::ALL {
        v.mobility_region[c.index()][PieceType::KING.index()] = palace[c.index()];
        v.mobility_region[c.index()][PieceType::WAZIR.index()] = palace[c.index()];
    }
    v.diagonal_lines = squares(&["d1", "f1", "e2", "d3", "f3", "d8", "f8", "e9", "d10", "f10"]);
    v.bikjang_rule = true;
    v.pass = true;
    v.material_counting = MaterialCounting::Janggi;
    v
}

fn duck() -> Variant {
    let mut v = named("duck", chess());
    with_commoner_king(&mut v);
    v.extinction_value = Some(-Value::MATE);
    v.extinction_piece_types = set_of(&[PieceType::COMMONER]);
    v.walling_rule = WallingRule::Duck;
    v.stalemate_value = Value::MATE;
    v
}

fn amazons() -> Variant {
    let mut v = named("amazons", chess());
    v.max_rank = 9;
    v.max_file = 9;
    v.reset_pieces();
    v.add_piece(PieceType::CUSTOM_PIECE_1, 'q', None);
    v.set_betza(PieceType::CUSTOM_PIECE_1, "mQ");
    without_pawn_rules(&mut v);
    v.start_fen = "3q2q3/10/10/q8q/10/10/Q8Q/10/10/3Q2Q3 w - - 0 1".to_string();
    v.walling_rule = WallingRule::Arrow;
    v.stalemate_value = -Value::MATE;
    v
}

fn petrified() -> Variant {
    let mut v = named("petrified", chess());
    v.petrify_on_capture_types = set_of(&[
        PieceType::KNIGHT,
        PieceType::BISHOP,
        PieceType::ROOK,
        PieceType::QUEEN,
        PieceType::KING,
    ]);
    v
}

fn stone_game(name: &str, max_file: u8, max_rank: u8, fen: &str) -> Variant {
    let mut v = named(name, chess());
    v.max_file = max_file;
    v.max_rank = max_rank;
    v.reset_pieces();
    v.add_piece(PieceType::IMMOBILE, 'p', None);
    without_pawn_rules(&mut v);
    v.start_fen = fen.to_string();
    v.piece_drops = true;
    v
}

fn flipello() -> Variant {
    let mut v = stone_game(
        "flipello",
        7,
        7,
        "8/8/8/3pP3/3Pp3/8/8/8[PPPPPPPPPPPPPPPPPPPPPPPPPPPPPPpppppppppppppppppppppppppppppp] w 0 1",
    );
    v.enclosing_drop = EnclosingRule::Reversi;
    v.flip_enclosed_pieces = EnclosingRule::Reversi;
    v.pass_on_stalemate = true;
    v.material_counting = MaterialCounting::Unweighted;
    v
}

fn connect4() -> Variant {
    let mut v = stone_game(
        "connect4",
        6,
        5,
        "7/7/7/7/7/7[PPPPPPPPPPPPPPPPPPPPPppppppppppppppppppppp] w 0 1",
    );
    v.drop_on_top = true;
    v.connect_n = 4;
    v
}

fn tictactoe() -> Variant {
    let mut v = stone_game("tictactoe", 2, 2, "3/3/3[PPPPPpppp] w 0 1");
    v.connect_n = 3;
    v
}

fn breakthrough() -> Variant {
    let mut v = named("breakthrough", chess());
    v.reset_pieces();
    v.add_piece(PieceType::BREAKTHROUGH, 'p', None);
    without_pawn_rules(&mut v);
    v.start_fen = "pppppppp/pppppppp/8/8/8/8/PPPPPPPP/PPPPPPPP w 0 1".to_string();
    v.flag_piece = Some(PieceType::BREAKTHROUGH);
    v.flag_region = [Bitboard::rank(7), Bitboard::rank(0)];
    v.stalemate_value = -Value::MATE;
    v.extinction_value = Some(-Value::MATE);
    v.extinction_piece_types = set_of(&[PieceType::ALL_PIECES]);
    v
}

fn clobber() -> Variant {
    let mut v = named("clobber", chess());
    v.max_file = 4;
    v.max_rank = 5;
    v.reset_pieces();
    v.add_piece(PieceType::CLOBBER, 'p', None);
    without_pawn_rules(&mut v);
    v.start_fen = "PpPpP/pPpPp/PpPpP/pPpPp/PpPpP/pPpPp w 0 1".to_string();
    v.stalemate_value = -Value::MATE;
    v
}

fn builtin_definitions() -> Vec<Variant> {
    vec![
        chess(),
        chess960(),
        crazyhouse(),
        loop_chess(),
        chessgi(),
        atomic(),
        horde(),
        antichess(),
        giveaway(),
        losers(),
        extinction(),
        kinglet(),
        check_chess("3check", 3),
        check_chess("5check", 5),
        kingofthehill(),
        racingkings(),
        makruk(),
        asean(),
        cambodian(),
        shatranj(),
        sittuyin(),
        capablanca(),
        amazon(),
        seirawan(),
        shogi(),
        minishogi(),
        xiangqi(),
        janggi(),
        duck(),
        amazons(),
        petrified(),
        flipello(),
        connect4(),
        tictactoe(),
        breakthrough(),
        clobber(),
    ]
}
