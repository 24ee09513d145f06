use crate::bitboard::Bitboard;
use crate::types::{
    ChasingRule, Color, CountingRule, EnclosingRule, MaterialCounting, PieceSet, PieceType, Square,
    Value, WallingRule,
};
use crate::variant::{ConfigError, Variant};

/// Variants read from a config text, concluded and ready to register.
#[derive(Debug, Clone)]
pub struct ParsedConfig {
    pub variants: Vec<Variant>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    Known,
    Legacy,
    Unknown,
}

/// Parses INI-like variant definitions.
///
/// Sections are `[name]` or `[name:template]`. A template names a variant of
/// `lookup` or an earlier section of the same text.
pub fn parse_config<F>(text: &str, lookup: F) -> Result<ParsedConfig, ConfigError>
where
    F: Fn(&str) -> Option<Variant>,
{
    let mut variants: Vec<Variant> = Vec::new();
    let mut warnings = Vec::new();
    let mut current: Option<Variant> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.strip_suffix(']').ok_or_else(|| ConfigError::Syntax {
                line: line_no,
                message: format!("unterminated section header '{line}'"),
            })?;
            if let Some(mut done) = current.take() {
                done.conclude()?;
                variants.push(done);
            }
            let (name, template) = match header.split_once(':') {
                Some((name, template)) => (name.trim(), Some(template.trim())),
                None => (header.trim(), None),
            };
            let mut var = match template {
                Some(template) => variants
                    .iter()
                    .rev()
                    .find(|v| v.name == template)
                    .cloned()
                    .or_else(|| lookup(template))
                    .ok_or_else(|| ConfigError::UnknownTemplate(template.to_string()))?,
                None => Variant::default(),
            };
            var.name = name.to_string();
            current = Some(var);
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            return Err(ConfigError::Syntax {
                line: line_no,
                message: format!("expected 'key = value', found '{line}'"),
            });
        };
        let Some(var) = current.as_mut() else {
            return Err(ConfigError::Syntax {
                line: line_no,
                message: "option outside of a variant section".to_string(),
            });
        };
        let (key, value) = (key.trim(), value.trim());
        match set_option(var, key, value)? {
            Setting::Known => {}
            Setting::Legacy => {
                let warning = format!("{}: '{key}' is a legacy option", var.name);
                log::warn!("{warning}");
                warnings.push(warning);
            }
            Setting::Unknown => {
                let warning = format!("{}: unknown option '{key}'", var.name);
                log::warn!("{warning}");
                warnings.push(warning);
            }
        }
    }

    if let Some(mut done) = current.take() {
        done.conclude()?;
        variants.push(done);
    }
    Ok(ParsedConfig { variants, warnings })
}

fn strip_comment(line: &str) -> &str {
    let end = line.find(['#', ';']).unwrap_or(line.len());
    &line[..end]
}

fn bad(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(bad(key, value)),
    }
}

fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| bad(key, value))
}

/// `1..=10` to a zero-based rank.
pub fn parse_rank(key: &str, value: &str) -> Result<u8, ConfigError> {
    match value.parse::<u8>() {
        Ok(r @ 1..=10) => Ok(r - 1),
        _ => Err(bad(key, value)),
    }
}

/// `a..=l` or `1..=12` to a zero-based file.
pub fn parse_file(key: &str, value: &str) -> Result<u8, ConfigError> {
    if let Ok(f @ 1..=12) = value.parse::<u8>() {
        return Ok(f - 1);
    }
    match value.as_bytes() {
        [c @ b'a'..=b'l'] => Ok(c - b'a'),
        _ => Err(bad(key, value)),
    }
}

/// `win`, `loss`, `draw` or `none`.
pub fn parse_value(key: &str, value: &str) -> Result<Option<Value>, ConfigError> {
    if value == "none" {
        return Ok(None);
    }
    Value::from_name(value).map(Some).ok_or_else(|| bad(key, value))
}

fn parse_piece_letter(var: &Variant, key: &str, value: &str, c: char) -> Result<PieceType, ConfigError> {
    var.piece_from_char(c)
        .map(|p| p.piece_type())
        .ok_or_else(|| bad(key, value))
}

/// Piece letters, or `*` for every type of the variant.
pub fn parse_piece_set(var: &Variant, key: &str, value: &str) -> Result<PieceSet, ConfigError> {
    let mut set = PieceSet::EMPTY;
    for c in value.chars().filter(|c| !c.is_whitespace()) {
        if c == '*' {
            set.insert(PieceType::ALL_PIECES);
        } else if c != '-' {
            set.insert(parse_piece_letter(var, key, value, c)?);
        }
    }
    Ok(set)
}

fn parse_single_piece(var: &Variant, key: &str, value: &str) -> Result<PieceType, ConfigError> {
    match value {
        "*" => Ok(PieceType::ALL_PIECES),
        "-" => Ok(PieceType::NONE),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => parse_piece_letter(var, key, value, c),
                _ => Err(bad(key, value)),
            }
        }
    }
}

/// Squares like `a1`, whole ranks `*3`, whole files `c*` or everything `*`.
pub fn parse_region(key: &str, value: &str) -> Result<Bitboard, ConfigError> {
    let mut region = Bitboard::EMPTY;
    for token in value.split_whitespace() {
        if token == "*" {
            region |= Bitboard::ALL;
        } else if let Some(rank) = token.strip_prefix('*') {
            region |= Bitboard::rank(parse_rank(key, rank)?);
        } else if let Some(file) = token.strip_suffix('*') {
            region |= Bitboard::file(parse_file(key, file)?);
        } else {
            let sq = Square::parse(token).ok_or_else(|| bad(key, value))?;
            region.set(sq);
        }
    }
    Ok(region)
}

fn parse_pairs(key: &str, value: &str) -> Result<Vec<(char, String)>, ConfigError> {
    value
        .split_whitespace()
        .map(|token| {
            let (letter, rest) = token.split_once(':').ok_or_else(|| bad(key, value))?;
            let mut chars = letter.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok((c, rest.to_string())),
                _ => Err(bad(key, value)),
            }
        })
        .collect()
}

fn parse_enum<T>(key: &str, value: &str, from_name: fn(&str) -> Option<T>) -> Result<T, ConfigError> {
    from_name(value).ok_or_else(|| bad(key, value))
}

fn color_suffix(key: &str, base: &str) -> Option<Color> {
    match key.strip_prefix(base)? {
        "White" => Some(Color::White),
        "Black" => Some(Color::Black),
        _ => None,
    }
}

// `customPiece1 = a:mNcK`, `king = k:W`, `knight = n` or `rook = -`.
fn set_piece(var: &mut Variant, pt: PieceType, key: &str, value: &str) -> Result<(), ConfigError> {
    if value == "-" {
        var.remove_piece(pt);
        return Ok(());
    }
    let (letter, betza) = match value.split_once(':') {
        Some((letter, betza)) => (letter, Some(betza)),
        None => (value, None),
    };
    let mut chars = letter.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return Err(bad(key, value));
    };
    if !c.is_ascii_alphabetic() {
        return Err(bad(key, value));
    }
    var.remove_piece(pt);
    var.add_piece(pt, c, None);
    match betza {
        Some(betza) => var.set_betza(pt, betza),
        None if pt.is_custom() => return Err(bad(key, value)),
        None => {}
    }
    Ok(())
}

fn set_option(var: &mut Variant, key: &str, value: &str) -> Result<Setting, ConfigError> {
    if let Some(pt) = PieceType::from_name(key) {
        set_piece(var, pt, key, value)?;
        return Ok(Setting::Known);
    }

    for base in [
        "promotionRegion",
        "doubleStepRegion",
        "tripleStepRegion",
        "dropRegion",
        "flagRegion",
        "wallingRegion",
        "connectRegion1",
        "connectRegion2",
    ] {
        if let Some(c) = color_suffix(key, base) {
            let region = parse_region(key, value)?;
            let i = c.index();
            match base {
                "promotionRegion" => var.promotion_region[i] = Some(region),
                "doubleStepRegion" => var.double_step_region[i] = Some(region),
                "tripleStepRegion" => var.triple_step_region[i] = region,
                "dropRegion" => var.drop_region[i] = region,
                "flagRegion" => var.flag_region[i] = region,
                "wallingRegion" => var.walling_region[i] = region,
                "connectRegion1" => var.connect_region1[i] = region,
                _ => var.connect_region2[i] = region,
            }
            return Ok(Setting::Known);
        }
    }

    if let Some(rest) = key.strip_prefix("mobilityRegion") {
        let (c, name) = if let Some(name) = rest.strip_prefix("White") {
            (Color::White, name)
        } else if let Some(name) = rest.strip_prefix("Black") {
            (Color::Black, name)
        } else {
            return Ok(Setting::Unknown);
        };
        let mut chars = name.chars();
        let name = match chars.next() {
            Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
            None => return Ok(Setting::Unknown),
        };
        let Some(pt) = PieceType::from_name(&name) else {
            return Ok(Setting::Unknown);
        };
        var.mobility_region[c.index()][pt.index()] = parse_region(key, value)?;
        return Ok(Setting::Known);
    }

    match key {
        "maxRank" => var.max_rank = parse_rank(key, value)?,
        "maxFile" => var.max_file = parse_file(key, value)?,
        "chess960" => var.chess960 = parse_bool(key, value)?,
        "pocketSize" => var.pocket_size = parse_int(key, value)?,
        "startFen" => var.start_fen = value.to_string(),
        "pieceToCharSynonyms" => {
            for (c, target) in parse_pairs(key, value)? {
                let piece = target
                    .chars()
                    .next()
                    .and_then(|t| var.piece_from_char(t))
                    .ok_or_else(|| bad(key, value))?;
                let c = if piece.color() == Color::White {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                };
                var.piece_to_char_synonyms[piece.index()] = c;
                var.piece_to_char_synonyms[piece.flip().index()] = if c.is_ascii_uppercase() {
                    c.to_ascii_lowercase()
                } else {
                    c.to_ascii_uppercase()
                };
            }
        }
        "kingType" => {
            var.king_type = PieceType::from_name(value).ok_or_else(|| bad(key, value))?;
        }
        "promotionRank" => {
            let rank = parse_rank(key, value)?;
            var.promotion_rank = rank;
            var.promotion_region = [None; 2];
            return Ok(Setting::Legacy);
        }
        "promotionPieceTypes" => var.promotion_piece_types = parse_piece_set(var, key, value)?,
        "sittuyinPromotion" => var.sittuyin_promotion = parse_bool(key, value)?,
        "promotionLimit" => {
            for (c, limit) in parse_pairs(key, value)? {
                let pt = parse_piece_letter(var, key, value, c)?;
                var.promotion_limit[pt.index()] = parse_int(key, &limit)?;
            }
        }
        "promotedPieceType" => {
            for (c, target) in parse_pairs(key, value)? {
                let pt = parse_piece_letter(var, key, value, c)?;
                let promoted = parse_single_piece(var, key, &target)?;
                var.promoted_piece_type[pt.index()] = promoted;
            }
        }
        "piecePromotionOnCapture" => var.piece_promotion_on_capture = parse_bool(key, value)?,
        "mandatoryPawnPromotion" => var.mandatory_pawn_promotion = parse_bool(key, value)?,
        "mandatoryPiecePromotion" => var.mandatory_piece_promotion = parse_bool(key, value)?,
        "pieceDemotion" => var.piece_demotion = parse_bool(key, value)?,
        "doubleStep" => var.double_step = parse_bool(key, value)?,
        "doubleStepRank" => {
            var.double_step_rank = parse_rank(key, value)?;
            var.double_step_region = [None; 2];
            return Ok(Setting::Legacy);
        }
        "firstRankDoubleSteps" => var.first_rank_double_steps = parse_bool(key, value)?,
        "enPassantRegion" => var.en_passant_region = parse_region(key, value)?,
        "castling" => var.castling = parse_bool(key, value)?,
        "castlingDroppedPiece" => var.castling_dropped_piece = parse_bool(key, value)?,
        "castlingKingsideFile" => var.castling_kingside_file = parse_file(key, value)?,
        "castlingQueensideFile" => var.castling_queenside_file = parse_file(key, value)?,
        "castlingRank" => var.castling_rank = parse_rank(key, value)?,
        "castlingKingPiece" => var.castling_king_piece = parse_single_piece(var, key, value)?,
        "castlingRookPiece" => var.castling_rook_piece = parse_single_piece(var, key, value)?,
        "checking" => var.checking = parse_bool(key, value)?,
        "mustCapture" => var.must_capture = parse_bool(key, value)?,
        "mustDrop" => var.must_drop = parse_bool(key, value)?,
        "mustDropType" => var.must_drop_type = parse_single_piece(var, key, value)?,
        "pieceDrops" => var.piece_drops = parse_bool(key, value)?,
        "dropLoop" => var.drop_loop = parse_bool(key, value)?,
        "capturesToHand" => var.captures_to_hand = parse_bool(key, value)?,
        "firstRankPawnDrops" => var.first_rank_pawn_drops = parse_bool(key, value)?,
        "promotionZonePawnDrops" => var.promotion_zone_pawn_drops = parse_bool(key, value)?,
        "dropOnTop" => var.drop_on_top = parse_bool(key, value)?,
        "enclosingDrop" => var.enclosing_drop = parse_enum(key, value, EnclosingRule::from_name)?,
        "whiteDropRegion" | "blackDropRegion" => {
            let c = if key.starts_with("white") { Color::White } else { Color::Black };
            var.drop_region[c.index()] = parse_region(key, value)?;
            return Ok(Setting::Legacy);
        }
        "sittuyinRookDrop" => var.sittuyin_rook_drop = parse_bool(key, value)?,
        "dropOppositeColoredBishop" => var.drop_opposite_colored_bishop = parse_bool(key, value)?,
        "dropPromoted" => var.drop_promoted = parse_bool(key, value)?,
        "shogiDoubledPawn" => var.shogi_doubled_pawn = parse_bool(key, value)?,
        "immobilityIllegal" => var.immobility_illegal = parse_bool(key, value)?,
        "gating" => var.gating = parse_bool(key, value)?,
        "seirawanGating" => var.seirawan_gating = parse_bool(key, value)?,
        "cambodianMoves" => var.cambodian_moves = parse_bool(key, value)?,
        "diagonalLines" => var.diagonal_lines = parse_region(key, value)?,
        "pass" => var.pass = parse_bool(key, value)?,
        "passOnStalemate" => var.pass_on_stalemate = parse_bool(key, value)?,
        "makpongRule" => var.makpong_rule = parse_bool(key, value)?,
        "flyingGeneral" => var.flying_general = parse_bool(key, value)?,
        "soldierPromotionRank" => var.soldier_promotion_rank = parse_rank(key, value)?,
        "flipEnclosedPieces" => var.flip_enclosed_pieces = parse_enum(key, value, EnclosingRule::from_name)?,
        "blastOnCapture" => var.blast_on_capture = parse_bool(key, value)?,
        "blastImmuneTypes" => var.blast_immune_types = parse_piece_set(var, key, value)?,
        "petrifyOnCaptureTypes" => var.petrify_on_capture_types = parse_piece_set(var, key, value)?,
        "wallingRule" => var.walling_rule = parse_enum(key, value, WallingRule::from_name)?,
        "nMoveRule" => var.n_move_rule = parse_int(key, value)?,
        "nFoldRule" => var.n_fold_rule = parse_int(key, value)?,
        "nFoldValue" => var.n_fold_value = parse_value(key, value)?.ok_or_else(|| bad(key, value))?,
        "nFoldValueAbsolute" => var.n_fold_value_absolute = parse_bool(key, value)?,
        "perpetualCheckIllegal" => var.perpetual_check_illegal = parse_bool(key, value)?,
        "chasingRule" => var.chasing_rule = parse_enum(key, value, ChasingRule::from_name)?,
        "stalemateValue" => var.stalemate_value = parse_value(key, value)?.ok_or_else(|| bad(key, value))?,
        "checkmateValue" => var.checkmate_value = parse_value(key, value)?.ok_or_else(|| bad(key, value))?,
        "shogiPawnDropMateIllegal" => var.shogi_pawn_drop_mate_illegal = parse_bool(key, value)?,
        "bareKingValue" => var.bare_king_value = parse_value(key, value)?,
        "bareKingMove" => var.bare_king_move = parse_bool(key, value)?,
        "extinctionValue" => var.extinction_value = parse_value(key, value)?,
        "extinctionClaim" => var.extinction_claim = parse_bool(key, value)?,
        "extinctionPseudoRoyal" => var.extinction_pseudo_royal = parse_bool(key, value)?,
        "extinctionPieceTypes" => var.extinction_piece_types = parse_piece_set(var, key, value)?,
        "extinctionPieceCount" => var.extinction_piece_count = parse_int(key, value)?,
        "extinctionOpponentPieceCount" => var.extinction_opponent_piece_count = parse_int(key, value)?,
        "flagPiece" => {
            var.flag_piece = match parse_single_piece(var, key, value)? {
                PieceType::NONE if value == "-" => None,
                pt => Some(pt),
            }
        }
        "whiteFlag" | "blackFlag" => {
            let c = if key.starts_with("white") { Color::White } else { Color::Black };
            var.flag_region[c.index()] = parse_region(key, value)?;
            return Ok(Setting::Legacy);
        }
        "flagPieceCount" => var.flag_piece_count = parse_int(key, value)?,
        "flagMove" => var.flag_move = parse_bool(key, value)?,
        "checkCounting" => var.check_counting = parse_bool(key, value)?,
        "connectN" => var.connect_n = parse_int(key, value)?,
        "connectHorizontal" => var.connect_horizontal = parse_bool(key, value)?,
        "connectVertical" => var.connect_vertical = parse_bool(key, value)?,
        "connectDiagonal" => var.connect_diagonal = parse_bool(key, value)?,
        "materialCounting" => var.material_counting = parse_enum(key, value, MaterialCounting::from_name)?,
        "countingRule" => var.counting_rule = parse_enum(key, value, CountingRule::from_name)?,
        "tsumeMode" => var.tsume_mode = parse_bool(key, value)?,
        "bikjangRule" => var.bikjang_rule = parse_bool(key, value)?,
        _ => return Ok(Setting::Unknown),
    }
    Ok(Setting::Known)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_templates(_: &str) -> Option<Variant> {
        None
    }

    #[test]
    fn regions_accept_wildcards() {
        let region = parse_region("r", "a1 *3 c*").unwrap();
        assert!(region.contains(Square::new(0, 0)));
        assert!(region.contains(Square::new(7, 2)));
        assert!(region.contains(Square::new(2, 9)));
        assert!(!region.contains(Square::new(1, 0)));
        assert!(parse_region("r", "z9").is_err());
    }

    #[test]
    fn ranks_and_files_are_one_based() {
        assert_eq!(parse_rank("k", "1").unwrap(), 0);
        assert_eq!(parse_rank("k", "10").unwrap(), 9);
        assert!(parse_rank("k", "0").is_err());
        assert_eq!(parse_file("k", "c").unwrap(), 2);
        assert_eq!(parse_file("k", "12").unwrap(), 11);
        assert!(parse_file("k", "m").is_err());
    }

    #[test]
    fn sections_collect_unknown_and_legacy_keys() {
        let text = "\
# comment
[mini]
maxRank = 6
maxFile = 6
startFen = rnbqk/ppppp/5/5/PPPPP/RNBQK w - - 0 1
promotionRank = 6
castling = false
doubleStep = false
fancyOption = 3
";
        let parsed = parse_config(text, no_templates).unwrap();
        assert_eq!(parsed.variants.len(), 1);
        let mini = &parsed.variants[0];
        assert_eq!(mini.name, "mini");
        assert_eq!(mini.max_rank, 5);
        assert_eq!(mini.promotion_rank, 5);
        assert_eq!(parsed.warnings.len(), 2);
        assert!(parsed.warnings.iter().any(|w| w.contains("fancyOption")));
        assert!(parsed.warnings.iter().any(|w| w.contains("legacy")));
    }

    #[test]
    fn custom_pieces_need_movement() {
        let text = "[fairy]\ncustomPiece1 = a:mNcK\n";
        let parsed = parse_config(text, no_templates).unwrap();
        let fairy = &parsed.variants[0];
        assert_eq!(fairy.type_char(PieceType::CUSTOM_PIECE_1), Some('A'));

        let err = parse_config("[fairy]\ncustomPiece1 = a\n", no_templates).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn earlier_sections_serve_as_templates() {
        let text = "[base]\nmustCapture = true\n[child:base]\ncastling = false\n";
        let parsed = parse_config(text, no_templates).unwrap();
        assert!(parsed.variants[1].must_capture);
        assert!(!parsed.variants[1].castling);
        assert_eq!(
            parse_config("[x:nowhere]\n", no_templates).unwrap_err(),
            ConfigError::UnknownTemplate("nowhere".to_string())
        );
    }

    #[test]
    fn malformed_lines_report_their_number() {
        let err = parse_config("[a]\nnonsense\n", no_templates).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Syntax {
                line: 2,
                message: "expected 'key = value', found 'nonsense'".to_string()
            }
        );
    }
}
