use varichess_core::{
    builtin_variants, variant, Color, ConfigError, PieceType, Position, Value, VariantMap,
};

#[test]
fn builtin_registry_lists_all_variants() {
    let names: Vec<&str> = builtin_variants().names().collect();
    for expected in [
        "chess", "chess960", "crazyhouse", "atomic", "horde", "antichess", "3check",
        "kingofthehill", "racingkings", "makruk", "sittuyin", "capablanca", "seirawan", "shogi",
        "minishogi", "xiangqi", "janggi", "duck", "amazons", "flipello", "connect4", "tictactoe",
        "breakthrough", "clobber",
    ] {
        assert!(names.contains(&expected), "missing {expected}");
    }
    assert!(variant("nosuchvariant").is_none());
}

#[test]
fn every_builtin_start_position_loads() {
    for name in builtin_variants().names() {
        let var = variant(name).unwrap();
        let pos = Position::new(var).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(
            !pos.legal_moves().is_empty(),
            "{name} has no moves in its start position"
        );
    }
}

#[test]
fn board_geometry_follows_the_variant() {
    let xiangqi = variant("xiangqi").unwrap();
    assert_eq!((xiangqi.max_file, xiangqi.max_rank), (8, 9));
    assert_eq!(xiangqi.board_bb.count(), 90);

    let capablanca = variant("capablanca").unwrap();
    assert_eq!(capablanca.board_bb.count(), 80);

    let minishogi = variant("minishogi").unwrap();
    assert_eq!(minishogi.board_bb.count(), 25);
}

#[test]
fn piece_letters_follow_the_variant() {
    let shogi = variant("shogi").unwrap();
    assert_eq!(shogi.type_char(PieceType::SHOGI_PAWN), Some('P'));
    assert_eq!(shogi.type_char(PieceType::GOLD), Some('G'));
    assert_eq!(shogi.promoted_type(PieceType::SHOGI_PAWN), Some(PieceType::GOLD));

    let chess = variant("chess").unwrap();
    assert_eq!(chess.type_char(PieceType::KNIGHT), Some('N'));
    assert!(chess.promotion_piece_types.contains(PieceType::QUEEN));
    assert!(!chess.promotion_piece_types.contains(PieceType::KING));
}

#[test]
fn rule_values_are_stored_from_the_side_to_move() {
    let antichess = variant("antichess").unwrap();
    assert_eq!(antichess.extinction_value, Some(Value::MATE));
    assert!(antichess.must_capture);

    let shogi = variant("shogi").unwrap();
    assert!(shogi.captures_to_hand);
    assert!(shogi.shogi_pawn_drop_mate_illegal);

    let chess = variant("chess").unwrap();
    assert_eq!(chess.checkmate_value, -Value::MATE);
    assert_eq!(chess.stalemate_value, Value::DRAW);
}

#[test]
fn config_text_extends_the_registry() {
    let mut map = VariantMap::builtin();
    let before = map.len();
    let warnings = map
        .load(
            "\
[knightmate:chess]
king = -
commoner = k
centaur = m
startFen = rmbqkbmr/pppppppp/8/8/8/8/PPPPPPPP/RMBQKBMR w KQkq - 0 1
",
        )
        .unwrap();
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(map.len(), before + 1);
    let knightmate = map.get("knightmate").unwrap();
    assert_eq!(knightmate.type_char(PieceType::CENTAUR), Some('M'));
}

#[test]
fn config_reports_bad_values_and_templates() {
    let mut map = VariantMap::builtin();
    assert!(matches!(
        map.load("[broken:chess]\ncastling = maybe\n"),
        Err(ConfigError::InvalidValue { .. })
    ));
    assert_eq!(
        map.load("[orphan:missing]\n"),
        Err(ConfigError::UnknownTemplate("missing".to_string()))
    );
}

#[test]
fn contradictory_capture_rules_are_rejected() {
    let mut map = VariantMap::builtin();
    let err = map
        .load("[petrified-atomic:atomic]\npetrifyOnCaptureTypes = n\n")
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedCombination(_)));
}

#[test]
fn regions_are_colored() {
    let koth = variant("kingofthehill").unwrap();
    let center = koth.flag_region[Color::White.index()];
    assert_eq!(center.count(), 4);
    assert_eq!(koth.flag_region[Color::Black.index()], center);
}
