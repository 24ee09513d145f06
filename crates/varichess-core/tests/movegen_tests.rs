use varichess_core::{
    count_legal, generate, move_to_uci, parse_uci, variant, GenType, MoveType, NotationError,
    Position,
};

fn position(name: &str, fen: &str) -> Position {
    Position::from_fen(variant(name).unwrap(), fen).unwrap()
}

fn legal_names(pos: &Position) -> Vec<String> {
    let mut names: Vec<String> = pos.legal_moves().iter().map(|m| move_to_uci(pos, *m)).collect();
    names.sort();
    names
}

#[test]
fn captures_and_quiets_partition_pseudo_legal_moves() {
    let pos = position(
        "chess",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    );
    let all = generate(&pos, GenType::NonEvasions);
    let captures = generate(&pos, GenType::Captures);
    let quiets = generate(&pos, GenType::Quiets);
    assert_eq!(captures.len() + quiets.len(), all.len());
    assert!(captures.iter().all(|m| pos.is_capture(*m)));
    assert_eq!(count_legal(&pos), 48);
}

#[test]
fn evasions_cover_every_legal_reply_to_check() {
    let pos = position("chess", "4k3/8/8/8/8/8/4r3/R3K3 w - - 0 1");
    let evasions = generate(&pos, GenType::Evasions);
    for m in pos.legal_moves() {
        assert!(evasions.contains(&m));
    }
    assert_eq!(legal_names(&pos), ["e1d1", "e1e2", "e1f1"]);
}

#[test]
fn promotions_offer_each_promotion_type() {
    let pos = position("chess", "8/P7/8/8/8/8/8/k6K w - - 0 1");
    let names = legal_names(&pos);
    for promo in ["a7a8q", "a7a8r", "a7a8b", "a7a8n"] {
        assert!(names.contains(&promo.to_string()), "{promo}");
    }
    assert!(!names.contains(&"a7a8".to_string()));
    assert_eq!(names.len(), 7);
}

#[test]
fn crazyhouse_drops_fill_every_empty_square() {
    let pos = position(
        "crazyhouse",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[P] w KQkq - 0 1",
    );
    let drops = pos.legal_moves().iter().filter(|m| m.is_drop()).count();
    assert_eq!(drops, 32);
    assert_eq!(count_legal(&pos), 52);
}

#[test]
fn shogi_pawn_drops_respect_file_and_rank_limits() {
    let pos = position("shogi", "4k4/9/9/9/9/9/4P4/9/4K4[P] w 0 1");
    let names = legal_names(&pos);
    assert!(names.contains(&"P@a5".to_string()));
    assert!(!names.iter().any(|m| m.starts_with("P@e")));
    assert!(!names.iter().any(|m| m.starts_with("P@") && m.ends_with('9')));
}

#[test]
fn shogi_pawn_drop_mate_is_illegal() {
    let pos = position("shogi", "3rkr3/9/4G4/9/9/9/9/9/4K4[P] w 0 1");
    let names = legal_names(&pos);
    assert!(!names.contains(&"P@e8".to_string()));
    assert!(names.contains(&"P@e6".to_string()));
}

#[test]
fn antichess_forces_captures() {
    let pos = position(
        "antichess",
        "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w - - 0 2",
    );
    assert_eq!(legal_names(&pos), ["e4d5"]);
}

#[test]
fn flying_general_forbids_facing_kings() {
    let pos = position("xiangqi", "3k5/9/9/9/9/9/9/9/9/4K4 w - - 0 1");
    let names = legal_names(&pos);
    assert!(!names.contains(&"e1d1".to_string()));
    assert!(names.contains(&"e1f1".to_string()));
    assert!(names.contains(&"e1e2".to_string()));
}

#[test]
fn janggi_stalemate_leaves_only_the_pass() {
    let pos = position("janggi", "4k4/c7R/9/3R1R3/9/9/9/9/9/3K5 b - - 0 1");
    let moves = pos.legal_moves();
    assert_eq!(moves.len(), 1);
    assert!(moves[0].is_pass());
    assert_eq!(move_to_uci(&pos, moves[0]), "@@@@");
}

#[test]
fn seirawan_gating_adds_moves_from_the_back_rank() {
    let pos = Position::new(variant("seirawan").unwrap()).unwrap();
    let moves = pos.legal_moves();
    assert_eq!(moves.len(), 28);
    assert_eq!(moves.iter().filter(|m| m.is_gating()).count(), 8);
}

#[test]
fn duck_moves_carry_a_wall_square() {
    let pos = Position::new(variant("duck").unwrap()).unwrap();
    let moves = pos.legal_moves();
    assert!(moves.iter().all(|m| m.wall_square().is_some()));
    assert_eq!(moves.len(), 20 * 32);
}

#[test]
fn sittuyin_pawns_promote_in_place() {
    let pos = position("sittuyin", "k7/2K3P1/8/8/4P3/8/8/8[] w - - 0 1");
    let names = legal_names(&pos);
    assert!(names.contains(&"g7g7f".to_string()));
    assert!(names.contains(&"g7f8f".to_string()));
    assert!(!names.contains(&"e4e4f".to_string()));
    assert!(pos
        .legal_moves()
        .iter()
        .filter(|m| m.move_type() == MoveType::Promotion)
        .all(|m| m.from() == m.to() || m.from().file() != m.to().file()));
}

#[test]
fn dropped_pawn_can_give_check() {
    let pos = position("crazyhouse", "4k3/8/8/8/8/8/8/4K3[p] b - - 0 1");
    let drop = parse_uci(&pos, "P@d2").unwrap();
    assert!(pos.gives_check(drop));
}

#[test]
fn promoted_pieces_cannot_be_dropped_in_shogi() {
    let pos = position("shogi", "4k4/9/9/9/9/9/9/9/4K4[R] w 0 1");
    assert!(parse_uci(&pos, "R@e5").is_ok());
    assert!(matches!(parse_uci(&pos, "+R@e5"), Err(NotationError::Illegal(_))));
}

#[test]
fn last_blocker_between_generals_is_pinned() {
    let pos = position("xiangqi", "4k4/9/9/9/9/9/9/9/4R4/4K4 w - - 0 1");
    let names = legal_names(&pos);
    assert!(names.contains(&"e2e3".to_string()));
    assert!(!names.contains(&"e2d2".to_string()));
}

#[test]
fn atomic_captures_may_not_blast_the_own_king() {
    let pos = position("atomic", "4k3/8/8/8/8/8/R3p3/4K3 w - - 0 1");
    let names = legal_names(&pos);
    assert!(!names.contains(&"a2e2".to_string()));
    assert!(!names.contains(&"e1e2".to_string()));
    assert!(names.contains(&"a2b2".to_string()));
}
