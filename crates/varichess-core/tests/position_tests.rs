use varichess_core::{
    parse_uci, variant, Color, Move, Piece, PieceType, Position, PositionError, Square,
};

fn sq(name: &str) -> Square {
    Square::parse(name).unwrap()
}

fn play(pos: &mut Position, moves: &[&str]) {
    for text in moves {
        let m = parse_uci(pos, text).unwrap_or_else(|e| panic!("{text}: {e}"));
        pos.do_move(m);
    }
}

#[test]
fn do_undo_restores_everything() {
    let mut pos = Position::new(variant("chess").unwrap()).unwrap();
    let start_fen = pos.fen();
    let start_key = pos.key();

    for m in pos.legal_moves() {
        pos.do_move(m);
        assert_eq!(pos.key(), pos.compute_key());
        pos.undo_move(m).unwrap();
        assert_eq!(pos.fen(), start_fen);
        assert_eq!(pos.key(), start_key);
    }
    assert_eq!(pos.history().len(), 0);
}

#[test]
fn incremental_keys_match_recomputed_keys_across_variants() {
    for (name, moves) in [
        ("crazyhouse", &["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "P@d4"][..]),
        ("shogi", &["c3c4", "g7g6", "b2h8+", "g9h8", "B@e5"][..]),
        ("atomic", &["e2e4", "d7d5", "e4d5", "g8f6"][..]),
        ("xiangqi", &["h3h10", "i10h10"][..]),
        ("seirawan", &["g1f3h", "b8c6e"][..]),
    ] {
        let mut pos = Position::new(variant(name).unwrap()).unwrap();
        play(&mut pos, moves);
        assert_eq!(pos.key(), pos.compute_key(), "{name}");
        let reparsed = Position::from_fen(variant(name).unwrap(), &pos.fen()).unwrap();
        assert_eq!(reparsed.key(), pos.key(), "{name}");
    }
}

#[test]
fn captured_pieces_go_to_hand_demoted() {
    let mut pos = Position::new(variant("shogi").unwrap()).unwrap();
    play(&mut pos, &["c3c4", "g7g6", "b2h8+"]);
    assert_eq!(pos.board().in_hand(Color::White, PieceType::BISHOP), 1);
    assert_eq!(
        pos.piece_on(sq("h8")),
        Piece::new(Color::White, PieceType::DRAGON_HORSE)
    );
    play(&mut pos, &["g9h8"]);
    assert_eq!(pos.board().in_hand(Color::Black, PieceType::BISHOP), 1);
    assert_eq!(pos.board().in_hand(Color::Black, PieceType::DRAGON_HORSE), 0);
}

#[test]
fn atomic_captures_explode() {
    let mut pos = Position::new(variant("atomic").unwrap()).unwrap();
    play(&mut pos, &["e2e4", "d7d5", "e4d5"]);
    assert!(pos.board().is_empty(sq("d5")));
    assert!(pos.board().is_empty(sq("e4")));
    assert_eq!(pos.piece_on(sq("d8")), Piece::new(Color::Black, PieceType::QUEEN));
    assert!(pos.board().is_empty(sq("c6")));
}

#[test]
fn undo_restores_many_square_moves() {
    let mut atomic = Position::new(variant("atomic").unwrap()).unwrap();
    play(&mut atomic, &["e2e4", "d7d5"]);
    let before = atomic.fen();
    play(&mut atomic, &["e4d5"]);
    atomic.undo_move(atomic.last_move().unwrap()).unwrap();
    assert_eq!(atomic.fen(), before);
    assert_eq!(atomic.key(), atomic.compute_key());

    let mut flipello = Position::new(variant("flipello").unwrap()).unwrap();
    let before = flipello.fen();
    for m in flipello.legal_moves() {
        flipello.do_move(m);
        flipello.undo_move(m).unwrap();
        assert_eq!(flipello.fen(), before);
    }
}

#[test]
fn castling_moves_king_and_rook() {
    let var = variant("chess").unwrap();
    let mut pos = Position::from_fen(var, "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut pos, &["e1g1"]);
    assert_eq!(pos.piece_on(sq("g1")), Piece::new(Color::White, PieceType::KING));
    assert_eq!(pos.piece_on(sq("f1")), Piece::new(Color::White, PieceType::ROOK));
    assert_eq!(pos.castling_rights() & 3, 0);
    play(&mut pos, &["e8c8"]);
    assert_eq!(pos.piece_on(sq("c8")), Piece::new(Color::Black, PieceType::KING));
    assert_eq!(pos.piece_on(sq("d8")), Piece::new(Color::Black, PieceType::ROOK));
    assert_eq!(pos.fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
}

#[test]
fn en_passant_capture_removes_the_pawn() {
    let var = variant("chess").unwrap();
    let mut pos =
        Position::from_fen(var, "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3").unwrap();
    play(&mut pos, &["d4e3"]);
    assert!(pos.board().is_empty(sq("e4")));
    assert_eq!(pos.piece_on(sq("e3")), Piece::new(Color::Black, PieceType::PAWN));
}

#[test]
fn check_info_tracks_checkers_and_pins() {
    let var = variant("chess").unwrap();
    let pos = Position::from_fen(var.clone(), "4k3/8/8/8/8/8/4r3/R3K3 w - - 0 1").unwrap();
    assert!(pos.in_check());
    assert_eq!(pos.checkers().count(), 1);

    let pinned = Position::from_fen(var, "4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
    assert!(!pinned.in_check());
    assert!(pinned.blockers_for_king(Color::White).contains(sq("e2")));
    assert!(pinned.pinners(Color::Black).contains(sq("e7")));
    assert!(pinned.legal_moves().iter().all(|m| m.from() != sq("e2")));
}

#[test]
fn gives_check_predicts_the_next_state() {
    let var = variant("chess").unwrap();
    let pos = Position::from_fen(var, "4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    for m in pos.legal_moves() {
        let mut next = pos.clone();
        next.do_move(m);
        assert_eq!(pos.gives_check(m), next.in_check(), "{m:?}");
    }
}

#[test]
fn make_move_rejects_illegal_moves() {
    let mut pos = Position::new(variant("chess").unwrap()).unwrap();
    let bogus = Move::normal(sq("e2"), sq("e5"));
    assert_eq!(pos.make_move(bogus), Err(PositionError::IllegalMove));
    assert_eq!(pos.undo_move(bogus), Err(PositionError::EmptyHistory));

    let e4 = Move::normal(sq("e2"), sq("e4"));
    pos.make_move(e4).unwrap();
    assert_eq!(
        pos.undo_move(Move::normal(sq("d2"), sq("d4"))),
        Err(PositionError::MoveMismatch)
    );
    pos.undo_move(e4).unwrap();
}

#[test]
fn null_moves_flip_the_side_only() {
    let mut pos = Position::new(variant("chess").unwrap()).unwrap();
    let fen = pos.fen();
    pos.do_null_move().unwrap();
    assert_eq!(pos.side_to_move(), Color::Black);
    pos.undo_null_move().unwrap();
    assert_eq!(pos.fen(), fen);

    let var = variant("chess").unwrap();
    let mut checked = Position::from_fen(var, "4k3/8/8/8/8/8/4r3/4K3 w - - 0 1").unwrap();
    assert_eq!(checked.do_null_move(), Err(PositionError::NullMoveInCheck));
}

#[test]
fn check_counting_decrements_on_check() {
    let mut pos = Position::new(variant("3check").unwrap()).unwrap();
    play(&mut pos, &["e2e4", "f7f6", "d1h5"]);
    assert!(pos.in_check());
    assert_eq!(pos.checks_remaining()[Color::White.index()], 2);
    assert_eq!(pos.checks_remaining()[Color::Black.index()], 3);
}

#[test]
fn reversi_drops_flip_enclosed_stones() {
    let mut pos = Position::new(variant("flipello").unwrap()).unwrap();
    let white_before = pos.board().count_all(Color::White);
    let m = pos.legal_moves()[0];
    pos.do_move(m);
    assert_eq!(pos.board().count_all(Color::White), white_before + 2);
}

#[test]
fn duck_moves_place_the_wall() {
    let mut pos = Position::new(variant("duck").unwrap()).unwrap();
    play(&mut pos, &["e2e4,e4e5"]);
    assert!(pos.board().walls().contains(sq("e5")));
    assert_eq!(pos.board().walls().count(), 1);
    play(&mut pos, &["d7d6,e5d4"]);
    assert!(pos.board().walls().contains(sq("d4")));
    assert_eq!(pos.board().walls().count(), 1);
}

#[test]
fn makruk_counting_starts_when_material_runs_out() {
    let var = variant("makruk").unwrap();
    let mut pos = Position::from_fen(var, "8/8/8/4k3/8/8/8/R3K3 w - - 0 1").unwrap();
    assert_eq!(pos.counting_limit_plies(), 0);
    play(&mut pos, &["a1a2"]);
    assert_eq!(pos.counting_limit_plies(), 32);
    assert_eq!(pos.counting_ply(), 6);
    play(&mut pos, &["e5d5"]);
    assert_eq!(pos.counting_ply(), 7);
}

#[test]
fn counting_limit_follows_the_side_to_move() {
    let makruk = variant("makruk").unwrap();
    let bare_to_move = Position::from_fen(makruk.clone(), "8/8/4k3/8/8/2P5/3K4/R7 b - - 0 1").unwrap();
    assert_eq!(bare_to_move.counting_limit(), 32);
    let armed_to_move = Position::from_fen(makruk.clone(), "8/8/4k3/8/8/2P5/3K4/R7 w - - 0 1").unwrap();
    assert_eq!(armed_to_move.counting_limit(), 0);
    let two_rooks = Position::from_fen(makruk.clone(), "8/8/4k3/8/8/8/3K4/RR6 b - - 0 1").unwrap();
    assert_eq!(two_rooks.counting_limit(), 16);
    let khon = Position::from_fen(makruk.clone(), "8/8/4k3/8/8/8/3K4/2S5 b - - 0 1").unwrap();
    assert_eq!(khon.counting_limit(), 88);
    let pawnless = Position::from_fen(makruk, "8/8/4k3/8/8/8/3KM3/2S5 w - - 0 1").unwrap();
    assert_eq!(pawnless.counting_limit(), 128);

    let asean = variant("asean").unwrap();
    let khon_alone = Position::from_fen(asean.clone(), "8/8/4k3/8/8/8/3K4/2B5 b - - 0 1").unwrap();
    assert_eq!(khon_alone.counting_limit(), 0);
    let khon_and_met = Position::from_fen(asean.clone(), "8/8/4k3/8/8/8/3KQ3/2B5 b - - 0 1").unwrap();
    assert_eq!(khon_and_met.counting_limit(), 88);
    let rook = Position::from_fen(asean, "8/8/4k3/8/8/8/3K4/R7 b - - 0 1").unwrap();
    assert_eq!(rook.counting_limit(), 32);
}

#[test]
fn repetition_cycle_restores_the_key() {
    let mut pos = Position::new(variant("chess").unwrap()).unwrap();
    let key = pos.key();
    let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    play(&mut pos, &cycle);
    assert_eq!(pos.key(), key);
    assert_eq!(pos.state().repetition, 4);
    for _ in cycle {
        let m = pos.last_move().unwrap();
        pos.undo_move(m).unwrap();
        assert_eq!(pos.key(), pos.compute_key());
    }
    assert_eq!(pos.key(), key);
    assert!(pos.history().is_empty());
}
