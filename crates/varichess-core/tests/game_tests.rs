use varichess_core::{variant, Game, NotationError, Position, Value};

fn game(name: &str, fen: &str) -> Game {
    Game::from_fen(variant(name).unwrap(), fen).unwrap()
}

fn play(game: &mut Game, moves: &[&str]) {
    for text in moves {
        game.push_uci(text).unwrap_or_else(|e| panic!("{text}: {e}"));
    }
}

#[test]
fn fools_mate_is_checkmate() {
    let mut game = Game::new(variant("chess").unwrap()).unwrap();
    play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert!(game.in_check());
    assert!(game.is_checkmate());
    assert!(game.moves().is_empty());
    assert_eq!(game.result(), Some(-Value::MATE));
}

#[test]
fn stalemate_is_a_draw_in_chess() {
    let game = game("chess", "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(game.is_stalemate());
    assert!(game.is_draw());
}

#[test]
fn king_of_the_hill_ends_when_the_center_is_reached() {
    let game = game("kingofthehill", "4k3/8/8/8/3K4/8/8/8 b - - 0 1");
    assert_eq!(game.result(), Some(-Value::MATE));
    assert!(game.moves().is_empty());
}

#[test]
fn racing_kings_gives_black_a_reply() {
    let reply_pending = game("racingkings", "6K1/8/8/8/8/8/8/k7 b - - 0 1");
    assert_eq!(reply_pending.position().is_immediate_game_end(0), None);

    let decided = game("racingkings", "6K1/8/8/8/8/8/8/k7 w - - 0 1");
    assert_eq!(decided.result(), Some(Value::MATE));

    let both = game("racingkings", "k5K1/8/8/8/8/8/8/8 w - - 0 1");
    assert_eq!(both.result(), Some(Value::DRAW));
}

#[test]
fn third_check_wins() {
    let game = game(
        "3check",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 3+0 0 1",
    );
    assert_eq!(game.result(), Some(-Value::MATE));
}

#[test]
fn extinction_decides_antichess_and_horde() {
    let antichess = game("antichess", "8/8/8/8/8/8/8/k7 w - - 0 1");
    assert_eq!(antichess.result(), Some(Value::MATE));

    let horde = game("horde", "4k3/8/8/8/8/8/8/8 w - - 0 1");
    assert_eq!(horde.result(), Some(-Value::MATE));
}

#[test]
fn bare_king_wins_in_losers() {
    let game = game("losers", "4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
    assert_eq!(game.result(), Some(Value::MATE));
}

#[test]
fn connecting_stones_wins() {
    let connect4 = game("connect4", "7/7/7/7/7/PPPP3 b 0 1");
    assert_eq!(connect4.result(), Some(-Value::MATE));

    let tictactoe = game("tictactoe", "P2/1P1/2P b 0 1");
    assert_eq!(tictactoe.result(), Some(-Value::MATE));

    let open = game("tictactoe", "P2/1p1/2P[PPppp] b 0 1");
    assert_eq!(open.result(), None);
}

#[test]
fn full_reversi_board_is_counted() {
    let game = game(
        "flipello",
        "pppppppp/pppppppp/pppPpppp/pPpPpppp/pppppppp/pPpPPPPP/ppPpPPpp/pppppppp[PPpp] b - - 63 32",
    );
    assert_eq!(game.result(), Some(Value::MATE));
}

#[test]
fn threefold_repetition_is_a_draw() {
    let mut game = Game::new(variant("chess").unwrap()).unwrap();
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(game.result(), None);
    play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert!(game.is_draw());
    assert!(!game.moves().is_empty());
}

#[test]
fn fifty_move_rule_is_claimable() {
    let game = game("chess", "4k3/8/8/8/8/8/8/R3K3 w - - 100 80");
    assert_eq!(game.position().is_optional_game_end(0), Some(Value::DRAW));
    assert_eq!(game.position().is_immediate_game_end(0), None);
}

#[test]
fn janggi_double_pass_counts_material() {
    let mut game = Game::new(variant("janggi").unwrap()).unwrap();
    play(&mut game, &["@@@@", "@@@@"]);
    // Equal material, black's komi decides.
    assert_eq!(game.result(), Some(-Value::MATE));
}

#[test]
fn push_and_undo_walk_the_history() {
    let mut game = Game::new(variant("crazyhouse").unwrap()).unwrap();
    let start = game.fen();
    play(&mut game, &["e2e4", "d7d5", "e4d5"]);
    assert_eq!(game.history().len(), 3);
    assert_eq!(game.move_number(), 2);
    assert_eq!(game.board().hand_total(varichess_core::Color::White), 1);

    for _ in 0..3 {
        game.undo().unwrap();
    }
    assert_eq!(game.fen(), start);
    assert!(game.undo().is_err());
}

#[test]
fn push_uci_reports_bad_input() {
    let mut game = Game::new(variant("chess").unwrap()).unwrap();
    assert!(matches!(game.push_uci("e2"), Err(NotationError::Malformed(_))));
    assert!(matches!(game.push_uci("e2e5"), Err(NotationError::Illegal(_))));
    assert!(game.history().is_empty());
}

#[test]
fn load_replaces_the_position() {
    let mut game = Game::new(variant("chess").unwrap()).unwrap();
    play(&mut game, &["e2e4"]);
    let fen = "4k3/8/8/8/8/8/8/4K3 w - - 0 1";
    game.load(fen).unwrap();
    assert_eq!(game.fen(), fen);
    assert!(game.history().is_empty());
    assert!(game.load("garbage").is_err());
    assert_eq!(
        game.position().fen(),
        Position::from_fen(variant("chess").unwrap(), fen).unwrap().fen()
    );
}

#[test]
fn third_check_ends_the_game_at_once() {
    let mut game = game(
        "3check",
        "rnbqkbnr/ppp2ppp/8/3pp3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 3 +2+2",
    );
    assert_eq!(game.result(), None);
    play(&mut game, &["f1b5"]);
    assert!(game.in_check());
    assert_eq!(game.result(), Some(-Value::MATE));
    assert!(game.moves().is_empty());
}

#[test]
fn counting_draw_arrives_when_the_count_reaches_the_limit() {
    let short = game("makruk", "8/8/4k3/8/8/8/3K4/R7 w - 32 31 40");
    assert_eq!(short.position().is_optional_game_end(0), None);

    let reached = game("makruk", "8/8/4k3/8/8/8/3K4/R7 w - 32 32 40");
    assert_eq!(reached.position().is_optional_game_end(0), Some(Value::DRAW));

    let mut game = short;
    play(&mut game, &["a1a2"]);
    assert_eq!(game.position().counting_ply(), 32);
    assert_eq!(game.result(), Some(Value::DRAW));
    assert!(game.is_draw());
}

#[test]
fn counting_starts_by_rule_once_a_side_is_bare() {
    let mut asean = game("asean", "8/8/8/4k3/8/8/8/R3K3 w - - 0 1");
    play(&mut asean, &["a1a2"]);
    assert_eq!(asean.position().counting_limit_plies(), 32);
    assert_eq!(asean.position().counting_ply(), 6);

    let mut cambodian = game("cambodian", "8/8/8/4k3/8/8/8/R3K3 w - - 0 1");
    play(&mut cambodian, &["a1a2"]);
    assert_eq!(cambodian.position().counting_limit_plies(), 32);
    assert_eq!(cambodian.position().counting_ply(), 8);

    let mut khon_alone = game("asean", "8/8/8/4k3/8/8/8/2B1K3 w - - 0 1");
    play(&mut khon_alone, &["c1c2"]);
    assert_eq!(khon_alone.position().counting_limit_plies(), 0);
    assert_eq!(khon_alone.position().counting_ply(), 0);
}

#[test]
fn decided_games_report_the_mate_distance() {
    let hill = game("kingofthehill", "4k3/8/8/8/3K4/8/8/8 b - - 0 1");
    assert_eq!(hill.position().is_immediate_game_end(7), Some(Value::mated_in(7)));

    let horde = game("horde", "4k3/8/8/8/8/8/8/8 w - - 0 1");
    assert_eq!(horde.position().is_immediate_game_end(5), Some(Value::mated_in(5)));

    let antichess = game("antichess", "8/8/8/8/8/8/8/k7 w - - 0 1");
    assert_eq!(antichess.position().is_immediate_game_end(4), Some(Value::mate_in(4)));

    let drawn = game("chess", "4k3/8/8/8/8/8/8/R3K3 w - - 100 80");
    assert_eq!(drawn.position().is_optional_game_end(9), Some(Value::DRAW));
}
