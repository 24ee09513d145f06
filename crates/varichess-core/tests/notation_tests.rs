use varichess_core::{move_to_uci, parse_uci, variant, NotationError, Position};

fn position(name: &str, fen: &str) -> Position {
    Position::from_fen(variant(name).unwrap(), fen).unwrap()
}

fn start(name: &str) -> Position {
    Position::new(variant(name).unwrap()).unwrap()
}

fn same_move(pos: &Position, a: &str, b: &str) {
    let first = parse_uci(pos, a).unwrap_or_else(|e| panic!("{a}: {e}"));
    let second = parse_uci(pos, b).unwrap_or_else(|e| panic!("{b}: {e}"));
    assert_eq!(first, second, "{a} vs {b}");
}

#[test]
fn canonical_strings_parse_back_to_the_same_move() {
    for name in ["chess", "crazyhouse", "shogi", "xiangqi", "janggi", "seirawan", "duck"] {
        let pos = start(name);
        for m in pos.legal_moves() {
            let text = move_to_uci(&pos, m);
            assert_eq!(parse_uci(&pos, &text), Ok(m), "{name}: {text}");
        }
    }
}

#[test]
fn promotions_use_a_lowercase_letter_or_a_plus() {
    let pos = position("chess", "8/P7/8/8/8/8/8/k6K w - - 0 1");
    let m = parse_uci(&pos, "a7a8q").unwrap();
    assert_eq!(move_to_uci(&pos, m), "a7a8q");

    let mut shogi = start("shogi");
    for text in ["c3c4", "g7g6"] {
        let m = parse_uci(&shogi, text).unwrap();
        shogi.do_move(m);
    }
    let promote = parse_uci(&shogi, "b2h8+").unwrap();
    assert_eq!(move_to_uci(&shogi, promote), "b2h8+");
    let stay = parse_uci(&shogi, "b2h8").unwrap();
    assert_ne!(promote, stay);
}

#[test]
fn drops_accept_either_marker() {
    let pos = position(
        "crazyhouse",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[N] w KQkq - 0 1",
    );
    same_move(&pos, "N@e4", "N*e4");
    assert_eq!(move_to_uci(&pos, parse_uci(&pos, "N*e4").unwrap()), "N@e4");
}

#[test]
fn castling_accepts_king_to_rook() {
    let pos = position("chess", "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    same_move(&pos, "e1g1", "e1h1");
    same_move(&pos, "e1c1", "e1a1");
    assert_eq!(move_to_uci(&pos, parse_uci(&pos, "e1h1").unwrap()), "e1g1");
}

#[test]
fn passes_accept_the_king_square_twice() {
    let pos = start("janggi");
    same_move(&pos, "@@@@", "e2e2");
    assert!(parse_uci(&pos, "@@@@").unwrap().is_pass());
}

#[test]
fn gating_letter_may_be_uppercase() {
    let pos = start("seirawan");
    same_move(&pos, "g1f3h", "g1f3H");
    same_move(&pos, "b1c3e", "b1c3E");
    assert_ne!(parse_uci(&pos, "g1f3h"), parse_uci(&pos, "g1f3"));
}

#[test]
fn wall_moves_name_the_wall_square() {
    let pos = start("duck");
    let m = parse_uci(&pos, "e2e4,e4e5").unwrap();
    assert_eq!(move_to_uci(&pos, m), "e2e4,e4e5");
    assert!(matches!(parse_uci(&pos, "e2e4"), Err(NotationError::Illegal(_))));
}

#[test]
fn bad_input_is_classified() {
    let pos = start("chess");
    assert_eq!(
        parse_uci(&pos, "e2"),
        Err(NotationError::Malformed("e2".to_string()))
    );
    assert!(matches!(parse_uci(&pos, "e2 e4"), Err(NotationError::Malformed(_))));
    assert!(matches!(parse_uci(&pos, "é2e4"), Err(NotationError::Malformed(_))));
    assert_eq!(
        parse_uci(&pos, "e2e5"),
        Err(NotationError::Illegal("e2e5".to_string()))
    );
}
