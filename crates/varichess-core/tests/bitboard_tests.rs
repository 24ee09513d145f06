use varichess_core::{
    adjacent_squares, aligned, attackers_to, attacks_bb, between_bb, distance, line_bb, moves_bb,
    variant, Bitboard, Board, Color, Piece, PieceType, Square,
};

fn sq(name: &str) -> Square {
    Square::parse(name).expect("valid square")
}

fn keys(board: &Board) -> (u64, u64, u64, u64) {
    (board.psq_key(), board.pawn_key(), board.material_key(), board.hand_key())
}

#[test]
fn board_keys_stay_in_sync_with_edits() {
    let mut board = Board::new();
    assert_eq!(keys(&board), board.compute_keys());

    board.put_piece(Piece::new(Color::White, PieceType::KING), sq("e1"));
    board.put_piece(Piece::new(Color::Black, PieceType::KING), sq("e8"));
    board.put_piece(Piece::new(Color::White, PieceType::PAWN), sq("d2"));
    board.put_wall(sq("d5"));
    board.add_to_hand(Color::Black, PieceType::KNIGHT);
    board.add_to_hand(Color::Black, PieceType::KNIGHT);
    assert_eq!(keys(&board), board.compute_keys());

    board.move_piece(sq("d2"), sq("d4"));
    board.remove_wall(sq("d5"));
    board.remove_from_hand(Color::Black, PieceType::KNIGHT);
    assert_eq!(keys(&board), board.compute_keys());

    assert_eq!(board.count(Color::White, PieceType::PAWN), 1);
    assert_eq!(board.count_all(Color::White), 2);
    assert_eq!(board.in_hand(Color::Black, PieceType::KNIGHT), 1);
    assert_eq!(board.king_square(Color::Black), Some(sq("e8")));
    assert!(board.walls().is_empty());
}

#[test]
fn moving_a_promoted_piece_keeps_its_origin() {
    let mut board = Board::new();
    board.put_piece(Piece::new(Color::White, PieceType::QUEEN), sq("a8"));
    board.set_promoted(sq("a8"), Piece::new(Color::White, PieceType::PAWN));
    board.move_piece(sq("a8"), sq("a1"));
    assert!(board.is_promoted(sq("a1")));
    assert!(!board.is_promoted(sq("a8")));
    assert_eq!(board.unpromoted_on(sq("a1")), Piece::new(Color::White, PieceType::PAWN));
    board.remove_piece(sq("a1"));
    assert!(board.promoted().is_empty());
}

#[test]
fn line_helpers_cover_sliding_and_knight_lines() {
    assert_eq!(between_bb(sq("a1"), sq("d4")).count(), 2);
    assert!(between_bb(sq("a1"), sq("b3")).is_empty());
    assert!(line_bb(sq("a1"), sq("h8")).contains(sq("e5")));
    assert!(aligned(sq("a1"), sq("c3"), sq("h8")));
    assert!(!aligned(sq("a1"), sq("c3"), sq("h7")));
    assert_eq!(distance(sq("a1"), sq("h3")), 7);
    assert_eq!(adjacent_squares(sq("a1")).count(), 3);
    assert_eq!(Bitboard::board(7, 7).count(), 64);
}

#[test]
fn leapers_and_sliders_respect_the_board_edge() {
    let chess = variant("chess").unwrap();
    let board = Board::new();
    let empty = board.occupied();
    let knight = attacks_bb(&chess, &board, Color::White, PieceType::KNIGHT, sq("a1"), empty);
    assert_eq!(knight.count(), 2);
    let rook = attacks_bb(&chess, &board, Color::White, PieceType::ROOK, sq("h8"), empty);
    assert_eq!(rook.count(), 14);
    assert!(!rook.contains(sq("i8")));
}

#[test]
fn pawns_move_and_capture_differently() {
    let chess = variant("chess").unwrap();
    let board = Board::new();
    let empty = board.occupied();
    let quiet = moves_bb(&chess, &board, Color::White, PieceType::PAWN, sq("e4"), empty);
    let capture = attacks_bb(&chess, &board, Color::White, PieceType::PAWN, sq("e4"), empty);
    assert_eq!(quiet, Bitboard::square(sq("e5")));
    assert_eq!(capture, Bitboard::square(sq("d5")) | Bitboard::square(sq("f5")));
    let black = attacks_bb(&chess, &board, Color::Black, PieceType::PAWN, sq("e4"), empty);
    assert!(black.contains(sq("d3")));
}

#[test]
fn xiangqi_horse_is_blocked_at_the_leg() {
    let xiangqi = variant("xiangqi").unwrap();
    let mut board = Board::new();
    board.put_piece(Piece::new(Color::White, PieceType::HORSE), sq("b1"));
    board.put_piece(Piece::new(Color::White, PieceType::SOLDIER), sq("b2"));
    let horse = attacks_bb(&xiangqi, &board, Color::White, PieceType::HORSE, sq("b1"), board.occupied());
    assert_eq!(horse, Bitboard::square(sq("d2")));
}

#[test]
fn cannons_capture_over_a_screen() {
    let xiangqi = variant("xiangqi").unwrap();
    let mut board = Board::new();
    board.put_piece(Piece::new(Color::White, PieceType::CANNON), sq("b3"));
    board.put_piece(Piece::new(Color::White, PieceType::SOLDIER), sq("b5"));
    board.put_piece(Piece::new(Color::Black, PieceType::ROOK), sq("b8"));
    let occupied = board.occupied();
    let captures = attacks_bb(&xiangqi, &board, Color::White, PieceType::CANNON, sq("b3"), occupied);
    assert!(captures.contains(sq("b8")));
    assert!(!captures.contains(sq("b5")));
    let quiet = moves_bb(&xiangqi, &board, Color::White, PieceType::CANNON, sq("b3"), occupied);
    assert!(quiet.contains(sq("b4")));
    assert!(!quiet.contains(sq("b6")));

    let attackers = attackers_to(&xiangqi, &board, sq("b8"), occupied, Color::White);
    assert_eq!(attackers, Bitboard::square(sq("b3")));
}
