pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod constants;
pub mod fen;
pub mod game;
pub mod magic;
pub mod movegen;
pub mod notation;
pub mod parser;
pub mod perft;
pub mod piece;
pub mod position;
pub mod types;
pub mod variant;
pub mod variants;
pub mod zobrist;

pub use attacks::{attackers_to, attacks_bb, moves_bb, PieceTables};
pub use bitboard::{adjacent_squares, aligned, between_bb, distance, line_bb, Bitboard, Direction};
pub use board::Board;
pub use constants::{
    COLOR_NB, FILE_NB, MAX_MOVES, PASS_NOTATION, PIECE_TYPE_NB, RANK_NB, SQUARE_NB, STARTING_FEN,
};
pub use fen::{format_fen, parse_fen, validate_fen, FenError, FenSetup, FenValidation};
pub use game::Game;
pub use movegen::{count_legal, generate, GenType};
pub use notation::{move_to_uci, parse_uci, NotationError};
pub use parser::{parse_config, ParsedConfig};
pub use perft::{divide, perft};
pub use piece::{canonical_betza, piece_info, PieceError, PieceInfo};
pub use position::{HistoryEntry, Position, PositionError, StateInfo};
pub use types::{
    castling_right, ChasingRule, Color, CountingRule, EnclosingRule, MaterialCounting, Move,
    MoveList, MoveType, Piece, PieceSet, PieceType, Square, Value, WallingRule,
};
pub use variant::{ConfigError, Variant};
pub use variants::{builtin_variants, variant, VariantMap};
