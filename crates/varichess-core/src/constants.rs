pub const FILE_NB: usize = 12;
pub const RANK_NB: usize = 10;
pub const SQUARE_NB: usize = FILE_NB * RANK_NB;

pub const COLOR_NB: usize = 2;
pub const PIECE_TYPE_NB: usize = 64;
pub const PIECE_NB: usize = 2 * PIECE_TYPE_NB;
pub const CUSTOM_PIECES_NB: usize = 20;

pub const MAX_MOVES: usize = 8192;
pub const MAX_PLY: i32 = 246;
pub const MAX_HAND: usize = 64;
pub const MAX_CHECKS: usize = 11;

pub const CASTLING_RIGHT_NB: usize = 16;

pub const FILE_CHARS: [char; FILE_NB] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l'];

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub const PASS_NOTATION: &str = "@@@@";
pub const DROP_MARKER: char = '@';
pub const PROMOTED_MARKER: char = '+';
pub const DEMOTED_MARKER: char = '-';
pub const WALL_CHAR: char = '*';
