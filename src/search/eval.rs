use crate::board::{Board, Color, Piece};
use crate::moves::magic::MagicTables;
use crate::moves::square_control::get_all_attacked_squares;

/// Small negative bias applied to draws so the engine doesn't steer into
/// them when an alternative of equal material value exists.
pub const CONTEMPT: i32 = -10;

const MATERIAL_PIECES: [Piece; 5] = [
    Piece::Pawn,
    Piece::Knight,
    Piece::Bishop,
    Piece::Rook,
    Piece::Queen,
];

/// Material balance from `color`'s perspective: positive means `color` is ahead.
fn material_balance(board: &Board, color: Color) -> i32 {
    let them = color.opposite();
    MATERIAL_PIECES
        .iter()
        .map(|&piece| {
            let ours = board.pieces(piece, color).count_ones() as i32;
            let theirs = board.pieces(piece, them).count_ones() as i32;
            piece.value() * (ours - theirs)
        })
        .sum()
}

/// Material plus a crude mobility term, from the side-to-move's perspective.
/// Positive means the side to move is winning.
pub fn evaluate(board: &Board, tables: &MagicTables) -> i32 {
    if board.halfmove_clock >= 100 {
        return CONTEMPT;
    }

    let side = board.side_to_move;
    let material = material_balance(board, side);
    let mobility = get_all_attacked_squares(board, side, tables).count_ones() as i32;

    material + mobility
}
