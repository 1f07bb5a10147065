use crate::board::Board;
use crate::moves::types::Move;

/// Score used to hoist the hash move to the very front of the list, ahead of
/// any real MVV-LVA score.
const HASH_MOVE_SCORE: i32 = i32::MAX;

/// Most valuable victim, least valuable attacker. Quiet moves score 0 and
/// sort after every capture.
pub fn mvv_lva_score(mv: Move, board: &Board) -> i32 {
    if !mv.is_capture() {
        return 0;
    }

    match board.piece_at(mv.to) {
        Some((_, captured)) => captured.value() * 10 - mv.piece.attacker_value(),
        // En passant: the captured pawn isn't on `mv.to`.
        None => crate::board::Piece::Pawn.value() * 10 - mv.piece.attacker_value(),
    }
}

/// Orders `moves` in place: hash move first (when `hoist_hash_move` is set),
/// then by MVV-LVA. A stable sort keeps generator order as the tiebreak.
pub fn order_moves(
    moves: &mut [Move],
    board: &Board,
    hash_move: Option<Move>,
    hoist_hash_move: bool,
) {
    moves.sort_by_key(|&mv| {
        if hoist_hash_move && Some(mv) == hash_move {
            std::cmp::Reverse(HASH_MOVE_SCORE)
        } else {
            std::cmp::Reverse(mvv_lva_score(mv, board))
        }
    });
}
