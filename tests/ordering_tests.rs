// Move ordering tests, rewritten against the MVV-LVA-only `order_moves`
// (the teacher's killer/history-table ordering has no counterpart here).
use std::str::FromStr;
use corvus::board::{Board, Piece};
use corvus::moves::types::{CAPTURE, EN_PASSANT, KINGSIDE_CASTLE, Move, PROMOTION_CAPTURE, QUIET_MOVE};
use corvus::search::ordering::{mvv_lva_score, order_moves};
use corvus::square::Square;

fn make_move(from: &str, to: &str, flags: u8, promo: Option<Piece>, piece: Piece) -> Move {
    Move {
        from: Square::from_str(from).unwrap(),
        to: Square::from_str(to).unwrap(),
        piece,
        promotion: promo,
        flags,
    }
}

#[test]
fn captures_sort_before_quiet_moves() {
    let b = Board::from_str("q7/P7/8/3p4/4P3/8/7P/R3K2R w KQ - 0 1").unwrap();

    let mv_capture = make_move("e4", "d5", CAPTURE, None, Piece::Pawn);
    let mv_quiet = make_move("h2", "h3", QUIET_MOVE, None, Piece::Pawn);

    let mut moves = vec![mv_quiet, mv_capture];
    order_moves(&mut moves, &b, None, false);

    assert_eq!(moves[0], mv_capture, "capture should sort before a quiet move");
    assert_eq!(moves[1], mv_quiet);
}

#[test]
fn hash_move_sorts_first_when_hoisting_is_enabled() {
    let b = Board::new();
    let mv_quiet = make_move("e2", "e4", QUIET_MOVE, None, Piece::Pawn);
    let mv_capture = make_move("e2", "d3", CAPTURE, None, Piece::Pawn);

    let mut moves = vec![mv_capture, mv_quiet];
    // Normally capture > quiet, but the hash move should override that.
    order_moves(&mut moves, &b, Some(mv_quiet), true);

    assert_eq!(moves[0], mv_quiet, "hash move should always sort first");
}

#[test]
fn hash_move_is_ignored_when_hoisting_is_disabled() {
    let b = Board::new();
    let mv_quiet = make_move("e2", "e4", QUIET_MOVE, None, Piece::Pawn);
    let mv_capture = make_move("e2", "d3", CAPTURE, None, Piece::Pawn);

    let mut moves = vec![mv_quiet, mv_capture];
    order_moves(&mut moves, &b, Some(mv_quiet), false);

    assert_eq!(moves[0], mv_capture, "without hoisting, plain MVV-LVA order applies");
}

#[test]
fn pawn_capturing_queen_outranks_knight_capturing_queen() {
    let b = Board::from_str("r1b1kbnr/ppp1pppp/8/3q4/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1")
        .unwrap();

    let mv_pxq = make_move("e4", "d5", CAPTURE, None, Piece::Pawn);
    let mv_nxq = make_move("f3", "d5", CAPTURE, None, Piece::Knight);

    let mut moves = vec![mv_nxq, mv_pxq];
    order_moves(&mut moves, &b, None, false);

    assert_eq!(
        moves[0], mv_pxq,
        "least valuable attacker should be preferred for the same victim"
    );
    assert_eq!(moves[1], mv_nxq);
}

#[test]
fn queen_victim_outranks_rook_victim() {
    let b = Board::from_str("8/8/8/8/8/1q4r1/P6P/4K3 w - - 0 1").unwrap();

    let mv_pxq = make_move("a2", "b3", CAPTURE, None, Piece::Pawn);
    let mv_pxr = make_move("h2", "g3", CAPTURE, None, Piece::Pawn);

    let mut moves = vec![mv_pxr, mv_pxq];
    order_moves(&mut moves, &b, None, false);

    assert_eq!(moves[0], mv_pxq, "capturing the queen should outrank capturing the rook");
    assert_eq!(moves[1], mv_pxr);
}

#[test]
fn en_passant_scores_as_a_pawn_capture() {
    let b = Board::from_str("rnbq1bnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQ d6 0 1").unwrap();
    let mv_ep = make_move("e5", "d6", EN_PASSANT, None, Piece::Pawn);

    assert!(mvv_lva_score(mv_ep, &b) > 0, "en passant should score as a capture, not a quiet move");
}

#[test]
fn castling_scores_as_a_quiet_move() {
    let b = Board::new();
    let mv_castle = make_move("e1", "g1", KINGSIDE_CASTLE, None, Piece::King);
    assert_eq!(mvv_lva_score(mv_castle, &b), 0);
}

#[test]
fn promotion_capture_scores_as_a_capture_of_the_promoted_target() {
    let b = Board::from_str("q7/P7/8/8/8/8/8/4K2k w - - 0 1").unwrap();
    let mv_promo_queen = make_move("a7", "a8", PROMOTION_CAPTURE, Some(Piece::Queen), Piece::Pawn);
    assert!(mvv_lva_score(mv_promo_queen, &b) > 0);
}

#[test]
fn hash_move_overrides_promotions_too() {
    let b = Board::new();
    let mv_hash = make_move("e2", "e3", QUIET_MOVE, None, Piece::Pawn);
    let mv_promo = make_move("a7", "a8", PROMOTION_CAPTURE, Some(Piece::Queen), Piece::Pawn);

    let mut moves = vec![mv_promo, mv_hash];
    order_moves(&mut moves, &b, Some(mv_hash), true);

    assert_eq!(moves[0], mv_hash, "hash move must override even a queen promotion");
}
