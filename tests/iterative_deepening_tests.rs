// Iterative deepening test suite, rewritten against the public `go` entry
// point (the old direct `alpha_beta`/`SearchContext` access is gone; `go`
// always runs iterative deepening internally now).

use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use corvus::board::Board;
use corvus::moves::magic::loader::load_magic_tables;
use corvus::search::search::{GoParams, go};
use corvus::search::tt::TranspositionTable;

fn search_to_depth(board: &mut Board, depth: u32) -> (i32, Option<corvus::moves::types::Move>) {
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(512);
    let params = GoParams {
        depth: Some(depth),
        ..Default::default()
    };
    let stop = AtomicBool::new(false);
    let outcome = go(board, &tables, &mut tt, &params, &stop);
    (outcome.score, outcome.best_move)
}

#[test]
fn test_id_returns_move() {
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();

    let (score, best_move) = search_to_depth(&mut board, 3);

    assert!(
        best_move.is_some(),
        "Iterative deepening should return a move"
    );
    assert!(
        score.abs() < 500,
        "Starting position should have reasonable score, got {}",
        score
    );
}

#[test]
fn test_id_multiple_depths() {
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();

    for depth in 1..=5 {
        let (score, best_move) = search_to_depth(&mut board, depth);

        assert!(best_move.is_some(), "Should find move at depth {}", depth);
        assert!(
            score.abs() < 1000,
            "Score at depth {} should be reasonable, got {}",
            depth,
            score
        );
    }
}

#[test]
fn test_id_finds_capture() {
    // White can capture a free queen.
    let mut board =
        Board::from_str("rnb1kbnr/pppppppp/8/8/8/3q4/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();

    let (score, best_move) = search_to_depth(&mut board, 3);

    assert!(best_move.is_some(), "Should find a move");
    assert!(
        score > 700,
        "Should recognize free queen capture, got score {}",
        score
    );
}

#[test]
fn test_id_finds_mate_in_1() {
    // Simple back rank mate: White plays Qd8#.
    let mut board = Board::from_str("6k1/5ppp/8/8/8/8/5PPP/3Q2K1 w - - 0 1").unwrap();

    let (score, best_move) = search_to_depth(&mut board, 2);

    assert!(best_move.is_some(), "Should find mate move");
    println!("Mate position score: {}", score);
    assert!(
        score > 500,
        "Should find mate, got score {}",
        score
    );
}

#[test]
fn test_id_performance() {
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();

    let start = Instant::now();
    let _ = search_to_depth(&mut board, 5);
    let elapsed = start.elapsed();

    assert!(
        elapsed.as_secs() < 30,
        "Depth-5 search from startpos should complete quickly, took {:?}",
        elapsed
    );
}

#[test]
fn test_id_limited_moves() {
    // Endgame with few legal moves.
    let mut board = Board::from_str("8/8/8/8/8/3k4/8/3K4 w - - 0 1").unwrap();

    let (score, best_move) = search_to_depth(&mut board, 4);

    assert!(
        best_move.is_some(),
        "Should find move even with limited options"
    );
    assert!(
        score.abs() < 200,
        "King vs king should be roughly equal, got {}",
        score
    );
}

#[test]
fn test_id_deterministic() {
    let mut board1 =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();
    let mut board2 = board1.clone();

    let (score1, move1) = search_to_depth(&mut board1, 4);
    let (score2, move2) = search_to_depth(&mut board2, 4);

    assert_eq!(score1, score2, "Should get same score on repeated searches");
    assert_eq!(move1, move2, "Should get same move on repeated searches");
}

#[test]
fn test_id_depth_1() {
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").unwrap();

    let (score, best_move) = search_to_depth(&mut board, 1);

    assert!(best_move.is_some(), "Should work at depth 1");
    assert!(
        score.abs() < 200,
        "Shallow search should give reasonable score, got {}",
        score
    );
}

#[test]
fn test_id_complex_position() {
    let mut board =
        Board::from_str("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQK2R w KQkq - 0 1")
            .unwrap();

    let (score, best_move) = search_to_depth(&mut board, 4);

    assert!(best_move.is_some(), "Should handle complex positions");
    assert!(
        score.abs() < 500,
        "Complex equal position should have reasonable score, got {}",
        score
    );
}

#[test]
fn test_id_score_stability() {
    // Position where White is clearly better.
    let mut board =
        Board::from_str("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();

    let (score_d2, _) = search_to_depth(&mut board, 2);
    let (score_d4, _) = search_to_depth(&mut board, 4);

    println!("Score at depth 2: {}", score_d2);
    println!("Score at depth 4: {}", score_d4);

    assert!(
        (score_d2 - score_d4).abs() < 200,
        "Scores shouldn't vary wildly between depths: d2={}, d4={}",
        score_d2,
        score_d4
    );
}
