// Diagnostic tests for static eval, capture generation, and score
// perspective, rewritten against `evaluate` and the public `go` entry point
// (the old `static_eval`/`alpha_beta`/`SearchContext` API is gone).
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

use corvus::board::Board;
use corvus::moves::execute::{generate_captures, generate_legal};
use corvus::moves::magic::loader::load_magic_tables;
use corvus::moves::magic::MagicTables;
use corvus::moves::types::Move;
use corvus::search::eval::evaluate;
use corvus::search::search::{GoParams, go};
use corvus::search::tt::TranspositionTable;

fn search_fixed_depth(
    board: &mut Board,
    tables: &MagicTables,
    depth: u32,
    tt: &mut TranspositionTable,
) -> (i32, Option<Move>) {
    let params = GoParams {
        depth: Some(depth),
        ..Default::default()
    };
    let stop = AtomicBool::new(false);
    let outcome = go(board, tables, tt, &params, &stop);
    (outcome.score, outcome.best_move)
}

#[test]
fn deep_diagnostic_simple_capture() {
    let fen = "rnbqkb1r/pppp1ppp/8/4p3/3N4/8/PPPPPPPP/RNBQKB1R b KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();

    let initial_eval = evaluate(&board, &tables);
    println!("Static eval: {}", initial_eval);

    let mut all_moves = Vec::new();
    let mut scratch = Vec::new();
    generate_legal(&mut board, &tables, &mut all_moves, &mut scratch);
    println!("Total legal moves: {}", all_moves.len());

    let mut captures = Vec::new();
    generate_captures(&mut board, &tables, &mut captures, &mut scratch);
    println!("Capture moves: {}", captures.len());

    let mut tt = TranspositionTable::new(64);
    let (score_d2, _) = search_fixed_depth(&mut board, &tables, 2, &mut tt);
    assert!(
        score_d2 > -35 && score_d2 < 50,
        "Score outside expected range: {}",
        score_d2
    );
}

#[test]
fn diagnostic_material_values() {
    let test_cases = vec![
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            0,
        ),
        (
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 1",
            100,
        ),
        (
            "r1bqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            300,
        ),
        (
            "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            900,
        ),
    ];

    for (fen, expected_diff) in test_cases {
        let board = Board::from_str(fen).unwrap();
        let tables = load_magic_tables();
        let eval = evaluate(&board, &tables);

        let diff = (eval - expected_diff).abs();
        assert!(
            diff <= 200,
            "Eval {} too far from expected {} for FEN: {}",
            eval,
            expected_diff,
            fen
        );
    }
}

#[test]
fn diagnostic_check_knight_position() {
    let fen = "rnbqkb1r/pppppppp/8/4p3/3N4/8/PPPPPPPP/RNBQKB1R b KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut captures = Vec::new();
    let mut scratch = Vec::new();
    generate_captures(&mut board, &tables, &mut captures, &mut scratch);
    assert!(!captures.is_empty(), "Should find captures (exd4)");
}

#[test]
fn diagnostic_score_perspective() {
    let fen_white = "r1bqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let mut board_white = Board::from_str(fen_white).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score_white, _) = search_fixed_depth(&mut board_white, &tables, 2, &mut tt);

    let fen_black = "r1bqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1";
    let mut board_black = Board::from_str(fen_black).unwrap();
    let (score_black, _) = search_fixed_depth(&mut board_black, &tables, 2, &mut tt);

    assert!(score_white > 0, "White to move: White should be winning");
    assert!(
        score_black < 0,
        "Black to move: Black should be losing (negamax)"
    );
}

#[test]
fn diagnostic_starting_position() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score, _) = search_fixed_depth(&mut board, &tables, 1, &mut tt);
    assert!(score.abs() < 100);
}

#[test]
fn diagnostic_white_up_queen() {
    let fen = "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score, _) = search_fixed_depth(&mut board, &tables, 1, &mut tt);
    assert!(score > 700);
}

#[test]
fn diagnostic_black_up_queen() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score, _) = search_fixed_depth(&mut board, &tables, 1, &mut tt);
    assert!(score < -700);
}

#[test]
fn diagnostic_simple_capture() {
    let fen = "rnbqkb1r/pppp1ppp/8/4p3/3N4/8/PPPPPPPP/RNBQKB1R b KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score, _) = search_fixed_depth(&mut board, &tables, 2, &mut tt);

    assert!(
        score > -35 && score < 50,
        "After exd4 with no recapture, position should be roughly equal, got {}",
        score
    );
}

#[test]
fn diagnostic_compare_depths() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);

    let (score_d3, _) = search_fixed_depth(&mut board, &tables, 3, &mut tt);
    let (score_d4, _) = search_fixed_depth(&mut board, &tables, 4, &mut tt);

    assert!((score_d3 - score_d4).abs() < 200);
}

#[test]
fn diagnostic_stand_pat() {
    let fen = "rnbqkb1r/pppppppp/5n2/8/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score, _) = search_fixed_depth(&mut board, &tables, 1, &mut tt);
    assert!(score.abs() < 100);
}

#[test]
fn diagnostic_sign_error() {
    let fen = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score_white, _) = search_fixed_depth(&mut board, &tables, 3, &mut tt);

    let fen_black = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 0 1";
    let mut board_black = Board::from_str(fen_black).unwrap();
    let (score_black, _) = search_fixed_depth(&mut board_black, &tables, 3, &mut tt);

    if score_white > 100 {
        assert!(score_black < -50, "Sign error detected");
    }
}

#[test]
fn diagnostic_quiescence_depth() {
    let fen = "r1bqkb1r/pppp1ppp/2n2n2/4p3/4P3/3P1N2/PPP2PPP/RNBQKB1R w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);

    use std::time::Instant;
    let start = Instant::now();
    let (_, _) = search_fixed_depth(&mut board, &tables, 4, &mut tt);
    let elapsed = start.elapsed();

    assert!(elapsed.as_secs() < 30);
}

#[test]
fn diagnostic_alpha_beta_bounds() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (score, _) = search_fixed_depth(&mut board, &tables, 3, &mut tt);
    assert!(score > -10000 && score < 10000);
}

#[test]
fn diagnostic_capture_generation() {
    let fen = "rnbqkb1r/pppp1ppp/5n2/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut captures = Vec::new();
    let mut scratch = Vec::new();
    generate_captures(&mut board, &tables, &mut captures, &mut scratch);
    assert!(!captures.is_empty());
}

#[test]
fn diagnostic_static_eval() {
    let positions = vec![
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            0,
            50,
        ),
        (
            "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            700,
            1100,
        ),
        (
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq - 0 1",
            -1100,
            -700,
        ),
    ];

    for (fen, min, max) in positions {
        let board = Board::from_str(fen).unwrap();
        let tables = load_magic_tables();
        let score = evaluate(&board, &tables);
        assert!(score >= min && score <= max);
    }
}

#[test]
fn what_does_white_do_after_exd4() {
    let fen = "rnbqkb1r/pppp1ppp/8/8/3p4/8/PPPPPPPP/RNBQKB1R w KQkq - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();
    let mut tt = TranspositionTable::new(64);
    let (_, best_move) = search_fixed_depth(&mut board, &tables, 2, &mut tt);
    assert!(best_move.is_some());
}

#[test]
fn diagnostic_quiescence_includes_promotions() {
    // White pawn on a7, about to promote. No capture involved.
    let fen = "8/P7/8/8/8/8/k6K/8 w - - 0 1";
    let mut board = Board::from_str(fen).unwrap();
    let tables = load_magic_tables();

    let mut captures = Vec::new();
    let mut scratch = Vec::new();
    generate_captures(&mut board, &tables, &mut captures, &mut scratch);

    let has_promo = captures.iter().any(|m| m.is_promotion());
    assert!(
        has_promo,
        "Quiescence search MUST generate promotions, even if they aren't captures!"
    );
}
