use crate::board::{Board, Color};
use crate::config::{self, FeatureToggles};
use crate::moves::execute::{
    generate_legal, make_move_basic, make_null_move, undo_move_basic, undo_null_move,
};
use crate::moves::magic::MagicTables;
use crate::moves::movegen::{generate_pseudo_legal, generate_pseudo_legal_captures};
use crate::moves::square_control::{in_check, is_legal_castling};
use crate::moves::types::Move;
use crate::search::eval::{CONTEMPT, evaluate};
use crate::search::ordering::order_moves;
use crate::search::tt::{MATE_THRESHOLD, NodeType, TranspositionTable};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

pub const INF: i32 = 32000;
pub const MATE_SCORE: i32 = 31000;

/// Parameters of a `go` call, mirroring the UCI command's fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: u64,
    pub binc: u64,
    pub movestogo: Option<u64>,
    pub infinite: bool,
}

const DEFAULT_MAX_DEPTH: u32 = 64;

fn compute_budget(params: &GoParams, side: Color) -> Option<Duration> {
    if params.infinite {
        return None;
    }
    if let Some(mt) = params.movetime.filter(|&mt| mt > 0) {
        return Some(Duration::from_millis((mt as f64 * 0.95) as u64));
    }

    let (our_time, their_time, our_inc) = match side {
        Color::White => (params.wtime, params.btime, params.winc),
        Color::Black => (params.btime, params.wtime, params.binc),
    };

    let our = our_time.filter(|&t| t > 0)? as f64;
    let their = their_time.unwrap_or(0).max(1) as f64;

    let movestogo = match params.movestogo {
        Some(n) if n > 0 => n as f64,
        _ => 20.0 * (their / our).clamp(1.0, 2.0),
    };

    let budget_ms = 0.95 * our / movestogo + our_inc as f64;
    Some(Duration::from_millis(budget_ms.max(1.0) as u64))
}

struct TimeBudget {
    start: Instant,
    limit: Option<Duration>,
}

impl TimeBudget {
    fn new(limit: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            limit,
        }
    }

    fn has_more_time(&self, stop: &AtomicBool) -> bool {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        match self.limit {
            None => true,
            Some(limit) => self.start.elapsed() < limit,
        }
    }

    fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

/// Mutable, per-search bookkeeping threaded through every recursive call.
struct SearchState<'a> {
    tables: &'a MagicTables,
    toggles: &'a FeatureToggles,
    budget: &'a TimeBudget,
    stop: &'a AtomicBool,
    nodes: u64,
    seldepth: u32,
    timed_out: bool,
}

impl<'a> SearchState<'a> {
    fn poll_time(&mut self) -> bool {
        if self.timed_out {
            return true;
        }
        if self.nodes & 2047 == 0 && !self.budget.has_more_time(self.stop) {
            self.timed_out = true;
        }
        self.timed_out
    }

    fn track_ply(&mut self, ply: u32) {
        if ply > self.seldepth {
            self.seldepth = ply;
        }
    }
}

fn quiesce(board: &mut Board, tt_ply: u32, mut alpha: i32, beta: i32, state: &mut SearchState) -> i32 {
    state.nodes += 1;
    state.track_ply(tt_ply);
    if state.poll_time() {
        return 0;
    }

    let stand_pat = evaluate(board, state.tables);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut moves = Vec::with_capacity(16);
    generate_pseudo_legal_captures(board, state.tables, &mut moves);
    order_moves(&mut moves, board, None, false);

    for mv in moves {
        let mover = board.side_to_move;
        let undo = make_move_basic(board, mv);
        let illegal = in_check(board, mover, state.tables);
        if illegal {
            undo_move_basic(board, undo);
            continue;
        }

        let score = -quiesce(board, tt_ply + 1, -beta, -alpha, state);
        undo_move_basic(board, undo);

        if state.timed_out {
            return 0;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

#[allow(clippy::too_many_arguments)]
fn negamax(
    board: &mut Board,
    tt: &mut TranspositionTable,
    mut alpha: i32,
    mut beta: i32,
    depth_remaining: i32,
    ply: u32,
    previous_was_null: bool,
    state: &mut SearchState,
) -> i32 {
    state.nodes += 1;
    state.track_ply(ply);
    if state.poll_time() {
        return 0;
    }

    if depth_remaining <= 0 {
        return quiesce(board, ply, alpha, beta, state);
    }

    if ply > 0 && board.is_repetition() {
        return CONTEMPT;
    }

    let hash = board.zobrist;
    let mut hash_move = None;

    if let Some((tt_move, tt_score, tt_depth, tt_bound)) = tt.probe(hash, ply as i32) {
        hash_move = tt_move;
        if tt_depth as i32 >= depth_remaining {
            match tt_bound {
                NodeType::Exact => return tt_score,
                NodeType::UpperBound => beta = beta.min(tt_score),
                NodeType::LowerBound => alpha = alpha.max(tt_score),
            }
            if alpha >= beta {
                return if tt_bound == NodeType::LowerBound {
                    alpha
                } else {
                    beta
                };
            }
        }
    }

    let in_check_now = in_check(board, board.side_to_move, state.tables);

    if depth_remaining >= 4
        && beta - alpha > 1
        && !previous_was_null
        && !in_check_now
        && !state.toggles.is_enabled(config::SKIP_NULL_MOVE_PRUNING)
    {
        let static_score = evaluate(board, state.tables);
        if static_score >= beta {
            const R: i32 = 2;
            let undo = make_null_move(board);
            let score = -negamax(
                board,
                tt,
                -beta,
                -beta + 1,
                depth_remaining - 1 - R,
                ply + 1,
                true,
                state,
            );
            undo_null_move(board, undo);

            if state.timed_out {
                return 0;
            }
            if score >= beta {
                return beta;
            }
        }
    }

    let mut moves = Vec::with_capacity(64);
    generate_pseudo_legal(board, state.tables, &mut moves);
    order_moves(
        &mut moves,
        board,
        hash_move,
        !state.toggles.is_enabled(config::SKIP_GUESS_MOVE),
    );

    let original_alpha = alpha;
    let mut has_any = false;
    let mut best_move = None;
    let mut full_window = true;

    for mv in moves {
        if mv.is_castling() && !is_legal_castling(board, mv, state.tables) {
            continue;
        }

        let mover = board.side_to_move;
        let undo = make_move_basic(board, mv);
        let illegal = in_check(board, mover, state.tables);
        if illegal {
            undo_move_basic(board, undo);
            continue;
        }
        has_any = true;

        let score = if full_window {
            -negamax(board, tt, -beta, -alpha, depth_remaining - 1, ply + 1, false, state)
        } else {
            let scout = -negamax(
                board,
                tt,
                -alpha - 1,
                -alpha,
                depth_remaining - 1,
                ply + 1,
                false,
                state,
            );
            if scout > alpha && scout < beta {
                -negamax(board, tt, -beta, -alpha, depth_remaining - 1, ply + 1, false, state)
            } else {
                scout
            }
        };
        full_window = false;

        undo_move_basic(board, undo);

        if state.timed_out {
            return 0;
        }

        if score >= beta {
            tt.save(hash, Some(mv), beta, depth_remaining as u8, NodeType::LowerBound as u8, ply as i32);
            return beta;
        }
        if score > alpha {
            alpha = score;
            best_move = Some(mv);
        }
    }

    if !has_any {
        return if in_check_now {
            -MATE_SCORE + ply as i32
        } else {
            CONTEMPT
        };
    }

    let node_type = if alpha > original_alpha {
        NodeType::Exact
    } else {
        NodeType::UpperBound
    };
    tt.save(hash, best_move, alpha, depth_remaining as u8, node_type as u8, ply as i32);

    alpha
}

fn order_root_moves(
    moves: &mut [Move],
    board: &Board,
    hints: &HashMap<Move, i8>,
    depth: u32,
    toggles: &FeatureToggles,
) {
    if depth >= 3 && !toggles.is_enabled(config::SKIP_ID_SORT) {
        moves.sort_by_key(|mv| std::cmp::Reverse(hints.get(mv).copied().unwrap_or(0)));
    } else {
        order_moves(moves, board, None, false);
    }
}

#[allow(clippy::too_many_arguments)]
fn search_root(
    board: &mut Board,
    tt: &mut TranspositionTable,
    moves: &[Move],
    depth: u32,
    hints: &mut HashMap<Move, i8>,
    state: &mut SearchState,
) -> Option<(i32, Move)> {
    let mut alpha = -INF;
    let beta = INF;
    let mut best_score = -INF;
    let mut best_move = None;

    for (i, &mv) in moves.iter().enumerate() {
        let undo = make_move_basic(board, mv);

        let score = if i == 0 {
            -negamax(board, tt, -beta, -alpha, depth as i32 - 1, 1, false, state)
        } else {
            let scout = -negamax(board, tt, -alpha - 1, -alpha, depth as i32 - 1, 1, false, state);
            if scout > alpha && scout < beta {
                -negamax(board, tt, -beta, -alpha, depth as i32 - 1, 1, false, state)
            } else {
                scout
            }
        };

        undo_move_basic(board, undo);

        if state.timed_out {
            return None;
        }

        hints.insert(mv, (((score / 200) + 7).clamp(0, 15)) as i8);

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
        }
    }

    best_move.map(|mv| (best_score, mv))
}

/// Walks the TT starting from the position after `first`, collecting the
/// principal variation the search actually found.
fn reconstruct_pv(board: &mut Board, tt: &TranspositionTable, first: Move, depth: u32) -> Vec<Move> {
    let mut pv = vec![first];
    let mut undos = vec![make_move_basic(board, first)];
    let mut ply: u32 = 1;

    while ply < depth {
        match tt.probe(board.zobrist, ply as i32) {
            Some((Some(mv), score, _, NodeType::Exact)) => {
                pv.push(mv);
                undos.push(make_move_basic(board, mv));
                ply += 1;
                if score.abs() >= MATE_THRESHOLD {
                    break;
                }
            }
            _ => break,
        }
    }

    for undo in undos.into_iter().rev() {
        undo_move_basic(board, undo);
    }
    pv
}

fn format_score(score: i32) -> String {
    if score.abs() >= MATE_THRESHOLD {
        let plies_to_mate = MATE_SCORE - score.abs();
        let moves_to_mate = (plies_to_mate + 1) / 2;
        if score > 0 {
            format!("mate {}", moves_to_mate)
        } else {
            format!("mate -{}", moves_to_mate)
        }
    } else {
        format!("cp {}", score)
    }
}

#[allow(clippy::too_many_arguments)]
fn emit_info(depth: u32, seldepth: u32, score: i32, nodes: u64, elapsed_ms: u128, pv: &[Move]) {
    let nps = if elapsed_ms > 0 {
        (nodes as u128 * 1000 / elapsed_ms) as u64
    } else {
        0
    };
    let pv_str = pv
        .iter()
        .map(Move::to_uci)
        .collect::<Vec<_>>()
        .join(" ");
    println!(
        "info depth {} seldepth {} score {} nodes {} nps {} time {} pv {}",
        depth,
        seldepth,
        format_score(score),
        nodes,
        nps,
        elapsed_ms,
        pv_str
    );
}

pub struct SearchOutcome {
    pub best_move: Option<Move>,
    pub score: i32,
    pub depth: u32,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

/// Synchronous entry point behind the UCI `go` command. `stop` is polled from
/// every search node; setting it unwinds the search cooperatively.
pub fn go(board: &mut Board, tables: &MagicTables, tt: &mut TranspositionTable, params: &GoParams, stop: &AtomicBool) -> SearchOutcome {
    let toggles = config::feature_toggles();

    let mut legal_moves = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(board, tables, &mut legal_moves, &mut scratch);

    if legal_moves.is_empty() {
        println!("info string no legal moves");
        return SearchOutcome {
            best_move: None,
            score: 0,
            depth: 0,
            nodes: 0,
            pv: Vec::new(),
        };
    }

    let budget = TimeBudget::new(compute_budget(params, board.side_to_move));
    let max_depth = params.depth.unwrap_or(DEFAULT_MAX_DEPTH).max(1);

    let mut best_move = legal_moves[0];
    let mut best_score = -INF;
    let mut completed_depth = 0;
    let mut hints: HashMap<Move, i8> = HashMap::new();
    let mut total_nodes = 0u64;
    let mut seldepth = 0u32;

    for depth in 2..=max_depth {
        if !budget.has_more_time(stop) {
            break;
        }

        order_root_moves(&mut legal_moves, board, &hints, depth, toggles);

        let mut state = SearchState {
            tables,
            toggles,
            budget: &budget,
            stop,
            nodes: 0,
            seldepth: 0,
            timed_out: false,
        };

        match search_root(board, tt, &legal_moves, depth, &mut hints, &mut state) {
            Some((score, mv)) => {
                total_nodes += state.nodes;
                seldepth = seldepth.max(state.seldepth);
                best_score = score;
                best_move = mv;
                completed_depth = depth;

                let pv = reconstruct_pv(board, tt, best_move, depth);
                emit_info(depth, seldepth, best_score, total_nodes, budget.elapsed_ms(), &pv);

                if best_score.abs() >= MATE_THRESHOLD {
                    break;
                }
            }
            None => {
                total_nodes += state.nodes;
                break;
            }
        }
    }

    let pv = reconstruct_pv(board, tt, best_move, completed_depth.max(1));
    SearchOutcome {
        best_move: Some(best_move),
        score: best_score,
        depth: completed_depth,
        nodes: total_nodes,
        pv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::magic::loader::load_magic_tables;
    use std::sync::atomic::AtomicBool;

    fn no_stop() -> AtomicBool {
        AtomicBool::new(false)
    }

    #[test]
    fn finds_mate_in_one() {
        let tables = load_magic_tables();
        let mut tt = TranspositionTable::new(1);
        let mut board = Board::new_empty();
        board
            .set_fen("k5r1/8/8/8/7K/5q2/7P/8 b - - 0 1")
            .unwrap();
        let params = GoParams {
            depth: Some(5),
            ..Default::default()
        };
        let stop = no_stop();
        let outcome = go(&mut board, &tables, &mut tt, &params, &stop);
        assert_eq!(outcome.best_move.map(|m| m.to_uci()), Some("f3g4".to_string()));
    }

    #[test]
    fn returns_some_move_when_stop_is_already_set() {
        let tables = load_magic_tables();
        let mut tt = TranspositionTable::new(1);
        let mut board = Board::new();
        let params = GoParams {
            depth: Some(10),
            ..Default::default()
        };
        let stop = AtomicBool::new(true);
        let outcome = go(&mut board, &tables, &mut tt, &params, &stop);
        assert!(outcome.best_move.is_some());
    }

    #[test]
    fn no_legal_moves_returns_none() {
        let tables = load_magic_tables();
        let mut tt = TranspositionTable::new(1);
        let mut board = Board::new_empty();
        // Black to move, stalemated.
        board.set_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let params = GoParams::default();
        let stop = no_stop();
        let outcome = go(&mut board, &tables, &mut tt, &params, &stop);
        assert!(outcome.best_move.is_none());
    }
}
