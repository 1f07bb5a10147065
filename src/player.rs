//! The `Player` abstraction used by the interactive two-player CLI mode.
//!
//! A `Player` owns its own view of the board and is driven entirely through
//! `get_next_move`/`notify`; the CLI never reaches into a player's internals.

use crate::board::Board;
use crate::moves::execute::make_move_basic;
use crate::moves::magic::MagicTables;
use crate::search::search::{GoParams, go};
use crate::search::tt::TranspositionTable;
use crate::uci;
use std::io::{BufRead, Write};
use std::sync::atomic::AtomicBool;

/// One side of a game. Implementations decide how a move is produced: by
/// searching, by prompting a human, or (in tests) by replaying a fixed script.
pub trait Player {
    fn name(&self) -> &str;

    /// Informs this player that `uci_move` was just played, by either side.
    fn notify(&mut self, uci_move: &str);

    /// Produces this player's next move in UCI notation, or `None` if the
    /// player resigns.
    fn get_next_move(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Option<String>;

    /// Resets the player's internal board to `fen`. Returns `false` on a
    /// malformed FEN, leaving the player's position unchanged.
    fn set_position(&mut self, fen: &str) -> bool;

    /// Called at the start of a new game.
    fn reset(&mut self);
}

/// A player backed by the search engine.
pub struct EnginePlayer<'a> {
    name: String,
    board: Board,
    tables: &'a MagicTables,
    tt: TranspositionTable,
    go_params: GoParams,
}

impl<'a> EnginePlayer<'a> {
    pub fn new(name: impl Into<String>, tables: &'a MagicTables, go_params: GoParams) -> Self {
        Self {
            name: name.into(),
            board: Board::new(),
            tables,
            tt: TranspositionTable::new(64),
            go_params,
        }
    }
}

impl<'a> Player for EnginePlayer<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, uci_move: &str) {
        if let Ok(mv) = uci::parse_move(&self.board, self.tables, uci_move) {
            let _ = make_move_basic(&mut self.board, mv);
        }
    }

    fn get_next_move(&mut self, _input: &mut dyn BufRead, output: &mut dyn Write) -> Option<String> {
        let stop = AtomicBool::new(false);
        let outcome = go(&mut self.board, self.tables, &mut self.tt, &self.go_params, &stop);
        let mv = outcome.best_move?;
        let _ = make_move_basic(&mut self.board, mv);
        let _ = writeln!(output, "{} plays {}", self.name, mv.to_uci());
        Some(mv.to_uci())
    }

    fn set_position(&mut self, fen: &str) -> bool {
        match self.board.set_fen(fen) {
            Ok(()) => true,
            Err(_) => false,
        }
    }

    fn reset(&mut self) {
        self.board = Board::new();
        self.tt.clear();
    }
}

/// A player driven by lines read from `input`, validated against the board's
/// legal moves before being accepted.
pub struct InteractivePlayer<'a> {
    name: String,
    board: Board,
    tables: &'a MagicTables,
}

impl<'a> InteractivePlayer<'a> {
    pub fn new(name: impl Into<String>, tables: &'a MagicTables) -> Self {
        Self {
            name: name.into(),
            board: Board::new(),
            tables,
        }
    }
}

impl<'a> Player for InteractivePlayer<'a> {
    fn name(&self) -> &str {
        &self.name
    }

    fn notify(&mut self, uci_move: &str) {
        if let Ok(mv) = uci::parse_move(&self.board, self.tables, uci_move) {
            let _ = make_move_basic(&mut self.board, mv);
        }
    }

    fn get_next_move(&mut self, input: &mut dyn BufRead, output: &mut dyn Write) -> Option<String> {
        loop {
            let _ = write!(output, "{} to move (or 'resign'): ", self.name);
            let _ = output.flush();

            let mut line = String::new();
            if input.read_line(&mut line).unwrap_or(0) == 0 {
                return None;
            }
            let text = line.trim();
            if text.eq_ignore_ascii_case("resign") {
                return None;
            }

            match uci::parse_move(&self.board, self.tables, text) {
                Ok(mv) => {
                    let _ = make_move_basic(&mut self.board, mv);
                    return Some(mv.to_uci());
                }
                Err(_) => {
                    let _ = writeln!(output, "illegal move: {text}");
                }
            }
        }
    }

    fn set_position(&mut self, fen: &str) -> bool {
        match self.board.set_fen(fen) {
            Ok(()) => true,
            Err(_) => false,
        }
    }

    fn reset(&mut self) {
        self.board = Board::new();
    }
}
