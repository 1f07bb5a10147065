//! Parsing helpers for the textual UCI protocol subset.

use crate::board::{Board, Piece};
use crate::error::EngineError;
use crate::moves::execute::generate_legal;
use crate::moves::magic::MagicTables;
use crate::moves::types::Move;
use crate::square::Square;
use std::str::FromStr;

/// Parses a move string like `e2e4` or `a7a8q` into the matching legal move
/// on `board`. Fails if the string is malformed or doesn't name a legal move.
pub fn parse_move(board: &Board, tables: &MagicTables, text: &str) -> Result<Move, EngineError> {
    if text.len() < 4 || text.len() > 5 {
        return Err(EngineError::UciMove(text.to_string()));
    }

    let from = Square::from_str(&text[0..2])
        .map_err(|_| EngineError::UciMove(text.to_string()))?;
    let to = Square::from_str(&text[2..4]).map_err(|_| EngineError::UciMove(text.to_string()))?;

    let promotion = match text.as_bytes().get(4) {
        None => None,
        Some(b'q') => Some(Piece::Queen),
        Some(b'r') => Some(Piece::Rook),
        Some(b'b') => Some(Piece::Bishop),
        Some(b'n') => Some(Piece::Knight),
        Some(_) => return Err(EngineError::UciMove(text.to_string())),
    };

    let mut moves = Vec::with_capacity(256);
    let mut scratch = Vec::with_capacity(256);
    let mut board_copy = board.clone();
    generate_legal(&mut board_copy, tables, &mut moves, &mut scratch);

    moves
        .into_iter()
        .find(|mv| mv.from == from && mv.to == to && mv.promotion == promotion)
        .ok_or_else(|| EngineError::UciMove(text.to_string()))
}
