//! A minimal PGN move-list parser: enough to turn a recorded game's movetext
//! into a sequence of legal moves that can be replayed into `position`
//! commands. Tags, comments, and variations are not modelled; only the
//! movetext itself is consumed.

use crate::board::{Board, Piece};
use crate::error::EngineError;
use crate::moves::execute::{generate_legal, make_move_basic};
use crate::moves::magic::MagicTables;
use crate::moves::types::Move;

/// Strips move-number markers, result markers, and `{...}` comments from a
/// PGN movetext blob, leaving only SAN tokens.
fn tokenize(movetext: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0u32;
    let mut current = String::new();

    for ch in movetext.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }

    out.into_iter()
        .filter(|tok| !is_move_number(tok) && !is_result_marker(tok))
        .collect()
}

fn is_move_number(tok: &str) -> bool {
    let digits_then_dots = tok.trim_end_matches('.');
    !digits_then_dots.is_empty() && digits_then_dots.chars().all(|c| c.is_ascii_digit())
}

fn is_result_marker(tok: &str) -> bool {
    matches!(tok, "1-0" | "0-1" | "1/2-1/2" | "*")
}

/// Resolves a single SAN token against the legal moves available at `board`.
fn san_to_move(board: &mut Board, tables: &MagicTables, san: &str) -> Result<Move, EngineError> {
    let clean: String = san.chars().filter(|&c| c != '+' && c != '#').collect();

    let mut legal = Vec::with_capacity(64);
    let mut scratch = Vec::with_capacity(256);
    generate_legal(board, tables, &mut legal, &mut scratch);

    if clean == "O-O" {
        return legal
            .into_iter()
            .find(|m| m.is_kingside_castle())
            .ok_or_else(|| EngineError::UciMove(san.to_string()));
    }
    if clean == "O-O-O" {
        return legal
            .into_iter()
            .find(|m| m.is_queenside_castle())
            .ok_or_else(|| EngineError::UciMove(san.to_string()));
    }

    let (body, promotion) = match clean.split_once('=') {
        Some((b, p)) => (b, parse_promotion(p)),
        None => (clean.as_str(), None),
    };
    let body = body.replace('x', "");

    if body.len() < 2 {
        return Err(EngineError::UciMove(san.to_string()));
    }
    let target = &body[body.len() - 2..];
    let target_sq: crate::square::Square = target
        .parse()
        .map_err(|_| EngineError::UciMove(san.to_string()))?;

    let first = body.chars().next().unwrap();
    let piece = match first {
        'N' => Piece::Knight,
        'B' => Piece::Bishop,
        'R' => Piece::Rook,
        'Q' => Piece::Queen,
        'K' => Piece::King,
        _ => Piece::Pawn,
    };

    let disambiguator = if piece == Piece::Pawn {
        None
    } else {
        let middle = &body[1..body.len() - 2];
        middle.chars().next()
    };

    legal
        .into_iter()
        .find(|m| {
            if m.to != target_sq || m.promotion != promotion {
                return false;
            }
            let Some((_, p)) = board.piece_at(m.from) else {
                return false;
            };
            if p != piece {
                return false;
            }
            match disambiguator {
                Some(d) if d.is_ascii_lowercase() => m.from.file() == d as u8 - b'a',
                Some(d) if d.is_ascii_digit() => m.from.rank() == d as u8 - b'1',
                _ => true,
            }
        })
        .ok_or_else(|| EngineError::UciMove(san.to_string()))
}

fn parse_promotion(s: &str) -> Option<Piece> {
    match s.chars().next()? {
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        _ => None,
    }
}

/// Replays `movetext` from the starting position, returning the matched
/// moves in order. Stops at the first token that can't be resolved.
pub fn parse_pgn_moves(movetext: &str, tables: &MagicTables) -> Result<Vec<Move>, EngineError> {
    let mut board = Board::new();
    let mut moves = Vec::new();

    for token in tokenize(movetext) {
        let mv = san_to_move(&mut board, tables, &token)?;
        make_move_basic(&mut board, mv);
        moves.push(mv);
    }

    Ok(moves)
}
