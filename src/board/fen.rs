use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, Color, Piece};
use crate::error::EngineError;
use crate::square::Square;

impl Board {
    /// Loads a position from Forsyth-Edwards Notation, replacing all current state.
    /// The halfmove clock and fullmove number fields are optional and default to 0/1.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), EngineError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(EngineError::Fen(format!(
                "FEN needs at least 4 fields, got {}",
                fields.len()
            )));
        }

        let mut piece_bb = [[0u64; 6]; 2];
        let mut piece_on_sq = [super::EMPTY_SQ; 64];

        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(EngineError::Fen(format!(
                "FEN board must have 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (rank_from_top, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_from_top;
            let mut file = 0usize;
            for ch in rank_str.chars() {
                if let Some(skip) = ch.to_digit(10) {
                    file += skip as usize;
                    if file > 8 {
                        return Err(EngineError::Fen(format!(
                            "rank '{}' overflows the board",
                            rank_str
                        )));
                    }
                    continue;
                }
                if file >= 8 {
                    return Err(EngineError::Fen(format!(
                        "rank '{}' overflows the board",
                        rank_str
                    )));
                }
                let (piece, color) = CHAR_TO_PC[ch as usize]
                    .ok_or_else(|| EngineError::Fen(format!("invalid FEN piece glyph '{}'", ch)))?;
                let sq = rank * 8 + file;
                piece_bb[color as usize][piece as usize] |= 1u64 << sq;
                piece_on_sq[sq] = (color as u8) << 3 | (piece as u8);
                file += 1;
            }
            if file != 8 {
                return Err(EngineError::Fen(format!(
                    "rank '{}' does not cover all 8 files",
                    rank_str
                )));
            }
        }

        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(EngineError::Fen(format!(
                    "invalid side-to-move field '{}'",
                    other
                )));
            }
        };

        let mut castling_rights = 0u8;
        if fields[2] != "-" {
            for ch in fields[2].chars() {
                castling_rights |= match ch {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => {
                        return Err(EngineError::Fen(format!(
                            "invalid castling glyph '{}'",
                            other
                        )));
                    }
                };
            }
        }

        let en_passant = if fields[3] == "-" {
            None
        } else {
            Some(fields[3].parse::<Square>().map_err(|e| {
                EngineError::Fen(format!("invalid en passant square: {}", e))
            })?)
        };

        let halfmove_clock = fields
            .get(4)
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| EngineError::Fen("invalid halfmove clock".to_string()))?
            .unwrap_or(0);

        let fullmove_number = fields
            .get(5)
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|_| EngineError::Fen("invalid fullmove number".to_string()))?
            .unwrap_or(1);

        let occ_white = (0..6).fold(0u64, |acc, p| acc | piece_bb[Color::White as usize][p]);
        let occ_black = (0..6).fold(0u64, |acc, p| acc | piece_bb[Color::Black as usize][p]);

        self.piece_bb = piece_bb;
        self.piece_on_sq = piece_on_sq;
        self.occ_white = occ_white;
        self.occ_black = occ_black;
        self.occ_all = occ_white | occ_black;
        self.side_to_move = side_to_move;
        self.castling_rights = castling_rights;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self.history.clear();
        self.refresh_zobrist();

        if self.pieces(Piece::King, Color::White) == 0 || self.pieces(Piece::King, Color::Black) == 0
        {
            return Err(EngineError::Fen("FEN is missing a king".to_string()));
        }

        Ok(())
    }

    /// Serializes the current position to Forsyth-Edwards Notation.
    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut empty_run = 0u32;
            for file in 0..8 {
                let sq = rank * 8 + file;
                match self.piece_at(Square::from_index(sq as u8)) {
                    Some((color, piece)) => {
                        if empty_run > 0 {
                            placement.push_str(&empty_run.to_string());
                            empty_run = 0;
                        }
                        let idx = (color as usize) * 6 + (piece as usize);
                        placement.push(PC_TO_CHAR[idx]);
                    }
                    None => empty_run += 1,
                }
            }
            if empty_run > 0 {
                placement.push_str(&empty_run.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }

        let side = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        if self.has_castling(CASTLE_WK) {
            castling.push('K');
        }
        if self.has_castling(CASTLE_WQ) {
            castling.push('Q');
        }
        if self.has_castling(CASTLE_BK) {
            castling.push('k');
        }
        if self.has_castling(CASTLE_BQ) {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let ep = match self.en_passant {
            Some(sq) => sq.to_string(),
            None => "-".to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, ep, self.halfmove_clock, self.fullmove_number
        )
    }
}
