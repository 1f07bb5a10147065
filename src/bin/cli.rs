use corvus::board::{Board, Color};
use corvus::moves::execute::make_move_basic;
use corvus::moves::magic::MagicTables;
use corvus::moves::magic::loader::load_magic_tables;
use corvus::moves::perft::perft_divide;
use corvus::player::{EnginePlayer, InteractivePlayer, Player};
use corvus::search::search::{GoParams, go};
use corvus::search::tt::TranspositionTable;
use corvus::status::{GameStatus, position_status};
use corvus::uci;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::str::FromStr;
use std::sync::atomic::AtomicBool;

const COMMAND_LOG_PATH: &str = "command_log.uci";

fn main() {
    #[cfg(feature = "cli")]
    corvus::logger::init_logging("logs/engine.log", "info");

    let args: Vec<String> = std::env::args().collect();
    let exit_code = match args.get(1).map(String::as_str) {
        Some("perft") => run_perft(&args[2..]),
        Some("play") => run_play(),
        Some("replay") => run_replay(&args[2..]),
        Some(path) => run_uci_loop(Some(path)),
        None => run_uci_loop(None),
    };
    std::process::exit(exit_code);
}

/// Reads a PGN movetext file and prints the equivalent `position startpos
/// moves ...` UCI command, for feeding a recorded game back through
/// `engine_main`.
fn run_replay(args: &[String]) -> i32 {
    let Some(path) = args.first() else {
        eprintln!("usage: corvus replay <pgn-file>");
        return 2;
    };

    let movetext = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("could not read '{path}': {e}");
            return 1;
        }
    };

    let tables = load_magic_tables();
    match corvus::pgn::parse_pgn_moves(&movetext, &tables) {
        Ok(moves) => {
            let uci_moves: Vec<String> = moves.iter().map(|m| m.to_uci()).collect();
            println!("position startpos moves {}", uci_moves.join(" "));
            0
        }
        Err(e) => {
            eprintln!("could not parse PGN: {e}");
            1
        }
    }
}

fn run_perft(args: &[String]) -> i32 {
    let tables = load_magic_tables();

    let depth: u32 = match args.first().and_then(|s| s.parse().ok()) {
        Some(d) => d,
        None => {
            eprintln!("usage: corvus perft <depth> [fen]");
            return 2;
        }
    };

    let mut board = match args.get(1) {
        Some(fen) => match Board::from_str(fen) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("{e}");
                return 2;
            }
        },
        None => Board::new(),
    };

    let nodes = perft_divide(&mut board, &tables, depth, None);
    println!("nodes {nodes}");
    0
}

/// Reads UCI commands either from `path` (if given) or from stdin, logging
/// every accepted line to `command_log.uci` with a timestamp header on the
/// log's first write.
fn run_uci_loop(path: Option<&str>) -> i32 {
    let tables = load_magic_tables();
    let mut board = Board::new();
    let mut tt = TranspositionTable::new(64);
    let stop = AtomicBool::new(false);
    let mut log = None;

    let lines: Box<dyn Iterator<Item = io::Result<String>>> = match path {
        Some(p) => match File::open(p) {
            Ok(f) => Box::new(BufReader::new(f).lines()),
            Err(e) => {
                eprintln!("could not open '{p}': {e}");
                return 1;
            }
        },
        None => Box::new(io::stdin().lock().lines()),
    };

    for line in lines {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("input error: {e}");
                return 1;
            }
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        log_command(&mut log, line);

        let parts: Vec<&str> = line.split_whitespace().collect();
        let command = parts[0].to_lowercase();
        match command.as_str() {
            "uci" => handle_uci(),
            "isready" => println!("readyok"),
            "ucinewgame" => {
                board = Board::new();
                tt.clear();
            }
            "position" => {
                if let Some(new_board) = handle_position(&parts, &tables) {
                    board = new_board;
                }
            }
            "go" => handle_go(&parts, &mut board, &tables, &mut tt, &stop),
            "stop" => stop.store(true, std::sync::atomic::Ordering::Relaxed),
            "fen" => println!("{}", board.to_fen()),
            "quit" => return 0,
            "d" | "display" => print_board(&board),
            _ => {}
        }
    }
    0
}

fn log_command(log: &mut Option<File>, line: &str) {
    if log.is_none() {
        let is_new = !std::path::Path::new(COMMAND_LOG_PATH).exists();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(COMMAND_LOG_PATH) {
            if is_new {
                let _ = writeln!(f, "# session started {:?}", std::time::SystemTime::now());
            }
            *log = Some(f);
        }
    }
    if let Some(f) = log {
        let _ = writeln!(f, "{line}");
    }
}

fn handle_uci() {
    println!("id name Corvus 1.0");
    println!("id author the Corvus authors");
    println!("uciok");
}

fn handle_position(parts: &[&str], tables: &MagicTables) -> Option<Board> {
    let mut board = if parts.len() > 1 && parts[1] == "fen" {
        let moves_idx = parts.iter().position(|&p| p == "moves").unwrap_or(parts.len());
        let fen_string = parts[2..moves_idx].join(" ");
        Board::from_str(&fen_string).ok()?
    } else {
        Board::new()
    };

    if let Some(moves_idx) = parts.iter().position(|&p| p == "moves") {
        for move_str in &parts[moves_idx + 1..] {
            match uci::parse_move(&board, tables, move_str) {
                Ok(mv) => {
                    make_move_basic(&mut board, mv);
                }
                Err(e) => {
                    println!("info string {e}");
                    return None;
                }
            }
        }
    }

    Some(board)
}

fn handle_go(parts: &[&str], board: &mut Board, tables: &MagicTables, tt: &mut TranspositionTable, stop: &AtomicBool) {
    stop.store(false, std::sync::atomic::Ordering::Relaxed);
    let mut params = GoParams::default();

    let mut i = 1;
    while i < parts.len() {
        match parts[i] {
            "depth" => {
                params.depth = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "movetime" => {
                params.movetime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "wtime" => {
                params.wtime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "btime" => {
                params.btime = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "winc" => {
                params.winc = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "binc" => {
                params.binc = parts.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(0);
                i += 2;
            }
            "movestogo" => {
                params.movestogo = parts.get(i + 1).and_then(|s| s.parse().ok());
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => i += 1,
        }
    }

    let outcome = go(board, tables, tt, &params, stop);
    match outcome.best_move {
        Some(mv) => println!("bestmove {}", mv.to_uci()),
        None => println!("bestmove 0000"),
    }
}

const PIECE_GLYPHS: [[char; 6]; 2] = [
    ['♙', '♘', '♗', '♖', '♕', '♔'],
    ['♟', '♞', '♝', '♜', '♛', '♚'],
];

fn print_board(board: &Board) {
    use corvus::board::Piece;
    use corvus::square::Square;

    let piece_index = |p: Piece| match p {
        Piece::Pawn => 0,
        Piece::Knight => 1,
        Piece::Bishop => 2,
        Piece::Rook => 3,
        Piece::Queen => 4,
        Piece::King => 5,
    };

    for rank in (0..8u8).rev() {
        print!("{} ", rank + 1);
        for file in 0..8u8 {
            let sq = Square::from_file_rank(file, rank);
            let glyph = match board.piece_at(sq) {
                Some((color, piece)) => PIECE_GLYPHS[color as usize][piece_index(piece)],
                None => '.',
            };
            print!("{glyph} ");
        }
        println!();
    }
    println!("  a b c d e f g h");
    println!("fen: {}", board.to_fen());
}

/// A local two-player game driven entirely through the `Player` trait: White
/// is engine-backed, Black is prompted from stdin.
fn run_play() -> i32 {
    let tables = load_magic_tables();
    let params = GoParams {
        movetime: Some(1000),
        ..Default::default()
    };
    let mut white: Box<dyn Player> = Box::new(EnginePlayer::new("White", &tables, params));
    let mut black: Box<dyn Player> = Box::new(InteractivePlayer::new("Black", &tables));

    let mut board = Board::new();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    loop {
        print_board(&board);
        match position_status(&mut board, &tables) {
            GameStatus::Checkmate => {
                println!("checkmate");
                return 0;
            }
            GameStatus::Stalemate
            | GameStatus::DrawFiftyMove
            | GameStatus::DrawThreefold
            | GameStatus::DrawFivefold
            | GameStatus::DrawSeventyFiveMove
            | GameStatus::DrawDeadPosition => {
                println!("draw");
                return 0;
            }
            GameStatus::InPlay => {}
        }

        let (mover, other): (&mut dyn Player, &mut dyn Player) = if board.side_to_move == Color::White {
            (white.as_mut(), black.as_mut())
        } else {
            (black.as_mut(), white.as_mut())
        };

        let Some(uci_move) = mover.get_next_move(&mut input, &mut output) else {
            println!("{} resigns", mover.name());
            return 0;
        };
        other.notify(&uci_move);

        match uci::parse_move(&board, &tables, &uci_move) {
            Ok(mv) => {
                make_move_basic(&mut board, mv);
            }
            Err(e) => {
                eprintln!("player produced an illegal move: {e}");
                return 1;
            }
        }
    }
}
