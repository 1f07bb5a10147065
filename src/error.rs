use thiserror::Error;

/// Typed failures at the crate's public boundaries (FEN parsing, UCI move
/// parsing, user-facing move attempts). Internal hot-path functions that
/// operate under caller-upheld preconditions return plain values instead.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    Fen(String),

    #[error("invalid UCI move '{0}'")]
    UciMove(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("malformed feature toggle line: '{0}'")]
    FeatureToggle(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
