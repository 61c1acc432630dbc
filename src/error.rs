//! Error type for loading records and driving the replay engine.

use thiserror::Error;

use crate::rules::MoveError;
use crate::sgf::SgfError;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("malformed record: {0}")]
    Sgf(#[from] SgfError),

    #[error("malformed property tree: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    IllegalMove(#[from] MoveError),

    #[error("record contains no game")]
    NoGame,

    #[error("unsupported board size {0} (expected 1..=19)")]
    BoardSize(usize),
}

pub type Result<T> = std::result::Result<T, ReplayError>;
