use crate::game::Move;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("Invalid square: {0:?}")]
    InvalidSquare(String),
    #[error("Square ({col}, {row}) is off the board")]
    OffBoard { col: i32, row: i32 },
    #[error("Invalid move notation: {0:?}")]
    InvalidMove(String),
    #[error("Illegal move: {0}")]
    IllegalMove(Move),
    #[error("Game already over")]
    GameOver,
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
}
