use thiserror::Error;

/// Errors produced by the leaderboard store.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Name missing or blank after trimming.
    #[error("name must not be empty")]
    InvalidName,

    /// Time missing, negative, or not a finite number.
    #[error("time must be a non-negative number of milliseconds")]
    InvalidTime,

    /// No entry with the given id.
    #[error("no leaderboard entry with id {0:?}")]
    NotFound(String),

    /// Reading or writing the backing file failed.
    #[error("leaderboard storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serializing the board for persistence failed.
    #[error("leaderboard encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
