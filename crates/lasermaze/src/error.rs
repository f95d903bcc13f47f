//! Unified error type for the server binary.

use lasermaze_board::BoardError;
use lasermaze_mission::MissionError;
use lasermaze_protocol::ProtocolError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A leaderboard store error.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A mission engine error.
    #[error(transparent)]
    Mission(#[from] MissionError),

    /// A wire encode/decode error.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Binding or serving the listener failed.
    #[error("server i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_board_error() {
        let err: ServerError = BoardError::InvalidName.into();
        assert!(matches!(err, ServerError::Board(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_from_mission_error() {
        let err: ServerError = MissionError::NotRunning.into();
        assert!(matches!(err, ServerError::Mission(_)));
    }
}
