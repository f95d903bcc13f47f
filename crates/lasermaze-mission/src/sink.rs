//! Where finished mission results go.
//!
//! The engine doesn't know about leaderboards, files, or HTTP; it hands
//! the final time to a [`ScoreSink`] and reacts to success or failure.
//! The server wires this to the JSON-file store; tests use recording or
//! failing sinks.

use crate::MissionOutcome;

/// Accepts a finished mission result for persistence.
pub trait ScoreSink: Send + Sync + 'static {
    /// Persists the outcome's name and total time.
    ///
    /// A failure is surfaced to the player and the result is discarded;
    /// the engine performs no retry.
    fn submit(
        &self,
        outcome: &MissionOutcome,
    ) -> impl std::future::Future<Output = Result<(), SubmitError>> + Send;
}

/// A submission failure, carrying a message fit to show the player.
#[derive(Debug, thiserror::Error)]
#[error("score submission failed: {0}")]
pub struct SubmitError(String);

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
