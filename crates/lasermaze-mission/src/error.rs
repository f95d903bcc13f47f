//! Error types for the mission engine.

/// Errors that can occur while operating a mission session.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    /// `start` was called with an empty or whitespace-only player name.
    #[error("player name must not be empty")]
    EmptyName,

    /// `start` was called while a mission is already running. The UI is
    /// expected to disable the control; the core still guards the
    /// transition to avoid double timers.
    #[error("a mission is already in progress")]
    AlreadyRunning,

    /// `start` was called while the previous result is still being
    /// submitted to the leaderboard.
    #[error("previous result submission still pending")]
    SubmissionPending,

    /// `finish` was called with no mission running.
    #[error("no mission is running")]
    NotRunning,

    /// The mission actor is gone (its task ended or its channel closed).
    #[error("mission engine unavailable")]
    Unavailable,
}
