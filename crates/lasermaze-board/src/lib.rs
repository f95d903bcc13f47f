//! Leaderboard persistence for LaserMaze.
//!
//! A flat JSON file of score entries, guarded by an async mutex and
//! rewritten atomically on every mutation. At this scale (the listing
//! shows at most 100 entries) rewriting the whole file is simpler and
//! more robust than anything incremental.

mod error;
mod store;

pub use error::BoardError;
pub use store::{Entry, Leaderboard, MAX_ENTRIES};
