//! # LaserMaze
//!
//! Backend for a laser-maze party game: players crawl through a web of
//! tripwires against the clock, every tripped beam costs five seconds,
//! and the best total times go on a leaderboard.
//!
//! The server ties together the workspace crates:
//!
//! - [`lasermaze_mission`]: the per-player timer engine (one actor per
//!   WebSocket connection);
//! - [`lasermaze_channel`]: the broadcast hub fanning interrupt
//!   notifications out to every connected session;
//! - [`lasermaze_board`]: the JSON-file leaderboard;
//! - [`lasermaze_protocol`]: the wire types shared with clients.
//!
//! Everything is served from one port: the REST API under `/api`, the
//! real-time channel at `/ws`, and the static front-end from the
//! configured directory.

mod api;
mod bridge;
mod error;
mod server;
mod ws;

use std::sync::Arc;

use lasermaze_board::Leaderboard;
use lasermaze_channel::InterruptHub;
use lasermaze_mission::MissionConfig;

pub use error::ServerError;
pub use server::{LasermazeServer, LasermazeServerBuilder, ServerConfig};

/// Shared state handed to every request handler and session task.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) board: Arc<Leaderboard>,
    pub(crate) hub: InterruptHub,
    pub(crate) mission_config: MissionConfig,
}
