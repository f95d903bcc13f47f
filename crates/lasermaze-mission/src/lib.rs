//! Mission timer and penalty engine for Lasermaze.
//!
//! This is the core of the system: a three-phase state machine
//! (Idle → Running → Submitting → Idle) that measures elapsed mission
//! time, accumulates +5 s penalties on interrupt notifications, enforces
//! a maximum mission duration with auto-finish, and submits the final
//! time to a leaderboard through the [`ScoreSink`] trait.
//!
//! # Key types
//!
//! - [`MissionSession`]: the pure state machine; no I/O, fully
//!   deterministic given explicit instants.
//! - the mission actor (via [`spawn_mission`]): a task that owns one
//!   session and drives it from three inputs: a command channel, a
//!   50 ms [`Ticker`], and an interrupt subscription.
//! - [`MissionHandle`]: send commands to a running mission actor.
//! - [`ScoreSink`]: where finished results go; the server wires this to
//!   the leaderboard store.
//!
//! The actor serializes ticks, commands, and interrupts through one
//! `select!` loop, so a tick-triggered auto-finish can never race a
//! concurrently arriving interrupt.

mod config;
mod error;
mod runner;
mod session;
mod sink;
mod ticker;

pub use config::MissionConfig;
pub use error::MissionError;
pub use runner::{spawn_mission, EventSender, MissionHandle};
pub use session::{MissionOutcome, MissionPhase, MissionSession, MissionSnapshot};
pub use sink::{ScoreSink, SubmitError};
pub use ticker::Ticker;
