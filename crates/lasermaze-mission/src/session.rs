//! The mission state machine.
//!
//! [`MissionSession`] is deliberately pure: no tasks, no channels, no
//! clock reads. Every time-dependent operation takes an explicit `now`,
//! which makes the invariants directly testable. The async plumbing
//! lives in [`runner`](crate::runner).
//!
//! ```text
//!   Idle ──(start)──→ Running ──(finish / auto-finish)──→ Submitting
//!     ↑                  │                                    │
//!     └──────(reset)─────┴────────(reset / submitted)─────────┘
//! ```
//!
//! Invariants:
//! - the penalty count changes only while Running;
//! - `started_at` exists iff the session is Running (at finish the
//!   figures are frozen into a [`MissionOutcome`] and the instant is
//!   dropped);
//! - Submitting rejects `start`, ignores interrupts, and accepts `reset`.

// Tokio's `Instant` rather than `std`'s: it is the same monotonic clock
// in production, and it obeys `tokio::time::pause` in tests.
use tokio::time::Instant;

use crate::{MissionConfig, MissionError};

/// The observable phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    /// No active timing.
    Idle,
    /// Clock running, penalties accumulating.
    Running,
    /// Finished, result submission in flight. Penalties are frozen.
    Submitting,
}

#[derive(Debug)]
enum Inner {
    Idle,
    Running {
        name: String,
        started_at: Instant,
        penalties: u32,
    },
    Submitting,
}

/// A display snapshot of a running mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissionSnapshot {
    pub elapsed_ms: u64,
    pub total_ms: u64,
    pub penalties: u32,
}

/// The frozen result of a finished mission, computed at the instant
/// `finish` was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionOutcome {
    pub name: String,
    pub elapsed_ms: u64,
    pub penalties: u32,
    pub total_ms: u64,
}

/// One player's mission timer. Single instance per active session.
#[derive(Debug)]
pub struct MissionSession {
    config: MissionConfig,
    inner: Inner,
}

impl MissionSession {
    pub fn new(config: MissionConfig) -> Self {
        Self {
            config,
            inner: Inner::Idle,
        }
    }

    pub fn phase(&self) -> MissionPhase {
        match self.inner {
            Inner::Idle => MissionPhase::Idle,
            Inner::Running { .. } => MissionPhase::Running,
            Inner::Submitting => MissionPhase::Submitting,
        }
    }

    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    /// The player name of the running mission, if any.
    pub fn player_name(&self) -> Option<&str> {
        match &self.inner {
            Inner::Running { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Starts a mission: Idle → Running.
    ///
    /// # Errors
    /// - [`MissionError::EmptyName`] if `name` trims to nothing (no state
    ///   change);
    /// - [`MissionError::AlreadyRunning`] / [`MissionError::SubmissionPending`]
    ///   when not Idle.
    pub fn start(&mut self, name: &str, now: Instant) -> Result<(), MissionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MissionError::EmptyName);
        }
        match self.inner {
            Inner::Idle => {
                self.inner = Inner::Running {
                    name: name.to_owned(),
                    started_at: now,
                    penalties: 0,
                };
                Ok(())
            }
            Inner::Running { .. } => Err(MissionError::AlreadyRunning),
            Inner::Submitting => Err(MissionError::SubmissionPending),
        }
    }

    /// Applies one interrupt notification.
    ///
    /// Returns the new penalty count if the session was Running; `None`
    /// means the notification was discarded as a no-op. Does not touch
    /// `started_at`.
    pub fn record_interrupt(&mut self) -> Option<u32> {
        match &mut self.inner {
            Inner::Running { penalties, .. } => {
                *penalties += 1;
                Some(*penalties)
            }
            _ => None,
        }
    }

    /// Display figures at `now`, while Running.
    pub fn snapshot(&self, now: Instant) -> Option<MissionSnapshot> {
        match &self.inner {
            Inner::Running {
                started_at,
                penalties,
                ..
            } => {
                let elapsed_ms = now.saturating_duration_since(*started_at).as_millis() as u64;
                Some(MissionSnapshot {
                    elapsed_ms,
                    total_ms: elapsed_ms + u64::from(*penalties) * self.config.penalty_ms,
                    penalties: *penalties,
                })
            }
            _ => None,
        }
    }

    /// Whether the running mission has reached the maximum duration and
    /// is due for an auto-finish.
    pub fn over_limit(&self, now: Instant) -> bool {
        self.snapshot(now)
            .is_some_and(|s| s.elapsed_ms >= self.config.max_duration_ms)
    }

    /// Finishes the mission: Running → Submitting.
    ///
    /// The returned outcome is frozen at `now`; interrupts arriving after
    /// this point no longer affect it.
    ///
    /// # Errors
    /// [`MissionError::NotRunning`] when the session is not Running.
    pub fn finish(&mut self, now: Instant) -> Result<MissionOutcome, MissionError> {
        match std::mem::replace(&mut self.inner, Inner::Submitting) {
            Inner::Running {
                name,
                started_at,
                penalties,
            } => {
                let elapsed_ms = now.saturating_duration_since(started_at).as_millis() as u64;
                Ok(MissionOutcome {
                    name,
                    elapsed_ms,
                    penalties,
                    total_ms: elapsed_ms + u64::from(penalties) * self.config.penalty_ms,
                })
            }
            other => {
                // Not running: put the original state back untouched.
                self.inner = other;
                Err(MissionError::NotRunning)
            }
        }
    }

    /// Marks the pending submission as dealt with (saved or discarded):
    /// Submitting → Idle. No-op in other phases.
    pub fn submitted(&mut self) {
        if matches!(self.inner, Inner::Submitting) {
            self.inner = Inner::Idle;
        }
    }

    /// Abandons whatever is in flight and returns to Idle. Valid from any
    /// phase; always succeeds.
    pub fn reset(&mut self) {
        self.inner = Inner::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn session() -> MissionSession {
        MissionSession::new(MissionConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_requires_non_empty_name() {
        let mut s = session();
        let now = Instant::now();

        assert!(matches!(s.start("", now), Err(MissionError::EmptyName)));
        assert!(matches!(s.start("   ", now), Err(MissionError::EmptyName)));
        assert_eq!(s.phase(), MissionPhase::Idle);

        s.start("AGENT1", now).unwrap();
        assert_eq!(s.phase(), MissionPhase::Running);
        assert_eq!(s.player_name(), Some("AGENT1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_trims_name() {
        let mut s = session();
        s.start("  AGENT1  ", Instant::now()).unwrap();
        assert_eq!(s.player_name(), Some("AGENT1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_is_rejected() {
        let mut s = session();
        let now = Instant::now();
        s.start("A", now).unwrap();
        assert!(matches!(
            s.start("B", now),
            Err(MissionError::AlreadyRunning)
        ));
        // The original mission is untouched.
        assert_eq!(s.player_name(), Some("A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupts_count_only_while_running() {
        let mut s = session();
        assert_eq!(s.record_interrupt(), None);

        let now = Instant::now();
        s.start("A", now).unwrap();
        assert_eq!(s.record_interrupt(), Some(1));
        assert_eq!(s.record_interrupt(), Some(2));

        s.finish(now).unwrap();
        assert_eq!(s.record_interrupt(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_agent1_scenario() {
        // start at T=0, interrupts at T+1000 and T+1500, finish at T+3000.
        let mut s = session();
        let t0 = Instant::now();
        s.start("AGENT1", t0).unwrap();
        s.record_interrupt();
        s.record_interrupt();

        let outcome = s.finish(t0 + Duration::from_millis(3000)).unwrap();
        assert_eq!(outcome.name, "AGENT1");
        assert_eq!(outcome.penalties, 2);
        assert_eq!(outcome.elapsed_ms, 3000);
        assert_eq!(outcome.total_ms, 13_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_totals() {
        let mut s = session();
        let t0 = Instant::now();
        s.start("A", t0).unwrap();
        s.record_interrupt();

        let snap = s.snapshot(t0 + Duration::from_millis(250)).unwrap();
        assert_eq!(snap.elapsed_ms, 250);
        assert_eq!(snap.penalties, 1);
        assert_eq!(snap.total_ms, 5_250);
    }

    #[tokio::test(start_paused = true)]
    async fn test_over_limit_boundary() {
        let mut s = session();
        let t0 = Instant::now();
        s.start("A", t0).unwrap();

        assert!(!s.over_limit(t0 + Duration::from_millis(119_999)));
        assert!(s.over_limit(t0 + Duration::from_millis(120_000)));
        assert!(s.over_limit(t0 + Duration::from_millis(120_001)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_when_idle_is_rejected() {
        let mut s = session();
        assert!(matches!(
            s.finish(Instant::now()),
            Err(MissionError::NotRunning)
        ));
        assert_eq!(s.phase(), MissionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_during_submission_is_rejected() {
        let mut s = session();
        let now = Instant::now();
        s.start("A", now).unwrap();
        s.finish(now).unwrap();
        assert_eq!(s.phase(), MissionPhase::Submitting);

        assert!(matches!(
            s.start("B", now),
            Err(MissionError::SubmissionPending)
        ));

        s.submitted();
        assert_eq!(s.phase(), MissionPhase::Idle);
        s.start("B", now).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_always_returns_to_idle() {
        let mut s = session();
        let now = Instant::now();

        s.reset();
        assert_eq!(s.phase(), MissionPhase::Idle);

        s.start("A", now).unwrap();
        s.record_interrupt();
        s.reset();
        assert_eq!(s.phase(), MissionPhase::Idle);

        // Penalties were cleared along with the rest of the mission.
        s.start("B", now).unwrap();
        assert_eq!(s.record_interrupt(), Some(1));
    }
}
