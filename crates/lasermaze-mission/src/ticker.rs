//! Fixed-interval tick source for the mission actor.
//!
//! Designed to sit inside the actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         _ = ticker.wait() => { /* publish display tick */ }
//!     }
//! }
//! ```
//!
//! While disarmed (no mission running) `wait` pends forever, so the
//! `select!` simply never takes that branch. Arming schedules the first
//! tick one interval from now. A late wake reschedules from "now" rather
//! than the missed deadline; display ticks have no catch-up semantics.

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::trace;

/// Repeating tick aligned to a fixed interval, armed only while a
/// mission runs.
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next: None,
        }
    }

    /// Starts ticking. The first tick fires one interval from now.
    pub fn arm(&mut self) {
        self.next = Some(Instant::now() + self.interval);
        trace!(interval_ms = self.interval.as_millis() as u64, "ticker armed");
    }

    /// Stops ticking. `wait` pends until the next `arm`.
    pub fn disarm(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Resolves when the next tick is due; pends forever while disarmed.
    pub async fn wait(&mut self) {
        let Some(deadline) = self.next else {
            std::future::pending::<()>().await;
            unreachable!()
        };
        time::sleep_until(deadline).await;
        // Schedule from now, not from the deadline: if a tick ran late we
        // skip ahead instead of firing a burst of stale ticks.
        self.next = Some(Instant::now() + self.interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_ticker_pends() {
        let mut t = Ticker::new(Duration::from_millis(50));
        assert!(!t.is_armed());
        let result = time::timeout(Duration::from_secs(5), t.wait()).await;
        assert!(result.is_err(), "disarmed ticker should pend forever");
    }

    #[tokio::test(start_paused = true)]
    async fn test_armed_ticker_fires_each_interval() {
        let mut t = Ticker::new(Duration::from_millis(50));
        t.arm();

        let start = Instant::now();
        for i in 1..=3u32 {
            t.wait().await;
            assert_eq!(
                Instant::now().duration_since(start),
                Duration::from_millis(50 * u64::from(i))
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_stops_ticks() {
        let mut t = Ticker::new(Duration::from_millis(50));
        t.arm();
        t.wait().await;
        t.disarm();

        let result = time::timeout(Duration::from_secs(1), t.wait()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_resets_deadline() {
        let mut t = Ticker::new(Duration::from_millis(50));
        t.arm();
        time::advance(Duration::from_millis(30)).await;
        t.arm();

        let start = Instant::now();
        t.wait().await;
        assert_eq!(Instant::now().duration_since(start), Duration::from_millis(50));
    }
}
