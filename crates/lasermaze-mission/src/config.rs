//! Mission engine configuration.

use std::time::Duration;

/// Timing constants for a mission.
///
/// The defaults are the game's rules: +5 s per interrupt, a 2-minute
/// mission cap, and a 50 ms display tick.
#[derive(Debug, Clone)]
pub struct MissionConfig {
    /// Time added to the total per interrupt, in milliseconds.
    pub penalty_ms: u64,

    /// Maximum mission duration. When `elapsed_ms` reaches this the
    /// engine finishes the mission automatically, through the same path
    /// as a manual finish.
    pub max_duration_ms: u64,

    /// Interval of the display tick while a mission runs.
    pub tick_interval: Duration,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            penalty_ms: 5_000,
            max_duration_ms: 120_000,
            tick_interval: Duration::from_millis(50),
        }
    }
}

impl MissionConfig {
    /// Clamp out-of-range values so the config is safe to use.
    ///
    /// Called by [`spawn_mission`](crate::spawn_mission). A zero tick
    /// interval would spin the actor; it falls back to the default.
    pub fn validated(mut self) -> Self {
        if self.tick_interval.is_zero() {
            tracing::warn!("tick_interval of zero, falling back to 50ms");
            self.tick_interval = Duration::from_millis(50);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_game_rules() {
        let config = MissionConfig::default();
        assert_eq!(config.penalty_ms, 5_000);
        assert_eq!(config.max_duration_ms, 120_000);
        assert_eq!(config.tick_interval, Duration::from_millis(50));
    }

    #[test]
    fn test_validated_fixes_zero_tick_interval() {
        let config = MissionConfig {
            tick_interval: Duration::ZERO,
            ..Default::default()
        }
        .validated();
        assert_eq!(config.tick_interval, Duration::from_millis(50));
    }
}
