//! Core protocol types for Lasermaze's wire format.
//!
//! Every type here is serialized as tagged JSON with a `type` discriminator
//! and camelCase field names, matching what the browser presentation layer
//! and the leaderboard API already use (`timeMs`, `elapsedMs`, ...).

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch. Wall-clock `at` stamps on wire
/// events use this; the mission engine itself measures with a monotonic
/// clock and never trusts these values.
pub fn unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// InterruptEvent
// ---------------------------------------------------------------------------

/// A single penalty-triggering notification from a sensor or simulated
/// source. This is the one payload the real-time channel carries.
///
/// Fire-and-forget: there is no acknowledgment, and a session that is not
/// running simply discards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterruptEvent {
    /// Wall-clock emission time, milliseconds since the Unix epoch.
    pub at: u64,

    /// Where the interrupt came from (`"test"` for the simulation
    /// endpoint, absent for the physical sensor).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl InterruptEvent {
    /// Creates an event stamped with the current wall-clock time.
    pub fn now(source: Option<&str>) -> Self {
        Self {
            at: unix_ms(),
            source: source.map(str::to_owned),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientCommand: presentation layer to server
// ---------------------------------------------------------------------------

/// Commands a timer client can send over its connection.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "Start", "name": "AGENT1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Begin a mission for the named player.
    Start { name: String },

    /// Stop the clock and submit the result to the leaderboard.
    Finish,

    /// Abandon the current mission and return to idle.
    Reset,
}

// ---------------------------------------------------------------------------
// ServerEvent: server to presentation layer
// ---------------------------------------------------------------------------

/// Events pushed to a timer client.
///
/// `Interrupt` is broadcast to every connected client; the rest describe
/// the client's own mission session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// A penalty-triggering interrupt, forwarded to all clients so each
    /// can flash/alert regardless of its own session phase.
    #[serde(rename_all = "camelCase")]
    Interrupt {
        at: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    /// A mission started for this session.
    #[serde(rename_all = "camelCase")]
    Started { name: String, at: u64 },

    /// Periodic display refresh while the mission runs.
    #[serde(rename_all = "camelCase")]
    Tick {
        elapsed_ms: u64,
        total_ms: u64,
        penalties: u32,
    },

    /// An interrupt landed while this session was running: the penalty
    /// counter moved.
    #[serde(rename_all = "camelCase")]
    Penalty {
        penalties: u32,
        at: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source: Option<String>,
    },

    /// The mission ended (manual or auto finish). Final figures are frozen
    /// at the instant of invocation; a `Saved`/`SaveFailed` event follows.
    #[serde(rename_all = "camelCase")]
    Finished {
        name: String,
        elapsed_ms: u64,
        penalties: u32,
        total_ms: u64,
    },

    /// The result landed on the leaderboard; show the ranked board.
    Saved,

    /// Submission failed; the result is discarded and the session is idle
    /// again.
    #[serde(rename_all = "camelCase")]
    SaveFailed { message: String },

    /// The session returned to idle without submitting.
    Reset,

    /// Degraded operation, e.g. automatic penalty detection lost.
    #[serde(rename_all = "camelCase")]
    Warning { message: String },

    /// A rejected command. `code` follows HTTP conventions (400 invalid,
    /// 409 wrong phase, 503 engine gone).
    #[serde(rename_all = "camelCase")]
    Error { code: u16, message: String },
}

impl From<InterruptEvent> for ServerEvent {
    fn from(event: InterruptEvent) -> Self {
        Self::Interrupt {
            at: event.at,
            source: event.source,
        }
    }
}

#[cfg(test)]
mod tests {
    //! The wire format is consumed by a JavaScript presentation layer, so
    //! these tests pin the exact JSON shapes.

    use super::*;
    use serde_json::{json, Value};

    fn to_value<T: Serialize>(value: &T) -> Value {
        serde_json::to_value(value).expect("serializes")
    }

    #[test]
    fn test_interrupt_event_with_source() {
        let event = InterruptEvent {
            at: 1234,
            source: Some("test".into()),
        };
        assert_eq!(
            to_value(&event),
            json!({ "at": 1234, "source": "test" })
        );
    }

    #[test]
    fn test_interrupt_event_omits_absent_source() {
        let event = InterruptEvent {
            at: 99,
            source: None,
        };
        assert_eq!(to_value(&event), json!({ "at": 99 }));
    }

    #[test]
    fn test_interrupt_event_decodes_without_source() {
        let event: InterruptEvent =
            serde_json::from_str(r#"{ "at": 42 }"#).expect("decodes");
        assert_eq!(event.at, 42);
        assert_eq!(event.source, None);
    }

    #[test]
    fn test_client_command_start_shape() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{ "type": "Start", "name": "AGENT1" }"#)
                .expect("decodes");
        assert_eq!(
            cmd,
            ClientCommand::Start {
                name: "AGENT1".into()
            }
        );
    }

    #[test]
    fn test_client_command_unit_variants() {
        let finish: ClientCommand =
            serde_json::from_str(r#"{ "type": "Finish" }"#).expect("decodes");
        assert_eq!(finish, ClientCommand::Finish);

        let reset: ClientCommand =
            serde_json::from_str(r#"{ "type": "Reset" }"#).expect("decodes");
        assert_eq!(reset, ClientCommand::Reset);
    }

    #[test]
    fn test_tick_event_uses_camel_case_fields() {
        let event = ServerEvent::Tick {
            elapsed_ms: 3000,
            total_ms: 13000,
            penalties: 2,
        };
        assert_eq!(
            to_value(&event),
            json!({
                "type": "Tick",
                "elapsedMs": 3000,
                "totalMs": 13000,
                "penalties": 2
            })
        );
    }

    #[test]
    fn test_saved_event_is_bare_tag() {
        assert_eq!(to_value(&ServerEvent::Saved), json!({ "type": "Saved" }));
    }

    #[test]
    fn test_interrupt_event_into_server_event() {
        let event = InterruptEvent {
            at: 7,
            source: Some("test".into()),
        };
        let server: ServerEvent = event.into();
        assert_eq!(
            to_value(&server),
            json!({ "type": "Interrupt", "at": 7, "source": "test" })
        );
    }

    #[test]
    fn test_unix_ms_is_monotonic_enough() {
        let a = unix_ms();
        let b = unix_ms();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000, "expected a post-2020 timestamp");
    }
}
