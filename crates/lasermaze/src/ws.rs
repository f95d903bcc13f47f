//! The real-time channel: one WebSocket per client, one mission actor
//! per WebSocket.
//!
//! Each connection gets its own timer session. Interrupts are global,
//! every session subscribes to the interrupt hub, but start, finish
//! and reset act only on the connection's own mission. The raw
//! `Interrupt` event is also forwarded to every client regardless of
//! mission state, so an idle scoreboard display still blinks when a
//! beam trips.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use lasermaze_board::Leaderboard;
use lasermaze_mission::{
    spawn_mission, MissionError, MissionHandle, MissionOutcome, ScoreSink, SubmitError,
};
use lasermaze_protocol::{ClientCommand, Codec, InterruptEvent, JsonCodec, ServerEvent};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

use crate::AppState;

pub(crate) async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_session(socket, state))
}

/// Persists finished missions straight into the leaderboard.
struct BoardSink(Arc<Leaderboard>);

impl ScoreSink for BoardSink {
    fn submit(
        &self,
        outcome: &MissionOutcome,
    ) -> impl std::future::Future<Output = Result<(), SubmitError>> + Send {
        let board = Arc::clone(&self.0);
        let name = outcome.name.clone();
        let total_ms = outcome.total_ms;
        async move {
            board
                .insert(&name, total_ms as f64)
                .await
                .map(|_| ())
                .map_err(|e| SubmitError::new(e.to_string()))
        }
    }
}

async fn handle_session(socket: WebSocket, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let codec = JsonCodec;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mission = spawn_mission(
        state.mission_config,
        BoardSink(Arc::clone(&state.board)),
        state.hub.subscribe(),
        event_tx,
    );

    // A second subscription, for forwarding raw interrupts to the
    // client independently of mission state.
    let mut raw_interrupts = Some(state.hub.subscribe());

    debug!("websocket session opened");

    loop {
        tokio::select! {
            msg = ws_rx.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let event = match codec.decode::<ClientCommand>(text.as_str()) {
                        Ok(cmd) => dispatch(&mission, cmd).await,
                        Err(e) => {
                            debug!(error = %e, "unreadable client command");
                            Some(ServerEvent::Error {
                                code: 400,
                                message: e.to_string(),
                            })
                        }
                    };
                    if let Some(event) = event {
                        if send_event(&mut ws_tx, &codec, &event).await.is_err() {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // ping/pong/binary: nothing to do
                Some(Err(e)) => {
                    debug!(error = %e, "websocket receive failed");
                    break;
                }
            },

            event = event_rx.recv() => match event {
                Some(event) => {
                    if send_event(&mut ws_tx, &codec, &event).await.is_err() {
                        break;
                    }
                }
                // The mission actor is gone; nothing left to relay.
                None => break,
            },

            received = next_interrupt(&mut raw_interrupts) => match received {
                Ok(interrupt) => {
                    let event = ServerEvent::from(interrupt);
                    if send_event(&mut ws_tx, &codec, &event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "client fell behind on interrupt notifications");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    raw_interrupts = None;
                }
            },
        }
    }

    debug!("websocket session closed");
    // Dropping `mission` here closes the command channel and stops the
    // actor.
    drop(mission);
}

/// Runs one client command against the connection's mission. Errors
/// become `Error` events for the client; successes are reported through
/// the actor's own event stream.
async fn dispatch(mission: &MissionHandle, cmd: ClientCommand) -> Option<ServerEvent> {
    let result = match cmd {
        ClientCommand::Start { name } => mission.start(&name).await,
        ClientCommand::Finish => mission.finish().await,
        ClientCommand::Reset => mission.reset().await,
    };
    result.err().map(|e| ServerEvent::Error {
        code: error_code(&e),
        message: e.to_string(),
    })
}

fn error_code(err: &MissionError) -> u16 {
    match err {
        MissionError::EmptyName => 400,
        MissionError::AlreadyRunning
        | MissionError::SubmissionPending
        | MissionError::NotRunning => 409,
        MissionError::Unavailable => 503,
    }
}

async fn send_event(
    ws_tx: &mut (impl SinkExt<Message> + Unpin),
    codec: &JsonCodec,
    event: &ServerEvent,
) -> Result<(), ()> {
    let json = match codec.encode(event) {
        Ok(json) => json,
        Err(e) => {
            // Should never happen for our own types; drop the event.
            warn!(error = %e, "failed to encode server event");
            return Ok(());
        }
    };
    ws_tx.send(Message::Text(json.into())).await.map_err(|_| ())
}

/// Receives the next hub interrupt, or pends forever once the feed is
/// gone.
async fn next_interrupt(
    rx: &mut Option<broadcast::Receiver<InterruptEvent>>,
) -> Result<InterruptEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
