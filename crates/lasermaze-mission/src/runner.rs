//! Mission actor: an isolated Tokio task that owns one session.
//!
//! Each timer session runs in its own task, communicating with the
//! outside world through channels. This is the actor model: no shared
//! mutable state, just message passing. The actor has three inputs:
//!
//! - a command channel (start/finish/reset from the presentation layer),
//! - a [`Ticker`] armed only while the mission runs,
//! - an interrupt subscription from the real-time channel.
//!
//! Because all three are serialized through one `select!` loop, a
//! tick-driven auto-finish and a concurrently arriving interrupt can
//! never race on the penalty counter.

use lasermaze_protocol::{unix_ms, InterruptEvent, ServerEvent};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::{MissionConfig, MissionError, MissionSession, ScoreSink, Ticker};

/// Channel sender for delivering events to the presentation layer.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a mission actor through its channel.
///
/// The `oneshot::Sender` is a reply channel: the caller sends a command
/// and waits for the response on it.
enum MissionCommand {
    Start {
        name: String,
        reply: oneshot::Sender<Result<(), MissionError>>,
    },
    Finish {
        reply: oneshot::Sender<Result<(), MissionError>>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running mission actor. Cheap to clone.
///
/// Dropping every handle closes the command channel and shuts the actor
/// down.
#[derive(Clone)]
pub struct MissionHandle {
    tx: mpsc::Sender<MissionCommand>,
}

impl MissionHandle {
    /// Starts a mission for the named player.
    pub async fn start(&self, name: &str) -> Result<(), MissionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(MissionCommand::Start {
                name: name.to_owned(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| MissionError::Unavailable)?;
        reply_rx.await.map_err(|_| MissionError::Unavailable)?
    }

    /// Finishes the running mission and submits its result.
    pub async fn finish(&self) -> Result<(), MissionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(MissionCommand::Finish { reply: reply_tx })
            .await
            .map_err(|_| MissionError::Unavailable)?;
        reply_rx.await.map_err(|_| MissionError::Unavailable)?
    }

    /// Abandons the current mission. Always succeeds (if the actor is
    /// still alive).
    pub async fn reset(&self) -> Result<(), MissionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(MissionCommand::Reset { reply: reply_tx })
            .await
            .map_err(|_| MissionError::Unavailable)?;
        reply_rx.await.map_err(|_| MissionError::Unavailable)
    }
}

/// Spawns a mission actor task and returns a handle to it.
///
/// `interrupts` is a subscription from the real-time channel; `events`
/// carries everything the presentation layer should render.
pub fn spawn_mission<S: ScoreSink>(
    config: MissionConfig,
    sink: S,
    interrupts: broadcast::Receiver<InterruptEvent>,
    events: EventSender,
) -> MissionHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(16);

    let actor = MissionActor {
        ticker: Ticker::new(config.tick_interval),
        session: MissionSession::new(config),
        sink,
        interrupts: Some(interrupts),
        events,
        rx,
    };

    tokio::spawn(actor.run());

    MissionHandle { tx }
}

/// The internal actor state. Runs inside a Tokio task.
struct MissionActor<S: ScoreSink> {
    session: MissionSession,
    ticker: Ticker,
    sink: S,
    /// `None` once the interrupt channel is gone; the session keeps
    /// working manually, without automatic penalty detection.
    interrupts: Option<broadcast::Receiver<InterruptEvent>>,
    events: EventSender,
    rx: mpsc::Receiver<MissionCommand>,
}

impl<S: ScoreSink> MissionActor<S> {
    async fn run(mut self) {
        debug!("mission actor started");

        loop {
            tokio::select! {
                cmd = self.rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    // All handles dropped: the session is over.
                    None => break,
                },
                _ = self.ticker.wait() => self.handle_tick().await,
                received = next_interrupt(&mut self.interrupts) => {
                    self.handle_interrupt(received);
                }
            }
        }

        debug!("mission actor stopped");
    }

    async fn handle_command(&mut self, cmd: MissionCommand) {
        match cmd {
            MissionCommand::Start { name, reply } => {
                let result = self.session.start(&name, Instant::now());
                if result.is_ok() {
                    self.ticker.arm();
                    info!(name = %self.session.player_name().unwrap_or(""), "mission started");
                    self.emit(ServerEvent::Started {
                        name: name.trim().to_owned(),
                        at: unix_ms(),
                    });
                    self.emit_tick(Instant::now());
                }
                let _ = reply.send(result);
            }
            MissionCommand::Finish { reply } => {
                let result = self.finish_mission().await;
                let _ = reply.send(result);
            }
            MissionCommand::Reset { reply } => {
                self.ticker.disarm();
                self.session.reset();
                info!("mission reset");
                self.emit(ServerEvent::Reset);
                let _ = reply.send(());
            }
        }
    }

    async fn handle_tick(&mut self) {
        let now = Instant::now();
        self.emit_tick(now);
        if self.session.over_limit(now) {
            info!("maximum mission duration reached, auto-finishing");
            // Same path as a manual finish; errors can't occur here
            // because over_limit implies Running.
            if let Err(e) = self.finish_mission().await {
                warn!(error = %e, "auto-finish failed");
            }
        }
    }

    fn handle_interrupt(
        &mut self,
        received: Result<InterruptEvent, broadcast::error::RecvError>,
    ) {
        let event = match received {
            Ok(event) => event,
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                // Best-effort channel: lost notifications are not replayed.
                warn!(missed, "interrupt feed lagged, notifications dropped");
                return;
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("interrupt feed closed, automatic penalty detection disabled");
                self.interrupts = None;
                self.emit(ServerEvent::Warning {
                    message: "interrupt channel unavailable, penalties must be \
                              tracked manually"
                        .to_owned(),
                });
                return;
            }
        };

        match self.session.record_interrupt() {
            Some(penalties) => {
                info!(penalties, "penalty applied (+{}ms)", self.session.config().penalty_ms);
                self.emit(ServerEvent::Penalty {
                    penalties,
                    at: event.at,
                    source: event.source,
                });
                self.emit_tick(Instant::now());
            }
            None => trace!("interrupt ignored, no mission running"),
        }
    }

    /// The one finish path, shared by manual finish and auto-finish.
    ///
    /// Figures are frozen at the instant of invocation; the submission
    /// await happens afterwards, with further interrupts harmless.
    async fn finish_mission(&mut self) -> Result<(), MissionError> {
        let outcome = self.session.finish(Instant::now())?;
        self.ticker.disarm();

        info!(
            name = %outcome.name,
            elapsed_ms = outcome.elapsed_ms,
            penalties = outcome.penalties,
            total_ms = outcome.total_ms,
            "mission finished"
        );
        self.emit(ServerEvent::Finished {
            name: outcome.name.clone(),
            elapsed_ms: outcome.elapsed_ms,
            penalties: outcome.penalties,
            total_ms: outcome.total_ms,
        });

        match self.sink.submit(&outcome).await {
            Ok(()) => {
                info!(name = %outcome.name, "result saved to leaderboard");
                self.emit(ServerEvent::Saved);
            }
            Err(e) => {
                // The timed result is discarded: no retry, no requeue.
                warn!(error = %e, "leaderboard submission failed, result discarded");
                self.emit(ServerEvent::SaveFailed {
                    message: e.to_string(),
                });
            }
        }
        self.session.submitted();
        Ok(())
    }

    fn emit_tick(&self, now: Instant) {
        if let Some(snap) = self.session.snapshot(now) {
            self.emit(ServerEvent::Tick {
                elapsed_ms: snap.elapsed_ms,
                total_ms: snap.total_ms,
                penalties: snap.penalties,
            });
        }
    }

    /// Sends an event to the presentation layer. Silently drops it if the
    /// receiver is gone (client disconnected).
    fn emit(&self, event: ServerEvent) {
        let _ = self.events.send(event);
    }
}

/// Receives the next interrupt, or pends forever once the feed is gone.
async fn next_interrupt(
    rx: &mut Option<broadcast::Receiver<InterruptEvent>>,
) -> Result<InterruptEvent, broadcast::error::RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
