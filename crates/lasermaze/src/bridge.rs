//! Serial sensor bridge.
//!
//! The maze hardware reports over a line-oriented serial protocol:
//! `INT` (or `INTERRUPT`) when a beam is tripped, `STATE:<text>` for
//! status chatter. The device node is opened as a plain file; line
//! discipline and baud are left to the host's serial configuration.
//!
//! The bridge is strictly one-way and best-effort: a missing or dying
//! device is logged, never fatal.

use lasermaze_channel::InterruptHub;
use lasermaze_protocol::InterruptEvent;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

pub(crate) async fn run(device: String, hub: InterruptHub) {
    let file = match File::open(&device).await {
        Ok(file) => file,
        Err(e) => {
            warn!(device, error = %e, "serial bridge unavailable");
            return;
        }
    };
    info!(device, "serial bridge connected");
    pump_lines(BufReader::new(file), &hub).await;
    warn!(device, "serial bridge stream ended");
}

async fn pump_lines<R: AsyncBufRead + Unpin>(reader: R, hub: &InterruptHub) {
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => handle_line(line.trim(), hub),
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "serial read failed");
                break;
            }
        }
    }
}

fn handle_line(line: &str, hub: &InterruptHub) {
    if line.is_empty() {
        return;
    }
    let upper = line.to_ascii_uppercase();
    if upper == "INT" || upper == "INTERRUPT" {
        let delivered = hub.publish(InterruptEvent::now(None));
        info!(delivered, "sensor interrupt");
    } else if upper.starts_with("STATE:") {
        // Status chatter from the controller; informational only.
        let state = line.split_once(':').map(|(_, s)| s.trim()).unwrap_or("");
        info!(state, "sensor state");
    } else {
        debug!(line, "unrecognized sensor line");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pump(input: &[u8], hub: &InterruptHub) {
        pump_lines(BufReader::new(input), hub).await;
    }

    #[tokio::test]
    async fn test_interrupt_lines_publish() {
        let hub = InterruptHub::default();
        let mut rx = hub.subscribe();

        pump(b"INT\ninterrupt\nInt\n", &hub).await;

        for _ in 0..3 {
            rx.try_recv().unwrap();
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_state_and_noise_lines_do_not_publish() {
        let hub = InterruptHub::default();
        let mut rx = hub.subscribe();

        pump(b"STATE: armed\n\ngarbage line\nINTRO\n", &hub).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_lines_are_trimmed() {
        let hub = InterruptHub::default();
        let mut rx = hub.subscribe();

        pump(b"  INT  \r\n", &hub).await;

        rx.try_recv().unwrap();
    }
}
