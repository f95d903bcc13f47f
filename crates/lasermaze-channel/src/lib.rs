//! Real-time interrupt channel for Lasermaze.
//!
//! The channel is a one-way, best-effort fan-out: interrupt sources
//! (the sensor bridge, the test endpoint) publish [`InterruptEvent`]s and
//! every connected timer session receives them. There is no acknowledgment
//! and no backpressure: a session that is not running discards the event,
//! and a subscriber that falls behind loses the oldest events rather than
//! stalling the publisher.
//!
//! The subscriber registry is explicit: [`InterruptHub::subscribe`] adds a
//! receiver, dropping the receiver removes it. Nothing is replayed to late
//! or reconnecting subscribers.

use lasermaze_protocol::InterruptEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Default ring-buffer capacity per subscriber. Interrupts are rare (a
/// human tripping a laser), so a small buffer is plenty.
pub const DEFAULT_CAPACITY: usize = 64;

/// Handle to the interrupt broadcast channel.
///
/// Cheap to clone; every clone publishes into and subscribes to the same
/// underlying channel. The server owns one hub and hands clones to the
/// HTTP layer, the sensor bridge, and each connection handler.
#[derive(Debug, Clone)]
pub struct InterruptHub {
    tx: broadcast::Sender<InterruptEvent>,
}

impl InterruptHub {
    /// Creates a hub with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an interrupt to all current subscribers.
    ///
    /// Returns the number of subscribers the event was delivered to.
    /// Zero subscribers is not an error; the event is simply dropped,
    /// same as an interrupt firing while nobody is timing.
    pub fn publish(&self, event: InterruptEvent) -> usize {
        match self.tx.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                debug!("interrupt published with no subscribers, dropped");
                0
            }
        }
    }

    /// Registers a new subscriber.
    ///
    /// The receiver only sees events published after this call. Dropping
    /// it deregisters the subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<InterruptEvent> {
        self.tx.subscribe()
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for InterruptHub {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(at: u64) -> InterruptEvent {
        InterruptEvent { at, source: None }
    }

    #[tokio::test]
    async fn test_publish_reaches_all_subscribers() {
        let hub = InterruptHub::default();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.publish(event(1)), 2);

        assert_eq!(a.recv().await.unwrap().at, 1);
        assert_eq!(b.recv().await.unwrap().at, 1);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let hub = InterruptHub::default();
        assert_eq!(hub.publish(event(1)), 0);
    }

    #[tokio::test]
    async fn test_subscriber_sees_events_in_emission_order() {
        let hub = InterruptHub::default();
        let mut rx = hub.subscribe();

        for at in 1..=5 {
            hub.publish(event(at));
        }
        for at in 1..=5 {
            assert_eq!(rx.recv().await.unwrap().at, at);
        }
    }

    #[tokio::test]
    async fn test_drop_deregisters_subscriber() {
        let hub = InterruptHub::default();
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_replay() {
        let hub = InterruptHub::default();
        let mut early = hub.subscribe();
        hub.publish(event(1));

        let mut late = hub.subscribe();
        hub.publish(event(2));

        assert_eq!(early.recv().await.unwrap().at, 1);
        assert_eq!(early.recv().await.unwrap().at, 2);
        // The late subscriber only sees the second event.
        assert_eq!(late.recv().await.unwrap().at, 2);
        assert!(late.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_clone_publishes_into_same_channel() {
        let hub = InterruptHub::default();
        let clone = hub.clone();
        let mut rx = hub.subscribe();

        clone.publish(event(9));
        assert_eq!(rx.recv().await.unwrap().at, 9);
    }
}
