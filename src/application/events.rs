//! Negotiation event fan-out

use crate::domain::shared::events::RoapEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Event broadcaster
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<RoapEvent>,
}

impl EventBroadcaster {
    /// Create a broadcaster buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event
    pub fn publish(&self, event: RoapEvent) {
        debug!("Publishing {}", event.metadata.event_type);
        // Ignore send errors (no receivers)
        let _ = self.tx.send(event);
    }

    /// Subscribe to events published from now on.
    ///
    /// A receiver more than `capacity` events behind loses the oldest ones
    /// and sees `RecvError::Lagged`.
    pub fn subscribe(&self) -> broadcast::Receiver<RoapEvent> {
        self.tx.subscribe()
    }

    /// Get number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::events::NegotiationEvent;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let broadcaster = EventBroadcaster::new(8);
        broadcaster.publish(RoapEvent::new(NegotiationEvent::Started));

        let mut rx = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.publish(RoapEvent::new(NegotiationEvent::Done));
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event, NegotiationEvent::Done);
        assert_eq!(event.metadata.event_type, "negotiation.done");
    }

    #[tokio::test]
    async fn test_slow_subscriber_lags() {
        let broadcaster = EventBroadcaster::new(1);
        let mut rx = broadcaster.subscribe();

        broadcaster.publish(RoapEvent::new(NegotiationEvent::Started));
        broadcaster.publish(RoapEvent::new(NegotiationEvent::Done));

        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(1))
        ));
        assert_eq!(rx.recv().await.unwrap().event, NegotiationEvent::Done);
    }
}
