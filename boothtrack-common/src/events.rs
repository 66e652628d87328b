//! Event types and EventBus for real-time fan-out
//!
//! The EventBus uses tokio::broadcast internally: bounded ring buffer,
//! never blocks the sender on slow consumers, laggards drop old events.
//! Subscribers treat events as "re-fetch" signals, not state carriers, so
//! a dropped event costs one redundant refresh at most.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events broadcast to connected dashboard clients.
///
/// Serialized for SSE transmission; the event tag is the contract, the
/// payload is advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BoothEvent {
    /// A new session was durably stored; clients should re-fetch the
    /// session list via the read path.
    DataUpdated {
        /// When the write was confirmed
        timestamp: DateTime<Utc>,
    },
}

impl BoothEvent {
    /// SSE event name for this event
    pub fn event_type(&self) -> &'static str {
        match self {
            BoothEvent::DataUpdated { .. } => "data_updated",
        }
    }
}

/// One-to-many event broadcaster shared by the ingestion path and every
/// connected SSE client.
pub struct EventBus {
    tx: broadcast::Sender<BoothEvent>,
    capacity: usize,
}

impl EventBus {
    /// Create a new EventBus buffering up to `capacity` events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events.
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<BoothEvent> {
        self.tx.subscribe()
    }

    /// Number of currently connected subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)`, or `Err` if no subscriber is
    /// listening.
    pub fn emit(
        &self,
        event: BoothEvent,
    ) -> Result<usize, broadcast::error::SendError<BoothEvent>> {
        self.tx.send(event)
    }

    /// Best-effort emit: a quiet channel (zero subscribers) is not an error.
    ///
    /// This is the variant the ingestion path uses after a confirmed write;
    /// notification failure must never fail the request.
    pub fn emit_lossy(&self, event: BoothEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_updated() -> BoothEvent {
        BoothEvent::DataUpdated {
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_bus_has_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.capacity(), 16);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn subscribe_increments_count() {
        let bus = EventBus::new(16);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn emit_without_subscribers_errors() {
        let bus = EventBus::new(16);
        assert!(bus.emit(data_updated()).is_err());
    }

    #[test]
    fn emit_lossy_without_subscribers_is_silent() {
        let bus = EventBus::new(16);
        bus.emit_lossy(data_updated());
    }

    #[tokio::test]
    async fn emit_reaches_every_subscriber() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.emit(data_updated()).unwrap(), 2);

        assert!(matches!(
            rx1.recv().await.unwrap(),
            BoothEvent::DataUpdated { .. }
        ));
        assert!(matches!(
            rx2.recv().await.unwrap(),
            BoothEvent::DataUpdated { .. }
        ));
    }

    #[test]
    fn data_updated_serializes_with_type_tag() {
        let json = serde_json::to_value(data_updated()).unwrap();
        assert_eq!(json["type"], "DataUpdated");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn event_type_matches_wire_name() {
        assert_eq!(data_updated().event_type(), "data_updated");
    }
}
