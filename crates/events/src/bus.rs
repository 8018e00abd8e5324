//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] fans [`ProgressNotice`]s out to every live subscriber. It is
//! designed to be shared via `Arc` across the application.

use blueprint_core::progress::ProgressEvent;
use blueprint_core::types::EntityId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// ProgressNotice
// ---------------------------------------------------------------------------

/// A progress event tagged with its project and a hub-wide sequence number.
///
/// Sequence numbers strictly increase in publish order and double as SSE
/// event ids, so a reconnecting client can resume after the last one it saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressNotice {
    pub project_id: EntityId,
    pub seq: u64,
    pub event: ProgressEvent,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ProgressNotice`].
pub struct EventBus {
    sender: broadcast::Sender<ProgressNotice>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notice to all current subscribers.
    ///
    /// If there are no active subscribers the notice is silently dropped;
    /// the hub's replay log still has it.
    pub fn publish(&self, notice: ProgressNotice) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(notice);
    }

    /// Subscribe to all notices published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressNotice> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use blueprint_core::progress::ProgressStage;

    use super::*;

    fn notice(project: &str, seq: u64) -> ProgressNotice {
        ProgressNotice {
            project_id: project.to_string(),
            seq,
            event: ProgressEvent::new(ProgressStage::Extracting, "Analyzing"),
        }
    }

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(notice("project_1", 1));

        let received = rx.recv().await.expect("should receive notice");
        assert_eq!(received.project_id, "project_1");
        assert_eq!(received.seq, 1);
    }

    #[tokio::test]
    async fn every_subscriber_gets_every_notice() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(notice("project_1", 1));
        bus.publish(notice("project_2", 2));

        for rx in [&mut rx1, &mut rx2] {
            assert_eq!(rx.recv().await.unwrap().seq, 1);
            assert_eq!(rx.recv().await.unwrap().seq, 2);
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(notice("project_1", 1));
    }

    #[tokio::test]
    async fn slow_receiver_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for seq in 1..=5 {
            bus.publish(notice("project_1", seq));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[test]
    fn notice_serializes_event_fields() {
        let json = serde_json::to_value(notice("project_1", 7)).unwrap();
        assert_eq!(json["seq"], 7);
        assert_eq!(json["event"]["type"], "extracting");
    }
}
