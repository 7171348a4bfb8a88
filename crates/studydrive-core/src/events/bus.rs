//! In-process event bus for single-node deployments.

use tokio::sync::broadcast;

use crate::events::DomainEvent;

/// Default buffer size for the broadcast channel.
const DEFAULT_BUFFER: usize = 256;

/// In-process publish/subscribe channel for [`DomainEvent`]s.
///
/// Subscribers attach with [`EventBus::subscribe`] and detach by dropping
/// the returned receiver. Publishing is non-blocking and succeeds whether
/// or not anyone is listening; slow subscribers may observe
/// [`broadcast::error::RecvError::Lagged`] and should resynchronize by
/// re-reading current state.
#[derive(Debug, Clone)]
pub struct EventBus {
    /// Broadcast sender shared by all clones of the bus.
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a new event bus with the given channel buffer size.
    pub fn with_buffer(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // A send error only means there are no subscribers right now.
        let _ = self.tx.send(event);
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventPayload, FolderEvent};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::new(
            None,
            EventPayload::Folder(FolderEvent::Renamed {
                folder_id: Uuid::new_v4(),
                name: "Notes".to_string(),
            }),
        ));
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let folder_id = Uuid::new_v4();
        bus.publish(DomainEvent::new(
            Some(Uuid::new_v4()),
            EventPayload::Folder(FolderEvent::Renamed {
                folder_id,
                name: "Homework".to_string(),
            }),
        ));

        let event = rx.recv().await.expect("event delivered");
        match event.payload {
            EventPayload::Folder(FolderEvent::Renamed { folder_id: id, .. }) => {
                assert_eq!(id, folder_id);
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
