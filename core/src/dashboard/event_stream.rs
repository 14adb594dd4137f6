// Outbound event streaming
//
// Uses a tokio broadcast channel to push component updates to every connected socket

use crate::event::ServerMessage;
use tokio::sync::broadcast;
use tracing::trace;

/// Broadcaster shared by all components that push data to clients
#[derive(Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<ServerMessage>,
}

impl EventBroadcaster {
    /// Create a new broadcaster with buffer size
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send a message to all connected clients; returns how many received it
    pub fn broadcast(&self, message: ServerMessage) -> usize {
        match self.sender.send(message) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(message)) => {
                // No client connected yet
                trace!(target: "dashboard", event = %message.event, "Dropped message without subscribers");
                0
            }
        }
    }

    /// Subscribe to messages
    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.sender.subscribe()
    }

    /// Get number of connected receivers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentId;
    use serde_json::json;

    #[test]
    fn counts_subscribers_and_drops_without_them() {
        let broadcaster = EventBroadcaster::new(8);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.broadcast(ServerMessage::new(ComponentId(1), "all", json!({}))), 0);

        let first = broadcaster.subscribe();
        let _second = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);
        assert_eq!(broadcaster.broadcast(ServerMessage::new(ComponentId(1), "all", json!({}))), 2);

        drop(first);
        assert_eq!(broadcaster.subscriber_count(), 1);
    }
}
