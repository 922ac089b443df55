use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Registry of per-session broadcast hubs backing the SSE mirror streams.
///
/// Hubs are created lazily when the first subscriber or broadcaster touches a
/// session and pruned once the last subscriber disconnects.
pub struct SessionStreams {
    hubs: DashMap<String, Arc<SseHub>>,
    capacity: usize,
}

impl SessionStreams {
    /// Build the registry with a per-hub channel capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            hubs: DashMap::new(),
            capacity,
        }
    }

    /// Get or create the hub for a session.
    pub fn hub(&self, session_id: &str) -> Arc<SseHub> {
        let entry = self
            .hubs
            .entry(session_id.to_owned())
            .or_insert_with(|| Arc::new(SseHub::new(self.capacity)));
        Arc::clone(entry.value())
    }

    /// Hub for a session if one is live, without creating it.
    pub fn get(&self, session_id: &str) -> Option<Arc<SseHub>> {
        self.hubs
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Drop the hub for a session when nobody is listening anymore.
    pub fn release(&self, session_id: &str) {
        self.hubs
            .remove_if(session_id, |_, hub| hub.receiver_count() == 0);
    }

    /// Send an event to every live hub, ignoring sessions without listeners.
    pub fn broadcast_all(&self, event: &ServerEvent) {
        for entry in self.hubs.iter() {
            entry.value().broadcast(event.clone());
        }
    }

    /// Number of live hubs, used by tests and diagnostics.
    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    /// Whether any hub is live.
    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hubs_are_created_lazily_and_pruned_when_idle() {
        let streams = SessionStreams::new(4);
        assert!(streams.get("AB12CD").is_none());

        let hub = streams.hub("AB12CD");
        let receiver = hub.subscribe();
        assert_eq!(streams.len(), 1);

        // Still subscribed: release must keep the hub alive.
        streams.release("AB12CD");
        assert_eq!(streams.len(), 1);

        drop(receiver);
        streams.release("AB12CD");
        assert!(streams.is_empty());
    }

    #[tokio::test]
    async fn broadcast_reaches_subscriber() {
        let streams = SessionStreams::new(4);
        let mut receiver = streams.hub("AB12CD").subscribe();

        streams
            .hub("AB12CD")
            .broadcast(ServerEvent::json("ping".to_string(), &42).unwrap());

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("ping"));
        assert_eq!(event.data, "42");
    }
}
