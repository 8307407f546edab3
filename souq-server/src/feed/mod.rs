//! Realtime Order Feed
//!
//! Fan-out of order lifecycle events to two audiences: a global feed and a
//! room per store. Built on broadcast channels so the concrete transport
//! (websocket, message bus, in-process consumer) only has to subscribe.
//!
//! Delivery is best-effort and at-most-once: publishing never blocks or
//! fails the mutation that produced the event, nothing is persisted, and a
//! slow subscriber simply lags. Reconnecting clients re-fetch state through
//! the query API.

use dashmap::DashMap;
use shared::feed::OrderFeedEvent;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Default capacity for the global feed and each store room.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct OrderFeed {
    global: broadcast::Sender<OrderFeedEvent>,
    rooms: Arc<DashMap<String, broadcast::Sender<OrderFeedEvent>>>,
    capacity: usize,
}

impl OrderFeed {
    pub fn new() -> Self {
        Self::with_capacity(CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (global, _) = broadcast::channel(capacity);
        Self {
            global,
            rooms: Arc::new(DashMap::new()),
            capacity,
        }
    }

    /// Publish to the global feed and to the event's store room.
    ///
    /// Fire-and-forget: a send error only means nobody is listening on that
    /// channel right now.
    pub fn publish(&self, event: OrderFeedEvent) {
        if let Some(room) = self.rooms.get(&event.store_id) {
            let _ = room.send(event.clone());
        }
        if self.global.send(event).is_err() {
            tracing::debug!("order feed has no global subscribers");
        }
    }

    /// Subscribe to every order event.
    pub fn subscribe_global(&self) -> broadcast::Receiver<OrderFeedEvent> {
        self.global.subscribe()
    }

    /// Subscribe to a single store's room, creating it on first use.
    pub fn subscribe_store(&self, store_id: &str) -> broadcast::Receiver<OrderFeedEvent> {
        self.rooms
            .entry(store_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

impl Default for OrderFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::OrderStatus;
    use shared::feed::OrderFeedKind;

    fn event(store_id: &str) -> OrderFeedEvent {
        OrderFeedEvent::status_changed("o1", store_id, "260805-0001", OrderStatus::Accepted)
    }

    #[tokio::test]
    async fn event_reaches_global_and_room_subscribers() {
        let feed = OrderFeed::new();
        let mut global = feed.subscribe_global();
        let mut room = feed.subscribe_store("s1");

        feed.publish(event("s1"));

        assert_eq!(global.recv().await.unwrap().store_id, "s1");
        assert_eq!(room.recv().await.unwrap().kind, OrderFeedKind::OrderStatusChanged);
    }

    #[tokio::test]
    async fn rooms_are_isolated_per_store() {
        let feed = OrderFeed::new();
        let mut other_room = feed.subscribe_store("s2");
        let mut global = feed.subscribe_global();

        feed.publish(event("s1"));

        // The global subscriber sees it; the s2 room does not.
        assert_eq!(global.recv().await.unwrap().store_id, "s1");
        assert!(matches!(
            other_room.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_no_op() {
        let feed = OrderFeed::new();
        // Must not panic or block.
        feed.publish(event("s1"));
    }

    #[tokio::test]
    async fn late_subscribers_get_no_replay() {
        let feed = OrderFeed::new();
        feed.publish(event("s1"));

        let mut room = feed.subscribe_store("s1");
        assert!(matches!(
            room.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
