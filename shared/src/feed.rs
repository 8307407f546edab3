//! Order feed events
//!
//! Structured payloads published on the realtime order feed. Delivery is
//! best-effort and at-most-once; clients that reconnect must re-fetch
//! state through the query API instead of relying on replay.
//!
//! The delivery proof code is never carried on a feed event. It is returned
//! only in the direct response to the store operator who marked the order
//! ready.

use crate::models::OrderStatus;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// Event kinds published on the order feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderFeedKind {
    #[serde(rename = "order.created")]
    OrderCreated,
    #[serde(rename = "order.status_changed")]
    OrderStatusChanged,
    #[serde(rename = "order.delivered")]
    OrderDelivered,
}

/// A single order feed event, delivered to the global feed and to the
/// room scoped to `store_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFeedEvent {
    pub kind: OrderFeedKind,
    pub order_id: String,
    pub store_id: String,
    pub order_number: String,
    pub status: OrderStatus,
    /// Emission time, UTC millis.
    pub timestamp: i64,
}

impl OrderFeedEvent {
    fn new(
        kind: OrderFeedKind,
        order_id: impl Into<String>,
        store_id: impl Into<String>,
        order_number: impl Into<String>,
        status: OrderStatus,
    ) -> Self {
        Self {
            kind,
            order_id: order_id.into(),
            store_id: store_id.into(),
            order_number: order_number.into(),
            status,
            timestamp: now_millis(),
        }
    }

    pub fn created(
        order_id: impl Into<String>,
        store_id: impl Into<String>,
        order_number: impl Into<String>,
    ) -> Self {
        Self::new(
            OrderFeedKind::OrderCreated,
            order_id,
            store_id,
            order_number,
            OrderStatus::Pending,
        )
    }

    pub fn status_changed(
        order_id: impl Into<String>,
        store_id: impl Into<String>,
        order_number: impl Into<String>,
        status: OrderStatus,
    ) -> Self {
        Self::new(
            OrderFeedKind::OrderStatusChanged,
            order_id,
            store_id,
            order_number,
            status,
        )
    }

    pub fn delivered(
        order_id: impl Into<String>,
        store_id: impl Into<String>,
        order_number: impl Into<String>,
    ) -> Self {
        Self::new(
            OrderFeedKind::OrderDelivered,
            order_id,
            store_id,
            order_number,
            OrderStatus::Delivered,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_uses_dotted_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderFeedKind::OrderStatusChanged).unwrap(),
            "\"order.status_changed\""
        );
    }

    #[test]
    fn delivered_event_carries_delivered_status() {
        let event = OrderFeedEvent::delivered("o1", "s1", "260805-0001");
        assert_eq!(event.kind, OrderFeedKind::OrderDelivered);
        assert_eq!(event.status, OrderStatus::Delivered);
        assert_eq!(event.store_id, "s1");
    }
}
