//! Order State Machine
//!
//! Validates and applies status transitions. Every applied transition is a
//! single conditional update keyed on the expected prior status, so two
//! racing attempts on the same order cannot both win and a stale client can
//! never skip a state.

use crate::db::models::Order;
use crate::db::repository::OrderRepository;
use crate::feed::OrderFeed;
use crate::orders::delivery::DeliveryVerificationService;
use crate::orders::error::{OrderError, OrderResult};
use shared::feed::OrderFeedEvent;
use shared::util::now_millis;
use shared::{ActorRole, OrderStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Who is asking for the transition.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: ActorRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

#[derive(Clone)]
pub struct OrderStateMachine {
    orders: OrderRepository,
    delivery: DeliveryVerificationService,
    feed: OrderFeed,
    cancel_window_secs: i64,
}

impl OrderStateMachine {
    pub fn new(db: Surreal<Db>, feed: OrderFeed, cancel_window_secs: i64) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            delivery: DeliveryVerificationService::new(db, feed.clone()),
            feed,
            cancel_window_secs,
        }
    }

    /// Whether `to` is reachable from `from`.
    ///
    /// Cancel/reject are only available out of `pending`; everything else
    /// moves one step down the fulfillment pipeline.
    pub fn allowed(from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (from, to),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Pending, Canceled)
                | (Accepted, Preparing)
                | (Preparing, Ready)
                | (Ready, Delivered)
        )
    }

    /// Apply a transition requested by `actor`.
    pub async fn transition(
        &self,
        order_id: &str,
        target: OrderStatus,
        actor: &Actor,
    ) -> OrderResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        let current = order.status;

        if !Self::allowed(current, target) {
            return Err(OrderError::InvalidTransition(format!(
                "cannot move order {order_id} from {current} to {target}"
            )));
        }

        match target {
            OrderStatus::Canceled => {
                if actor.role != ActorRole::Customer || actor.user_id != order.user_id {
                    return Err(OrderError::Forbidden(
                        "only the ordering customer may cancel".into(),
                    ));
                }
                // created_at is immutable, so the window check cannot race.
                let elapsed_millis = now_millis() - order.created_at;
                if elapsed_millis > self.cancel_window_secs * 1000 {
                    return Err(OrderError::WindowExpired(order_id.to_string()));
                }
            }
            OrderStatus::Delivered => {
                // Delivered is reached through delivery verification, never
                // by direct status assignment.
                return Err(OrderError::InvalidTransition(
                    "delivered is only reachable through delivery verification".into(),
                ));
            }
            OrderStatus::Ready => {
                if actor.role != ActorRole::StoreOperator {
                    return Err(OrderError::Forbidden("store operator required".into()));
                }
                // Entering ready mints the delivery code; the caller must
                // observe the order with the code attached.
                return self.delivery.mark_ready(order_id).await;
            }
            _ => {
                if actor.role != ActorRole::StoreOperator {
                    return Err(OrderError::Forbidden("store operator required".into()));
                }
            }
        }

        let updated = self
            .orders
            .update_status_checked(order_id, current, target, now_millis())
            .await?;

        match updated {
            Some(order) => {
                self.feed.publish(OrderFeedEvent::status_changed(
                    order.key().unwrap_or_default(),
                    order.store_id.clone(),
                    order.order_number.clone(),
                    order.status,
                ));
                tracing::info!(order_id, from = %current, to = %target, "order status changed");
                Ok(order)
            }
            None => {
                // Lost a race: the status moved underneath us. Re-read so the
                // caller sees the real reason instead of a silent no-op.
                match self.orders.find_by_id(order_id).await? {
                    Some(order) => Err(OrderError::InvalidTransition(format!(
                        "cannot move order {order_id} from {} to {target}",
                        order.status
                    ))),
                    None => Err(OrderError::NotFound(order_id.to_string())),
                }
            }
        }
    }

    /// Remove a terminally failed order. Store operators only; the record
    /// must already be rejected or canceled.
    pub async fn purge(&self, order_id: &str, actor: &Actor) -> OrderResult<Order> {
        if actor.role != ActorRole::StoreOperator {
            return Err(OrderError::Forbidden("store operator required".into()));
        }
        if let Some(order) = self.orders.purge_checked(order_id).await? {
            tracing::info!(order_id, status = %order.status, "order purged");
            return Ok(order);
        }
        match self.orders.find_by_id(order_id).await? {
            Some(order) => Err(OrderError::InvalidTransition(format!(
                "only rejected or canceled orders can be purged, order {order_id} is {}",
                order.status
            ))),
            None => Err(OrderError::NotFound(order_id.to_string())),
        }
    }
}
