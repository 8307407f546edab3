//! Delivery Verification Service
//!
//! Proof of physical delivery: a short-lived numeric code minted when the
//! order becomes ready, consumed exactly once at the courier handoff.

use crate::db::models::Order;
use crate::db::repository::OrderRepository;
use crate::feed::OrderFeed;
use crate::orders::error::{OrderError, OrderResult};
use rand::Rng;
use shared::OrderStatus;
use shared::feed::OrderFeedEvent;
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Inclusive range for delivery proof codes.
const CODE_MIN: u32 = 1000;
const CODE_MAX: u32 = 9999;

#[derive(Clone)]
pub struct DeliveryVerificationService {
    orders: OrderRepository,
    feed: OrderFeed,
}

impl DeliveryVerificationService {
    pub fn new(db: Surreal<Db>, feed: OrderFeed) -> Self {
        Self {
            orders: OrderRepository::new(db),
            feed,
        }
    }

    fn mint_code() -> String {
        rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
    }

    /// Move a preparing order to ready with a fresh delivery code.
    ///
    /// Idempotent: an order already in ready keeps its existing code, so a
    /// code the customer has already received is never invalidated.
    pub async fn mark_ready(&self, order_id: &str) -> OrderResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;

        match order.status {
            OrderStatus::Ready => Ok(order),
            OrderStatus::Preparing => {
                let code = Self::mint_code();
                let updated = self
                    .orders
                    .mark_ready_checked(order_id, &code, now_millis())
                    .await?;
                match updated {
                    Some(order) => {
                        // The feed event carries the status change only; the
                        // code goes back to the store operator in the direct
                        // response and nowhere else.
                        self.feed.publish(OrderFeedEvent::status_changed(
                            order.key().unwrap_or_default(),
                            order.store_id.clone(),
                            order.order_number.clone(),
                            order.status,
                        ));
                        tracing::info!(order_id, "order ready, delivery code issued");
                        Ok(order)
                    }
                    None => {
                        // A concurrent mark_ready won; return its result.
                        match self.orders.find_by_id(order_id).await? {
                            Some(order) if order.status == OrderStatus::Ready => Ok(order),
                            Some(order) => Err(OrderError::InvalidTransition(format!(
                                "cannot mark order {order_id} ready from {}",
                                order.status
                            ))),
                            None => Err(OrderError::NotFound(order_id.to_string())),
                        }
                    }
                }
            }
            other => Err(OrderError::InvalidTransition(format!(
                "cannot mark order {order_id} ready from {other}"
            ))),
        }
    }

    /// Verify the courier's code and finalize delivery.
    ///
    /// The comparison is string-exact and happens inside a single
    /// conditional update together with the status flip and the code
    /// clearing, so a stale code can never complete a second delivery.
    pub async fn verify_and_complete(
        &self,
        order_id: &str,
        submitted_code: &str,
    ) -> OrderResult<Order> {
        let updated = self
            .orders
            .complete_delivery_checked(order_id, submitted_code, now_millis())
            .await?;

        if let Some(order) = updated {
            self.feed.publish(OrderFeedEvent::delivered(
                order.key().unwrap_or_default(),
                order.store_id.clone(),
                order.order_number.clone(),
            ));
            tracing::info!(order_id, "delivery verified");
            return Ok(order);
        }

        // The conditional update did not apply; classify why.
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
        if order.status != OrderStatus::Ready {
            return Err(OrderError::NotReady(order_id.to_string()));
        }
        Err(OrderError::CodeMismatch(order_id.to_string()))
    }
}
