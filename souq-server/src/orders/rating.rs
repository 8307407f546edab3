//! Rating Aggregation
//!
//! Post-delivery rating plus store aggregate recomputation. The aggregate
//! is a full scan-and-replace over delivered, rated orders: concurrent
//! recomputes may interleave, but each writes an internally consistent
//! value from durable state and the last writer wins.

use crate::db::models::Order;
use crate::db::repository::{OrderRepository, StoreRepository};
use crate::orders::error::{OrderError, OrderResult};
use shared::OrderStatus;
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Clone)]
pub struct RatingAggregator {
    orders: OrderRepository,
    stores: StoreRepository,
}

impl RatingAggregator {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            stores: StoreRepository::new(db),
        }
    }

    /// Record a rating on a delivered order, exactly once, then refresh the
    /// owning store's aggregate.
    pub async fn rate_order(
        &self,
        order_id: &str,
        rating: i32,
        comment: Option<String>,
    ) -> OrderResult<Order> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(OrderError::InvalidRating(rating));
        }

        let updated = self
            .orders
            .set_rating_checked(order_id, rating, comment, now_millis())
            .await?;

        let order = match updated {
            Some(order) => order,
            None => {
                // The conditional update refused; classify why.
                let order = self
                    .orders
                    .find_by_id(order_id)
                    .await?
                    .ok_or_else(|| OrderError::NotFound(order_id.to_string()))?;
                if order.status != OrderStatus::Delivered {
                    return Err(OrderError::NotDelivered(order_id.to_string()));
                }
                return Err(OrderError::AlreadyRated(order_id.to_string()));
            }
        };

        self.recompute_store_aggregate(&order.store_id).await?;
        tracing::info!(order_id, rating, store_id = %order.store_id, "order rated");
        Ok(order)
    }

    /// Recompute the store aggregate from scratch and persist it.
    ///
    /// Returns the (mean, count) that was written.
    pub async fn recompute_store_aggregate(&self, store_id: &str) -> OrderResult<(f64, i64)> {
        let ratings = self.orders.delivered_ratings_for_store(store_id).await?;
        let count = ratings.len() as i64;
        let mean = if count == 0 {
            0.0
        } else {
            ratings.iter().map(|r| *r as f64).sum::<f64>() / count as f64
        };

        if self
            .stores
            .update_rating(store_id, mean, count)
            .await?
            .is_none()
        {
            // The order mutation already happened; a vanished store entry is
            // a directory consistency problem, not a rating failure.
            tracing::warn!(store_id, "store missing during rating aggregate update");
        }
        Ok((mean, count))
    }
}
