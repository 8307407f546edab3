//! Order Repository
//!
//! Mutations that race across requests are expressed as single conditional
//! statements: "set ... WHERE the precondition still holds". A `None`
//! return from a conditional update means the precondition failed; the
//! domain layer re-reads to classify the reason.
//!
//! The embedded engine occasionally reports optimistic write conflicts when
//! statements land on the same record at once; those are transient and
//! retried here with the precondition re-evaluated on every attempt.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Order;
use shared::OrderStatus;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";

/// Bounded retries for transient write conflicts.
const MAX_CONFLICT_RETRIES: u32 = 5;

fn record(id: &str) -> RecordId {
    RecordId::from_table_key(TABLE, id)
}

fn is_conflict(err: &RepoError) -> bool {
    matches!(err, RepoError::Database(msg) if msg.to_lowercase().contains("conflict"))
}

macro_rules! with_conflict_retry {
    ($attempt:expr) => {{
        let mut last_error = None;
        let mut result = None;
        for _ in 0..MAX_CONFLICT_RETRIES {
            match $attempt {
                Err(e) if is_conflict(&e) => last_error = Some(e),
                other => {
                    result = Some(other);
                    break;
                }
            }
        }
        match result {
            Some(outcome) => outcome,
            None => Err(last_error
                .unwrap_or_else(|| RepoError::Database("write conflict retries exhausted".into()))),
        }
    }};
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a new order under `key`.
    ///
    /// The unique indexes on `order_number`/`tracking_number` make this fail
    /// with [`RepoError::Duplicate`] on collision, which intake treats as a
    /// signal to regenerate both numbers and retry.
    pub async fn create(&self, key: &str, order: Order) -> RepoResult<Order> {
        with_conflict_retry!(self.try_create(key, order.clone()).await)
    }

    async fn try_create(&self, key: &str, mut order: Order) -> RepoResult<Order> {
        order.id = None;
        let created: Option<Order> = self.base.db().create((TABLE, key)).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".into()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select((TABLE, id)).await?;
        Ok(order)
    }

    pub async fn find_by_tracking(&self, tracking_number: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE tracking_number = $tracking LIMIT 1")
            .bind(("tracking", tracking_number.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Orders for a store, newest first, paginated.
    pub async fn list_by_store(
        &self,
        store_id: &str,
        limit: i64,
        offset: i64,
    ) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE store_id = $store_id \
                 ORDER BY created_at DESC LIMIT $limit START $offset",
            )
            .bind(("store_id", store_id.to_string()))
            .bind(("limit", limit))
            .bind(("offset", offset))
            .await?;
        Ok(result.take(0)?)
    }

    /// Pending queue for a store, oldest first.
    pub async fn list_pending_by_store(&self, store_id: &str) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM order WHERE store_id = $store_id AND status = $status \
                 ORDER BY created_at ASC",
            )
            .bind(("store_id", store_id.to_string()))
            .bind(("status", OrderStatus::Pending.as_str()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Orders for a customer; optionally only the ones still in flight.
    pub async fn list_by_user(&self, user_id: &str, active_only: bool) -> RepoResult<Vec<Order>> {
        let mut result = if active_only {
            let active: Vec<&'static str> = [
                OrderStatus::Pending,
                OrderStatus::Accepted,
                OrderStatus::Preparing,
                OrderStatus::Ready,
            ]
            .iter()
            .map(OrderStatus::as_str)
            .collect();
            self.base
                .db()
                .query(
                    "SELECT * FROM order WHERE user_id = $user_id AND status IN $statuses \
                     ORDER BY created_at DESC",
                )
                .bind(("user_id", user_id.to_string()))
                .bind(("statuses", active))
                .await?
        } else {
            self.base
                .db()
                .query("SELECT * FROM order WHERE user_id = $user_id ORDER BY created_at DESC")
                .bind(("user_id", user_id.to_string()))
                .await?
        };
        Ok(result.take(0)?)
    }

    /// Conditional transition: applies only while the current status matches
    /// `expected`, so two racing transitions cannot both win.
    pub async fn update_status_checked(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        with_conflict_retry!(self.try_update_status(id, expected, next, now).await)
    }

    async fn try_update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET status = $next, updated_at = $now \
                 WHERE status = $expected RETURN AFTER",
            )
            .bind(("record", record(id)))
            .bind(("next", next.as_str()))
            .bind(("expected", expected.as_str()))
            .bind(("now", now))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Attach a delivery code and move preparing → ready in one statement.
    pub async fn mark_ready_checked(
        &self,
        id: &str,
        code: &str,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        with_conflict_retry!(self.try_mark_ready(id, code, now).await)
    }

    async fn try_mark_ready(&self, id: &str, code: &str, now: i64) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET status = $ready, delivery_code = $code, updated_at = $now \
                 WHERE status = $preparing RETURN AFTER",
            )
            .bind(("record", record(id)))
            .bind(("ready", OrderStatus::Ready.as_str()))
            .bind(("preparing", OrderStatus::Preparing.as_str()))
            .bind(("code", code.to_string()))
            .bind(("now", now))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Flip ready → delivered and clear the code, keyed on the submitted
    /// code matching. A code can never win twice: the first success clears
    /// it and moves the order out of `ready`.
    pub async fn complete_delivery_checked(
        &self,
        id: &str,
        code: &str,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        with_conflict_retry!(self.try_complete_delivery(id, code, now).await)
    }

    async fn try_complete_delivery(
        &self,
        id: &str,
        code: &str,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET status = $delivered, delivery_code = NONE, updated_at = $now \
                 WHERE status = $ready AND delivery_code = $code RETURN AFTER",
            )
            .bind(("record", record(id)))
            .bind(("delivered", OrderStatus::Delivered.as_str()))
            .bind(("ready", OrderStatus::Ready.as_str()))
            .bind(("code", code.to_string()))
            .bind(("now", now))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// First rating wins: applies only while the order is delivered and
    /// still unrated.
    pub async fn set_rating_checked(
        &self,
        id: &str,
        rating: i32,
        comment: Option<String>,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        with_conflict_retry!(self.try_set_rating(id, rating, comment.clone(), now).await)
    }

    async fn try_set_rating(
        &self,
        id: &str,
        rating: i32,
        comment: Option<String>,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $record SET rating = $rating, rating_comment = $comment, updated_at = $now \
                 WHERE status = $delivered AND rating = NONE RETURN AFTER",
            )
            .bind(("record", record(id)))
            .bind(("rating", rating))
            .bind(("comment", comment))
            .bind(("delivered", OrderStatus::Delivered.as_str()))
            .bind(("now", now))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// Ratings of all delivered, rated orders for a store.
    pub async fn delivered_ratings_for_store(&self, store_id: &str) -> RepoResult<Vec<i32>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT VALUE rating FROM order \
                 WHERE store_id = $store_id AND status = $delivered AND rating != NONE",
            )
            .bind(("store_id", store_id.to_string()))
            .bind(("delivered", OrderStatus::Delivered.as_str()))
            .await?;
        Ok(result.take(0)?)
    }

    /// Purge a terminally failed order. Returns the purged order, or `None`
    /// when no record in a purgeable status matched.
    pub async fn purge_checked(&self, id: &str) -> RepoResult<Option<Order>> {
        with_conflict_retry!(self.try_purge(id).await)
    }

    async fn try_purge(&self, id: &str) -> RepoResult<Option<Order>> {
        let purgeable: Vec<&'static str> = vec![
            OrderStatus::Rejected.as_str(),
            OrderStatus::Canceled.as_str(),
        ];
        let mut result = self
            .base
            .db()
            .query("DELETE $record WHERE status IN $purgeable RETURN BEFORE")
            .bind(("record", record(id)))
            .bind(("purgeable", purgeable))
            .await?;
        let rows: Vec<Order> = result.take(0)?;
        Ok(rows.into_iter().next())
    }
}
